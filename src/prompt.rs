//! Prompt construction for the requirements generator.
//!
//! Two prompt shapes. [`requirements_prompt`] inlines the decoded
//! specification and asks for the document on stdout; it is used by the
//! single/batch runner, which captures and gates the output itself.
//! [`full_requirements_prompt`] instead tells the CLI to read
//! `specification.yaml` through its filesystem server and write the document
//! straight to the project tree; it is used by the concurrent regenerator,
//! which only watches for the file to appear.

use std::path::Path;

use crate::spec::{Feature, ProjectSpec};

/// At most this many feature bullets are inlined; the count line still
/// reflects every entry.
pub const MAX_LISTED_FEATURES: usize = 5;
/// At most this many stack entries are inlined.
pub const MAX_LISTED_STACK: usize = 5;

const NOT_SPECIFIED: &str = "Not specified";

/// Prompt for the capture-stdout runner: the decoded spec inlined, eight
/// required sections with length hints.
pub fn requirements_prompt(spec: &ProjectSpec) -> String {
    format!(
        r#"Create a comprehensive requirements document for the following project:

**Project Name:** {name}
**Type:** {kind}
**Description:** {description}

**Core Features:** {count} features
{features}

**Tech Stack:** {stack}

**Business Model:** {model}

Create a requirements document with these sections:
1. Executive Summary (150+ words)
2. Project Overview (200+ words)
3. Functional Requirements (detailed for each feature)
4. Technical Architecture (based on the tech stack)
5. User Stories (2 per major feature)
6. Security Requirements
7. Testing Strategy
8. Deployment Requirements

Be specific to this project. Aim for 150+ lines of content."#,
        name = spec.name,
        kind = spec.kind,
        description = spec.description,
        count = spec.core_features.len(),
        features = feature_bullets(&spec.core_features),
        stack = stack_summary(&spec.tech_stack),
        model = spec.business_model,
    )
}

/// Prompt for the file-watching regenerator: the CLI reads
/// `specification.yaml` itself and writes the document to `output_path`,
/// which the caller polls.
pub fn full_requirements_prompt(spec: &ProjectSpec, output_path: &Path) -> String {
    format!(
        r#"Read the specification.yaml file and create a comprehensive requirements.md document for the "{name}" project.

The project is a {kind} that {description}.

Write the requirements document to: {output}

The document must include:
- Executive Summary
- Project Overview with business context
- Detailed Functional Requirements for all features (core, premium, enterprise)
- Non-Functional Requirements
- User Stories for each feature
- Technical Architecture
- Security Requirements
- API Specifications
- Database Schema
- UI/UX Requirements
- Testing Strategy
- Deployment Architecture

Base everything on the specification.yaml file content. Be specific to this project's features and business model."#,
        name = spec.name,
        kind = spec.kind,
        description = spec.description,
        output = output_path.display(),
    )
}

/// First [`MAX_LISTED_FEATURES`] raw entries as `- name` bullets. An entry
/// with no renderable label still consumes a listing slot.
fn feature_bullets(features: &[Feature]) -> String {
    features
        .iter()
        .take(MAX_LISTED_FEATURES)
        .filter_map(Feature::label)
        .map(|label| format!("- {label}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn stack_summary(stack: &[String]) -> String {
    if stack.is_empty() {
        NOT_SPECIFIED.to_owned()
    } else {
        stack[..stack.len().min(MAX_LISTED_STACK)].join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::decode;
    use std::path::PathBuf;

    fn spec_from(yaml: &str) -> ProjectSpec {
        decode(&serde_yaml::from_str(yaml).expect("test yaml"))
    }

    #[test]
    fn test_prompt_names_the_project() {
        let spec = spec_from(
            "project:\n  name: Acme\n  type: saas\nfeatures:\n  core: [Login, Billing]\n",
        );
        let prompt = requirements_prompt(&spec);
        assert!(prompt.contains("**Project Name:** Acme"));
        assert!(prompt.contains("**Type:** saas"));
        assert!(prompt.contains("- Login"));
        assert!(prompt.contains("- Billing"));
        assert!(prompt.contains("**Core Features:** 2 features"));
        assert_eq!(prompt, requirements_prompt(&spec));
    }

    #[test]
    fn test_prompt_lists_at_most_five_features() {
        let spec = spec_from("features:\n  core: [F1, F2, F3, F4, F5, F6, F7]\n");
        let prompt = requirements_prompt(&spec);
        assert!(prompt.contains("**Core Features:** 7 features"));
        assert!(prompt.contains("- F5"));
        assert!(!prompt.contains("- F6"));
    }

    #[test]
    fn test_unrenderable_features_consume_listing_slots() {
        let spec = spec_from("features:\n  core: [1, 2, 3, 4, 5, Visible]\n");
        let prompt = requirements_prompt(&spec);
        // Five junk entries fill the listing window; the count still covers all six.
        assert!(prompt.contains("**Core Features:** 6 features"));
        assert!(!prompt.contains("- Visible"));
    }

    #[test]
    fn test_nameless_feature_renders_placeholder() {
        let spec = spec_from("features:\n  core:\n    - name: Login\n    - {}\n");
        let prompt = requirements_prompt(&spec);
        assert!(prompt.contains("- Login"));
        assert!(prompt.contains("- Feature"));
    }

    #[test]
    fn test_prompt_defaults_for_empty_spec() {
        let prompt = requirements_prompt(&decode(&serde_yaml::Value::Null));
        assert!(prompt.contains("**Project Name:** Unknown Project"));
        assert!(prompt.contains("**Type:** application"));
        assert!(prompt.contains("**Core Features:** 0 features"));
        assert!(prompt.contains("**Tech Stack:** Not specified"));
        assert!(prompt.contains("**Business Model:** Not specified"));
    }

    #[test]
    fn test_prompt_sections_are_stable() {
        let prompt = requirements_prompt(&decode(&serde_yaml::Value::Null));
        for section in [
            "1. Executive Summary (150+ words)",
            "2. Project Overview (200+ words)",
            "3. Functional Requirements (detailed for each feature)",
            "4. Technical Architecture (based on the tech stack)",
            "5. User Stories (2 per major feature)",
            "6. Security Requirements",
            "7. Testing Strategy",
            "8. Deployment Requirements",
        ] {
            assert!(prompt.contains(section), "missing section: {section}");
        }
        assert!(prompt.ends_with("Aim for 150+ lines of content."));
    }

    #[test]
    fn test_full_prompt_embeds_output_path() {
        let spec = spec_from("project:\n  name: Acme\n  type: saas\n");
        let out = PathBuf::from("/projects/acme/ai-generated/requirements.md");
        let prompt = full_requirements_prompt(&spec, &out);
        assert!(prompt.starts_with(
            "Read the specification.yaml file and create a comprehensive requirements.md document for the \"Acme\" project."
        ));
        assert!(prompt.contains(
            "Write the requirements document to: /projects/acme/ai-generated/requirements.md"
        ));
        assert!(prompt.contains("The project is a saas that No description provided."));
    }

    #[test]
    fn test_full_prompt_lists_all_sections() {
        let spec = spec_from("project:\n  name: Acme\n");
        let prompt = full_requirements_prompt(&spec, Path::new("/tmp/requirements.md"));
        for section in [
            "- Executive Summary",
            "- Project Overview with business context",
            "- Detailed Functional Requirements for all features (core, premium, enterprise)",
            "- Non-Functional Requirements",
            "- User Stories for each feature",
            "- Technical Architecture",
            "- Security Requirements",
            "- API Specifications",
            "- Database Schema",
            "- UI/UX Requirements",
            "- Testing Strategy",
            "- Deployment Architecture",
        ] {
            assert!(prompt.contains(section), "missing section: {section}");
        }
        assert!(prompt.ends_with("Be specific to this project's features and business model."));
    }
}
