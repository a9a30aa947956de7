//! Project discovery under the projects root.
//!
//! A project is any direct subdirectory of the projects root; it is eligible
//! for generation when `ai-generated/specification.yaml` exists inside it.
//! Discovery sorts by project id so batch windows are deterministic across
//! runs regardless of directory enumeration order.

use std::io;
use std::path::{Path, PathBuf};

/// Input artifact, relative to the project directory.
pub const SPEC_REL_PATH: &str = "ai-generated/specification.yaml";
/// Output artifact, relative to the project directory.
pub const OUTPUT_REL_PATH: &str = "ai-generated/requirements.md";

/// When set, regeneration is limited to this single project id.
pub const TEST_SINGLE_PROJECT_ENV: &str = "TEST_SINGLE_PROJECT";

// ─── Types ────────────────────────────────────────────────────────────────────

/// One project directory eligible for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub dir: PathBuf,
}

impl Project {
    pub fn new(projects_dir: &Path, id: &str) -> Self {
        Self {
            id: id.to_owned(),
            dir: projects_dir.join(id),
        }
    }

    pub fn spec_path(&self) -> PathBuf {
        self.dir.join(SPEC_REL_PATH)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_REL_PATH)
    }
}

// ─── Discovery ────────────────────────────────────────────────────────────────

/// All projects with a specification file, sorted by id.
pub fn discover(projects_dir: &Path) -> io::Result<Vec<Project>> {
    discover_with_override(projects_dir, None)
}

/// Like [`discover`], but when `only` is set the result is at most that one
/// project (empty when its specification is missing, never an error).
pub fn discover_with_override(
    projects_dir: &Path,
    only: Option<&str>,
) -> io::Result<Vec<Project>> {
    if let Some(id) = only {
        let candidate = Project::new(projects_dir, id);
        if candidate.spec_path().is_file() {
            return Ok(vec![candidate]);
        }
        return Ok(Vec::new());
    }

    let mut projects = Vec::new();
    for entry in std::fs::read_dir(projects_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let project = Project {
            id: entry.file_name().to_string_lossy().into_owned(),
            dir: entry.path(),
        };
        if project.spec_path().is_file() {
            projects.push(project);
        }
    }
    projects.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(projects)
}

// ─── Status scan ──────────────────────────────────────────────────────────────

/// Counts from a pass over every project directory.
///
/// `with_requirements` and `needing_requirements` partition `with_spec`;
/// directories without a specification are never "needing" (there is nothing
/// to generate from).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub total_dirs: usize,
    pub with_spec: usize,
    pub with_requirements: usize,
    pub needing_requirements: usize,
}

/// Survey the projects root without touching any file contents.
pub fn scan(projects_dir: &Path) -> io::Result<ScanReport> {
    let mut report = ScanReport::default();
    for entry in std::fs::read_dir(projects_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        report.total_dirs += 1;
        let dir = entry.path();
        if dir.join(SPEC_REL_PATH).is_file() {
            report.with_spec += 1;
            if dir.join(OUTPUT_REL_PATH).is_file() {
                report.with_requirements += 1;
            } else {
                report.needing_requirements += 1;
            }
        }
    }
    Ok(report)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn add_project(root: &Path, id: &str, with_spec: bool, with_requirements: bool) {
        let generated = root.join(id).join("ai-generated");
        std::fs::create_dir_all(&generated).expect("mkdir");
        if with_spec {
            std::fs::write(generated.join("specification.yaml"), "project:\n  name: X\n")
                .expect("write spec");
        }
        if with_requirements {
            std::fs::write(generated.join("requirements.md"), "# Requirements\n")
                .expect("write requirements");
        }
    }

    #[test]
    fn discovers_only_projects_with_specs_sorted() {
        let root = tempfile::tempdir().expect("tempdir");
        add_project(root.path(), "charlie", true, false);
        add_project(root.path(), "alpha", true, true);
        add_project(root.path(), "bravo", false, false);
        std::fs::write(root.path().join("stray-file"), "x").expect("write");

        let found = discover(root.path()).expect("discover");
        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "charlie"]);
        assert_eq!(found[0].dir, root.path().join("alpha"));
    }

    #[test]
    fn override_limits_to_one_project() {
        let root = tempfile::tempdir().expect("tempdir");
        add_project(root.path(), "alpha", true, false);
        add_project(root.path(), "bravo", true, false);

        let found = discover_with_override(root.path(), Some("bravo")).expect("discover");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "bravo");
    }

    #[test]
    fn override_without_spec_is_empty_not_an_error() {
        let root = tempfile::tempdir().expect("tempdir");
        add_project(root.path(), "alpha", false, false);
        let found = discover_with_override(root.path(), Some("alpha")).expect("discover");
        assert!(found.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempfile::tempdir().expect("tempdir");
        assert!(discover(&root.path().join("nope")).is_err());
    }

    #[test]
    fn project_paths_are_under_ai_generated() {
        let project = Project::new(Path::new("/projects"), "acme");
        assert_eq!(
            project.spec_path(),
            Path::new("/projects/acme/ai-generated/specification.yaml")
        );
        assert_eq!(
            project.output_path(),
            Path::new("/projects/acme/ai-generated/requirements.md")
        );
    }

    #[test]
    fn scan_partitions_projects() {
        let root = tempfile::tempdir().expect("tempdir");
        add_project(root.path(), "done", true, true);
        add_project(root.path(), "pending", true, false);
        add_project(root.path(), "another-pending", true, false);
        add_project(root.path(), "empty", false, false);

        let report = scan(root.path()).expect("scan");
        assert_eq!(report.total_dirs, 4);
        assert_eq!(report.with_spec, 3);
        assert_eq!(report.with_requirements, 1);
        assert_eq!(report.needing_requirements, 2);
        assert_eq!(
            report.with_requirements + report.needing_requirements,
            report.with_spec
        );
    }
}
