//! Project discovery and loading
//!
//! Projects are YAML (or JSON) files sitting on a search path of
//! directories; a project's id is its file stem.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::Project;

/// Environment variable overriding the search path (`:`-separated)
pub const PATH_ENV: &str = "PROBE_MATRIX_PATH";

/// Fallback search path
const DEFAULT_DIR: &str = "./projects";

const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A project found on the search path
#[derive(Clone, Debug)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
}

/// Project file store over a search path of directories
pub struct ProjectStore {
    paths: Vec<PathBuf>,
}

impl ProjectStore {
    /// Build the search path: CLI directories win, then the environment,
    /// then the default directory.
    pub fn new(dirs: &[String]) -> Self {
        let paths = if !dirs.is_empty() {
            dirs.iter().map(|dir| expand_path(dir)).collect()
        } else if let Ok(env_path) = std::env::var(PATH_ENV) {
            env_path
                .split(':')
                .filter(|part| !part.is_empty())
                .map(expand_path)
                .collect()
        } else {
            vec![expand_path(DEFAULT_DIR)]
        };

        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// All projects on the search path, sorted by project name. When two
    /// directories hold the same id, the earlier directory wins.
    pub fn list(&self) -> Result<Vec<ProjectSummary>> {
        let mut seen = std::collections::BTreeSet::new();
        let mut projects = Vec::new();

        for dir in &self.paths {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("Skipping search dir {}: {}", dir.display(), e);
                    continue;
                }
            };

            let mut files: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| has_project_extension(path))
                .collect();
            files.sort();

            for path in files {
                let Some(id) = file_stem(&path) else { continue };
                if !seen.insert(id.clone()) {
                    continue;
                }
                match load_file(&path) {
                    Ok(project) => projects.push(ProjectSummary {
                        id,
                        name: project.name,
                        path,
                    }),
                    Err(e) => warn!("Skipping unreadable project {}: {:#}", path.display(), e),
                }
            }
        }

        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    /// First file on the search path matching the id
    pub fn find(&self, id: &str) -> Option<PathBuf> {
        for dir in &self.paths {
            for extension in EXTENSIONS {
                let candidate = dir.join(format!("{id}.{extension}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Load a project by id or direct file path, validated and ready to run
    pub fn load(&self, reference: &str) -> Result<Project> {
        let direct = Path::new(reference);
        let path = if direct.is_file() {
            direct.to_path_buf()
        } else {
            self.find(reference).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown project '{}' (searched: {})",
                    reference,
                    self.paths
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })?
        };

        load_file(&path)
    }
}

fn load_file(path: &Path) -> Result<Project> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {}", path.display()))?;

    let project: Project = if is_yaml_file(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML project: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON project: {}", path.display()))?
    };

    project.validate()?;
    Ok(project)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

fn has_project_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BLOG: &str = r#"
name: Blog
servers:
  - name: web1.example.com
    roles: [web]
connections:
  - kind: http
    roles: [web]
    requests:
      - path: /
        checks:
          - name: responds with 200
            type: status
            equals: 200
"#;

    const MAIL: &str = r#"
name: Mail
servers:
  - name: mx1.example.com
    roles: [smtp]
connections:
  - kind: tcp
    port: 25
    roles: [smtp]
    requests:
      - checks:
          - name: greets
            type: body_contains
            text: "220"
"#;

    #[test]
    fn test_list_sorts_by_project_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("zz-mail.yaml"), MAIL).unwrap();
        fs::write(dir.path().join("aa-blog.yaml"), BLOG).unwrap();

        let store = ProjectStore::new(&[dir.path().display().to_string()]);
        let projects = store.list().unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Blog");
        assert_eq!(projects[0].id, "aa-blog");
        assert_eq!(projects[1].name, "Mail");
    }

    #[test]
    fn test_earlier_directory_wins_for_duplicate_ids() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("site.yaml"), BLOG).unwrap();
        fs::write(second.path().join("site.yaml"), MAIL).unwrap();

        let store = ProjectStore::new(&[
            first.path().display().to_string(),
            second.path().display().to_string(),
        ]);

        let projects = store.list().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Blog");

        let loaded = store.load("site").unwrap();
        assert_eq!(loaded.name, "Blog");
    }

    #[test]
    fn test_load_by_id_and_by_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blog.yaml");
        fs::write(&path, BLOG).unwrap();

        let store = ProjectStore::new(&[dir.path().display().to_string()]);
        assert_eq!(store.load("blog").unwrap().name, "Blog");
        assert_eq!(store.load(&path.display().to_string()).unwrap().name, "Blog");
        assert!(store.load("missing").is_err());
    }

    #[test]
    fn test_unparseable_file_is_skipped_in_list() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("blog.yaml"), BLOG).unwrap();
        fs::write(dir.path().join("broken.yaml"), "name: [").unwrap();

        let store = ProjectStore::new(&[dir.path().display().to_string()]);
        let projects = store.list().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Blog");
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let store = ProjectStore::new(&["/nonexistent/probe-projects".to_string()]);
        assert!(store.list().unwrap().is_empty());
        assert!(store.find("anything").is_none());
    }

    #[test]
    fn test_json_projects_load_too() {
        let dir = tempdir().unwrap();
        let json = serde_json::to_string(&serde_yaml::from_str::<serde_json::Value>(BLOG).unwrap())
            .unwrap();
        fs::write(dir.path().join("blog.json"), json).unwrap();

        let store = ProjectStore::new(&[dir.path().display().to_string()]);
        assert_eq!(store.load("blog").unwrap().name, "Blog");
    }
}
