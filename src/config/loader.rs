//! Configuration loading with user / project layering

use super::WorkflowConfig;
use crate::workflow::{FlowPersistence, LaunchStyle};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "flowcurrent";
const PROJECT_DIR: &str = ".flowcurrent";

/// Top-level flowcurrent configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlowcurrentConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Settings applied to steps that do not choose their own
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub launch_style: Option<LaunchStyle>,

    pub persistence: Option<FlowPersistence>,

    /// Animate presentation changes (default true)
    pub animated: Option<bool>,

    /// Log file; `~` and `$VARS` are expanded
    pub log_file: Option<String>,
}

impl Defaults {
    pub fn launch_style(&self) -> LaunchStyle {
        self.launch_style.unwrap_or_default()
    }

    pub fn persistence(&self) -> FlowPersistence {
        self.persistence.unwrap_or_default()
    }

    pub fn animated(&self) -> bool {
        self.animated.unwrap_or(true)
    }

    pub fn log_file(&self) -> Result<Option<PathBuf>> {
        self.log_file
            .as_deref()
            .map(|raw| {
                shellexpand::full(raw)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .with_context(|| format!("expanding log_file '{}'", raw))
            })
            .transpose()
    }
}

impl FlowcurrentConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/flowcurrent/config.toml
    /// 3. .flowcurrent/config.toml (project)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config.merge(Self::load_file(&user_path)?);
                tracing::debug!(path = %user_path.display(), "Loaded user config");
            }
        }

        let project_path = project_root(project_dir).join("config.toml");
        if project_path.exists() {
            config.merge(Self::load_file(&project_path)?);
            tracing::debug!(path = %project_path.display(), "Loaded project config");
        }

        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// ~/.config/flowcurrent/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Merge another config into this one; anything `other` sets wins
    pub fn merge(&mut self, other: Self) {
        let theirs = other.defaults;
        let ours = &mut self.defaults;
        if theirs.launch_style.is_some() {
            ours.launch_style = theirs.launch_style;
        }
        if theirs.persistence.is_some() {
            ours.persistence = theirs.persistence;
        }
        if theirs.animated.is_some() {
            ours.animated = theirs.animated;
        }
        if theirs.log_file.is_some() {
            ours.log_file = theirs.log_file;
        }
    }
}

fn project_root(project_dir: Option<&Path>) -> PathBuf {
    project_dir
        .map(|p| p.join(PROJECT_DIR))
        .unwrap_or_else(|| PathBuf::from(PROJECT_DIR))
}

/// Where a workflow named `name` may live, in search order
pub fn workflow_search_paths(name: &str, project_dir: Option<&Path>) -> Vec<PathBuf> {
    let filename = format!("{}.toml", name);
    let mut paths = vec![project_root(project_dir).join("workflows").join(&filename)];
    if let Some(user_dir) = dirs::config_dir() {
        paths.push(user_dir.join(APP_DIR).join("workflows").join(&filename));
    }
    paths
}

/// First existing file for workflow `name`
pub fn find_workflow(name: &str, project_dir: Option<&Path>) -> Result<PathBuf> {
    let searched = workflow_search_paths(name, project_dir);
    match searched.iter().find(|path| path.exists()) {
        Some(path) => Ok(path.clone()),
        None => anyhow::bail!(
            "workflow '{}' not found (looked in {})",
            name,
            searched
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Load and validate a workflow by name
///
/// Search order (first match wins):
/// 1. .flowcurrent/workflows/{name}.toml (project)
/// 2. ~/.config/flowcurrent/workflows/{name}.toml (user)
pub fn load_workflow(name: &str, project_dir: Option<&Path>) -> Result<WorkflowConfig> {
    load_workflow_file(&find_workflow(name, project_dir)?)
}

/// Parse a workflow file without validating it
pub fn read_workflow_file(path: &Path) -> Result<WorkflowConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_workflow_file(path: &Path) -> Result<WorkflowConfig> {
    let workflow = read_workflow_file(path)?;

    workflow.validate().map_err(|errors| {
        anyhow::anyhow!(
            "{}: workflow validation failed:\n  {}",
            path.display(),
            errors.join("\n  ")
        )
    })?;

    tracing::debug!(path = %path.display(), steps = workflow.steps.len(), "Loaded workflow");
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "{}", contents).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = FlowcurrentConfig::default();
        assert_eq!(config.defaults.launch_style(), LaunchStyle::Default);
        assert_eq!(config.defaults.persistence(), FlowPersistence::Default);
        assert!(config.defaults.animated());
        assert!(config.defaults.log_file().unwrap().is_none());
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write(
            &path,
            r#"
            [defaults]
            launch_style = "navigation_link"
            animated = false
        "#,
        );

        let config = FlowcurrentConfig::load_file(&path).unwrap();
        assert_eq!(config.defaults.launch_style(), LaunchStyle::NavigationLink);
        assert!(!config.defaults.animated());
    }

    #[test]
    fn test_config_merge() {
        let mut base: FlowcurrentConfig = toml::from_str(
            r#"
            [defaults]
            launch_style = "modal"
            persistence = "removed_after_proceeding"
        "#,
        )
        .unwrap();
        let project: FlowcurrentConfig = toml::from_str(
            r#"
            [defaults]
            launch_style = "navigation_link"
            log_file = "/tmp/flow.log"
        "#,
        )
        .unwrap();

        base.merge(project);

        assert_eq!(base.defaults.launch_style(), LaunchStyle::NavigationLink);
        assert_eq!(
            base.defaults.persistence(),
            FlowPersistence::RemovedAfterProceeding
        );
        assert_eq!(
            base.defaults.log_file().unwrap(),
            Some(PathBuf::from("/tmp/flow.log"))
        );
    }

    #[test]
    fn test_project_config_loaded() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".flowcurrent/config.toml"),
            "[defaults]\npersistence = \"persist_when_skipped\"",
        );

        let config = FlowcurrentConfig::load(Some(dir.path())).unwrap();
        assert_eq!(
            config.defaults.persistence(),
            FlowPersistence::PersistWhenSkipped
        );
    }

    #[test]
    fn test_bad_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write(&path, "[defaults]\nretries = 3");

        let err = FlowcurrentConfig::load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }

    #[test]
    fn test_load_workflow_from_project() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".flowcurrent/workflows/signup.toml"),
            r#"
            name = "signup"

            [[steps]]
            name = "email"
            prompt = "Email?"
        "#,
        );

        let workflow = load_workflow("signup", Some(dir.path())).unwrap();
        assert_eq!(workflow.name, "signup");
        assert_eq!(workflow.steps.len(), 1);
    }

    #[test]
    fn test_load_workflow_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_workflow("definitely-not-here-1234", Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_workflow_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        write(&path, "name = \"empty\"");

        let err = load_workflow_file(&path).unwrap_err();
        assert!(err.to_string().contains("no steps"));
    }

    #[test]
    fn test_read_skips_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        write(&path, "name = \"empty\"");

        let workflow = read_workflow_file(&path).unwrap();
        assert!(workflow.steps.is_empty());
    }

    #[test]
    fn test_search_paths_order() {
        let dir = TempDir::new().unwrap();
        let paths = workflow_search_paths("signup", Some(dir.path()));
        assert_eq!(
            paths[0],
            dir.path().join(".flowcurrent/workflows/signup.toml")
        );
    }
}
