use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Name of the project-local configuration file.
pub const CONFIG_FILE: &str = "laborm.toml";

/// CLI configuration loaded from laborm.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub migrate: MigrateSettings,
}

/// Where the schema and the database live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_schema_file")]
    pub schema_file: PathBuf,
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            schema_file: default_schema_file(),
            folder: default_folder(),
        }
    }
}

/// Defaults for `laborm migrate`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigrateSettings {
    /// Apply destructive changes without asking.
    #[serde(default)]
    pub force: bool,
}

fn default_schema_file() -> PathBuf {
    PathBuf::from("schema.labORM")
}

fn default_folder() -> PathBuf {
    PathBuf::from("./database")
}

/// Settings for one run, after merging the config file and CLI flags.
///
/// Built once in `main` and passed by reference to the command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub schema_file: PathBuf,
    pub folder: PathBuf,
    pub force: bool,
}

impl RunOptions {
    /// CLI flags take precedence over config file values.
    pub fn resolve(config: &CliConfig, global: &GlobalOpts) -> Self {
        Self {
            schema_file: global
                .schema_file
                .clone()
                .unwrap_or_else(|| config.project.schema_file.clone()),
            folder: global
                .folder
                .clone()
                .unwrap_or_else(|| config.project.folder.clone()),
            force: config.migrate.force,
        }
    }
}

/// Discovery order for config file:
/// 1. `--config <path>` or `LABORM_CONFIG` (explicit)
/// 2. `./laborm.toml` (project-local)
/// 3. Built-in defaults
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return load_config_from_path(&local);
    }

    // No config file found; use defaults.
    Ok(CliConfig::default())
}

/// Relative paths in the file resolve against the file's own directory.
fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config: CliConfig = toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })?;

    if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        config.project.schema_file = base.join(&config.project.schema_file);
        config.project.folder = base.join(&config.project.folder);
    }
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_global(schema_file: Option<&str>, folder: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            config: None,
            schema_file: schema_file.map(PathBuf::from),
            folder: folder.map(PathBuf::from),
            format: "human".into(),
            verbose: 0,
            quiet: false,
            no_color: false,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = CliConfig::default();
        assert_eq!(config.project.schema_file, PathBuf::from("schema.labORM"));
        assert_eq!(config.project.folder, PathBuf::from("./database"));
        assert!(!config.migrate.force);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
[project]
folder = "data"
"#;
        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project.folder, PathBuf::from("data"));
        // Defaults for missing fields
        assert_eq!(config.project.schema_file, PathBuf::from("schema.labORM"));
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[project]
schema_file = "models/blog.labORM"
folder = "var/db"

[migrate]
force = true
"#;
        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.project.schema_file,
            PathBuf::from("models/blog.labORM")
        );
        assert_eq!(config.project.folder, PathBuf::from("var/db"));
        assert!(config.migrate.force);
    }

    #[test]
    fn resolve_uses_config_defaults() {
        let options = RunOptions::resolve(&CliConfig::default(), &make_global(None, None));
        assert_eq!(options.schema_file, PathBuf::from("schema.labORM"));
        assert_eq!(options.folder, PathBuf::from("./database"));
        assert!(!options.force);
    }

    #[test]
    fn resolve_cli_overrides() {
        let options = RunOptions::resolve(
            &CliConfig::default(),
            &make_global(Some("other.labORM"), Some("/tmp/db")),
        );
        assert_eq!(options.schema_file, PathBuf::from("other.labORM"));
        assert_eq!(options.folder, PathBuf::from("/tmp/db"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[project]\nfolder = \"db\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.project.folder, dir.path().join("db"));
        assert_eq!(config.project.schema_file, dir.path().join("schema.labORM"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[project\n").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn load_config_from_explicit_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/laborm.toml")));
        assert!(result.is_err());
    }
}
