//! Configuration loading.

use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

/// The configuration file looked up in the workspace root.
pub const CONFIG_FILE: &str = "t4check.json";

const DEFAULT_EXTENSIONS: &[&str] = &[".tt", ".t4", ".ttinclude"];

/// Project configuration from `t4check.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckConfig {
    /// File extensions to check. Empty means the defaults.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Glob patterns, relative to the workspace, of files to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl CheckConfig {
    /// Loads `t4check.json` from a project root.
    ///
    /// A missing file gives the defaults. So does a file that cannot be read
    /// or parsed, after a warning.
    pub fn load(project_root: &Utf8Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(%path, "no config file, using defaults");
            return Self::default();
        }

        match Self::parse_config(&path) {
            Ok(config) => {
                tracing::debug!(%path, ?config, "loaded config");
                config
            }
            Err(error) => {
                tracing::warn!(%path, %error, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    fn parse_config(path: &Utf8Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    /// Returns the file extensions to check.
    pub fn file_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.to_vec()
        } else {
            self.extensions.iter().map(String::as_str).collect()
        }
    }

    /// Returns true if `file_name` ends with one of the checked extensions,
    /// ignoring ASCII case.
    pub fn matches_extension(&self, file_name: &str) -> bool {
        let file_name = file_name.to_ascii_lowercase();
        self.file_extensions()
            .iter()
            .any(|ext| file_name.ends_with(&ext.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_default_extensions() {
        let config = CheckConfig::default();
        assert_eq!(config.file_extensions(), vec![".tt", ".t4", ".ttinclude"]);
        assert!(config.matches_extension("Model.TT"));
        assert!(config.matches_extension("Shared.ttinclude"));
        assert!(!config.matches_extension("Model.cs"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (_dir, root) = temp_root();
        assert_eq!(CheckConfig::load(&root), CheckConfig::default());
    }

    #[test]
    fn test_load_config() {
        let (_dir, root) = temp_root();
        fs::write(
            root.join(CONFIG_FILE),
            r#"{ "extensions": [".tpl"], "exclude": ["vendor/**"] }"#,
        )
        .unwrap();

        let config = CheckConfig::load(&root);
        assert_eq!(config.file_extensions(), vec![".tpl"]);
        assert_eq!(config.exclude, vec!["vendor/**"]);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let (_dir, root) = temp_root();
        fs::write(root.join(CONFIG_FILE), "{ extensions: ").unwrap();
        assert_eq!(CheckConfig::load(&root), CheckConfig::default());

        fs::write(root.join(CONFIG_FILE), r#"{ "unknown": true }"#).unwrap();
        assert_eq!(CheckConfig::load(&root), CheckConfig::default());
    }
}
