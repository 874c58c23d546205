use std::path::{Path, PathBuf};

use glassybites_core::error::CoreError;
use glassybites_core::storyboard::StoryboardTemplate;
use glassybites_gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Errors while loading studio configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the user config directory; set GLASSYBITES_CREDENTIALS_PATH")]
    NoConfigDir,

    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template {path}: {source}")]
    TemplateInvalid {
        path: PathBuf,
        #[source]
        source: CoreError,
    },
}

/// Studio configuration loaded from environment variables.
///
/// Call `dotenvy::dotenv()` first so a local `.env` file is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Gemini model id (default: [`DEFAULT_MODEL`]).
    pub model: String,
    /// Gemini API root (default: [`DEFAULT_BASE_URL`]).
    pub base_url: String,
    /// Key supplied through the environment, if any.
    pub env_api_key: Option<String>,
    /// Override for the saved-credentials file.
    pub credentials_path: Option<PathBuf>,
    /// JSON storyboard template replacing the built-in one.
    pub template_path: Option<PathBuf>,
}

impl StudioConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                     |
    /// |--------------------------------|---------------------------------------------|
    /// | `GEMINI_MODEL`                 | `gemini-2.5-flash`                          |
    /// | `GEMINI_API_BASE_URL`          | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_API_KEY` / `API_KEY`   | none                                        |
    /// | `GLASSYBITES_CREDENTIALS_PATH` | `<config dir>/glassybites/credentials.json` |
    /// | `GLASSYBITES_TEMPLATE`         | built-in template                           |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: var("GEMINI_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            env_api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            credentials_path: var("GLASSYBITES_CREDENTIALS_PATH").map(PathBuf::from),
            template_path: var("GLASSYBITES_TEMPLATE").map(PathBuf::from),
        }
    }

    /// Where a user-saved key lives.
    pub fn credentials_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.credentials_path {
            return Ok(path.clone());
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("glassybites").join("credentials.json"))
    }

    /// Pick the storyboard template.
    ///
    /// Command-line choices beat the environment: an explicit path first,
    /// then `classic` (the earlier built-in slot set), then
    /// `GLASSYBITES_TEMPLATE`, then the current built-in template.
    pub fn template(
        &self,
        path_override: Option<&Path>,
        classic: bool,
    ) -> Result<StoryboardTemplate, ConfigError> {
        if let Some(path) = path_override {
            return load_template(path);
        }
        if classic {
            return Ok(StoryboardTemplate::glassy_bites_classic());
        }
        match &self.template_path {
            Some(path) => load_template(path),
            None => Ok(StoryboardTemplate::glassy_bites()),
        }
    }
}

fn load_template(path: &Path) -> Result<StoryboardTemplate, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })?;
    let template =
        StoryboardTemplate::from_json(&text).map_err(|source| ConfigError::TemplateInvalid {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), brand = %template.brand, "Loaded storyboard template");
    Ok(template)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use assert_matches::assert_matches;
    use glassybites_core::project::SceneType;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> StudioConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.env_api_key, None);
        assert_eq!(config.template_path, None);
    }

    #[test]
    fn gemini_key_preferred_over_generic_key() {
        let config = config_from(&[("GEMINI_API_KEY", "gemini"), ("API_KEY", "generic")]);
        assert_eq!(config.env_api_key.as_deref(), Some("gemini"));

        let config = config_from(&[("API_KEY", "generic")]);
        assert_eq!(config.env_api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("GEMINI_MODEL", "")]);
        assert_eq!(config.env_api_key, None);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn credentials_path_override() {
        let config = config_from(&[("GLASSYBITES_CREDENTIALS_PATH", "/tmp/keys.json")]);
        assert_eq!(
            config.credentials_path().unwrap(),
            PathBuf::from("/tmp/keys.json")
        );
    }

    #[test]
    fn classic_flag_selects_earlier_slots() {
        let template = config_from(&[]).template(None, true).unwrap();
        assert_eq!(template.fixed_slots[0].scene_type, SceneType::Outfit);
        assert_eq!(template.fixed_slots[2].scene_type, SceneType::Pickup);
    }

    #[test]
    fn template_file_overrides_builtin() {
        let mut custom = StoryboardTemplate::glassy_bites();
        custom.brand = "Crystal Kitchen".into();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&custom).unwrap().as_bytes())
            .unwrap();

        let config = config_from(&[]);
        let loaded = config.template(Some(file.path()), true).unwrap();
        assert_eq!(loaded.brand, "Crystal Kitchen");
    }

    #[test]
    fn classic_flag_beats_template_env_var() {
        let mut custom = StoryboardTemplate::glassy_bites();
        custom.brand = "Crystal Kitchen".into();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&custom).unwrap().as_bytes())
            .unwrap();
        let path = file.path().to_string_lossy().to_string();
        let config = config_from(&[("GLASSYBITES_TEMPLATE", path.as_str())]);

        let classic = config.template(None, true).unwrap();
        assert_eq!(classic, StoryboardTemplate::glassy_bites_classic());

        let from_env = config.template(None, false).unwrap();
        assert_eq!(from_env.brand, "Crystal Kitchen");
    }

    #[test]
    fn invalid_template_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"brand\": 1}").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = config_from(&[("GLASSYBITES_TEMPLATE", path.as_str())]);
        assert_matches!(
            config.template(None, false),
            Err(ConfigError::TemplateInvalid { .. })
        );
    }

    #[test]
    fn missing_template_file_is_read_error() {
        let config = config_from(&[]);
        assert_matches!(
            config.template(Some(Path::new("/nonexistent/template.json")), false),
            Err(ConfigError::TemplateRead { .. })
        );
    }
}
