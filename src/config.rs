//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\spotsnake\config.toml
//! - macOS: ~/Library/Application Support/spotsnake/config.toml
//! - Linux: ~/.config/spotsnake/config.toml
//!
//! Every value can be overridden from the command line (credentials also from
//! `SPOTIFY_CLIENT` / `SPOTIFY_SECRET`). The merged result is validated once
//! into [`RunSettings`], which stays fixed for the whole run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::CatalogConfig;
use crate::catalog::domain::{DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API credentials
    pub credentials: Credentials,

    /// Where downloads and archives go
    pub output: OutputConfig,

    /// Download behaviour
    pub download: DownloadConfig,

    /// Catalog endpoints
    pub catalog: CatalogEndpoints,
}

/// Catalog API credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = |value: &Option<String>| if value.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("client_id", &state(&self.client_id))
            .field("client_secret", &state(&self.client_secret))
            .finish()
    }
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Working directory that tracks are downloaded into
    pub root: PathBuf,

    /// Directory that finished batches are zipped into
    pub archive_dir: PathBuf,

    /// Whether to zip the output after a batch
    pub archive: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("downloads"),
            archive_dir: PathBuf::from("archives"),
            archive: true,
        }
    }
}

/// Download settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Concurrent downloads (default: one per core)
    pub workers: Option<usize>,

    /// Explicit yt-dlp executable (default: search PATH and common locations)
    pub ytdlp_path: Option<String>,
}

/// Catalog endpoint base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEndpoints {
    pub api_base: String,
    pub accounts_base: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
        }
    }
}

/// Values supplied on the command line, applied over the file config
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub output: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub no_archive: bool,
}

/// Validated, immutable settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub catalog: CatalogConfig,
    pub output_root: PathBuf,
    /// `None` when packaging is disabled
    pub archive_dir: Option<PathBuf>,
    pub workers: usize,
    pub ytdlp_path: Option<String>,
}

impl Config {
    /// Apply command-line overrides
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if overrides.client_id.is_some() {
            self.credentials.client_id = overrides.client_id;
        }
        if overrides.client_secret.is_some() {
            self.credentials.client_secret = overrides.client_secret;
        }
        if let Some(output) = overrides.output {
            self.output.root = output;
        }
        if let Some(archive_dir) = overrides.archive_dir {
            self.output.archive_dir = archive_dir;
        }
        if overrides.workers.is_some() {
            self.download.workers = overrides.workers;
        }
        if overrides.no_archive {
            self.output.archive = false;
        }
        self
    }

    /// Catalog client settings, failing when credentials are missing
    pub fn catalog_config(&self) -> Result<CatalogConfig, ConfigError> {
        let client_id = non_empty(&self.credentials.client_id)
            .ok_or(ConfigError::MissingCredential("client ID (SPOTIFY_CLIENT)"))?;
        let client_secret = non_empty(&self.credentials.client_secret)
            .ok_or(ConfigError::MissingCredential("client secret (SPOTIFY_SECRET)"))?;

        let mut catalog = CatalogConfig::new(client_id, client_secret);
        catalog.api_base = self.catalog.api_base.trim_end_matches('/').to_string();
        catalog.accounts_base = self.catalog.accounts_base.trim_end_matches('/').to_string();
        Ok(catalog)
    }

    /// Check everything a run needs and freeze it into [`RunSettings`].
    ///
    /// Creates the output root so that an unwritable location fails here
    /// rather than once per track.
    pub fn validate(&self) -> Result<RunSettings, ConfigError> {
        let catalog = self.catalog_config()?;

        let workers = match self.download.workers {
            Some(0) => return Err(ConfigError::InvalidWorkers),
            Some(n) => n,
            None => crate::batch::default_workers(),
        };

        let output_root = self.output.root.clone();
        ensure_writable(&output_root)?;

        let archive_dir = if self.output.archive {
            let archive_dir = self.output.archive_dir.clone();
            if is_within(&archive_dir, &output_root) {
                return Err(ConfigError::ArchiveInsideOutput(archive_dir));
            }
            Some(archive_dir)
        } else {
            None
        };

        Ok(RunSettings {
            catalog,
            output_root,
            archive_dir,
            workers,
            ytdlp_path: self.download.ytdlp_path.clone(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn ensure_writable(dir: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir).map_err(|e| ConfigError::OutputRoot(dir.to_path_buf(), e))?;

    let marker = dir.join(".spotsnake-write-test");
    std::fs::write(&marker, b"").map_err(|e| ConfigError::OutputRoot(dir.to_path_buf(), e))?;
    let _ = std::fs::remove_file(&marker);
    Ok(())
}

/// Whether `path` is `parent` or somewhere below it (lexically)
fn is_within(path: &Path, parent: &Path) -> bool {
    let absolute = |p: &Path| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());
    absolute(path).starts_with(absolute(parent))
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spotsnake"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the standard location.
///
/// A missing file means defaults. A file that exists but can't be read or
/// parsed is an error, since it usually holds the credentials.
pub fn load() -> Result<Config, ConfigError> {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Ok(Config::default());
    };
    load_from(&path)
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Missing catalog {0}")]
    MissingCredential(&'static str),

    #[error("Output directory {0} is not writable: {1}")]
    OutputRoot(PathBuf, std::io::Error),

    #[error("Archive directory {0} must not be inside the output directory")]
    ArchiveInsideOutput(PathBuf),

    #[error("Worker count must be at least 1")]
    InvalidWorkers,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn with_credentials() -> Config {
        Config::default().apply(Overrides {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[output]"));
        assert!(toml.contains("[catalog]"));

        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.output.root, config.output.root);
        assert_eq!(parsed.output.archive, config.output.archive);
        assert_eq!(parsed.catalog.api_base, config.catalog.api_base);
        assert!(parsed.credentials.client_id.is_none());
        assert!(parsed.download.workers.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[credentials]
client_id = "abc"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.credentials.client_id.as_deref(), Some("abc"));
        assert!(config.credentials.client_secret.is_none());
        assert_eq!(config.output.root, PathBuf::from("downloads"));
        assert!(config.output.archive);
        assert_eq!(config.catalog.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_debug_hides_credentials() {
        let debug = format!("{:?}", with_credentials());
        assert!(!debug.contains("secret\""));
        assert!(debug.contains("<set>"));
    }

    #[test]
    fn test_overrides_win() {
        let config = with_credentials().apply(Overrides {
            output: Some("/tmp/elsewhere".into()),
            workers: Some(3),
            no_archive: true,
            ..Default::default()
        });

        assert_eq!(config.credentials.client_id.as_deref(), Some("id"));
        assert_eq!(config.output.root, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.download.workers, Some(3));
        assert!(!config.output.archive);
    }

    #[test]
    fn test_missing_credentials_are_fatal() {
        let result = Config::default().catalog_config();
        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));

        let blank = Config::default().apply(Overrides {
            client_id: Some("  ".into()),
            client_secret: Some("secret".into()),
            ..Default::default()
        });
        assert!(blank.catalog_config().is_err());
    }

    #[test]
    fn test_validate_creates_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = with_credentials().apply(Overrides {
            output: Some(dir.path().join("out")),
            archive_dir: Some(dir.path().join("zips")),
            workers: Some(2),
            ..Default::default()
        });

        let settings = config.validate().unwrap();
        assert!(dir.path().join("out").is_dir());
        assert_eq!(settings.workers, 2);
        assert_eq!(settings.archive_dir, Some(dir.path().join("zips")));
    }

    #[test]
    fn test_unwritable_output_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"").unwrap();

        let config = with_credentials().apply(Overrides {
            output: Some(file.join("out")),
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutputRoot(_, _))
        ));
    }

    #[test]
    fn test_archive_inside_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = with_credentials().apply(Overrides {
            output: Some(dir.path().to_path_buf()),
            archive_dir: Some(dir.path().join("zips")),
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ArchiveInsideOutput(_))
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = with_credentials().apply(Overrides {
            output: Some(dir.path().join("out")),
            workers: Some(0),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorkers)));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "credentials = [not valid").unwrap();

        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_, _))));
        assert!(load_from(&dir.path().join("missing.toml")).is_ok());
    }
}
