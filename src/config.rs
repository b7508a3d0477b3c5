use crate::error::ReportError;
use crate::extract::DEFAULT_COUNTER_PATTERN;
use serde::Deserialize;
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "parse.toml";

/// Top-level configuration loaded from parse.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Regex with a name group and a value group.
    pub counter_pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub transpose: bool,
}

// --- Default implementations ---

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            counter_pattern: DEFAULT_COUNTER_PATTERN.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { transpose: true }
    }
}

/// Load config from `path`.
///
/// A missing file yields the defaults unless `required` is set, in which
/// case it is an error. A file that exists but does not parse is always an
/// error.
pub fn load_config(path: &Path, required: bool) -> Result<ReportConfig, ReportError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ReportConfig::default());
        }
        Err(e) => return Err(ReportError::io(path, e)),
    };

    toml::from_str(&contents).map_err(|e| ReportError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
