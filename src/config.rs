use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct NormalizerConfig {
    /// Directory normalized snapshots are written to. Defaults to the
    /// input file's directory.
    pub output_dir: Option<PathBuf>,
    /// Pretty-print the normalized JSON output.
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    /// Loads `config.toml` from the working directory. A missing file is
    /// not an error; the defaults apply and CLI flags override either way.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(_) => return Ok(Config::default()),
        };

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
