use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_true")]
    pub colored: bool,

    #[serde(default)]
    pub verbose: bool,

    /// Extension of the files `check` picks up when given a directory.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            colored: true,
            verbose: false,
            extension: default_extension(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extension() -> String {
    "conf".to_string()
}

const CONFIG_FILES: [&str; 3] = [".confettirc", ".confettirc.toml", ".config/confettirc"];

impl Config {
    /// Load config from the first `.confettirc` found under `dir` (TOML format)
    pub fn load(dir: &Path) -> Result<Self> {
        for name in CONFIG_FILES {
            let path: PathBuf = dir.join(name);
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        // No config found, use defaults
        Ok(Config::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Merge CLI arguments into config
    pub fn merge_cli_args(&mut self, verbose: bool, no_color: bool) {
        if verbose {
            self.verbose = true;
        }

        if no_color {
            self.colored = false;
        }
    }
}
