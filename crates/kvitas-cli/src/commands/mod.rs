//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod detect;
pub mod process;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use kvitas_core::KvitasConfig;

/// Path argument meaning "read from standard input".
const STDIN_PATH: &str = "-";

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kvitas")
        .join("config.json")
}

/// Load configuration from `config_path`, falling back to the user
/// configuration file and then to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<KvitasConfig> {
    if let Some(path) = config_path {
        return Ok(KvitasConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(KvitasConfig::from_file(&path)?)
    } else {
        Ok(KvitasConfig::default())
    }
}

/// Read receipt text from a file, or from stdin when `input` is `-`.
pub fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new(STDIN_PATH) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}
