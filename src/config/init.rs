// ABOUTME: Config scaffolding for new installations.
// ABOUTME: Creates a commented deploylog.yml template.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, DEFAULT_LISTEN};

/// Write a template config into `dir`, returning its path.
pub fn init_config(dir: &Path, state_dir: Option<&Path>, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, generate_template_yaml(state_dir))?;
    Ok(config_path)
}

fn generate_template_yaml(state_dir: Option<&Path>) -> String {
    let state_dir_line = match state_dir {
        Some(dir) => format!("state_dir: {}", dir.display()),
        None => "# state_dir: /var/lib/deploylog".to_string(),
    };

    format!(
        r#"# Address the history dashboard listens on
listen: {DEFAULT_LISTEN}

# Where channel deploy logs are kept (default: $XDG_STATE_HOME/deploylog)
{state_dir_line}

# Store backend: file or memory
store: file

# Offset used when rendering times, e.g. UTC or +02:00
display_offset: UTC
"#
    )
}
