//! Settings and macro library loaders.
//!
//! Both files are optional. A file that is missing or fails to parse is
//! logged and replaced with defaults so the engine can always start. Values
//! that parse but make no sense are reported through `warn!` and kept.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use needful_data::{MacroLibrary, Settings, validate_library, validate_settings};

use crate::data_paths::data_path;

pub const SETTINGS_FILE: &str = "settings.toml";
pub const LIBRARY_FILE: &str = "macros.toml";

/// Settings and saved macros, as loaded at start-up.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub library: MacroLibrary,
}

/// Load both files from the resolved data directory.
pub fn load_config() -> Config {
    Config {
        settings: load_settings(&data_path(SETTINGS_FILE)),
        library: load_library(&data_path(LIBRARY_FILE)),
    }
}

/// Loads settings from a TOML file, falling back to defaults on error.
///
/// # Logging
/// - `info!` on successful load
/// - `warn!` if the file cannot be read or parsed, and for each validation problem
pub fn load_settings(toml_path: &Path) -> Settings {
    match try_load_settings(toml_path) {
        Ok(settings) => {
            info!("settings loaded from '{}'", toml_path.display());
            for problem in validate_settings(&settings) {
                warn!("settings: {problem}");
            }
            settings
        },
        Err(e) => {
            warn!(
                "Could not load settings from '{}': {:#}. Using defaults.",
                toml_path.display(),
                e
            );
            Settings::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn try_load_settings(toml_path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading settings from '{}'", toml_path.display()))?;
    let settings = toml::from_str(&text).with_context(|| format!("parsing settings from '{}'", toml_path.display()))?;
    Ok(settings)
}

/// Loads the saved macro library, falling back to an empty library on error.
pub fn load_library(toml_path: &Path) -> MacroLibrary {
    match try_load_library(toml_path) {
        Ok(library) => {
            info!(
                "{} macros loaded from '{}'",
                library.all_macros().len(),
                toml_path.display()
            );
            for problem in validate_library(&library) {
                warn!("macro library: {problem}");
            }
            library
        },
        Err(e) => {
            warn!(
                "Could not load macros from '{}': {:#}. Starting with an empty library.",
                toml_path.display(),
                e
            );
            MacroLibrary::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn try_load_library(toml_path: &Path) -> Result<MacroLibrary> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading macro library from '{}'", toml_path.display()))?;
    let library =
        toml::from_str(&text).with_context(|| format!("parsing macro library from '{}'", toml_path.display()))?;
    Ok(library)
}
