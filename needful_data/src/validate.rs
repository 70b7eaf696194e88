use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for a macro library or settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateName { name: String },
    EmptyName { context: String },
    InvalidValue { context: String },
    MissingPlaceholder { placeholder: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateName { name } => {
                write!(f, "duplicate macro name '{name}' (/runmacro and `run` need unique names)")
            },
            ValidationError::EmptyName { context } => {
                write!(f, "empty name ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
            ValidationError::MissingPlaceholder { placeholder } => {
                write!(f, "{placeholder} must be present in the craft loop template")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a macro library for names that cannot be resolved and out-of-range craft loop counts.
///
/// ```
/// use needful_data::{MacroDef, MacroLibrary, validate_library};
///
/// let library = MacroLibrary {
///     macros: vec![MacroDef::new("a", "/echo a"), MacroDef::new("b", "/echo b")],
///     ..MacroLibrary::default()
/// };
/// assert!(validate_library(&library).is_empty());
/// ```
pub fn validate_library(library: &MacroLibrary) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for folder in &library.folders {
        check_folder_names(folder, &mut errors);
    }

    for def in library.all_macros() {
        if def.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName {
                context: "macro".to_string(),
            });
            continue;
        }
        if !seen.insert(def.name.as_str()) && reported.insert(def.name.as_str()) {
            errors.push(ValidationError::DuplicateName { name: def.name.clone() });
        }
        if def.craft_loop && !(-1..=999).contains(&def.craft_loop_count) {
            errors.push(ValidationError::InvalidValue {
                context: format!(
                    "macro '{}' craft loop count {} outside -1..=999",
                    def.name, def.craft_loop_count
                ),
            });
        }
    }
    errors
}

fn check_folder_names(folder: &FolderDef, errors: &mut Vec<ValidationError>) {
    if folder.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName {
            context: "folder".to_string(),
        });
    }
    for child in &folder.folders {
        check_folder_names(child, errors);
    }
}

/// Check settings values the options pane would have clamped or flagged.
pub fn validate_settings(settings: &Settings) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if settings.max_timeout_retries > 10 {
        errors.push(ValidationError::InvalidValue {
            context: format!("max_timeout_retries {} exceeds 10", settings.max_timeout_retries),
        });
    }
    if settings.use_craft_loop_template && !settings.craft_loop_template.contains(MACRO_PLACEHOLDER) {
        errors.push(ValidationError::MissingPlaceholder {
            placeholder: MACRO_PLACEHOLDER,
        });
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_reported_once() {
        let library = MacroLibrary {
            macros: vec![MacroDef::new("dup", "")],
            folders: vec![FolderDef {
                name: "f".into(),
                macros: vec![MacroDef::new("dup", ""), MacroDef::new("dup", "")],
                folders: Vec::new(),
            }],
        };
        let errors = validate_library(&library);
        assert_eq!(errors, vec![ValidationError::DuplicateName { name: "dup".into() }]);
    }

    #[test]
    fn empty_names_and_bad_counts_flagged() {
        let library = MacroLibrary {
            macros: vec![MacroDef::new(" ", ""), MacroDef::new("x", "").with_craft_loop(-5)],
            folders: vec![FolderDef::default()],
        };
        let errors = validate_library(&library);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidValue { .. })));
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::EmptyName { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn template_without_macro_placeholder_flagged() {
        let settings = Settings {
            use_craft_loop_template: true,
            craft_loop_template: "/craft {{count}}\n/loop".into(),
            ..Settings::default()
        };
        assert_eq!(
            validate_settings(&settings),
            vec![ValidationError::MissingPlaceholder {
                placeholder: MACRO_PLACEHOLDER
            }]
        );
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_empty());
    }
}
