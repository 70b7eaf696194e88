use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder replaced with the macro body by the craft-loop template.
pub const MACRO_PLACEHOLDER: &str = "{{macro}}";
/// Placeholder replaced with the loop count by the craft-loop template.
pub const COUNT_PLACEHOLDER: &str = "{{count}}";

/// Template used when `use_craft_loop_template` is enabled and no custom template was saved.
pub const DEFAULT_CRAFT_LOOP_TEMPLATE: &str = "/craft {{count}}\n\
/waitaddon \"RecipeNote\" <maxwait.5>\n\
/click \"synthesize\"\n\
/waitaddon \"Synthesis\" <maxwait.5>\n\
{{macro}}\n\
/loop";

/// Game text commands that may be passed through verbatim.
///
/// Any `/verb` that is neither a structured macro command nor listed here is rejected at parse time.
pub const DEFAULT_NATIVE_COMMANDS: &[&str] = &[
    "action", "alliance", "a", "assist", "as", "bm", "clearlog", "clog", "e", "echo", "em", "emote", "fc",
    "focustarget", "ft", "freecompany", "gearset", "gs", "l", "linkshell", "macrocancel", "macroerror",
    "macroicon", "micon", "macrolock", "mlock", "marking", "mk", "minion", "mount", "p", "party", "s", "say",
    "sh", "shout", "statusoff", "t", "tell", "targetenemy", "tenemy", "targetnpc", "tnpc", "y", "yell",
];

/// A single saved macro as stored in the macro library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDef {
    pub name: String,
    #[serde(default)]
    pub contents: String,
    /// Wrap the body with craft-loop boilerplate before parsing.
    #[serde(default)]
    pub craft_loop: bool,
    /// Craft-loop count: `0` disables the wrap, `-1` loops forever.
    #[serde(default)]
    pub craft_loop_count: i32,
}

impl MacroDef {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            craft_loop: false,
            craft_loop_count: 0,
        }
    }

    /// Enable the craft loop for this macro with the given count.
    #[must_use]
    pub fn with_craft_loop(mut self, count: i32) -> Self {
        self.craft_loop = true;
        self.craft_loop_count = count;
        self
    }
}

/// A named folder of macros and nested folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDef {
    pub name: String,
    #[serde(default)]
    pub macros: Vec<MacroDef>,
    #[serde(default)]
    pub folders: Vec<FolderDef>,
}

/// The persisted tree of saved macros.
///
/// The root level holds loose macros and top-level folders, mirroring the
/// layout of `macros.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroLibrary {
    #[serde(default)]
    pub macros: Vec<MacroDef>,
    #[serde(default)]
    pub folders: Vec<FolderDef>,
}

impl MacroLibrary {
    /// All macros in the library, depth-first, root macros before folder contents.
    pub fn all_macros(&self) -> Vec<&MacroDef> {
        let mut found = Vec::new();
        found.extend(self.macros.iter());
        for folder in &self.folders {
            collect_folder(folder, &mut found);
        }
        found
    }

    /// Every macro whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Vec<&MacroDef> {
        self.all_macros().into_iter().filter(|m| m.name == name).collect()
    }

    /// Resolve a macro by name, requiring the name to be unique across the library.
    ///
    /// # Errors
    /// Returns [`LookupError::NotFound`] or [`LookupError::Ambiguous`].
    pub fn find_unique(&self, name: &str) -> Result<&MacroDef, LookupError> {
        let found = self.find_by_name(name);
        match found.as_slice() {
            [] => Err(LookupError::NotFound(name.to_string())),
            [single] => Ok(single),
            many => Err(LookupError::Ambiguous {
                name: name.to_string(),
                count: many.len(),
            }),
        }
    }
}

fn collect_folder<'a>(folder: &'a FolderDef, found: &mut Vec<&'a MacroDef>) {
    found.extend(folder.macros.iter());
    for child in &folder.folders {
        collect_folder(child, found);
    }
}

/// Failure to resolve a macro by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound(String),
    Ambiguous { name: String, count: usize },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound(name) => write!(f, "no macro named \"{name}\""),
            LookupError::Ambiguous { name, count } => {
                write!(f, "{count} macros are named \"{name}\", the name must be unique")
            },
        }
    }
}

impl std::error::Error for LookupError {}

/// User-facing engine options, loaded from `settings.toml`.
///
/// Every field has a default so a partial (or missing) file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Skip crafting actions when not crafting.
    pub craft_skip: bool,
    /// Wait for crafting actions to complete instead of honoring `<wait>` and `<unsafe>`.
    pub smart_wait: bool,
    /// Skip quality increasing actions when the HQ chance is already 100%.
    pub quality_skip: bool,
    /// Treat `/loop N` as the total number of iterations rather than the number of repeats.
    pub loop_total: bool,
    /// Always echo the remaining count on `/loop` and `/craft`.
    pub loop_echo: bool,
    /// Re-attempts of an action that did not receive a timely response (0-10).
    pub max_timeout_retries: u32,
    pub use_craft_loop_template: bool,
    pub craft_loop_template: String,
    /// Built-in craft loop starts from the crafting log instead of the synthesis window.
    pub craft_loop_from_recipe_note: bool,
    pub craft_loop_echo: bool,
    /// `<maxwait>` (seconds) applied to the built-in craft loop `/waitaddon` lines.
    pub craft_loop_max_wait: u32,
    pub noisy_errors: bool,
    pub beep_frequency: u32,
    pub beep_duration: u32,
    pub beep_count: u32,
    /// Resolve `/target` through the engine instead of passing it to the game.
    pub use_engine_targeting: bool,
    pub stop_macro_if_target_not_found: bool,
    pub native_commands: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            craft_skip: true,
            smart_wait: false,
            quality_skip: true,
            loop_total: false,
            loop_echo: false,
            max_timeout_retries: 0,
            use_craft_loop_template: false,
            craft_loop_template: DEFAULT_CRAFT_LOOP_TEMPLATE.to_string(),
            craft_loop_from_recipe_note: true,
            craft_loop_echo: false,
            craft_loop_max_wait: 5,
            noisy_errors: false,
            beep_frequency: 900,
            beep_duration: 250,
            beep_count: 3,
            use_engine_targeting: true,
            stop_macro_if_target_not_found: true,
            native_commands: DEFAULT_NATIVE_COMMANDS.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MacroLibrary {
        MacroLibrary {
            macros: vec![MacroDef::new("root", "/echo root")],
            folders: vec![FolderDef {
                name: "Crafting".into(),
                macros: vec![MacroDef::new("craft", "/ac Groundwork")],
                folders: vec![FolderDef {
                    name: "Nested".into(),
                    macros: vec![MacroDef::new("craft", "/ac Observe"), MacroDef::new("deep", "/loop")],
                    folders: Vec::new(),
                }],
            }],
        }
    }

    #[test]
    fn all_macros_walks_folders_depth_first() {
        let lib = library();
        let names: Vec<_> = lib.all_macros().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["root", "craft", "craft", "deep"]);
    }

    #[test]
    fn find_unique_resolves_single_match() {
        let lib = library();
        assert_eq!(lib.find_unique("deep").unwrap().contents, "/loop");
    }

    #[test]
    fn find_unique_reports_missing_and_ambiguous() {
        let lib = library();
        assert_eq!(lib.find_unique("nope"), Err(LookupError::NotFound("nope".into())));
        assert_eq!(
            lib.find_unique("craft"),
            Err(LookupError::Ambiguous {
                name: "craft".into(),
                count: 2
            })
        );
    }

    #[test]
    fn partial_settings_fall_back_to_defaults() {
        let settings: Settings = toml::from_str("smart_wait = true\nmax_timeout_retries = 3").unwrap();
        assert!(settings.smart_wait);
        assert_eq!(settings.max_timeout_retries, 3);
        assert!(settings.craft_skip);
        assert_eq!(settings.craft_loop_template, DEFAULT_CRAFT_LOOP_TEMPLATE);
        assert!(settings.native_commands.iter().any(|c| c == "echo"));
    }

    #[test]
    fn library_reads_nested_folders_from_toml() {
        let src = r#"
[[macros]]
name = "loose"
contents = "/echo hi"

[[folders]]
name = "Crafting"

[[folders.macros]]
name = "quick synth"
contents = "/ac \"Basic Synthesis\""
craft_loop = true
craft_loop_count = 10
"#;
        let lib: MacroLibrary = toml::from_str(src).unwrap();
        let quick = lib.find_unique("quick synth").unwrap();
        assert!(quick.craft_loop);
        assert_eq!(quick.craft_loop_count, 10);
        assert_eq!(lib.all_macros().len(), 2);
    }
}
