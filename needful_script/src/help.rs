//! Reference text for the macro verbs and modifiers, shown by `help` in the REPL
//! and by `needful_script verbs`.

/// A macro verb with its alias, accepted modifiers, and examples.
#[derive(Debug, Clone, Copy)]
pub struct VerbHelp {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub description: &'static str,
    pub modifiers: &'static [&'static str],
    pub examples: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct ModifierHelp {
    pub name: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

pub const VERBS: &[VerbHelp] = &[
    VerbHelp {
        name: "action",
        alias: Some("ac"),
        description: "Execute an action and wait for the server to respond.",
        modifiers: &["wait", "unsafe", "condition"],
        examples: &["/ac Groundwork", "/ac \"Tricks of the Trade\""],
    },
    VerbHelp {
        name: "click",
        alias: None,
        description: "Click a pre-defined button in an addon or window.",
        modifiers: &["wait"],
        examples: &["/click synthesize"],
    },
    VerbHelp {
        name: "craft",
        alias: Some("gate"),
        description: "Placed at the start of a macro ending in /loop. Allows a number of passes before ending the macro.",
        modifiers: &["echo", "wait"],
        examples: &["/craft 10"],
    },
    VerbHelp {
        name: "loop",
        alias: None,
        description: "Loop the current macro forever, or a certain amount of times.",
        modifiers: &["wait", "echo"],
        examples: &["/loop", "/loop 5"],
    },
    VerbHelp {
        name: "recipe",
        alias: None,
        description: "Open the recipe book to a specific recipe.",
        modifiers: &["wait"],
        examples: &["/recipe \"Tsai tou Vounou\""],
    },
    VerbHelp {
        name: "require",
        alias: None,
        description: "Require a certain effect to be present before continuing.",
        modifiers: &["wait", "maxwait"],
        examples: &["/require \"Well Fed\""],
    },
    VerbHelp {
        name: "requirequality",
        alias: None,
        description: "Require a certain amount of quality before continuing.",
        modifiers: &["wait", "maxwait"],
        examples: &["/requirequality 3000"],
    },
    VerbHelp {
        name: "requirerepair",
        alias: None,
        description: "Pause while an equipped item is at zero durability.",
        modifiers: &["wait", "maxwait"],
        examples: &["/requirerepair"],
    },
    VerbHelp {
        name: "requirespiritbond",
        alias: None,
        description: "Pause while an item is ready for materia extraction. An optional argument keeps going while the next highest spiritbond is at least that value.",
        modifiers: &["wait", "maxwait"],
        examples: &["/requirespiritbond", "/requirespiritbond 99.5"],
    },
    VerbHelp {
        name: "requirestats",
        alias: None,
        description: "Require craftsmanship, control and CP of at least the given values.",
        modifiers: &["wait", "maxwait"],
        examples: &["/requirestats 2700 2600 500"],
    },
    VerbHelp {
        name: "item",
        alias: None,
        description: "Use an item, stopping the macro if the item is not present.",
        modifiers: &["hq", "wait"],
        examples: &["/item Calamari Ripieni", "/item Calamari Ripieni <hq> <wait.3>"],
    },
    VerbHelp {
        name: "runmacro",
        alias: None,
        description: "Start a saved macro from within another macro.",
        modifiers: &["wait"],
        examples: &["/runmacro \"Sub macro\""],
    },
    VerbHelp {
        name: "send",
        alias: None,
        description: "Send a keystroke with optional modifier keys. The last key is the primary key.",
        modifiers: &["wait"],
        examples: &["/send MULTIPLY", "/send CONTROL+MENU+SHIFT+NUMPAD0"],
    },
    VerbHelp {
        name: "hold",
        alias: None,
        description: "Hold a keystroke down, with optional modifier keys.",
        modifiers: &["wait"],
        examples: &["/hold SHIFT+W"],
    },
    VerbHelp {
        name: "release",
        alias: None,
        description: "Release a held keystroke, with optional modifier keys.",
        modifiers: &["wait"],
        examples: &["/release SHIFT+W"],
    },
    VerbHelp {
        name: "target",
        alias: None,
        description: "Target anyone and anything that can be selected.",
        modifiers: &["wait", "index"],
        examples: &["/target Eirikur", "/target Moyce <index.2>"],
    },
    VerbHelp {
        name: "waitaddon",
        alias: None,
        description: "Wait for an addon (a UI window) to be present and ready.",
        modifiers: &["wait", "maxwait"],
        examples: &["/waitaddon RecipeNote"],
    },
    VerbHelp {
        name: "wait",
        alias: None,
        description: "The same as the wait modifier, but as a command.",
        modifiers: &[],
        examples: &["/wait 1-5"],
    },
];

pub const MODIFIERS: &[ModifierHelp] = &[
    ModifierHelp {
        name: "wait",
        description: "Wait a fixed time, or a random time within a range, after the command.",
        examples: &["/ac Groundwork <wait.3>", "/ac Groundwork <wait.1.5-5.5>"],
    },
    ModifierHelp {
        name: "maxwait",
        description: "Maximum time to wait for a state to be reached. Defaults to 5 seconds.",
        examples: &["/waitaddon RecipeNote <maxwait.10>"],
    },
    ModifierHelp {
        name: "condition",
        description: "Only perform the action under the given crafting condition(s).",
        examples: &["/ac Observe <condition.poor>", "/ac \"Byregot's Blessing\" <condition.not.poor>"],
    },
    ModifierHelp {
        name: "unsafe",
        description: "Do not wait for the server to acknowledge the action.",
        examples: &["/ac \"Tricks of the Trade\" <unsafe>"],
    },
    ModifierHelp {
        name: "echo",
        description: "Echo the number of loops or crafts remaining.",
        examples: &["/loop 5 <echo>"],
    },
    ModifierHelp {
        name: "index",
        description: "Pick among several objects with the same name.",
        examples: &["/target abc <index.5>"],
    },
    ModifierHelp {
        name: "hq",
        description: "Use the high quality version of an item.",
        examples: &["/item Calamari Ripieni <hq>"],
    },
];

/// Find help for a verb by name or alias.
pub fn verb_help(name: &str) -> Option<&'static VerbHelp> {
    let name = name.trim_start_matches('/').to_lowercase();
    VERBS.iter().find(|v| v.name == name || v.alias == Some(name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MacroParser;

    #[test]
    fn every_example_parses() {
        let parser = MacroParser::default();
        for verb in VERBS {
            for example in verb.examples {
                assert!(parser.parse_line(example).is_ok(), "{example}");
            }
        }
        for modifier in MODIFIERS {
            for example in modifier.examples {
                assert!(parser.parse_line(example).is_ok(), "{example}");
            }
        }
    }

    #[test]
    fn lookup_by_alias() {
        assert_eq!(verb_help("/gate").map(|v| v.name), Some("craft"));
        assert!(verb_help("bogus").is_none());
    }
}
