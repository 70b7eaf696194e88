//! Craft-loop rewriting.
//!
//! A macro flagged for craft looping is wrapped in the boilerplate that moves
//! between the crafting log and the synthesis window, so the saved macro only
//! holds the crafting actions themselves.

use std::fmt;

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use needful_data::{COUNT_PLACEHOLDER, MACRO_PLACEHOLDER, Settings};

lazy_static! {
    static ref LOOP_LINE_RE: Regex = Regex::new(r"(?i)^\s*/loop(?:\s|<|$)").expect("loop line regex");
    static ref MODIFIER_TOKEN_RE: Regex = Regex::new(r"<[^>]*>").expect("modifier token regex");
}

/// Count substituted for `{{count}}` in a custom template when the loop is infinite.
pub const INFINITE_TEMPLATE_COUNT: u32 = 999_999;

/// How the loop boilerplate is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftLoopTemplate {
    /// User supplied text containing `{{macro}}` and optionally `{{count}}`.
    Custom(String),
    /// The standard crafting-log / synthesis boilerplate.
    Builtin { echo: bool, max_wait_secs: u32 },
}

impl CraftLoopTemplate {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.use_craft_loop_template {
            CraftLoopTemplate::Custom(settings.craft_loop_template.clone())
        } else {
            CraftLoopTemplate::Builtin {
                echo: settings.craft_loop_echo,
                max_wait_secs: settings.craft_loop_max_wait,
            }
        }
    }
}

/// Non-fatal problems noticed while rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteWarning {
    MissingMacroPlaceholder,
}

impl fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteWarning::MissingMacroPlaceholder => {
                write!(f, "craft loop template does not contain {MACRO_PLACEHOLDER}")
            },
        }
    }
}

/// Result of [`rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub warnings: Vec<RewriteWarning>,
}

impl Rewrite {
    fn clean(text: String) -> Self {
        Self {
            text,
            warnings: Vec::new(),
        }
    }
}

/// Wrap `body` in craft-loop boilerplate.
///
/// `loop_count` of `0` leaves the body untouched and any negative count loops without a craft gate.
/// `from_crafting_log` selects whether the loop expects to start with the crafting log
/// (recipe note) or the synthesis window open. It is ignored by custom templates.
pub fn rewrite(body: &str, from_crafting_log: bool, loop_count: i32, template: &CraftLoopTemplate) -> Rewrite {
    if loop_count == 0 {
        return Rewrite::clean(body.to_string());
    }
    match template {
        CraftLoopTemplate::Custom(text) => rewrite_custom(body, loop_count, text),
        CraftLoopTemplate::Builtin { echo, max_wait_secs } => {
            Rewrite::clean(rewrite_builtin(body, from_crafting_log, loop_count, *echo, *max_wait_secs))
        },
    }
}

fn rewrite_custom(body: &str, loop_count: i32, template: &str) -> Rewrite {
    let count = u32::try_from(loop_count).unwrap_or(INFINITE_TEMPLATE_COUNT);
    let mut warnings = Vec::new();
    if !template.contains(MACRO_PLACEHOLDER) {
        warn!("craft loop template is missing {MACRO_PLACEHOLDER}; the macro body will not run");
        warnings.push(RewriteWarning::MissingMacroPlaceholder);
    }
    let text = template
        .replace(MACRO_PLACEHOLDER, body)
        .replace(COUNT_PLACEHOLDER, &count.to_string());
    Rewrite { text, warnings }
}

fn rewrite_builtin(body: &str, from_crafting_log: bool, loop_count: i32, echo: bool, max_wait_secs: u32) -> String {
    let gate = |count: i32| {
        if echo {
            format!("/craft {count} <echo>")
        } else {
            format!("/craft {count}")
        }
    };
    let click_steps = format!(
        "/waitaddon \"RecipeNote\" <maxwait.{max_wait_secs}>\n\
         /click \"synthesize\"\n\
         /waitaddon \"Synthesis\" <maxwait.{max_wait_secs}>"
    );
    let body = body.trim();

    let parts: Vec<String> = if from_crafting_log {
        match loop_count {
            n if n < 0 => vec![click_steps, body.to_string(), "/loop".into()],
            1 => vec![click_steps, body.to_string()],
            n => vec![gate(n), click_steps, body.to_string(), "/loop".into()],
        }
    } else {
        match loop_count {
            n if n < 0 => vec![body.to_string(), click_steps, "/loop".into()],
            1 => vec![body.to_string()],
            n => vec![body.to_string(), gate(n - 1), click_steps, "/loop".into()],
        }
    };
    parts.join("\n").trim().to_string()
}

/// Replace the last `/loop` line of `body` with `/loop count`, keeping its modifiers.
///
/// A body with no `/loop` line gets one appended.
pub fn replace_last_loop(body: &str, count: u32) -> String {
    let mut lines: Vec<String> = body.lines().map(str::to_string).collect();
    let target = lines.iter().rposition(|line| LOOP_LINE_RE.is_match(line));
    match target {
        Some(idx) => {
            let mods: Vec<&str> = MODIFIER_TOKEN_RE
                .find_iter(&lines[idx])
                .map(|m| m.as_str())
                .collect();
            let mut replacement = format!("/loop {count}");
            if !mods.is_empty() {
                replacement.push(' ');
                replacement.push_str(&mods.join(" "));
            }
            lines[idx] = replacement;
        },
        None => lines.push(format!("/loop {count}")),
    }
    lines.join("\n")
}
