//! needful_script: the line-oriented macro language.
//!
//! A macro is a list of lines, one directive per line:
//! - `/ac "Basic Synthesis" <wait.3>` runs an action, then waits three seconds
//! - `/waitaddon "Synthesis" <maxwait.10>` polls for a window
//! - `/loop 5 <echo>` rewinds to the top five times
//! - anything the game understands natively (`/echo`, `/p`, ...) is passed through
//!
//! [`MacroParser`] turns text into [`Command`]s. Modifiers (`<...>`) are pulled
//! out first by [`extract_modifiers`], then the verb is matched. The
//! [`craft_loop`] module wraps a macro body in crafting boilerplate before it
//! is parsed.

#![warn(clippy::pedantic)]

pub mod command;
pub mod craft_loop;
mod error;
pub mod help;
pub mod keys;
pub mod modifiers;
mod parser;

pub use command::{Command, CommandKind};
pub use craft_loop::{CraftLoopTemplate, Rewrite, RewriteWarning, replace_last_loop, rewrite};
pub use error::{MacroSyntaxError, SyntaxError};
pub use keys::{KeyCombo, VirtualKey};
pub use modifiers::{Condition, DEFAULT_MAX_WAIT_MS, Modifiers, WaitSpec, extract_modifiers};
pub use parser::{MacroParser, ParseOptions, unquote};
