#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const NEEDFUL_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod active_macro;
pub mod config;
pub mod console;
pub mod context;
pub mod control;
pub mod data_paths;
pub mod engine;
pub mod error;
pub mod exec;
pub mod repl;
pub mod style;
pub mod timer;

// Re-exports for convenience
pub use active_macro::{ActiveMacro, prepare_macro};
pub use config::{Config, load_config, load_library, load_settings};
pub use console::ConsoleContext;
pub use context::{ContextError, CraftStats, MacroContext, RecipeEntry, TargetId};
pub use engine::{LoopState, MacroEngine, QueuedMacro};
pub use error::{CommandError, EngineError};
pub use repl::run_repl;
pub use timer::{PollOutcome, SleepOutcome, StopSignal, Timer};
