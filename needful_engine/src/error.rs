use needful_data::LookupError;
use needful_script::MacroSyntaxError;
use thiserror::Error;

use crate::context::ContextError;

/// A command that could not complete at run time. Stops the engine.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    #[error("click not found: {0}")]
    ClickNotFound(String),
    #[error("could not find target: {0}")]
    TargetNotFound(String),
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),
    #[error("/recipe cannot be used while the Synthesis window is open")]
    SynthesisOpen,
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("did not receive a timely response for \"{name}\" after {attempts} attempt(s)")]
    ActionTimeout { name: String, attempts: u32 },
    #[error("{what} not met within {waited_ms} ms")]
    RequirementTimeout { what: String, waited_ms: u64 },
    #[error("addon \"{name}\" not ready within {waited_ms} ms")]
    AddonTimeout { name: String, waited_ms: u64 },
    #[error("runmacro: {0}")]
    MacroLookup(#[from] LookupError),
    #[error("runmacro: {0}")]
    Syntax(#[from] MacroSyntaxError),
    #[error(transparent)]
    Context(#[from] ContextError),
    /// An immediate stop interrupted the command. Never reported as a failure.
    #[error("cancelled")]
    Cancelled,
}

impl CommandError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled)
    }
}

/// Failure to queue a macro. Nothing is enqueued when this is returned.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("syntax error in \"{name}\": {source}")]
    Syntax {
        name: String,
        #[source]
        source: MacroSyntaxError,
    },
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("the engine has shut down")]
    ShutDown,
}
