//! Parsed macro commands.

use std::fmt;

use crate::keys::KeyCombo;
use crate::modifiers::{Condition, WaitSpec};

/// One executable line of a macro.
///
/// Fields shared by every kind live here; the arguments of each verb live in [`CommandKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    text: String,
    wait: WaitSpec,
    max_wait_ms: u64,
    index: Option<u32>,
    echo: bool,
    kind: CommandKind,
}

/// The closed set of things a macro line can do.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Action {
        name: String,
        unsafe_action: bool,
        condition: Option<Condition>,
    },
    Click {
        name: String,
    },
    Send(KeyCombo),
    Hold(KeyCombo),
    Release(KeyCombo),
    Target {
        name: String,
    },
    /// Recipe names are stored lowercased for case-insensitive lookup.
    Recipe {
        name: String,
    },
    Item {
        name: String,
        hq: bool,
    },
    Require {
        status: String,
    },
    RequireQuality {
        quality: u32,
    },
    RequireRepair,
    RequireSpiritbond {
        within: Option<f32>,
    },
    RequireStats {
        craftsmanship: u32,
        control: u32,
        cp: u32,
    },
    /// `count == None` loops forever.
    Loop {
        count: Option<u32>,
    },
    Craft {
        count: u32,
    },
    Wait,
    RunMacro {
        name: String,
    },
    WaitAddon {
        name: String,
    },
    /// A line handed to the game's own text command handler.
    Native {
        line: String,
    },
}

impl Command {
    pub fn new(text: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            text: text.into(),
            wait: WaitSpec::default(),
            max_wait_ms: crate::DEFAULT_MAX_WAIT_MS,
            index: None,
            echo: false,
            kind,
        }
    }

    #[must_use]
    pub fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub fn with_max_wait(mut self, ms: u64) -> Self {
        self.max_wait_ms = ms;
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: Option<u32>) -> Self {
        self.index = index;
        self
    }

    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// The original line, modifiers included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn wait(&self) -> WaitSpec {
        self.wait
    }

    pub fn max_wait_ms(&self) -> u64 {
        self.max_wait_ms
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// `/loop` and `/craft` are the only points where latched pause/stop requests apply.
    pub fn is_loop_boundary(&self) -> bool {
        matches!(self.kind, CommandKind::Loop { .. } | CommandKind::Craft { .. })
    }

    /// Lowercase verb used in log lines and the help listing.
    pub fn verb(&self) -> &'static str {
        self.kind.verb()
    }
}

impl CommandKind {
    pub fn verb(&self) -> &'static str {
        match self {
            CommandKind::Action { .. } => "action",
            CommandKind::Click { .. } => "click",
            CommandKind::Send(_) => "send",
            CommandKind::Hold(_) => "hold",
            CommandKind::Release(_) => "release",
            CommandKind::Target { .. } => "target",
            CommandKind::Recipe { .. } => "recipe",
            CommandKind::Item { .. } => "item",
            CommandKind::Require { .. } => "require",
            CommandKind::RequireQuality { .. } => "requirequality",
            CommandKind::RequireRepair => "requirerepair",
            CommandKind::RequireSpiritbond { .. } => "requirespiritbond",
            CommandKind::RequireStats { .. } => "requirestats",
            CommandKind::Loop { .. } => "loop",
            CommandKind::Craft { .. } => "craft",
            CommandKind::Wait => "wait",
            CommandKind::RunMacro { .. } => "runmacro",
            CommandKind::WaitAddon { .. } => "waitaddon",
            CommandKind::Native { .. } => "native",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
