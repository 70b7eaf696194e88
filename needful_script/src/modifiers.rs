//! Inline `<name.value>` modifiers.
//!
//! Modifiers can appear anywhere on a line and in any order. Each known
//! modifier is matched, parsed, and stripped before the command itself is
//! matched. Game placeholders such as `<t>` or `<se.1>` are not modifiers and
//! are left in the text.

use std::collections::BTreeSet;
use std::time::Duration;

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

use crate::SyntaxError;

/// Poll timeout used when a line carries no `<maxwait>`.
pub const DEFAULT_MAX_WAIT_MS: u64 = 5_000;

lazy_static! {
    static ref WAIT_RE: Regex = Regex::new(r"(?i)<wait\.([^>]*)>").expect("wait regex");
    static ref MAXWAIT_RE: Regex = Regex::new(r"(?i)<maxwait\.([^>]*)>").expect("maxwait regex");
    static ref ECHO_RE: Regex = Regex::new(r"(?i)<echo>").expect("echo regex");
    static ref UNSAFE_RE: Regex = Regex::new(r"(?i)<unsafe>").expect("unsafe regex");
    static ref HQ_RE: Regex = Regex::new(r"(?i)<hq>").expect("hq regex");
    static ref CONDITION_RE: Regex = Regex::new(r"(?i)<condition\.([^>]*)>").expect("condition regex");
    static ref INDEX_RE: Regex = Regex::new(r"(?i)<index\.([^>]*)>").expect("index regex");
    static ref SECONDS_RE: Regex = Regex::new(r"^\d+(\.\d+)?$").expect("seconds regex");
}

/// A fixed or randomized delay, in milliseconds.
///
/// `to_ms == 0` means the delay is fixed at `from_ms`; otherwise a value is
/// drawn uniformly from `[from_ms, to_ms)` each time the wait is performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitSpec {
    pub from_ms: u64,
    pub to_ms: u64,
}

impl WaitSpec {
    pub fn fixed(ms: u64) -> Self {
        Self { from_ms: ms, to_ms: 0 }
    }

    pub fn range(from_ms: u64, to_ms: u64) -> Self {
        if to_ms <= from_ms {
            Self::fixed(from_ms)
        } else {
            Self { from_ms, to_ms }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.from_ms == 0 && self.to_ms == 0
    }

    pub fn is_range(&self) -> bool {
        self.to_ms > self.from_ms
    }

    /// Draw the delay for one execution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_range() {
            Duration::from_millis(rng.random_range(self.from_ms..self.to_ms))
        } else {
            Duration::from_millis(self.from_ms)
        }
    }

    /// Parse a `N` or `N-M` body, in seconds with optional fractions.
    ///
    /// Returns `None` for non-numeric bodies and for ranges whose end is before their start.
    pub fn parse_seconds(body: &str) -> Option<Self> {
        match body.split_once('-') {
            Some((from, to)) => {
                let from = seconds_to_ms(from)?;
                let to = seconds_to_ms(to)?;
                if to < from {
                    return None;
                }
                Some(Self::range(from, to))
            },
            None => seconds_to_ms(body).map(Self::fixed),
        }
    }
}

/// Convert a decimal seconds string (`3`, `1.5`) to whole milliseconds.
pub fn seconds_to_ms(text: &str) -> Option<u64> {
    let text = text.trim();
    if !SECONDS_RE.is_match(text) {
        return None;
    }
    let secs: f64 = text.parse().ok()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some((secs * 1000.0).round() as u64)
}

/// Crafting-condition gate attached to an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Lowercased condition names.
    pub names: BTreeSet<String>,
    pub negate: bool,
}

impl Condition {
    fn parse(body: &str) -> Option<Self> {
        let body = body.trim();
        let (negate, list) = if let Some(rest) = strip_prefix_ignore_case(body, "not.") {
            (true, rest)
        } else if let Some(rest) = body.strip_prefix('!') {
            (true, rest)
        } else {
            (false, body)
        };
        let names: BTreeSet<String> = list
            .split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(Self { names, negate })
        }
    }

    /// True when an action gated by this condition should run under `current`.
    pub fn matches(&self, current: &str) -> bool {
        self.names.contains(&current.trim().to_lowercase()) != self.negate
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// Every modifier found on a single line. Absent modifiers keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub wait: WaitSpec,
    pub max_wait_ms: Option<u64>,
    pub echo: bool,
    pub unsafe_action: bool,
    pub hq: bool,
    pub condition: Option<Condition>,
    pub index: Option<u32>,
}

impl Modifiers {
    pub fn max_wait_or_default(&self) -> u64 {
        self.max_wait_ms.unwrap_or(DEFAULT_MAX_WAIT_MS)
    }
}

/// Pull every known modifier out of `text`.
///
/// Returns the parsed modifiers and the trimmed residual text. When a modifier
/// appears more than once the last occurrence wins; all occurrences are removed.
///
/// # Errors
/// Returns [`SyntaxError::MalformedModifier`] when a modifier body cannot be parsed.
pub fn extract_modifiers(text: &str) -> Result<(Modifiers, String), SyntaxError> {
    let malformed = |modifier: &'static str| SyntaxError::MalformedModifier {
        modifier,
        text: text.to_string(),
    };
    let mut mods = Modifiers::default();
    let mut rest = text.to_string();

    if let Some(body) = last_capture(&WAIT_RE, &rest) {
        mods.wait = WaitSpec::parse_seconds(&body).ok_or_else(|| malformed("wait"))?;
        rest = WAIT_RE.replace_all(&rest, "").into_owned();
    }
    if let Some(body) = last_capture(&MAXWAIT_RE, &rest) {
        mods.max_wait_ms = Some(seconds_to_ms(&body).ok_or_else(|| malformed("maxwait"))?);
        rest = MAXWAIT_RE.replace_all(&rest, "").into_owned();
    }
    if let Some(body) = last_capture(&CONDITION_RE, &rest) {
        mods.condition = Some(Condition::parse(&body).ok_or_else(|| malformed("condition"))?);
        rest = CONDITION_RE.replace_all(&rest, "").into_owned();
    }
    if let Some(body) = last_capture(&INDEX_RE, &rest) {
        mods.index = Some(body.trim().parse().map_err(|_| malformed("index"))?);
        rest = INDEX_RE.replace_all(&rest, "").into_owned();
    }
    mods.echo = strip_flag(&ECHO_RE, &mut rest);
    mods.unsafe_action = strip_flag(&UNSAFE_RE, &mut rest);
    mods.hq = strip_flag(&HQ_RE, &mut rest);

    Ok((mods, rest.trim().to_string()))
}

fn last_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn strip_flag(re: &Regex, text: &mut String) -> bool {
    if re.is_match(text) {
        *text = re.replace_all(text, "").into_owned();
        true
    } else {
        false
    }
}
