//! Line parser: modifiers first, then the verb, then the verb's arguments.

use std::collections::HashSet;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use needful_data::{DEFAULT_NATIVE_COMMANDS, Settings};

use crate::command::{Command, CommandKind};
use crate::error::{MacroSyntaxError, SyntaxError};
use crate::keys::KeyCombo;
use crate::modifiers::{Modifiers, WaitSpec, extract_modifiers};

lazy_static! {
    static ref VERB_RE: Regex = Regex::new(r"^/(\S+)\s*(.*)$").expect("verb regex");
    static ref COUNT_RE: Regex = Regex::new(r"^(\d+)$").expect("count regex");
    static ref DECIMAL_RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?)$").expect("decimal regex");
    static ref STATS_RE: Regex = Regex::new(r"^(\d+)\s+(\d+)\s+(\d+)$").expect("stats regex");
    static ref KEYS_RE: Regex = Regex::new(r"^(\S+)$").expect("keys regex");
    static ref WAIT_ARG_RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)$").expect("wait arg regex");
}

/// Parser configuration that does not come from the macro text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Lowercase verbs (without `/`) passed through to the game untouched.
    pub native_verbs: HashSet<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            native_verbs: DEFAULT_NATIVE_COMMANDS.iter().map(|v| (*v).to_string()).collect(),
        }
    }
}

impl ParseOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            native_verbs: settings
                .native_commands
                .iter()
                .map(|v| v.trim().trim_start_matches('/').to_lowercase())
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }
}

/// Turns macro source into [`Command`]s.
#[derive(Debug, Clone, Default)]
pub struct MacroParser {
    options: ParseOptions,
}

impl MacroParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse every line of a macro.
    ///
    /// Blank lines and `#` comments produce no command. Line endings may be `\n`, `\r\n` or `\r`.
    ///
    /// # Errors
    /// Returns the first line that fails to parse, with its 1-based line number.
    pub fn parse_macro(&self, source: &str) -> Result<Vec<Command>, MacroSyntaxError> {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        let mut commands = Vec::new();
        for (idx, line) in normalized.lines().enumerate() {
            match self.parse_line(line) {
                Ok(Some(cmd)) => commands.push(cmd),
                Ok(None) => {},
                Err(error) => return Err(MacroSyntaxError { line: idx + 1, error }),
            }
        }
        debug!("parsed {} command(s)", commands.len());
        Ok(commands)
    }

    /// Parse a single line. `Ok(None)` means the line holds nothing to execute.
    ///
    /// # Errors
    /// Returns a [`SyntaxError`] for malformed modifiers, unknown verbs, bad arguments or unknown keys.
    pub fn parse_line(&self, line: &str) -> Result<Option<Command>, SyntaxError> {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }
        let (mods, rest) = extract_modifiers(text)?;

        let kind = if rest.is_empty() {
            CommandKind::Wait
        } else if rest.starts_with('<') {
            CommandKind::Native { line: rest.clone() }
        } else if !rest.starts_with('/') {
            CommandKind::Native {
                line: format!("/e {rest}"),
            }
        } else {
            let caps = VERB_RE.captures(&rest).ok_or_else(|| SyntaxError::UnknownCommand {
                text: text.to_string(),
            })?;
            let verb = caps[1].to_lowercase();
            let args = caps[2].trim();
            self.parse_verb(&verb, args, &rest, text, &mods)?
        };

        let mut wait = mods.wait;
        if let (CommandKind::Wait, Some(arg)) = (&kind, wait_argument(&rest)) {
            wait = WaitSpec::parse_seconds(arg).ok_or_else(|| SyntaxError::InvalidArgument {
                verb: "wait",
                text: text.to_string(),
            })?;
        }

        Ok(Some(
            Command::new(text, kind)
                .with_wait(wait)
                .with_max_wait(mods.max_wait_or_default())
                .with_index(mods.index)
                .with_echo(mods.echo),
        ))
    }

    fn parse_verb(
        &self,
        verb: &str,
        args: &str,
        rest: &str,
        text: &str,
        mods: &Modifiers,
    ) -> Result<CommandKind, SyntaxError> {
        let kind = match verb {
            "action" | "ac" => CommandKind::Action {
                name: name_arg("action", args, text)?,
                unsafe_action: mods.unsafe_action,
                condition: mods.condition.clone(),
            },
            "click" => CommandKind::Click {
                name: name_arg("click", args, text)?,
            },
            "craft" | "gate" => CommandKind::Craft {
                count: number_arg("craft", &COUNT_RE, args, text)?,
            },
            "loop" => CommandKind::Loop {
                count: if args.is_empty() {
                    None
                } else {
                    Some(number_arg("loop", &COUNT_RE, args, text)?)
                },
            },
            "recipe" => CommandKind::Recipe {
                name: name_arg("recipe", args, text)?.to_lowercase(),
            },
            "require" => CommandKind::Require {
                status: name_arg("require", args, text)?,
            },
            "requirequality" => CommandKind::RequireQuality {
                quality: number_arg("requirequality", &COUNT_RE, args, text)?,
            },
            "requirerepair" => {
                no_args("requirerepair", args, text)?;
                CommandKind::RequireRepair
            },
            "requirespiritbond" => CommandKind::RequireSpiritbond {
                within: if args.is_empty() {
                    None
                } else {
                    Some(number_arg("requirespiritbond", &DECIMAL_RE, args, text)?)
                },
            },
            "requirestats" => {
                let invalid = || SyntaxError::InvalidArgument {
                    verb: "requirestats",
                    text: text.to_string(),
                };
                let caps = STATS_RE.captures(args).ok_or_else(invalid)?;
                CommandKind::RequireStats {
                    craftsmanship: caps[1].parse().map_err(|_| invalid())?,
                    control: caps[2].parse().map_err(|_| invalid())?,
                    cp: caps[3].parse().map_err(|_| invalid())?,
                }
            },
            "item" => CommandKind::Item {
                name: name_arg("item", args, text)?,
                hq: mods.hq,
            },
            "runmacro" => CommandKind::RunMacro {
                name: name_arg("runmacro", args, text)?,
            },
            "send" => CommandKind::Send(key_arg("send", args, text)?),
            "hold" => CommandKind::Hold(key_arg("hold", args, text)?),
            "release" => CommandKind::Release(key_arg("release", args, text)?),
            "target" => CommandKind::Target {
                name: name_arg("target", args, text)?,
            },
            "waitaddon" => CommandKind::WaitAddon {
                name: name_arg("waitaddon", args, text)?,
            },
            "wait" => {
                if !args.is_empty() && !WAIT_ARG_RE.is_match(args) {
                    return Err(SyntaxError::InvalidArgument {
                        verb: "wait",
                        text: text.to_string(),
                    });
                }
                CommandKind::Wait
            },
            other if self.options.native_verbs.contains(other) => CommandKind::Native { line: rest.to_string() },
            _ => {
                return Err(SyntaxError::UnknownCommand {
                    text: text.to_string(),
                });
            },
        };
        Ok(kind)
    }
}

/// Strip one pair of surrounding double quotes.
pub fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

fn name_arg(verb: &'static str, args: &str, text: &str) -> Result<String, SyntaxError> {
    let name = unquote(args).trim();
    if name.is_empty() {
        return Err(SyntaxError::InvalidArgument {
            verb,
            text: text.to_string(),
        });
    }
    Ok(name.to_string())
}

fn number_arg<T: std::str::FromStr>(verb: &'static str, re: &Regex, args: &str, text: &str) -> Result<T, SyntaxError> {
    re.captures(args)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| SyntaxError::InvalidArgument {
            verb,
            text: text.to_string(),
        })
}

fn no_args(verb: &'static str, args: &str, text: &str) -> Result<(), SyntaxError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(SyntaxError::InvalidArgument {
            verb,
            text: text.to_string(),
        })
    }
}

fn key_arg(verb: &'static str, args: &str, text: &str) -> Result<KeyCombo, SyntaxError> {
    let caps = KEYS_RE.captures(args).ok_or_else(|| SyntaxError::InvalidArgument {
        verb,
        text: text.to_string(),
    })?;
    KeyCombo::parse(&caps[1]).map_err(|key| SyntaxError::InvalidKey {
        key,
        text: text.to_string(),
    })
}

/// The `N[-M]` argument of a `/wait` line, if it has one.
fn wait_argument(rest: &str) -> Option<&str> {
    let caps = VERB_RE.captures(rest)?;
    let args = caps.get(2)?.as_str().trim();
    if args.is_empty() { None } else { Some(args) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::VirtualKey;

    fn parse(line: &str) -> Command {
        MacroParser::default().parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn click_unquotes_its_name() {
        for line in ["/click synthesize", "/click \"synthesize\"", "/CLICK   synthesize  "] {
            assert_eq!(
                parse(line).kind(),
                &CommandKind::Click {
                    name: "synthesize".into()
                }
            );
        }
    }

    #[test]
    fn send_splits_modifier_keys() {
        let cmd = parse("/send CONTROL+MENU+SHIFT+NUMPAD0");
        let CommandKind::Send(combo) = cmd.kind() else {
            panic!("expected send, got {cmd:?}");
        };
        assert_eq!(combo.primary(), VirtualKey::from_name("NUMPAD0").unwrap());
        assert_eq!(combo.modifiers().len(), 3);
    }

    #[test]
    fn unknown_key_is_a_syntax_error() {
        let err = MacroParser::default().parse_line("/hold CONTROL+WHAT").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::InvalidKey {
                key: "WHAT".into(),
                text: "/hold CONTROL+WHAT".into()
            }
        );
    }

    #[test]
    fn unknown_verb_is_a_syntax_error() {
        let err = MacroParser::default().parse_line("/bogus foo").unwrap_err();
        assert_eq!(err, SyntaxError::UnknownCommand { text: "/bogus foo".into() });
        assert_eq!(err.text(), "/bogus foo");
    }

    #[test]
    fn action_carries_gate_modifiers() {
        let cmd = parse("/ac \"Byregot's Blessing\" <condition.!poor> <unsafe> <wait.2>");
        match cmd.kind() {
            CommandKind::Action {
                name,
                unsafe_action,
                condition,
            } => {
                assert_eq!(name, "Byregot's Blessing");
                assert!(*unsafe_action);
                assert!(condition.as_ref().unwrap().negate);
            },
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cmd.wait(), WaitSpec::fixed(2000));
        assert_eq!(cmd.text(), "/ac \"Byregot's Blessing\" <condition.!poor> <unsafe> <wait.2>");
    }

    #[test]
    fn loop_and_craft_counts() {
        assert_eq!(parse("/loop").kind(), &CommandKind::Loop { count: None });
        assert_eq!(parse("/loop 5 <echo>").kind(), &CommandKind::Loop { count: Some(5) });
        assert!(parse("/loop 5 <echo>").echo());
        assert_eq!(parse("/gate 10").kind(), &CommandKind::Craft { count: 10 });
        assert!(MacroParser::default().parse_line("/loop five").is_err());
        assert!(MacroParser::default().parse_line("/craft").is_err());
    }

    #[test]
    fn require_family() {
        assert_eq!(
            parse("/require \"Well Fed\" <maxwait.30>").kind(),
            &CommandKind::Require {
                status: "Well Fed".into()
            }
        );
        assert_eq!(parse("/require \"Well Fed\" <maxwait.30>").max_wait_ms(), 30_000);
        assert_eq!(parse("/requirequality 3000").kind(), &CommandKind::RequireQuality { quality: 3000 });
        assert_eq!(parse("/requirerepair").kind(), &CommandKind::RequireRepair);
        assert_eq!(
            parse("/requirespiritbond 99.5").kind(),
            &CommandKind::RequireSpiritbond { within: Some(99.5) }
        );
        assert_eq!(
            parse("/requirestats 2700 2600 500").kind(),
            &CommandKind::RequireStats {
                craftsmanship: 2700,
                control: 2600,
                cp: 500
            }
        );
        assert!(MacroParser::default().parse_line("/requirestats 2700 2600").is_err());
    }

    #[test]
    fn recipe_is_lowercased_and_item_takes_hq() {
        assert_eq!(
            parse("/recipe \"Tsai tou Vounou\"").kind(),
            &CommandKind::Recipe {
                name: "tsai tou vounou".into()
            }
        );
        assert_eq!(
            parse("/item Calamari Ripieni <hq> <wait.3>").kind(),
            &CommandKind::Item {
                name: "Calamari Ripieni".into(),
                hq: true
            }
        );
    }

    #[test]
    fn wait_command_argument_overrides_modifier() {
        assert_eq!(parse("/wait 1-5").wait(), WaitSpec::range(1000, 5000));
        assert_eq!(parse("/wait 2 <wait.9>").wait(), WaitSpec::fixed(2000));
        assert_eq!(parse("/wait <wait.9>").wait(), WaitSpec::fixed(9000));
        assert!(MacroParser::default().parse_line("/wait soon").is_err());
    }

    #[test]
    fn native_passthrough_rules() {
        assert_eq!(
            parse("/echo hello <se.1>").kind(),
            &CommandKind::Native {
                line: "/echo hello <se.1>".into()
            }
        );
        assert_eq!(
            parse("<t> is ready").kind(),
            &CommandKind::Native {
                line: "<t> is ready".into()
            }
        );
        assert_eq!(
            parse("just text <wait.1>").kind(),
            &CommandKind::Native {
                line: "/e just text".into()
            }
        );
    }

    #[test]
    fn native_verbs_come_from_settings() {
        let settings = Settings {
            native_commands: vec!["/Gearset".into()],
            ..Settings::default()
        };
        let parser = MacroParser::new(ParseOptions::from_settings(&settings));
        assert!(parser.parse_line("/gearset change 3").unwrap().is_some());
        assert!(parser.parse_line("/echo hi").is_err());
    }

    #[test]
    fn macro_skips_blanks_and_comments_and_reports_line() {
        let parser = MacroParser::default();
        let cmds = parser.parse_macro("# prep\r\n/echo a\r\n\r\n/loop 1\r/echo b").unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[2].text(), "/echo b");

        let err = parser.parse_macro("/echo a\n\n/bogus foo").unwrap_err();
        assert_eq!(err.line, 3);
    }
}
