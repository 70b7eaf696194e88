//! Virtual key names accepted by `/send`, `/hold` and `/release`.

use std::fmt;
use std::str::FromStr;

/// A Windows virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u8);

/// Keys with irregular names. Digits, letters, numpad digits and function keys are derived.
const NAMED_KEYS: &[(&str, u8)] = &[
    ("LBUTTON", 0x01),
    ("RBUTTON", 0x02),
    ("CANCEL", 0x03),
    ("MBUTTON", 0x04),
    ("XBUTTON1", 0x05),
    ("XBUTTON2", 0x06),
    ("BACK", 0x08),
    ("TAB", 0x09),
    ("CLEAR", 0x0C),
    ("RETURN", 0x0D),
    ("SHIFT", 0x10),
    ("CONTROL", 0x11),
    ("MENU", 0x12),
    ("PAUSE", 0x13),
    ("CAPITAL", 0x14),
    ("ESCAPE", 0x1B),
    ("SPACE", 0x20),
    ("PRIOR", 0x21),
    ("NEXT", 0x22),
    ("END", 0x23),
    ("HOME", 0x24),
    ("LEFT", 0x25),
    ("UP", 0x26),
    ("RIGHT", 0x27),
    ("DOWN", 0x28),
    ("SELECT", 0x29),
    ("PRINT", 0x2A),
    ("EXECUTE", 0x2B),
    ("SNAPSHOT", 0x2C),
    ("INSERT", 0x2D),
    ("DELETE", 0x2E),
    ("HELP", 0x2F),
    ("LWIN", 0x5B),
    ("RWIN", 0x5C),
    ("APPS", 0x5D),
    ("SLEEP", 0x5F),
    ("MULTIPLY", 0x6A),
    ("ADD", 0x6B),
    ("SEPARATOR", 0x6C),
    ("SUBTRACT", 0x6D),
    ("DECIMAL", 0x6E),
    ("DIVIDE", 0x6F),
    ("NUMLOCK", 0x90),
    ("SCROLL", 0x91),
    ("LSHIFT", 0xA0),
    ("RSHIFT", 0xA1),
    ("LCONTROL", 0xA2),
    ("RCONTROL", 0xA3),
    ("LMENU", 0xA4),
    ("RMENU", 0xA5),
    ("OEM_1", 0xBA),
    ("OEM_PLUS", 0xBB),
    ("OEM_COMMA", 0xBC),
    ("OEM_MINUS", 0xBD),
    ("OEM_PERIOD", 0xBE),
    ("OEM_2", 0xBF),
    ("OEM_3", 0xC0),
    ("OEM_4", 0xDB),
    ("OEM_5", 0xDC),
    ("OEM_6", 0xDD),
    ("OEM_7", 0xDE),
    ("OEM_8", 0xDF),
    ("OEM_102", 0xE2),
];

impl VirtualKey {
    pub const SHIFT: VirtualKey = VirtualKey(0x10);
    pub const CONTROL: VirtualKey = VirtualKey(0x11);
    pub const MENU: VirtualKey = VirtualKey(0x12);

    /// Look up a key by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if let Some((_, code)) = NAMED_KEYS.iter().find(|(n, _)| *n == upper) {
            return Some(VirtualKey(*code));
        }
        let bytes = upper.as_bytes();
        match bytes {
            [c] if c.is_ascii_uppercase() => Some(VirtualKey(*c)),
            _ => {
                if let Some(d) = single_digit(upper.strip_prefix("KEY_")) {
                    Some(VirtualKey(0x30 + d))
                } else if let Some(d) = single_digit(upper.strip_prefix("NUMPAD")) {
                    Some(VirtualKey(0x60 + d))
                } else {
                    let n: u8 = upper.strip_prefix('F')?.parse().ok()?;
                    (1..=24).contains(&n).then(|| VirtualKey(0x70 + n - 1))
                }
            },
        }
    }

    /// Canonical upper-case name of this key.
    pub fn name(self) -> String {
        let code = self.0;
        if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, c)| *c == code) {
            return (*name).to_string();
        }
        match code {
            0x30..=0x39 => format!("KEY_{}", code - 0x30),
            0x41..=0x5A => char::from(code).to_string(),
            0x60..=0x69 => format!("NUMPAD{}", code - 0x60),
            0x70..=0x87 => format!("F{}", code - 0x70 + 1),
            other => format!("0x{other:02X}"),
        }
    }
}

fn single_digit(text: Option<&str>) -> Option<u8> {
    match text?.as_bytes() {
        [d] if d.is_ascii_digit() => Some(d - b'0'),
        _ => None,
    }
}

impl FromStr for VirtualKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VirtualKey::from_name(s).ok_or_else(|| s.trim().to_string())
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A `+` separated key chord. The last key is the primary key, the rest are held modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    keys: Vec<VirtualKey>,
}

impl KeyCombo {
    /// Parse `CONTROL+MENU+NUMPAD0` style text.
    ///
    /// # Errors
    /// Returns the first key name that is not a known virtual key.
    pub fn parse(text: &str) -> Result<Self, String> {
        let keys = text
            .split('+')
            .map(str::parse::<VirtualKey>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { keys })
    }

    pub fn primary(&self) -> VirtualKey {
        // split() always yields at least one piece, so parse never builds an empty combo
        self.keys[self.keys.len() - 1]
    }

    pub fn modifiers(&self) -> &[VirtualKey] {
        &self.keys[..self.keys.len() - 1]
    }

    pub fn keys(&self) -> &[VirtualKey] {
        &self.keys
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.keys.iter().map(|k| k.name()).collect();
        f.write_str(&names.join("+"))
    }
}
