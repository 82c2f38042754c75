//! The seven-letter choice alphabet and its run values.
//!
//! This is the only place the symbol-to-runs table lives. Scoring is decided
//! by the server; the values here are for display and derivation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A letter a player can choose when batting or bowling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Symbol {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Symbol {
    /// Every symbol, in alphabet order.
    pub const ALL: [Symbol; 7] = [
        Symbol::A,
        Symbol::B,
        Symbol::C,
        Symbol::D,
        Symbol::E,
        Symbol::F,
        Symbol::G,
    ];

    /// Runs a batsman scores with this letter when it is not matched.
    pub fn runs(&self) -> u32 {
        match self {
            Symbol::A => 1,
            Symbol::B => 2,
            Symbol::C => 3,
            Symbol::D | Symbol::F => 4,
            Symbol::E | Symbol::G => 6,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::C => 'C',
            Symbol::D => 'D',
            Symbol::E => 'E',
            Symbol::F => 'F',
            Symbol::G => 'G',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Symbol::A),
            'B' => Some(Symbol::B),
            'C' => Some(Symbol::C),
            'D' => Some(Symbol::D),
            'E' => Some(Symbol::E),
            'F' => Some(Symbol::F),
            'G' => Some(Symbol::G),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Symbol {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Symbol::from_char(c).ok_or_else(|| SymbolParseError(s.to_string()))
            }
            _ => Err(SymbolParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.to_string()
    }
}

/// Error parsing a choice letter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected one of the letters A-G, got: {0:?}")]
pub struct SymbolParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_table() {
        let runs: Vec<u32> = Symbol::ALL.iter().map(Symbol::runs).collect();
        assert_eq!(runs, vec![1, 2, 3, 4, 6, 4, 6]);
    }

    #[test]
    fn parse_normalizes_case() {
        assert_eq!("e".parse::<Symbol>().unwrap(), Symbol::E);
        assert_eq!(" G ".parse::<Symbol>().unwrap(), Symbol::G);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("H".parse::<Symbol>().is_err());
        assert!("AB".parse::<Symbol>().is_err());
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn serde_as_letter() {
        let json = serde_json::to_string(&Symbol::D).unwrap();
        assert_eq!(json, "\"D\"");
        let back: Symbol = serde_json::from_str("\"d\"").unwrap();
        assert_eq!(back, Symbol::D);
    }
}
