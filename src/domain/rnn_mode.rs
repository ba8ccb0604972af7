// ============================================================
// Layer 3 - Recurrent Layer Selection
// ============================================================
// The model uses exactly one recurrent layer, picked by name:
//
//   "rnn_relu" - Elman RNN with relu
//   "rnn_tanh" - Elman RNN with tanh
//   "lstm"     - long short-term memory
//   "gru"      - gated recurrent unit
//
// Parsing happens when CLI arguments become a TrainConfig, so a
// bad name is rejected before any device or weights exist.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RnnMode {
    RnnRelu,
    RnnTanh,
    Lstm,
    Gru,
}

impl RnnMode {
    /// Every accepted mode, in the order listed in error messages
    pub const ALL: [RnnMode; 4] = [
        RnnMode::RnnRelu,
        RnnMode::RnnTanh,
        RnnMode::Lstm,
        RnnMode::Gru,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RnnRelu => "rnn_relu",
            Self::RnnTanh => "rnn_tanh",
            Self::Lstm    => "lstm",
            Self::Gru     => "gru",
        }
    }
}

impl fmt::Display for RnnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string is not one of [`RnnMode::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidModeError {
    pub given: String,
}

impl fmt::Display for InvalidModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<&str> = RnnMode::ALL.iter().map(RnnMode::as_str).collect();
        write!(
            f,
            "invalid mode {:?}, expected one of {{{}}}",
            self.given,
            valid.join(", ")
        )
    }
}

impl std::error::Error for InvalidModeError {}

impl FromStr for RnnMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RnnMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidModeError { given: s.to_string() })
    }
}

impl TryFrom<String> for RnnMode {
    type Error = InvalidModeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RnnMode> for String {
    fn from(m: RnnMode) -> Self {
        m.as_str().to_string()
    }
}
