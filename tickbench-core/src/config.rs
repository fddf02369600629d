//! Verification Configuration
//!
//! The original harness family selected these settings with preprocessor
//! flags at build time; here they are plain values threaded into the
//! verification protocol, so a single binary can exercise every
//! configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Digest verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestMode {
    /// No digest verification; reports carry an explicit "no check" line
    Off,
    /// Digest accumulated inside the measured loop, perturbing the timing
    Intrusive,
    /// Digest computed over the output after the measured window closes
    #[default]
    NonIntrusive,
}

impl DigestMode {
    /// Whether digest verification participates in pass/fail at all.
    pub fn is_enabled(self) -> bool {
        !matches!(self, DigestMode::Off)
    }
}

impl FromStr for DigestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Ok(DigestMode::Off),
            "intrusive" => Ok(DigestMode::Intrusive),
            "non-intrusive" | "nonintrusive" => Ok(DigestMode::NonIntrusive),
            other => Err(format!("unknown digest mode: {}", other)),
        }
    }
}

/// Which verification checks the report performs and which result fields it
/// prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Digest checking mode
    #[serde(default)]
    pub digest: DigestMode,
    /// Print the four generic verification values as integers
    #[serde(default)]
    pub verify_int: bool,
    /// Reinterpret the verification value pairs as doubles and print them
    /// (additionally gated on target floating point support)
    #[serde(default)]
    pub verify_float: bool,
}
