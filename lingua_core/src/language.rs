//! Supported target languages and completion models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target language of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    Spanish,
    French,
    German,
    Chinese,
}

impl Language {
    pub const ALL: [Self; 4] = [Self::Spanish, Self::French, Self::German, Self::Chinese];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Chinese => "Chinese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported language: {s}"))
    }
}

/// Completion model used for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-5-nano")]
    Gpt5Nano,
    #[serde(rename = "gpt-5-mini")]
    Gpt5Mini,
    #[serde(rename = "gpt-5")]
    Gpt5,
}

impl Model {
    pub const ALL: [Self; 3] = [Self::Gpt5Nano, Self::Gpt5Mini, Self::Gpt5];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gpt5Nano => "gpt-5-nano",
            Self::Gpt5Mini => "gpt-5-mini",
            Self::Gpt5 => "gpt-5",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| format!("unsupported model: {s}"))
    }
}
