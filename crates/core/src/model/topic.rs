use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Top-level subject grouping. Each topic owns a question bank and a material catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Causes,
    Events,
    Figures,
    Documents,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown topic: {0}")]
pub struct TopicParseError(pub String);

impl Topic {
    /// Dashboard order.
    pub const ALL: [Topic; 4] = [Topic::Causes, Topic::Events, Topic::Figures, Topic::Documents];

    /// Stable key used in storage and on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Topic::Causes => "causes",
            Topic::Events => "events",
            Topic::Figures => "figures",
            Topic::Documents => "documents",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Topic::Causes => "Causes of the Revolution",
            Topic::Events => "Key Events & Battles",
            Topic::Figures => "Important Figures",
            Topic::Documents => "Documents & Ideas",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Topic::Causes => "Explore the events and policies that led to colonial rebellion",
            Topic::Events => "Major events that shaped the revolutionary war",
            Topic::Figures => "Learn about the people who made the revolution possible",
            Topic::Documents => "Founding documents and revolutionary concepts",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| TopicParseError(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for topic in Topic::ALL {
            assert_eq!(topic.key().parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Events ".parse::<Topic>().unwrap(), Topic::Events);
    }

    #[test]
    fn unknown_topic_is_an_explicit_error() {
        let err = "geography".parse::<Topic>().unwrap_err();
        assert_eq!(err, TopicParseError("geography".into()));
    }
}
