use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{MonitorError, MonitorResult};

/// A relabel regex as Prometheus sees it.
///
/// The source text is what ends up in the rendered config. Matching is done
/// against the fully anchored form, since Prometheus anchors relabel
/// regexes on both ends.
#[derive(Clone)]
pub struct RelabelRegex {
    source: String,
    anchored: Regex,
}

impl RelabelRegex {
    pub fn new(pattern: impl Into<String>) -> MonitorResult<Self> {
        let source = pattern.into();
        let anchored = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            MonitorError::Pattern {
                pattern: source.clone(),
                source: e,
            }
        })?;
        Ok(Self { source, anchored })
    }

    /// Alternation of literal names, e.g. the instance labels of several
    /// clusters sharing one Prometheus.
    pub fn any_of<I, S>(names: I) -> MonitorResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = names
            .into_iter()
            .map(|n| regex::escape(n.as_ref()))
            .collect();
        if escaped.is_empty() {
            return Err(MonitorError::Config(
                "At least one cluster name is required to build a target pattern".into(),
            ));
        }
        Self::new(escaped.join("|"))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }
}

impl PartialEq for RelabelRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RelabelRegex {}

impl fmt::Debug for RelabelRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RelabelRegex").field(&self.source).finish()
    }
}

impl fmt::Display for RelabelRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for RelabelRegex {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for RelabelRegex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for RelabelRegex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(source).map_err(serde::de::Error::custom)
    }
}
