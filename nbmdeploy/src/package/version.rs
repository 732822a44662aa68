//! Module specification versions.
//!
//! Specification versions are dotted tokens such as `1.9`, `1.10` or
//! `8.0.3`. Components are compared one by one, and a version with fewer
//! components is padded with zeros (so `2 == 2.0`).
//!
//! Each component is split into runs of digits and runs of other
//! characters. Digit runs compare numerically at any length (so
//! `1.10 > 1.9` and `1.10a > 1.9a`); other runs compare lexically and
//! always order after digit runs (so `1.0.beta > 1.0.9`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned for version strings that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid specification version '{0}'")]
pub struct VersionParseError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Run {
    /// Decimal digits without leading zeros (`"0"` for zero).
    Number(String),
    Text(String),
}

impl Ord for Run {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Run::Number(a), Run::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Run::Number(_), Run::Text(_)) => Ordering::Less,
            (Run::Text(_), Run::Number(_)) => Ordering::Greater,
            (Run::Text(a), Run::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Run {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

type Component = Vec<Run>;

fn number(digits: &str) -> Run {
    let trimmed = digits.trim_start_matches('0');
    Run::Number(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

fn split_runs(part: &str) -> Component {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut chars = part.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        let digit = c.is_ascii_digit();
        let end = match chars.peek() {
            Some(&(i, next)) if next.is_ascii_digit() != digit => i,
            Some(_) => continue,
            None => part.len(),
        };
        let run = &part[start..end];
        runs.push(if digit { number(run) } else { Run::Text(run.to_string()) });
        start = end;
    }
    runs
}

/// A dotted specification version.
#[derive(Debug, Clone)]
pub struct SpecVersion {
    raw: String,
    components: Vec<Component>,
}

impl SpecVersion {
    /// The version exactly as written in the manifest.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for SpecVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(VersionParseError(s.to_string()));
        }

        let components = raw
            .split('.')
            .map(|part| {
                if part.is_empty() || part.chars().any(char::is_whitespace) {
                    return Err(VersionParseError(s.to_string()));
                }
                Ok(split_runs(part))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }
}

impl Ord for SpecVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = vec![number("0")];
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let left = self.components.get(i).unwrap_or(&zero);
            let right = other.components.get(i).unwrap_or(&zero);
            match left.cmp(right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for SpecVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SpecVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SpecVersion {}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
