//! Risk signals raised against a pacing schedule
//!
//! Signals are informational. Nothing in the engine blocks on them.

use serde::{Deserialize, Serialize};

/// Signal severity
///
/// The detector currently emits `Info` and `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Which check produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    /// Schedule runs past the available weeks
    Compression,
    /// A week holds more topics than the advisory threshold
    Overload,
    /// Available weeks with nothing planned
    Gap,
}

impl std::fmt::Display for RiskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compression => write!(f, "compression"),
            Self::Overload => write!(f, "overload"),
            Self::Gap => write!(f, "gap"),
        }
    }
}

/// A single typed warning about the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSignal {
    pub kind: RiskKind,
    pub severity: Severity,
    pub message: String,
    /// Week numbers the signal refers to, ascending
    pub affected_weeks: Vec<u32>,
    /// Extra context for display (e.g. existing items in gap weeks)
    #[serde(default)]
    pub detail: Option<String>,
}

/// Zero or more signals, in detection order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskSignalSet {
    signals: Vec<RiskSignal>,
}

impl RiskSignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: RiskSignal) {
        self.signals.push(signal);
    }

    pub fn extend(&mut self, signals: impl IntoIterator<Item = RiskSignal>) {
        self.signals.extend(signals);
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RiskSignal> {
        self.signals.iter()
    }

    /// Signals produced by one check
    pub fn of_kind(&self, kind: RiskKind) -> impl Iterator<Item = &RiskSignal> {
        self.signals.iter().filter(move |s| s.kind == kind)
    }

    /// Highest severity present, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.signals.iter().map(|s| s.severity).max()
    }
}

impl<'a> IntoIterator for &'a RiskSignalSet {
    type Item = &'a RiskSignal;
    type IntoIter = std::slice::Iter<'a, RiskSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}
