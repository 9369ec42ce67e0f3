//! Diagnostic log sink threaded through a detection run

use serde::Serialize;

/// Maximum detailed rejection lines recorded per body pair
pub const MAX_DETAIL_LINES: usize = 20;

/// Ordered, human-readable record of a detection run
///
/// Every entry is also forwarded to the `log` facade at debug level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticLog {
    entries: Vec<String>,
}

impl DiagnosticLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one entry
    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        log::debug!("{}", entry);
        self.entries.push(entry);
    }

    /// Move every entry of `other` to the end of this log
    pub fn append(&mut self, other: &mut DiagnosticLog) {
        self.entries.append(&mut other.entries);
    }

    /// Recorded entries in order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newline-separated text of every entry
    pub fn to_text(&self) -> String {
        let mut text = self.entries.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Budget for capped detail lines
#[derive(Debug, Clone, Copy)]
pub struct DetailBudget {
    remaining: usize,
}

impl DetailBudget {
    pub fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }

    /// Consume one line of budget, false once exhausted
    pub fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

impl Default for DetailBudget {
    fn default() -> Self {
        Self::new(MAX_DETAIL_LINES)
    }
}
