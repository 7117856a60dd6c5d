//! Journal sink supplied by the host.
//!
//! Recording is fire-and-forget: a journal never returns an error and never
//! influences control flow.

use std::sync::Mutex;

/// Severity of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalLevel {
    /// Debug detail
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

impl JournalLevel {
    /// Matching level of the `log` facade.
    pub fn as_log_level(self) -> log::Level {
        match self {
            JournalLevel::Debug => log::Level::Debug,
            JournalLevel::Info => log::Level::Info,
            JournalLevel::Warn => log::Level::Warn,
            JournalLevel::Error => log::Level::Error,
        }
    }
}

/// Capability for recording messages in the host's process journal.
pub trait Journal {
    /// Record one message.
    fn record(&self, level: JournalLevel, message: &str);
}

/// Journal that forwards entries to the `log` facade under target `journal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogJournal;

impl Journal for LogJournal {
    fn record(&self, level: JournalLevel, message: &str) {
        log::log!(target: "journal", level.as_log_level(), "{}", message);
    }
}

/// Journal that keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<(JournalLevel, String)>>,
}

impl MemoryJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<(JournalLevel, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Entries recorded at `level`.
    pub fn messages_at(&self, level: JournalLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, level: JournalLevel, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_journal_records_in_order() {
        let journal = MemoryJournal::new();
        journal.record(JournalLevel::Info, "first");
        journal.record(JournalLevel::Error, "second");

        assert_eq!(
            journal.entries(),
            vec![
                (JournalLevel::Info, "first".to_string()),
                (JournalLevel::Error, "second".to_string())
            ]
        );
        assert_eq!(journal.messages_at(JournalLevel::Error), vec!["second"]);
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(JournalLevel::Warn.as_log_level(), log::Level::Warn);
        assert_eq!(JournalLevel::Debug.as_log_level(), log::Level::Debug);
    }
}
