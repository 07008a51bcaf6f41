use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

pub const CAPACITY: usize = 100;

/// Level up to which entries are kept in the repository, independent of the printed level.
pub const BUFFER_LEVEL: LevelFilter = LevelFilter::Debug;

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    pub level: Level,
    pub message: String,
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:<5} {}", self.time, self.level, self.message)
    }
}

/// Keeps the most recent entries in memory.
#[derive(Default)]
pub struct Buffer {
    entries: Mutex<VecDeque<Entry>>,
}

impl Repository for Buffer {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?;
        if entries.len() == CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(())
    }
}

/// Installs a logger printing entries up to `level` to stderr and keeping entries up to
/// [`BUFFER_LEVEL`] in `repository`.
///
/// # Errors
///
/// Returns an error if a logger has already been initialized.
pub fn init(repository: Arc<dyn Repository>, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger::new(repository, level)))
        .map(|()| log::set_max_level(level.max(BUFFER_LEVEL)))
}

/// Stored entries which were not printed at `level`.
///
/// # Errors
///
/// Returns an error if the repository cannot be read.
pub fn suppressed(repository: &dyn Repository, level: LevelFilter) -> Result<Vec<Entry>, Error> {
    Ok(repository
        .read_entries()?
        .into_iter()
        .filter(|entry| entry.level > level)
        .collect())
}

struct Logger {
    repository: Arc<dyn Repository>,
    level: LevelFilter,
}

impl Logger {
    fn new(repository: Arc<dyn Repository>, level: LevelFilter) -> Self {
        Self { repository, level }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.max(BUFFER_LEVEL)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = Entry {
                time: Local::now().format("%b %d %H:%M:%S").to_string(),
                level: record.level(),
                message: record.args().to_string(),
            };
            if entry.level <= self.level {
                eprintln!("{entry}");
            }
            let _ = self.repository.write_entry(entry);
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use log::Log;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn entry(message: &str) -> Entry {
        Entry {
            time: "Jan 01 10:00:00".to_string(),
            level: Level::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(entry("saved").to_string(), "Jan 01 10:00:00 INFO  saved");
    }

    #[test]
    fn test_buffer_is_bounded() {
        let buffer = Buffer::default();
        for i in 0..=CAPACITY {
            buffer.write_entry(entry(&i.to_string())).unwrap();
        }

        let entries = buffer.read_entries().unwrap();
        assert_eq!(entries.len(), CAPACITY);
        assert_eq!(entries.front().unwrap().message, "1");
        assert_eq!(entries.back().unwrap().message, CAPACITY.to_string());
    }

    fn log_all(logger: &Logger) {
        for (level, message) in [
            (Level::Error, "failed"),
            (Level::Info, "saved"),
            (Level::Debug, "creating"),
            (Level::Trace, "loaded"),
        ] {
            logger.log(
                &Record::builder()
                    .level(level)
                    .args(format_args!("{message}"))
                    .build(),
            );
        }
    }

    fn messages(entries: impl IntoIterator<Item = Entry>) -> Vec<String> {
        entries.into_iter().map(|e| e.message).collect()
    }

    #[rstest]
    #[case(LevelFilter::Off, vec!["failed", "saved", "creating"])]
    #[case(LevelFilter::Warn, vec!["failed", "saved", "creating"])]
    #[case(LevelFilter::Trace, vec!["failed", "saved", "creating", "loaded"])]
    fn test_logger_buffers_up_to_debug(
        #[case] level: LevelFilter,
        #[case] expected: Vec<&str>,
    ) {
        let buffer = Arc::new(Buffer::default());
        log_all(&Logger::new(buffer.clone(), level));

        assert_eq!(messages(buffer.read_entries().unwrap()), expected);
    }

    #[rstest]
    #[case(LevelFilter::Off, vec!["failed", "saved", "creating"])]
    #[case(LevelFilter::Warn, vec!["saved", "creating"])]
    #[case(LevelFilter::Debug, vec![])]
    #[case(LevelFilter::Trace, vec![])]
    fn test_suppressed(#[case] level: LevelFilter, #[case] expected: Vec<&str>) {
        let buffer = Arc::new(Buffer::default());
        log_all(&Logger::new(buffer.clone(), level));

        assert_eq!(
            messages(suppressed(buffer.as_ref(), level).unwrap()),
            expected
        );
    }
}
