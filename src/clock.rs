//! Date provider
//!
//! Borrow records are stamped with the current local date. The date source is
//! injected so tests can pin it.

/// Source of the current calendar date as `YYYY-MM-DD`
pub trait Clock: Send + Sync {
    fn today(&self) -> String;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Always returns the same date
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(date: impl Into<String>) -> Self {
        Self(date.into())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.0.clone()
    }
}
