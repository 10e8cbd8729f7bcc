use std::collections::HashMap;
use std::time::{Duration, Instant};

/// State of one armed question-number entry.
///
/// Exists only while armed; the controller drops it on submit, cancel,
/// toggle-off or timeout.
#[derive(Debug, Clone)]
pub struct InputSession {
    /// Decimal digits typed so far, in order
    buffer: String,
    /// When the session was armed
    started_at: Instant,
    /// Last accepted keystroke of any kind (drives the timeout)
    last_input: Instant,
    /// Last accepted keystroke per key name (drives debounce)
    last_accepted: HashMap<String, Instant>,
    /// Inactivity allowed before the session expires
    timeout: Duration,
}

impl InputSession {
    /// Arm a session; the trigger press counts as the first accepted key
    pub fn new(trigger_key: &str, now: Instant, timeout: Duration) -> Self {
        let mut last_accepted = HashMap::new();
        last_accepted.insert(trigger_key.to_string(), now);
        Self {
            buffer: String::new(),
            started_at: now,
            last_input: now,
            last_accepted,
            timeout,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn push_digit(&mut self, digit: char) {
        debug_assert!(digit.is_ascii_digit());
        self.buffer.push(digit);
    }

    /// Remove the last digit; false if the buffer was already empty
    pub fn pop_digit(&mut self) -> bool {
        self.buffer.pop().is_some()
    }

    /// Hand over the buffer contents, leaving it empty
    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Whether `key` was accepted less than `window` ago
    pub fn is_repeat(&self, key: &str, now: Instant, window: Duration) -> bool {
        self.last_accepted
            .get(key)
            .is_some_and(|last| now.saturating_duration_since(*last) < window)
    }

    /// Record an accepted keystroke and restart the timeout
    pub fn accept(&mut self, key: &str, now: Instant) {
        self.last_accepted.insert(key.to_string(), now);
        self.last_input = now;
    }

    pub fn deadline(&self) -> Instant {
        self.last_input + self.timeout
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}
