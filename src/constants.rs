//! Centralized constants for quizblink
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// QUESTION RANGE
// ============================================================================

/// Highest question number accepted by default.
/// Unit: question number
/// Range: 1-99 (quizzes observed so far have 20 questions)
pub const MAX_QUESTION_DEFAULT: u32 = 20;

/// Upper bound for the configurable highest question number.
/// Unit: question number
/// Range: Fixed, keeps the buffer to two digits
pub const MAX_QUESTION_LIMIT: u32 = 99;

// ============================================================================
// INPUT SESSION
// ============================================================================

/// Default inactivity timeout for an armed session.
/// Unit: seconds
/// Recommended range: 15-60 (long enough to find the question, short enough
/// that a forgotten session does not swallow digits)
pub const INPUT_TIMEOUT_DEFAULT_SECONDS: u64 = 30;

/// Minimum configurable session timeout.
/// Unit: seconds
pub const INPUT_TIMEOUT_MIN_SECONDS: u64 = 5;

/// Maximum configurable session timeout.
/// Unit: seconds
pub const INPUT_TIMEOUT_MAX_SECONDS: u64 = 300;

/// Default window in which a repeat of the same key is ignored.
/// Unit: milliseconds
/// Recommended range: 100-300 (OS key repeat fires every ~30ms once started)
pub const DEBOUNCE_DEFAULT_MS: u64 = 200;

/// Maximum configurable debounce window.
/// Unit: milliseconds
pub const DEBOUNCE_MAX_MS: u64 = 1000;

// ============================================================================
// BLINK TIMING
// ============================================================================

/// Default half-cycle duration of a blink (LED on, then gap).
/// Unit: milliseconds
/// Recommended range: 300-400 (shorter blinks are easy to miscount)
pub const BLINK_DURATION_DEFAULT_MS: u64 = 400;

/// Minimum configurable blink duration.
/// Unit: milliseconds
pub const BLINK_DURATION_MIN_MS: u64 = 50;

/// Maximum configurable blink duration.
/// Unit: milliseconds
pub const BLINK_DURATION_MAX_MS: u64 = 2000;

/// Number of blinks used to acknowledge activation and deactivation.
/// Unit: blinks
pub const ACK_BLINK_COUNT: u32 = 1;

/// Largest count accepted by the direct `blink <N>` command.
/// Unit: blinks
pub const DIRECT_BLINK_MAX: u32 = 20;

// ============================================================================
// REMOTE ANSWERS
// ============================================================================

/// Timeout for fetching answers from the remote source.
/// Unit: seconds
/// Recommended range: 5-15
pub const REMOTE_FETCH_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// DEFAULT KEYS
// ============================================================================

/// Key that arms and disarms a session.
pub const DEFAULT_TRIGGER_KEY: &str = "f9";

/// Key that submits the buffered question number.
pub const DEFAULT_SUBMIT_KEY: &str = "enter";

/// Key that abandons the session.
pub const DEFAULT_CANCEL_KEY: &str = "esc";

/// Key that deletes the last buffered digit.
pub const DEFAULT_BACKSPACE_KEY: &str = "backspace";

/// Default local answers file, relative to the working directory.
pub const DEFAULT_ANSWERS_FILE: &str = "quiz_answers.json";
