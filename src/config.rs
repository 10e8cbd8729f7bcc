//! Configuration parsing for QuizBlink
//!
//! This module handles parsing of environment variables that can optionally
//! override settings from the config file. The primary configuration source
//! is config.toml (see config_file module); command-line flags win over both.
//!
//! Environment variables (all optional):
//! - QUIZBLINK_BLINK_DURATION_MS: Override the blink half-cycle
//! - QUIZBLINK_INPUT_TIMEOUT: Override the question entry timeout
//! - QUIZBLINK_ANSWERS: Override the answers file path

use crate::config_file::Config;
use crate::constants::{
    BLINK_DURATION_MAX_MS, BLINK_DURATION_MIN_MS, INPUT_TIMEOUT_MAX_SECONDS,
    INPUT_TIMEOUT_MIN_SECONDS,
};
use log::{debug, info, warn};
use std::env;
use std::path::PathBuf;

/// Parse the QUIZBLINK_BLINK_DURATION_MS environment variable
///
/// Returns Some(ms) if a valid duration is configured (50-2000 ms)
/// Returns None if not set or invalid
pub fn parse_blink_duration_ms() -> Option<u64> {
    match env::var("QUIZBLINK_BLINK_DURATION_MS") {
        Ok(val) => match val.parse::<u64>() {
            Ok(ms) if (BLINK_DURATION_MIN_MS..=BLINK_DURATION_MAX_MS).contains(&ms) => {
                info!("Blink duration set via environment variable: {} ms", ms);
                Some(ms)
            }
            Ok(ms) => {
                warn!(
                    "Invalid blink duration: {} (must be {}-{} ms). Using config value.",
                    ms, BLINK_DURATION_MIN_MS, BLINK_DURATION_MAX_MS
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse QUIZBLINK_BLINK_DURATION_MS: {}. Using config value.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("QUIZBLINK_BLINK_DURATION_MS not set.");
            None
        }
    }
}

/// Parse the QUIZBLINK_INPUT_TIMEOUT environment variable
///
/// Returns Some(seconds) if a valid timeout is configured (5-300 seconds)
/// Returns None if not set or invalid
pub fn parse_input_timeout() -> Option<u64> {
    match env::var("QUIZBLINK_INPUT_TIMEOUT") {
        Ok(val) => match val.parse::<u64>() {
            Ok(seconds)
                if (INPUT_TIMEOUT_MIN_SECONDS..=INPUT_TIMEOUT_MAX_SECONDS).contains(&seconds) =>
            {
                info!(
                    "Input timeout set via environment variable: {} seconds",
                    seconds
                );
                Some(seconds)
            }
            Ok(seconds) => {
                warn!(
                    "Invalid input timeout: {} (must be {}-{} seconds). Using config value.",
                    seconds, INPUT_TIMEOUT_MIN_SECONDS, INPUT_TIMEOUT_MAX_SECONDS
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse QUIZBLINK_INPUT_TIMEOUT: {}. Using config value.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("QUIZBLINK_INPUT_TIMEOUT not set.");
            None
        }
    }
}

/// Parse the QUIZBLINK_ANSWERS environment variable
///
/// Returns Some(path) when set to a non-blank value
pub fn parse_answers_path() -> Option<PathBuf> {
    match env::var("QUIZBLINK_ANSWERS") {
        Ok(val) if !val.trim().is_empty() => {
            info!("Answers file set via environment variable: {}", val.trim());
            Some(PathBuf::from(val.trim()))
        }
        Ok(_) => {
            warn!("QUIZBLINK_ANSWERS is empty. Using config value.");
            None
        }
        Err(_) => {
            debug!("QUIZBLINK_ANSWERS not set.");
            None
        }
    }
}

/// Apply every environment override on top of a loaded config
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(ms) = parse_blink_duration_ms() {
        config.blink_duration_ms = ms;
    }
    if let Some(seconds) = parse_input_timeout() {
        config.input_timeout_secs = seconds;
    }
    if let Some(path) = parse_answers_path() {
        config.answers_path = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each variable is exercised from a single test so parallel tests never
    // race on the same name.

    #[test]
    fn test_parse_blink_duration() {
        env::set_var("QUIZBLINK_BLINK_DURATION_MS", "50");
        assert_eq!(parse_blink_duration_ms(), Some(50), "Should accept 50 ms");

        env::set_var("QUIZBLINK_BLINK_DURATION_MS", "2000");
        assert_eq!(
            parse_blink_duration_ms(),
            Some(2000),
            "Should accept 2000 ms"
        );

        env::set_var("QUIZBLINK_BLINK_DURATION_MS", "49");
        assert_eq!(parse_blink_duration_ms(), None, "Should reject 49 ms");

        env::set_var("QUIZBLINK_BLINK_DURATION_MS", "2001");
        assert_eq!(parse_blink_duration_ms(), None, "Should reject 2001 ms");

        env::set_var("QUIZBLINK_BLINK_DURATION_MS", "400ms");
        assert_eq!(
            parse_blink_duration_ms(),
            None,
            "Should reject value with units"
        );

        env::remove_var("QUIZBLINK_BLINK_DURATION_MS");
        assert_eq!(
            parse_blink_duration_ms(),
            None,
            "Should return None when not set"
        );
    }

    #[test]
    fn test_parse_input_timeout() {
        env::set_var("QUIZBLINK_INPUT_TIMEOUT", "5");
        assert_eq!(parse_input_timeout(), Some(5), "Should accept 5 seconds");

        env::set_var("QUIZBLINK_INPUT_TIMEOUT", "300");
        assert_eq!(parse_input_timeout(), Some(300), "Should accept 300 seconds");

        env::set_var("QUIZBLINK_INPUT_TIMEOUT", "4");
        assert_eq!(parse_input_timeout(), None, "Should reject 4 seconds");

        env::set_var("QUIZBLINK_INPUT_TIMEOUT", "301");
        assert_eq!(parse_input_timeout(), None, "Should reject 301 seconds");

        env::set_var("QUIZBLINK_INPUT_TIMEOUT", "-30");
        assert_eq!(parse_input_timeout(), None, "Should reject negative value");

        env::set_var("QUIZBLINK_INPUT_TIMEOUT", "");
        assert_eq!(parse_input_timeout(), None, "Should reject empty string");

        env::remove_var("QUIZBLINK_INPUT_TIMEOUT");
        assert_eq!(
            parse_input_timeout(),
            None,
            "Should return None when not set"
        );
    }

    #[test]
    fn test_parse_answers_path() {
        env::set_var("QUIZBLINK_ANSWERS", " /tmp/answers.json ");
        assert_eq!(
            parse_answers_path(),
            Some(PathBuf::from("/tmp/answers.json"))
        );

        env::set_var("QUIZBLINK_ANSWERS", "   ");
        assert_eq!(parse_answers_path(), None, "Should ignore blank value");

        env::remove_var("QUIZBLINK_ANSWERS");
        assert_eq!(parse_answers_path(), None);
    }
}
