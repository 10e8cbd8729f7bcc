//! Configuration file management
//!
//! This module handles loading and saving the application configuration file,
//! which holds the key bindings, timings and answer locations. Every field has
//! a default, so a partial file (or no file at all) is valid.

use crate::constants::{
    BLINK_DURATION_DEFAULT_MS, BLINK_DURATION_MAX_MS, BLINK_DURATION_MIN_MS, DEBOUNCE_DEFAULT_MS,
    DEBOUNCE_MAX_MS, DEFAULT_ANSWERS_FILE, DEFAULT_BACKSPACE_KEY, DEFAULT_CANCEL_KEY,
    DEFAULT_SUBMIT_KEY, DEFAULT_TRIGGER_KEY, INPUT_TIMEOUT_DEFAULT_SECONDS,
    INPUT_TIMEOUT_MAX_SECONDS, INPUT_TIMEOUT_MIN_SECONDS, MAX_QUESTION_DEFAULT,
    MAX_QUESTION_LIMIT,
};
use crate::input::ControllerConfig;
use crate::utils::keycode::{key_to_digit, normalize_key_name};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration stored in config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Local answers JSON file
    pub answers_path: PathBuf,
    /// Optional HTTP location used by `fetch` to refresh the answers file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Key that arms and disarms question entry (default: f9)
    pub trigger_key: String,
    /// Key that submits the question number (default: enter)
    pub submit_key: String,
    /// Key that abandons question entry (default: esc)
    pub cancel_key: String,
    /// Key that deletes the last digit (default: backspace)
    pub backspace_key: String,
    /// LED on/off half-cycle in milliseconds (default: 400)
    pub blink_duration_ms: u64,
    /// Window for ignoring repeats of the same key in milliseconds (default: 200)
    pub debounce_ms: u64,
    /// Inactivity timeout for question entry in seconds (default: 30)
    pub input_timeout_secs: u64,
    /// Highest accepted question number (default: 20)
    pub max_question: u32,
    /// Inclusive range of questions whose answers are text, e.g. [18, 20]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_questions: Option<[u32; 2]>,
    /// LED class device directory; discovered automatically when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            answers_path: PathBuf::from(DEFAULT_ANSWERS_FILE),
            remote_url: None,
            trigger_key: DEFAULT_TRIGGER_KEY.to_string(),
            submit_key: DEFAULT_SUBMIT_KEY.to_string(),
            cancel_key: DEFAULT_CANCEL_KEY.to_string(),
            backspace_key: DEFAULT_BACKSPACE_KEY.to_string(),
            blink_duration_ms: BLINK_DURATION_DEFAULT_MS,
            debounce_ms: DEBOUNCE_DEFAULT_MS,
            input_timeout_secs: INPUT_TIMEOUT_DEFAULT_SECONDS,
            max_question: MAX_QUESTION_DEFAULT,
            text_questions: None,
            led_path: None,
        }
    }
}

impl Config {
    /// Get the standard config file path
    ///
    /// - Linux: `~/.config/quizblink/config.toml`
    /// - macOS: `~/Library/Application Support/quizblink/config.toml`
    /// - Windows: `%APPDATA%\quizblink\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Failed to determine config directory"))?
            .join("quizblink");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the standard location, or defaults if there is none
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::info!(
                "No config file at {} - using defaults (run 'quizblink --setup' to create one)",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Load config from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file doesn't exist
    /// - Failed to read file
    /// - TOML parsing fails
    /// - Values fail validation
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Configuration file not found at: {}\n\nRun 'quizblink --setup' to create it.",
                path.display()
            );
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to the standard location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save config to a specific path, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Check keys and numeric ranges
    pub fn validate(&self) -> Result<()> {
        let keys = [
            ("trigger_key", &self.trigger_key),
            ("submit_key", &self.submit_key),
            ("cancel_key", &self.cancel_key),
            ("backspace_key", &self.backspace_key),
        ];

        for (field, key) in &keys {
            Self::validate_key(key).with_context(|| format!("Invalid {}: '{}'", field, key))?;
        }

        // Control keys must be pairwise different
        for (i, (field_a, key_a)) in keys.iter().enumerate() {
            for (field_b, key_b) in &keys[i + 1..] {
                if normalize_key_name(key_a) == normalize_key_name(key_b) {
                    bail!(
                        "{} and {} must be different (both set to '{}')",
                        field_a,
                        field_b,
                        key_a
                    );
                }
            }
        }

        check_range(
            "blink_duration_ms",
            self.blink_duration_ms,
            BLINK_DURATION_MIN_MS,
            BLINK_DURATION_MAX_MS,
        )?;
        check_range("debounce_ms", self.debounce_ms, 0, DEBOUNCE_MAX_MS)?;
        check_range(
            "input_timeout_secs",
            self.input_timeout_secs,
            INPUT_TIMEOUT_MIN_SECONDS,
            INPUT_TIMEOUT_MAX_SECONDS,
        )?;
        check_range(
            "max_question",
            u64::from(self.max_question),
            1,
            u64::from(MAX_QUESTION_LIMIT),
        )?;

        if let Some([start, end]) = self.text_questions {
            if start == 0 || start > end || end > self.max_question {
                bail!(
                    "text_questions [{}, {}] must be a range within 1-{}",
                    start,
                    end,
                    self.max_question
                );
            }
        }

        Ok(())
    }

    /// Validate that a control key is named and is not a digit key
    pub fn validate_key(key: &str) -> Result<()> {
        let key = normalize_key_name(key);
        if key.is_empty() {
            return Err(anyhow!("Key name cannot be empty"));
        }
        if key_to_digit(&key).is_some() {
            return Err(anyhow!("Key would shadow a digit"));
        }
        Ok(())
    }

    /// Settings for the input controller
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            trigger_key: self.trigger_key.clone(),
            submit_key: self.submit_key.clone(),
            cancel_key: self.cancel_key.clone(),
            backspace_key: self.backspace_key.clone(),
            debounce: Duration::from_millis(self.debounce_ms),
            timeout: Duration::from_secs(self.input_timeout_secs),
            max_question: self.max_question,
            text_questions: self.text_questions.map(|[start, end]| start..=end),
            blink_duration: Duration::from_millis(self.blink_duration_ms),
        }
    }
}

fn check_range(field: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if !(min..=max).contains(&value) {
        bail!("{} must be {}-{} (got {})", field, min, max, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path() -> PathBuf {
        // Unique per call so parallel tests never share a file
        use std::thread;
        use std::time::{SystemTime, UNIX_EPOCH};

        let mut base = std::env::temp_dir();
        base.push("quizblink_tests");
        base.push("config_file");

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tid = format!("{:?}", thread::current().id()).replace(['(', ')'], "");
        base.push(format!("t_{nanos}_{tid}"));

        let _ = fs::create_dir_all(&base);

        base.join("config.toml")
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.trigger_key, "f9");
        assert_eq!(config.max_question, 20);
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let temp_path = temp_config_path();

        let original = Config {
            remote_url: Some("https://example.com/quiz_answers.json".to_string()),
            trigger_key: "f8".to_string(),
            blink_duration_ms: 300,
            text_questions: Some([18, 20]),
            ..Config::default()
        };

        original.save_to_path(&temp_path).expect("Failed to save");
        let loaded = Config::load_from_path(&temp_path).expect("Failed to load");
        assert_eq!(original, loaded);

        fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_path = temp_config_path();
        fs::write(&temp_path, "blink_duration_ms = 300\n").unwrap();

        let loaded = Config::load_from_path(&temp_path).expect("Failed to load");
        assert_eq!(loaded.blink_duration_ms, 300);
        assert_eq!(loaded.submit_key, "enter");
        assert_eq!(loaded.input_timeout_secs, 30);

        fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_missing_config_file() {
        let missing_path = Path::new("/tmp/quizblink_missing_config_test_config.toml");
        let _ = fs::remove_file(missing_path);

        let result = Config::load_from_path(missing_path);

        assert!(result.is_err());
        if let Err(e) = result {
            let error_msg = format!("{:#}", e);
            assert!(error_msg.contains("not found") || error_msg.contains("--setup"));
        }
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let config = Config {
            submit_key: "Escape".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            format!("{}", err).contains("must be different"),
            "Error message should mention duplicates: {}",
            err
        );
    }

    #[test]
    fn test_digit_keys_rejected() {
        for key in ["5", "é", "minus", ""] {
            let config = Config {
                trigger_key: key.to_string(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "Should reject trigger key {:?}", key);
        }
    }

    #[test]
    fn test_range_validation() {
        let too_fast = Config {
            blink_duration_ms: 10,
            ..Config::default()
        };
        assert!(too_fast.validate().is_err());

        let too_long = Config {
            input_timeout_secs: 301,
            ..Config::default()
        };
        assert!(too_long.validate().is_err());

        let bad_text_range = Config {
            text_questions: Some([19, 25]),
            ..Config::default()
        };
        assert!(bad_text_range.validate().is_err());

        let reversed = Config {
            text_questions: Some([20, 18]),
            ..Config::default()
        };
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_controller_config_conversion() {
        let config = Config {
            text_questions: Some([18, 20]),
            debounce_ms: 150,
            ..Config::default()
        };
        let cc = config.controller_config();
        assert_eq!(cc.text_questions, Some(18..=20));
        assert_eq!(cc.debounce, Duration::from_millis(150));
        assert_eq!(cc.timeout, Duration::from_secs(30));
    }
}
