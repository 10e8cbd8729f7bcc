//! Quiz answer data
//!
//! Answers are stored as JSON in the same shape the quiz tooling has always
//! used:
//!
//! ```json
//! { "answers": { "1": { "answer": "B" }, "12": { "answer": "C" } } }
//! ```
//!
//! The map is loaded before a session starts and is read-only afterwards.
//! A source that cannot be loaded degrades to an empty map, so every
//! question resolves to "not found" instead of failing the session.

use crate::constants::REMOTE_FETCH_TIMEOUT_SECS;
use crate::utils::plural;
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Multiple-choice answer, shown as 1-5 blinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerSymbol {
    A,
    B,
    C,
    D,
    E,
}

impl AnswerSymbol {
    /// Parse a single letter A-E, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match ch.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            _ => None,
        }
    }

    pub fn blink_count(self) -> u32 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
            Self::D => 4,
            Self::E => 5,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }
}

impl fmt::Display for AnswerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswerRecord {
    answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswersFile {
    #[serde(default)]
    answers: BTreeMap<String, AnswerRecord>,
}

/// Question number -> raw answer text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizAnswerMap {
    entries: BTreeMap<u32, String>,
}

impl QuizAnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the answers JSON document
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: AnswersFile =
            serde_json::from_str(contents).context("Failed to parse answers JSON")?;

        let mut map = Self::new();
        for (key, record) in file.answers {
            let question: u32 = key
                .trim()
                .parse()
                .with_context(|| format!("Invalid question number: {:?}", key))?;
            if question == 0 {
                bail!("Question numbers start at 1 (got {:?})", key);
            }
            if record.answer.trim().is_empty() {
                bail!("Empty answer for question {}", question);
            }
            // "1" and "01" name the same question
            if map.entries.contains_key(&question) {
                bail!("Duplicate entry for question {}", question);
            }
            map.entries.insert(question, record.answer);
        }
        Ok(map)
    }

    /// Serialize back to the answers JSON document
    pub fn to_json(&self) -> Result<String> {
        let file = AnswersFile {
            answers: self
                .entries
                .iter()
                .map(|(q, a)| (q.to_string(), AnswerRecord { answer: a.clone() }))
                .collect(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize answers")
    }

    pub fn insert(&mut self, question: u32, answer: impl Into<String>) {
        self.entries.insert(question, answer.into());
    }

    pub fn get(&self, question: u32) -> Option<&str> {
        self.entries.get(&question).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Question numbers in ascending order
    pub fn questions(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.entries.iter().map(|(q, a)| (*q, a.as_str()))
    }
}

/// Somewhere answers can be loaded from
pub trait AnswerSource: Send {
    fn load(&self) -> Result<QuizAnswerMap>;

    /// Human-readable location for log messages
    fn describe(&self) -> String;
}

/// Load from `source`, falling back to an empty map on failure
pub fn load_or_empty(source: &dyn AnswerSource) -> QuizAnswerMap {
    match source.load() {
        Ok(map) => {
            info!(
                "Loaded {} answer{} from {}",
                map.len(),
                plural(map.len()),
                source.describe()
            );
            map
        }
        Err(e) => {
            warn!(
                "Could not load answers from {}: {:#}",
                source.describe(),
                e
            );
            QuizAnswerMap::new()
        }
    }
}

/// Local JSON file
pub struct FileAnswerSource {
    path: PathBuf,
}

impl FileAnswerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents with `map`
    pub fn store(&self, map: &QuizAnswerMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create answers directory")?;
        }
        fs::write(&self.path, map.to_json()?)
            .with_context(|| format!("Failed to write answers file: {}", self.path.display()))?;
        info!("Saved {} answers to {}", map.len(), self.path.display());
        Ok(())
    }
}

impl AnswerSource for FileAnswerSource {
    fn load(&self) -> Result<QuizAnswerMap> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read answers file: {}", self.path.display()))?;
        QuizAnswerMap::from_json(&contents)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Answers served over HTTP, either as the raw JSON file or wrapped in a
/// GitHub "contents" API response
pub struct RemoteAnswerSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl RemoteAnswerSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REMOTE_FETCH_TIMEOUT_SECS))
            .user_agent(concat!("quizblink/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl AnswerSource for RemoteAnswerSource {
    fn load(&self) -> Result<QuizAnswerMap> {
        debug!("Fetching answers from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Fetching {} returned HTTP {}", self.url, status);
        }

        let body = response.text().context("Failed to read response body")?;
        decode_remote_payload(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Decode a remote response body into an answer map.
///
/// GitHub's contents API wraps the file as
/// `{"content": "<base64 with line breaks>", "encoding": "base64"}`; anything
/// without a `content` field is treated as the answers document itself.
pub fn decode_remote_payload(body: &str) -> Result<QuizAnswerMap> {
    let value: serde_json::Value =
        serde_json::from_str(body).context("Remote answers are not valid JSON")?;

    let Some(content) = value.get("content").and_then(|c| c.as_str()) else {
        return QuizAnswerMap::from_json(body);
    };

    if let Some(encoding) = value.get("encoding").and_then(|e| e.as_str()) {
        if encoding != "base64" {
            return Err(anyhow!("Unsupported content encoding: {}", encoding));
        }
    }

    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .context("Failed to decode base64 content")?;
    let text = String::from_utf8(bytes).context("Remote answers are not UTF-8")?;
    QuizAnswerMap::from_json(&text)
}
