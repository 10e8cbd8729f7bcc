pub mod hotkeys;
pub mod stdin;

use crate::answers::{AnswerSymbol, QuizAnswerMap};
use crate::constants::{
    ACK_BLINK_COUNT, BLINK_DURATION_DEFAULT_MS, DEBOUNCE_DEFAULT_MS, DEFAULT_BACKSPACE_KEY,
    DEFAULT_CANCEL_KEY, DEFAULT_SUBMIT_KEY, DEFAULT_TRIGGER_KEY, INPUT_TIMEOUT_DEFAULT_SECONDS,
    MAX_QUESTION_DEFAULT,
};
use crate::error::InputError;
use crate::session::InputSession;
use crate::signal::SignalRequest;
use crate::utils::keycode::{key_to_digit, normalize_key_name};
use crate::utils::plural;
use log::{debug, info, warn};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// Where a key event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Physical key; subject to debounce
    Device,
    /// Key name typed as text; each token is a deliberate press
    Text,
}

/// One event from the global key stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub name: String,
    pub kind: KeyEventKind,
    pub origin: KeyOrigin,
}

impl KeyEvent {
    pub fn down(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: KeyEventKind::Down,
            origin: KeyOrigin::Device,
        }
    }

    pub fn up(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: KeyEventKind::Up,
            origin: KeyOrigin::Device,
        }
    }

    /// Key-down read from a text source such as stdin
    pub fn typed(name: impl Into<String>) -> Self {
        Self {
            origin: KeyOrigin::Text,
            ..Self::down(name)
        }
    }
}

/// OS-side registration of the keys a session listens to.
///
/// The host arms the hook when a session starts and disarms it when the
/// session ends, so digits are only intercepted while they mean something.
pub trait KeyHook {
    fn set_armed(&mut self, armed: bool) -> anyhow::Result<()>;
}

/// Keys, timings and ranges the controller works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub trigger_key: String,
    pub submit_key: String,
    pub cancel_key: String,
    pub backspace_key: String,
    pub debounce: Duration,
    pub timeout: Duration,
    pub max_question: u32,
    /// Questions whose answers are free text rather than a letter
    pub text_questions: Option<RangeInclusive<u32>>,
    pub blink_duration: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            trigger_key: DEFAULT_TRIGGER_KEY.to_string(),
            submit_key: DEFAULT_SUBMIT_KEY.to_string(),
            cancel_key: DEFAULT_CANCEL_KEY.to_string(),
            backspace_key: DEFAULT_BACKSPACE_KEY.to_string(),
            debounce: Duration::from_millis(DEBOUNCE_DEFAULT_MS),
            timeout: Duration::from_secs(INPUT_TIMEOUT_DEFAULT_SECONDS),
            max_question: MAX_QUESTION_DEFAULT,
            text_questions: None,
            blink_duration: Duration::from_millis(BLINK_DURATION_DEFAULT_MS),
        }
    }
}

/// Why an armed session ended without a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Trigger pressed again
    Toggled,
    Cancelled,
    TimedOut,
    /// Submit with an empty buffer
    NoInput,
}

/// What a submitted question number resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Blink {
        question: u32,
        symbol: AnswerSymbol,
        request: SignalRequest,
    },
    Text {
        question: u32,
        text: String,
    },
}

/// Result of feeding one event to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Debounced, unrecognised, key-up, or not the trigger while idle
    Ignored,
    Activated {
        ack: SignalRequest,
    },
    Deactivated {
        reason: EndReason,
        ack: Option<SignalRequest>,
    },
    /// Digit added or removed; carries the new buffer
    Buffer(String),
    /// Submit failed but the session stays armed
    Rejected(InputError),
    Resolved(Resolution),
    /// Submit failed and the session ended
    Failed(InputError),
}

impl Outcome {
    /// Blink the host should dispatch for this outcome, if any
    pub fn signal(&self) -> Option<SignalRequest> {
        match self {
            Self::Activated { ack } => Some(*ack),
            Self::Deactivated { ack, .. } => *ack,
            Self::Resolved(Resolution::Blink { request, .. }) => Some(*request),
            _ => None,
        }
    }
}

enum KeyAction {
    Trigger,
    Submit,
    Cancel,
    Backspace,
    Digit(char),
}

/// Turns the global key stream into question numbers.
///
/// Idle until the trigger key arms a session, then collects digits until
/// submit, cancel, a second trigger press, or the inactivity timeout.
pub struct QuizInputController {
    config: ControllerConfig,
    answers: QuizAnswerMap,
    session: Option<InputSession>,
}

impl QuizInputController {
    pub fn new(config: ControllerConfig, answers: QuizAnswerMap) -> Self {
        let config = ControllerConfig {
            trigger_key: normalize_key_name(&config.trigger_key),
            submit_key: normalize_key_name(&config.submit_key),
            cancel_key: normalize_key_name(&config.cancel_key),
            backspace_key: normalize_key_name(&config.backspace_key),
            ..config
        };
        Self {
            config,
            answers,
            session: None,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Swap in freshly loaded answers; takes effect for the next submit
    pub fn set_answers(&mut self, answers: QuizAnswerMap) {
        self.answers = answers;
    }

    pub fn answers(&self) -> &QuizAnswerMap {
        &self.answers
    }

    pub fn is_armed(&self) -> bool {
        self.session.is_some()
    }

    /// Digits typed so far, None while idle
    pub fn buffer(&self) -> Option<&str> {
        self.session.as_ref().map(InputSession::buffer)
    }

    /// When the armed session will time out
    pub fn deadline(&self) -> Option<Instant> {
        self.session.as_ref().map(InputSession::deadline)
    }

    pub fn is_trigger(&self, name: &str) -> bool {
        normalize_key_name(name) == self.config.trigger_key
    }

    /// End the session if its timeout has passed
    pub fn expire(&mut self, now: Instant) -> Option<Outcome> {
        if self.session.as_ref().is_some_and(|s| s.is_expired(now)) {
            info!("Quiz input timed out");
            self.session = None;
            return Some(Outcome::Deactivated {
                reason: EndReason::TimedOut,
                ack: None,
            });
        }
        None
    }

    /// Drop any armed session without a resolution
    pub fn deactivate(&mut self) -> Option<Outcome> {
        self.session.take().map(|_| {
            info!("Quiz input cancelled");
            Outcome::Deactivated {
                reason: EndReason::Cancelled,
                ack: None,
            }
        })
    }

    /// Feed one key event
    pub fn handle_key_event(&mut self, event: &KeyEvent, now: Instant) -> Outcome {
        if event.kind != KeyEventKind::Down {
            return Outcome::Ignored;
        }

        // A late event still must not extend a session whose time is up
        if let Some(outcome) = self.expire(now) {
            return outcome;
        }

        let key = normalize_key_name(&event.name);

        if self.session.is_none() {
            if key == self.config.trigger_key {
                return self.activate(&key, now);
            }
            return Outcome::Ignored;
        }

        let action = self.classify(&key);
        let debounce = self.config.debounce;
        let Some(session) = self.session.as_mut() else {
            return Outcome::Ignored;
        };

        if event.origin == KeyOrigin::Device && session.is_repeat(&key, now, debounce) {
            debug!("Ignoring repeat of '{}'", key);
            return Outcome::Ignored;
        }

        let Some(action) = action else {
            debug!("Unrecognized key '{}' - ignoring", key);
            return Outcome::Ignored;
        };

        session.accept(&key, now);

        match action {
            KeyAction::Digit(digit) => {
                session.push_digit(digit);
                debug!("Question number: {} (typed: {})", session.buffer(), event.name);
                Outcome::Buffer(session.buffer().to_string())
            }
            KeyAction::Backspace => {
                session.pop_digit();
                debug!("Question number: {:?}", session.buffer());
                Outcome::Buffer(session.buffer().to_string())
            }
            KeyAction::Cancel => {
                info!("Quiz input cancelled");
                self.session = None;
                Outcome::Deactivated {
                    reason: EndReason::Cancelled,
                    ack: None,
                }
            }
            KeyAction::Trigger => {
                info!("Quiz input mode deactivated");
                self.session = None;
                Outcome::Deactivated {
                    reason: EndReason::Toggled,
                    ack: Some(self.ack_request()),
                }
            }
            KeyAction::Submit => self.submit(now),
        }
    }

    fn activate(&mut self, trigger: &str, now: Instant) -> Outcome {
        self.session = Some(InputSession::new(trigger, now, self.config.timeout));
        info!(
            "Quiz input mode activated - type a question number (1-{}), {} to submit, {} to cancel",
            self.config.max_question, self.config.submit_key, self.config.cancel_key
        );
        if self.answers.is_empty() {
            warn!("No quiz answers loaded - every question will be reported as not found");
        }
        Outcome::Activated {
            ack: self.ack_request(),
        }
    }

    fn classify(&self, key: &str) -> Option<KeyAction> {
        let config = &self.config;
        if key == config.trigger_key {
            Some(KeyAction::Trigger)
        } else if key == config.submit_key {
            Some(KeyAction::Submit)
        } else if key == config.cancel_key {
            Some(KeyAction::Cancel)
        } else if key == config.backspace_key {
            Some(KeyAction::Backspace)
        } else {
            key_to_digit(key).map(KeyAction::Digit)
        }
    }

    fn submit(&mut self, now: Instant) -> Outcome {
        let Some(session) = self.session.as_mut() else {
            return Outcome::Ignored;
        };

        let buffer = session.take_buffer();
        debug!(
            "Submitted {:?} after {:.1}s",
            buffer,
            session.elapsed(now).as_secs_f32()
        );
        if buffer.is_empty() {
            warn!("No question number entered");
            self.session = None;
            return Outcome::Deactivated {
                reason: EndReason::NoInput,
                ack: None,
            };
        }

        let value = match buffer.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                let err = InputError::InvalidFormat(buffer);
                warn!("{} - try again", err);
                return Outcome::Rejected(err);
            }
        };

        let max = self.config.max_question;
        if value < 1 || value > u64::from(max) {
            let err = InputError::OutOfRange { value, max };
            warn!("{} - try again", err);
            return Outcome::Rejected(err);
        }

        self.session = None;
        // Bounded by max_question above
        let question = value as u32;
        match self.resolve(question) {
            Ok(resolution) => Outcome::Resolved(resolution),
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Look up `question` and decide how its answer is delivered
    pub fn resolve(&self, question: u32) -> Result<Resolution, InputError> {
        let Some(answer) = self.answers.get(question) else {
            warn!("No answer found for question {}", question);
            if !self.answers.is_empty() {
                let available: Vec<String> =
                    self.answers.questions().map(|q| q.to_string()).collect();
                info!("Available questions: {}", available.join(", "));
            }
            return Err(InputError::NotFound(question));
        };

        if self
            .config
            .text_questions
            .as_ref()
            .is_some_and(|range| range.contains(&question))
        {
            info!("Question {}: text answer", question);
            return Ok(Resolution::Text {
                question,
                text: answer.to_string(),
            });
        }

        match AnswerSymbol::parse(answer) {
            Some(symbol) => {
                info!(
                    "Question {}: answer {} = {} blink{}",
                    question,
                    symbol,
                    symbol.blink_count(),
                    plural(symbol.blink_count() as usize)
                );
                Ok(Resolution::Blink {
                    question,
                    symbol,
                    request: SignalRequest::for_answer(symbol, self.config.blink_duration),
                })
            }
            None => {
                let err = InputError::UnknownAnswerSymbol {
                    question,
                    answer: answer.to_string(),
                };
                warn!("{}", err);
                Err(err)
            }
        }
    }

    fn ack_request(&self) -> SignalRequest {
        SignalRequest::new(ACK_BLINK_COUNT, self.config.blink_duration)
    }
}
