// Library interface for quizblink
// This allows tests and the CLI binary to access the crate's functionality

pub mod answers;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod error;
pub mod input;
pub mod session;
pub mod signal;
pub mod text;
pub mod utils;

use anyhow::Result;
use answers::{load_or_empty, AnswerSource};
use input::{ControllerConfig, KeyEvent, KeyEventKind, KeyHook, Outcome, QuizInputController, Resolution};
use log::{error, info, warn};
use signal::{BinaryOutput, SignalHandle, SignalWorker};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;
use text::TextSink;

/// Ties the input controller to its collaborators: the answer source, the
/// blink worker, the text sink and the OS key hook
pub struct QuizBlinkCore {
    controller: QuizInputController,
    source: Box<dyn AnswerSource>,
    worker: SignalWorker,
    text_sink: Box<dyn TextSink>,
    in_flight: Option<SignalHandle>,
}

impl QuizBlinkCore {
    /// Create a core whose blink worker owns `output`
    pub fn new<O: BinaryOutput + 'static>(
        config: ControllerConfig,
        source: Box<dyn AnswerSource>,
        output: O,
        text_sink: Box<dyn TextSink>,
    ) -> Result<Self> {
        let answers = load_or_empty(source.as_ref());
        Ok(Self {
            controller: QuizInputController::new(config, answers),
            source,
            worker: SignalWorker::spawn(output)?,
            text_sink,
            in_flight: None,
        })
    }

    pub fn controller(&self) -> &QuizInputController {
        &self.controller
    }

    /// Feed one key event and carry out its side effects
    pub fn handle_event(
        &mut self,
        event: &KeyEvent,
        now: Instant,
        hook: &mut dyn KeyHook,
    ) -> Outcome {
        let was_armed = self.controller.is_armed();

        // Pick up edits to the answers file before each session
        if !was_armed && event.kind == KeyEventKind::Down && self.controller.is_trigger(&event.name)
        {
            self.controller.set_answers(load_or_empty(self.source.as_ref()));
        }

        let outcome = self.controller.handle_key_event(event, now);
        self.apply(&outcome, was_armed, hook);
        outcome
    }

    /// Expire the armed session if its deadline has passed
    pub fn tick(&mut self, now: Instant, hook: &mut dyn KeyHook) -> Option<Outcome> {
        let was_armed = self.controller.is_armed();
        let outcome = self.controller.expire(now)?;
        self.apply(&outcome, was_armed, hook);
        Some(outcome)
    }

    /// Process events until the channel closes.
    ///
    /// While armed the wait is bounded by the session deadline, so the
    /// timeout fires even when no further keys arrive.
    pub fn run(&mut self, events: Receiver<KeyEvent>, hook: &mut dyn KeyHook) -> Result<()> {
        info!(
            "Waiting for trigger key '{}'",
            self.controller.config().trigger_key
        );

        loop {
            let next = match self.controller.deadline() {
                Some(deadline) => {
                    events.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match next {
                Ok(event) => {
                    self.handle_event(&event, Instant::now(), hook);
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.tick(Instant::now(), hook);
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("Key input closed - shutting down");
        let was_armed = self.controller.is_armed();
        if let Some(outcome) = self.controller.deactivate() {
            self.apply(&outcome, was_armed, hook);
        }
        Ok(())
    }

    /// Block until the most recently dispatched blink has finished
    pub fn wait_for_signal(&mut self) -> Option<Result<(), error::SignalError>> {
        self.in_flight.take().map(SignalHandle::wait)
    }

    fn apply(&mut self, outcome: &Outcome, was_armed: bool, hook: &mut dyn KeyHook) {
        // A new session supersedes whatever is still blinking
        if matches!(outcome, Outcome::Activated { .. }) {
            if let Some(previous) = self.in_flight.take() {
                previous.cancel();
            }
        }

        if let Some(request) = outcome.signal() {
            self.in_flight = Some(self.worker.emit(request));
        }

        if let Outcome::Resolved(Resolution::Text { question, text }) = outcome {
            if let Err(e) = self.text_sink.send_text(*question, text) {
                warn!("Failed to deliver text answer for question {}: {:#}", question, e);
            }
        }

        let armed = self.controller.is_armed();
        if armed != was_armed {
            if let Err(e) = hook.set_armed(armed) {
                error!("Failed to update key hook: {:#}", e);
            }
        }
    }
}
