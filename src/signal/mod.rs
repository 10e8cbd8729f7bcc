//! Blink signalling on a single binary output
//!
//! An answer letter is shown as a number of ON/OFF cycles of an indicator
//! (A=1 .. E=5). The output is always put back into the state it had before
//! the sequence started, whether the sequence completes, is cancelled, or the
//! device fails halfway through.

pub mod device;
pub mod worker;

use crate::answers::AnswerSymbol;
use crate::error::SignalError;
use crate::utils::plural;
use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use device::{MemoryOutput, SysfsLed};
pub use worker::{SignalHandle, SignalWorker};

/// A toggleable binary indicator such as a keyboard LED
pub trait BinaryOutput: Send {
    /// Current state of the indicator (true = lit)
    fn get_state(&self) -> Result<bool, SignalError>;

    /// Drive the indicator to `on`
    fn set_state(&mut self, on: bool) -> Result<(), SignalError>;
}

impl<T: BinaryOutput + ?Sized> BinaryOutput for Box<T> {
    fn get_state(&self) -> Result<bool, SignalError> {
        (**self).get_state()
    }

    fn set_state(&mut self, on: bool) -> Result<(), SignalError> {
        (**self).set_state(on)
    }
}

/// One blink sequence: `count` cycles, each half-cycle lasting `duration`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRequest {
    pub count: u32,
    pub duration: Duration,
}

impl SignalRequest {
    pub fn new(count: u32, duration: Duration) -> Self {
        Self { count, duration }
    }

    /// Request that spells out an answer letter
    pub fn for_answer(symbol: AnswerSymbol, duration: Duration) -> Self {
        Self::new(symbol.blink_count(), duration)
    }
}

/// Shared cancellation flag with an interruptible sleep
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.inner.cancelled.lock() = true;
        self.inner.cond.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep for `duration`, waking early on cancellation.
    ///
    /// Returns true if the token was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            if self.inner.cond.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Blink `output` according to `request`, restoring its original state.
///
/// Blocks for roughly `(2 * count - 1) * duration`. Cancellation is honoured
/// at half-cycle boundaries and reported as [`SignalError::Interrupted`].
pub fn blink(
    output: &mut dyn BinaryOutput,
    request: SignalRequest,
    cancel: &CancelToken,
) -> Result<(), SignalError> {
    let original = output.get_state()?;

    info!(
        "Blinking {} time{}",
        request.count,
        plural(request.count as usize)
    );

    let result = run_cycles(output, request, cancel);

    // Restore on every path
    if let Err(e) = output.set_state(original) {
        error!("Failed to restore output state: {}", e);
        return result.and(Err(e));
    }

    result
}

fn run_cycles(
    output: &mut dyn BinaryOutput,
    request: SignalRequest,
    cancel: &CancelToken,
) -> Result<(), SignalError> {
    let interrupted = |completed| SignalError::Interrupted {
        completed,
        requested: request.count,
    };

    for i in 0..request.count {
        if cancel.is_cancelled() {
            return Err(interrupted(i));
        }

        output.set_state(true)?;
        debug!("Blink {}/{} - ON", i + 1, request.count);
        if cancel.sleep(request.duration) {
            return Err(interrupted(i));
        }

        output.set_state(false)?;
        debug!("Blink {}/{} - OFF", i + 1, request.count);

        // No trailing gap after the final cycle
        if i + 1 < request.count && cancel.sleep(request.duration) {
            return Err(interrupted(i + 1));
        }
    }

    Ok(())
}
