use super::{blink, BinaryOutput, CancelToken, SignalRequest};
use crate::error::SignalError;
use crate::utils::plural;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Job {
    request: SignalRequest,
    cancel: CancelToken,
    reply: mpsc::Sender<Result<(), SignalError>>,
}

/// Dedicated thread that owns the output and runs blink sequences one at a
/// time, so the key-event thread never sleeps.
pub struct SignalWorker {
    sender: Option<mpsc::Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl SignalWorker {
    pub fn spawn<O: BinaryOutput + 'static>(mut output: O) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();

        let thread = thread::Builder::new()
            .name("blink-worker".to_string())
            .spawn(move || {
                debug!("Blink worker started");
                let mut last_finished: Option<Instant> = None;
                for job in receiver {
                    // Keep queued sequences visibly apart
                    if let Some(finished) = last_finished {
                        let gap = job.request.duration.saturating_sub(finished.elapsed());
                        if !gap.is_zero() {
                            job.cancel.sleep(gap);
                        }
                    }

                    let result = blink(&mut output, job.request, &job.cancel);
                    last_finished = Some(Instant::now());
                    match &result {
                        Ok(()) => info!(
                            "Blinked {} time{}",
                            job.request.count,
                            plural(job.request.count as usize)
                        ),
                        Err(e) => warn!("Blink failed: {}", e),
                    }
                    // Caller may have dropped its handle
                    let _ = job.reply.send(result);
                }
                debug!("Blink worker stopped");
            })
            .context("Failed to spawn blink worker thread")?;

        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Queue a blink sequence and return a handle to cancel or await it
    pub fn emit(&self, request: SignalRequest) -> SignalHandle {
        let cancel = CancelToken::new();
        let (reply, result) = mpsc::channel();

        if let Some(sender) = &self.sender {
            let job = Job {
                request,
                cancel: cancel.clone(),
                reply,
            };
            if sender.send(job).is_err() {
                warn!("Blink worker is gone - request dropped");
            }
        }

        SignalHandle { cancel, result }
    }
}

impl Drop for SignalWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after queued jobs
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Blink worker panicked");
            }
        }
    }
}

/// Pending blink sequence
pub struct SignalHandle {
    cancel: CancelToken,
    result: mpsc::Receiver<Result<(), SignalError>>,
}

impl SignalHandle {
    /// Ask the sequence to stop at the next half-cycle boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the sequence has finished
    pub fn wait(self) -> Result<(), SignalError> {
        self.result.recv().unwrap_or_else(|_| Err(worker_gone()))
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<(), SignalError>> {
        match self.result.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(worker_gone())),
        }
    }
}

fn worker_gone() -> SignalError {
    SignalError::DeviceUnavailable("blink worker stopped".to_string())
}
