//! Key events typed as text, one key name per whitespace-separated token.
//!
//! Used for terminals, scripted runs and machines where global hotkeys are
//! not available: `f9 1 2 enter` behaves like pressing those keys, including
//! repeated digits such as `1 1`.

use super::{KeyEvent, KeyHook};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread;

/// Split one line into typed key-down events
pub fn parse_line(line: &str) -> Vec<KeyEvent> {
    line.split_whitespace().map(KeyEvent::typed).collect()
}

/// Forward key names from `reader` to `sender` on a background thread.
///
/// The thread exits at end of input or once the receiver is gone, which
/// closes the channel and ends the host loop.
pub fn spawn_reader<R>(reader: R, sender: Sender<KeyEvent>) -> Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("stdin-keys".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Failed to read key input: {}", e);
                        break;
                    }
                };
                for event in parse_line(&line) {
                    debug!("Key from input: {}", event.name);
                    if sender.send(event).is_err() {
                        return;
                    }
                }
            }
            debug!("Key input closed");
        })
        .context("Failed to spawn stdin reader thread")
}

/// Text input needs no OS registration
pub struct StdinHook;

impl KeyHook for StdinHook {
    fn set_armed(&mut self, _armed: bool) -> Result<()> {
        Ok(())
    }
}
