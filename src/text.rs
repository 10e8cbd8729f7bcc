use anyhow::Result;
use log::info;

/// Receives free-text answers, which are replayed rather than blinked
pub trait TextSink: Send {
    fn send_text(&mut self, question: u32, text: &str) -> Result<()>;
}

/// Writes text answers to the log
pub struct LogTextSink;

impl TextSink for LogTextSink {
    fn send_text(&mut self, question: u32, text: &str) -> Result<()> {
        info!("Question {}: {}", question, text);
        Ok(())
    }
}
