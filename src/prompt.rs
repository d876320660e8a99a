//! Line-oriented prompting over async reader/writer pairs
//!
//! The prompter owns the single input stream of the process. End of input is
//! reported as [`PromptError::Cancelled`]; invalid answers are reported to
//! the user and the question is asked again.

use std::fmt::Display;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum PromptError {
    /// Input closed or the user declined to continue
    #[error("cancelled by user")]
    Cancelled,

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Write a line of output
    pub async fn say(&mut self, text: impl Display) -> Result<(), PromptError> {
        let line = format!("{}\n", text);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Show `prompt` and read one line, without the trailing newline.
    pub async fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until `parse` accepts the answer.
    pub async fn ask<T, E, F>(&mut self, prompt: &str, mut parse: F) -> Result<T, PromptError>
    where
        E: Display,
        F: FnMut(&str) -> Result<T, E>,
    {
        loop {
            let answer = self.read_line(prompt).await?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(format!("  ✗ {}", e)).await?,
            }
        }
    }

    /// Numbered menu; returns the value of the chosen entry.
    pub async fn choose<T: Copy>(&mut self, title: &str, options: &[(&str, T)]) -> Result<T, PromptError> {
        self.say(title).await?;
        for (index, (label, _)) in options.iter().enumerate() {
            self.say(format!("  {}) {}", index + 1, label)).await?;
        }
        let prompt = format!("Choose [1-{}]: ", options.len());
        self.ask(&prompt, |answer| {
            answer
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i))
                .map(|(_, value)| *value)
                .ok_or_else(|| format!("please enter a number between 1 and {}", options.len()))
        })
        .await
    }

    /// Yes/no question; anything but `y`/`yes` is a no.
    pub async fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError> {
        let answer = self.read_line(prompt).await?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
