use std::io::{self, Write};

use async_trait::async_trait;
use client_core::Confirm;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
};

/// Line-oriented terminal input shared by the shell and confirmation prompts.
pub struct StdinPrompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// `None` once stdin is closed.
    pub async fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        self.lines.lock().await.next_line().await
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Confirm for StdinPrompt {
    async fn confirm(&self, prompt: &str) -> bool {
        match self.read_line(&format!("{prompt} [y/N] ")).await {
            Ok(Some(answer)) => is_yes(&answer),
            _ => false,
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
