use async_trait::async_trait;
use client_core::Prompter;
use tokio::{
    io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin},
    sync::Mutex,
};

/// Line-oriented stdin/stdout prompter shared by one-shot commands and the shell.
///
/// At a value prompt an empty line keeps the shown default, `-` blanks the
/// value and end of input cancels.
pub struct TerminalPrompter {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(io::stdin()).lines()),
        }
    }

    /// Prints `label` and reads one line. `None` on end of input.
    pub async fn read_line(&self, label: &str) -> Option<String> {
        let mut stdout = io::stdout();
        if stdout.write_all(label.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return None;
        }
        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!("failed to read from stdin: {err}");
                None
            }
        }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, message: &str) -> bool {
        self.read_line(&format!("{message} [y/N] "))
            .await
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }

    async fn prompt(&self, message: &str, default: &str) -> Option<String> {
        let answer = self.read_line(&format!("{message} [{default}] ")).await?;
        Some(interpret_answer(&answer, default))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn interpret_answer(answer: &str, default: &str) -> String {
    match answer.trim() {
        "" => default.to_string(),
        "-" => String::new(),
        other => other.to_string(),
    }
}

/// Splits a shell line into words. Double quotes group words containing spaces.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
