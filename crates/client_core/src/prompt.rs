use async_trait::async_trait;

/// User confirmation and free-text prompts.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
    /// `None` means the user cancelled.
    async fn prompt(&self, message: &str, default: &str) -> Option<String>;
}

/// Confirms everything and accepts every default. Used for `--yes` runs.
pub struct AssumeYes;

#[async_trait]
impl Prompter for AssumeYes {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }

    async fn prompt(&self, _message: &str, default: &str) -> Option<String> {
        Some(default.to_string())
    }
}
