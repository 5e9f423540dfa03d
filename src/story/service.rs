//! Story operations backed by the completion service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::CompletionBackend;
use crate::error::ServiceResult;
use crate::resilience::{RetryExecutor, Sleeper, TokioSleeper};
use crate::story::prompts;

/// Response of the story-opening operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryOpening {
    pub message: String,
}

/// Response of the continuation and action-listing operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryText {
    pub initial: String,
}

/// Prompts the completion service through the retry executor.
pub struct StoryService<S = TokioSleeper> {
    backend: Arc<dyn CompletionBackend>,
    executor: RetryExecutor<S>,
}

impl<S: Sleeper> StoryService<S> {
    pub fn new(backend: Arc<dyn CompletionBackend>, executor: RetryExecutor<S>) -> Self {
        Self { backend, executor }
    }

    /// Open a story from the player's premise.
    pub async fn start_story(&self, premise: &str) -> ServiceResult<StoryOpening> {
        let prompt = prompts::start_story(premise);
        let message = self.generate("start_story", &prompt).await?;
        Ok(StoryOpening { message })
    }

    /// Continue `story` with the action the player picked.
    pub async fn continue_story(&self, story: &str, action: &str) -> ServiceResult<StoryText> {
        let prompt = prompts::continue_story(story, action);
        let initial = self.generate("continue_story", &prompt).await?;
        Ok(StoryText { initial })
    }

    /// Ask for four candidate actions. The raw `[a!b!c!d]` text is returned
    /// untouched; see [`split_actions`].
    pub async fn list_actions(&self, story: &str) -> ServiceResult<StoryText> {
        let prompt = prompts::list_actions(story);
        let initial = self.generate("list_actions", &prompt).await?;
        Ok(StoryText { initial })
    }

    async fn generate(&self, label: &str, prompt: &str) -> ServiceResult<String> {
        let backend = &self.backend;
        self.executor
            .execute(label, || backend.complete(prompt))
            .await
    }
}

/// Split a `[Action1!Action2!...]` reply into trimmed, non-empty labels.
///
/// Text outside the first bracket pair is ignored; a reply without brackets
/// is split as a whole.
pub fn split_actions(raw: &str) -> Vec<String> {
    let inner = match (raw.find('['), raw.rfind(']')) {
        (Some(open), Some(close)) if open < close => &raw[open + 1..close],
        _ => raw,
    };
    inner
        .split('!')
        .map(|s| s.trim().trim_matches(|c| c == '[' || c == ']').trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
