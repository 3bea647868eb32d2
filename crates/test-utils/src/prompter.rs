use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use interactive_feedback::feedback::{FeedbackPrompter, PromptRequest};

/// A prompter that:
/// - records every request it was shown
/// - optionally sleeps first, to simulate a human taking their time
/// - answers with a fixed string, or fails with a fixed message.
#[derive(Debug, Clone)]
pub struct ScriptedPrompter {
    answer: Result<String, String>,
    delay: Duration,
    seen: Arc<Mutex<Vec<PromptRequest>>>,
}

impl ScriptedPrompter {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Ok(answer.into()),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn seen(&self) -> Vec<PromptRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl FeedbackPrompter for ScriptedPrompter {
    fn prompt<'a>(
        &'a self,
        request: &'a PromptRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone().map_err(anyhow::Error::msg)
        })
    }
}
