// Example sentence generator
//
// Asks an LLM provider for short everyday German sentences that use a word,
// each paired with an English translation.

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use crate::dictionary::ExampleSentence;
use crate::providers::{ChatMessage, ChatRequest, LlmProvider};

const EXAMPLE_COUNT: usize = 5;

pub struct ExampleGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl ExampleGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub fn build_prompt(word: &str) -> String {
        format!(
            "Generate {count} short German sentences that use the word \"{word}\" the way it \
             appears in daily life. Give each sentence an English translation. Reply with only \
             a JSON array of objects with the keys \"de\" and \"en\".",
            count = EXAMPLE_COUNT,
            word = word,
        )
    }

    pub async fn generate(&self, word: &str) -> Result<Vec<ExampleSentence>> {
        let request = ChatRequest::new(vec![
            ChatMessage::system("You are a helpful German language tutor."),
            ChatMessage::user(Self::build_prompt(word)),
        ])
        .with_model(self.model.clone())
        .with_temperature(self.temperature);

        tracing::debug!("Generating examples for '{}' via {}", word, self.provider.name());
        let response = self.provider.complete(&request).await?;

        parse_examples(&response.content)
    }
}

/// Parse the model's reply, tolerating a surrounding ``` fence.
pub fn parse_examples(reply: &str) -> Result<Vec<ExampleSentence>> {
    let body = strip_code_fence(reply.trim());
    if body.is_empty() {
        bail!("The model returned an empty reply");
    }

    serde_json::from_str(body).context("The model reply is not a JSON array of {de, en} objects")
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().trim_end_matches("```").trim()
}
