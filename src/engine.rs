#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grading engine boundary.
//!
//! Everything behind [`GradingEngine::submit`] is opaque: a prompt and a
//! response schema go in, a validated [`GradingReport`] or an
//! [`EngineError`] comes out.

use std::{future::Future, time::Duration};

use anyhow::{Result, anyhow};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs, ReasoningEffort,
        ResponseFormat, ResponseFormatJsonSchema,
    },
};

use crate::{
    config::{ConfigHandle, EngineEnv},
    error::EngineError,
    report::{DecodeOptions, GradingReport, decode_report},
    request::{ClassInput, ContentPart, GradingRequest, build_request, response_schema},
};

/// Anything that can turn a class into a graded report.
pub trait GradingEngine {
    /// Grades one class. Implementations must not retry on their own.
    fn submit(
        &self,
        input: &ClassInput,
    ) -> impl Future<Output = Result<GradingReport, EngineError>> + Send;
}

/// Runs [`GradingEngine::submit`] under a deadline.
///
/// Expiry is reported as [`EngineError::Timeout`]; nothing from the
/// abandoned call is kept.
pub async fn submit_with_timeout<E>(
    engine: &E,
    input: &ClassInput,
    limit: Duration,
) -> Result<GradingReport, EngineError>
where
    E: GradingEngine,
{
    match tokio::time::timeout(limit, engine.submit(input)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!("Grading engine did not answer within {limit:?}");
            Err(EngineError::Timeout(limit))
        }
    }
}

/// Engine backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiEngine {
    /// HTTP client bound to the configured endpoint.
    client:             OpenAIClient<OpenAIConfig>,
    /// Model identifier.
    model:              String,
    /// Optional sampling temperature.
    temperature:        Option<f32>,
    /// Reasoning effort hint.
    reasoning_effort:   ReasoningEffort,
    /// System instruction sent ahead of the class data.
    system_instruction: String,
    /// Row validator settings.
    decode:             DecodeOptions,
}

impl OpenAiEngine {
    /// Creates an engine from explicit settings.
    pub fn new(env: &EngineEnv, system_instruction: impl Into<String>, decode: DecodeOptions) -> Self {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(env.api_base().to_owned())
                .with_api_key(env.api_key().to_owned()),
        );
        Self {
            client,
            model: env.model().to_owned(),
            temperature: env.temperature(),
            reasoning_effort: env.reasoning_effort(),
            system_instruction: system_instruction.into(),
            decode,
        }
    }

    /// Creates an engine from the global configuration.
    pub fn from_config(cfg: &ConfigHandle) -> Result<Self> {
        let env = cfg.engine().ok_or_else(|| {
            anyhow!("TALLY_API_KEY (or GEMINI_API_KEY) must be set to grade submissions.")
        })?;
        Ok(Self::new(env, cfg.prompts().system_instruction(), cfg.decode_options()))
    }

    /// Converts the built request into chat messages.
    fn messages(
        &self,
        request: GradingRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, EngineError> {
        let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> =
            Vec::with_capacity(request.parts().len());

        for part in request.into_parts() {
            match part {
                image @ ContentPart::Image { .. } => {
                    let url = image.data_url().unwrap_or_default();
                    parts.push(
                        ChatCompletionRequestMessageContentPartImageArgs::default()
                            .image_url(
                                ImageUrlArgs::default()
                                    .url(url)
                                    .detail(ImageDetail::High)
                                    .build()?,
                            )
                            .build()?
                            .into(),
                    );
                }
                ContentPart::Text { text, .. } => {
                    parts.push(
                        ChatCompletionRequestMessageContentPartTextArgs::default()
                            .text(text)
                            .build()?
                            .into(),
                    );
                }
            }
        }

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_instruction.clone())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(parts)
                .build()?
                .into(),
        ])
    }
}

impl GradingEngine for OpenAiEngine {
    async fn submit(&self, input: &ClassInput) -> Result<GradingReport, EngineError> {
        let request = build_request(input)?;
        let messages = self.messages(request)?;

        let mut chat = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some("Graded class report".to_string()),
                    name:        "grading_report".to_string(),
                    schema:      Some(response_schema()),
                    strict:      Some(false),
                },
            })
            .build()?;
        chat.temperature = self.temperature;
        chat.reasoning_effort = Some(self.reasoning_effort.clone());

        tracing::info!("Sending class to {}", self.model);
        let response = self.client.chat().create(chat).await?;

        let payload = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| EngineError::MalformedResponse("no content in response".into()))?;

        decode_report(&payload, self.decode)
    }
}
