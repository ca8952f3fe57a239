//! OpenAI SSE stream to [`StreamEvent`] adapter.

use futures_util::StreamExt;

use async_openai::types::chat::{ChatCompletionResponseStream, FinishReason};

use panday_core::llm::EventStream;
use panday_types::llm::{LlmError, StopReason, StreamEvent};
use panday_types::relay::TokenUsage;

pub(crate) fn stop_reason(finish: &FinishReason) -> StopReason {
    match finish {
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        FinishReason::Stop | FinishReason::ToolCalls | FinishReason::FunctionCall => {
            StopReason::EndTurn
        }
    }
}

/// Map an async-openai [`ChatCompletionResponseStream`] to [`StreamEvent`]s.
///
/// Order: `Connected`, then `TextDelta` per non-empty chunk, `MessageDelta`
/// when a finish reason arrives, `Usage` from the final chunk (requires
/// `stream_options.include_usage`), and `Done`.
pub fn map_openai_stream(stream: ChatCompletionResponseStream) -> EventStream {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            for choice in &chunk.choices {
                if let Some(text) = choice.delta.content.as_ref().filter(|t| !t.is_empty()) {
                    yield StreamEvent::TextDelta { text: text.clone() };
                }
                if let Some(finish) = choice.finish_reason.as_ref() {
                    yield StreamEvent::MessageDelta { stop_reason: stop_reason(finish) };
                }
            }

            // The usage chunk arrives last with an empty choices array.
            if let Some(usage) = chunk.usage.as_ref() {
                yield StreamEvent::Usage(TokenUsage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }
        }

        yield StreamEvent::Done;
    })
}
