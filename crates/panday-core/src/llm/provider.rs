//! ChatModel trait definition.

use std::pin::Pin;

use futures_util::Stream;

use panday_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Boxed stream of provider events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// A streaming chat completion backend.
///
/// Object-safe so the server can hold `Arc<dyn ChatModel>` chosen at
/// startup from `AI_PROVIDER`.
pub trait ChatModel: Send + Sync {
    /// Provider name as configured (e.g. "openai", "google").
    fn name(&self) -> &str;

    /// Model used when the request leaves `model` empty.
    fn model(&self) -> &str;

    /// Start a streaming completion.
    ///
    /// Ends with [`StreamEvent::Done`] on success. Errors are yielded as
    /// stream items and end the stream.
    fn stream(&self, request: CompletionRequest) -> EventStream;
}
