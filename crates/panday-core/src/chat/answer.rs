//! Retrieval chat: context lookup, tool events, streamed answer and the
//! per-request debug record.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::StreamExt;
use serde_json::{Value, json};

use panday_types::chat::SourceDocument;
use panday_types::error::ChatError;
use panday_types::llm::{CompletionRequest, Message, MessageRole, StreamEvent};
use panday_types::relay::{DebugRecord, RequestTimings, ToolEvent};

use crate::chat::prompt::{MAX_OUTPUT_TOKENS, build_system_prompt, relevant_sources};
use crate::event::ToolEventHub;
use crate::llm::ChatModel;
use crate::llm::provider::EventStream;
use crate::relay::DebugStore;
use crate::retrieval::{QueryRequest, Retriever};
use crate::storage::kv_store::KeyValueStore;

/// Tool name reported for the embeddings lookup.
pub const RETRIEVE_TOOL: &str = "retrieve_context";

const MAX_TOP_K: u64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub roadmap_id: Option<String>,
    pub top_k: Option<u32>,
}

impl ChatRequest {
    /// Validate a raw JSON body. `message` must be a non-empty string.
    pub fn from_json(body: &Value) -> Result<Self, ChatError> {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .ok_or(ChatError::InvalidMessage)?;
        let roadmap_id = body
            .get("roadmap_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let top_k = body
            .get("top_k")
            .and_then(Value::as_u64)
            .map(|k| k.clamp(1, MAX_TOP_K) as u32);
        Ok(Self {
            message: message.to_string(),
            roadmap_id,
            top_k,
        })
    }
}

/// A started answer: retrieval is done, the model stream is pending.
pub struct PreparedAnswer {
    pub request_id: String,
    pub roadmap_id: String,
    /// Sources at or above the relevance threshold, best first.
    pub sources: Vec<SourceDocument>,
    pub events: EventStream,
}

impl std::fmt::Debug for PreparedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedAnswer")
            .field("request_id", &self.request_id)
            .field("roadmap_id", &self.roadmap_id)
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

pub struct AnswerService<R: Retriever, S: KeyValueStore + 'static> {
    retriever: Arc<R>,
    model: Arc<dyn ChatModel>,
    hub: ToolEventHub,
    debug: DebugStore<S>,
}

impl<R: Retriever, S: KeyValueStore + 'static> AnswerService<R, S> {
    pub fn new(
        retriever: Arc<R>,
        model: Arc<dyn ChatModel>,
        hub: ToolEventHub,
        debug: DebugStore<S>,
    ) -> Self {
        Self {
            retriever,
            model,
            hub,
            debug,
        }
    }

    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    /// Retrieve context and start streaming the answer.
    ///
    /// Tool events for the lookup are published under `request_id`; `done`
    /// follows once the answer stream ends. A failed lookup publishes
    /// `tool_error` and `done`, stores the debug record and returns the error.
    pub async fn answer(
        &self,
        request_id: &str,
        request: ChatRequest,
    ) -> Result<PreparedAnswer, ChatError> {
        let started = Instant::now();
        let query = QueryRequest::new(&request.message, request.roadmap_id.clone(), request.top_k);

        self.hub.publish(
            request_id,
            ToolEvent::ToolStart {
                tool: RETRIEVE_TOOL.to_string(),
                input: json!({
                    "query": query.query,
                    "roadmapId": query.roadmap_id,
                    "topK": query.top_k,
                }),
            },
        );

        let mut record = DebugRecord {
            request_id: request_id.to_string(),
            created_at: Utc::now(),
            provider: self.model.name().to_string(),
            model: self.model.model().to_string(),
            roadmap_id: request.roadmap_id.clone(),
            sources: Vec::new(),
            timings: RequestTimings::default(),
            usage: None,
            error: None,
        };

        let retrieved = match self.retriever.query(&query).await {
            Ok(retrieved) => retrieved,
            Err(e) => {
                tracing::error!(request_id, error = %e, "context retrieval failed");
                self.hub.publish(
                    request_id,
                    ToolEvent::ToolError {
                        tool: RETRIEVE_TOOL.to_string(),
                        message: e.to_string(),
                    },
                );
                self.hub.publish(request_id, ToolEvent::Done);
                record.error = Some(e.to_string());
                record.timings.total_ms = Some(elapsed_ms(started));
                save_debug(&self.debug, &record).await;
                return Err(e.into());
            }
        };

        let retrieval_ms = elapsed_ms(started);
        tracing::debug!(
            request_id,
            sources = retrieved.sources.len(),
            retrieval_ms,
            "context retrieved"
        );
        self.hub.publish(
            request_id,
            ToolEvent::ToolResult {
                tool: RETRIEVE_TOOL.to_string(),
                output: json!({
                    "roadmapId": retrieved.roadmap_id,
                    "sources": retrieved.sources.len(),
                }),
                duration_ms: retrieval_ms,
            },
        );

        record.roadmap_id = Some(retrieved.roadmap_id.clone());
        record.sources = retrieved.sources.clone();
        record.timings.retrieval_ms = Some(retrieval_ms);

        let completion = CompletionRequest {
            model: String::new(),
            messages: vec![Message {
                role: MessageRole::User,
                content: request.message,
            }],
            system: Some(build_system_prompt(&retrieved.context)),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: None,
        };
        let upstream = self.model.stream(completion);

        Ok(PreparedAnswer {
            request_id: request_id.to_string(),
            roadmap_id: retrieved.roadmap_id,
            sources: relevant_sources(&retrieved.sources),
            events: track(upstream, record, started, self.hub.clone(), self.debug.clone()),
        })
    }
}

async fn save_debug<S: KeyValueStore>(debug: &DebugStore<S>, record: &DebugRecord) {
    if let Err(e) = debug.save(record).await {
        tracing::warn!(request_id = %record.request_id, error = %e, "failed to store debug record");
    }
}

/// Pass model events through while filling in timings, usage and errors.
/// Ends after the first error.
fn track<S: KeyValueStore + 'static>(
    mut upstream: EventStream,
    mut record: DebugRecord,
    started: Instant,
    hub: ToolEventHub,
    debug: DebugStore<S>,
) -> EventStream {
    Box::pin(async_stream::stream! {
        while let Some(item) = upstream.next().await {
            let failed = match &item {
                Ok(StreamEvent::TextDelta { .. }) => {
                    if record.timings.first_token_ms.is_none() {
                        record.timings.first_token_ms = Some(elapsed_ms(started));
                    }
                    false
                }
                Ok(StreamEvent::Usage(usage)) => {
                    record.usage = Some(*usage);
                    false
                }
                Ok(_) => false,
                Err(e) => {
                    tracing::error!(request_id = %record.request_id, error = %e, "answer stream failed");
                    record.error = Some(e.to_string());
                    true
                }
            };
            yield item;
            if failed {
                break;
            }
        }

        record.timings.total_ms = Some(elapsed_ms(started));
        tracing::info!(
            request_id = %record.request_id,
            provider = %record.provider,
            model = %record.model,
            total_ms = record.timings.total_ms,
            "chat completion finished"
        );
        hub.publish(&record.request_id, ToolEvent::Done);
        save_debug(&debug, &record).await;
    })
}
