//! Thread service: validation and lifecycle for chat threads.
//!
//! Handlers pass raw client values in; every limit and shape rule is checked
//! here so the repository only ever sees valid data.

use chrono::{Duration, Utc};
use panday_types::chat::{
    ChatThread, DEFAULT_THREAD_TITLE, NewThread, ThreadMessage, ThreadPage, ThreadPatch,
    ThreadRole,
};
use panday_types::error::{FieldErrors, ThreadError};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::repository::ThreadRepository;
use super::text::build_message_preview;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const MAX_MESSAGE_PAGE: u32 = 200;
pub const MAX_APPEND_BATCH: usize = 20;
pub const TITLE_MAX_INPUT_CHARS: usize = 120;

/// A message as sent by the browser, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageInput {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub sources: Option<serde_json::Value>,
}

fn invalid(message: &'static str, details: FieldErrors) -> ThreadError {
    ThreadError::Invalid { message, details }
}

fn check_title(title: Option<String>, errors: &mut FieldErrors) -> Option<String> {
    let title = title?.trim().to_string();
    let len = title.chars().count();
    if len == 0 {
        errors.add("title", "String must contain at least 1 character(s)");
        return None;
    }
    if len > TITLE_MAX_INPUT_CHARS {
        errors.add(
            "title",
            format!("String must contain at most {TITLE_MAX_INPUT_CHARS} character(s)"),
        );
        return None;
    }
    Some(title)
}

fn check_limit(
    limit: Option<u32>,
    max: u32,
    errors: &mut FieldErrors,
) -> Option<u32> {
    let limit = limit?;
    if limit == 0 {
        errors.add("limit", "Number must be greater than or equal to 1");
    } else if limit > max {
        errors.add("limit", format!("Number must be less than or equal to {max}"));
    }
    Some(limit)
}

/// Chat thread operations for one authenticated user at a time.
pub struct ThreadService<R: ThreadRepository> {
    repo: R,
}

impl<R: ThreadRepository> ThreadService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// One page of threads, most recent activity first.
    pub async fn list_threads(
        &self,
        user_id: &str,
        limit: Option<u32>,
        cursor: Option<&str>,
        roadmap_id: Option<&str>,
    ) -> Result<ThreadPage, ThreadError> {
        let mut errors = FieldErrors::new();
        let limit = check_limit(limit, MAX_PAGE_SIZE, &mut errors).unwrap_or(DEFAULT_PAGE_SIZE);
        let cursor = match cursor.filter(|c| !c.is_empty()) {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("cursor", "Invalid cursor");
                    None
                }
            },
            None => None,
        };
        errors
            .into_result()
            .map_err(|d| invalid("Invalid query", d))?;

        let roadmap_id = roadmap_id.filter(|r| !r.is_empty());
        let mut threads = self
            .repo
            .list_threads(user_id, roadmap_id, cursor.as_ref(), limit + 1)
            .await?;

        let next_cursor = if threads.len() > limit as usize {
            threads.truncate(limit as usize);
            threads.last().map(|t| t.id)
        } else {
            None
        };
        Ok(ThreadPage {
            threads,
            next_cursor,
        })
    }

    pub async fn create_thread(
        &self,
        user_id: &str,
        input: NewThread,
    ) -> Result<ChatThread, ThreadError> {
        let mut errors = FieldErrors::new();
        let title = check_title(input.title, &mut errors);
        errors
            .into_result()
            .map_err(|d| invalid("Invalid payload", d))?;

        let now = Utc::now();
        let thread = ChatThread {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title: title.unwrap_or_else(|| DEFAULT_THREAD_TITLE.to_string()),
            roadmap_id: input.roadmap_id,
            selected_node_id: input.selected_node_id,
            message_preview: None,
            last_message_at: now,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            messages_count: 0,
        };
        self.repo.create_thread(&thread).await?;
        info!(thread_id = %thread.id, user_id, "chat thread created");
        Ok(thread)
    }

    pub async fn get_thread(&self, user_id: &str, thread_id: &Uuid) -> Result<ChatThread, ThreadError> {
        self.repo
            .get_thread(user_id, thread_id)
            .await?
            .ok_or(ThreadError::NotFound)
    }

    pub async fn update_thread(
        &self,
        user_id: &str,
        thread_id: &Uuid,
        patch: ThreadPatch,
    ) -> Result<ChatThread, ThreadError> {
        let mut errors = FieldErrors::new();
        let title = check_title(patch.title, &mut errors);
        errors
            .into_result()
            .map_err(|d| invalid("Invalid payload", d))?;

        let mut thread = self.get_thread(user_id, thread_id).await?;
        if let Some(title) = title {
            thread.title = title;
        }
        if let Some(roadmap_id) = patch.roadmap_id {
            thread.roadmap_id = roadmap_id;
        }
        if let Some(node_id) = patch.selected_node_id {
            thread.selected_node_id = node_id;
        }
        thread.updated_at = Utc::now();
        self.repo.update_thread(&thread).await?;
        Ok(thread)
    }

    pub async fn delete_thread(&self, user_id: &str, thread_id: &Uuid) -> Result<(), ThreadError> {
        if !self
            .repo
            .soft_delete_thread(user_id, thread_id, Utc::now())
            .await?
        {
            return Err(ThreadError::NotFound);
        }
        info!(thread_id = %thread_id, user_id, "chat thread deleted");
        Ok(())
    }

    /// Messages of a live thread, oldest first.
    pub async fn list_messages(
        &self,
        user_id: &str,
        thread_id: &Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<ThreadMessage>, ThreadError> {
        let mut errors = FieldErrors::new();
        let limit = check_limit(limit, MAX_MESSAGE_PAGE, &mut errors);
        errors
            .into_result()
            .map_err(|d| invalid("Invalid limit", d))?;

        let thread = self.get_thread(user_id, thread_id).await?;
        Ok(self.repo.list_messages(&thread.id, limit).await?)
    }

    /// Append 1 to [`MAX_APPEND_BATCH`] messages atomically.
    ///
    /// The thread's preview and activity time follow the last message.
    pub async fn append_messages(
        &self,
        user_id: &str,
        thread_id: &Uuid,
        inputs: Vec<MessageInput>,
    ) -> Result<Vec<ThreadMessage>, ThreadError> {
        let mut errors = FieldErrors::new();
        if inputs.is_empty() {
            errors.add("messages", "Array must contain at least 1 element(s)");
        } else if inputs.len() > MAX_APPEND_BATCH {
            errors.add(
                "messages",
                format!("Array must contain at most {MAX_APPEND_BATCH} element(s)"),
            );
        }

        let mut validated = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.into_iter().enumerate() {
            let role = match input.role.parse::<ThreadRole>() {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.add(format!("messages.{i}.role"), "Unsupported role");
                    None
                }
            };
            let content = input.content.trim().to_string();
            if content.is_empty() {
                errors.add(
                    format!("messages.{i}.content"),
                    "String must contain at least 1 character(s)",
                );
            }
            if let Some(role) = role {
                validated.push((role, content, input.sources));
            }
        }
        errors
            .into_result()
            .map_err(|d| invalid("Invalid payload", d))?;

        let thread = self.get_thread(user_id, thread_id).await?;

        let base = Utc::now();
        let messages: Vec<ThreadMessage> = validated
            .into_iter()
            .enumerate()
            .map(|(i, (role, content, sources))| ThreadMessage {
                id: Uuid::now_v7(),
                thread_id: thread.id,
                role,
                content,
                sources,
                created_at: base + Duration::microseconds(i as i64),
            })
            .collect();

        let Some(last) = messages.last() else {
            return Ok(messages);
        };
        let preview = build_message_preview(&last.content);
        self.repo
            .append_messages(&thread.id, &messages, &preview, last.created_at)
            .await?;
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::DateTime;
    use panday_types::error::RepositoryError;

    use super::*;

    #[derive(Default)]
    struct MemoryThreads {
        threads: Mutex<Vec<ChatThread>>,
        messages: Mutex<Vec<ThreadMessage>>,
    }

    impl MemoryThreads {
        fn count(&self, thread_id: &Uuid) -> u32 {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.thread_id == *thread_id)
                .count() as u32
        }
    }

    impl ThreadRepository for MemoryThreads {
        async fn create_thread(&self, thread: &ChatThread) -> Result<(), RepositoryError> {
            self.threads.lock().unwrap().push(thread.clone());
            Ok(())
        }

        async fn get_thread(
            &self,
            user_id: &str,
            thread_id: &Uuid,
        ) -> Result<Option<ChatThread>, RepositoryError> {
            let found = self
                .threads
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == *thread_id && t.user_id == user_id && t.deleted_at.is_none())
                .cloned();
            Ok(found.map(|mut t| {
                t.messages_count = self.count(&t.id);
                t
            }))
        }

        async fn list_threads(
            &self,
            user_id: &str,
            roadmap_id: Option<&str>,
            cursor: Option<&Uuid>,
            fetch: u32,
        ) -> Result<Vec<ChatThread>, RepositoryError> {
            let mut live: Vec<ChatThread> = self
                .threads
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id == user_id && t.deleted_at.is_none())
                .filter(|t| roadmap_id.is_none_or(|r| t.roadmap_id.as_deref() == Some(r)))
                .cloned()
                .collect();
            live.sort_by(|a, b| (b.last_message_at, b.id).cmp(&(a.last_message_at, a.id)));
            let start = match cursor {
                Some(c) => match live.iter().position(|t| t.id == *c) {
                    Some(p) => p + 1,
                    None => return Ok(Vec::new()),
                },
                None => 0,
            };
            Ok(live.into_iter().skip(start).take(fetch as usize).collect())
        }

        async fn update_thread(&self, thread: &ChatThread) -> Result<(), RepositoryError> {
            let mut threads = self.threads.lock().unwrap();
            let slot = threads
                .iter_mut()
                .find(|t| t.id == thread.id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = thread.clone();
            Ok(())
        }

        async fn soft_delete_thread(
            &self,
            user_id: &str,
            thread_id: &Uuid,
            deleted_at: DateTime<Utc>,
        ) -> Result<bool, RepositoryError> {
            let mut threads = self.threads.lock().unwrap();
            match threads
                .iter_mut()
                .find(|t| t.id == *thread_id && t.user_id == user_id && t.deleted_at.is_none())
            {
                Some(t) => {
                    t.deleted_at = Some(deleted_at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn list_messages(
            &self,
            thread_id: &Uuid,
            limit: Option<u32>,
        ) -> Result<Vec<ThreadMessage>, RepositoryError> {
            let mut msgs: Vec<ThreadMessage> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.thread_id == *thread_id)
                .cloned()
                .collect();
            msgs.sort_by_key(|m| m.created_at);
            if let Some(limit) = limit {
                msgs.truncate(limit as usize);
            }
            Ok(msgs)
        }

        async fn append_messages(
            &self,
            thread_id: &Uuid,
            messages: &[ThreadMessage],
            preview: &str,
            last_message_at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            self.messages.lock().unwrap().extend_from_slice(messages);
            let mut threads = self.threads.lock().unwrap();
            if let Some(t) = threads.iter_mut().find(|t| t.id == *thread_id) {
                t.message_preview = Some(preview.to_string());
                t.last_message_at = last_message_at;
            }
            Ok(())
        }
    }

    fn service() -> ThreadService<MemoryThreads> {
        ThreadService::new(MemoryThreads::default())
    }

    fn msg(role: &str, content: &str) -> MessageInput {
        MessageInput {
            role: role.to_string(),
            content: content.to_string(),
            sources: None,
        }
    }

    #[tokio::test]
    async fn create_applies_default_title() {
        let svc = service();
        let thread = svc.create_thread("u1", NewThread::default()).await.unwrap();
        assert_eq!(thread.title, "New chat");

        let thread = svc
            .create_thread(
                "u1",
                NewThread {
                    title: Some("  Level 2 questions ".to_string()),
                    roadmap_id: Some("electrician-bc".to_string()),
                    selected_node_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(thread.title, "Level 2 questions");
    }

    #[tokio::test]
    async fn create_rejects_bad_titles() {
        let svc = service();
        for title in ["   ".to_string(), "x".repeat(121)] {
            let err = svc
                .create_thread(
                    "u1",
                    NewThread {
                        title: Some(title),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            match err {
                ThreadError::Invalid { message, details } => {
                    assert_eq!(message, "Invalid payload");
                    assert!(details.field_errors.contains_key("title"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn threads_are_private_to_their_owner() {
        let svc = service();
        let thread = svc.create_thread("owner", NewThread::default()).await.unwrap();
        assert!(matches!(
            svc.get_thread("intruder", &thread.id).await,
            Err(ThreadError::NotFound)
        ));
        assert!(matches!(
            svc.delete_thread("intruder", &thread.id).await,
            Err(ThreadError::NotFound)
        ));
        assert!(svc.get_thread("owner", &thread.id).await.is_ok());
    }

    #[tokio::test]
    async fn pagination_uses_cursor() {
        let svc = service();
        for _ in 0..5 {
            svc.create_thread("u", NewThread::default()).await.unwrap();
        }
        let first = svc.list_threads("u", Some(2), None, None).await.unwrap();
        assert_eq!(first.threads.len(), 2);
        let cursor = first.next_cursor.unwrap().to_string();

        let second = svc
            .list_threads("u", Some(2), Some(&cursor), None)
            .await
            .unwrap();
        assert_eq!(second.threads.len(), 2);
        assert!(second.threads.iter().all(|t| !first.threads.contains(t)));

        let cursor = second.next_cursor.unwrap().to_string();
        let last = svc
            .list_threads("u", Some(2), Some(&cursor), None)
            .await
            .unwrap();
        assert_eq!(last.threads.len(), 1);
        assert_eq!(last.next_cursor, None);
    }

    #[tokio::test]
    async fn list_validates_query() {
        let svc = service();
        for (limit, cursor) in [(Some(0), None), (Some(51), None), (None, Some("nope"))] {
            let err = svc.list_threads("u", limit, cursor, None).await.unwrap_err();
            assert!(matches!(err, ThreadError::Invalid { message: "Invalid query", .. }));
        }
        let page = svc.list_threads("u", None, None, None).await.unwrap();
        assert!(page.threads.is_empty());
    }

    #[tokio::test]
    async fn patch_sets_and_clears_fields() {
        let svc = service();
        let thread = svc
            .create_thread(
                "u",
                NewThread {
                    roadmap_id: Some("electrician-bc".to_string()),
                    selected_node_id: Some("level-1".to_string()),
                    title: None,
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update_thread(
                "u",
                &thread.id,
                ThreadPatch {
                    title: Some("Renamed".to_string()),
                    roadmap_id: None,
                    selected_node_id: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.roadmap_id.as_deref(), Some("electrician-bc"));
        assert_eq!(updated.selected_node_id, None);
    }

    #[tokio::test]
    async fn append_updates_preview_and_count() {
        let svc = service();
        let thread = svc.create_thread("u", NewThread::default()).await.unwrap();
        let created = svc
            .append_messages(
                "u",
                &thread.id,
                vec![msg("user", "How long is level 1?"), msg("assistant", "  About ten weeks.  ")],
            )
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[1].content, "About ten weeks.");

        let thread = svc.get_thread("u", &thread.id).await.unwrap();
        assert_eq!(thread.messages_count, 2);
        assert_eq!(thread.message_preview.as_deref(), Some("About ten weeks."));
        assert_eq!(thread.last_message_at, created[1].created_at);

        let listed = svc.list_messages("u", &thread.id, None).await.unwrap();
        assert_eq!(listed[0].role, ThreadRole::User);
        assert_eq!(listed[1].role, ThreadRole::Assistant);
    }

    #[tokio::test]
    async fn append_rejects_invalid_batches() {
        let svc = service();
        let thread = svc.create_thread("u", NewThread::default()).await.unwrap();

        let too_many: Vec<_> = (0..21).map(|_| msg("user", "hi")).collect();
        for batch in [vec![], too_many, vec![msg("tool", "x")], vec![msg("user", "  ")]] {
            let err = svc.append_messages("u", &thread.id, batch).await.unwrap_err();
            assert!(matches!(err, ThreadError::Invalid { .. }));
        }
        assert_eq!(svc.get_thread("u", &thread.id).await.unwrap().messages_count, 0);
    }

    #[tokio::test]
    async fn deleted_threads_disappear() {
        let svc = service();
        let thread = svc.create_thread("u", NewThread::default()).await.unwrap();
        svc.delete_thread("u", &thread.id).await.unwrap();
        assert!(matches!(
            svc.delete_thread("u", &thread.id).await,
            Err(ThreadError::NotFound)
        ));
        assert!(svc.list_threads("u", None, None, None).await.unwrap().threads.is_empty());
        assert!(matches!(
            svc.list_messages("u", &thread.id, None).await,
            Err(ThreadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn message_limit_is_bounded() {
        let svc = service();
        let thread = svc.create_thread("u", NewThread::default()).await.unwrap();
        assert!(matches!(
            svc.list_messages("u", &thread.id, Some(201)).await,
            Err(ThreadError::Invalid { message: "Invalid limit", .. })
        ));
    }
}
