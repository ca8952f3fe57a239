//! Chat threads and the retrieval chat prompt.

pub mod answer;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod text;

pub use answer::{AnswerService, ChatRequest, PreparedAnswer};
pub use repository::ThreadRepository;
pub use service::{MessageInput, ThreadService};
