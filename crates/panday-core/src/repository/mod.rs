//! Repository trait definitions for per-user and shared records.
//!
//! Chat thread persistence lives beside its service in `crate::chat`.

pub mod faq;
pub mod profile;
pub mod progress;

pub use faq::FaqRepository;
pub use profile::ProfileRepository;
pub use progress::NodeProgressRepository;
