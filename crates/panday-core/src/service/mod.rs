//! Services for onboarding, progress and FAQ records.

pub mod faq;
pub mod profile;
pub mod progress;

pub use faq::FaqService;
pub use profile::ProfileService;
pub use progress::{NodeProgressInput, NodeProgressService};
