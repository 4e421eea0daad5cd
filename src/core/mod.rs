//! Core types - pure abstractions shared across the codebase.

mod category;
mod date;
pub mod key;
mod once;

pub use category::{ContentKind, FileCategory, NodeKind};
pub use date::DateTimeUtc;
pub use key::PathKey;
pub use once::{InitGuard, InitState};

/// Ordered metadata bag decoded from front matter.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
