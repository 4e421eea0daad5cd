//! Page types: metadata, dates, and default ordering.

mod dates;
mod meta;
pub mod sort;

pub use dates::Dates;
pub use meta::{PageMeta, default_section_title, title_case};
pub use sort::{SortKey, sort_default};
