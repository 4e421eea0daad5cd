//! Front matter splitting and decoding.
//!
//! - [`lexer`]: delimiter state machine producing `{format, raw, offset}`
//! - [`MetaDecoder`]: turns raw front matter into an ordered [`JsonMap`]
//!
//! [`JsonMap`]: crate::core::JsonMap

mod decode;
pub mod lexer;

pub use decode::{DecodeError, MetaDecoder};
pub use lexer::{FrontMatter, LexError, Split, split};

/// Front matter encoding, detected from the opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `---`
    Yaml,
    /// `+++`
    Toml,
}

impl Format {
    /// Opening delimiter line.
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    /// Line that ends the front matter block (same as the opening one).
    pub const fn closing_delimiter(self) -> &'static str {
        self.delimiter()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}
