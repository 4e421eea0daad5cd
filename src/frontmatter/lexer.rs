//! Front matter delimiter scanner.
//!
//! A small forward-only state machine that splits a content file into its
//! front matter block and the remaining body. It does not look inside the
//! front matter; decoding is [`super::MetaDecoder`]'s job.
//!
//! ```text
//! Outside ──"---\n" / "+++\n"──▶ FrontMatter(format) ──closing line──▶ Done
//!    │                                        │
//!    └──anything else──▶ Done                  └──no closing line──▶ Error
//! ```

use thiserror::Error;

use super::Format;

/// Lexer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("line {line}: end front matter delimiter {delim:?} not found")]
    Unterminated { delim: &'static str, line: usize },
}

/// Kind of a lexed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Opening or closing delimiter line (including its line ending).
    Delimiter(Format),
    /// Front matter body or page content.
    Text,
    Eof,
    Error,
}

/// One lexed item: a kind plus the byte span it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    pub kind: ItemKind,
    pub pos: usize,
    pub val: &'a [u8],
}

impl Item<'_> {
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.val).unwrap_or("<binary>")
    }
}

/// Front matter located in a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    pub format: Format,
    /// Raw front matter bytes, both delimiter lines excluded.
    pub raw: &'a [u8],
    /// Byte offset of `raw` within the file.
    pub offset: usize,
    /// 1-based line of the first front matter line within the file.
    pub line: usize,
}

/// Result of splitting a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub front_matter: Option<FrontMatter<'a>>,
    pub content: &'a [u8],
}

/// Split `input` into front matter and content.
///
/// Input without a recognized opening delimiter has no front matter and its
/// content is the whole input.
pub fn split(input: &[u8]) -> Result<Split<'_>, LexError> {
    let mut lexer = Lexer::new(input);
    lexer.run();

    let mut items = lexer.items.iter().peekable();
    let mut front_matter = None;
    let mut content: &[u8] = &[];

    while let Some(item) = items.next() {
        match item.kind {
            ItemKind::Delimiter(format) => {
                // Opening delimiter: the next text item is the front matter,
                // followed by the closing delimiter.
                if let Some(fm) = items.next_if(|i| i.kind == ItemKind::Text) {
                    front_matter = Some(FrontMatter {
                        format,
                        raw: fm.val,
                        offset: fm.pos,
                        line: line_of(input, fm.pos),
                    });
                }
                items.next_if(|i| matches!(i.kind, ItemKind::Delimiter(_)));
            }
            ItemKind::Text => content = item.val,
            ItemKind::Eof => break,
            ItemKind::Error => {
                return Err(lexer.error.clone().unwrap_or(LexError::Unterminated {
                    delim: "---",
                    line: 1,
                }));
            }
        }
    }

    match front_matter {
        Some(fm) => Ok(Split {
            front_matter: Some(fm),
            content,
        }),
        None => Ok(Split {
            front_matter: None,
            content: input,
        }),
    }
}

/// Run the lexer and return its item stream.
pub fn lex(input: &[u8]) -> Vec<Item<'_>> {
    let mut lexer = Lexer::new(input);
    lexer.run();
    lexer.items
}

/// 1-based line number of a byte position.
pub fn line_of(input: &[u8], pos: usize) -> usize {
    input[..pos.min(input.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

#[derive(Debug, Clone, Copy)]
enum State {
    Outside,
    FrontMatter(Format),
    Done,
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    start: usize,
    items: Vec<Item<'a>>,
    error: Option<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            items: Vec::new(),
            error: None,
        }
    }

    fn run(&mut self) {
        let mut state = State::Outside;
        loop {
            state = match state {
                State::Outside => self.outside(),
                State::FrontMatter(format) => self.front_matter(format),
                State::Done => break,
            };
        }
    }

    fn emit(&mut self, kind: ItemKind) {
        self.items.push(Item {
            kind,
            pos: self.start,
            val: &self.input[self.start..self.pos],
        });
        self.start = self.pos;
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn outside(&mut self) -> State {
        // UTF-8 byte order mark
        if self.rest().starts_with(b"\xEF\xBB\xBF") {
            self.pos += 3;
            self.start = self.pos;
        }
        while self.rest().first().is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
            self.start = self.pos;
        }

        for format in [Format::Yaml, Format::Toml] {
            let delim = format.delimiter().as_bytes();
            if let Some(after) = self.rest().strip_prefix(delim)
                && let Some(eol) = line_ending(after)
            {
                self.pos += delim.len() + eol;
                self.emit(ItemKind::Delimiter(format));
                return State::FrontMatter(format);
            }
        }

        self.pos = self.input.len();
        if self.pos > self.start {
            self.emit(ItemKind::Text);
        }
        self.emit(ItemKind::Eof);
        State::Done
    }

    fn front_matter(&mut self, format: Format) -> State {
        let closing = format.closing_delimiter().as_bytes();
        let body_start = self.pos;

        let mut line_start = self.pos;
        let found = loop {
            if line_start > self.input.len() {
                break None;
            }
            let line = &self.input[line_start..];
            if let Some(after) = line.strip_prefix(closing) {
                let eol = if after.is_empty() {
                    Some(0)
                } else {
                    line_ending(after)
                };
                if let Some(eol) = eol {
                    break Some((line_start, closing.len() + eol));
                }
            }
            match line.iter().position(|&b| b == b'\n') {
                Some(i) => line_start += i + 1,
                None => break None,
            }
        };

        let Some((close_at, close_len)) = found else {
            let err = LexError::Unterminated {
                delim: format.closing_delimiter(),
                line: line_of(self.input, body_start),
            };
            self.pos = self.input.len();
            self.items.push(Item {
                kind: ItemKind::Error,
                pos: self.start,
                val: &[],
            });
            self.error = Some(err);
            return State::Done;
        };

        self.pos = close_at;
        self.emit(ItemKind::Text);

        self.pos = close_at + close_len;
        self.emit(ItemKind::Delimiter(format));

        self.pos = self.input.len();
        self.emit(ItemKind::Text);
        self.emit(ItemKind::Eof);
        State::Done
    }
}

/// Length of the line ending at the start of `bytes` (`\n` or `\r\n`).
fn line_ending(bytes: &[u8]) -> Option<usize> {
    if bytes.starts_with(b"\r\n") {
        Some(2)
    } else if bytes.starts_with(b"\n") {
        Some(1)
    } else {
        None
    }
}
