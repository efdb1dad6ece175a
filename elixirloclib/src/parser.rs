//! Elixir line classifier.
//!
//! This module provides the core parsing logic for Elixir source files. Each
//! physical line is classified as code, comment, blank, module declaration or
//! function declaration, and the results are accumulated into a [`ParseTally`].
//!
//! The classifier is a single forward pass with a small amount of state carried
//! between lines:
//!
//! - whether we are inside a documentation block (`@doc """ ... """`)
//! - whether we are inside a plain string heredoc (`x = """ ... """`)
//! - whether documentation is pending for the next declaration
//! - whether the most recent `defmodule` is still waiting for its `@moduledoc`
//!   (it keeps waiting until the next declaration, so `use` and `alias` lines
//!   may sit in between)
//!
//! There is no grammar and no tokenizer. Declarations and annotations are
//! recognised with literal prefixes and a couple of anchored regexes on the
//! trimmed line, so constructs spread over several lines in unusual ways can be
//! miscounted. A line that closes a documentation block is a comment line even
//! when code follows the closing delimiter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::error::ElixirlocError;
use crate::stats::ParseTally;
use crate::Result;

/// Closing token of a multi-line construct.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Delimiter {
    /// `"""`
    TripleDouble,
    /// `'''`
    TripleSingle,
    /// A plain `"` string continued over several lines
    Quote,
}

impl Delimiter {
    const HEREDOCS: [Delimiter; 2] = [Delimiter::TripleDouble, Delimiter::TripleSingle];

    fn token(self) -> &'static str {
        match self {
            Delimiter::TripleDouble => "\"\"\"",
            Delimiter::TripleSingle => "'''",
            Delimiter::Quote => "\"",
        }
    }

    /// Whether a trimmed line inside the construct ends it.
    fn closes(self, trimmed: &str) -> bool {
        match self {
            Delimiter::TripleDouble | Delimiter::TripleSingle => trimmed.starts_with(self.token()),
            Delimiter::Quote => contains_unescaped_quote(trimmed),
        }
    }
}

/// Multi-line construct the scanner is currently inside.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum Block {
    #[default]
    None,
    /// Body of a documentation annotation; every line is a comment line
    Doc(Delimiter),
    /// Body of a string heredoc; lines are code (or blank)
    Heredoc(Delimiter),
}

/// Scanning context carried from one line to the next.
#[derive(Debug, Default)]
struct ScanState {
    block: Block,
    /// `@doc` seen, not yet claimed by a declaration
    pending_doc: bool,
    /// `@moduledoc` seen ahead of its `defmodule`
    pending_moduledoc: bool,
    module_awaiting_doc: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum DocKind {
    /// `@moduledoc`
    Module,
    /// `@doc`
    Function,
    /// `@typedoc`
    Type,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Visibility {
    Public,
    Private,
}

/// What a single trimmed line looks like, before scan state is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    DocAnnotation {
        kind: DocKind,
        opens: Option<Delimiter>,
    },
    ModuleDeclaration {
        opens: Option<Delimiter>,
    },
    FunctionDeclaration {
        visibility: Visibility,
        opens: Option<Delimiter>,
    },
    /// Any other module attribute (`@spec`, `@impl`, ...)
    Attribute {
        opens: Option<Delimiter>,
    },
    Code {
        opens: Option<Delimiter>,
    },
}

fn declaration_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(defmodule|defprotocol|defimpl|defmacrop|defmacro|defguardp|defguard|defdelegate|defp|def)\s+\S",
        )
        .unwrap()
    })
}

fn doc_annotation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@(moduledoc|typedoc|doc)(?:\s+(.*))?$").unwrap())
}

impl LineKind {
    fn classify(trimmed: &str) -> Self {
        if trimmed.is_empty() {
            return LineKind::Blank;
        }

        if trimmed.starts_with('#') {
            return LineKind::Comment;
        }

        if trimmed.starts_with('@') {
            if let Some(caps) = doc_annotation_pattern().captures(trimmed) {
                let kind = match &caps[1] {
                    "moduledoc" => DocKind::Module,
                    "typedoc" => DocKind::Type,
                    _ => DocKind::Function,
                };
                let opens = caps.get(2).and_then(|value| doc_block_opening(value.as_str()));
                return LineKind::DocAnnotation { kind, opens };
            }
            return LineKind::Attribute {
                opens: heredoc_opening(trimmed),
            };
        }

        if let Some(caps) = declaration_pattern().captures(trimmed) {
            let opens = heredoc_opening(trimmed);
            let visibility = match &caps[1] {
                "defmodule" | "defprotocol" | "defimpl" => {
                    return LineKind::ModuleDeclaration { opens };
                }
                "defp" | "defmacrop" | "defguardp" => Visibility::Private,
                _ => Visibility::Public,
            };
            return LineKind::FunctionDeclaration { visibility, opens };
        }

        LineKind::Code {
            opens: heredoc_opening(trimmed),
        }
    }
}

/// Block opened by the value of a documentation annotation, if it spans lines.
fn doc_block_opening(value: &str) -> Option<Delimiter> {
    let value = strip_sigil(value.trim());

    for delimiter in Delimiter::HEREDOCS {
        if let Some(rest) = value.strip_prefix(delimiter.token()) {
            return (!rest.contains(delimiter.token())).then_some(delimiter);
        }
    }

    let rest = value.strip_prefix('"')?;
    (!contains_unescaped_quote(rest)).then_some(Delimiter::Quote)
}

/// Heredoc left open at the end of a code line.
///
/// Delimiters inside a single-line `"..."`/`'...'` literal or after the `#`
/// of a trailing comment do not count.
fn heredoc_opening(trimmed: &str) -> Option<Delimiter> {
    let mut rest = trimmed;

    loop {
        let start = rest.find(['#', '"', '\''])?;
        rest = &rest[start..];

        if rest.starts_with('#') {
            return None;
        }

        if let Some(delimiter) = Delimiter::HEREDOCS
            .into_iter()
            .find(|d| rest.starts_with(d.token()))
        {
            let body = &rest[delimiter.token().len()..];
            match body.find(delimiter.token()) {
                Some(end) => rest = &body[end + delimiter.token().len()..],
                None => return Some(delimiter),
            }
            continue;
        }

        let quote = if rest.starts_with('"') { '"' } else { '\'' };
        let body = &rest[1..];
        // A literal running past the end of the line is not a heredoc.
        let end = closing_quote(body, quote)?;
        rest = &body[end + 1..];
    }
}

/// Byte offset of the first unescaped `quote` in `s`.
fn closing_quote(s: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            c if c == quote => return Some(i),
            _ => {}
        }
    }
    None
}

/// `~S"""` and friends: drop the sigil so the delimiter can be inspected.
fn strip_sigil(value: &str) -> &str {
    match value.strip_prefix('~') {
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        None => value,
    }
}

fn contains_unescaped_quote(s: &str) -> bool {
    closing_quote(s, '"').is_some()
}

/// Incremental line classifier.
///
/// Feed lines in file order with [`Parser::feed`], then take the counts with
/// [`Parser::finish`]. One parser handles exactly one file.
#[derive(Debug, Default)]
pub struct Parser {
    tally: ParseTally,
    state: ScanState,
}

impl Parser {
    /// Create a parser with an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next physical line.
    pub fn feed(&mut self, line: &str) {
        self.tally.line_count += 1;
        let trimmed = line.trim();

        match self.state.block {
            Block::Doc(delimiter) => {
                self.tally.comment_line_count += 1;
                if delimiter.closes(trimmed) {
                    self.state.block = Block::None;
                }
                return;
            }
            Block::Heredoc(delimiter) => {
                if trimmed.is_empty() {
                    self.tally.empty_line_count += 1;
                } else if delimiter.closes(trimmed) {
                    self.state.block = Block::None;
                }
                return;
            }
            Block::None => {}
        }

        let kind = LineKind::classify(trimmed);
        trace!(line = self.tally.line_count, ?kind, "classified");

        match kind {
            LineKind::Blank => self.tally.empty_line_count += 1,
            LineKind::Comment => self.tally.comment_line_count += 1,
            LineKind::DocAnnotation { kind, opens } => {
                self.tally.comment_line_count += 1;
                match kind {
                    DocKind::Function => self.state.pending_doc = true,
                    DocKind::Module if self.state.module_awaiting_doc => {
                        self.state.module_awaiting_doc = false;
                        self.tally.documented_class_count += 1;
                    }
                    DocKind::Module => self.state.pending_moduledoc = true,
                    DocKind::Type => {}
                }
                if let Some(delimiter) = opens {
                    self.state.block = Block::Doc(delimiter);
                }
            }
            LineKind::ModuleDeclaration { opens } => {
                self.tally.class_count += 1;
                let documented = mem::take(&mut self.state.pending_doc)
                    | mem::take(&mut self.state.pending_moduledoc);
                if documented {
                    self.tally.documented_class_count += 1;
                }
                self.state.module_awaiting_doc = !documented;
                self.open_heredoc(opens);
            }
            LineKind::FunctionDeclaration { visibility, opens } => {
                let documented = mem::take(&mut self.state.pending_doc);
                self.state.pending_moduledoc = false;
                self.state.module_awaiting_doc = false;
                match visibility {
                    Visibility::Public => {
                        self.tally.public_function_count += 1;
                        if documented {
                            self.tally.documented_public_function_count += 1;
                        }
                    }
                    Visibility::Private => self.tally.private_function_count += 1,
                }
                self.open_heredoc(opens);
            }
            LineKind::Attribute { opens } => self.open_heredoc(opens),
            LineKind::Code { opens } => {
                self.state.pending_doc = false;
                self.state.pending_moduledoc = false;
                self.open_heredoc(opens);
            }
        }
    }

    fn open_heredoc(&mut self, opens: Option<Delimiter>) {
        if let Some(delimiter) = opens {
            self.state.block = Block::Heredoc(delimiter);
        }
    }

    /// Hand over the accumulated counts.
    pub fn finish(self) -> ParseTally {
        self.tally
    }
}

/// Classify a sequence of lines belonging to one file.
///
/// # Example
///
/// ```rust
/// use elixirloclib::parser::parse;
///
/// let tally = parse(["defmodule Greeter do", "  def hello, do: :world", "end"]);
/// assert_eq!(tally.line_count, 3);
/// assert_eq!(tally.class_count, 1);
/// assert_eq!(tally.public_function_count, 1);
/// ```
pub fn parse<I, S>(lines: I) -> ParseTally
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = Parser::new();
    for line in lines {
        parser.feed(line.as_ref());
    }
    parser.finish()
}

/// Parse Elixir source held in a string.
///
/// # Example
///
/// ```rust
/// use elixirloclib::parser::parse_string;
///
/// let source = r#"
/// @doc "Adds two numbers."
/// def add(a, b), do: a + b
/// "#;
///
/// let tally = parse_string(source);
/// assert_eq!(tally.documented_public_function_count, 1);
/// ```
pub fn parse_string(source: &str) -> ParseTally {
    parse(source.lines())
}

/// Parse a single Elixir file.
///
/// The file must be valid UTF-8; anything else is reported as
/// [`ElixirlocError::FileRead`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseTally> {
    let path = path.as_ref();
    let read_error = |source| ElixirlocError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(read_error)?);
    let mut parser = Parser::new();
    for line in reader.lines() {
        parser.feed(&line.map_err(read_error)?);
    }

    Ok(parser.finish())
}
