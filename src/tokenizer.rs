//! Split raw message text into tagged fields.
//!
//! A field starts on a line of the form `:TAG:` followed by the first content line;
//! every following line up to the next tag line or the page terminator `-` is a
//! continuation and is kept verbatim, blank lines included. Non-blank text seen
//! before any tag is returned as a preamble field with an empty tag so that the
//! page layer can reject it with a line number.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;

/// Tag of the line that terminates a page.
pub const PAGE_TERMINATOR: &str = "-";

/// Tag given to text that appears before any tag line.
pub const PREAMBLE: &str = "";

static TAG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:([0-9A-Za-z]{1,3}[A-Z]?):(.*)$").expect("tag line pattern")
});

/// Split a `:TAG:content` line into tag and first content line.
pub(crate) fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let caps = TAG_LINE.captures(line)?;
    let tag = caps.get(1)?.as_str();
    let content = caps.get(2)?.as_str();
    Some((tag, content))
}

/// One physical field occurrence in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    tag: String,
    content: String,
    line: usize,
}

impl RawField {
    pub fn new(tag: impl Into<String>, content: impl Into<String>, line: usize) -> Self {
        RawField {
            tag: tag.into(),
            content: content.into(),
            line,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Field content; continuation lines are joined with `\n`.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// 1-based line number of the field's first line.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_terminator(&self) -> bool {
        self.tag == PAGE_TERMINATOR
    }

    pub fn is_preamble(&self) -> bool {
        self.tag == PREAMBLE
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("line {line}: cannot read message text: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl TokenizerError {
    pub fn line(&self) -> usize {
        match self {
            TokenizerError::Io { line, .. } => *line,
        }
    }
}

/// Reads [`RawField`]s one at a time from a line-oriented source.
pub struct FieldTokenizer<R> {
    reader: R,
    line: usize,
    open: Option<RawField>,
    /// Terminator read while a field was still open.
    pending: Option<RawField>,
}

impl<'a> FieldTokenizer<&'a [u8]> {
    pub fn from_text(text: &'a str) -> Self {
        FieldTokenizer::new(text.as_bytes())
    }
}

impl<R: BufRead> FieldTokenizer<R> {
    pub fn new(reader: R) -> Self {
        FieldTokenizer {
            reader,
            line: 0,
            open: None,
            pending: None,
        }
    }

    /// Number of the last line read so far (0 before the first read).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next field in source order, or `None` once the input is exhausted.
    pub fn read_field(&mut self) -> Result<Option<RawField>, TokenizerError> {
        let field = self.next_field()?;
        if let Some(f) = &field {
            tracing::trace!(tag = %f.tag, line = f.line, "field");
        }
        Ok(field)
    }

    fn next_field(&mut self) -> Result<Option<RawField>, TokenizerError> {
        if let Some(terminator) = self.pending.take() {
            return Ok(Some(terminator));
        }
        loop {
            let line = match self.next_line()? {
                Some(line) => line,
                None => return Ok(self.open.take()),
            };

            if line == PAGE_TERMINATOR {
                let terminator = RawField::new(PAGE_TERMINATOR, "", self.line);
                return match self.open.take() {
                    Some(open) => {
                        self.pending = Some(terminator);
                        Ok(Some(open))
                    }
                    None => Ok(Some(terminator)),
                };
            }

            if let Some((tag, content)) = split_tag_line(&line) {
                let field = RawField::new(tag, content, self.line);
                if let Some(previous) = self.open.replace(field) {
                    return Ok(Some(previous));
                }
                continue;
            }

            match &mut self.open {
                Some(open) => {
                    open.content.push('\n');
                    open.content.push_str(&line);
                }
                None if line.trim().is_empty() => {}
                None => self.open = Some(RawField::new(PREAMBLE, line, self.line)),
            }
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, TokenizerError> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|source| TokenizerError::Io { line: self.line + 1, source })?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }
}

impl<R: BufRead> Iterator for FieldTokenizer<R> {
    type Item = Result<RawField, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_field().transpose()
    }
}
