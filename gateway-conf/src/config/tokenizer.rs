//! Line tokenizer and value helpers shared by every parser

use crate::error::{ConfigError, Result};
use std::io::BufRead;
use tracing::error;

/// Marker that closes a nested block
pub const BLOCK_CLOSE: char = '}';
/// Marker that may open a nested block
pub const BLOCK_OPEN: char = '{';

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// One tokenized configuration line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub keyword: &'a str,
    /// Everything after the keyword with leading blanks removed. Trailing
    /// whitespace is kept.
    pub value: &'a str,
}

impl<'a> Line<'a> {
    /// The value up to its first blank
    pub fn first_word(&self) -> &'a str {
        match self.value.find(is_blank) {
            Some(end) => &self.value[..end],
            None => self.value,
        }
    }
}

/// Split a raw line into keyword and value.
///
/// Leading blanks are skipped and the line is cut at the first `#`, `\r` or
/// `\n`. Returns `None` when nothing is left.
pub fn tokenize(raw: &str) -> Option<Line<'_>> {
    let line = raw.trim_start_matches(is_blank);
    let end = line
        .find(|c: char| matches!(c, '#' | '\r' | '\n'))
        .unwrap_or(line.len());
    let line = &line[..end];
    if line.is_empty() {
        return None;
    }

    let (keyword, rest) = match line.find(is_blank) {
        Some(split) => line.split_at(split),
        None => (line, ""),
    };

    Some(Line {
        keyword,
        value: rest.trim_start_matches(is_blank),
    })
}

/// True for a raw line that terminates a nested block
pub fn is_block_close(raw: &str) -> bool {
    raw.contains(BLOCK_CLOSE)
}

/// True for a keyword made only of braces, e.g. a `{` on its own line
pub fn is_brace(keyword: &str) -> bool {
    keyword.chars().all(|c| c == BLOCK_OPEN || c == BLOCK_CLOSE)
}

/// Parse the leading integer of a value, the way `sscanf("%d")` does:
/// leading whitespace and an optional sign are accepted, parsing stops at
/// the first non-digit. Returns `None` when there are no digits or the
/// number does not fit.
pub fn parse_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let magnitude: i64 = digits[..len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a boolean value: `yes`/`no` in any case, or `1`/`0`.
/// Trailing whitespace is ignored.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim_end();
    if value.eq_ignore_ascii_case("yes") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("no") || value == "0" {
        Some(false)
    } else {
        None
    }
}

/// Line-numbered reader shared by the top-level parser and the block
/// parsers, so that every diagnostic carries the right position.
pub struct LineReader<R> {
    reader: R,
    file: String,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, file: impl Into<String>) -> Self {
        Self {
            reader,
            file: file.into(),
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Read the next raw line including its terminator. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| ConfigError::Read {
                file: self.file.clone(),
                line: self.line + 1,
                source,
            })?;

        if read == 0 {
            return Ok(None);
        }

        self.line += 1;
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    /// Number of the line most recently returned
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Name used for this input in diagnostics
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Log and build the fatal error for a keyword rejected on the current
    /// line. `block` names the enclosing block for a known keyword that is
    /// not allowed there; `None` means the keyword is unknown.
    pub fn bad_option(&self, keyword: &str, block: Option<&'static str>) -> ConfigError {
        error!(
            "{}: line {}: Bad configuration option: {}",
            self.file, self.line, keyword
        );
        match block {
            Some(block) => ConfigError::UnexpectedDirective {
                file: self.file.clone(),
                line: self.line,
                keyword: keyword.to_string(),
                block,
            },
            None => ConfigError::UnknownDirective {
                file: self.file.clone(),
                line: self.line,
                keyword: keyword.to_string(),
            },
        }
    }
}
