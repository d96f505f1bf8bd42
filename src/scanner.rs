//! Cursor-based lexer over a UTF-8 source string.
//!
//! Used by both the JSON value parser (comments disabled) and the IDL
//! parser (comments enabled). Every read operation calls [`Scanner::advance`]
//! first and leaves the cursor untouched on failure.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("expected keyword `{0}`")]
    ExpectedKeyword(String),
    #[error("expected a word")]
    ExpectedWord,
    #[error("expected a number")]
    ExpectedNumber,
    #[error("expected a string")]
    ExpectedString,
    #[error("expected operator `{0}`")]
    ExpectedOperator(String),
    #[error("operator `{0}` not found")]
    OperatorNotFound(String),
    #[error("invalid escape sequence in string")]
    InvalidEscape,
    #[error("unterminated string literal")]
    UnterminatedString,
}

/// Cursor over an immutable source string.
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    accept_comments: bool,
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn is_word_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `source`. `accept_comments` enables
    /// `#`-to-end-of-line skipping (on for IDL, off for JSON).
    pub fn new(source: &'a str, accept_comments: bool) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            accept_comments,
        }
    }

    /// Current byte offset into the source.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// True iff every remaining byte has already been consumed or skipped.
    pub fn at_end_after_advance(&mut self) -> bool {
        self.advance();
        self.pos >= self.bytes.len()
    }

    /// Skips runs of whitespace and, if enabled, `#` line comments.
    /// Returns the cursor position after skipping.
    pub fn advance(&mut self) -> usize {
        loop {
            match self.bytes.get(self.pos) {
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => self.pos += 1,
                Some(b'#') if self.accept_comments => {
                    while let Some(&b) = self.bytes.get(self.pos) {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        self.pos
    }

    /// The current byte, or `\0` at end of input.
    pub fn peek(&mut self) -> u8 {
        self.advance();
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn word_span(&self) -> Option<(usize, usize)> {
        let start = self.pos;
        if !self.bytes.get(start).copied().map(is_word_start).unwrap_or(false) {
            return None;
        }
        let mut end = start + 1;
        while self.bytes.get(end).copied().map(is_word_continue).unwrap_or(false) {
            end += 1;
        }
        Some((start, end))
    }

    /// Succeeds iff the maximal word at the cursor equals `keyword` exactly.
    pub fn read_keyword(&mut self, keyword: &str) -> Result<(), ScanError> {
        self.advance();
        match self.word_span() {
            Some((start, end)) if &self.source[start..end] == keyword => {
                self.pos = end;
                Ok(())
            }
            _ => Err(ScanError::ExpectedKeyword(keyword.to_string())),
        }
    }

    /// Consumes a word (`[A-Za-z][A-Za-z0-9_.]*`) and returns its text.
    pub fn read_word(&mut self) -> Result<&'a str, ScanError> {
        self.advance();
        match self.word_span() {
            Some((start, end)) => {
                self.pos = end;
                Ok(&self.source[start..end])
            }
            None => Err(ScanError::ExpectedWord),
        }
    }

    /// Consumes a signed decimal integer.
    pub fn read_number(&mut self) -> Result<i64, ScanError> {
        self.advance();
        let start = self.pos;
        let mut end = start;
        if self.bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        let digits_start = end;
        while self.bytes.get(end).copied().map(|b| b.is_ascii_digit()).unwrap_or(false) {
            end += 1;
        }
        if end == digits_start {
            return Err(ScanError::ExpectedNumber);
        }
        let text = &self.source[start..end];
        let value = text.parse::<i64>().map_err(|_| ScanError::ExpectedNumber)?;
        self.pos = end;
        Ok(value)
    }

    /// Consumes a JSON-quoted string, decoding escapes.
    ///
    /// `\uXXXX` is re-encoded to UTF-8 independently per escape; a lone
    /// UTF-16 surrogate half has no valid `char` mapping and is emitted as
    /// `U+FFFD` rather than combined with a following surrogate half into
    /// an astral-plane code point.
    pub fn read_string(&mut self) -> Result<String, ScanError> {
        self.advance();
        if self.bytes.get(self.pos) != Some(&b'"') {
            return Err(ScanError::ExpectedString);
        }
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    self.pos = start;
                    return Err(ScanError::UnterminatedString);
                }
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.bytes.get(self.pos) {
                        Some(b'"') => {
                            out.push('"');
                            self.pos += 1;
                        }
                        Some(b'\\') => {
                            out.push('\\');
                            self.pos += 1;
                        }
                        Some(b'/') => {
                            out.push('/');
                            self.pos += 1;
                        }
                        Some(b'b') => {
                            out.push('\u{0008}');
                            self.pos += 1;
                        }
                        Some(b'f') => {
                            out.push('\u{000C}');
                            self.pos += 1;
                        }
                        Some(b'n') => {
                            out.push('\n');
                            self.pos += 1;
                        }
                        Some(b'r') => {
                            out.push('\r');
                            self.pos += 1;
                        }
                        Some(b't') => {
                            out.push('\t');
                            self.pos += 1;
                        }
                        Some(b'u') => {
                            self.pos += 1;
                            let code = self.read_hex4()?;
                            out.push(char::from_u32(code as u32).unwrap_or('\u{FFFD}'));
                        }
                        _ => {
                            self.pos = start;
                            return Err(ScanError::InvalidEscape);
                        }
                    }
                }
                Some(&b) => {
                    // Copy raw UTF-8 bytes through; `str` guarantees validity.
                    let ch_len = utf8_len(b);
                    let end = self.pos + ch_len;
                    match self.source.get(self.pos..end) {
                        Some(slice) => {
                            out.push_str(slice);
                            self.pos = end;
                        }
                        None => {
                            self.pos = start;
                            return Err(ScanError::UnterminatedString);
                        }
                    }
                }
            }
        }
    }

    fn read_hex4(&mut self) -> Result<u16, ScanError> {
        let end = self.pos + 4;
        let slice = self.source.get(self.pos..end).ok_or(ScanError::InvalidEscape)?;
        let value = u16::from_str_radix(slice, 16).map_err(|_| ScanError::InvalidEscape)?;
        self.pos = end;
        Ok(value)
    }

    /// Succeeds iff the bytes at the cursor start with `op` exactly.
    pub fn read_operator(&mut self, op: &str) -> Result<(), ScanError> {
        self.advance();
        if self.source[self.pos..].starts_with(op) {
            self.pos += op.len();
            Ok(())
        } else {
            Err(ScanError::ExpectedOperator(op.to_string()))
        }
    }

    /// Scans forward to the first occurrence of `op`, placing the cursor
    /// just past it. Used to skip type bodies without parsing them.
    pub fn read_operator_skip(&mut self, op: &str) -> Result<(), ScanError> {
        match self.source[self.pos..].find(op) {
            Some(offset) => {
                self.pos += offset + op.len();
                Ok(())
            }
            None => Err(ScanError::OperatorNotFound(op.to_string())),
        }
    }
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_keyword_exactly() {
        let mut s = Scanner::new("interface foo", true);
        assert!(s.read_keyword("interface").is_ok());
        assert_eq!(s.read_word().unwrap(), "foo");
    }

    #[test]
    fn keyword_mismatch_does_not_consume() {
        let mut s = Scanner::new("interfacer", true);
        let before = s.position();
        assert!(s.read_keyword("interface").is_err());
        assert_eq!(s.position(), before);
    }

    #[test]
    fn reads_negative_numbers() {
        let mut s = Scanner::new("-42", false);
        assert_eq!(s.read_number().unwrap(), -42);
    }

    #[test]
    fn reads_string_escapes() {
        let mut s = Scanner::new(r#""a\nb\tc\"d""#, false);
        assert_eq!(s.read_string().unwrap(), "a\nb\tc\"d");
    }

    #[test]
    fn reads_unicode_escape_bmp() {
        let mut s = Scanner::new(r#""\u0041""#, false);
        assert_eq!(s.read_string().unwrap(), "A");
    }

    #[test]
    fn surrogate_pair_is_not_decoded() {
        // 𝄞 is the UTF-16 surrogate pair for U+1D11E (MUSICAL
        // SYMBOL G CLEF); each half is decoded independently rather than
        // combined, so neither half is a valid `char` on its own.
        let mut s = Scanner::new(r#""\uD834\uDD1E""#, false);
        let decoded = s.read_string().unwrap();
        assert_eq!(decoded, "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn comments_skipped_only_when_enabled() {
        let mut s = Scanner::new("# comment\nfoo", true);
        assert_eq!(s.read_word().unwrap(), "foo");

        let mut s = Scanner::new("# comment\nfoo", false);
        assert!(s.read_word().is_err());
    }

    #[test]
    fn read_operator_skip_finds_closing_paren() {
        let mut s = Scanner::new("(a, b, c) rest", false);
        s.read_operator("(").unwrap();
        s.read_operator_skip(")").unwrap();
        assert_eq!(s.read_word().unwrap(), "rest");
    }
}
