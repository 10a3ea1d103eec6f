//! Byte cursor over source text, plus line/column lookup.

use mung_ir::Position;

/// Cursor over a `&str`. Offsets are byte offsets and always sit on
/// character boundaries.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    #[inline]
    pub(crate) fn pos(&self) -> u32 {
        self.pos
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.src[self.pos as usize..]
    }

    /// Current character, or `None` at end of input.
    #[inline]
    pub(crate) fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character `n` characters ahead of the current one.
    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    #[inline]
    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.advance_bytes(c.len_utf8());
        }
    }

    #[inline]
    pub(crate) fn advance_bytes(&mut self, n: usize) {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.pos = self.pos.saturating_add(n).min(self.len());
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.current().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Skip to the next `\n` (not consumed) or end of input.
    pub(crate) fn eat_until_newline(&mut self) {
        match memchr::memchr(b'\n', self.rest().as_bytes()) {
            Some(off) => self.advance_bytes(off),
            None => self.pos = self.len(),
        }
    }

    /// Skip past the next occurrence of `needle`. Returns `false` and stops
    /// at end of input when there is none.
    pub(crate) fn eat_past(&mut self, needle: &str) -> bool {
        match memchr::memmem::find(self.rest().as_bytes(), needle.as_bytes()) {
            Some(off) => {
                self.advance_bytes(off + needle.len());
                true
            }
            None => {
                self.pos = self.len();
                false
            }
        }
    }

    /// Skip a quoted string whose opening quote is the current character.
    /// Returns `false` when input ends before the closing quote.
    pub(crate) fn eat_quoted(&mut self) -> bool {
        let Some(quote) = self.current() else {
            return false;
        };
        self.advance();
        loop {
            let rest = self.rest().as_bytes();
            // Quotes are ASCII, so a byte search finds character boundaries.
            let Some(off) = memchr::memchr2(quote as u8, b'\\', rest) else {
                self.pos = self.len();
                return false;
            };
            let found = rest[off];
            self.advance_bytes(off + 1);
            if found != b'\\' {
                return true;
            }
            // Escaped character, whatever it is.
            self.advance();
        }
    }

    #[inline]
    pub(crate) fn slice(&self, start: u32, end: u32) -> &'a str {
        &self.src[start as usize..end as usize]
    }

    #[inline]
    pub(crate) fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    fn len(&self) -> u32 {
        u32::try_from(self.src.len()).unwrap_or(u32::MAX)
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            memchr::memchr_iter(b'\n', src.as_bytes())
                .map(|i| u32::try_from(i + 1).unwrap_or(u32::MAX)),
        );
        LineIndex { starts }
    }

    /// Position of `offset`. Columns count characters, not bytes.
    pub fn position(&self, src: &str, offset: u32) -> Position {
        let line = self.starts.partition_point(|&s| s <= offset);
        let line_start = self.starts[line.saturating_sub(1)];
        let column = src
            .get(line_start as usize..offset as usize)
            .map_or(0, |s| s.chars().count());
        Position::new(
            offset,
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(column + 1).unwrap_or(u32::MAX),
        )
    }

    /// The full text of the 1-based line `line`, without its terminator.
    pub fn line_text<'a>(&self, src: &'a str, line: u32) -> &'a str {
        let Some(&start) = self.starts.get((line as usize).saturating_sub(1)) else {
            return "";
        };
        let end = self
            .starts
            .get(line as usize)
            .map_or(src.len(), |&next| next as usize);
        src.get(start as usize..end)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }
}
