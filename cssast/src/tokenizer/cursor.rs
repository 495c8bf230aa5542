/// Peekable cursor over a byte buffer, tracking the 1-based line and column
/// of the next unconsumed byte.
///
/// Next bytes can be peeked via `first`/`second`/`nth`,
/// and position can be shifted forward via `bump`.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

/// Saved cursor state used to rewind a speculative scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub pos: usize,
    pub line: u32,
    pub column: u32,
}

pub(crate) const EOF_BYTE: u8 = b'\0';

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Cursor<'a> {
        Cursor {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Peeks the next byte without consuming it.
    /// If requested position doesn't exist, `EOF_BYTE` is returned.
    /// However, getting `EOF_BYTE` doesn't always mean actual end of file,
    /// it should be checked with `is_eof` method.
    pub fn first(&self) -> u8 {
        self.nth(0)
    }

    pub fn second(&self) -> u8 {
        self.nth(1)
    }

    pub fn nth(&self, n: usize) -> u8 {
        self.input.get(self.pos + n).copied().unwrap_or(EOF_BYTE)
    }

    /// Checks if there is nothing more to consume.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.pos = snapshot.pos;
        self.line = snapshot.line;
        self.column = snapshot.column;
    }

    /// Bytes consumed since `start`.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.input[start..self.pos]
    }

    /// Moves to the next byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = *self.input.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    pub fn bump_two(&mut self) -> Option<u8> {
        self.bump()?;
        self.bump()
    }

    /// Eats bytes while predicate returns true or until the end of file is reached.
    pub fn bump_while_first(&mut self, mut predicate: impl FnMut(u8) -> bool) {
        while !self.is_eof() && predicate(self.first()) {
            self.bump();
        }
    }
}
