//! In-memory file for code under test that wants a readable/writable handle.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// A named byte buffer with a cursor. Every I/O call after [`close`]
/// fails.
///
/// [`close`]: MockFile::close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFile {
    name: String,
    body: Cursor<Vec<u8>>,
    closed: bool,
}

impl MockFile {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: Cursor::new(body.into()),
            closed: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full body, regardless of the cursor.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        self.body.get_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.get_ref().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.get_ref().is_empty()
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn open_body(&mut self) -> io::Result<&mut Cursor<Vec<u8>>> {
        if self.closed {
            Err(io::Error::other(format!("{}: file already closed", self.name)))
        } else {
            Ok(&mut self.body)
        }
    }
}

impl Read for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.open_body()?.read(buf)
    }
}

impl Write for MockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.open_body()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.open_body()?.flush()
    }
}

impl Seek for MockFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.open_body()?.seek(pos)
    }
}
