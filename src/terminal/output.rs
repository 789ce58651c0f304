//! Output buffering for the crossterm surface.
//!
//! Escape sequences and text are queued into one buffer per frame and
//! written to stdout in a single syscall on flush.

use std::io::{self, Write};

// =============================================================================
// OutputBuffer
// =============================================================================

/// A buffer that accumulates output for batch writing.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop pending output without writing it.
    #[inline]
    pub fn discard(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Write everything to `writer` and empty the buffer.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(())
    }

    /// Flush buffer to stdout (blocking).
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Buffering only; the real flush is flush_to/flush_stdout
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_to_empties_buffer() {
        let mut buffer = OutputBuffer::new();
        buffer.write_str("ab");
        write!(buffer, "{}", 12).unwrap();
        assert_eq!(buffer.as_str(), "ab12");

        let mut sink = Vec::new();
        buffer.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"ab12");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_discard() {
        let mut buffer = OutputBuffer::with_capacity(8);
        buffer.write_str("pending");
        assert_eq!(buffer.len(), 7);
        buffer.discard();
        assert!(buffer.is_empty());
    }
}
