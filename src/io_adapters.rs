use std::cell::RefCell;
use std::io::{self, BufWriter, Result as IoResult, Write};
use std::rc::Rc;

/// Shared handle to the bytes collected by a [`MemWriter`].
pub type Captured = Rc<RefCell<Vec<u8>>>;

/// Output and error streams of a session.
///
/// Everything the interpreter prints goes through these writers. The default
/// streams are buffered, so callers must [`flush`](Streams::flush) before
/// handing the terminal to a child process.
pub struct Streams {
    pub out: Box<dyn Write>,
    pub err: Box<dyn Write>,
}

impl Streams {
    /// Buffered standard output and standard error.
    pub fn standard() -> Self {
        Self {
            out: Box::new(BufWriter::new(io::stdout())),
            err: Box::new(BufWriter::new(io::stderr())),
        }
    }

    /// In-memory streams; returns the streams and handles to (stdout, stderr).
    pub fn captured() -> (Self, Captured, Captured) {
        let (out, out_rc) = MemWriter::with_handle();
        let (err, err_rc) = MemWriter::with_handle();
        (
            Self {
                out: Box::new(out),
                err: Box::new(err),
            },
            out_rc,
            err_rc,
        )
    }

    pub fn flush(&mut self) -> IoResult<()> {
        self.out.flush()?;
        self.err.flush()
    }
}

impl Default for Streams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Memory-backed writer for capturing output.
pub struct MemWriter {
    buf: Captured,
}

impl MemWriter {
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Writer appending to an existing buffer, e.g. one shared by both streams.
    pub fn with_buffer(buf: Captured) -> Self {
        Self { buf }
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Captured) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Take the text collected so far, leaving the buffer empty.
pub fn take_text(captured: &Captured) -> String {
    let bytes = std::mem::take(&mut *captured.borrow_mut());
    String::from_utf8_lossy(&bytes).into_owned()
}
