//! Line-oriented terminal access used by the prompter.

use std::io::{self, BufRead, Write};

/// A device that can show text and hand back one line at a time.
pub trait LineIo {
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    /// Blocks until a full line is available.
    ///
    /// The line terminator is stripped. Returns `None` once the input is
    /// exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// [`LineIo`] over any buffered reader and writer pair.
///
/// Wraps stdin/stdout for interactive sessions, a replay file for batch
/// sessions, and in-memory buffers in tests.
pub struct StreamIo<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamIo<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the output sink, e.g. to inspect a transcript.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl StreamIo<io::StdinLock<'static>, io::Stdout> {
    /// Interactive session on the process terminal.
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineIo for StreamIo<R, W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        // The prompt must be visible before we block.
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn strips_line_terminators() {
        let mut io = StreamIo::new(Cursor::new("first\r\nsecond\n  third  "), Vec::new());
        assert_eq!(io.read_line().unwrap().as_deref(), Some("first"));
        assert_eq!(io.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(io.read_line().unwrap().as_deref(), Some("  third  "));
        assert_eq!(io.read_line().unwrap(), None);
    }

    #[test]
    fn empty_line_is_not_end_of_input() {
        let mut io = StreamIo::new(Cursor::new("\n"), Vec::new());
        assert_eq!(io.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(io.read_line().unwrap(), None);
    }

    #[test]
    fn write_line_appends_newline() {
        let mut io = StreamIo::new(Cursor::new(""), Vec::new());
        io.write("a").unwrap();
        io.write_line("b").unwrap();
        io.write_line("").unwrap();
        assert_eq!(String::from_utf8(io.into_output()).unwrap(), "ab\n\n");
    }
}
