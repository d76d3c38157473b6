//! Record sources.
//!
//! A [`RecordReader`] pulls one line at a time from any [`BufRead`] into a
//! reused buffer and decodes it as JSON. Memory held by the reader is bounded
//! by the longest line, not by the size of the log.
//!
//! Lines that are blank or fail to decode (including invalid UTF-8) are
//! skipped without a trace. Only I/O failures are reported.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SourceError};

/// Lazy iterator over the decoded records of a newline-delimited JSON log.
#[derive(Debug)]
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: u64,
    failed: bool,
}

/// Opens a k6 JSON output file.
///
/// # Errors
///
/// Returns [`SourceError::Unavailable`] if the file cannot be opened.
pub fn open<P: AsRef<Path>>(path: P) -> Result<RecordReader<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SourceError::Unavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(RecordReader::new(BufReader::new(file)))
}

/// Wraps an already-open reader, such as locked stdin or an in-memory buffer.
pub fn from_reader<R: BufRead>(reader: R) -> RecordReader<R> {
    RecordReader::new(reader)
}

impl<R: BufRead> RecordReader<R> {
    /// Creates a reader positioned at the start of `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            failed: false,
        }
    }

    /// Number of lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // A failed read ends the stream; the run must not
                    // produce a partial summary.
                    self.failed = true;
                    return Some(Err(SourceError::Read {
                        line: self.line + 1,
                        source: e,
                    }
                    .into()));
                }
            }

            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            if let Ok(record) = serde_json::from_slice::<Value>(line) {
                return Some(Ok(record));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn records(input: &str) -> Vec<Value> {
        from_reader(Cursor::new(input.as_bytes().to_vec()))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_reads_one_record_per_line() {
        let input = "{\"a\":1}\n{\"b\":2}\n";
        let got = records(input);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0]["a"], 1);
        assert_eq!(got[1]["b"], 2);
    }

    #[test]
    fn test_skips_blank_and_garbage_lines() {
        let input = "\n   \n{not json at all}\n{\"a\":1}\n{\"truncated\":\n\t\n";
        let got = records(input);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0]["a"], 1);
    }

    #[test]
    fn test_handles_crlf_and_missing_trailing_newline() {
        let input = "{\"a\":1}\r\n{\"a\":2}";
        let got = records(input);
        assert_eq!(got.len(), 2);
        assert_eq!(got[1]["a"], 2);
    }

    #[test]
    fn test_skips_invalid_utf8() {
        let mut input = b"{\"a\":\"\xff\xfe\"}\n".to_vec();
        input.extend_from_slice(b"{\"a\":1}\n");
        let got: Vec<_> = from_reader(Cursor::new(input))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn test_counts_lines_read() {
        let mut reader = from_reader(Cursor::new(b"\n{\"a\":1}\nnope\n".to_vec()));
        assert!(reader.next().is_some());
        assert_eq!(reader.lines_read(), 2);
        assert!(reader.next().is_none());
        assert_eq!(reader.lines_read(), 3);
    }

    /// Yields one good line, then fails.
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.sent {
                return Err(std::io::Error::other("device error"));
            }
            self.sent = true;
            let line = b"{\"a\":1}\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn test_io_error_ends_stream() {
        let mut reader = from_reader(BufReader::new(FailingReader { sent: false }));
        assert!(reader.next().unwrap().is_ok());

        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open(dir.path().join("results.json")).unwrap_err();
        match err {
            crate::ReportError::Source(e) => assert!(e.is_not_found()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
