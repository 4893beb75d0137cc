use memchr::{memchr, memchr_iter};

use crate::processor::{ProcessorError, Result};

/// Field separator
pub const DELIMITER: u8 = b',';

/// Split one line into its fields.
///
/// A single trailing `\r` is dropped so CRLF files parse like LF files.
/// There is no quoting: every delimiter splits, and an empty line yields
/// one empty field.
pub fn split_fields(line: &[u8]) -> std::result::Result<Vec<String>, std::str::Utf8Error> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let mut fields = Vec::new();
    let mut field_start = 0;
    for pos in memchr_iter(DELIMITER, line) {
        fields.push(std::str::from_utf8(&line[field_start..pos])?.to_owned());
        field_start = pos + 1;
    }
    fields.push(std::str::from_utf8(&line[field_start..])?.to_owned());
    Ok(fields)
}

/// Reads a buffer one line at a time.
///
/// `next_line` returns `None` once the input is exhausted, which is distinct
/// from an empty line (`Some(Ok(vec![""]))`). A trailing newline at the end
/// of the buffer does not produce an extra line.
#[derive(Debug)]
pub struct LineParser<'a> {
    buf: &'a [u8],
    pos: usize,
    line_no: usize,
}

impl<'a> LineParser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        LineParser {
            buf,
            pos: 0,
            line_no: 0,
        }
    }

    /// 1-based number of the line most recently returned
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    pub fn next_line(&mut self) -> Option<Result<Vec<String>>> {
        if self.pos >= self.buf.len() {
            return None;
        }

        let rest = &self.buf[self.pos..];
        let line = match memchr(b'\n', rest) {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None => {
                self.pos = self.buf.len();
                rest
            }
        };
        self.line_no += 1;

        let line_no = self.line_no;
        Some(split_fields(line).map_err(|source| ProcessorError::Utf8 {
            line: line_no,
            source,
        }))
    }
}

impl Iterator for LineParser<'_> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
