//! Streaming the buffer back out as bytes.

use std::io::{self, Read};

use crate::line::{LineId, LineStore};

/// Reads the lines of a buffer joined by `\n`, with nothing after the last
/// line. Loading what it produces gives back the same lines.
#[derive(Debug)]
pub struct BufferReader<'a> {
    lines: &'a LineStore,
    line: Option<LineId>,
    offset: usize,
}

impl<'a> BufferReader<'a> {
    pub(crate) fn new(lines: &'a LineStore) -> Self {
        Self {
            lines,
            line: Some(lines.first()),
            offset: 0,
        }
    }
}

impl Read for BufferReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut nread = 0;
        while nread < buf.len() {
            let Some(line) = self.line else {
                break;
            };

            let data = &self.lines.data(line)[self.offset..];
            let room = buf.len() - nread;
            if data.len() >= room {
                buf[nread..].copy_from_slice(&data[..room]);
                self.offset += room;
                nread += room;
                break;
            }

            buf[nread..nread + data.len()].copy_from_slice(data);
            nread += data.len();

            // `buf` has room left here, so the separator fits
            self.line = self.lines.next(line);
            self.offset = 0;
            if self.line.is_some() {
                buf[nread] = b'\n';
                nread += 1;
            }
        }
        Ok(nread)
    }
}
