//! Newline framing.
//!
//! A [`FrameDecoder`] accumulates raw bytes for one connection and yields
//! each complete `\n`-terminated line as a trimmed UTF-8 string. Bytes after
//! the last delimiter stay buffered for the next read. Accumulation happens
//! on bytes, so a multi-byte character split across reads decodes intact.

use bytes::{Buf, BytesMut};
use thiserror::Error;

const DELIMITER: u8 = b'\n';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame exceeds maximum length of {limit} bytes")]
    TooLong { limit: usize },
}

/// Per-connection frame accumulator.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to contain no delimiter.
    scanned: usize,
    max_frame_len: Option<usize>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject lines longer than `limit` bytes (delimiter excluded).
    pub fn with_max_frame_len(mut self, limit: usize) -> Self {
        self.max_frame_len = Some(limit);
        self
    }

    /// Append `bytes` and iterate over every frame now complete.
    ///
    /// The iterator is lazy: frames are removed from the accumulator one at
    /// a time as it is advanced. Frames not consumed stay buffered and are
    /// yielded by the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Frames<'_> {
        self.buffer.extend_from_slice(bytes);
        Frames { decoder: self }
    }

    /// Number of buffered bytes not yet part of a complete frame.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// End of stream. The partial trailing frame, if any, is discarded and
    /// its length returned.
    pub fn finish(self) -> usize {
        self.buffer.len()
    }

    fn next_frame(&mut self) -> Option<Result<String, FrameError>> {
        let found = self.buffer[self.scanned..]
            .iter()
            .position(|b| *b == DELIMITER)
            .map(|offset| self.scanned + offset);

        let Some(position) = found else {
            self.scanned = self.buffer.len();
            return self.check_pending_len();
        };

        if let Some(limit) = self.max_frame_len
            && position > limit
        {
            self.reset();
            return Some(Err(FrameError::TooLong { limit }));
        }

        let line = self.buffer.split_to(position);
        self.buffer.advance(1);
        self.scanned = 0;
        Some(Ok(String::from_utf8_lossy(&line).trim().to_string()))
    }

    fn check_pending_len(&mut self) -> Option<Result<String, FrameError>> {
        match self.max_frame_len {
            Some(limit) if self.buffer.len() > limit => {
                self.reset();
                Some(Err(FrameError::TooLong { limit }))
            }
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

/// Iterator over the frames completed by one [`FrameDecoder::feed`] call.
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Frames<'_> {
    type Item = Result<String, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_frame()
    }
}
