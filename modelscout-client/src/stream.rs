//! Newline-delimited JSON response streaming.
//!
//! The server streams inference output as one JSON object per line.
//! [`ChunkStream`] exposes those objects as a lazy, single-pass sequence
//! of parsed chunks: chunks come out in server emission order, and
//! dropping the stream early closes the underlying connection, so a
//! half-read response can simply be abandoned. The sequence is not
//! restartable.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Lazy sequence of parsed NDJSON chunks from one streamed response.
pub struct ChunkStream<T> {
    bytes: ByteStream,
    buffer: Vec<u8>,
    finished: bool,
    _chunk: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for ChunkStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("buffer_len", &self.buffer.len())
            .field("finished", &self.finished)
            .finish()
    }
}

impl<T: DeserializeOwned> ChunkStream<T> {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self::from_bytes(Box::pin(response.bytes_stream()))
    }

    fn from_bytes(bytes: ByteStream) -> Self {
        Self {
            bytes,
            buffer: Vec::new(),
            finished: false,
            _chunk: PhantomData,
        }
    }

    /// Pop the next complete line from the buffer, skipping blank lines.
    /// Network chunks and lines do not align: one chunk may carry several
    /// lines, and a line may span several chunks.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if !line.iter().all(u8::is_ascii_whitespace) {
                return Some(line);
            }
        }
        None
    }

    fn parse(line: &[u8]) -> Result<T> {
        serde_json::from_slice(line)
            .map_err(|e| Error::MalformedResponse(format!("bad stream chunk: {}", e)))
    }
}

impl<T: DeserializeOwned> Stream for ChunkStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.as_mut().get_mut();
        loop {
            if this.finished {
                return Poll::Ready(None);
            }
            if let Some(line) = this.next_line() {
                return Poll::Ready(Some(Self::parse(&line)));
            }
            match this.bytes.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.buffer.extend_from_slice(&chunk);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(Error::Unreachable(e.to_string()))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    // The server may omit the final newline.
                    if !this.buffer.iter().all(u8::is_ascii_whitespace) {
                        let line = std::mem::take(&mut this.buffer);
                        return Poll::Ready(Some(Self::parse(&line)));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
