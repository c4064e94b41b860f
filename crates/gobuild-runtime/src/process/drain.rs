//! Byte-chunk stream readers.
//!
//! Go tooling (and the programs `go run` executes) can emit arbitrary bytes.
//! Reads are fixed-size and not line-buffered, so a multi-byte UTF-8
//! sequence may straddle two reads; the decoder carries the incomplete tail
//! into the next chunk and replaces genuinely invalid bytes with U+FFFD.

use std::io::ErrorKind;

use gobuild_core::{DEFAULT_READ_CHUNK_SIZE, OutputChunk, StreamKind};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Reads one output stream of a child to end-of-stream.
#[derive(Debug, Clone, Copy)]
pub struct StreamDrain {
    kind: StreamKind,
    chunk_size: usize,
}

impl StreamDrain {
    pub fn new(kind: StreamKind, chunk_size: usize) -> Self {
        Self {
            kind,
            chunk_size: chunk_size.max(1),
        }
    }

    pub const fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Drain `stream` on its own task, pushing chunks into `tx`.
    pub fn spawn<R>(self, stream: R, tx: mpsc::UnboundedSender<OutputChunk>) -> JoinHandle<u64>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move { self.drain(stream, tx).await })
    }

    /// Read `stream` until end-of-stream and return the number of bytes read.
    ///
    /// Read errors other than interruption end the drain like EOF does. If the
    /// consumer has gone away the stream is still read to the end so the
    /// child never blocks on a full pipe.
    pub async fn drain<R>(self, mut stream: R, tx: mpsc::UnboundedSender<OutputChunk>) -> u64
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.chunk_size];
        let mut decoder = Utf8Decoder::default();
        let mut total: u64 = 0;

        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    total += n as u64;
                    self.push(&tx, decoder.decode(&buf[..n]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    debug!(stream = %self.kind, error = %e, "Stream read failed, treating as end of stream");
                    break;
                }
            }
        }

        self.push(&tx, decoder.finish());
        debug!(stream = %self.kind, bytes = total, "Stream drain exiting");
        total
    }

    fn push(&self, tx: &mpsc::UnboundedSender<OutputChunk>, text: String) {
        if text.is_empty() {
            return;
        }
        // A closed channel only means nobody is printing this process any more
        let _ = tx.send(OutputChunk::text(self.kind, text));
    }
}

impl Default for StreamDrain {
    fn default() -> Self {
        Self::new(StreamKind::Stdout, DEFAULT_READ_CHUNK_SIZE)
    }
}

/// Incremental UTF-8 decoder.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        // Incomplete sequence at the end, wait for more bytes
                        None => {
                            rest = tail;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}
