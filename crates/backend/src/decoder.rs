use std::char::REPLACEMENT_CHARACTER;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};

/// Incremental UTF-8 decoder for one response body.
///
/// Bytes of a code point split across chunk boundaries are held back until the
/// next chunk completes them. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes everything that is complete after appending `chunk`.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    if let Ok(prefix) = std::str::from_utf8(&self.pending[..valid]) {
                        out.push_str(prefix);
                    }

                    match error.error_len() {
                        // Truncated sequence at the tail: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(invalid) => {
                            out.push(REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                    }
                }
            }
        }
    }

    /// Flushes bytes left over when the body ended mid-sequence.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }

        let mut out = self.decode(&[]);
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(REPLACEMENT_CHARACTER);
        }
        out
    }

    pub fn has_pending_bytes(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Adapts a stream of byte chunks into a stream of text fragments.
///
/// Chunks that only carry part of a code point yield nothing; the first
/// transport error ends the sequence.
pub struct FragmentDecoder<S> {
    inner: S,
    decoder: StreamDecoder,
    done: bool,
}

impl<S> FragmentDecoder<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: StreamDecoder::new(),
            done: false,
        }
    }
}

impl<S, B, E> Stream for FragmentDecoder<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            let next = match this.inner.poll_next_unpin(cx) {
                Poll::Ready(next) => next,
                Poll::Pending => return Poll::Pending,
            };

            match next {
                Some(Ok(chunk)) => {
                    let fragment = this.decoder.decode(chunk.as_ref());
                    if !fragment.is_empty() {
                        return Poll::Ready(Some(Ok(fragment)));
                    }
                }
                Some(Err(error)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                None => {
                    this.done = true;
                    if this.decoder.has_pending_bytes() {
                        tracing::debug!("stream ended inside a multi-byte character");
                    }
                    let tail = this.decoder.finish();
                    if !tail.is_empty() {
                        return Poll::Ready(Some(Ok(tail)));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use futures::stream;

    use super::*;

    fn collect(chunks: Vec<Result<Vec<u8>, &'static str>>) -> Vec<Result<String, &'static str>> {
        block_on(FragmentDecoder::new(stream::iter(chunks)).collect::<Vec<_>>())
    }

    #[test]
    fn ascii_chunks_pass_through_in_order() {
        let fragments = collect(vec![Ok(b"Hello ".to_vec()), Ok(b"world".to_vec())]);
        assert_eq!(fragments, vec![Ok("Hello ".to_string()), Ok("world".to_string())]);
    }

    #[test]
    fn two_byte_character_split_across_chunks() {
        // "é" is 0xC3 0xA9.
        let fragments = collect(vec![Ok(vec![b'c', b'a', b'f', 0xC3]), Ok(vec![0xA9, b'!'])]);
        assert_eq!(fragments, vec![Ok("caf".to_string()), Ok("é!".to_string())]);
        let joined: String = fragments.into_iter().map(Result::unwrap).collect();
        assert!(!joined.contains(REPLACEMENT_CHARACTER));
    }

    #[test]
    fn four_byte_character_split_three_ways() {
        let leaf = "🌿".as_bytes().to_vec();
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.decode(&leaf[..1]), "");
        assert_eq!(decoder.decode(&leaf[1..3]), "");
        assert!(decoder.has_pending_bytes());
        assert_eq!(decoder.decode(&leaf[3..]), "🌿");
        assert!(!decoder.has_pending_bytes());
    }

    #[test]
    fn chunk_holding_only_a_partial_character_yields_nothing() {
        let bytes = "ಎಲೆ".as_bytes().to_vec();
        let fragments = collect(vec![Ok(bytes[..2].to_vec()), Ok(bytes[2..].to_vec())]);
        assert_eq!(fragments, vec![Ok("ಎಲೆ".to_string())]);
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_tail_is_flushed_on_completion() {
        let fragments = collect(vec![Ok(vec![b'o', b'k', 0xE0, 0xB2])]);
        assert_eq!(fragments, vec![Ok("ok".to_string()), Ok("\u{FFFD}".to_string())]);
    }

    #[test]
    fn transport_error_ends_the_sequence() {
        let fragments = collect(vec![
            Ok(b"partial".to_vec()),
            Err("connection reset"),
            Ok(b"never seen".to_vec()),
        ]);
        assert_eq!(
            fragments,
            vec![Ok("partial".to_string()), Err("connection reset")]
        );
    }
}
