use crate::error::ChatError;

/// Incremental UTF-8 decoder for a chunked response body.
///
/// Chunk boundaries are arbitrary, so a multi-byte character may be split
/// across two reads. The incomplete tail is held back until the next chunk
/// completes it.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` (plus any held-back tail) as forms complete
    /// characters.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<String, ChatError> {
        self.pending.extend_from_slice(bytes);

        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_owned();
                self.pending.clear();
                Ok(text)
            }
            // error_len() == None means the input ended mid-character
            Err(err) if err.error_len().is_none() => {
                let tail = self.pending.split_off(err.valid_up_to());
                let head = std::mem::replace(&mut self.pending, tail);
                Ok(String::from_utf8(head).map_err(|e| e.utf8_error())?)
            }
            Err(err) => Err(ChatError::Decode(err)),
        }
    }

    /// Number of bytes still waiting for the rest of their character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
