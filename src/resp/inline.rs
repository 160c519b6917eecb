use bytes::{Bytes, BytesMut};

use crate::resp::parser::CommandArray;
use crate::resp::{take_line, ProtocolError};

/// Longest inline line accepted by default, mirroring Redis' limit on inline requests.
pub const DEFAULT_MAX_INLINE_LEN: usize = 64 * 1024;

/// Parses inline commands, the plain text format used by telnet-style clients:
///
/// ```text
/// SET greeting "hello world"\r\n
/// ```
///
/// Words are separated by unquoted spaces, double quotes group words together and a backslash
/// makes the following byte literal.
#[derive(Debug)]
pub struct InlineParser {
    max_line_len: usize,
}

impl InlineParser {
    pub fn new(max_line_len: usize) -> InlineParser {
        InlineParser { max_line_len }
    }

    pub fn next_command_array(
        &self,
        src: &mut BytesMut,
    ) -> Result<Option<CommandArray>, ProtocolError> {
        let Some(line) = take_line(src)? else {
            if src.len() > self.max_line_len {
                return Err(ProtocolError::InlineTooBig);
            }
            return Ok(None);
        };

        split(&line).map(Some)
    }
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INLINE_LEN)
    }
}

fn split(line: &[u8]) -> Result<CommandArray, ProtocolError> {
    let mut words = CommandArray::new();
    let mut word = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for &byte in line {
        match byte {
            _ if escaped => {
                word.push(byte);
                escaped = false;
            }
            b'\\' => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b' ' | b'\t' if !in_quotes => {
                if !word.is_empty() {
                    words.push(Some(Bytes::from(std::mem::take(&mut word))));
                }
            }
            _ => word.push(byte),
        }
    }

    if in_quotes {
        return Err(ProtocolError::UnbalancedQuotes);
    }

    if !word.is_empty() {
        words.push(Some(Bytes::from(word)));
    }

    Ok(words)
}
