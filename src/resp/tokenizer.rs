use bytes::{Buf, Bytes, BytesMut};
use std::str;

use crate::resp::{take_line, ProtocolError, CRLF};

/// Largest bulk string accepted by default, mirroring Redis' `proto-max-bulk-len`.
pub const DEFAULT_MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Longest array or bulk length line waited for before the request is rejected.
const MAX_LENGTH_LINE: usize = 64 * 1024;

/// Most buffer space reserved ahead of the bytes of a bulk string actually arriving.
const MAX_BULK_RESERVE: usize = 32 * 1024;

/// One structural element of a request.
///
/// Negative lengths are null markers: `*-1` is a null array and `$-1` a null bulk string. Empty and
/// null bulk strings are never followed by a `BulkData` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    ArrayStart(i64),
    BulkStart(i64),
    BulkData(Bytes),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectType,
    ExpectArrayLength,
    ExpectBulkLength,
    // Data length, without the trailing CRLF.
    ExpectBulkData(usize),
}

/// A state machine turning raw request bytes into tokens, one token per call.
///
/// The tokenizer works on a growing buffer: when the buffer does not hold enough bytes for the next
/// token, `next_token` returns `Ok(None)` and the following call resumes where it stopped. Bytes
/// are only removed from the buffer once they have been turned into state or tokens.
#[derive(Debug)]
pub struct Tokenizer {
    state: State,
    max_bulk_len: i64,
    // Set after `$0`, the CRLF of an empty payload may or may not follow.
    after_empty_bulk: bool,
}

impl Tokenizer {
    pub fn new() -> Tokenizer {
        Tokenizer::with_max_bulk_len(DEFAULT_MAX_BULK_LEN)
    }

    pub fn with_max_bulk_len(max_bulk_len: i64) -> Tokenizer {
        Tokenizer {
            state: State::ExpectType,
            max_bulk_len,
            after_empty_bulk: false,
        }
    }

    /// Whether the tokenizer sits between two tokens, with no partially read token.
    pub fn is_idle(&self) -> bool {
        self.state == State::ExpectType
    }

    /// Drops the CRLF that clients may send as the payload of an empty bulk string (`$0\r\n\r\n`).
    ///
    /// Returns `false` while the buffer is too short to tell.
    pub(crate) fn skip_empty_bulk_terminator(&mut self, src: &mut BytesMut) -> bool {
        if !self.after_empty_bulk {
            return true;
        }

        match &src[..] {
            [] | [b'\r'] => return false,
            [b'\r', b'\n', ..] => src.advance(CRLF.len()),
            _ => {}
        }

        self.after_empty_bulk = false;
        true
    }

    pub fn next_token(&mut self, src: &mut BytesMut) -> Result<Option<Token>, ProtocolError> {
        loop {
            match self.state {
                State::ExpectType => {
                    if !self.skip_empty_bulk_terminator(src) {
                        return Ok(None);
                    }

                    let Some(&first_byte) = src.first() else {
                        return Ok(None);
                    };

                    self.state = match first_byte {
                        b'*' => State::ExpectArrayLength,
                        b'$' => State::ExpectBulkLength,
                        _ => return Err(ProtocolError::InvalidType),
                    };
                    src.advance(1);
                }
                State::ExpectArrayLength => {
                    let Some(length) = read_length(src, ProtocolError::InvalidArrayLength)? else {
                        return Ok(None);
                    };

                    self.state = State::ExpectType;
                    return Ok(Some(Token::ArrayStart(length)));
                }
                State::ExpectBulkLength => {
                    let Some(length) = read_length(src, ProtocolError::InvalidBulkLength)? else {
                        return Ok(None);
                    };

                    if length > self.max_bulk_len {
                        return Err(ProtocolError::InvalidBulkLength);
                    }

                    self.after_empty_bulk = length == 0;
                    self.state = if length > 0 {
                        let length =
                            usize::try_from(length).map_err(|_| ProtocolError::InvalidBulkLength)?;
                        State::ExpectBulkData(length)
                    } else {
                        State::ExpectType
                    };
                    return Ok(Some(Token::BulkStart(length)));
                }
                State::ExpectBulkData(length) => {
                    if src.len() < length + CRLF.len() {
                        let missing = length + CRLF.len() - src.len();
                        src.reserve(missing.min(MAX_BULK_RESERVE));
                        return Ok(None);
                    }

                    if &src[length..length + CRLF.len()] != CRLF {
                        return Err(ProtocolError::NoCrlf);
                    }

                    let data = src.split_to(length).freeze();
                    src.advance(CRLF.len());

                    self.state = State::ExpectType;
                    return Ok(Some(Token::BulkData(data)));
                }
            }
        }
    }

    /// The error to report when the stream ends while a token is only partially read.
    pub fn pending_error(&self) -> Option<ProtocolError> {
        match self.state {
            State::ExpectType => None,
            State::ExpectArrayLength => Some(ProtocolError::InvalidArrayLength),
            State::ExpectBulkLength => Some(ProtocolError::InvalidBulkLength),
            State::ExpectBulkData(_) => Some(ProtocolError::MissingBulkData),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn read_length(src: &mut BytesMut, invalid: ProtocolError) -> Result<Option<i64>, ProtocolError> {
    let Some(line) = take_line(src)? else {
        if src.len() > MAX_LENGTH_LINE {
            return Err(invalid);
        }
        return Ok(None);
    };

    let length = str::from_utf8(&line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(invalid)?;

    Ok(Some(length))
}
