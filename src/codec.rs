use bytes::BytesMut;
use std::io;
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::Frame;
use crate::resp::inline::DEFAULT_MAX_INLINE_LEN;
use crate::resp::tokenizer::DEFAULT_MAX_BULK_LEN;
use crate::resp::{CommandArray, Parser, ProtocolError};

#[derive(Debug, ThisError)]
pub enum DecodeError {
    /// The client sent a malformed request.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Size limits applied to every request read by a [`CommandCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_bulk_len: i64,
    pub max_inline_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
            max_inline_len: DEFAULT_MAX_INLINE_LEN,
        }
    }
}

/// Reads command arrays off a connection and writes reply frames back.
///
/// Each connection owns its codec: the decoder keeps partially received commands between reads.
#[derive(Debug)]
pub struct CommandCodec {
    parser: Parser,
}

impl CommandCodec {
    pub fn new(limits: Limits) -> CommandCodec {
        CommandCodec {
            parser: Parser::with_limits(limits.max_bulk_len, limits.max_inline_len),
        }
    }
}

impl Default for CommandCodec {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Decoder for CommandCodec {
    type Item = CommandArray;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.parser.next_command(src)?)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(command) = self.decode(src)? {
            return Ok(Some(command));
        }

        // The peer went away. That is an orderly disconnect only between two commands.
        match self.parser.pending_error(src) {
            Some(err) => Err(err.into()),
            None => Ok(None),
        }
    }
}

impl Encoder<Frame> for CommandCodec {
    type Error = io::Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame.encode(dst);
        Ok(())
    }
}
