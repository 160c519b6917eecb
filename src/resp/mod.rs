// https://redis.io/docs/reference/protocol-spec

pub mod inline;
pub mod parser;
pub mod tokenizer;

use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error as ThisError;

pub use inline::InlineParser;
pub use parser::{CommandArray, Parser};
pub use tokenizer::{Token, Tokenizer};

static CRLF: &[u8; 2] = b"\r\n";

/// A malformed request. The decoder position can no longer be trusted once one of these is
/// produced, so the connection that produced it is closed after the error is reported.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ProtocolError {
    #[error("ERR Protocol error: invalid input type")]
    InvalidType,
    #[error("ERR Protocol error: invalid bulk string array length")]
    InvalidArrayLength,
    #[error("ERR Protocol error: invalid bulk string length")]
    InvalidBulkLength,
    #[error("ERR Protocol error: line was not terminated with a CRLF")]
    NoCrlf,
    #[error("ERR Protocol error: missing bulk string data")]
    MissingBulkData,
    #[error("ERR Protocol error: input isn't a bulk string array")]
    NotCommandArray,
    #[error("ERR Protocol error: input bulk array is incomplete")]
    IncompleteArray,
    #[error("ERR Protocol error: input bulk string is incomplete")]
    IncompleteBulk,
    #[error("ERR Protocol error: unbalanced quotes in request")]
    UnbalancedQuotes,
    #[error("ERR Protocol error: too big inline request")]
    InlineTooBig,
}

/// Splits the next CRLF terminated line off `src`, without the terminator.
///
/// Returns `Ok(None)` while no `\n` is buffered yet. A line ending in a bare `\n` is an error.
fn take_line(src: &mut BytesMut) -> Result<Option<Bytes>, ProtocolError> {
    let Some(end) = src.iter().position(|byte| *byte == b'\n') else {
        return Ok(None);
    };

    if end == 0 || src[end - 1] != b'\r' {
        return Err(ProtocolError::NoCrlf);
    }

    let line = src.split_to(end - 1).freeze();
    src.advance(CRLF.len());

    Ok(Some(line))
}
