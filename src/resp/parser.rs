use bytes::{Bytes, BytesMut};

use crate::resp::inline::{InlineParser, DEFAULT_MAX_INLINE_LEN};
use crate::resp::tokenizer::{Token, Tokenizer, DEFAULT_MAX_BULK_LEN};
use crate::resp::ProtocolError;

/// One decoded invocation: the command words followed by their arguments.
///
/// `None` is a null bulk string (`$-1`), which is kept apart from an empty one (`$0`).
pub type CommandArray = Vec<Option<Bytes>>;

// Upper bound for preallocating items, a declared length is untrusted input.
const MAX_PREALLOCATED_ITEMS: usize = 1024;

#[derive(Debug)]
struct PartialArray {
    expected: usize,
    items: CommandArray,
    // Declared length of a bulk string whose data token has not been read yet.
    pending_bulk: Option<i64>,
}

/// Assembles command arrays out of tokens.
///
/// A command array that is only partially buffered is kept between calls, so the parser can be fed
/// from a socket as data arrives.
#[derive(Debug)]
pub struct Parser {
    tokenizer: Tokenizer,
    inline: InlineParser,
    array: Option<PartialArray>,
}

impl Parser {
    pub fn new() -> Parser {
        Parser::with_limits(DEFAULT_MAX_BULK_LEN, DEFAULT_MAX_INLINE_LEN)
    }

    pub fn with_limits(max_bulk_len: i64, max_inline_len: usize) -> Parser {
        Parser {
            tokenizer: Tokenizer::with_max_bulk_len(max_bulk_len),
            inline: InlineParser::new(max_inline_len),
            array: None,
        }
    }

    /// Whether no command is partially decoded.
    pub fn is_idle(&self) -> bool {
        self.array.is_none() && self.tokenizer.is_idle()
    }

    /// Decodes the next command, in either the structured or the inline format.
    ///
    /// A request starting with `*` goes through the tokenizer, any other leading byte starts an
    /// inline command line.
    pub fn next_command(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<CommandArray>, ProtocolError> {
        if self.is_idle() {
            if !self.tokenizer.skip_empty_bulk_terminator(src) {
                return Ok(None);
            }

            match src.first().copied() {
                None => return Ok(None),
                Some(b'*') => {}
                Some(_) => return self.inline.next_command_array(src),
            }
        }

        self.next_command_array(src)
    }

    /// Decodes the next structured command array: `*<n>\r\n` followed by `n` bulk strings.
    ///
    /// A null or empty array declaration yields an empty command array.
    pub fn next_command_array(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<CommandArray>, ProtocolError> {
        loop {
            let Some(array) = self.array.as_mut() else {
                let Some(token) = self.tokenizer.next_token(src)? else {
                    return Ok(None);
                };

                let Token::ArrayStart(length) = token else {
                    return Err(ProtocolError::NotCommandArray);
                };

                if length < 1 {
                    return Ok(Some(CommandArray::new()));
                }

                let expected =
                    usize::try_from(length).map_err(|_| ProtocolError::InvalidArrayLength)?;
                self.array = Some(PartialArray {
                    expected,
                    items: CommandArray::with_capacity(expected.min(MAX_PREALLOCATED_ITEMS)),
                    pending_bulk: None,
                });
                continue;
            };

            if array.items.len() == array.expected {
                return Ok(self.array.take().map(|array| array.items));
            }

            let Some(token) = self.tokenizer.next_token(src)? else {
                return Ok(None);
            };

            match (array.pending_bulk, token) {
                (None, Token::BulkStart(length)) if length > 0 => {
                    array.pending_bulk = Some(length);
                }
                (None, Token::BulkStart(0)) => array.items.push(Some(Bytes::new())),
                (None, Token::BulkStart(_)) => array.items.push(None),
                (None, _) => return Err(ProtocolError::IncompleteArray),
                (Some(length), Token::BulkData(data)) if data.len() as i64 == length => {
                    array.items.push(Some(data));
                    array.pending_bulk = None;
                }
                (Some(_), _) => return Err(ProtocolError::IncompleteBulk),
            }
        }
    }

    /// The error to report when the stream ends with `remaining` bytes left undecoded.
    pub fn pending_error(&self, remaining: &[u8]) -> Option<ProtocolError> {
        if let Some(err) = self.tokenizer.pending_error() {
            return Some(err);
        }

        if self.array.is_some() {
            return Some(ProtocolError::IncompleteArray);
        }

        // Whatever is left is the beginning of an inline command that never got its line end.
        (!remaining.is_empty()).then_some(ProtocolError::NoCrlf)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn bulk(s: &'static str) -> Option<Bytes> {
        Some(Bytes::from(s))
    }

    fn parse(data: &[u8]) -> Result<Option<CommandArray>, ProtocolError> {
        let mut src = BytesMut::from(data);
        Parser::new().next_command(&mut src)
    }

    #[test]
    fn command_array() {
        assert_eq!(
            parse(b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n"),
            Ok(Some(vec![bulk("SET"), bulk("key"), bulk("value")]))
        );
    }

    #[test]
    fn echo_with_spaces() {
        assert_eq!(
            parse(b"*2\r\n$4\r\nECHO\r\n$12\r\nHello World!\r\n"),
            Ok(Some(vec![bulk("ECHO"), bulk("Hello World!")]))
        );
    }

    #[test]
    fn empty_and_null_bulk_strings() {
        assert_eq!(
            parse(b"*3\r\n$3\r\nSET\r\n$0\r\n$-1\r\n"),
            Ok(Some(vec![bulk("SET"), Some(Bytes::new()), None]))
        );
    }

    #[test]
    fn empty_and_null_arrays() {
        assert_eq!(parse(b"*0\r\n"), Ok(Some(vec![])));
        assert_eq!(parse(b"*-1\r\n"), Ok(Some(vec![])));
    }

    #[test]
    fn not_a_command_array() {
        let mut src = BytesMut::from("$3\r\nGET\r\n");

        assert_eq!(
            Parser::new().next_command_array(&mut src),
            Err(ProtocolError::NotCommandArray)
        );
    }

    #[test]
    fn leading_bulk_string_is_inline() {
        let mut src = BytesMut::from("$3\r\nGET\r\n");
        let mut parser = Parser::new();

        assert_eq!(parser.next_command(&mut src), Ok(Some(vec![bulk("$3")])));
        assert_eq!(parser.next_command(&mut src), Ok(Some(vec![bulk("GET")])));
        assert!(parser.is_idle());
    }

    #[test]
    fn long_length_line_is_rejected_like_long_inline_line() {
        let mut parser = Parser::with_limits(DEFAULT_MAX_BULK_LEN, 16);
        let mut src = BytesMut::from("*");
        src.extend_from_slice(&vec![b'1'; 128 * 1024]);

        assert_eq!(
            parser.next_command(&mut src),
            Err(ProtocolError::InvalidArrayLength)
        );
    }

    #[test]
    fn decodes_what_the_encoder_writes() {
        for command in [
            vec![bulk("PING")],
            vec![bulk("SET"), bulk("key"), Some(Bytes::new())],
            vec![bulk("SET"), bulk("key"), None],
            vec![bulk("ECHO"), Some(Bytes::from(&b"\x00\xFF\r\n\r\n"[..]))],
            vec![bulk("ECHO"), bulk("line\r\nbreak"), bulk("")],
            vec![None, None],
        ] {
            let frame = Frame::Array(
                command
                    .iter()
                    .map(|part| part.clone().map_or(Frame::Null, Frame::Bulk))
                    .collect(),
            );
            let mut src = BytesMut::from(&frame.serialize()[..]);
            let mut parser = Parser::new();

            assert_eq!(
                parser.next_command(&mut src),
                Ok(Some(command.clone())),
                "{}",
                frame
            );
            assert_eq!(parser.next_command(&mut src), Ok(None));
            assert!(src.is_empty());
        }
    }

    #[test]
    fn array_inside_array() {
        assert_eq!(
            parse(b"*2\r\n*1\r\n$3\r\nGET\r\n"),
            Err(ProtocolError::IncompleteArray)
        );
    }

    #[test]
    fn tokenizer_errors_propagate() {
        assert_eq!(parse(b"*1\r\n:5\r\n"), Err(ProtocolError::InvalidType));
        assert_eq!(parse(b"*2\r\n$3\r\nGET\r\n$1\n"), Err(ProtocolError::NoCrlf));
        assert_eq!(
            parse(b"*1\r\n$5\r\nabc\r\n*1\r\n"),
            Err(ProtocolError::NoCrlf)
        );
    }

    #[test]
    fn inline_fallback() {
        assert_eq!(
            parse(b"ECHO abc \"def ghi\"\r\n"),
            Ok(Some(vec![bulk("ECHO"), bulk("abc"), bulk("def ghi")]))
        );
    }

    #[test]
    fn consecutive_commands() {
        let mut src = BytesMut::from("*1\r\n$4\r\nPING\r\nPING\r\n*2\r\n$3\r\nGET\r\n$1\r\na\r\n");
        let mut parser = Parser::new();

        assert_eq!(parser.next_command(&mut src), Ok(Some(vec![bulk("PING")])));
        assert_eq!(parser.next_command(&mut src), Ok(Some(vec![bulk("PING")])));
        assert_eq!(
            parser.next_command(&mut src),
            Ok(Some(vec![bulk("GET"), bulk("a")]))
        );
        assert_eq!(parser.next_command(&mut src), Ok(None));
        assert!(parser.is_idle());
    }

    #[test]
    fn resumes_partial_arrays() {
        let mut src = BytesMut::new();
        let mut parser = Parser::new();

        for part in [
            &b"*3\r\n$3\r\nSE"[..],
            &b"T\r\n$5\r\nmyke"[..],
            &b"y\r\n$7\r\nmyvalue\r"[..],
        ] {
            src.extend_from_slice(part);
            assert_eq!(parser.next_command(&mut src), Ok(None));
            assert!(!parser.is_idle());
        }

        src.extend_from_slice(b"\n");
        assert_eq!(
            parser.next_command(&mut src),
            Ok(Some(vec![bulk("SET"), bulk("mykey"), bulk("myvalue")]))
        );
        assert!(src.is_empty());
    }

    #[test]
    fn pending_errors_at_end_of_stream() {
        let mut parser = Parser::new();
        assert_eq!(parser.pending_error(b""), None);

        let mut src = BytesMut::from("*1\r\n");
        assert_eq!(parser.next_command(&mut src), Ok(None));
        assert_eq!(
            parser.pending_error(&src),
            Some(ProtocolError::IncompleteArray)
        );

        src.extend_from_slice(b"$5\r\nabc");
        assert_eq!(parser.next_command(&mut src), Ok(None));
        assert_eq!(
            parser.pending_error(&src),
            Some(ProtocolError::MissingBulkData)
        );

        let mut parser = Parser::new();
        let mut src = BytesMut::from("PING");
        assert_eq!(parser.next_command(&mut src), Ok(None));
        assert_eq!(parser.pending_error(&src), Some(ProtocolError::NoCrlf));
    }
}
