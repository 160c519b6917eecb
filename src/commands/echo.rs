use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Storage;

/// Returns `message` as a bulk string, byte for byte.
///
/// Ref: <https://redis.io/docs/latest/commands/echo>
#[derive(Debug, PartialEq)]
pub struct Echo {
    pub message: Option<Bytes>,
}

impl Executable for Echo {
    fn exec(self, _store: &dyn Storage) -> Result<Frame, CommandError> {
        Ok(self.message.map_or(Frame::Null, Frame::Bulk))
    }
}

impl TryFrom<&mut CommandParser> for Echo {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let message = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { message })
    }
}
