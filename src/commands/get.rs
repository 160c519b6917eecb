use tracing::debug;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Storage;

/// Get the value of `key`. Missing keys fail the command, the store decides what counts as missing.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: &dyn Storage) -> Result<Frame, CommandError> {
        let value = store.get(&self.key).map_err(|err| {
            debug!(key = %self.key, %err, "GET failed");
            err
        })?;

        Ok(Frame::Bulk(value))
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_key()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
