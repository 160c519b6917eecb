use std::str;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Storage;

/// Removes the given keys, returning how many of them existed.
///
/// Ref: <https://redis.io/commands/del>
#[derive(Debug, PartialEq)]
pub struct Del {
    // Null and non UTF-8 keys can never exist, they are kept as `None` and counted as absent.
    pub keys: Vec<Option<String>>,
}

impl Executable for Del {
    fn exec(self, store: &dyn Storage) -> Result<Frame, CommandError> {
        let mut count = 0;
        for key in self.keys.iter().flatten() {
            if store.delete(key)? {
                count += 1;
            }
        }
        Ok(Frame::Integer(count))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() == 0 {
            return Err(CommandError::WrongArity);
        }

        let mut keys = Vec::with_capacity(parser.remaining());
        while parser.remaining() > 0 {
            let key = parser
                .next_bytes()?
                .and_then(|bytes| str::from_utf8(&bytes).ok().map(|key| key.to_string()));
            keys.push(key);
        }

        Ok(Self { keys })
    }
}
