use crate::commands::echo::Echo;
use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Storage;

/// Returns PONG if no argument is provided, otherwise behaves like ECHO.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping {
    pub echo: Option<Echo>,
}

impl Executable for Ping {
    fn exec(self, store: &dyn Storage) -> Result<Frame, CommandError> {
        match self.echo {
            Some(echo) => echo.exec(store),
            None => Ok(Frame::Simple("PONG".to_string())),
        }
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let echo = match parser.remaining() {
            0 => None,
            _ => Some(Echo::try_from(parser)?),
        };

        Ok(Self { echo })
    }
}
