use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Storage;

/// `COMMAND` and `COMMAND DOCS`. Interactive clients send these when connecting, an empty reply
/// tells them no command metadata is available.
#[derive(Debug, PartialEq)]
pub struct Command;

impl Executable for Command {
    fn exec(self, _store: &dyn Storage) -> Result<Frame, CommandError> {
        Ok(Frame::Array(vec![]))
    }
}

impl TryFrom<&mut CommandParser> for Command {
    type Error = CommandError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::command_array;
    use crate::commands::Dispatcher;
    use crate::store::Store;

    #[test]
    fn docs() {
        let store = Store::new();

        for cmd in [
            &["COMMAND"][..],
            &["command", "docs"][..],
            &["COMMAND", "DOCS", "GET"][..],
        ] {
            let res = Dispatcher::new().dispatch(command_array(cmd), &store);
            assert_eq!(res.unwrap().serialize(), b"*0\r\n");
        }
    }
}
