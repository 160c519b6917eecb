use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Storage;

/// Set `key` to hold `value`, overwriting any previous value.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Set {
    fn exec(self, store: &dyn Storage) -> Result<Frame, CommandError> {
        store.set(self.key, self.value)?;

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 2 {
            return Err(CommandError::WrongArity);
        }

        let key = parser.next_key()?;
        let value = parser.next_value()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{command_array, BrokenStore};
    use crate::commands::Dispatcher;
    use crate::store::{Store, StoreError};

    #[test]
    fn set_then_get() {
        let dispatcher = Dispatcher::new();
        let store = Store::new();

        let res = dispatcher.dispatch(command_array(&["SET", "foo", "bar"]), &store);
        assert_eq!(res.unwrap().serialize(), b"+OK\r\n");

        let res = dispatcher.dispatch(command_array(&["GET", "foo"]), &store);
        assert_eq!(res.unwrap().serialize(), b"$3\r\nbar\r\n");
    }

    #[test]
    fn overwrite() {
        let dispatcher = Dispatcher::new();
        let store = Store::new();

        dispatcher
            .dispatch(command_array(&["SET", "foo", "bar"]), &store)
            .unwrap();
        dispatcher
            .dispatch(command_array(&["SET", "foo", "baz"]), &store)
            .unwrap();

        assert_eq!(store.get("foo"), Ok(Bytes::from("baz")));
    }

    #[test]
    fn empty_value() {
        let store = Store::new();
        let cmd = vec![
            Some(Bytes::from("SET")),
            Some(Bytes::from("foo")),
            Some(Bytes::new()),
        ];

        assert!(Dispatcher::new().dispatch(cmd, &store).is_ok());
        assert_eq!(store.get("foo"), Ok(Bytes::new()));
    }

    #[test]
    fn store_failure() {
        let res = Dispatcher::new().dispatch(command_array(&["SET", "foo", "bar"]), &BrokenStore);

        assert_eq!(res, Err(CommandError::Failed(StoreError::Poisoned)));
    }

    #[test]
    fn wrong_number_of_arguments() {
        let store = Store::new();

        for cmd in [
            &["SET"][..],
            &["SET", "foo"][..],
            &["SET", "foo", "bar", "EX"][..],
        ] {
            assert_eq!(
                Dispatcher::new().dispatch(command_array(cmd), &store),
                Err(CommandError::WrongArity)
            );
        }
    }
}
