pub mod command;
pub mod del;
pub mod echo;
pub mod executable;
pub mod get;
pub mod ping;
pub mod set;

use bytes::Bytes;
use std::collections::HashMap;
use std::{str, vec};
use thiserror::Error as ThisError;
use tracing::warn;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::resp::CommandArray;
use crate::store::{Storage, StoreError};

use command::Command;
use del::Del;
use echo::Echo;
use get::Get;
use ping::Ping;
use set::Set;

/// Runs a command, given the arguments left after its name.
pub type Handler = fn(&mut CommandParser, &dyn Storage) -> Result<Frame, CommandError>;

/// A failed command. These are reported to the client and the connection stays open.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("ERR empty command")]
    Empty,
    #[error("ERR invalid command")]
    Invalid,
    #[error("ERR wrong number of arguments")]
    WrongArity,
    #[error("ERR command failed")]
    Failed(#[from] StoreError),
}

#[derive(Default)]
struct Node {
    handler: Option<Handler>,
    children: HashMap<String, Node>,
}

/// Routes command arrays to handlers.
///
/// Command names are registered as word paths (`["CONFIG", "GET"]`) in a trie. Dispatch walks the
/// trie with the leading elements of a command array for as long as they match, and passes the rest
/// to the handler of the node it stopped at. The trie is built once and only read afterwards, so a
/// single dispatcher can be shared by every connection.
pub struct Dispatcher {
    root: Node,
}

impl Dispatcher {
    /// A dispatcher with the built-in commands registered.
    pub fn new() -> Dispatcher {
        let mut dispatcher = Dispatcher::empty();

        dispatcher
            .register(&["PING"], run::<Ping>)
            .register(&["ECHO"], run::<Echo>)
            .register(&["GET"], run::<Get>)
            .register(&["SET"], run::<Set>)
            .register(&["DEL"], run::<Del>)
            .register(&["COMMAND"], run::<Command>)
            .register(&["COMMAND", "DOCS"], run::<Command>);

        dispatcher
    }

    pub fn empty() -> Dispatcher {
        Dispatcher {
            root: Node::default(),
        }
    }

    /// Attaches `handler` to the node reached by `path`. Words are matched case-insensitively.
    pub fn register(&mut self, path: &[&str], handler: Handler) -> &mut Dispatcher {
        let node = path.iter().fold(&mut self.root, |node, word| {
            node.children.entry(word.to_uppercase()).or_default()
        });
        node.handler = Some(handler);
        self
    }

    pub fn dispatch(
        &self,
        mut command: CommandArray,
        store: &dyn Storage,
    ) -> Result<Frame, CommandError> {
        if command.is_empty() {
            return Err(CommandError::Empty);
        }

        let mut node = &self.root;
        let mut consumed = 0;

        // Every element up to and including the first one that matches no child must be text.
        for part in &command {
            let Some(part) = part else {
                break;
            };

            let word = str::from_utf8(part)
                .map_err(|_| CommandError::Invalid)?
                .to_uppercase();

            match node.children.get(&word) {
                Some(child) => {
                    node = child;
                    consumed += 1;
                }
                None => break,
            }
        }

        let Some(handler) = node.handler else {
            warn!(command = ?command, "invalid command");
            return Err(CommandError::Invalid);
        };

        let args = command.split_off(consumed);
        handler(&mut CommandParser::new(args), store)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn run<C>(parser: &mut CommandParser, store: &dyn Storage) -> Result<Frame, CommandError>
where
    C: Executable + for<'a> TryFrom<&'a mut CommandParser, Error = CommandError>,
{
    C::try_from(parser)?.exec(store)
}

/// Cursor over the arguments of a command.
pub struct CommandParser {
    parts: vec::IntoIter<Option<Bytes>>,
}

impl CommandParser {
    pub fn new(args: CommandArray) -> CommandParser {
        CommandParser {
            parts: args.into_iter(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.parts.len()
    }

    /// The next argument as it was sent, `None` being a null bulk string.
    pub fn next_bytes(&mut self) -> Result<Option<Bytes>, CommandError> {
        self.parts.next().ok_or(CommandError::WrongArity)
    }

    /// The next argument as a value to store. Null values cannot be stored.
    pub fn next_value(&mut self) -> Result<Bytes, CommandError> {
        self.next_bytes()?
            .ok_or(CommandError::Failed(StoreError::NotFound))
    }

    /// The next argument as a key. Keys are text, null or non UTF-8 keys never exist.
    pub fn next_key(&mut self) -> Result<String, CommandError> {
        let bytes = self.next_value()?;

        str::from_utf8(&bytes)
            .map(|key| key.to_string())
            .map_err(|_| CommandError::Failed(StoreError::NotFound))
    }

    /// Checks that every argument has been consumed.
    pub fn finish(&self) -> Result<(), CommandError> {
        match self.remaining() {
            0 => Ok(()),
            _ => Err(CommandError::WrongArity),
        }
    }
}
