use futures::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{CommandCodec, DecodeError};
use crate::frame::Frame;
use crate::resp::CommandArray;

/// A client connection. Commands are read off the socket as they arrive and replies are written
/// back in order.
pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    // Socket reads are buffered by `Framed` until the codec can decode a full command.
    frames: Framed<TcpStream, CommandCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr, codec: CommandCodec) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            client_address,
            frames: Framed::new(stream, codec),
        }
    }

    /// Reads the next command, or `None` once the client closed the connection.
    pub async fn read_command(&mut self) -> Result<Option<CommandArray>, DecodeError> {
        self.frames.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), io::Error> {
        self.frames.send(frame).await
    }
}
