use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tracing::{debug, error, info, instrument, warn};

use crate::codec::{CommandCodec, DecodeError, Limits};
use crate::commands::Dispatcher;
use crate::config::Config;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.bind.as_str(), config.port)).await?;

    tokio::select! {
        res = serve(listener, Store::new(), config.limits()) => res,
        _ = signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Accepts clients on `listener` until it fails, each one served by its own task.
pub async fn serve(listener: TcpListener, store: Store, limits: Limits) -> Result<(), Error> {
    let dispatcher = Arc::new(Dispatcher::new());

    info!("Redis server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {:?}", client_address);

        let dispatcher = dispatcher.clone();
        let store = store.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, client_address, dispatcher, store, limits).await
            {
                error!("Connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, client_address, dispatcher, store, limits),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    store: Store,
    limits: Limits,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address, CommandCodec::new(limits));

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let command = match conn.read_command().await {
            Ok(Some(command)) => command,
            Ok(None) => break,
            Err(DecodeError::Protocol(err)) => {
                // The position in the stream can't be trusted anymore, report and hang up.
                warn!("Protocol error: {}", err);
                conn.write_frame(Frame::Error(err.to_string())).await?;
                break;
            }
            Err(DecodeError::Io(err)) => return Err(err.into()),
        };

        debug!("Received command from client: {:?}", command);

        let res = dispatcher
            .dispatch(command, &store)
            .unwrap_or_else(|err| Frame::Error(err.to_string()));

        debug!("Sending response to client: {}", res);
        conn.write_frame(res).await?;
    }

    info!("Connection closed");
    Ok(())
}
