//! RPC front end: persistent TCP connections, one task per connection

use anyhow::Result;
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use ttlkv::protocol::{Method, RpcFrame, RpcReplyFrame};

use crate::frame::{self, FrameDecoder, FrameError};
use crate::handler::CommandHandler;

/// Pause after a failed `accept`, e.g. when the process is out of descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept connections until `shutdown` fires
pub async fn serve(
    listener: TcpListener,
    handler: CommandHandler,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!(peer = %addr, "New RPC connection");
                    let handler = handler.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, handler).await {
                            error!(peer = %addr, "Error handling RPC client: {}", e);
                        }
                        info!(peer = %addr, "RPC connection closed");
                    });
                }
                Err(e) => accept_failed(&e).await,
            },
            _ = shutdown.recv() => {
                info!("RPC listener shutting down");
                return;
            }
        }
    }
}

async fn accept_failed(e: &std::io::Error) {
    error!("Error accepting RPC connection: {}", e);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

async fn handle_client(mut stream: TcpStream, handler: CommandHandler) -> Result<()> {
    let mut buffer = BytesMut::with_capacity(4096);
    let mut decoder = FrameDecoder::new();

    loop {
        let n = stream.read_buf(&mut buffer).await?;

        if n == 0 {
            return Ok(());
        }

        loop {
            match decoder.decode(&mut buffer) {
                Ok(Some(call)) => {
                    let reply = dispatch(&handler, call);
                    stream.write_all(&frame::encode(&reply)?).await?;
                }
                Ok(None) => break,
                Err(FrameError::Malformed { id, message }) => {
                    warn!("Malformed RPC frame: {}", message);
                    let reply = RpcReplyFrame::transport_error(
                        id,
                        format!("malformed frame: {}", message),
                    );
                    stream.write_all(&frame::encode(&reply)?).await?;
                }
                Err(e @ FrameError::TooLarge(_)) => {
                    warn!("{}", e);
                    let reply = RpcReplyFrame::transport_error(None, e.to_string());
                    stream.write_all(&frame::encode(&reply)?).await?;
                    return Ok(());
                }
            }
        }
    }
}

/// Run one decoded call against the store
fn dispatch(handler: &CommandHandler, call: RpcFrame) -> RpcReplyFrame {
    match call.method.parse::<Method>() {
        Ok(method) => RpcReplyFrame::result(call.id, handler.handle(method, call.params)),
        Err(e) => {
            warn!(method = %call.method, "Unknown RPC method");
            RpcReplyFrame::transport_error(Some(call.id), e.to_string())
        }
    }
}
