//! Shared fixtures: both front ends over one store, on ephemeral ports

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use ttlkv::protocol::{Method, Reply, Request, RpcFrame, RpcReplyFrame};
use ttlkv::Store;
use ttlkvd::{http, rpc, CommandHandler};

pub struct Harness {
    pub store: Arc<Store>,
    pub rpc_addr: SocketAddr,
    pub http_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
}

impl Harness {
    pub async fn start() -> Self {
        let store = Arc::new(Store::new());
        let handler = CommandHandler::new(Arc::clone(&store));
        let (shutdown_tx, _) = broadcast::channel(1);

        let rpc_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let rpc_addr = rpc_listener.local_addr().unwrap();
        tokio::spawn(rpc::serve(
            rpc_listener,
            handler.clone(),
            shutdown_tx.subscribe(),
        ));

        let http_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let http_addr = http_listener.local_addr().unwrap();
        let http_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            http::serve(http_listener, handler, http_shutdown)
                .await
                .unwrap();
        });

        Self {
            store,
            rpc_addr,
            http_addr,
            shutdown_tx,
        }
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.http_addr, path)
    }

    pub async fn rpc_client(&self) -> RpcClient {
        RpcClient::connect(self.rpc_addr).await
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Minimal line-oriented RPC client
pub struct RpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_id: u64,
}

impl RpcClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, write) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer: write,
            next_id: 1,
        }
    }

    /// Send raw bytes as-is
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    /// Read one reply line; `None` on EOF
    pub async fn read_reply(&mut self) -> Option<RpcReplyFrame> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        if n == 0 {
            return None;
        }
        Some(serde_json::from_str(&line).unwrap())
    }

    pub async fn call(&mut self, method: Method, params: Request) -> Reply {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_vec(&RpcFrame::new(id, method, params)).unwrap();
        line.push(b'\n');
        self.send_raw(&line).await;

        let reply = self.read_reply().await.expect("connection closed");
        assert_eq!(reply.id, Some(id));
        assert!(reply.error.is_none(), "transport error: {:?}", reply.error);
        reply.result.unwrap()
    }

    pub async fn set(&mut self, key: &str, value: &str, ttl: i64) -> Reply {
        self.call(Method::Set, Request::set(key, value, ttl)).await
    }

    pub async fn get(&mut self, key: &str) -> Reply {
        self.call(Method::Get, Request::key(key)).await
    }

    pub async fn delete(&mut self, key: &str) -> Reply {
        self.call(Method::Delete, Request::key(key)).await
    }
}
