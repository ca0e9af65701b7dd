use std::time::Duration;

use lagprobe::{application::ProbeClient, types::ProbeConfig};
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
};

/// Accepts a single connection, reads one request line and writes back
/// whatever `respond` produces for it.
pub async fn spawn_stub<F>(respond: F) -> String
where
    F: FnOnce(Value) -> Vec<u8> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = socket.split();

        let mut line = String::new();
        BufReader::new(reader).read_line(&mut line).await.unwrap();
        let request: Value = serde_json::from_str(&line).unwrap();

        writer.write_all(&respond(request)).await.unwrap();
    });

    address
}

/// Accepts a connection, swallows the request and never answers.
pub async fn spawn_silent_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut line = String::new();
        BufReader::new(&mut socket).read_line(&mut line).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3600)).await;
        drop(socket);
    });

    address
}

pub fn probe(address: String) -> ProbeClient {
    ProbeClient::new(ProbeConfig {
        address,
        ..ProbeConfig::default()
    })
}

pub fn line(value: Value) -> Vec<u8> {
    let mut bytes = serde_json::to_vec(&value).unwrap();
    bytes.push(b'\n');
    bytes
}
