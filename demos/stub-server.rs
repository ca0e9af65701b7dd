use std::time::Duration;

use lagprobe::{application::util::now_ms, types::DEFAULT_ADDRESS};
use serde_json::{json, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

/// Stands in for the chunk server: answers every envelope with the echo
/// fields and its own receive/send timestamps.
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // If RUST_LOG is not set to a specific level, set the default log level to INFO
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let listener = TcpListener::bind(DEFAULT_ADDRESS).await?;
    log::info!("Stub server listening on {}", listener.local_addr()?);

    loop {
        let (socket, addr) = listener.accept().await?;
        log::info!("Client connected: {:?}", addr);

        tokio::spawn(async move {
            if let Err(err) = answer(socket).await {
                log::error!("Client {:?} failed: {:#}", addr, err);
            }
        });
    }
}

async fn answer(socket: TcpStream) -> Result<(), anyhow::Error> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let server_recv_ms = now_ms();
        let request: Value = serde_json::from_str(&line)?;
        log::trace!("Received: {}", request);

        // Pretend to do some work so the processing interval is visible
        let processing = rand::random::<u8>() % 20;
        tokio::time::sleep(Duration::from_millis(processing as u64)).await;

        let header = &request["header"];
        let response = json!({
            "header": {
                "eventType": header["eventType"],
                "requestIdEcho": header["requestId"],
                "clientSendMsEcho": header["clientSendMs"],
                "serverRecvMs": server_recv_ms,
                "serverSendMs": now_ms(),
            },
            "body": { "status": "ok" }
        });

        let mut bytes = serde_json::to_vec(&response)?;
        bytes.push(b'\n');
        writer.write_all(&bytes).await?;
    }

    Ok(())
}
