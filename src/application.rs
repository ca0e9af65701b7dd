use anyhow::Context;
use log::{debug, trace};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::{
    application::util::{generate_request_id, now_ms},
    packets::{RequestBody, RequestEnvelope, ResponseEnvelope},
    report::Exchange,
    types::{ProbeConfig, RESPONSE_BUFFER_SIZE},
};

pub mod scenarios;
pub mod util;

/// One-shot client that sends a single envelope per connection and reads
/// back whatever the server answers.
#[derive(Debug, Clone, Default)]
pub struct ProbeClient {
    config: ProbeConfig,
}

impl ProbeClient {
    pub fn new(config: ProbeConfig) -> Self {
        trace!(
            "Creating probe client for {} with session_id: {}",
            config.address,
            config.session_id
        );
        ProbeClient { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Opens a connection, writes one envelope and performs exactly one read.
    ///
    /// There is no timeout and no reassembly: a silent server blocks this call
    /// forever, and a reply larger than the buffer or split across segments
    /// fails to parse. The socket is closed when this returns.
    pub async fn exchange(&self, body: RequestBody) -> anyhow::Result<Exchange> {
        let address = &self.config.address;
        let mut socket = TcpStream::connect(address)
            .await
            .with_context(|| format!("connecting to {}", address))?;
        println!("Connected to chunk server at {}", address);

        let request_id = generate_request_id(self.config.session_id);
        let client_send_ms = now_ms();
        let envelope = RequestEnvelope::new(request_id.clone(), client_send_ms, body);
        let event_type = envelope.header.event_type.as_str();

        let packet = envelope.to_bytes().context("serializing request")?;
        debug!("Sending {}: {}", event_type, String::from_utf8_lossy(&packet).trim_end());
        socket
            .write_all(&packet)
            .await
            .with_context(|| format!("sending {}", event_type))?;
        println!("{}", envelope.sent_summary());

        let mut buffer = vec![0u8; RESPONSE_BUFFER_SIZE];
        let read = socket.read(&mut buffer).await.context("reading response")?;
        let client_recv_ms = now_ms();
        trace!("Received {} bytes from {}", read, address);

        let response = ResponseEnvelope::from_bytes(&buffer[..read])?;

        Ok(Exchange::new(
            request_id,
            client_send_ms,
            client_recv_ms,
            response,
        ))
    }
}
