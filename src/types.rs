/// Address of the chunk server the probe talks to.
pub const DEFAULT_ADDRESS: &str = "localhost:27017";

/// Session id baked into generated request ids.
pub const DEFAULT_SESSION_ID: u64 = 123;

/// Upper bound of the single read that is expected to hold the whole reply.
pub const RESPONSE_BUFFER_SIZE: usize = 4096;

/// Milliseconds since the Unix epoch, as exchanged on the wire.
pub type Millis = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub address: String,
    pub session_id: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            address: DEFAULT_ADDRESS.to_string(),
            session_id: DEFAULT_SESSION_ID,
        }
    }
}
