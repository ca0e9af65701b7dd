use std::time::{SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};

use crate::types::Millis;

pub fn now_ms() -> Millis {
    millis_since_epoch(SystemTime::now())
}

fn millis_since_epoch(at: SystemTime) -> Millis {
    at.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as Millis)
        .unwrap_or_default()
}

/// Builds `sync_<timestampMs>_<sessionId>_<sequence>_<hash8>` from the current time.
///
/// The sequence is just the wall clock seconds modulo 10000, so two ids taken
/// in the same millisecond for the same session are identical.
pub fn generate_request_id(session_id: u64) -> String {
    request_id_at(SystemTime::now(), session_id)
}

pub fn request_id_at(at: SystemTime, session_id: u64) -> String {
    let timestamp = millis_since_epoch(at);
    let sequence = (timestamp / 1000) % 10000;
    let seed = format!("{}_{}_{}", timestamp, session_id, sequence);
    let digest = hex::encode_upper(Md5::digest(seed.as_bytes()));

    format!("sync_{}_{}_{}_{}", timestamp, session_id, sequence, &digest[..8])
}
