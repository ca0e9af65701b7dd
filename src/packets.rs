use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Millis;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum EventType {
    #[serde(rename = "moveCharacter")]
    MoveCharacter,
    #[serde(rename = "joinCharacter")]
    JoinCharacter,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::MoveCharacter => "moveCharacter",
            EventType::JoinCharacter => "joinCharacter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeader {
    pub request_id: String,     // Correlation token the server should echo
    pub client_send_ms: Millis, // Wall clock at send time, in milliseconds
    pub event_type: EventType,  // Selects the body shape
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub rotation_z: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub character_id: u32,
    pub character_name: String,
    pub character_class: String,
    pub character_level: u32,
    pub current_health: u32,
    pub max_health: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveCharacterBody {
    pub client_id: u32,
    pub character_id: u32,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinCharacterBody {
    pub client_id: u32,
    pub character_id: u32,
    pub character: Character,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestBody {
    Join(JoinCharacterBody),
    Move(MoveCharacterBody),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestEnvelope {
    pub header: RequestHeader,
    pub body: RequestBody,
}

impl MoveCharacterBody {
    /// Fixed position update sent by the moveCharacter probe.
    pub fn sample() -> Self {
        MoveCharacterBody {
            client_id: 1,
            character_id: 1,
            position: Position {
                position_x: 100.5,
                position_y: 200.3,
                position_z: 0.0,
                rotation_z: 45.0,
            },
        }
    }
}

impl JoinCharacterBody {
    /// Fixed level 5 warrior spawned at the origin.
    pub fn sample() -> Self {
        JoinCharacterBody {
            client_id: 1,
            character_id: 1,
            character: Character {
                character_id: 1,
                character_name: "TestPlayer".to_string(),
                character_class: "Warrior".to_string(),
                character_level: 5,
                current_health: 100,
                max_health: 100,
            },
            position: Position {
                position_x: 0.0,
                position_y: 0.0,
                position_z: 0.0,
                rotation_z: 0.0,
            },
        }
    }
}

impl RequestEnvelope {
    pub fn new(request_id: String, client_send_ms: Millis, body: RequestBody) -> Self {
        let event_type = match body {
            RequestBody::Move(_) => EventType::MoveCharacter,
            RequestBody::Join(_) => EventType::JoinCharacter,
        };

        RequestEnvelope {
            header: RequestHeader {
                request_id,
                client_send_ms,
                event_type,
            },
            body,
        }
    }

    /// Serializes the envelope as a single newline-terminated JSON line.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Lines printed once the envelope is on the wire. Only moveCharacter
    /// reports its send time here, the join report has no timing section.
    pub fn sent_summary(&self) -> String {
        let header = &self.header;
        let sent = format!(
            "Sent {} with requestId: {}",
            header.event_type.as_str(),
            header.request_id
        );
        match header.event_type {
            EventType::MoveCharacter => {
                format!("{}\nClient send time: {}", sent, header.client_send_ms)
            }
            EventType::JoinCharacter => sent,
        }
    }
}

/// Values the server is expected to copy back or add to its reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EchoFields {
    pub request_id: Option<String>,
    pub server_recv_ms: Option<Millis>,
    pub server_send_ms: Option<Millis>,
    pub client_send_ms: Option<Millis>,
}

/// Whatever JSON the server answered with. Nothing about its shape is assumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope(pub Value);

impl ResponseEnvelope {
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes).context("response is not valid UTF-8")?;
        let value = serde_json::from_str(text.trim_end()).context("parsing response JSON")?;
        Ok(ResponseEnvelope(value))
    }

    pub fn echo_fields(&self) -> EchoFields {
        EchoFields {
            request_id: self
                .lookup("requestIdEcho", |v| v.as_str().map(str::to_string)),
            server_recv_ms: self.lookup("serverRecvMs", as_millis),
            server_send_ms: self.lookup("serverSendMs", as_millis),
            client_send_ms: self.lookup("clientSendMsEcho", as_millis),
        }
    }

    // Header wins, body is the fallback.
    fn lookup<T>(&self, key: &str, convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
        ["header", "body"]
            .iter()
            .filter_map(|section| self.0.get(*section)?.get(key))
            .find_map(convert)
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

// Floats count only when they hold a whole number inside the i64 range.
fn as_millis(value: &Value) -> Option<Millis> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|ms| {
                ms.fract() == 0.0 && *ms >= Millis::MIN as f64 && *ms < Millis::MAX as f64
            })
            .map(|ms| ms as Millis)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn move_envelope_wire_shape() {
        let envelope = RequestEnvelope::new(
            "sync_1_123_1_ABCDEF01".to_string(),
            1_700_000_000_000,
            RequestBody::Move(MoveCharacterBody::sample()),
        );

        let bytes = envelope.to_bytes().unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(bytes.iter().filter(|b| **b == b'\n').count(), 1);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({
                "header": {
                    "requestId": "sync_1_123_1_ABCDEF01",
                    "clientSendMs": 1_700_000_000_000i64,
                    "eventType": "moveCharacter"
                },
                "body": {
                    "clientId": 1,
                    "characterId": 1,
                    "position": {
                        "positionX": 100.5,
                        "positionY": 200.3,
                        "positionZ": 0.0,
                        "rotationZ": 45.0
                    }
                }
            })
        );
    }

    #[test]
    fn join_envelope_carries_character() {
        let envelope = RequestEnvelope::new(
            "id".to_string(),
            42,
            RequestBody::Join(JoinCharacterBody::sample()),
        );
        assert_eq!(envelope.header.event_type, EventType::JoinCharacter);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["header"]["eventType"], "joinCharacter");
        assert_eq!(value["body"]["character"]["characterName"], "TestPlayer");
        assert_eq!(value["body"]["character"]["characterClass"], "Warrior");
        assert_eq!(value["body"]["character"]["maxHealth"], 100);
        assert_eq!(value["body"]["position"]["rotationZ"], 0.0);
    }

    #[test]
    fn echo_fields_prefer_header_then_body() {
        let response = ResponseEnvelope(json!({
            "header": { "requestIdEcho": "from-header", "serverRecvMs": null },
            "body": {
                "requestIdEcho": "from-body",
                "serverRecvMs": 10,
                "serverSendMs": 12.0,
            }
        }));

        let echo = response.echo_fields();
        assert_eq!(echo.request_id.as_deref(), Some("from-header"));
        assert_eq!(echo.server_recv_ms, Some(10));
        assert_eq!(echo.server_send_ms, Some(12));
        assert_eq!(echo.client_send_ms, None);
    }

    #[test]
    fn fractional_or_huge_timestamps_are_not_millis() {
        let response = ResponseEnvelope(json!({
            "header": {
                "clientSendMsEcho": 1000.5,
                "serverRecvMs": 1e300,
                "serverSendMs": -1e300,
            },
            "body": { "clientSendMsEcho": 1000 }
        }));

        let echo = response.echo_fields();
        assert_eq!(echo.client_send_ms, Some(1000));
        assert_eq!(echo.server_recv_ms, None);
        assert_eq!(echo.server_send_ms, None);

        let response = ResponseEnvelope(json!({ "header": { "clientSendMsEcho": 1000.5 } }));
        assert_eq!(response.echo_fields().client_send_ms, None);
    }

    #[test]
    fn sent_summary_has_send_time_for_move_only() {
        let moved = RequestEnvelope::new(
            "sync_a".to_string(),
            77,
            RequestBody::Move(MoveCharacterBody::sample()),
        );
        assert_eq!(
            moved.sent_summary(),
            "Sent moveCharacter with requestId: sync_a\nClient send time: 77"
        );

        let joined = RequestEnvelope::new(
            "sync_b".to_string(),
            77,
            RequestBody::Join(JoinCharacterBody::sample()),
        );
        assert_eq!(joined.sent_summary(), "Sent joinCharacter with requestId: sync_b");
    }

    #[test]
    fn echo_fields_absent_for_non_object_response() {
        let response = ResponseEnvelope(json!([1, 2, 3]));
        assert_eq!(response.echo_fields(), EchoFields::default());
    }

    #[test]
    fn from_bytes_strips_trailing_newline() {
        let response = ResponseEnvelope::from_bytes(b"{\"header\":{}}\r\n").unwrap();
        assert_eq!(response.0, json!({ "header": {} }));
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = ResponseEnvelope::from_bytes(b"not json").unwrap_err();
        assert!(format!("{err:#}").contains("parsing response JSON"));

        let err = ResponseEnvelope::from_bytes(&[0xff, 0xfe]).unwrap_err();
        assert!(format!("{err:#}").contains("not valid UTF-8"));
    }
}
