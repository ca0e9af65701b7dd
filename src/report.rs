//! What a probe observed, rendered the way it is printed to the operator.

use std::fmt;

use crate::{
    packets::{EchoFields, ResponseEnvelope},
    types::Millis,
};

/// Four intervals derived from the exchanged timestamps. No clock skew
/// correction, so any of them can come out negative. Held as `i128` so the
/// difference of any two server supplied `i64` values fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBreakdown {
    pub client_to_server_ms: i128,
    pub server_processing_ms: i128,
    pub server_to_client_ms: i128,
    pub round_trip_ms: i128,
}

impl LatencyBreakdown {
    pub fn compute(
        client_send_ms: Millis,
        server_recv_ms: Millis,
        server_send_ms: Millis,
        client_recv_ms: Millis,
    ) -> Self {
        let [client_send, server_recv, server_send, client_recv] =
            [client_send_ms, server_recv_ms, server_send_ms, client_recv_ms].map(i128::from);

        LatencyBreakdown {
            client_to_server_ms: server_recv - client_send,
            server_processing_ms: server_send - server_recv,
            server_to_client_ms: client_recv - server_send,
            round_trip_ms: client_recv - client_send,
        }
    }
}

impl fmt::Display for LatencyBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Client -> Server latency: {} ms", self.client_to_server_ms)?;
        writeln!(f, "Server processing time:   {} ms", self.server_processing_ms)?;
        writeln!(f, "Server -> Client latency: {} ms", self.server_to_client_ms)?;
        writeln!(f, "Total round trip time:    {} ms", self.round_trip_ms)
    }
}

/// A single request/response pair as seen from the client.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request_id: String,
    pub client_send_ms: Millis,
    pub client_recv_ms: Millis,
    pub response: ResponseEnvelope,
    pub echo: EchoFields,
}

impl Exchange {
    pub fn new(
        request_id: String,
        client_send_ms: Millis,
        client_recv_ms: Millis,
        response: ResponseEnvelope,
    ) -> Self {
        let echo = response.echo_fields();
        Exchange {
            request_id,
            client_send_ms,
            client_recv_ms,
            response,
            echo,
        }
    }

    pub fn request_id_matches(&self) -> bool {
        self.echo.request_id.as_deref() == Some(self.request_id.as_str())
    }

    pub fn timestamp_matches(&self) -> bool {
        self.echo.client_send_ms == Some(self.client_send_ms)
    }
}

#[derive(Debug, Clone)]
pub struct MoveReport(pub Exchange);

impl MoveReport {
    /// Only available when the server reported all three of its timestamps.
    pub fn latency(&self) -> Option<LatencyBreakdown> {
        let exchange = &self.0;
        let echo = &exchange.echo;
        match (echo.server_recv_ms, echo.server_send_ms, echo.client_send_ms) {
            (Some(server_recv_ms), Some(server_send_ms), Some(_)) => {
                Some(LatencyBreakdown::compute(
                    exchange.client_send_ms,
                    server_recv_ms,
                    server_send_ms,
                    exchange.client_recv_ms,
                ))
            }
            _ => None,
        }
    }
}

impl fmt::Display for MoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exchange = &self.0;
        let echo = &exchange.echo;

        writeln!(f, "Received response:")?;
        writeln!(f, "{}", exchange.response.pretty())?;
        writeln!(f)?;
        writeln!(f, "Lag compensation analysis:")?;
        writeln!(f, "Original requestId:     {}", exchange.request_id)?;
        writeln!(f, "Echoed requestId:       {}", or_none(&echo.request_id))?;
        writeln!(f, "RequestId match:        {}", exchange.request_id_matches())?;
        writeln!(f, "Client send time:       {}", exchange.client_send_ms)?;
        writeln!(f, "Server recv time:       {}", or_none(&echo.server_recv_ms))?;
        writeln!(f, "Server send time:       {}", or_none(&echo.server_send_ms))?;
        writeln!(f, "Client recv time:       {}", exchange.client_recv_ms)?;
        writeln!(f, "Client send echo:       {}", or_none(&echo.client_send_ms))?;

        match self.latency() {
            Some(latency) => {
                writeln!(f)?;
                writeln!(f, "Timing:")?;
                write!(f, "{}", latency)?;
                writeln!(f, "RequestId sync: {}", outcome(exchange.request_id_matches()))?;
                write!(f, "Timestamp sync: {}", outcome(exchange.timestamp_matches()))
            }
            None => write!(f, "Incomplete data for lag compensation analysis"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinReport(pub Exchange);

impl fmt::Display for JoinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exchange = &self.0;

        writeln!(f, "Received response:")?;
        writeln!(f, "{}", exchange.response.pretty())?;
        if exchange.request_id_matches() {
            write!(f, "RequestId echo: SUCCESS for joinCharacter")
        } else {
            write!(
                f,
                "RequestId echo: FAILURE, sent {}, received {}",
                exchange.request_id,
                or_none(&exchange.echo.request_id)
            )
        }
    }
}

fn or_none<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "SUCCESS"
    } else {
        "FAILURE"
    }
}
