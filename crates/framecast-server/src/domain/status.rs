//! Status query result and the producer state machine.

use serde::{Deserialize, Serialize};

/// Steady states of the frame stream.
///
/// `Idle` covers both "never started" (capture source could not be opened)
/// and "stopped".  There is no transition from a terminated producer back to
/// `Streaming` short of restarting the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Idle,
    Streaming,
}

/// Body of the `GET /status` response.
///
/// ```json
/// {"status":"running","clients":3,"stream":"streaming"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Always `"running"` while the server answers queries.
    pub status: String,
    /// Number of registered viewer connections.
    pub clients: usize,
    /// Whether the producer is currently ticking.
    pub stream: StreamState,
}

impl StatusReport {
    pub fn running(clients: usize, stream: StreamState) -> Self {
        Self {
            status: "running".to_string(),
            clients,
            stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_report_json_shape() {
        let json = serde_json::to_value(StatusReport::running(3, StreamState::Streaming)).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["clients"], 3);
        assert_eq!(json["stream"], "streaming");
    }

    #[test]
    fn test_clients_is_a_number_not_a_string() {
        let json = serde_json::to_string(&StatusReport::running(0, StreamState::Idle)).unwrap();
        assert!(json.contains("\"clients\":0"));
    }

    #[test]
    fn test_status_report_parses_back() {
        let parsed: StatusReport =
            serde_json::from_str(r#"{"status":"running","clients":7,"stream":"idle"}"#).unwrap();
        assert_eq!(parsed, StatusReport::running(7, StreamState::Idle));
    }
}
