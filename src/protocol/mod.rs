//! Wire protocol between the telemetry server and dashboard clients.
//!
//! Every message is a JSON object tagged by `type`. The enums below close
//! over the known event names; the `Unknown` arms keep either side forward
//! compatible with names this build does not recognize.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::alarm::{AlarmId, AlarmRecord};
use crate::domain::telemetry::{
    DeviceStatus, GridUpdate, RegionLoad, RenewableUpdate, Topology,
};

/// Server -> client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Periodic grid load sample.
    Update(GridUpdate),

    /// A newly raised alarm, always with `handled: false`.
    Alarm(AlarmRecord),

    /// Full ledger snapshot, newest first. Unicast reply to
    /// [`ClientRequest::RequestAlarmHistory`].
    AlarmHistory { alarms: Vec<AlarmRecord> },

    /// An alarm some client acknowledged; broadcast to every observer.
    AlarmUpdated(AlarmRecord),

    /// Device fleet connectivity.
    DeviceStatus(DeviceStatus),

    /// Renewable generation sample.
    RenewableUpdate(RenewableUpdate),

    /// Regional table for a requested year.
    YearData { year: String, data: Vec<RegionLoad> },

    /// The requested year has no table.
    YearDataError { year: String, message: String },

    /// Network topology snapshot.
    TopologyData(Topology),

    /// Incremental topology change.
    TopologyUpdate(Topology),

    /// Escape hatch for event names this build does not know about.
    #[serde(untagged)]
    Unknown(Value),
}

impl ServerEvent {
    /// The wire-level event name, used as the subscription key.
    pub fn name(&self) -> &str {
        match self {
            ServerEvent::Update(_) => "update",
            ServerEvent::Alarm(_) => "alarm",
            ServerEvent::AlarmHistory { .. } => "alarm_history",
            ServerEvent::AlarmUpdated(_) => "alarm_updated",
            ServerEvent::DeviceStatus(_) => "device_status",
            ServerEvent::RenewableUpdate(_) => "renewable_update",
            ServerEvent::YearData { .. } => "year_data",
            ServerEvent::YearDataError { .. } => "year_data_error",
            ServerEvent::TopologyData(_) => "topology_data",
            ServerEvent::TopologyUpdate(_) => "topology_update",
            ServerEvent::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

/// Client -> server requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Ask for the full alarm ledger snapshot (unicast reply).
    RequestAlarmHistory,

    /// Acknowledge an alarm; the updated record is broadcast to everyone.
    HandleAlarm { id: AlarmId },

    /// Ask for one year's regional table (unicast reply).
    RequestYearData { year: String },

    /// Ask for the network topology (unicast reply).
    RequestTopologyData,

    /// Escape hatch for request names this build does not know about.
    #[serde(untagged)]
    Unknown(Value),
}

impl ClientRequest {
    /// The wire-level request name.
    pub fn name(&self) -> &str {
        match self {
            ClientRequest::RequestAlarmHistory => "request_alarm_history",
            ClientRequest::HandleAlarm { .. } => "handle_alarm",
            ClientRequest::RequestYearData { .. } => "request_year_data",
            ClientRequest::RequestTopologyData => "request_topology_data",
            ClientRequest::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alarm::{AlarmKind, Severity};
    use crate::domain::foundation::Timestamp;
    use crate::domain::telemetry::GridStatus;
    use serde_json::json;

    fn sample_alarm() -> AlarmRecord {
        AlarmRecord {
            id: AlarmId::from_millis(1_700_000_000_000),
            kind: AlarmKind::LoadExceed,
            message: "load 4800 MW exceeds threshold 4500 MW".to_string(),
            severity: Severity::High,
            timestamp: Timestamp::from_unix_millis(1_700_000_000_000).unwrap(),
            handled: false,
        }
    }

    #[test]
    fn update_serializes_with_type_tag() {
        let event = ServerEvent::Update(GridUpdate {
            timestamp: Timestamp::from_unix_millis(1_700_000_000_000).unwrap(),
            load: 3100,
            status: GridStatus::Normal,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["load"], 3100);
        assert_eq!(json["status"], "normal");
    }

    #[test]
    fn alarm_round_trips() {
        let event = ServerEvent::Alarm(sample_alarm());
        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains(r#""type":"alarm""#));
        assert!(text.contains(r#""kind":"load_exceed""#));
        let back: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn alarm_history_wraps_snapshot_array() {
        let event = ServerEvent::AlarmHistory {
            alarms: vec![sample_alarm()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "alarm_history");
        assert_eq!(json["alarms"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn unknown_server_event_falls_through() {
        let text = r#"{"type":"weather_update","wind_speed":12}"#;
        let event: ServerEvent = serde_json::from_str(text).unwrap();
        assert!(matches!(event, ServerEvent::Unknown(_)));
        assert_eq!(event.name(), "weather_update");
    }

    #[test]
    fn unit_request_serializes_as_bare_tag() {
        let text = serde_json::to_string(&ClientRequest::RequestAlarmHistory).unwrap();
        assert_eq!(text, r#"{"type":"request_alarm_history"}"#);
    }

    #[test]
    fn handle_alarm_round_trips() {
        let request = ClientRequest::HandleAlarm {
            id: AlarmId::from_millis(42),
        };
        let text = serde_json::to_string(&request).unwrap();
        let back: ClientRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn request_year_data_deserializes() {
        let request: ClientRequest =
            serde_json::from_str(r#"{"type":"request_year_data","year":"2023"}"#).unwrap();
        assert_eq!(
            request,
            ClientRequest::RequestYearData {
                year: "2023".to_string()
            }
        );
    }

    #[test]
    fn unknown_request_keeps_payload() {
        let request: ClientRequest =
            serde_json::from_str(r#"{"type":"request_forecast","horizon":7}"#).unwrap();
        match &request {
            ClientRequest::Unknown(value) => assert_eq!(value["horizon"], json!(7)),
            other => panic!("expected Unknown, got {other:?}"),
        }
        assert_eq!(request.name(), "request_forecast");
    }

    #[test]
    fn event_names_match_wire_contract() {
        let event = ServerEvent::AlarmHistory { alarms: vec![] };
        assert_eq!(event.name(), "alarm_history");
        assert_eq!(
            ServerEvent::AlarmUpdated(sample_alarm()).name(),
            "alarm_updated"
        );
        assert_eq!(ClientRequest::RequestTopologyData.name(), "request_topology_data");
    }
}
