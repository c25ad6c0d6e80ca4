//! Server-side request router.
//!
//! One router instance serves every connected client. It owns the alarm
//! ledger behind an async mutex (single writer) and answers the four
//! client requests, deciding per reply whether it goes back to the asking
//! client only or to the whole room.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::domain::alarm::{AlarmKind, AlarmLedger, AlarmRecord, HandleOutcome, Severity};
use crate::domain::foundation::Timestamp;
use crate::domain::telemetry::{year_table, Topology};
use crate::protocol::{ClientRequest, ServerEvent};

/// How a reply should be delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterReply {
    /// Nothing to send.
    None,
    /// Send to the requesting client only.
    Unicast(ServerEvent),
    /// Fan out to every connected client.
    Broadcast(ServerEvent),
}

/// Spread applied to year-table values so repeated requests read like
/// live measurements.
const YEAR_JITTER: i64 = 100;

pub struct EventRouter {
    ledger: Mutex<AlarmLedger>,
    topology: Topology,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(AlarmLedger::default())
    }
}

impl EventRouter {
    pub fn new(ledger: AlarmLedger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            topology: Topology::reference_grid(),
        }
    }

    /// Routes one client request to its reply.
    pub async fn handle(&self, request: ClientRequest) -> RouterReply {
        match request {
            ClientRequest::RequestAlarmHistory => {
                let ledger = self.ledger.lock().await;
                RouterReply::Unicast(ServerEvent::AlarmHistory {
                    alarms: ledger.snapshot(),
                })
            }
            ClientRequest::HandleAlarm { id } => {
                let mut ledger = self.ledger.lock().await;
                match ledger.mark_handled(id) {
                    HandleOutcome::Updated(record) => {
                        tracing::info!(alarm = %record.id, "alarm acknowledged");
                        RouterReply::Broadcast(ServerEvent::AlarmUpdated(record))
                    }
                    HandleOutcome::AlreadyHandled => {
                        tracing::debug!(alarm = %id, "alarm already handled, ignoring");
                        RouterReply::None
                    }
                    HandleOutcome::NotFound => {
                        tracing::debug!(alarm = %id, "handle request for unknown alarm");
                        RouterReply::None
                    }
                }
            }
            ClientRequest::RequestYearData { year } => match year_table(&year) {
                Some(table) => {
                    let mut rng = StdRng::from_entropy();
                    let data = table
                        .into_iter()
                        .map(|mut region| {
                            region.value += rng.gen_range(-YEAR_JITTER..=YEAR_JITTER);
                            region
                        })
                        .collect();
                    RouterReply::Unicast(ServerEvent::YearData { year, data })
                }
                None => RouterReply::Unicast(ServerEvent::YearDataError {
                    message: format!("no data available for year {year}"),
                    year,
                }),
            },
            ClientRequest::RequestTopologyData => {
                RouterReply::Unicast(ServerEvent::TopologyData(self.topology.clone()))
            }
            ClientRequest::Unknown(payload) => {
                tracing::debug!(
                    request = %ClientRequest::Unknown(payload).name(),
                    "unrecognized client request, ignoring"
                );
                RouterReply::None
            }
        }
    }

    /// Records a new alarm and returns the event to broadcast.
    pub async fn raise_alarm(
        &self,
        kind: AlarmKind,
        message: String,
        severity: Severity,
    ) -> AlarmRecord {
        let mut ledger = self.ledger.lock().await;
        let record = ledger.raise(kind, message, severity, Timestamp::now());
        tracing::info!(alarm = %record.id, kind = ?record.kind, "alarm raised");
        record
    }

    /// Current ledger contents, newest first.
    pub async fn alarm_snapshot(&self) -> Vec<AlarmRecord> {
        self.ledger.lock().await.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_history_unicasts_an_empty_list() {
        let router = EventRouter::default();
        let reply = router.handle(ClientRequest::RequestAlarmHistory).await;
        assert_eq!(
            reply,
            RouterReply::Unicast(ServerEvent::AlarmHistory { alarms: vec![] })
        );
    }

    #[tokio::test]
    async fn raised_alarms_come_back_in_the_history() {
        let router = EventRouter::default();
        router
            .raise_alarm(AlarmKind::LoadExceed, "over threshold".into(), Severity::High)
            .await;
        let reply = router.handle(ClientRequest::RequestAlarmHistory).await;
        match reply {
            RouterReply::Unicast(ServerEvent::AlarmHistory { alarms }) => {
                assert_eq!(alarms.len(), 1);
                assert!(!alarms[0].handled);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn handling_an_alarm_broadcasts_the_update_once() {
        let router = EventRouter::default();
        let record = router
            .raise_alarm(AlarmKind::SystemFault, "breaker trip".into(), Severity::Critical)
            .await;

        let first = router
            .handle(ClientRequest::HandleAlarm { id: record.id })
            .await;
        match first {
            RouterReply::Broadcast(ServerEvent::AlarmUpdated(updated)) => {
                assert_eq!(updated.id, record.id);
                assert!(updated.handled);
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        // Second acknowledgement of the same alarm is silent.
        let second = router
            .handle(ClientRequest::HandleAlarm { id: record.id })
            .await;
        assert_eq!(second, RouterReply::None);
    }

    #[tokio::test]
    async fn unknown_alarm_id_is_a_silent_noop() {
        let router = EventRouter::default();
        let reply = router
            .handle(ClientRequest::HandleAlarm {
                id: crate::domain::alarm::AlarmId::from_millis(12345),
            })
            .await;
        assert_eq!(reply, RouterReply::None);
    }

    #[tokio::test]
    async fn year_data_stays_within_jitter_of_the_base_table() {
        let router = EventRouter::default();
        let base = year_table("2023").unwrap();
        let reply = router
            .handle(ClientRequest::RequestYearData {
                year: "2023".into(),
            })
            .await;
        match reply {
            RouterReply::Unicast(ServerEvent::YearData { year, data }) => {
                assert_eq!(year, "2023");
                assert_eq!(data.len(), base.len());
                for (served, base) in data.iter().zip(&base) {
                    assert_eq!(served.name, base.name);
                    assert!((served.value - base.value).abs() <= YEAR_JITTER);
                }
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_year_unicasts_an_error() {
        let router = EventRouter::default();
        let reply = router
            .handle(ClientRequest::RequestYearData {
                year: "1999".into(),
            })
            .await;
        match reply {
            RouterReply::Unicast(ServerEvent::YearDataError { year, message }) => {
                assert_eq!(year, "1999");
                assert!(message.contains("1999"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn topology_request_serves_the_reference_grid() {
        let router = EventRouter::default();
        let reply = router.handle(ClientRequest::RequestTopologyData).await;
        match reply {
            RouterReply::Unicast(ServerEvent::TopologyData(topology)) => {
                assert!(!topology.nodes.is_empty());
                assert!(!topology.links.is_empty());
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unrecognized_request_is_ignored() {
        let router = EventRouter::default();
        let payload = serde_json::json!({ "type": "make_coffee" });
        let reply = router.handle(ClientRequest::Unknown(payload)).await;
        assert_eq!(reply, RouterReply::None);
    }
}
