//! Drain & retry tests against scripted remote clients: failure retention,
//! partial-batch independence, timeouts, coalescing, and consumption that
//! lands while a submission is in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use encore_core::config::SyncConfig;
use encore_core::errors::SyncError;
use encore_ledger::UsageLedger;
use encore_sync::{RemoteSyncClient, SyncAck, SyncManager};

const LIC: &str = "lic-1";
const INST: &str = "inst-1";

/// Acks everything after failing the first `failures` calls; records every
/// submission it sees.
struct ScriptedClient {
    failures_remaining: AtomicUsize,
    calls: Mutex<Vec<(String, String, u64)>>,
}

impl ScriptedClient {
    fn new(failures: usize) -> Self {
        Self {
            failures_remaining: AtomicUsize::new(failures),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSyncClient for ScriptedClient {
    async fn submit_consumption(
        &self,
        license_id: &str,
        instance_id: &str,
        delta: u64,
    ) -> Result<SyncAck, SyncError> {
        self.calls.lock().unwrap().push((
            license_id.to_string(),
            instance_id.to_string(),
            delta,
        ));
        let prev = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .ok();
        if prev.is_some() {
            return Err(SyncError::Network {
                message: "connection refused".to_string(),
            });
        }
        Ok(SyncAck {
            accepted_delta: delta,
        })
    }
}

/// Fails submissions for one specific license, acks the rest.
struct FailForLicense {
    license_id: String,
}

#[async_trait]
impl RemoteSyncClient for FailForLicense {
    async fn submit_consumption(
        &self,
        license_id: &str,
        _instance_id: &str,
        delta: u64,
    ) -> Result<SyncAck, SyncError> {
        if license_id == self.license_id {
            return Err(SyncError::Server {
                status: 503,
                message: "indexer unavailable".to_string(),
            });
        }
        Ok(SyncAck {
            accepted_delta: delta,
        })
    }
}

/// Sleeps before acking.
struct SlowClient {
    delay: Duration,
}

#[async_trait]
impl RemoteSyncClient for SlowClient {
    async fn submit_consumption(
        &self,
        _license_id: &str,
        _instance_id: &str,
        delta: u64,
    ) -> Result<SyncAck, SyncError> {
        tokio::time::sleep(self.delay).await;
        Ok(SyncAck {
            accepted_delta: delta,
        })
    }
}

/// Records one extra consumption on the ledger while the submission is in
/// flight, then acks.
struct MidFlightConsumer {
    ledger: Arc<UsageLedger>,
}

#[async_trait]
impl RemoteSyncClient for MidFlightConsumer {
    async fn submit_consumption(
        &self,
        license_id: &str,
        instance_id: &str,
        delta: u64,
    ) -> Result<SyncAck, SyncError> {
        self.ledger
            .record_consumption(license_id, instance_id)
            .expect("ledger write");
        Ok(SyncAck {
            accepted_delta: delta,
        })
    }
}

fn manager_with(client: Arc<dyn RemoteSyncClient>) -> (Arc<UsageLedger>, SyncManager) {
    let ledger = Arc::new(UsageLedger::open_in_memory().unwrap());
    let manager = SyncManager::new(ledger.clone(), client, SyncConfig::default());
    (ledger, manager)
}

#[tokio::test]
async fn drain_on_empty_queue_is_a_no_op() {
    let client = Arc::new(ScriptedClient::new(0));
    let (_ledger, manager) = manager_with(client.clone());

    let report = manager.drain().await.unwrap();
    assert_eq!(report.attempted, 0);
    assert!(report.is_clean());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn successful_drain_commits_and_clears_queue() {
    let client = Arc::new(ScriptedClient::new(0));
    let (ledger, manager) = manager_with(client.clone());
    for _ in 0..4 {
        ledger.record_consumption(LIC, INST).unwrap();
    }

    let report = manager.drain().await.unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.submitted_units, 4);

    let entry = ledger.entry(LIC).unwrap().unwrap();
    assert_eq!(entry.synced_consumed, entry.local_consumed);
    assert!(ledger.queue_entry(LIC).unwrap().is_none());

    // The full merged delta went out in one call, with the instance id.
    assert_eq!(client.calls(), vec![(LIC.to_string(), INST.to_string(), 4)]);
}

#[tokio::test]
async fn failed_drain_retains_entry_then_retry_succeeds() {
    let client = Arc::new(ScriptedClient::new(1));
    let (ledger, manager) = manager_with(client.clone());
    for _ in 0..3 {
        ledger.record_consumption(LIC, INST).unwrap();
    }

    // First drain fails; delta unchanged, nothing confirmed.
    let report = manager.drain().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 0);
    let queue = ledger.queue_entry(LIC).unwrap().unwrap();
    assert_eq!(queue.pending_delta, 3);
    assert_eq!(queue.attempts, 1);
    assert_eq!(ledger.entry(LIC).unwrap().unwrap().synced_consumed, 0);

    // Retry submits the same full delta and clears the entry.
    let report = manager.drain().await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.submitted_units, 3);
    let entry = ledger.entry(LIC).unwrap().unwrap();
    assert_eq!(entry.synced_consumed, 3);
    assert!(ledger.queue_entry(LIC).unwrap().is_none());

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].2, 3);
    assert_eq!(calls[1].2, 3);
}

#[tokio::test]
async fn failure_accumulates_into_next_submission() {
    // N consumptions across failed drains: the eventual success submits
    // the sum of everything since the last confirmed sync.
    let client = Arc::new(ScriptedClient::new(2));
    let (ledger, manager) = manager_with(client.clone());

    ledger.record_consumption(LIC, INST).unwrap();
    manager.drain().await.unwrap(); // fails, delta 1 retained

    ledger.record_consumption(LIC, INST).unwrap();
    ledger.record_consumption(LIC, INST).unwrap();
    manager.drain().await.unwrap(); // fails, delta grown to 3

    let report = manager.drain().await.unwrap();
    assert_eq!(report.submitted_units, 3);
    assert_eq!(ledger.entry(LIC).unwrap().unwrap().synced_consumed, 3);
    assert_eq!(client.calls().last().unwrap().2, 3);
}

#[tokio::test]
async fn one_failing_license_does_not_block_others() {
    let client = Arc::new(FailForLicense {
        license_id: "lic-bad".to_string(),
    });
    let (ledger, manager) = manager_with(client);
    ledger.record_consumption("lic-bad", "inst-bad").unwrap();
    for _ in 0..2 {
        ledger.record_consumption("lic-good", "inst-good").unwrap();
    }

    let report = manager.drain().await.unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);

    // Confirmed license is settled, failing one still queued.
    assert!(ledger.queue_entry("lic-good").unwrap().is_none());
    assert_eq!(
        ledger.queue_entry("lic-bad").unwrap().unwrap().pending_delta,
        1
    );
}

#[tokio::test]
async fn timeout_is_treated_as_failure() {
    let client = Arc::new(SlowClient {
        delay: Duration::from_millis(500),
    });
    let ledger = Arc::new(UsageLedger::open_in_memory().unwrap());
    let config = SyncConfig {
        request_timeout_ms: Some(20),
        ..SyncConfig::default()
    };
    let manager = SyncManager::new(ledger.clone(), client, config);
    ledger.record_consumption(LIC, INST).unwrap();

    let report = manager.drain().await.unwrap();
    assert_eq!(report.failed, 1);
    let queue = ledger.queue_entry(LIC).unwrap().unwrap();
    assert_eq!(queue.pending_delta, 1);
    assert_eq!(queue.attempts, 1);
}

#[tokio::test]
async fn overlapping_drains_coalesce() {
    let client = Arc::new(SlowClient {
        delay: Duration::from_millis(100),
    });
    let (ledger, manager) = manager_with(client);
    let manager = Arc::new(manager);
    ledger.record_consumption(LIC, INST).unwrap();

    let first = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.drain().await.unwrap() })
    };
    // Give the first drain time to take the gate and block in the client.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = manager.drain().await.unwrap();
    assert!(second.skipped);
    assert_eq!(second.attempted, 0);

    let first = first.await.unwrap();
    assert_eq!(first.succeeded, 1);
}

#[tokio::test]
async fn consumption_during_drain_stays_pending() {
    let ledger = Arc::new(UsageLedger::open_in_memory().unwrap());
    let client = Arc::new(MidFlightConsumer {
        ledger: ledger.clone(),
    });
    let manager = SyncManager::new(ledger.clone(), client, SyncConfig::default());

    ledger.record_consumption(LIC, INST).unwrap();
    ledger.record_consumption(LIC, INST).unwrap();

    // The client records one more play mid-flight; the drain snapshotted
    // delta=2, so that play must survive as pending residue.
    let report = manager.drain().await.unwrap();
    assert_eq!(report.submitted_units, 2);

    let entry = ledger.entry(LIC).unwrap().unwrap();
    assert_eq!(entry.local_consumed, 3);
    assert_eq!(entry.synced_consumed, 2);
    assert_eq!(
        ledger.queue_entry(LIC).unwrap().unwrap().pending_delta,
        1
    );

    // The next drain picks up the residue (this client keeps consuming
    // mid-flight, so one play is always pending — and never lost).
    let report = manager.drain().await.unwrap();
    assert_eq!(report.submitted_units, 1);
    let entry = ledger.entry(LIC).unwrap().unwrap();
    assert_eq!(entry.local_consumed, 4);
    assert_eq!(entry.synced_consumed, 3);
    assert_eq!(entry.pending_delta(), 1);
}
