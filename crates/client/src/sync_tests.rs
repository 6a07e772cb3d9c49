// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use crate::http::TransportError;
use crate::outbox::DEFAULT_MAX_RETRIES;
use crate::test_helpers::{MockReply, MockTransport, MOCK_BASE};
use ferry_core::clock::ManualClock;
use ferry_core::{Destination, LocalStore, Method};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::broadcast;

struct Harness {
    _dir: TempDir,
    mock: Arc<MockTransport>,
    outbox: Arc<Outbox>,
    monitor: Arc<ConnectivityMonitor>,
    events: EventBus,
    scheduler: Arc<SyncScheduler>,
}

fn harness(online: bool) -> Harness {
    let dir = TempDir::new().unwrap();
    let mock = MockTransport::new();
    let events = EventBus::new();
    let store = LocalStore::open(dir.path()).unwrap();
    let outbox = Arc::new(
        Outbox::open(store, Arc::new(ManualClock::new(1_000)), events.clone(), DEFAULT_MAX_RETRIES)
            .unwrap(),
    );
    let monitor = Arc::new(ConnectivityMonitor::new(online, events.clone()));
    let client = Arc::new(HttpClient::builder(mock.clone(), MOCK_BASE).build());
    let scheduler = Arc::new(SyncScheduler::new(
        outbox.clone(),
        client,
        monitor.clone(),
        events.clone(),
        DEFAULT_SYNC_INTERVAL,
    ));
    Harness { _dir: dir, mock, outbox, monitor, events, scheduler }
}

impl Harness {
    fn enqueue(&self, kind: OperationKind, endpoint: &str) -> OpId {
        self.outbox
            .enqueue(kind, json!({"endpoint": endpoint}), Destination::new(Method::Post, endpoint))
            .unwrap()
    }

    async fn pass(&self) -> SyncReport {
        match self.scheduler.run_pass().await {
            PassOutcome::Completed(report) => report,
            other => panic!("expected a completed pass, got {:?}", other),
        }
    }
}

fn dead_letter_reports(rx: &mut broadcast::Receiver<Event>) -> Vec<DeadLetterReport> {
    let mut reports = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::DeadLettered(report) = event {
            reports.push(report);
        }
    }
    reports
}

#[tokio::test]
async fn offline_pass_is_skipped() {
    let h = harness(false);
    h.enqueue(OperationKind::Action, "/a");

    assert_eq!(h.scheduler.run_pass().await, PassOutcome::Offline);
    assert!(h.mock.requests().is_empty());
    assert_eq!(h.outbox.pending_count(), 1);
}

#[tokio::test]
async fn delivers_with_idempotency_key() {
    let h = harness(true);
    h.mock.on(Method::Post, "/a", MockReply::Status(201));
    let id = h.enqueue(OperationKind::Action, "/a");

    let report = h.pass().await;

    assert_eq!(report.synced, vec![id.clone()]);
    assert!(h.outbox.is_empty());
    let sent = &h.mock.requests()[0];
    assert_eq!(sent.header("idempotency-key"), Some(id.to_string().as_str()));
    assert_eq!(sent.body.as_deref(), Some(&b"{\"endpoint\":\"/a\"}"[..]));
}

#[tokio::test]
async fn null_payload_sends_no_body() {
    let h = harness(true);
    h.mock.on(Method::Delete, "/items/4", MockReply::Status(204));
    h.outbox
        .enqueue(OperationKind::ApiCall, json!(null), Destination::new(Method::Delete, "/items/4"))
        .unwrap();

    h.pass().await;

    assert_eq!(h.mock.requests()[0].body, None);
}

#[tokio::test]
async fn kinds_are_processed_in_order_and_fifo() {
    let h = harness(true);
    for path in ["/api/1", "/action/1", "/form/1", "/action/2"] {
        h.mock.on(Method::Post, path, MockReply::Status(200));
    }
    h.enqueue(OperationKind::ApiCall, "/api/1");
    h.enqueue(OperationKind::Action, "/action/1");
    h.enqueue(OperationKind::FormSubmission, "/form/1");
    h.enqueue(OperationKind::Action, "/action/2");

    h.pass().await;

    let urls: Vec<_> = h.mock.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/action/1", MOCK_BASE),
            format!("{}/action/2", MOCK_BASE),
            format!("{}/form/1", MOCK_BASE),
            format!("{}/api/1", MOCK_BASE),
        ]
    );
}

#[tokio::test]
async fn failure_does_not_stop_the_pass() {
    let h = harness(true);
    h.mock.on(Method::Post, "/a", MockReply::Fail(TransportError::Timeout));
    h.mock.on(Method::Post, "/b", MockReply::Status(200));
    let a = h.enqueue(OperationKind::Action, "/a");
    let b = h.enqueue(OperationKind::Action, "/b");

    let report = h.pass().await;

    assert_eq!(report.retried, vec![a.clone()]);
    assert_eq!(report.synced, vec![b]);
    assert_eq!(h.outbox.get(&a).unwrap().retry_count, 1);
}

#[tokio::test]
async fn rejected_submission_recovers_on_third_pass() {
    let h = harness(false);
    h.mock.on(Method::Post, "/forms/1", MockReply::Status(200));
    h.mock
        .on(Method::Post, "/forms/2", MockReply::Status(422))
        .on(Method::Post, "/forms/2", MockReply::Status(422))
        .on(Method::Post, "/forms/2", MockReply::Status(200));
    h.mock.on(Method::Post, "/forms/3", MockReply::Status(200));
    let ids: Vec<_> = (1..=3)
        .map(|n| h.enqueue(OperationKind::FormSubmission, &format!("/forms/{}", n)))
        .collect();
    let mut rx = h.events.subscribe();

    h.monitor.set_online(true);
    let first = h.pass().await;
    let second = h.pass().await;
    let third = h.pass().await;

    assert_eq!(first.synced, vec![ids[0].clone(), ids[2].clone()]);
    assert_eq!(first.retried, vec![ids[1].clone()]);
    assert_eq!(second.retried, vec![ids[1].clone()]);
    assert_eq!(third.synced, vec![ids[1].clone()]);

    let total = first.synced.len() + second.synced.len() + third.synced.len();
    assert_eq!(total, 3);
    assert!(h.outbox.list(OperationKind::FormSubmission).is_empty());
    assert!(dead_letter_reports(&mut rx).is_empty());
}

#[tokio::test]
async fn exhausted_operation_is_reported_once() {
    let h = harness(true);
    h.mock.on(Method::Post, "/flaky", MockReply::Status(503));
    let id = h
        .outbox
        .enqueue_with(
            OperationKind::ApiCall,
            json!({}),
            Destination::new(Method::Post, "/flaky"),
            3,
        )
        .unwrap();
    let mut rx = h.events.subscribe();

    let first = h.pass().await;
    let second = h.pass().await;
    let third = h.pass().await;
    let fourth = h.pass().await;

    assert_eq!(first.retried, vec![id.clone()]);
    assert_eq!(second.retried, vec![id.clone()]);
    assert_eq!(third.dead_lettered, vec![id.clone()]);
    assert!(fourth.is_empty());
    assert_eq!(h.mock.count(Method::Post, "/flaky"), 3);
    assert!(h.outbox.is_empty());

    let reports = dead_letter_reports(&mut rx);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].count(), 1);
    assert_eq!(reports[0].ids(), vec![id]);
}

#[tokio::test]
async fn invalid_destination_is_dropped_without_retry() {
    let h = harness(true);
    let id = h.enqueue(OperationKind::Action, "http://");

    let report = h.pass().await;

    assert_eq!(report.dead_lettered, vec![id]);
    assert!(h.outbox.is_empty());
    assert!(h.mock.requests().is_empty());
}

#[tokio::test]
async fn unsendable_request_is_dropped_without_retry() {
    let h = harness(true);
    h.mock.on(Method::Post, "/a", MockReply::Fail(TransportError::Invalid("bad header".into())));
    let id = h.enqueue(OperationKind::Action, "/a");
    let mut rx = h.events.subscribe();

    let report = h.pass().await;

    assert_eq!(report.dead_lettered, vec![id.clone()]);
    assert!(report.retried.is_empty());
    assert_eq!(h.mock.count(Method::Post, "/a"), 1);
    assert_eq!(dead_letter_reports(&mut rx)[0].ids(), vec![id]);
}

#[tokio::test]
async fn trigger_during_pass_is_noop() {
    let h = harness(true);
    h.mock.on(
        Method::Post,
        "/slow",
        MockReply::Delayed(Duration::from_millis(100), Box::new(MockReply::Status(200))),
    );
    h.enqueue(OperationKind::Action, "/slow");

    let (a, b) = tokio::join!(h.scheduler.run_pass(), h.scheduler.run_pass());

    assert!(matches!(a, PassOutcome::Completed(_)));
    assert_eq!(b, PassOutcome::AlreadyRunning);
    assert_eq!(h.mock.count(Method::Post, "/slow"), 1);
}

#[tokio::test]
async fn publishes_synced_and_completed_events() {
    let h = harness(true);
    h.mock.on(Method::Post, "/a", MockReply::Status(200));
    let id = h.enqueue(OperationKind::Action, "/a");
    let mut rx = h.events.subscribe();

    let report = h.pass().await;

    assert_eq!(
        rx.try_recv().unwrap(),
        Event::OperationSynced { id, kind: OperationKind::Action }
    );
    assert_eq!(rx.try_recv().unwrap(), Event::SyncCompleted(report));
}

#[tokio::test]
async fn reconnect_triggers_a_pass() {
    let h = harness(false);
    h.mock.on(Method::Post, "/a", MockReply::Status(200));
    let id = h.enqueue(OperationKind::Action, "/a");
    let mut rx = h.events.subscribe();
    let cancel = CancellationToken::new();
    let handle = h.scheduler.clone().spawn(cancel.clone());

    // Let the immediate first tick run while offline
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(h.mock.requests().is_empty());

    h.monitor.set_online(true);
    let report = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if let Ok(Event::SyncCompleted(report)) = rx.recv().await {
                return report;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(report.synced, vec![id]);
    cancel.cancel();
    handle.await.unwrap();
}
