// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests against a real HTTP server through the reqwest transport.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use ferry::{Config, Context, Event, HttpError, PassOutcome, RequestConfig, SyncReport};
use ferry_core::{CredentialPair, Destination, Method, OpId, OperationKind};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::broadcast;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, state: &TempDir) -> Config {
    Config {
        base_url: server.uri(),
        state_dir: Some(state.path().to_path_buf()),
        timeout_ms: 2_000,
        ..Config::default()
    }
}

async fn mount_health(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn pass(ctx: &Context) -> SyncReport {
    match ctx.scheduler.run_pass().await {
        PassOutcome::Completed(report) => report,
        other => panic!("expected a completed pass, got {:?}", other),
    }
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn form(ctx: &Context, n: u32) -> OpId {
    ctx.outbox
        .enqueue(
            OperationKind::FormSubmission,
            json!({"form": n}),
            Destination::new(Method::Post, format!("/forms/{}", n)),
        )
        .unwrap()
}

#[tokio::test]
async fn offline_submissions_are_delivered_after_restart_and_reconnect() {
    let server = MockServer::start().await;
    let state = TempDir::new().unwrap();
    mount_health(&server).await;
    for n in [1, 3] {
        Mock::given(method("POST"))
            .and(path(format!("/forms/{}", n)))
            .and(body_json(json!({"form": n})))
            .and(header_exists("idempotency-key"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/forms/2"))
        .respond_with(ResponseTemplate::new(422))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/forms/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // Queue while offline, then restart the process
    let ids: Vec<OpId> = {
        let ctx = Context::open(config(&server, &state)).unwrap();
        assert!(!ctx.connectivity.is_online());
        assert_eq!(ctx.scheduler.run_pass().await, PassOutcome::Offline);
        (1..=3).map(|n| form(&ctx, n)).collect()
    };

    let ctx = Context::open(config(&server, &state)).unwrap();
    let mut rx = ctx.events.subscribe();
    assert_eq!(ctx.outbox.len(OperationKind::FormSubmission), 3);

    assert!(ctx.check_connectivity().await);
    let first = pass(&ctx).await;
    let second = pass(&ctx).await;
    let third = pass(&ctx).await;

    assert_eq!(first.synced, vec![ids[0].clone(), ids[2].clone()]);
    assert_eq!(second.retried, vec![ids[1].clone()]);
    assert_eq!(third.synced, vec![ids[1].clone()]);
    assert!(ctx.outbox.list(OperationKind::FormSubmission).is_empty());

    let events = drain(&mut rx);
    let synced = events.iter().filter(|e| matches!(e, Event::OperationSynced { .. })).count();
    assert_eq!(synced, 3);
    assert!(!events.iter().any(|e| matches!(e, Event::DeadLettered(_))));
}

#[tokio::test]
async fn exhausted_operation_is_dead_lettered_once() {
    let server = MockServer::start().await;
    let state = TempDir::new().unwrap();
    mount_health(&server).await;
    Mock::given(method("PUT"))
        .and(path("/bookings/9"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let ctx = Context::open(config(&server, &state)).unwrap();
    let id = ctx
        .outbox
        .enqueue_with(
            OperationKind::ApiCall,
            json!({"seats": 2}),
            Destination::new(Method::Put, "/bookings/9"),
            3,
        )
        .unwrap();
    let mut rx = ctx.events.subscribe();
    ctx.check_connectivity().await;

    for _ in 0..4 {
        pass(&ctx).await;
    }

    let reports: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::DeadLettered(report) => Some(report),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].ids(), vec![id]);
    assert!(ctx.outbox.is_empty());
}

#[tokio::test]
async fn concurrent_expired_credentials_share_one_refresh() {
    let server = MockServer::start().await;
    let state = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "ada"})))
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "refresh_token": "r2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::open(config(&server, &state)).unwrap();
    ctx.tokens.save(CredentialPair::new("stale", "r1", chrono::Utc::now())).unwrap();

    let (a, b) = tokio::join!(
        ctx.client.execute(RequestConfig::get("/profile")),
        ctx.client.execute(RequestConfig::get("/profile")),
    );

    assert_eq!(a.unwrap().status, 200);
    assert_eq!(b.unwrap().status, 200);
    assert_eq!(ctx.tokens.current().unwrap().refresh_token, "r2");
}

#[tokio::test]
async fn rejected_refresh_ends_the_session() {
    let server = MockServer::start().await;
    let state = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::open(config(&server, &state)).unwrap();
    ctx.tokens.save(CredentialPair::new("stale", "revoked", chrono::Utc::now())).unwrap();
    let mut rx = ctx.events.subscribe();

    let response = ctx.client.execute(RequestConfig::get("/profile")).await.unwrap();

    assert_eq!(response.status, 401);
    assert!(!ctx.tokens.is_authenticated());
    assert!(drain(&mut rx).iter().any(|e| matches!(e, Event::AuthFailure { .. })));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    let state = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let ctx = Context::open(Config { timeout_ms: 100, ..config(&server, &state) }).unwrap();

    let err = ctx.client.execute(RequestConfig::get("/slow")).await.unwrap_err();

    assert!(matches!(err, HttpError::Transient(_)));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn login_then_authenticated_request() {
    let server = MockServer::start().await;
    let state = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"user": "ada", "password": "pw"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "a1", "refreshToken": "r1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::open(config(&server, &state)).unwrap();
    ctx.session.login(&json!({"user": "ada", "password": "pw"})).await.unwrap();

    let response = ctx.client.execute(RequestConfig::get("/me")).await.unwrap();
    assert_eq!(response.status, 200);
}
