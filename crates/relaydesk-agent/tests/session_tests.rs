// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact session lifecycle tests.

use chrono::TimeDelta;
use relaydesk_agent::VisitorInfo;
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::DeviceMetadata;
use relaydesk_test_utils::TestHarness;

#[tokio::test]
async fn session_is_valid_through_its_expiry_instant() {
    let h = TestHarness::new().await.unwrap();
    let session = h.visitor("org_1").await.unwrap();
    assert_eq!(session.expires_at - session.created_at, TimeDelta::days(1));

    h.clock.set(session.expires_at - TimeDelta::milliseconds(1));
    assert!(h.sessions.validate(&session.id).await.is_ok());

    h.clock.set(session.expires_at + TimeDelta::milliseconds(1));
    assert!(matches!(
        h.sessions.validate(&session.id).await,
        Err(RelaydeskError::Expired { .. })
    ));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let h = TestHarness::new().await.unwrap();
    assert!(matches!(
        h.sessions.validate("missing").await,
        Err(RelaydeskError::NotFound { .. })
    ));
}

#[tokio::test]
async fn refresh_extends_but_never_shortens() {
    let h = TestHarness::builder()
        .with_config(|c| c.session.ttl_secs = 3_600)
        .build()
        .await
        .unwrap();
    let session = h.visitor("org_1").await.unwrap();

    h.clock.advance(TimeDelta::minutes(30));
    let refreshed = h.sessions.refresh(&session.id).await.unwrap();
    assert_eq!(
        refreshed.expires_at,
        session.expires_at + TimeDelta::minutes(30)
    );

    h.clock.advance(TimeDelta::minutes(-20));
    let again = h.sessions.refresh(&session.id).await.unwrap();
    assert_eq!(again.expires_at, refreshed.expires_at);
}

#[tokio::test]
async fn blank_visitor_details_still_open_a_session() {
    let h = TestHarness::new().await.unwrap();
    let session = h
        .sessions
        .create(
            "org_1",
            VisitorInfo {
                name: "  ".into(),
                email: String::new(),
            },
            DeviceMetadata::default(),
        )
        .await
        .unwrap();
    assert_eq!(session.name, "");
    assert!(h.sessions.validate(&session.id).await.is_ok());
}

#[tokio::test]
async fn session_without_tenant_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let result = h
        .sessions
        .create(
            " ",
            VisitorInfo {
                name: "Ann".into(),
                email: "ann@example.com".into(),
            },
            DeviceMetadata::default(),
        )
        .await;
    assert!(matches!(result, Err(RelaydeskError::Validation(_))));
}

#[tokio::test]
async fn device_metadata_is_stored_with_the_session() {
    let h = TestHarness::new().await.unwrap();
    let metadata = DeviceMetadata {
        user_agent: Some("Mozilla/5.0".into()),
        languages: vec!["vi-VN".into(), "en-US".into()],
        timezone_offset: Some(-420),
        ..DeviceMetadata::default()
    };
    let session = h
        .sessions
        .create(
            "org_1",
            VisitorInfo {
                name: "Ann".into(),
                email: "ann@example.com".into(),
            },
            metadata.clone(),
        )
        .await
        .unwrap();
    let loaded = h.sessions.validate(&session.id).await.unwrap();
    assert_eq!(loaded.metadata, metadata);
}
