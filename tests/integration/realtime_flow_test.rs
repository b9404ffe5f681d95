//! Session-driven realtime connection and notification feed.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use shiphub_core::config::RealtimeConfig;
use shiphub_entity::session::AuthState;
use shiphub_entity::user::UserRole;
use shiphub_realtime::message::InboundFrame;
use shiphub_realtime::{
    ConnectionManager, ConnectionState, LogPlatform, PermissionState, RealtimeClient,
};

use helpers::{LoopbackTransport, SessionFixture, accepted, eventually, user};

fn client(transport: &Arc<LoopbackTransport>) -> RealtimeClient {
    RealtimeClient::new(
        &RealtimeConfig::default(),
        transport.clone(),
        Arc::new(LogPlatform::new(PermissionState::Granted)),
    )
}

async fn connected(client: &RealtimeClient) {
    eventually("connection up and coordinator attached", || {
        client.connection().state() == ConnectionState::Connected
            && client.coordinator().is_active()
    })
    .await;
}

#[tokio::test]
async fn test_login_connects_and_feeds_order_updates() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));
    let transport = Arc::new(LoopbackTransport::default());
    let client = client(&transport);
    client.start(fixture.session.subscribe());

    assert_eq!(transport.opened(), 0);
    assert_eq!(client.connection().state(), ConnectionState::Disconnected);

    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    connected(&client).await;
    assert_eq!(transport.current_token().as_deref(), Some("tok-1"));

    let mut added = client.store().subscribe();
    transport
        .inject(InboundFrame::new(
            "order:updated",
            json!({
                "orderId": "o-42",
                "userId": "merchant-1",
                "trackingNumber": "TRK-42",
                "status": "IN_TRANSIT"
            }),
        ))
        .await;

    let notification = added.recv().await.unwrap();
    assert!(notification.id.starts_with("order-o-42-"));
    assert_eq!(notification.message, "Order TRK-42 is now IN_TRANSIT");
    assert_eq!(client.store().len(), 1);
    assert_eq!(client.store().unread_count(), 1);

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_logout_closes_connection_and_detaches_listeners() {
    let fixture = SessionFixture::new(accepted(UserRole::Courier, "tok-1"));
    let transport = Arc::new(LoopbackTransport::default());
    let client = client(&transport);
    client.start(fixture.session.subscribe());

    fixture
        .session
        .login("courier@ship.test", "secret")
        .await
        .unwrap();
    connected(&client).await;
    assert!(client.connection().listeners().event_count() > 0);

    fixture.session.logout().await;

    eventually("link released", || transport.live_links() == 0).await;
    eventually("coordinator detached", || !client.coordinator().is_active()).await;
    assert_eq!(client.connection().state(), ConnectionState::Disconnected);
    assert_eq!(client.connection().listeners().event_count(), 0);
    assert!(!client.connection().emit("ping", json!({})));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rapid_toggle_leaves_one_link() {
    let transport = Arc::new(LoopbackTransport::default());
    let manager = ConnectionManager::new(transport.clone());
    let signed_in = AuthState::authenticated(user(UserRole::Admin), "tok-1");
    let signed_out = AuthState::signed_out(None);

    manager.sync_with(&signed_in);
    manager.sync_with(&signed_out);
    manager.sync_with(&signed_in);

    assert_eq!(transport.opened(), 2);
    assert!(manager.is_open());
    eventually("stale link released", || transport.live_links() == 1).await;

    manager.sync_with(&signed_in);
    assert_eq!(transport.opened(), 2);
}

#[tokio::test]
async fn test_mark_all_keeps_entries() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));
    let transport = Arc::new(LoopbackTransport::default());
    let client = client(&transport);
    client.start(fixture.session.subscribe());
    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    connected(&client).await;

    for n in 1..=3 {
        transport
            .inject(InboundFrame::new(
                "notification",
                json!({ "id": format!("n-{n}"), "title": format!("Notice {n}") }),
            ))
            .await;
    }
    eventually("three notifications", || client.store().len() == 3).await;
    assert_eq!(client.store().unread_count(), 3);

    assert!(client.store().mark_as_read("n-2"));
    assert_eq!(client.store().unread_count(), 2);

    client.store().mark_all_as_read();
    assert_eq!(client.store().len(), 3);
    assert_eq!(client.store().unread_count(), 0);

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_relogin_rotates_token_without_reconnecting() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));
    let transport = Arc::new(LoopbackTransport::default());
    let client = client(&transport);
    client.start(fixture.session.subscribe());

    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    connected(&client).await;

    fixture.api.set_answer(accepted(UserRole::Merchant, "tok-2"));
    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();

    eventually("token rotated", || {
        transport.current_token().as_deref() == Some("tok-2")
    })
    .await;
    assert_eq!(transport.opened(), 1);
    assert_eq!(transport.live_links(), 1);

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_following_session() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));
    let transport = Arc::new(LoopbackTransport::default());
    let client = client(&transport);
    client.start(fixture.session.subscribe());
    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    connected(&client).await;

    client.shutdown().await.unwrap();

    assert_eq!(client.connection().state(), ConnectionState::Disconnected);
    assert!(!client.coordinator().is_active());
    eventually("link released", || transport.live_links() == 0).await;

    fixture.session.logout().await;
    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(transport.opened(), 1);
}
