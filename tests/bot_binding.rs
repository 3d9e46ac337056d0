//! `/start` binding is idempotent: one row per chat, ever.

mod common;

use common::{MockTransport, Sent};
use konfess::bot::commands::{handle_bind, handle_me, BindOutcome, ChatEvent};
use konfess::config::Settings;
use konfess::db::users;
use konfess::db::Database;
use konfess::error::AppError;

fn test_settings(admin_chat_id: Option<i64>) -> Settings {
    Settings {
        telegram_token: "dummy".to_owned(),
        telegram_admin_chat_id: admin_chat_id,
        client_base_url: "https://konfess.example".to_owned(),
        jwt_secret: "secret".to_owned(),
        database_url: "konfess.db".to_owned(),
        port: 3000,
        s3_access_key_id: None,
        s3_secret_access_key: None,
        s3_endpoint_url: None,
        s3_bucket_name: None,
        s3_public_base_url: None,
    }
}

fn event(chat_id: i64) -> ChatEvent {
    ChatEvent {
        chat_id,
        username: Some("grace".to_owned()),
        first_name: Some("Grace".to_owned()),
        last_name: Some("Hopper".to_owned()),
    }
}

#[tokio::test]
async fn binding_twice_creates_exactly_one_user() {
    let db = Database::connect_in_memory().await.expect("db");
    let transport = MockTransport::new();
    let settings = test_settings(None);
    let event = event(1234);

    let first = handle_bind(&db, &transport, &settings, &event)
        .await
        .expect("first bind");
    let second = handle_bind(&db, &transport, &settings, &event)
        .await
        .expect("second bind");

    assert_eq!(first, BindOutcome::Linked);
    assert_eq!(second, BindOutcome::AlreadyLinked);

    let all = users::find_all(db.pool()).await.expect("find all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].chat_id, Some(1234));
    assert_eq!(all[0].username, "grace");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    match &sent[1] {
        Sent::Message { text, .. } => {
            assert!(text.contains("linked already"));
        }
        other => panic!("unexpected send: {other:?}"),
    }
}

#[tokio::test]
async fn first_bind_notifies_the_admin_chat() {
    let db = Database::connect_in_memory().await.expect("db");
    let transport = MockTransport::new();
    let settings = test_settings(Some(999));

    handle_bind(&db, &transport, &settings, &event(55))
        .await
        .expect("bind");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    match &sent[0] {
        Sent::Message { chat_id, text, .. } => {
            assert_eq!(*chat_id, 999);
            assert!(text.contains("New User Registered"));
        }
        other => panic!("unexpected send: {other:?}"),
    }
}

#[tokio::test]
async fn chat_without_a_username_falls_back_to_the_chat_id() {
    let db = Database::connect_in_memory().await.expect("db");
    let transport = MockTransport::new();
    let settings = test_settings(None);

    let anonymous = ChatEvent {
        chat_id: 777,
        username: None,
        first_name: None,
        last_name: None,
    };
    handle_bind(&db, &transport, &settings, &anonymous)
        .await
        .expect("bind");

    let user = users::find_by_chat_id(db.pool(), 777)
        .await
        .expect("lookup")
        .expect("user exists");
    assert_eq!(user.username, "777");
    assert_eq!(user.name, "Anonymous");
}

#[tokio::test]
async fn me_reports_the_bound_account_or_fails() {
    let db = Database::connect_in_memory().await.expect("db");
    let transport = MockTransport::new();
    let settings = test_settings(None);

    let err = handle_me(&db, &transport, &settings, &event(42))
        .await
        .expect_err("unbound chat");
    assert!(matches!(err, AppError::NotFound(_)));

    handle_bind(&db, &transport, &settings, &event(42))
        .await
        .expect("bind");
    handle_me(&db, &transport, &settings, &event(42))
        .await
        .expect("me after bind");

    let sent = transport.sent();
    match sent.last() {
        Some(Sent::Message { chat_id, text, .. }) => {
            assert_eq!(*chat_id, 42);
            assert!(text.contains("your account info"));
        }
        other => panic!("unexpected send: {other:?}"),
    }
}
