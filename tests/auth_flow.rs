//! Login, refresh and OTP flows against an in-memory database.

mod common;

use chrono::{Duration, Utc};

use common::{MockMediaStore, MockTransport, Sent};
use konfess::auth::{self, Registration};
use konfess::db::models::Role;
use konfess::db::users::{self, NewUser};
use konfess::db::{sessions, Database};
use konfess::error::AppError;

const SECRET: &[u8] = b"test-secret";

async fn test_db() -> Database {
    Database::connect_in_memory()
        .await
        .expect("in-memory database")
}

async fn seed_user(db: &Database, username: &str, password: &str, chat_id: Option<i64>) {
    let hash = konfess::auth::password::hash_password(password).expect("hash");
    users::create(
        db.pool(),
        NewUser {
            name: "Tester".to_owned(),
            username: username.to_owned(),
            password_hash: hash,
            role: Role::User,
            chat_id,
            profile_image: None,
        },
    )
    .await
    .expect("seed user");
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let db = test_db().await;
    let media = MockMediaStore::new();

    let registered = auth::register(
        &db,
        &media,
        SECRET,
        Registration {
            name: "Alice".to_owned(),
            username: "alice".to_owned(),
            password: "hunter2".to_owned(),
        },
        None,
    )
    .await
    .expect("register");
    assert_eq!(registered.user.role, Role::User);

    let logged_in = auth::login(&db, SECRET, "alice", "hunter2")
        .await
        .expect("login");
    assert_eq!(logged_in.user.id, registered.user.id);
    assert!(!logged_in.access_token.is_empty());
}

#[tokio::test]
async fn duplicate_username_registration_conflicts() {
    let db = test_db().await;
    let media = MockMediaStore::new();
    let registration = Registration {
        name: "Alice".to_owned(),
        username: "alice".to_owned(),
        password: "hunter2".to_owned(),
    };

    auth::register(&db, &media, SECRET, registration.clone(), None)
        .await
        .expect("first register");
    let err = auth::register(&db, &media, SECRET, registration, None)
        .await
        .expect_err("duplicate register");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let db = test_db().await;
    seed_user(&db, "bob", "correct", None).await;

    let wrong_password = auth::login(&db, SECRET, "bob", "incorrect")
        .await
        .expect_err("wrong password");
    let unknown_user = auth::login(&db, SECRET, "nobody", "anything")
        .await
        .expect_err("unknown user");

    assert!(matches!(wrong_password, AppError::InvalidCredentials));
    assert!(matches!(unknown_user, AppError::InvalidCredentials));
}

#[tokio::test]
async fn refresh_issues_a_new_pair_without_invalidating_the_old_token() {
    let db = test_db().await;
    let media = MockMediaStore::new();
    let registered = auth::register(
        &db,
        &media,
        SECRET,
        Registration {
            name: "Carol".to_owned(),
            username: "carol".to_owned(),
            password: "pw".to_owned(),
        },
        None,
    )
    .await
    .expect("register");

    let first = auth::refresh(SECRET, &registered.refresh_token).expect("first refresh");
    // The original token stays usable.
    let second = auth::refresh(SECRET, &registered.refresh_token).expect("second refresh");
    assert!(!first.access_token.is_empty());
    assert!(!second.access_token.is_empty());

    let err = auth::refresh(SECRET, "not-a-token").expect_err("garbage token");
    assert!(matches!(err, AppError::InvalidToken));
}

fn extract_otp(sent: &[Sent]) -> String {
    let Some(Sent::Message { text, .. }) = sent.last() else {
        panic!("no OTP message delivered");
    };
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    assert_eq!(digits.len(), 6, "OTP message carries a 6-digit code");
    digits
}

#[tokio::test]
async fn otp_round_trip_consumes_every_session_row() {
    let db = test_db().await;
    let transport = MockTransport::new();
    seed_user(&db, "dave", "pw", Some(99)).await;

    auth::otp::request(&db, &transport, "dave")
        .await
        .expect("request OTP");
    let code = extract_otp(&transport.sent());

    let verified = auth::otp::verify(&db, "dave", &code)
        .await
        .expect("verify OTP");
    assert_eq!(verified.username, "dave");

    // Consumed on the first attempt; replay is rejected.
    let replay = auth::otp::verify(&db, "dave", &code)
        .await
        .expect_err("replayed OTP");
    assert!(matches!(replay, AppError::NotFound(_)));
}

#[tokio::test]
async fn expired_otp_is_rejected_and_still_removed() {
    let db = test_db().await;
    seed_user(&db, "erin", "pw", Some(7)).await;

    let expired_at = Utc::now() - Duration::minutes(1);
    sessions::create(db.pool(), "erin", "123456", expired_at)
        .await
        .expect("seed session");

    let err = auth::otp::verify(&db, "erin", "123456")
        .await
        .expect_err("expired OTP");
    assert!(matches!(err, AppError::NotFound(_)));

    // The row was deleted before the expiry check, so retrying also fails.
    let retry = auth::otp::verify(&db, "erin", "123456")
        .await
        .expect_err("retry after expiry");
    assert!(matches!(retry, AppError::NotFound(_)));
}

#[tokio::test]
async fn otp_request_requires_a_bound_chat() {
    let db = test_db().await;
    let transport = MockTransport::new();
    seed_user(&db, "frank", "pw", None).await;

    let err = auth::otp::request(&db, &transport, "frank")
        .await
        .expect_err("unbound user");
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(transport.sent().is_empty());
}
