//! PostgreSQL repository tests
//!
//! Run against the database named by `TEST_DATABASE_URL`; skipped when it is
//! unset.

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use futures::future::join_all;
use serial_test::serial;

use event_management::config::DatabaseConfig;
use event_management::database::DatabaseService;
use event_management::models::{EventChanges, EventFilter, NewEvent, NewUser};
use event_management::EventManagementError;

async fn database() -> Option<DatabaseService> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let config = DatabaseConfig {
        url,
        max_connections: 8,
        min_connections: 1,
        run_migrations: true,
    };
    let service = DatabaseService::connect(&config).await.expect("connect to test database");
    let pool = service.pool().expect("postgres backend");
    sqlx::query("TRUNCATE event_registrations, events, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await
        .expect("truncate tables");
    Some(service)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
    }
}

fn new_event(organizer: i64, title: &str, location: &str) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: "Talks".to_string(),
        date: Utc.with_ymd_and_hms(2025, 7, 20, 18, 0, 0).unwrap(),
        location: location.to_string(),
        organizer,
    }
}

#[tokio::test]
#[serial]
async fn test_users_roundtrip_and_unique_username() {
    let Some(db) = database().await else { return };

    let alice = db.users.create(new_user("alice")).await.unwrap();
    assert!(alice.is_active);
    let found = db.users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(found.id, alice.id);
    assert!(db.users.find_by_id(alice.id + 1000).await.unwrap().is_none());

    let err = db.users.create(new_user("alice")).await.unwrap_err();
    assert_matches!(err, EventManagementError::Validation(fields) if fields.get("username").is_some());
}

#[tokio::test]
#[serial]
async fn test_events_filter_update_delete() {
    let Some(db) = database().await else { return };
    let alice = db.users.create(new_user("alice")).await.unwrap();

    let kyiv = db.events.create(new_event(alice.id, "Conf", "Kyiv")).await.unwrap();
    db.events.create(new_event(alice.id, "Meetup", "Lviv")).await.unwrap();
    assert_eq!(kyiv.organizer, alice.id);

    let filter = EventFilter {
        location: Some("Kyiv".to_string()),
        ..Default::default()
    };
    let listed = db.events.list(&filter).await.unwrap();
    assert_eq!(listed, vec![kyiv.clone()]);
    assert_eq!(db.events.list(&EventFilter::default()).await.unwrap().len(), 2);

    let changes = EventChanges {
        title: Some("Conf 2".to_string()),
        ..Default::default()
    };
    let updated = db.events.update(kyiv.id, changes).await.unwrap().unwrap();
    assert_eq!(updated.title, "Conf 2");
    assert_eq!(updated.location, "Kyiv");

    db.events.get_or_create_registration(kyiv.id, alice.id).await.unwrap();
    assert!(db.events.delete(kyiv.id).await.unwrap());
    assert!(!db.events.delete(kyiv.id).await.unwrap());
    assert!(db.events.registrations_for_event(kyiv.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_concurrent_get_or_create() {
    let Some(db) = database().await else { return };
    let alice = db.users.create(new_user("alice")).await.unwrap();
    let bob = db.users.create(new_user("bob")).await.unwrap();
    let event = db.events.create(new_event(alice.id, "Conf", "Kyiv")).await.unwrap();

    let attempts = (0..16).map(|_| db.events.get_or_create_registration(event.id, bob.id));
    let results = join_all(attempts).await;

    let created = results
        .iter()
        .filter(|r| matches!(r, Ok((_, true))))
        .count();
    assert_eq!(created, 1);
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(db.events.registrations_for_event(event.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_registration_for_missing_event() {
    let Some(db) = database().await else { return };
    let alice = db.users.create(new_user("alice")).await.unwrap();

    assert_matches!(
        db.events.get_or_create_registration(4242, alice.id).await,
        Err(EventManagementError::NotFound { resource: "Event", id: 4242 })
    );
}
