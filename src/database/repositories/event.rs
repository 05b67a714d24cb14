//! Event repository implementation

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::EventRepository;
use crate::models::event::{Event, EventChanges, EventFilter, NewEvent, Registration};
use crate::utils::errors::{EventManagementError, Result};
use crate::utils::logging::log_database_operation;

const EVENT_COLUMNS: &str =
    "id, title, description, event_date AS date, location, organizer_id AS organizer";

#[derive(Clone, Debug)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_registration(&self, event_id: i64, user_id: i64) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT id, user_id, event_id, registered_at FROM event_registrations WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, request: NewEvent) -> Result<Event> {
        let result = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, event_date, location, organizer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.date)
        .bind(&request.location)
        .bind(request.organizer)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(event) => Ok(event),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(EventManagementError::user_not_found(request.organizer))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE ($1::timestamptz IS NULL OR event_date = $1)
              AND ($2::text IS NULL OR location = $2)
              AND ($3::text IS NULL OR title = $3)
            ORDER BY id ASC
            "#
        ))
        .bind(filter.date)
        .bind(filter.location.as_deref())
        .bind(filter.title.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn update(&self, id: i64, changes: EventChanges) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                location = COALESCE($5, location)
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.date)
        .bind(changes.location)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_or_create_registration(&self, event_id: i64, user_id: i64) -> Result<(Registration, bool)> {
        let started = Instant::now();

        // The unique constraint decides the race; losers fall through to the select.
        let inserted = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO event_registrations (user_id, event_id, registered_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING id, user_id, event_id, registered_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await;

        let inserted = match inserted {
            Ok(row) => row,
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                return Err(EventManagementError::event_not_found(event_id));
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = match inserted {
            Some(registration) => (registration, true),
            None => {
                let existing = self
                    .find_registration(event_id, user_id)
                    .await?
                    .ok_or_else(|| EventManagementError::event_not_found(event_id))?;
                (existing, false)
            }
        };

        log_database_operation(
            "get_or_create",
            "event_registrations",
            started.elapsed().as_millis() as u64,
        );
        Ok(outcome)
    }

    async fn registrations_for_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, user_id, event_id, registered_at FROM event_registrations WHERE event_id = $1 ORDER BY registered_at ASC, id ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }
}
