//! Database repositories module
//!
//! The repository traits are the store boundary the services talk to. Each
//! trait has a PostgreSQL implementation here and an in-process one in
//! [`crate::database::memory`].

pub mod event;
pub mod user;

use async_trait::async_trait;

use crate::models::{Event, EventChanges, EventFilter, NewEvent, NewUser, Registration, User};
use crate::utils::errors::Result;

pub use event::PgEventRepository;
pub use user::PgUserRepository;

/// Identity store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken username is a validation error on `username`
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Event and registration store
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: NewEvent) -> Result<Event>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Events matching every set filter, ordered by id
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    /// Apply changes; `None` when the event does not exist
    async fn update(&self, id: i64, changes: EventChanges) -> Result<Option<Event>>;

    /// Delete an event and its registrations; `false` when it did not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Find or create the registration for `(event, user)`.
    ///
    /// The flag is `true` only for the call that inserted the row. Must stay
    /// atomic under concurrent calls for the same pair.
    async fn get_or_create_registration(&self, event_id: i64, user_id: i64) -> Result<(Registration, bool)>;

    /// Registrations of one event, oldest first
    async fn registrations_for_event(&self, event_id: i64) -> Result<Vec<Registration>>;
}
