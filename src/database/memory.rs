//! In-process store
//!
//! Backs `database.url = "memory://"`. All tables sit behind one lock so
//! cascades and get-or-create observe a single consistent state.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::repositories::user::DUPLICATE_USERNAME;
use super::repositories::{EventRepository, UserRepository};
use crate::models::{Event, EventChanges, EventFilter, NewEvent, NewUser, Registration, User};
use crate::utils::errors::{EventManagementError, FieldErrors, Result};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
    next_user_id: i64,
    next_event_id: i64,
    next_registration_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Shared handle to the in-process tables
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository { db: self.clone() }
    }

    pub fn events(&self) -> InMemoryEventRepository {
        InMemoryEventRepository { db: self.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut tables = self.db.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(EventManagementError::Validation(FieldErrors::single(
                "username",
                DUPLICATE_USERNAME,
            )));
        }

        let id = next_id(&mut tables.next_user_id);
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            date_joined: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.db.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryEventRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        let mut tables = self.db.tables.write().await;
        if !tables.users.contains_key(&event.organizer) {
            return Err(EventManagementError::user_not_found(event.organizer));
        }

        let id = next_id(&mut tables.next_event_id);
        let created = Event {
            id,
            title: event.title,
            description: event.description,
            date: event.date,
            location: event.location,
            organizer: event.organizer,
        };
        tables.events.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.db.tables.read().await.events.get(&id).cloned())
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: EventChanges) -> Result<Option<Event>> {
        let mut tables = self.db.tables.write().await;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            event.title = title;
        }
        if let Some(description) = changes.description {
            event.description = description;
        }
        if let Some(date) = changes.date {
            event.date = date;
        }
        if let Some(location) = changes.location {
            event.location = location;
        }
        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.db.tables.write().await;
        if tables.events.remove(&id).is_none() {
            return Ok(false);
        }
        tables.registrations.retain(|_, r| r.event_id != id);
        Ok(true)
    }

    async fn get_or_create_registration(&self, event_id: i64, user_id: i64) -> Result<(Registration, bool)> {
        let mut tables = self.db.tables.write().await;
        if !tables.events.contains_key(&event_id) {
            return Err(EventManagementError::event_not_found(event_id));
        }
        if !tables.users.contains_key(&user_id) {
            return Err(EventManagementError::user_not_found(user_id));
        }

        if let Some(existing) = tables
            .registrations
            .values()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
        {
            return Ok((existing.clone(), false));
        }

        let id = next_id(&mut tables.next_registration_id);
        let registration = Registration {
            id,
            user_id,
            event_id,
            registered_at: Utc::now(),
        };
        tables.registrations.insert(id, registration.clone());
        Ok((registration, true))
    }

    async fn registrations_for_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }
}
