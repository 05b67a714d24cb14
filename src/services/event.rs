//! Event service implementation
//!
//! Every operation takes the caller explicitly and runs through the
//! [`AuthorizationPolicy`] before touching the store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::database::repositories::EventRepository;
use crate::models::{Caller, Event, EventInput, EventQuery, RegistrationOutcome};
use crate::services::notification::NotificationService;
use crate::services::permission::{Action, AuthorizationPolicy, Decision, DenyReason};
use crate::utils::errors::{EventManagementError, Result};
use crate::utils::logging::{log_event_action, log_permission_denied};

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    policy: Arc<dyn AuthorizationPolicy>,
    notifications: NotificationService,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        policy: Arc<dyn AuthorizationPolicy>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            events,
            policy,
            notifications,
        }
    }

    /// Request-level permission check
    pub fn authorize(&self, action: Action, caller: &Caller) -> Result<()> {
        match self.policy.has_permission(action, caller) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                log_permission_denied(action.as_str(), caller.user_id(), reason.as_str());
                Err(reason.into())
            }
        }
    }

    fn authorize_object(&self, action: Action, caller: &Caller, event: &Event) -> Result<()> {
        match self.policy.has_object_permission(action, caller, event) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                log_permission_denied(action.as_str(), caller.user_id(), reason.as_str());
                Err(reason.into())
            }
        }
    }

    async fn load(&self, id: i64) -> Result<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventManagementError::event_not_found(id))
    }

    pub async fn list(&self, query: EventQuery, caller: &Caller) -> Result<Vec<Event>> {
        self.authorize(Action::List, caller)?;
        let filter = query.into_filter().map_err(EventManagementError::Validation)?;
        let events = self.events.list(&filter).await?;
        debug!(count = events.len(), "Events listed");
        Ok(events)
    }

    pub async fn retrieve(&self, id: i64, caller: &Caller) -> Result<Event> {
        self.authorize(Action::Retrieve, caller)?;
        let event = self.load(id).await?;
        self.authorize_object(Action::Retrieve, caller, &event)?;
        Ok(event)
    }

    /// Create an event organized by the caller
    pub async fn create(&self, input: EventInput, caller: &Caller) -> Result<Event> {
        self.authorize(Action::Create, caller)?;
        let organizer = caller
            .user_id()
            .ok_or(DenyReason::NotAuthenticated)?;

        let new_event = input
            .into_new_event(organizer)
            .map_err(EventManagementError::Validation)?;
        let event = self.events.create(new_event).await?;

        log_event_action(event.id, Action::Create.as_str(), organizer, Some(&event.title));
        Ok(event)
    }

    /// Full (`partial = false`) or partial update by the organizer.
    ///
    /// `input` is the already-decoded body; a decode error is reported only
    /// after the event exists and the caller may change it.
    pub async fn update(
        &self,
        id: i64,
        input: Result<EventInput>,
        partial: bool,
        caller: &Caller,
    ) -> Result<Event> {
        let action = if partial { Action::PartialUpdate } else { Action::Update };
        self.authorize(action, caller)?;

        let event = self.load(id).await?;
        self.authorize_object(action, caller, &event)?;

        let changes = input?.into_changes(partial).map_err(EventManagementError::Validation)?;
        let updated = self
            .events
            .update(id, changes)
            .await?
            .ok_or_else(|| EventManagementError::event_not_found(id))?;

        log_event_action(id, action.as_str(), event.organizer, None);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, caller: &Caller) -> Result<()> {
        self.authorize(Action::Destroy, caller)?;

        let event = self.load(id).await?;
        self.authorize_object(Action::Destroy, caller, &event)?;

        if !self.events.delete(id).await? {
            return Err(EventManagementError::event_not_found(id));
        }

        log_event_action(id, Action::Destroy.as_str(), event.organizer, Some(&event.title));
        Ok(())
    }

    /// Register the caller for an event.
    ///
    /// The confirmation email goes out only after the row is stored and only
    /// for the call that created it. Delivery failures are logged and do not
    /// change the outcome.
    pub async fn register(&self, event_id: i64, caller: &Caller) -> Result<RegistrationOutcome> {
        self.authorize(Action::Register, caller)?;
        let user = caller
            .user()
            .ok_or(DenyReason::NotAuthenticated)?;

        let event = self.load(event_id).await?;
        self.authorize_object(Action::Register, caller, &event)?;

        let (registration, created) = self
            .events
            .get_or_create_registration(event.id, user.id)
            .await?;

        if !created {
            debug!(event_id = event.id, user_id = user.id, "Already registered");
            return Ok(RegistrationOutcome::AlreadyRegistered(registration));
        }

        log_event_action(event.id, Action::Register.as_str(), user.id, None);
        if let Err(e) = self.notifications.send_registration_confirmation(user, &event).await {
            warn!(
                event_id = event.id,
                user_id = user.id,
                error = %e,
                "Registration kept without confirmation email"
            );
        }

        info!(event_id = event.id, user_id = user.id, "User registered for event");
        Ok(RegistrationOutcome::Registered(registration))
    }

}
