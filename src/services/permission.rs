//! Authorization policy for event operations

use std::fmt;

use crate::models::{Caller, Event};
use crate::utils::errors::EventManagementError;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const NOT_ORGANIZER: &str = "You do not have permission to perform this action.";

/// Operations on the event resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
    Register,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::PartialUpdate,
        Action::Destroy,
        Action::Register,
    ];

    /// Read-only actions with no persisted side effect
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }

    /// Actions restricted to the event's organizer
    pub fn requires_ownership(self) -> bool {
        matches!(self, Action::Update | Action::PartialUpdate | Action::Destroy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
            Action::Register => "register",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    /// The caller presented a token that cannot be used
    InvalidToken(String),
    NotOrganizer,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NotAuthenticated => "not_authenticated",
            DenyReason::InvalidToken(_) => "invalid_token",
            DenyReason::NotOrganizer => "not_organizer",
        }
    }
}

impl From<DenyReason> for EventManagementError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotAuthenticated => {
                EventManagementError::Unauthenticated(NOT_AUTHENTICATED.to_string())
            }
            DenyReason::InvalidToken(message) => EventManagementError::InvalidToken(message),
            DenyReason::NotOrganizer => EventManagementError::Forbidden(NOT_ORGANIZER.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Two-stage permission check: once per request, then once per target object
pub trait AuthorizationPolicy: Send + Sync {
    fn has_permission(&self, action: Action, caller: &Caller) -> Decision;

    fn has_object_permission(&self, action: Action, caller: &Caller, event: &Event) -> Decision;
}

/// Reads are open; writes need a login; changes need the organizer
#[derive(Debug, Clone, Copy, Default)]
pub struct EventPolicy;

impl AuthorizationPolicy for EventPolicy {
    fn has_permission(&self, action: Action, caller: &Caller) -> Decision {
        if action.is_safe() {
            return Decision::Allow;
        }
        match caller {
            Caller::Authenticated(_) => Decision::Allow,
            Caller::Anonymous => Decision::Deny(DenyReason::NotAuthenticated),
            Caller::InvalidToken(reason) => Decision::Deny(DenyReason::InvalidToken(reason.clone())),
        }
    }

    fn has_object_permission(&self, action: Action, caller: &Caller, event: &Event) -> Decision {
        if action.is_safe() {
            return Decision::Allow;
        }
        if !action.requires_ownership() {
            return self.has_permission(action, caller);
        }
        match caller.user_id() {
            Some(user_id) if user_id == event.organizer => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::NotOrganizer),
            None => self.has_permission(action, caller),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthUser;
    use chrono::Utc;
    use proptest::prelude::*;

    fn event(organizer: i64) -> Event {
        Event {
            id: 1,
            title: "Conf".into(),
            description: "Talks".into(),
            date: Utc::now(),
            location: "Kyiv".into(),
            organizer,
        }
    }

    fn user(id: i64) -> Caller {
        Caller::Authenticated(AuthUser {
            id,
            username: format!("user{}", id),
            email: String::new(),
        })
    }

    #[test]
    fn test_safe_actions_allow_everyone() {
        let policy = EventPolicy;
        for caller in [Caller::Anonymous, Caller::InvalidToken("expired".into()), user(3)] {
            assert!(policy.has_permission(Action::List, &caller).is_allowed());
            assert!(policy
                .has_object_permission(Action::Retrieve, &caller, &event(1))
                .is_allowed());
        }
    }

    #[test]
    fn test_writes_need_authentication() {
        let policy = EventPolicy;
        assert_eq!(
            policy.has_permission(Action::Create, &Caller::Anonymous),
            Decision::Deny(DenyReason::NotAuthenticated)
        );
        assert_eq!(
            policy.has_permission(Action::Register, &Caller::InvalidToken("bad".into())),
            Decision::Deny(DenyReason::InvalidToken("bad".into()))
        );
        assert!(policy.has_permission(Action::Create, &user(1)).is_allowed());
    }

    #[test]
    fn test_register_has_no_ownership_requirement() {
        let policy = EventPolicy;
        assert!(policy
            .has_object_permission(Action::Register, &user(2), &event(1))
            .is_allowed());
    }

    #[test]
    fn test_deny_reason_maps_to_error() {
        let err: EventManagementError = DenyReason::NotOrganizer.into();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        let err: EventManagementError = DenyReason::NotAuthenticated.into();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    proptest! {
        #[test]
        fn prop_only_organizer_may_change(caller_id in 1i64..50, organizer in 1i64..50) {
            let policy = EventPolicy;
            let target = event(organizer);
            for action in [Action::Update, Action::PartialUpdate, Action::Destroy] {
                let decision = policy.has_object_permission(action, &user(caller_id), &target);
                if caller_id == organizer {
                    prop_assert_eq!(decision, Decision::Allow);
                } else {
                    prop_assert_eq!(decision, Decision::Deny(DenyReason::NotOrganizer));
                }
            }
        }

        #[test]
        fn prop_anonymous_only_reads(index in 0usize..7, organizer in 1i64..50) {
            let policy = EventPolicy;
            let action = Action::ALL[index];
            let decision = policy.has_object_permission(action, &Caller::Anonymous, &event(organizer));
            prop_assert_eq!(decision.is_allowed(), action.is_safe());
        }
    }
}
