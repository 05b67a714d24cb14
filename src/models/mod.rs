//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod caller;
pub mod event;
pub mod token;
pub mod user;

// Re-export commonly used models
pub use caller::{AuthUser, Caller};
pub use event::{
    Event, EventChanges, EventFilter, EventInput, EventQuery, NewEvent, Registration,
    RegistrationOutcome, RegistrationStatus,
};
pub use token::{AccessToken, TokenObtainRequest, TokenPair, TokenRefreshRequest};
pub use user::{NewUser, RegisterUserRequest, User, UserResponse};
