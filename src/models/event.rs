//! Event and registration models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::user::not_blank;
use crate::utils::errors::FieldErrors;
use crate::utils::helpers::parse_datetime;

const REQUIRED: &str = "This field is required.";
const INVALID_DATE: &str = "Enter a valid date/time.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    /// Id of the organizing user
    pub organizer: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer: i64,
}

/// Field changes for an update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

/// Request body for create, update and partial update.
///
/// `organizer` is not part of the body; a client-supplied value is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EventInput {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    /// Same formats as the `?date=` filter
    #[schema(value_type = Option<String>, format = DateTime, example = "2025-07-20T18:00:00Z")]
    pub date: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub location: Option<String>,
}

impl EventInput {
    fn field_errors(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };
        if self.date.as_deref().is_some_and(|raw| parse_datetime(raw).is_none()) {
            errors.add("date", INVALID_DATE);
        }
        errors
    }

    fn parsed_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_datetime)
    }

    /// Validate a create payload; every field is required
    pub fn into_new_event(self, organizer: i64) -> Result<NewEvent, FieldErrors> {
        let mut errors = self.field_errors();
        for (field, missing) in self.missing_fields() {
            if missing {
                errors.add(field, REQUIRED);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let date = self.parsed_date();
        match (self.title, self.description, date, self.location) {
            (Some(title), Some(description), Some(date), Some(location)) => Ok(NewEvent {
                title,
                description,
                date,
                location,
                organizer,
            }),
            _ => Err(FieldErrors::single("non_field_errors", REQUIRED)),
        }
    }

    /// Validate an update payload; `partial` allows any subset of fields
    pub fn into_changes(self, partial: bool) -> Result<EventChanges, FieldErrors> {
        let mut errors = self.field_errors();
        if !partial {
            for (field, missing) in self.missing_fields() {
                if missing {
                    errors.add(field, REQUIRED);
                }
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(EventChanges {
            date: self.parsed_date(),
            title: self.title,
            description: self.description,
            location: self.location,
        })
    }

    fn missing_fields(&self) -> [(&'static str, bool); 4] {
        [
            ("title", self.title.is_none()),
            ("description", self.description.is_none()),
            ("date", self.date.is_none()),
            ("location", self.location.is_none()),
        ]
    }
}

/// Raw query string of `GET /api/events/`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Exact event date-time (RFC 3339, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD`)
    pub date: Option<String>,
    /// Exact location
    pub location: Option<String>,
    /// Exact title
    pub title: Option<String>,
}

impl EventQuery {
    pub fn into_filter(self) -> Result<EventFilter, FieldErrors> {
        let date = match self.date.as_deref().filter(|d| !d.is_empty()) {
            Some(raw) => match parse_datetime(raw) {
                Some(parsed) => Some(parsed),
                None => return Err(FieldErrors::single("date", INVALID_DATE)),
            },
            None => None,
        };

        Ok(EventFilter {
            date,
            location: self.location.filter(|l| !l.is_empty()),
            title: self.title.filter(|t| !t.is_empty()),
        })
    }
}

/// Equality filters combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub title: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        self.date.map_or(true, |date| event.date == date)
            && self.location.as_ref().map_or(true, |location| &event.location == location)
            && self.title.as_ref().map_or(true, |title| &event.title == title)
    }
}

/// Result of the registration workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered(Registration),
    AlreadyRegistered(Registration),
}

impl RegistrationOutcome {
    pub fn registration(&self) -> &Registration {
        match self {
            RegistrationOutcome::Registered(r) | RegistrationOutcome::AlreadyRegistered(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered(_))
    }

    pub fn status(&self) -> RegistrationStatus {
        let status = match self {
            RegistrationOutcome::Registered(_) => "registered",
            RegistrationOutcome::AlreadyRegistered(_) => "already registered",
        };
        RegistrationStatus {
            status: status.to_string(),
        }
    }
}

/// Body returned by `POST /api/events/{id}/register/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationStatus {
    #[schema(example = "registered")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_input() -> EventInput {
        EventInput {
            title: Some("Conf".into()),
            description: Some("Talks".into()),
            date: Some("2025-07-20T18:00:00Z".into()),
            location: Some("Kyiv".into()),
        }
    }

    #[test]
    fn test_create_requires_every_field() {
        let errors = EventInput::default().into_new_event(1).unwrap_err();
        for field in ["title", "description", "date", "location"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]));
        }
    }

    #[test]
    fn test_create_binds_organizer() {
        let event = full_input().into_new_event(42).unwrap();
        assert_eq!(event.organizer, 42);
        assert_eq!(event.location, "Kyiv");
    }

    #[test]
    fn test_date_formats_in_body() {
        let expected = Utc.with_ymd_and_hms(2025, 7, 20, 18, 0, 0).unwrap();
        for raw in ["2025-07-20T18:00:00Z", "2025-07-20T18:00:00", "2025-07-20 18:00"] {
            let mut input = full_input();
            input.date = Some(raw.into());
            assert_eq!(input.into_new_event(1).unwrap().date, expected, "{}", raw);
        }

        let mut input = full_input();
        input.date = Some("someday".into());
        let errors = input.into_new_event(1).unwrap_err();
        assert_eq!(errors.get("date"), Some(&[INVALID_DATE.to_string()][..]));

        let patch = EventInput {
            date: Some("2025-13-40".into()),
            ..Default::default()
        };
        assert!(patch.into_changes(true).unwrap_err().get("date").is_some());
    }

    #[test]
    fn test_blank_and_oversized_fields() {
        let mut input = full_input();
        input.title = Some("   ".into());
        input.location = Some("x".repeat(256));
        let errors = input.into_new_event(1).unwrap_err();
        assert_eq!(errors.get("title"), Some(&["This field may not be blank.".to_string()][..]));
        assert!(errors.get("location").is_some());
    }

    #[test]
    fn test_partial_update_accepts_subset() {
        let input = EventInput {
            location: Some("Lviv".into()),
            ..Default::default()
        };
        let changes = input.clone().into_changes(true).unwrap();
        assert_eq!(changes.location.as_deref(), Some("Lviv"));
        assert!(changes.title.is_none());

        assert!(input.into_changes(false).is_err());
    }

    #[test]
    fn test_query_into_filter() {
        let filter = EventQuery {
            date: None,
            location: Some("Kyiv".into()),
            title: Some(String::new()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.location.as_deref(), Some("Kyiv"));
        assert!(filter.title.is_none());

        let errors = EventQuery {
            date: Some("not-a-date".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(errors.get("date").is_some());
    }

    #[test]
    fn test_filter_matches() {
        let event = Event {
            id: 1,
            title: "Conf".into(),
            description: "Talks".into(),
            date: Utc.with_ymd_and_hms(2025, 7, 20, 18, 0, 0).unwrap(),
            location: "Kyiv".into(),
            organizer: 1,
        };
        assert!(EventFilter::default().matches(&event));
        let kyiv = EventFilter {
            location: Some("Kyiv".into()),
            ..Default::default()
        };
        assert!(kyiv.matches(&event));
        let lviv = EventFilter {
            location: Some("Lviv".into()),
            ..Default::default()
        };
        assert!(!lviv.matches(&event));
    }
}
