use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::AppError;

/// Wire format for `event_date` and `created_at`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored row of the `events` table.
///
/// `id` and `created_at` are owned by the database: `id` is assigned by the
/// sequence at insert, `created_at` defaults to the insertion instant.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "datetime_format")]
    pub event_date: NaiveDateTime,
    pub location: String,
    #[serde(with = "option_datetime_format")]
    pub created_at: Option<NaiveDateTime>,
}

/// A validated insert payload, ready for the database.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub location: String,
}

/// Raw `POST /events` body. Required fields are modelled as `Option` so a
/// missing field produces a validation error naming it rather than a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub location: Option<String>,
}

impl CreateEventRequest {
    pub fn validate(self) -> Result<NewEvent, AppError> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.event_date.is_none() {
            missing.push("event_date");
        }
        if self.location.is_none() {
            missing.push("location");
        }

        if let (Some(title), Some(event_date), Some(location)) =
            (self.title, self.event_date, self.location)
        {
            Ok(NewEvent {
                title,
                description: self.description,
                event_date: parse_event_date(&event_date)?,
                location,
            })
        } else {
            Err(AppError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Raw `PUT /events/{id}` body. Only fields present in the JSON change the
/// stored row. `description` distinguishes "absent" from an explicit `null`
/// so a client can clear it back to NULL.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub event_date: Option<String>,
    pub location: Option<String>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdateEventRequest {
    pub fn apply_to(self, event: &mut Event) -> Result<(), AppError> {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(raw) = self.event_date {
            event.event_date = parse_event_date(&raw)?;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        Ok(())
    }
}

pub fn parse_event_date(raw: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppError::ValidationError("Invalid event_date format. Use YYYY-MM-DD HH:MM:SS".to_string())
    })
}

mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    use super::DATE_FORMAT;

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(DATE_FORMAT).to_string())
    }
}

mod option_datetime_format {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    use super::DATE_FORMAT;

    pub fn serialize<S>(dt: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_str(&dt.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event_date_accepts_wire_format() {
        let parsed = parse_event_date("2024-05-01 10:00:00").unwrap();
        assert_eq!(parsed.format(DATE_FORMAT).to_string(), "2024-05-01 10:00:00");
    }

    #[test]
    fn test_parse_event_date_rejects_other_shapes() {
        assert!(parse_event_date("2024-05-01").is_err());
        assert!(parse_event_date("01/05/2024 10:00:00").is_err());
        assert!(parse_event_date("not a date").is_err());
    }

    #[test]
    fn test_validate_lists_all_missing_fields() {
        let request = CreateEventRequest {
            title: None,
            description: None,
            event_date: None,
            location: Some("HQ".to_string()),
        };

        let err = request.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("title"));
        assert!(message.contains("event_date"));
        assert!(!message.contains("location"));
    }

    #[test]
    fn test_validate_allows_missing_description() {
        let request = CreateEventRequest {
            title: Some("Launch".to_string()),
            description: None,
            event_date: Some("2024-05-01 10:00:00".to_string()),
            location: Some("HQ".to_string()),
        };

        let new_event = request.validate().unwrap();
        assert_eq!(new_event.title, "Launch");
        assert!(new_event.description.is_none());
    }

    #[test]
    fn test_event_serializes_dates_in_wire_format() {
        let event = Event {
            id: 1,
            title: "Launch".to_string(),
            description: None,
            event_date: parse_event_date("2024-05-01 10:00:00").unwrap(),
            location: "HQ".to_string(),
            created_at: Some(parse_event_date("2024-04-30 09:30:00").unwrap()),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_date"], json!("2024-05-01 10:00:00"));
        assert_eq!(value["created_at"], json!("2024-04-30 09:30:00"));
        assert_eq!(value["description"], json!(null));
    }

    #[test]
    fn test_update_changes_only_present_fields() {
        let mut event = Event {
            id: 7,
            title: "Launch".to_string(),
            description: Some("Product launch".to_string()),
            event_date: parse_event_date("2024-05-01 10:00:00").unwrap(),
            location: "HQ".to_string(),
            created_at: None,
        };

        let request = UpdateEventRequest {
            location: Some("Annex".to_string()),
            ..UpdateEventRequest::default()
        };
        request.apply_to(&mut event).unwrap();

        assert_eq!(event.location, "Annex");
        assert_eq!(event.title, "Launch");
        assert_eq!(event.description.as_deref(), Some("Product launch"));
    }

    #[test]
    fn test_update_distinguishes_null_description_from_absent() {
        let absent: UpdateEventRequest = serde_json::from_value(json!({})).unwrap();
        assert!(absent.description.is_none());

        let cleared: UpdateEventRequest =
            serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateEventRequest =
            serde_json::from_value(json!({ "description": "All hands" })).unwrap();
        assert_eq!(set.description, Some(Some("All hands".to_string())));
    }

    #[test]
    fn test_update_can_clear_description() {
        let mut event = Event {
            id: 7,
            title: "Launch".to_string(),
            description: Some("Product launch".to_string()),
            event_date: parse_event_date("2024-05-01 10:00:00").unwrap(),
            location: "HQ".to_string(),
            created_at: None,
        };

        let request = UpdateEventRequest {
            description: Some(None),
            ..UpdateEventRequest::default()
        };
        request.apply_to(&mut event).unwrap();

        assert!(event.description.is_none());
        assert_eq!(event.title, "Launch");
    }

    #[test]
    fn test_update_rejects_bad_date() {
        let mut event = Event {
            id: 7,
            title: "Launch".to_string(),
            description: None,
            event_date: parse_event_date("2024-05-01 10:00:00").unwrap(),
            location: "HQ".to_string(),
            created_at: None,
        };

        let request = UpdateEventRequest {
            event_date: Some("May 1st".to_string()),
            ..UpdateEventRequest::default()
        };
        assert!(request.apply_to(&mut event).is_err());
    }
}
