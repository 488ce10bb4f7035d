use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::users::dto::UserSummary;

use super::repo::{iso_date, Event, EventType, EventWithMeta};

#[derive(Debug, Deserialize)]
pub struct CreateEventBody {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub time: String,
    pub location: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub upcoming: Option<String>,
    #[serde(default)]
    pub my_events: Option<String>,
}

impl ListEventsQuery {
    // The SPA sends these as the literal string "true".
    pub fn upcoming_only(&self) -> bool {
        self.upcoming.as_deref() == Some("true")
    }

    pub fn mine_only(&self) -> bool {
        self.my_events.as_deref() == Some("true")
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event: Event,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub message: String,
}

/// Listing row annotated with the host summary and attendance facts.
#[derive(Debug, Serialize)]
pub struct EnrichedEvent {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub host_id: i64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub time: String,
    pub location: String,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub host: UserSummary,
    pub attendees_count: i64,
    pub is_attending: bool,
}

impl From<EventWithMeta> for EnrichedEvent {
    fn from(e: EventWithMeta) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            event_type: e.event_type,
            host_id: e.host_id,
            date: e.date,
            time: e.time,
            location: e.location,
            is_public: e.is_public,
            created_at: e.created_at,
            host: UserSummary {
                id: e.host_id,
                name: e.host_name,
                year: e.host_year,
                avatar: e.host_avatar,
            },
            attendees_count: e.attendees_count,
            is_attending: e.is_attending,
        }
    }
}

/// Single-event view: the enriched shape plus the full roster.
#[derive(Debug, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: EnrichedEvent,
    pub attendees: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_is_public_defaults_true() {
        let b: CreateEventBody = serde_json::from_str(
            r#"{"title": "Dim sum run", "description": "Chinatown", "type": "meal",
                "date": "2026-09-12", "time": "12:30", "location": "Race St"}"#,
        )
        .unwrap();
        assert!(b.is_public);
        assert_eq!(b.event_type, EventType::Meal);
        assert_eq!(b.date, time::macros::date!(2026 - 09 - 12));
    }

    #[test]
    fn list_query_flags_parse_string_true() {
        let q: ListEventsQuery =
            serde_json::from_str(r#"{"upcoming": "true", "my_events": "false"}"#).unwrap();
        assert!(q.upcoming_only());
        assert!(!q.mine_only());
    }
}
