use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};

use crate::users::dto::UserSummary;
use crate::users::repo::Avatar;

/// Serde adapter keeping event dates as `YYYY-MM-DD` strings on the wire;
/// `time::Date`'s stock representation is a year/ordinal pair.
pub mod iso_date {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::{format_description::FormatItem, macros::format_description, Date};

    const FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let s = date.format(FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, FORMAT).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "event_type", rename_all = "lowercase")]
pub enum EventType {
    Coffee,
    Meal,
    Study,
    Activity,
    Hangout,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
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
}

/// Event joined with host columns and attendance annotations for the caller.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithMeta {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub host_id: i64,
    pub date: Date,
    pub time: String,
    pub location: String,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub host_name: String,
    pub host_year: String,
    pub host_avatar: Json<Avatar>,
    pub attendees_count: i64,
    pub is_attending: bool,
}

const EVENT_COLUMNS: &str =
    "id, title, description, type AS event_type, host_id, date, time, location, is_public, created_at";

impl Event {
    /// Inserts the event and the host's attendance row in one transaction;
    /// neither exists unless both succeed.
    pub async fn create(
        db: &PgPool,
        host_id: i64,
        title: &str,
        description: &str,
        event_type: EventType,
        date: Date,
        time: &str,
        location: &str,
        is_public: bool,
    ) -> anyhow::Result<Event> {
        let mut tx = db.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, type, host_id, date, time, location, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(description)
        .bind(event_type)
        .bind(host_id)
        .bind(date)
        .bind(time)
        .bind(location)
        .bind(is_public)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2)")
            .bind(event.id)
            .bind(host_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(event)
    }

    /// Events visible to `user_id`: public ones, hosted ones, or attended
    /// ones. Ordered by date, then time.
    pub async fn list_visible(
        db: &PgPool,
        user_id: i64,
        event_type: Option<EventType>,
        upcoming_only: bool,
        mine_only: bool,
    ) -> anyhow::Result<Vec<EventWithMeta>> {
        let rows = sqlx::query_as::<_, EventWithMeta>(
            r#"
            SELECT e.id, e.title, e.description, e.type AS event_type, e.host_id,
                   e.date, e.time, e.location, e.is_public, e.created_at,
                   u.name AS host_name, u.year AS host_year, u.avatar AS host_avatar,
                   (SELECT COUNT(*) FROM event_attendees ea
                     WHERE ea.event_id = e.id) AS attendees_count,
                   EXISTS(SELECT 1 FROM event_attendees ea
                           WHERE ea.event_id = e.id AND ea.user_id = $1) AS is_attending
            FROM events e
            JOIN users u ON u.id = e.host_id
            WHERE (e.is_public OR e.host_id = $1 OR EXISTS(
                    SELECT 1 FROM event_attendees ea
                     WHERE ea.event_id = e.id AND ea.user_id = $1))
              AND ($2::event_type IS NULL OR e.type = $2)
              AND (NOT $3 OR e.date >= CURRENT_DATE)
              AND (NOT $4 OR EXISTS(
                    SELECT 1 FROM event_attendees ea
                     WHERE ea.event_id = e.id AND ea.user_id = $1))
            ORDER BY e.date ASC, e.time ASC
            "#,
        )
        .bind(user_id)
        .bind(event_type)
        .bind(upcoming_only)
        .bind(mine_only)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_with_meta(
        db: &PgPool,
        id: i64,
        user_id: i64,
    ) -> anyhow::Result<Option<EventWithMeta>> {
        let row = sqlx::query_as::<_, EventWithMeta>(
            r#"
            SELECT e.id, e.title, e.description, e.type AS event_type, e.host_id,
                   e.date, e.time, e.location, e.is_public, e.created_at,
                   u.name AS host_name, u.year AS host_year, u.avatar AS host_avatar,
                   (SELECT COUNT(*) FROM event_attendees ea
                     WHERE ea.event_id = e.id) AS attendees_count,
                   EXISTS(SELECT 1 FROM event_attendees ea
                           WHERE ea.event_id = e.id AND ea.user_id = $2) AS is_attending
            FROM events e
            JOIN users u ON u.id = e.host_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn attendees(db: &PgPool, event_id: i64) -> anyhow::Result<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.year, u.avatar
            FROM event_attendees ea
            JOIN users u ON u.id = ea.user_id
            WHERE ea.event_id = $1
            ORDER BY ea.joined_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn exists(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(found.is_some())
    }

    /// Returns false when the user already attends.
    pub async fn add_attendee(db: &PgPool, event_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when there was no attendance row to remove.
    pub async fn remove_attendee(db: &PgPool, event_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM event_attendees WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Host-only delete; attendance rows cascade. Returns false when the
    /// event is absent or `host_id` is not the host.
    pub async fn delete_by_host(db: &PgPool, id: i64, host_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND host_id = $2")
            .bind(id)
            .bind(host_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_uses_lowercase_wire_values() {
        assert_eq!(
            serde_json::to_string(&EventType::Hangout).unwrap(),
            r#""hangout""#
        );
        let t: EventType = serde_json::from_str(r#""study""#).unwrap();
        assert_eq!(t, EventType::Study);
    }

    #[test]
    fn event_serializes_type_field_name() {
        let event = Event {
            id: 1,
            title: "Board games".into(),
            description: "Bring snacks".into(),
            event_type: EventType::Hangout,
            host_id: 2,
            date: time::macros::date!(2026 - 09 - 01),
            time: "18:00".into(),
            location: "Huntsman Hall".into(),
            is_public: true,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "hangout");
        assert!(json.get("event_type").is_none());
    }

    #[test]
    fn event_date_serializes_as_iso_string() {
        let event = Event {
            id: 1,
            title: "Coffee crawl".into(),
            description: "Three shops".into(),
            event_type: EventType::Coffee,
            host_id: 2,
            date: time::macros::date!(2026 - 09 - 12),
            time: "10:00".into(),
            location: "Walnut St".into(),
            is_public: true,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["date"], "2026-09-12");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back.date, event.date);
    }
}
