use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;

use crate::users::repo::Avatar;

/// Lifecycle of a coffee request: `pending` settles exactly once into
/// `accepted` or `declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoffeeRequest {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub location: String,
    pub time_options: Json<Vec<String>>,
    pub message: String,
    pub status: RequestStatus,
    pub response_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub responded_at: Option<OffsetDateTime>,
}

/// A request joined with compact sender/recipient columns for listing.
#[derive(Debug, Clone, FromRow)]
pub struct RequestWithUsers {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub location: String,
    pub time_options: Json<Vec<String>>,
    pub message: String,
    pub status: RequestStatus,
    pub response_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub responded_at: Option<OffsetDateTime>,
    pub from_name: String,
    pub from_year: String,
    pub from_avatar: Json<Avatar>,
    pub to_name: String,
    pub to_year: String,
    pub to_avatar: Json<Avatar>,
}

const REQUEST_COLUMNS: &str = "id, from_user_id, to_user_id, location, time_options, message, \
     status, response_message, created_at, responded_at";

impl CoffeeRequest {
    pub async fn create(
        db: &PgPool,
        from_user_id: i64,
        to_user_id: i64,
        location: &str,
        time_options: &[String],
        message: &str,
    ) -> anyhow::Result<CoffeeRequest> {
        let request = sqlx::query_as::<_, CoffeeRequest>(&format!(
            r#"
            INSERT INTO coffee_requests (from_user_id, to_user_id, location, time_options, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(location)
        .bind(Json(time_options.to_vec()))
        .bind(message)
        .fetch_one(db)
        .await?;
        Ok(request)
    }

    /// Requests where `user_id` is a party, newest first. `sent_only` /
    /// `received_only` narrow the direction; both false means both sides.
    pub async fn list_for_user(
        db: &PgPool,
        user_id: i64,
        sent_only: bool,
        received_only: bool,
        status: Option<RequestStatus>,
    ) -> anyhow::Result<Vec<RequestWithUsers>> {
        let rows = sqlx::query_as::<_, RequestWithUsers>(
            r#"
            SELECT r.id, r.from_user_id, r.to_user_id, r.location, r.time_options, r.message,
                   r.status, r.response_message, r.created_at, r.responded_at,
                   uf.name AS from_name, uf.year AS from_year, uf.avatar AS from_avatar,
                   ut.name AS to_name, ut.year AS to_year, ut.avatar AS to_avatar
            FROM coffee_requests r
            JOIN users uf ON uf.id = r.from_user_id
            JOIN users ut ON ut.id = r.to_user_id
            WHERE (r.from_user_id = $1 OR r.to_user_id = $1)
              AND (NOT $2 OR r.from_user_id = $1)
              AND (NOT $3 OR r.to_user_id = $1)
              AND ($4::request_status IS NULL OR r.status = $4)
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(sent_only)
        .bind(received_only)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Settles a pending request in one conditional update. Returns `None`
    /// when no row matched, which callers disambiguate via [`Self::find_for_recipient`].
    pub async fn respond(
        db: &PgPool,
        id: i64,
        recipient_id: i64,
        status: RequestStatus,
        response_message: &str,
    ) -> anyhow::Result<Option<CoffeeRequest>> {
        let request = sqlx::query_as::<_, CoffeeRequest>(&format!(
            r#"
            UPDATE coffee_requests
            SET status = $3, response_message = $4, responded_at = now()
            WHERE id = $1 AND to_user_id = $2 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(recipient_id)
        .bind(status)
        .bind(response_message)
        .fetch_optional(db)
        .await?;
        Ok(request)
    }

    pub async fn find_for_recipient(
        db: &PgPool,
        id: i64,
        recipient_id: i64,
    ) -> anyhow::Result<Option<CoffeeRequest>> {
        let request = sqlx::query_as::<_, CoffeeRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM coffee_requests WHERE id = $1 AND to_user_id = $2"
        ))
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(db)
        .await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_wire_values() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            r#""pending""#
        );
        let s: RequestStatus = serde_json::from_str(r#""declined""#).unwrap();
        assert_eq!(s, RequestStatus::Declined);
    }
}
