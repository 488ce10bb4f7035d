use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::dto::UserSummary;

use super::repo::{CoffeeRequest, RequestStatus, RequestWithUsers};

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub to_user_id: i64,
    pub location: String,
    #[serde(default)]
    pub time_options: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Which side of the table the caller wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(rename = "type")]
    pub direction: Option<Direction>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub accepted: bool,
    #[serde(default)]
    pub response_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub request: CoffeeRequest,
}

/// Listing row with sender/recipient summaries attached.
#[derive(Debug, Serialize)]
pub struct EnrichedRequest {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub location: String,
    pub time_options: Vec<String>,
    pub message: String,
    pub status: RequestStatus,
    pub response_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub responded_at: Option<OffsetDateTime>,
    pub from: UserSummary,
    pub to: UserSummary,
}

impl From<RequestWithUsers> for EnrichedRequest {
    fn from(r: RequestWithUsers) -> Self {
        Self {
            id: r.id,
            from: UserSummary {
                id: r.from_user_id,
                name: r.from_name,
                year: r.from_year,
                avatar: r.from_avatar,
            },
            to: UserSummary {
                id: r.to_user_id,
                name: r.to_name,
                year: r.to_year,
                avatar: r.to_avatar,
            },
            from_user_id: r.from_user_id,
            to_user_id: r.to_user_id,
            location: r.location,
            time_options: r.time_options.0,
            message: r.message,
            status: r.status,
            response_message: r.response_message,
            created_at: r.created_at,
            responded_at: r.responded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_parses_direction_and_status() {
        let q: ListRequestsQuery =
            serde_json::from_str(r#"{"type": "sent", "status": "pending"}"#).unwrap();
        assert_eq!(q.direction, Some(Direction::Sent));
        assert_eq!(q.status, Some(RequestStatus::Pending));
    }

    #[test]
    fn create_body_defaults_are_empty() {
        let b: CreateRequestBody =
            serde_json::from_str(r#"{"to_user_id": 2, "location": "Saxbys"}"#).unwrap();
        assert!(b.time_options.is_empty());
        assert!(b.message.is_none());
    }
}
