use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

use super::repo::{Availability, Avatar, User};

/// User as seen by other members: no email, no password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub year: String,
    pub bio: String,
    pub avatar: Avatar,
    pub status: Availability,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            year: u.year,
            bio: u.bio,
            avatar: u.avatar.0,
            status: u.status,
            created_at: u.created_at,
        }
    }
}

/// The caller's own profile, as returned by signup/login and profile updates.
#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub year: String,
    pub bio: String,
    pub avatar: Avatar,
    pub status: Availability,
}

impl From<User> for ProfileUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            year: u.year,
            bio: u.bio,
            avatar: u.avatar.0,
            status: u.status,
        }
    }
}

/// Compact user shape embedded in request and event payloads.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub year: String,
    pub avatar: Json<Avatar>,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub year: Option<String>,
    pub status: Option<Availability>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub status: Option<Availability>,
    pub avatar: Option<Avatar>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedProfileResponse {
    pub user: ProfileUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_accepts_status_filter() {
        let q: ListUsersQuery = serde_json::from_str(r#"{"status": "busy"}"#).unwrap();
        assert_eq!(q.status, Some(Availability::Busy));
        assert!(q.year.is_none());
    }

    #[test]
    fn update_request_all_fields_optional() {
        let r: UpdateProfileRequest = serde_json::from_str("{}").unwrap();
        assert!(r.bio.is_none() && r.status.is_none() && r.avatar.is_none());
    }
}
