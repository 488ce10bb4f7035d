use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;

/// Per-user flag controlling whether others may send meetup requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "availability", rename_all = "lowercase")]
pub enum Availability {
    Available,
    Busy,
}

/// Customizable penguin avatar, persisted as a JSONB record. Field names on
/// the wire stay camelCase for the existing SPA client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Avatar {
    pub body_color: String,
    pub belly_color: String,
    pub hat_color: String,
    pub hat_style: String,
    pub accessory: String,
    pub eye_style: String,
    pub beak_color: String,
    pub background_color: String,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            body_color: "#2C3E50".into(),
            belly_color: "#FFFFFF".into(),
            hat_color: "#E74C3C".into(),
            hat_style: "beanie".into(),
            accessory: "none".into(),
            eye_style: "happy".into(),
            beak_color: "#FF9800".into(),
            background_color: "#87CEEB".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub year: String,
    pub bio: String,
    pub avatar: Json<Avatar>,
    pub status: Availability,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, email, password_hash, name, year, bio, avatar, status, created_at, updated_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        name: &str,
        year: &str,
        bio: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, year, bio, avatar, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'available')
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(year)
        .bind(bio)
        .bind(Json(Avatar::default()))
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// All users except `exclude_id`, newest first, with optional cohort-year
    /// and availability filters.
    pub async fn list(
        db: &PgPool,
        exclude_id: i64,
        year: Option<&str>,
        status: Option<Availability>,
    ) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id != $1
              AND ($2::text IS NULL OR year = $2)
              AND ($3::availability IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#
        ))
        .bind(exclude_id)
        .bind(year)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Applies only the provided fields; absent ones keep their value.
    pub async fn update_profile(
        db: &PgPool,
        id: i64,
        bio: Option<&str>,
        status: Option<Availability>,
        avatar: Option<&Avatar>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET bio = COALESCE($2, bio),
                status = COALESCE($3, status),
                avatar = COALESCE($4, avatar),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(bio)
        .bind(status)
        .bind(avatar.map(|a| Json(a.clone())))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_avatar_matches_client_palette() {
        let avatar = Avatar::default();
        assert_eq!(avatar.body_color, "#2C3E50");
        assert_eq!(avatar.hat_style, "beanie");
        assert_eq!(avatar.accessory, "none");
    }

    #[test]
    fn avatar_serializes_camel_case() {
        let json = serde_json::to_value(Avatar::default()).unwrap();
        assert!(json.get("bodyColor").is_some());
        assert!(json.get("backgroundColor").is_some());
        assert!(json.get("body_color").is_none());
    }

    #[test]
    fn avatar_deserialize_fills_missing_fields_with_defaults() {
        let avatar: Avatar = serde_json::from_str(r##"{"bodyColor": "#000000"}"##).unwrap();
        assert_eq!(avatar.body_color, "#000000");
        assert_eq!(avatar.belly_color, "#FFFFFF");
    }

    #[test]
    fn availability_uses_lowercase_wire_values() {
        assert_eq!(
            serde_json::to_string(&Availability::Available).unwrap(),
            r#""available""#
        );
        let busy: Availability = serde_json::from_str(r#""busy""#).unwrap();
        assert_eq!(busy, Availability::Busy);
    }

    #[test]
    fn user_never_serializes_password_hash() {
        let user = User {
            id: 1,
            email: "a@x.edu".into(),
            password_hash: "supersecret".into(),
            name: "A".into(),
            year: "M&T 2026".into(),
            bio: String::new(),
            avatar: Json(Avatar::default()),
            status: Availability::Available,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("supersecret"));
        assert!(!json.contains("password_hash"));
    }
}
