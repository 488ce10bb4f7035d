use serde::{Deserialize, Serialize};

use crate::users::dto::ProfileUser;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub year: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: ProfileUser,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_bio_defaults_to_none() {
        let r: SignupRequest = serde_json::from_str(
            r#"{"email": "a@x.edu", "password": "p1", "name": "A", "year": "M&T 2026"}"#,
        )
        .unwrap();
        assert!(r.bio.is_none());
        assert_eq!(r.year, "M&T 2026");
    }
}
