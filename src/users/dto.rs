use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;

/// Input staged by the create form, before it becomes a `NewUser`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CreateUserDto {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CreateUserDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserDto")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_never_carries_password() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: "dealer".into(),
            email: "dealer@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("dealer@example.com"));
        assert!(json.contains("created_at"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn dto_debug_redacts_password() {
        let dto = CreateUserDto {
            username: "dealer".into(),
            email: "dealer@example.com".into(),
            password: "hunter2hunter2".into(),
        };
        let printed = format!("{dto:?}");
        assert!(!printed.contains("hunter2"));
    }
}
