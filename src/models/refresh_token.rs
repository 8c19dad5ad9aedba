use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A server-side refresh token row. The token string itself is opaque.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_at(expires_at: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            token: "opaque".to_string(),
            user_id: Uuid::new_v4(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry() {
        assert!(token_expiring_at(Utc::now() - Duration::minutes(1)).is_expired());
        assert!(!token_expiring_at(Utc::now() + Duration::hours(1)).is_expired());
    }
}
