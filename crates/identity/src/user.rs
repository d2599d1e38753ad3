use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradebook_core::{DomainError, DomainResult, Entity, TenantId, TenantScoped, UserId};

/// User role within a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

/// Actor identity. Belongs to exactly one company; owns its audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    /// Unique within the tenant; uniqueness is enforced by the store.
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn create(
        id: UserId,
        tenant_id: TenantId,
        input: &NewUser,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = input.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation(format!(
                "invalid email: '{}'",
                input.email
            )));
        }
        Ok(Self {
            id,
            tenant_id,
            email: email.to_string(),
            role: input.role,
            created_at,
        })
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for User {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_and_keeps_email() {
        let user = User::create(
            UserId::new(),
            TenantId::new(),
            &NewUser {
                email: " staff@acme.test ".to_string(),
                role: Role::Staff,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(user.email, "staff@acme.test");
        assert_eq!(user.role, Role::Staff);
    }

    #[test]
    fn create_rejects_malformed_email() {
        let err = User::create(
            UserId::new(),
            TenantId::new(),
            &NewUser {
                email: "not-an-email".to_string(),
                role: Role::Staff,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
