use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradebook_core::{DomainError, DomainResult, Entity, TenantId, TenantScoped};

use crate::user::NewUser;

/// The tenant root. Everything below a company (users, suppliers, containers,
/// customers, sales, payments) lives in that company's arena partition and is
/// destroyed with it. The audit trail is the exception; it survives
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: TenantId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn create(id: TenantId, input: &NewCompany, created_at: DateTime<Utc>) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }
        Ok(Self {
            id,
            name: input.name.clone(),
            address: input.address.clone(),
            phone: input.phone.clone(),
            created_at,
        })
    }
}

impl Entity for Company {
    type Id = TenantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Company {
    fn tenant_id(&self) -> TenantId {
        self.id
    }
}

/// Input for company onboarding.
///
/// A company is created together with its first admin user, so the creation
/// itself has an actor to attribute on the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub admin: NewUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;

    fn input(name: &str) -> NewCompany {
        NewCompany {
            name: name.to_string(),
            address: None,
            phone: None,
            admin: NewUser {
                email: "owner@example.com".to_string(),
                role: Role::Admin,
            },
        }
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Company::create(TenantId::new(), &input("  "), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn company_is_its_own_tenant() {
        let id = TenantId::new();
        let company = Company::create(id, &input("Acme Trading"), Utc::now()).unwrap();
        assert_eq!(company.tenant_id(), id);
    }
}
