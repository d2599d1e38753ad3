use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tradebook_core::{DomainError, DomainResult, TenantId, UserId};

use crate::entry::AuditEntry;

/// In-memory append-only audit log, partitioned per tenant.
///
/// Deliberately lives outside the tenant arenas: dropping a company's
/// partition does not touch its trail. The only write path is `append`;
/// there is no update and no delete.
#[derive(Debug, Default)]
pub struct AuditLog {
    streams: RwLock<HashMap<TenantId, Vec<AuditEntry>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry to the tenant's stream and return it with its
    /// assigned sequence number.
    ///
    /// Validity of `user_id` is the caller's responsibility (the engine
    /// checks the actor against the tenant's user table before mutating).
    pub fn append(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        action_type: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: Uuid,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<AuditEntry> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| DomainError::validation("audit log lock poisoned"))?;

        let stream = streams.entry(tenant_id).or_default();
        let entry = AuditEntry {
            entry_id: Uuid::now_v7(),
            tenant_id,
            user_id,
            sequence_number: stream.len() as u64 + 1,
            action_type: action_type.into(),
            entity_type: entity_type.into(),
            entity_id,
            description: description.into(),
            occurred_at,
        };
        stream.push(entry.clone());
        Ok(entry)
    }

    /// The tenant's full trail, oldest first.
    pub fn trail(&self, tenant_id: TenantId) -> Vec<AuditEntry> {
        match self.streams.read() {
            Ok(streams) => streams.get(&tenant_id).cloned().unwrap_or_default(),
            Err(_) => vec![],
        }
    }

    /// Entries describing one entity.
    pub fn trail_for_entity(&self, tenant_id: TenantId, entity_id: Uuid) -> Vec<AuditEntry> {
        self.trail(tenant_id)
            .into_iter()
            .filter(|e| e.entity_id == entity_id)
            .collect()
    }

    pub fn len(&self, tenant_id: TenantId) -> usize {
        match self.streams.read() {
            Ok(streams) => streams.get(&tenant_id).map(Vec::len).unwrap_or(0),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self, tenant_id: TenantId) -> bool {
        self.len(tenant_id) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_monotonic_sequence_numbers_per_tenant() {
        let log = AuditLog::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let user = UserId::new();

        for i in 0..3 {
            let entry = log
                .append(
                    tenant_a,
                    user,
                    "customer.created",
                    "customer",
                    Uuid::now_v7(),
                    format!("customer {i}"),
                    Utc::now(),
                )
                .unwrap();
            assert_eq!(entry.sequence_number, i + 1);
        }

        let entry = log
            .append(
                tenant_b,
                user,
                "customer.created",
                "customer",
                Uuid::now_v7(),
                "first in its own stream",
                Utc::now(),
            )
            .unwrap();
        assert_eq!(entry.sequence_number, 1);

        assert_eq!(log.len(tenant_a), 3);
        assert_eq!(log.len(tenant_b), 1);
    }

    #[test]
    fn trail_for_entity_filters_by_entity_id() {
        let log = AuditLog::new();
        let tenant_id = TenantId::new();
        let user = UserId::new();
        let sale_id = Uuid::now_v7();

        log.append(tenant_id, user, "sale.recorded", "sale", sale_id, "", Utc::now())
            .unwrap();
        log.append(
            tenant_id,
            user,
            "payment.recorded",
            "payment",
            Uuid::now_v7(),
            "",
            Utc::now(),
        )
        .unwrap();

        let trail = log.trail_for_entity(tenant_id, sale_id);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action_type, "sale.recorded");
    }
}
