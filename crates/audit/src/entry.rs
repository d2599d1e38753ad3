use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradebook_core::{TenantId, TenantScoped, UserId};

/// One immutable audit fact: who did what to which entity, when.
///
/// `sequence_number` is assigned by the log on append and is monotonically
/// increasing per tenant stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: Uuid,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sequence_number: u64,
    /// What happened, e.g. "sale.recorded", "container.items_received".
    pub action_type: String,
    /// Which kind of row it happened to, e.g. "sale", "container".
    pub entity_type: String,
    pub entity_id: Uuid,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl TenantScoped for AuditEntry {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
