use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradebook_catalog::SupplierId;
use tradebook_core::{DomainError, DomainResult, Entity, TenantId, TenantScoped};

/// Container identifier (tenant-scoped via the owning row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(Uuid);

impl ContainerId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Shipment lifecycle tag.
///
/// The tag is caller-driven; it is NOT auto-transitioned when the last item
/// is fully received. Full receipt is a derived predicate (`fully_received`),
/// reported alongside the tag in `ReceivingStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Pending,
    Arrived,
    Cleared,
}

/// One ordered line of a container: how much was ordered, how much arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerItem {
    pub item_name: String,
    /// Ordered quantity.
    pub quantity: u64,
    /// Received so far. Invariant: `received_qty <= quantity`.
    pub received_qty: u64,
    /// Unit price in the smallest currency unit (cents).
    pub unit_price: i64,
}

impl ContainerItem {
    pub fn remaining(&self) -> u64 {
        self.quantity - self.received_qty
    }

    pub fn is_fully_received(&self) -> bool {
        self.received_qty == self.quantity
    }
}

/// One line of a receipt batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub item_name: String,
    pub received_delta: u64,
}

/// Derived receiving view of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivingStatus {
    pub status: ContainerStatus,
    pub fully_received: bool,
}

/// An inbound shipment from one supplier, owning its ordered item lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub tenant_id: TenantId,
    pub supplier_id: SupplierId,
    pub container_no: String,
    pub arrival_date: DateTime<Utc>,
    pub year: i32,
    pub status: ContainerStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ContainerItem>,
}

impl Container {
    pub fn create(
        id: ContainerId,
        tenant_id: TenantId,
        input: &NewContainer,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.container_no.trim().is_empty() {
            return Err(DomainError::validation("container number cannot be empty"));
        }

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            if line.item_name.trim().is_empty() {
                return Err(DomainError::validation("container item name cannot be empty"));
            }
            if items
                .iter()
                .any(|i: &ContainerItem| i.item_name == line.item_name)
            {
                return Err(DomainError::validation(format!(
                    "duplicate container item: '{}'",
                    line.item_name
                )));
            }
            if line.unit_price <= 0 {
                return Err(DomainError::InvalidAmount(line.unit_price));
            }
            items.push(ContainerItem {
                item_name: line.item_name.clone(),
                quantity: line.quantity,
                received_qty: 0,
                unit_price: line.unit_price,
            });
        }

        Ok(Self {
            id,
            tenant_id,
            supplier_id: input.supplier_id,
            container_no: input.container_no.clone(),
            arrival_date: input.arrival_date,
            year: input.year,
            status: input.status,
            created_at,
            items,
        })
    }

    pub fn find_item(&self, item_name: &str) -> Option<&ContainerItem> {
        self.items.iter().find(|i| i.item_name == item_name)
    }

    /// Whether every ordered line has been received in full.
    pub fn fully_received(&self) -> bool {
        self.items.iter().all(ContainerItem::is_fully_received)
    }

    pub fn receiving_status(&self) -> ReceivingStatus {
        ReceivingStatus {
            status: self.status,
            fully_received: self.fully_received(),
        }
    }

    /// Apply a receipt batch: increase `received_qty` per line.
    ///
    /// All-or-nothing: every line is validated against the post-batch totals
    /// before anything is written, so a failing line leaves the container
    /// untouched. Duplicate item names within one batch accumulate before the
    /// bound check.
    ///
    /// Errors: `UnknownItem` if a line names an item this container does not
    /// carry; `OverReceipt` if any accumulated delta would push an item past
    /// its ordered quantity (including deltas too large to even add without
    /// wrapping).
    pub fn receive(&mut self, lines: &[ReceiptLine]) -> DomainResult<()> {
        // Plan phase: fold duplicate lines into one delta per item.
        // Accumulated wide, so a huge caller-supplied delta cannot wrap.
        let mut deltas: HashMap<&str, u128> = HashMap::new();
        for line in lines {
            *deltas.entry(line.item_name.as_str()).or_insert(0) +=
                u128::from(line.received_delta);
        }

        // Validate phase: every delta must fit within the ordered quantity.
        let mut planned: Vec<(usize, u64)> = Vec::with_capacity(deltas.len());
        for (name, delta) in deltas {
            let idx = self
                .items
                .iter()
                .position(|i| i.item_name == name)
                .ok_or_else(|| DomainError::unknown_item(name))?;
            let item = &self.items[idx];
            let fits = u64::try_from(delta)
                .ok()
                .and_then(|d| item.received_qty.checked_add(d))
                .is_some_and(|total| total <= item.quantity);
            if !fits {
                return Err(DomainError::OverReceipt {
                    item_name: item.item_name.clone(),
                    ordered: item.quantity,
                    received: item.received_qty,
                    delta: u64::try_from(delta).unwrap_or(u64::MAX),
                });
            }
            planned.push((idx, delta as u64));
        }

        // Apply phase: infallible.
        for (idx, delta) in planned {
            self.items[idx].received_qty += delta;
        }
        Ok(())
    }
}

impl Entity for Container {
    type Id = ContainerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Container {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Input for registering a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContainer {
    pub supplier_id: SupplierId,
    pub container_no: String,
    pub arrival_date: DateTime<Utc>,
    pub year: i32,
    pub status: ContainerStatus,
    pub items: Vec<NewContainerItem>,
}

/// One ordered line of a new container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContainerItem {
    pub item_name: String,
    pub quantity: u64,
    pub unit_price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn container_with(items: &[(&str, u64)]) -> Container {
        Container::create(
            ContainerId::new(),
            TenantId::new(),
            &NewContainer {
                supplier_id: SupplierId::new(),
                container_no: "CNT-001".to_string(),
                arrival_date: Utc::now(),
                year: 2026,
                status: ContainerStatus::Pending,
                items: items
                    .iter()
                    .map(|(name, qty)| NewContainerItem {
                        item_name: name.to_string(),
                        quantity: *qty,
                        unit_price: 500,
                    })
                    .collect(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn line(name: &str, delta: u64) -> ReceiptLine {
        ReceiptLine {
            item_name: name.to_string(),
            received_delta: delta,
        }
    }

    #[test]
    fn receive_within_ordered_quantity_succeeds() {
        let mut container = container_with(&[("WidgetA", 100)]);
        container.receive(&[line("WidgetA", 40)]).unwrap();
        let item = container.find_item("WidgetA").unwrap();
        assert_eq!(item.received_qty, 40);
        assert_eq!(item.remaining(), 60);
    }

    #[test]
    fn over_receipt_is_rejected_and_leaves_state_unchanged() {
        let mut container = container_with(&[("WidgetA", 100)]);
        container.receive(&[line("WidgetA", 40)]).unwrap();

        let err = container.receive(&[line("WidgetA", 70)]).unwrap_err();
        assert_eq!(
            err,
            DomainError::OverReceipt {
                item_name: "WidgetA".to_string(),
                ordered: 100,
                received: 40,
                delta: 70,
            }
        );
        assert_eq!(container.find_item("WidgetA").unwrap().received_qty, 40);
    }

    #[test]
    fn unknown_item_fails_the_whole_batch() {
        let mut container = container_with(&[("WidgetA", 100), ("WidgetB", 50)]);

        let err = container
            .receive(&[line("WidgetA", 10), line("WidgetC", 5)])
            .unwrap_err();
        assert_eq!(err, DomainError::unknown_item("WidgetC"));
        // Nothing from the batch landed, including the valid line.
        assert_eq!(container.find_item("WidgetA").unwrap().received_qty, 0);
    }

    #[test]
    fn duplicate_lines_in_one_batch_accumulate_before_the_bound_check() {
        let mut container = container_with(&[("WidgetA", 100)]);

        let err = container
            .receive(&[line("WidgetA", 60), line("WidgetA", 60)])
            .unwrap_err();
        assert!(matches!(err, DomainError::OverReceipt { delta: 120, .. }));
        assert_eq!(container.find_item("WidgetA").unwrap().received_qty, 0);

        container
            .receive(&[line("WidgetA", 60), line("WidgetA", 40)])
            .unwrap();
        assert!(container.fully_received());
    }

    #[test]
    fn near_max_delta_is_rejected_as_over_receipt_not_overflow() {
        let mut container = container_with(&[("WidgetA", 100)]);
        container.receive(&[line("WidgetA", 40)]).unwrap();

        let err = container
            .receive(&[line("WidgetA", u64::MAX - 10)])
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::OverReceipt {
                item_name: "WidgetA".to_string(),
                ordered: 100,
                received: 40,
                delta: u64::MAX - 10,
            }
        );
        assert_eq!(container.find_item("WidgetA").unwrap().received_qty, 40);
    }

    #[test]
    fn duplicate_max_deltas_cannot_wrap_below_the_bound() {
        let mut container = container_with(&[("WidgetA", 100)]);

        // Two u64::MAX lines wrap to a tiny sum under plain u64 addition;
        // the accumulated delta must still be rejected.
        let err = container
            .receive(&[line("WidgetA", u64::MAX), line("WidgetA", u64::MAX)])
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::OverReceipt {
                ordered: 100,
                received: 0,
                ..
            }
        ));
        assert_eq!(container.find_item("WidgetA").unwrap().received_qty, 0);
    }

    #[test]
    fn status_tag_does_not_auto_transition_on_full_receipt() {
        let mut container = container_with(&[("WidgetA", 10)]);
        container.receive(&[line("WidgetA", 10)]).unwrap();

        let status = container.receiving_status();
        assert_eq!(status.status, ContainerStatus::Pending);
        assert!(status.fully_received);
    }

    #[test]
    fn duplicate_item_names_are_rejected_at_creation() {
        let result = Container::create(
            ContainerId::new(),
            TenantId::new(),
            &NewContainer {
                supplier_id: SupplierId::new(),
                container_no: "CNT-002".to_string(),
                arrival_date: Utc::now(),
                year: 2026,
                status: ContainerStatus::Pending,
                items: vec![
                    NewContainerItem {
                        item_name: "WidgetA".to_string(),
                        quantity: 10,
                        unit_price: 100,
                    },
                    NewContainerItem {
                        item_name: "WidgetA".to_string(),
                        quantity: 5,
                        unit_price: 100,
                    },
                ],
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: applying the same set of valid deltas in any serialized
        /// order yields the same final received quantity, and the bound holds.
        #[test]
        fn serialized_receipt_order_does_not_matter(
            (deltas, shuffled) in prop::collection::vec(1u64..50, 1..8)
                .prop_flat_map(|deltas| {
                    let shuffled = Just(deltas.clone()).prop_shuffle();
                    (Just(deltas), shuffled)
                }),
        ) {
            let total: u64 = deltas.iter().sum();
            let mut forward = container_with(&[("WidgetA", total)]);
            for d in &deltas {
                forward.receive(&[line("WidgetA", *d)]).unwrap();
            }

            // Apply the same deltas in a shuffled order.
            let mut reordered = container_with(&[("WidgetA", total)]);
            for d in &shuffled {
                reordered.receive(&[line("WidgetA", *d)]).unwrap();
            }

            let a = forward.find_item("WidgetA").unwrap();
            let b = reordered.find_item("WidgetA").unwrap();
            prop_assert_eq!(a.received_qty, b.received_qty);
            prop_assert_eq!(a.received_qty, total);
            prop_assert!(a.received_qty <= a.quantity);
        }

        /// Property: `received_qty` never exceeds `quantity`, whatever mix of
        /// valid and over-large deltas is thrown at the container.
        #[test]
        fn received_qty_never_exceeds_ordered(
            ordered in 1u64..500,
            deltas in prop::collection::vec(1u64..200, 0..12),
        ) {
            let mut container = container_with(&[("WidgetA", ordered)]);
            for d in deltas {
                let before = container.find_item("WidgetA").unwrap().received_qty;
                match container.receive(&[line("WidgetA", d)]) {
                    Ok(()) => {}
                    Err(DomainError::OverReceipt { .. }) => {
                        // Rejected batch must leave the count unchanged.
                        let after = container.find_item("WidgetA").unwrap().received_qty;
                        prop_assert_eq!(before, after);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {}", other),
                }
                let item = container.find_item("WidgetA").unwrap();
                prop_assert!(item.received_qty <= item.quantity);
            }
        }
    }
}
