use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradebook_core::{DomainError, DomainResult, Entity, TenantId, TenantScoped};
use tradebook_ledger::CustomerId;
use tradebook_receiving::{Container, ContainerId};

/// Sale identifier (tenant-scoped via the owning row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(Uuid);

impl SaleId {
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

impl Default for SaleId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SaleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Where the sold stock came from.
///
/// Closed tagged union: resolution is an explicit `match`, never a
/// lookup-by-string. `Container` resolves to a shipment row within the
/// tenant; `Other` carries an opaque reference for stock sourced outside the
/// receiving ledger (direct purchases, transfers); no table backs it today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SaleSource {
    Container(ContainerId),
    Other { kind: String, reference: Uuid },
}

/// One sold line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub item_name: String,
    pub quantity: u64,
    /// Unit price in the smallest currency unit (cents).
    pub unit_price: i64,
}

/// A recorded sale. Owns its lines; `total_amount` is fixed at creation and
/// always equals the line sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub sale_type: String,
    pub source: SaleSource,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Build a sale from validated input, computing `total_amount` from the
    /// lines. Line validation and total computation are fused so no sale can
    /// exist whose total disagrees with its lines.
    pub fn create(
        id: SaleId,
        tenant_id: TenantId,
        input: &NewSale,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let items: Vec<SaleItem> = input
            .items
            .iter()
            .map(|line| SaleItem {
                item_name: line.item_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        let total_amount = compute_total(&items)?;

        Ok(Self {
            id,
            tenant_id,
            customer_id: input.customer_id,
            sale_type: input.sale_type.clone(),
            source: input.source.clone(),
            total_amount,
            created_at,
            items,
        })
    }

    /// Check that every line names an item the source container carries.
    ///
    /// Quantities are deliberately not compared against `received_qty`:
    /// receiving and selling are independently tracked ledgers, and a sale
    /// may be recorded against stock that has not fully arrived.
    pub fn validate_lines_against(&self, container: &Container) -> DomainResult<()> {
        for line in &self.items {
            if container.find_item(&line.item_name).is_none() {
                return Err(DomainError::unknown_item(&line.item_name));
            }
        }
        Ok(())
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Sale {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Compute a sale total from its lines.
///
/// Errors: `EmptySale` for zero lines; `InvalidAmount` for a non-positive
/// unit price; `Validation` for a zero quantity or arithmetic overflow.
pub fn compute_total(items: &[SaleItem]) -> DomainResult<i64> {
    if items.is_empty() {
        return Err(DomainError::EmptySale);
    }

    let mut total: i64 = 0;
    for item in items {
        if item.item_name.trim().is_empty() {
            return Err(DomainError::validation("sale item name cannot be empty"));
        }
        if item.unit_price <= 0 {
            return Err(DomainError::InvalidAmount(item.unit_price));
        }
        if item.quantity == 0 {
            return Err(DomainError::validation(format!(
                "sale line '{}' has zero quantity",
                item.item_name
            )));
        }
        let qty = i64::try_from(item.quantity)
            .map_err(|_| DomainError::validation("sale line quantity too large"))?;
        let line_total = qty
            .checked_mul(item.unit_price)
            .and_then(|lt| total.checked_add(lt))
            .ok_or_else(|| DomainError::validation("sale total overflows"))?;
        total = line_total;
    }
    Ok(total)
}

/// Input for recording a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_id: CustomerId,
    pub sale_type: String,
    pub source: SaleSource,
    pub items: Vec<NewSaleItem>,
}

/// One line of a new sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub item_name: String,
    pub quantity: u64,
    pub unit_price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tradebook_catalog::SupplierId;
    use tradebook_receiving::{ContainerStatus, NewContainer, NewContainerItem};

    fn item(name: &str, quantity: u64, unit_price: i64) -> SaleItem {
        SaleItem {
            item_name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    fn new_sale(items: Vec<NewSaleItem>) -> NewSale {
        NewSale {
            customer_id: CustomerId::new(),
            sale_type: "container".to_string(),
            source: SaleSource::Container(ContainerId::new()),
            items,
        }
    }

    #[test]
    fn total_is_the_sum_of_line_products() {
        let total = compute_total(&[item("WidgetA", 3, 100), item("WidgetB", 2, 250)]).unwrap();
        assert_eq!(total, 800);
    }

    #[test]
    fn empty_sale_is_rejected() {
        assert_eq!(compute_total(&[]).unwrap_err(), DomainError::EmptySale);
    }

    #[test]
    fn non_positive_unit_price_is_rejected() {
        let err = compute_total(&[item("WidgetA", 1, -5)]).unwrap_err();
        assert_eq!(err, DomainError::InvalidAmount(-5));
    }

    #[test]
    fn created_sale_carries_the_computed_total() {
        let sale = Sale::create(
            SaleId::new(),
            TenantId::new(),
            &new_sale(vec![NewSaleItem {
                item_name: "WidgetA".to_string(),
                quantity: 5,
                unit_price: 30,
            }]),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(sale.total_amount, 150);
        assert_eq!(sale.items.len(), 1);
    }

    #[test]
    fn sale_source_serializes_with_an_explicit_type_tag() {
        let container_id = ContainerId::new();
        let json = serde_json::to_value(SaleSource::Container(container_id)).unwrap();
        assert_eq!(json["type"], "container");
        assert_eq!(json["value"], container_id.to_string());

        let reference = Uuid::now_v7();
        let json = serde_json::to_value(SaleSource::Other {
            kind: "warehouse-transfer".to_string(),
            reference,
        })
        .unwrap();
        assert_eq!(json["type"], "other");
        assert_eq!(json["value"]["kind"], "warehouse-transfer");

        let back: SaleSource = serde_json::from_value(json).unwrap();
        assert_eq!(
            back,
            SaleSource::Other {
                kind: "warehouse-transfer".to_string(),
                reference,
            }
        );
    }

    #[test]
    fn container_sourced_lines_must_name_carried_items() {
        let tenant_id = TenantId::new();
        let container = Container::create(
            ContainerId::new(),
            tenant_id,
            &NewContainer {
                supplier_id: SupplierId::new(),
                container_no: "CNT-010".to_string(),
                arrival_date: Utc::now(),
                year: 2026,
                status: ContainerStatus::Arrived,
                items: vec![NewContainerItem {
                    item_name: "WidgetA".to_string(),
                    quantity: 100,
                    unit_price: 500,
                }],
            },
            Utc::now(),
        )
        .unwrap();

        let sale = Sale::create(
            SaleId::new(),
            tenant_id,
            &new_sale(vec![NewSaleItem {
                item_name: "WidgetZ".to_string(),
                quantity: 1,
                unit_price: 10,
            }]),
            Utc::now(),
        )
        .unwrap();

        let err = sale.validate_lines_against(&container).unwrap_err();
        assert_eq!(err, DomainError::unknown_item("WidgetZ"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any generated line set, the stored total equals the
        /// recomputed sum of `quantity * unit_price`.
        #[test]
        fn total_always_matches_line_sum(
            lines in prop::collection::vec((1u64..1_000, 1i64..10_000), 1..10)
        ) {
            let items: Vec<SaleItem> = lines
                .iter()
                .enumerate()
                .map(|(i, (q, p))| item(&format!("Item{i}"), *q, *p))
                .collect();

            let total = compute_total(&items).unwrap();
            let expected: i64 = items
                .iter()
                .map(|i| i.quantity as i64 * i.unit_price)
                .sum();
            prop_assert_eq!(total, expected);
        }
    }
}
