//! Rate and addon aggregation: turning heterogeneous charge-adjustment
//! lines into a priced total per occupancy cell.
//!
//! Rate lines group by (adjustment type, tax kind, cancel-fee flag) so
//! multiple source lines collapse into one charge row per distinct
//! combination. Addon totals are kept separate from the rate total; their
//! sum is the cell price.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cell::{AddonLine, AdjustmentType, RateLine, TaxKind};

/// Whether percentage line prices are rounded to whole currency units.
///
/// `Exact` exists for internal recomputation passes that must stay exact;
/// presentation and storage paths use `Round`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Round percentage results to whole currency units.
    #[default]
    Round,
    /// Keep percentage results exact.
    Exact,
}

/// Applies the rounding policy to a computed amount.
#[must_use]
pub fn round_or_not(value: Decimal, policy: RoundingPolicy) -> Decimal {
    match policy {
        RoundingPolicy::Round => {
            value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
        RoundingPolicy::Exact => value,
    }
}

/// One aggregated charge row: all source rate lines sharing the same
/// (adjustment, tax, cancel-fee) combination collapsed into one price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCharge {
    /// The shared adjustment type of the group.
    pub adjustment: AdjustmentType,
    /// The shared tax kind of the group.
    pub tax_kind: TaxKind,
    /// The shared cancel-fee flag of the group.
    pub include_in_cancel_fee: bool,
    /// The group's summed price.
    pub price: Decimal,
}

/// Aggregates raw rate lines into one charge row per distinct
/// (adjustment type, tax kind, cancel-fee flag) combination.
///
/// `base_rate` and `flat_fee` lines sum their values directly. Each
/// `percentage` line prices as `round_or_not(base_rate_sum × pct / 100)`,
/// where `base_rate_sum` is the sum over *all* base-rate lines of the
/// cell; per-line rounding is preserved when several percentage lines
/// share a group.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use staygrid::cell::{AdjustmentType, TaxKind};
/// use staygrid::pricing::{aggregate_rate_lines, RoundingPolicy};
/// # use staygrid::cell::{CellId, RateLine};
/// # fn line(adjustment: AdjustmentType, value: i64) -> RateLine {
/// #     RateLine {
/// #         id: 0,
/// #         cell: CellId::new(1),
/// #         adjustment,
/// #         value: Decimal::from(value),
/// #         tax_rate: Decimal::from(5),
/// #         tax_kind: TaxKind::Standard,
/// #         price: Decimal::ZERO,
/// #         include_in_cancel_fee: true,
/// #         sales_category: "lodging".to_string(),
/// #     }
/// # }
/// let lines = vec![
///     line(AdjustmentType::BaseRate, 5000),
///     line(AdjustmentType::BaseRate, 3000),
///     line(AdjustmentType::Percentage, 10),
/// ];
/// let charges = aggregate_rate_lines(&lines, RoundingPolicy::Round);
/// assert_eq!(charges.len(), 2);
/// assert_eq!(charges[0].price, Decimal::from(8000));
/// assert_eq!(charges[1].price, Decimal::from(800));
/// ```
#[must_use]
pub fn aggregate_rate_lines(lines: &[RateLine], policy: RoundingPolicy) -> Vec<AggregatedCharge> {
    use std::collections::BTreeMap;

    let base_rate_sum: Decimal = lines
        .iter()
        .filter(|l| l.adjustment == AdjustmentType::BaseRate)
        .map(|l| l.value)
        .sum();

    let mut groups: BTreeMap<(AdjustmentType, TaxKind, bool), Decimal> = BTreeMap::new();
    for line in lines {
        let price = match line.adjustment {
            AdjustmentType::BaseRate | AdjustmentType::FlatFee => line.value,
            AdjustmentType::Percentage => {
                round_or_not(base_rate_sum * line.value / Decimal::from(100), policy)
            }
        };
        *groups
            .entry((line.adjustment, line.tax_kind, line.include_in_cancel_fee))
            .or_insert(Decimal::ZERO) += price;
    }

    groups
        .into_iter()
        .map(
            |((adjustment, tax_kind, include_in_cancel_fee), price)| AggregatedCharge {
                adjustment,
                tax_kind,
                include_in_cancel_fee,
                price,
            },
        )
        .collect()
}

/// Sums the aggregated rate total of a cell's lines.
#[must_use]
pub fn rate_total(lines: &[RateLine], policy: RoundingPolicy) -> Decimal {
    aggregate_rate_lines(lines, policy)
        .iter()
        .map(|c| c.price)
        .sum()
}

/// Computes a cell's cancellation-fee charge.
///
/// Only lines flagged `include_in_cancel_fee` participate; the percentage
/// base is likewise restricted to the retained base-rate lines, so a
/// waived base rate does not inflate a retained percentage fee.
#[must_use]
pub fn cancel_fee_total(lines: &[RateLine], policy: RoundingPolicy) -> Decimal {
    let retained: Vec<RateLine> = lines
        .iter()
        .filter(|l| l.include_in_cancel_fee)
        .cloned()
        .collect();
    rate_total(&retained, policy)
}

/// Sums addon line totals (`quantity × unit_price` each).
#[must_use]
pub fn addon_total(addons: &[AddonLine]) -> Decimal {
    addons.iter().map(AddonLine::total).sum()
}

/// The priced breakdown of one occupancy cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPrice {
    /// Aggregated rate-line total (the stored per-night price).
    pub rate_total: Decimal,
    /// Addon total, kept separate from the rate total.
    pub addon_total: Decimal,
}

impl CellPrice {
    /// Returns the full cell price (`rate_total + addon_total`).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.rate_total + self.addon_total
    }
}

/// Prices a cell from its raw rate lines and addon lines.
#[must_use]
pub fn price_cell(lines: &[RateLine], addons: &[AddonLine], policy: RoundingPolicy) -> CellPrice {
    CellPrice {
        rate_total: rate_total(lines, policy),
        addon_total: addon_total(addons),
    }
}
