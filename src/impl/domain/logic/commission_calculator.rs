use rust_decimal::Decimal;

use crate::entities::{InvoiceDocument, NegativeQuantityPolicy, SaleOrder, ServiceRate};

/// Labor payout of one service line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct MechanicPayout {
    pub(crate) hours: Decimal,
    pub(crate) cost_per_hour: Decimal,
    pub(crate) payout: Decimal,
}

/// Pure commission arithmetic. No rounding happens here; amounts are rounded
/// to the currency's precision only when rendered.
pub(crate) struct CommissionCalculator;

impl CommissionCalculator {
    /// `base × percent / 100`.
    /// Zero when the product does not fit in a `Decimal`.
    pub(crate) fn seller_commission(base_amount: Decimal, percent: Decimal) -> Decimal {
        base_amount
            .checked_mul(percent)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .unwrap_or_else(|| {
                tracing::warn!(
                    base_amount = %base_amount,
                    percent = %percent,
                    "Commission overflows, defaulting to zero"
                );
                Decimal::ZERO
            })
    }

    /// `hours = quantity × hours_required`, `payout = hours × cost_per_hour`.
    ///
    /// Non-service lines and lines without a mechanic pay nothing. Returns
    /// `None` when the line is excluded by the negative-quantity policy.
    pub(crate) fn mechanic_payout(
        quantity: Decimal,
        rate: ServiceRate,
        is_service: bool,
        has_mechanic: bool,
        policy: NegativeQuantityPolicy,
    ) -> Option<MechanicPayout> {
        if quantity < Decimal::ZERO && policy == NegativeQuantityPolicy::Exclude {
            return None;
        }
        if !is_service || !has_mechanic {
            return Some(MechanicPayout::default());
        }
        let computed = quantity.checked_mul(rate.hours_required).and_then(|hours| {
            hours
                .checked_mul(rate.cost_per_hour)
                .map(|payout| (hours, payout))
        });
        let Some((hours, payout)) = computed else {
            tracing::warn!(
                quantity = %quantity,
                hours_required = %rate.hours_required,
                cost_per_hour = %rate.cost_per_hour,
                "Payout overflows, defaulting to zero"
            );
            return Some(MechanicPayout {
                cost_per_hour: rate.cost_per_hour,
                ..MechanicPayout::default()
            });
        };
        Some(MechanicPayout {
            hours,
            cost_per_hour: rate.cost_per_hour,
            payout,
        })
    }
}

impl InvoiceDocument {
    /// Refreshes the derived commission fields for the given rate.
    pub(crate) fn recompute_commission(&mut self, percent: Decimal) {
        self.commission_percent = percent;
        self.commission_amount = CommissionCalculator::seller_commission(self.base_amount, percent);
    }
}

impl SaleOrder {
    /// Refreshes the derived seller fields for the given seller name and rate.
    pub(crate) fn recompute_commission(&mut self, seller_name: String, percent: Decimal) {
        self.seller_name = seller_name;
        self.commission_percent = percent;
        self.commission_amount = CommissionCalculator::seller_commission(self.base_amount, percent);
    }
}
