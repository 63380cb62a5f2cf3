//! Stock ledger operations.
//!
//! The only write surface for a stock's quantity, value and price. Every
//! operation:
//!
//! - rounds deltas and results to [`PRECISION`](crate::numeric::PRECISION);
//! - refuses (fatally) to leave any figure below `-EPSILON` or non-finite;
//! - snaps figures inside `[-EPSILON, 0)` to exactly zero.
//!
//! A rejected operation leaves the stock untouched.

use crate::error::{Diagnostics, LedgerField, StructuralError, WarningKind};
use crate::numeric::{approx_eq, is_negligible, round_to_precision, EPSILON};
use crate::types::StockId;
use crate::world::World;

impl World {
    /// Add `dq` to a stock, moving value and price by `dq` times the
    /// commodity's current unit value and unit price.
    pub fn modify_by(&mut self, stock: StockId, dq: f64) -> Result<(), StructuralError> {
        let c = self.commodity(self.stock(stock).commodity);
        let dv = round_to_precision(dq * c.unit_value);
        let dp = round_to_precision(dq * c.unit_price);
        self.apply_delta(stock, dq, dv, dp)
    }

    /// As [`World::modify_by`], but with an explicit value delta. Used where
    /// the value moved is not proportional to quantity (production output).
    pub fn modify_by_with_value(
        &mut self,
        stock: StockId,
        dq: f64,
        dv: f64,
    ) -> Result<(), StructuralError> {
        let c = self.commodity(self.stock(stock).commodity);
        let dp = round_to_precision(dq * c.unit_price);
        self.apply_delta(stock, dq, round_to_precision(dv), dp)
    }

    /// Set a stock's quantity to `quantity`, moving value and price by the
    /// implied delta.
    pub fn modify_to(&mut self, stock: StockId, quantity: f64) -> Result<(), StructuralError> {
        let dq = round_to_precision(quantity - self.stock(stock).quantity);
        self.modify_by(stock, dq)
    }

    /// Overwrite value and price from the commodity's current unit figures.
    /// Used by the Prices phase after recalibration.
    pub fn revalue(&mut self, stock: StockId) {
        let c = self.commodity(self.stock(stock).commodity);
        let (uv, up) = (c.unit_value, c.unit_price);
        let s = self.stock_mut(stock);
        s.value = round_to_precision(s.quantity * uv);
        s.price = round_to_precision(s.quantity * up);
    }

    /// Move `dq` units from one stock to another of the same commodity.
    ///
    /// Quantity, value and price are conserved: the deltas applied to `from`
    /// and `to` are exact negations of each other. Unit-figure drift on
    /// either side is reported to `diag` and does not stop the transfer.
    pub fn transfer_stock(
        &mut self,
        from: StockId,
        to: StockId,
        dq: f64,
        diag: &mut Diagnostics,
    ) -> Result<(), StructuralError> {
        if dq == 0.0 {
            return Ok(());
        }
        if self.stock(from).commodity != self.stock(to).commodity {
            return Err(StructuralError::CommodityMismatch {
                from: self.stock_key(from),
                to: self.stock_key(to),
            });
        }
        self.check_unit_figures(from, diag);
        self.check_unit_figures(to, diag);

        tracing::debug!(
            from = %self.stock_key(from),
            to = %self.stock_key(to),
            quantity = dq,
            "transfer"
        );
        // Validate the debit first so a failure leaves both sides untouched.
        self.modify_by(from, -dq)?;
        self.modify_by(to, dq)
    }

    fn check_unit_figures(&self, stock: StockId, diag: &mut Diagnostics) {
        let s = self.stock(stock);
        if is_negligible(s.quantity) {
            return;
        }
        let c = self.commodity(s.commodity);
        if !approx_eq(s.price / s.quantity, c.unit_price) {
            diag.warn(
                WarningKind::UnitPriceDrift,
                self.stock_key(stock),
                format!(
                    "price/quantity {} differs from unit price {}",
                    s.price / s.quantity,
                    c.unit_price
                ),
            );
        }
        if !approx_eq(s.value / s.quantity, c.unit_value) {
            diag.warn(
                WarningKind::UnitValueDrift,
                self.stock_key(stock),
                format!(
                    "value/quantity {} differs from unit value {}",
                    s.value / s.quantity,
                    c.unit_value
                ),
            );
        }
    }

    fn apply_delta(
        &mut self,
        stock: StockId,
        dq: f64,
        dv: f64,
        dp: f64,
    ) -> Result<(), StructuralError> {
        let s = self.stock(stock);
        let quantity = round_to_precision(s.quantity + dq);
        let value = round_to_precision(s.value + dv);
        let price = round_to_precision(s.price + dp);
        for (field, figure) in [
            (LedgerField::Quantity, quantity),
            (LedgerField::Value, value),
            (LedgerField::Price, price),
        ] {
            if !figure.is_finite() {
                return Err(StructuralError::NonFiniteLedger {
                    stock: self.stock_key(stock),
                    field,
                    value: figure,
                });
            }
            if figure < -EPSILON {
                return Err(StructuralError::NegativeLedger {
                    stock: self.stock_key(stock),
                    field,
                    value: figure,
                });
            }
        }
        let s = self.stock_mut(stock);
        s.quantity = quantity.max(0.0);
        s.value = value.max(0.0);
        s.price = price.max(0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commodity, Function, Global, Origin};

    fn world() -> (World, StockId, StockId, StockId) {
        let mut w = World::new(Global::default());
        w.add_commodity(Commodity::new("Money", Origin::Money, Function::Money))
            .unwrap();
        w.add_commodity(
            Commodity::new("Iron", Origin::IndustriallyProduced, Function::ProductiveInput)
                .with_unit_price(2.0)
                .with_unit_value(1.5),
        )
        .unwrap();
        w.add_commodity(Commodity::new(
            "Corn",
            Origin::IndustriallyProduced,
            Function::ConsumerGood,
        ))
        .unwrap();
        let smith = w.add_industry("Smithing", "Iron", 10.0, 0.0).unwrap();
        let farm = w.add_industry("Farming", "Corn", 10.0, 0.0).unwrap();
        let iron_in = w.add_productive_stock(farm, "Iron", 0.5).unwrap();
        let iron_out = w.industry(smith).sales_stock;
        let corn_out = w.industry(farm).sales_stock;
        (w, iron_out, iron_in, corn_out)
    }

    #[test]
    fn modify_by_tracks_unit_figures() {
        let (mut w, iron, _, _) = world();
        w.modify_by(iron, 10.0).unwrap();
        let s = w.stock(iron);
        assert_eq!((s.quantity, s.value, s.price), (10.0, 15.0, 20.0));
    }

    #[test]
    fn modify_by_rejects_negative_and_leaves_stock_untouched() {
        let (mut w, iron, _, _) = world();
        w.modify_by(iron, 1.0).unwrap();
        let before = w.stock(iron).clone();
        let err = w.modify_by(iron, -2.0).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::NegativeLedger {
                field: LedgerField::Quantity,
                ..
            }
        ));
        assert_eq!(w.stock(iron), &before);
    }

    #[test]
    fn non_finite_figures_are_rejected() {
        let (mut w, iron, _, _) = world();
        w.modify_by(iron, 3.0).unwrap();
        let before = w.stock(iron).clone();

        let err = w.modify_to(iron, f64::INFINITY).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::NonFiniteLedger {
                field: LedgerField::Quantity,
                ..
            }
        ));
        let err = w.modify_by_with_value(iron, 1.0, f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            StructuralError::NonFiniteLedger {
                field: LedgerField::Value,
                ..
            }
        ));
        assert_eq!(w.stock(iron), &before);
    }

    #[test]
    fn noise_below_epsilon_snaps_to_zero() {
        let (mut w, iron, _, _) = world();
        w.modify_by(iron, 1.0).unwrap();
        w.modify_by(iron, -1.000_001).unwrap();
        assert_eq!(w.stock(iron).quantity, 0.0);
    }

    #[test]
    fn modify_to_sets_absolute_quantity() {
        let (mut w, iron, _, _) = world();
        w.modify_by(iron, 4.0).unwrap();
        w.modify_to(iron, 7.0).unwrap();
        assert_eq!(w.stock(iron).quantity, 7.0);
        assert_eq!(w.stock(iron).price, 14.0);
    }

    #[test]
    fn explicit_value_overrides_unit_value() {
        let (mut w, iron, _, _) = world();
        w.modify_by_with_value(iron, 10.0, 3.0).unwrap();
        let s = w.stock(iron);
        assert_eq!((s.value, s.price), (3.0, 20.0));
    }

    #[test]
    fn transfer_conserves_all_three_figures() {
        let (mut w, out, input, _) = world();
        w.modify_by(out, 10.0).unwrap();
        let mut d = Diagnostics::new();
        w.transfer_stock(out, input, 4.0, &mut d).unwrap();
        let (a, b) = (w.stock(out), w.stock(input));
        assert_eq!(a.quantity + b.quantity, 10.0);
        assert_eq!(a.value + b.value, 15.0);
        assert_eq!(a.price + b.price, 20.0);
        assert!(d.is_empty());
    }

    #[test]
    fn transfer_between_commodities_is_fatal() {
        let (mut w, iron, _, corn) = world();
        w.modify_by(iron, 1.0).unwrap();
        let mut d = Diagnostics::new();
        let err = w.transfer_stock(iron, corn, 1.0, &mut d).unwrap_err();
        assert_eq!(
            err,
            StructuralError::CommodityMismatch {
                from: "Smithing/Iron/sales".to_string(),
                to: "Farming/Corn/sales".to_string(),
            }
        );
    }

    #[test]
    fn zero_transfer_is_a_noop_even_across_commodities() {
        let (mut w, iron, _, corn) = world();
        let mut d = Diagnostics::new();
        w.transfer_stock(iron, corn, 0.0, &mut d).unwrap();
    }

    #[test]
    fn drift_warns_but_transfers() {
        let (mut w, out, input, _) = world();
        w.modify_by_with_value(out, 10.0, 10.0).unwrap();
        let mut d = Diagnostics::new();
        w.transfer_stock(out, input, 5.0, &mut d).unwrap();
        assert_eq!(d.count(WarningKind::UnitValueDrift), 1);
        assert_eq!(d.count(WarningKind::UnitPriceDrift), 0);
        assert_eq!(w.stock(input).quantity, 5.0);
    }

    #[test]
    fn revalue_restores_unit_figures() {
        let (mut w, iron, _, _) = world();
        w.modify_by_with_value(iron, 10.0, 2.0).unwrap();
        w.revalue(iron);
        assert_eq!(w.stock(iron).value, 15.0);
    }
}
