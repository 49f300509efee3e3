//! Receipt

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{discounts::Discount, products::Product};

/// One priced row on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    product: Product,
    quantity: Decimal,
    unit_price: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> ReceiptLine<'a> {
    /// Create a priced line.
    pub fn new(
        product: Product,
        quantity: Decimal,
        unit_price: Money<'a, Currency>,
        total: Money<'a, Currency>,
    ) -> Self {
        Self {
            product,
            quantity,
            unit_price,
            total,
        }
    }

    /// Return the product.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Return the purchased quantity.
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Return the catalog unit price.
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Return the line total (quantity x unit price).
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

/// An itemised receipt: ordered priced lines plus ordered discount lines.
///
/// Both lists are append-only; evaluators add discounts exactly once and
/// nothing mutates them afterwards.
#[derive(Debug)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,
    discounts: SmallVec<[Discount<'a>; 4]>,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create an empty receipt in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            discounts: SmallVec::new(),
            currency,
        }
    }

    /// Append a priced line.
    pub fn add_line(&mut self, line: ReceiptLine<'a>) {
        self.lines.push(line);
    }

    /// Append a discount line.
    pub fn add_discount(&mut self, discount: Discount<'a>) {
        self.discounts.push(discount);
    }

    /// Ordered priced lines.
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Ordered discount lines.
    pub fn discounts(&self) -> &[Discount<'a>] {
        &self.discounts
    }

    /// Check whether the receipt has no priced lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Return the receipt currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of the priced line totals, before any discount.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        let minor = self
            .lines
            .iter()
            .map(|line| line.total.to_minor_units())
            .fold(0i64, i64::saturating_add);

        Money::from_minor(minor, self.currency)
    }

    /// Grand total: subtotal plus every (signed) discount amount.
    ///
    /// The total is deliberately not clamped at zero; a pathological
    /// configuration can drive it negative.
    pub fn total(&self) -> Money<'static, Currency> {
        let discount_minor = self
            .discounts
            .iter()
            .map(|discount| discount.amount().to_minor_units())
            .fold(0i64, i64::saturating_add);

        Money::from_minor(
            self.subtotal().to_minor_units().saturating_add(discount_minor),
            self.currency,
        )
    }

    /// Amount saved by discounts: subtotal minus total.
    pub fn savings(&self) -> Money<'static, Currency> {
        Money::from_minor(
            self.subtotal()
                .to_minor_units()
                .saturating_sub(self.total().to_minor_units()),
            self.currency,
        )
    }
}
