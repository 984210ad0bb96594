use std::fmt;
use std::ops::{Add, AddAssign, Mul};

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

/// 通貨
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    INR,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::INR => "₹",
        }
    }
}

/// 金額（最小単位で保持する）
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

// 単一通貨の勘定のみ扱うため、通貨の混在チェックは行わない
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::new(self.amount + rhs.amount, self.currency)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.amount += rhs.amount;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money::new(self.amount * rhs, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.amount / 100;
        let cents = (self.amount % 100).unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            self.currency.symbol(),
            whole.to_formatted_string(&Locale::en),
            cents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        let price = Money::new(100_000_000, Currency::USD);
        assert_eq!(format!("{}", price), "$1,000,000.00");
        let price = Money::new(20_000, Currency::USD);
        assert_eq!(format!("{}", price), "$200.00");
        let price = Money::new(12_345, Currency::INR);
        assert_eq!(format!("{}", price), "₹123.45");
    }

    #[test]
    fn test_money_arithmetic() {
        let rate = Money::new(10_000, Currency::USD);
        assert_eq!(rate * 2, Money::new(20_000, Currency::USD));
        assert_eq!(rate * -1, Money::new(-10_000, Currency::USD));
        let mut total = rate * 3;
        total += Money::new(500, Currency::USD);
        assert_eq!(total, Money::new(30_500, Currency::USD));
        assert_eq!(
            Money::zero(Currency::USD) + rate,
            Money::new(10_000, Currency::USD)
        );
    }
}
