//! Coin sets
//!
//! `Coins` hold whole base units and are what the bank moves and burns.
//! `DecCoins` hold truncating decimals and are what reward buckets track.
//! Both keep denominations sorted and never store a zero entry, so equality
//! and iteration order are identical on every node.

use crate::decimal::Dec;
use crate::errors::MathError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Base-unit amount of a single denomination.
pub type Amount = u128;

/// Checks a denomination: 3–128 chars, leading ASCII letter, then
/// alphanumerics or `/ : . _ -`.
pub fn validate_denom(denom: &str) -> Result<(), MathError> {
    let mut chars = denom.chars();
    let valid_len = (3..=128).contains(&denom.len());
    let leading_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if valid_len && leading_letter && rest_ok {
        Ok(())
    } else {
        Err(MathError::InvalidDenom(denom.to_string()))
    }
}

/// Whole-unit amount of one denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

/// Sorted set of whole-unit amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Amount>",
    into = "BTreeMap<String, Amount>"
)]
pub struct Coins(BTreeMap<String, Amount>);

impl TryFrom<BTreeMap<String, Amount>> for Coins {
    type Error = MathError;

    fn try_from(map: BTreeMap<String, Amount>) -> Result<Self, Self::Error> {
        for denom in map.keys() {
            validate_denom(denom)?;
        }
        Coins::from_coins(map.into_iter().map(|(denom, amount)| Coin { denom, amount }))
    }
}

impl From<Coins> for BTreeMap<String, Amount> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-denomination set; empty when `amount` is zero.
    pub fn single(denom: impl Into<String>, amount: Amount) -> Self {
        let mut coins = Self::new();
        if amount > 0 {
            coins.0.insert(denom.into(), amount);
        }
        coins
    }

    /// Collects coins, summing repeated denominations.
    pub fn from_coins<I: IntoIterator<Item = Coin>>(coins: I) -> Result<Self, MathError> {
        coins
            .into_iter()
            .try_fold(Self::new(), |acc, coin| acc.add_coin(&coin))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.0.iter().map(|(denom, amount)| (denom.as_str(), *amount))
    }

    pub fn add_coin(mut self, coin: &Coin) -> Result<Self, MathError> {
        if coin.amount == 0 {
            return Ok(self);
        }
        let entry = self.0.entry(coin.denom.clone()).or_insert(0);
        *entry = entry
            .checked_add(coin.amount)
            .ok_or(MathError::Overflow("coin amount"))?;
        Ok(self)
    }

    pub fn checked_add(&self, other: &Coins) -> Result<Coins, MathError> {
        other.iter().try_fold(self.clone(), |acc, (denom, amount)| {
            acc.add_coin(&Coin::new(denom, amount))
        })
    }

    /// `self - other`; fails if any denomination would go below zero.
    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, MathError> {
        let mut result = self.clone();
        for (denom, amount) in other.iter() {
            let have = result.amount_of(denom);
            let left = have.checked_sub(amount).ok_or_else(|| MathError::Insufficient {
                denom: denom.to_string(),
                have: have.to_string(),
                need: amount.to_string(),
            })?;
            if left == 0 {
                result.0.remove(denom);
            } else {
                result.0.insert(denom.to_string(), left);
            }
        }
        Ok(result)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(denom, amount)| format!("{amount}{denom}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Sorted set of decimal amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Dec>", into = "BTreeMap<String, Dec>")]
pub struct DecCoins(BTreeMap<String, Dec>);

impl TryFrom<BTreeMap<String, Dec>> for DecCoins {
    type Error = MathError;

    fn try_from(map: BTreeMap<String, Dec>) -> Result<Self, Self::Error> {
        let mut coins = DecCoins::new();
        for (denom, amount) in map {
            validate_denom(&denom)?;
            if amount.is_negative() {
                return Err(MathError::Negative {
                    denom,
                    amount: amount.to_string(),
                });
            }
            coins.insert(denom, amount);
        }
        Ok(coins)
    }
}

impl From<DecCoins> for BTreeMap<String, Dec> {
    fn from(coins: DecCoins) -> Self {
        coins.0
    }
}

impl DecCoins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-denomination set; empty when `amount` is zero.
    pub fn single(denom: impl Into<String>, amount: Dec) -> Self {
        let mut coins = Self::new();
        coins.insert(denom.into(), amount);
        coins
    }

    pub fn from_coins(coins: &Coins) -> Self {
        let mut result = Self::new();
        for (denom, amount) in coins.iter() {
            result.insert(denom.to_string(), Dec::from(amount));
        }
        result
    }

    fn insert(&mut self, denom: String, amount: Dec) {
        if amount.is_zero() {
            self.0.remove(&denom);
        } else {
            self.0.insert(denom, amount);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn amount_of(&self, denom: &str) -> Dec {
        self.0.get(denom).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dec)> {
        self.0.iter().map(|(denom, amount)| (denom.as_str(), amount))
    }

    pub fn has_negative(&self) -> bool {
        self.0.values().any(Dec::is_negative)
    }

    pub fn add(&self, other: &DecCoins) -> DecCoins {
        let mut result = self.clone();
        for (denom, amount) in other.iter() {
            let sum = &result.amount_of(denom) + amount;
            result.insert(denom.to_string(), sum);
        }
        result
    }

    /// `self - other`; fails if any denomination would go negative.
    pub fn checked_sub(&self, other: &DecCoins) -> Result<DecCoins, MathError> {
        let mut result = self.clone();
        for (denom, amount) in other.iter() {
            let have = result.amount_of(denom);
            let left = have
                .checked_sub(amount)
                .map_err(|_| MathError::Insufficient {
                    denom: denom.to_string(),
                    have: have.to_string(),
                    need: amount.to_string(),
                })?;
            result.insert(denom.to_string(), left);
        }
        Ok(result)
    }

    /// Each amount times `rate`, truncated.
    pub fn mul_dec_truncate(&self, rate: &Dec) -> DecCoins {
        let mut result = Self::new();
        for (denom, amount) in self.iter() {
            result.insert(denom.to_string(), amount.mul_truncate(rate));
        }
        result
    }

    /// Each amount divided by `divisor`, truncated.
    pub fn quo_dec_truncate(&self, divisor: &Dec) -> Result<DecCoins, MathError> {
        let mut result = Self::new();
        for (denom, amount) in self.iter() {
            result.insert(denom.to_string(), amount.quo_truncate(divisor)?);
        }
        Ok(result)
    }

    /// Exact multiplication by a whole number.
    pub fn mul_int(&self, n: u64) -> DecCoins {
        let mut result = Self::new();
        for (denom, amount) in self.iter() {
            result.insert(denom.to_string(), amount.mul_int(n));
        }
        result
    }

    /// Splits into whole coins and the fractional change left over.
    pub fn truncate_decimal(&self) -> Result<(Coins, DecCoins), MathError> {
        let mut whole = Coins::new();
        let mut change = DecCoins::new();
        for (denom, amount) in self.iter() {
            if amount.is_negative() {
                return Err(MathError::Negative {
                    denom: denom.to_string(),
                    amount: amount.to_string(),
                });
            }
            let integer = amount.truncate_int();
            let units = integer
                .to_u128()
                .ok_or(MathError::Overflow("decimal coin exceeds u128"))?;
            whole = whole.add_coin(&Coin::new(denom, units))?;
            change.insert(denom.to_string(), amount - &Dec::from(units));
        }
        Ok((whole, change))
    }
}

impl fmt::Display for DecCoins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(denom, amount)| format!("{amount}{denom}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Dec {
        s.parse().unwrap()
    }

    #[test]
    fn test_coins_merge_and_drop_zero() {
        let coins = Coins::from_coins(vec![
            Coin::new("stake", 60),
            Coin::new("uatom", 0),
            Coin::new("stake", 40),
        ])
        .unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins.amount_of("stake"), 100);
        assert_eq!(coins.to_string(), "100stake");

        let left = coins.checked_sub(&Coins::single("stake", 100)).unwrap();
        assert!(left.is_empty());
    }

    #[test]
    fn test_coins_insufficient() {
        let coins = Coins::single("stake", 10);
        let err = coins.checked_sub(&Coins::single("stake", 11)).unwrap_err();
        assert!(matches!(err, MathError::Insufficient { .. }));
        assert!(coins.checked_sub(&Coins::single("uatom", 1)).is_err());
    }

    #[test]
    fn test_dec_coins_sub_never_goes_negative() {
        let a = DecCoins::single("stake", dec("1.5"));
        let b = DecCoins::single("stake", dec("1.6"));
        assert!(a.checked_sub(&b).is_err());
        assert!(b.checked_sub(&a).unwrap().amount_of("stake") == dec("0.1"));
        assert!(a.checked_sub(&a).unwrap().is_zero());
    }

    #[test]
    fn test_dec_coins_mul_and_quo() {
        let fees = DecCoins::from_coins(&Coins::single("stake", 100));
        let per_slot = fees.quo_dec_truncate(&dec("3")).unwrap();
        assert_eq!(per_slot.amount_of("stake").to_string(), "33.333333333333333333");

        let taxed = fees.mul_dec_truncate(&dec("0.02"));
        assert_eq!(taxed.amount_of("stake"), dec("2"));

        // rate zero leaves an empty set, not a zero entry
        assert!(fees.mul_dec_truncate(&Dec::zero()).is_zero());
        assert_eq!(per_slot.mul_int(3).amount_of("stake").to_string(), "99.999999999999999999");
    }

    #[test]
    fn test_truncate_decimal_splits_change() {
        let coins = DecCoins::single("stake", dec("96.75")).add(&DecCoins::single("uatom", dec("0.5")));
        let (whole, change) = coins.truncate_decimal().unwrap();
        assert_eq!(whole.amount_of("stake"), 96);
        assert_eq!(whole.amount_of("uatom"), 0);
        assert_eq!(change.amount_of("stake"), dec("0.75"));
        assert_eq!(change.amount_of("uatom"), dec("0.5"));
        assert_eq!(DecCoins::from_coins(&whole).add(&change), coins);
    }

    #[test]
    fn test_serde_rejects_bad_entries() {
        let coins: Coins = serde_json::from_str(r#"{"stake":100,"uatom":0}"#).unwrap();
        assert_eq!(coins, Coins::single("stake", 100));
        assert!(serde_json::from_str::<Coins>(r#"{"1x":5}"#).is_err());
        assert!(serde_json::from_str::<DecCoins>(r#"{"stake":"-1"}"#).is_err());

        let json = serde_json::to_string(&DecCoins::single("stake", dec("0.5"))).unwrap();
        assert_eq!(json, r#"{"stake":"0.500000000000000000"}"#);
    }

    #[test]
    fn test_validate_denom() {
        assert!(validate_denom("stake").is_ok());
        assert!(validate_denom("ibc/27394FB0").is_ok());
        assert!(validate_denom("1stake").is_err());
        assert!(validate_denom("ab").is_err());
    }
}
