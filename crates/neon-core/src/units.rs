// crates/neon-core/src/units.rs
//
// Amount types and basis-point arithmetic.
//
// All balances are unsigned fixed-point integers with 18 fractional digits.
// The smallest unit is the "wei"; 1 NEON = 10^18 wei. Internal accounting
// never touches floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::NeonError;

/// Type alias for wei, the smallest unit of any 18-decimal asset.
pub type Wei = u128;

/// Number of fractional digits.
pub const DECIMALS: u8 = 18;

/// Number of wei in one whole token. 1 NEON = 10^18 wei.
pub const WEI_PER_NEON: Wei = 1_000_000_000_000_000_000;

/// 100% expressed in basis points.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Compute `floor(amount * bps / 10000)` without intermediate overflow.
///
/// The amount is split into whole multiples of the denominator and a
/// remainder so the product never exceeds `u128` for any `bps <= 10000`.
pub fn mul_bps(amount: Wei, bps: u16) -> Wei {
    let denom = BPS_DENOMINATOR as Wei;
    let bps = bps as Wei;
    (amount / denom) * bps + (amount % denom) * bps / denom
}

/// Full 256-bit product of two `u128` values as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (ll & MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// Compute `floor(a * b / denom)` with a 256-bit intermediate product.
///
/// Returns `None` when `denom` is zero or the quotient does not fit in
/// `u128`. Pro-rata reward shares need this: income and stake slices are
/// both 18-decimal amounts whose product routinely exceeds `u128`.
pub fn mul_div(a: Wei, b: Wei, denom: Wei) -> Option<Wei> {
    if denom == 0 {
        return None;
    }
    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Some(lo / denom);
    }
    if hi >= denom {
        return None;
    }

    // Restoring long division of (hi, lo) by denom, one bit at a time.
    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= denom {
            rem = rem.wrapping_sub(denom);
            quot |= 1;
        }
    }
    Some(quot)
}

/// Validate a basis-point rate (0..=10000).
pub fn check_bps(bps: u16) -> Result<u16, NeonError> {
    if bps > BPS_DENOMINATOR {
        return Err(NeonError::InvalidAmount(format!(
            "rate {} bps exceeds {} bps",
            bps, BPS_DENOMINATOR
        )));
    }
    Ok(bps)
}

/// A token amount.
///
/// Wraps an amount in wei. Display renders whole tokens with trailing
/// fractional zeros trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Neon {
    /// Amount in wei (1 NEON = 10^18 wei).
    #[serde(with = "wei_string")]
    pub wei: Wei,
}

impl Neon {
    /// Create an amount from a whole number of tokens.
    ///
    /// # Example
    /// ```
    /// use neon_core::units::{Neon, WEI_PER_NEON};
    /// assert_eq!(Neon::from_whole(5).wei, 5 * WEI_PER_NEON);
    /// ```
    pub fn from_whole(tokens: u64) -> Self {
        Self {
            wei: tokens as Wei * WEI_PER_NEON,
        }
    }

    /// Create an amount from a wei value.
    pub fn from_wei(wei: Wei) -> Self {
        Self { wei }
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self { wei: 0 }
    }

    /// Parse a decimal token amount such as `"100"`, `"0.5"` or `"1.25"`.
    ///
    /// At most 18 fractional digits are accepted.
    pub fn parse(s: &str) -> Result<Self, NeonError> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(NeonError::InvalidAmount(format!("empty amount: {:?}", s)));
        }
        if frac.len() > DECIMALS as usize {
            return Err(NeonError::InvalidAmount(format!(
                "{} has more than {} fractional digits",
                s, DECIMALS
            )));
        }
        let parse_digits = |digits: &str| -> Result<Wei, NeonError> {
            if digits.is_empty() {
                return Ok(0);
            }
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NeonError::InvalidAmount(format!("not a number: {:?}", s)));
            }
            digits
                .parse::<Wei>()
                .map_err(|e| NeonError::InvalidAmount(format!("{}: {}", s, e)))
        };
        let whole_wei = parse_digits(whole)?
            .checked_mul(WEI_PER_NEON)
            .ok_or_else(|| NeonError::InvalidAmount(format!("{} overflows", s)))?;
        let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
        let frac_wei = parse_digits(&padded)?;
        whole_wei
            .checked_add(frac_wei)
            .map(Self::from_wei)
            .ok_or_else(|| NeonError::InvalidAmount(format!("{} overflows", s)))
    }
}

impl Add for Neon {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei + rhs.wei,
        }
    }
}

impl Sub for Neon {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_sub(rhs.wei),
        }
    }
}

impl fmt::Display for Neon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.wei / WEI_PER_NEON;
        let frac = self.wei % WEI_PER_NEON;
        if frac == 0 {
            write!(f, "{} NEON", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} NEON", whole, trimmed)
        }
    }
}

/// Serde adapter that writes `u128` amounts as decimal strings.
///
/// JSON numbers cannot carry 18-decimal balances through `serde_json::Value`
/// without loss, so every amount that crosses the RPC boundary uses this.
pub mod wei_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Wei;

    pub fn serialize<S: Serializer>(value: &Wei, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wei, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.trim().parse::<Wei>().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_small() {
        assert_eq!(mul_div(10, 3, 4), Some(7));
        assert_eq!(mul_div(0, 3, 4), Some(0));
        assert_eq!(mul_div(1, 1, 0), None);
    }

    #[test]
    fn test_mul_div_wide_product() {
        // 9,600 NEON income split by a 1,000 LP slice of a 3,000 LP total.
        let income = 9_600 * WEI_PER_NEON;
        let slice = 1_000 * WEI_PER_NEON;
        let total = 3_000 * WEI_PER_NEON;
        assert_eq!(mul_div(income, slice, total), Some(3_200 * WEI_PER_NEON));

        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 2, 4), Some(u128::MAX / 2));
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
    }

    #[test]
    fn test_mul_div_truncates() {
        let a = 7 * WEI_PER_NEON + 1;
        let b = 5 * WEI_PER_NEON;
        let c = 3 * WEI_PER_NEON;
        // 7e18+1 scaled by 5/3 floors to 11666666666666666668.
        assert_eq!(mul_div(a, b, c), Some(11_666_666_666_666_666_668));
    }

    #[test]
    fn test_wei_per_neon() {
        assert_eq!(WEI_PER_NEON, 10u128.pow(18));
    }

    #[test]
    fn test_mul_bps_one_percent() {
        assert_eq!(mul_bps(100 * WEI_PER_NEON, 100), WEI_PER_NEON);
    }

    #[test]
    fn test_mul_bps_truncates() {
        // 1% of 199 wei is 1.99 wei -> 1
        assert_eq!(mul_bps(199, 100), 1);
        assert_eq!(mul_bps(99, 100), 0);
    }

    #[test]
    fn test_mul_bps_extremes() {
        assert_eq!(mul_bps(12345, 0), 0);
        assert_eq!(mul_bps(12345, BPS_DENOMINATOR), 12345);
        assert_eq!(mul_bps(u128::MAX, BPS_DENOMINATOR), u128::MAX);
    }

    #[test]
    fn test_mul_bps_matches_naive_formula() {
        for amount in [0u128, 1, 9_999, 10_000, 10_001, 123_456_789, 5 * WEI_PER_NEON + 7] {
            for bps in [0u16, 1, 100, 225, 400, 9_999, 10_000] {
                assert_eq!(mul_bps(amount, bps), amount * bps as u128 / 10_000);
            }
        }
    }

    #[test]
    fn test_check_bps() {
        assert!(check_bps(10_000).is_ok());
        assert!(matches!(check_bps(10_001), Err(NeonError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(Neon::parse("100").unwrap(), Neon::from_whole(100));
        assert_eq!(Neon::parse("0.5").unwrap().wei, WEI_PER_NEON / 2);
        assert_eq!(Neon::parse(".25").unwrap().wei, WEI_PER_NEON / 4);
        assert_eq!(Neon::parse("1.000000000000000001").unwrap().wei, WEI_PER_NEON + 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Neon::parse("").is_err());
        assert!(Neon::parse("abc").is_err());
        assert!(Neon::parse("1.0000000000000000001").is_err());
        assert!(Neon::parse("-1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Neon::from_whole(42).to_string(), "42 NEON");
        assert_eq!(Neon::from_wei(WEI_PER_NEON / 2).to_string(), "0.5 NEON");
        assert_eq!(Neon::zero().to_string(), "0 NEON");
    }

    #[test]
    fn test_sub_saturating() {
        assert_eq!(Neon::from_whole(1) - Neon::from_whole(2), Neon::zero());
    }

    #[test]
    fn test_serde_amount_as_string() {
        let amount = Neon::from_whole(10_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "{\"wei\":\"10000000000000000000000\"}");
        let back: Neon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
