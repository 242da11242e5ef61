use crate::errors::CalcError;

/// Marketplace minimum listing price.
pub const MIN_LISTING_PRICE: i64 = 300;

const BASIS_POINTS: i64 = 10_000;

/// Fraction of the listing price kept by the marketplace, held in basis
/// points so every computation stays in exact integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRate {
    bps: i64,
}

impl FeeRate {
    pub const fn from_percent(percent: i64) -> Self {
        Self::from_basis_points(percent * 100)
    }

    pub const fn from_basis_points(bps: i64) -> Self {
        assert!(bps >= 0 && bps < BASIS_POINTS, "fee rate must be in [0, 100%)");
        FeeRate { bps }
    }

    pub fn percent(&self) -> f64 {
        self.bps as f64 / 100.0
    }

    /// `floor(price * rate)`. Widened to `i128` so any `i64` price works.
    pub fn fee_for(&self, price: i64) -> Option<i64> {
        let scaled = i128::from(price) * i128::from(self.bps);
        i64::try_from(scaled.div_euclid(i128::from(BASIS_POINTS))).ok()
    }

    /// `ceil(amount / (1 - rate))`, or `None` when the price leaves `i64`.
    fn gross_up(&self, amount: i64) -> Option<i64> {
        let keep = i128::from(BASIS_POINTS - self.bps);
        let scaled = i128::from(amount) * i128::from(BASIS_POINTS);
        let price = scaled.div_euclid(keep) + i128::from(scaled.rem_euclid(keep) != 0);
        i64::try_from(price).ok()
    }
}

/// Fixed 10% marketplace fee.
pub const FEE_RATE: FeeRate = FeeRate::from_percent(10);

/// Result of computing a listing price from a desired payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseQuote {
    pub target: i64,
    pub shipping: i64,
    pub price: i64,
    pub fee: i64,
}

impl ReverseQuote {
    /// What the seller actually receives at `price`; never below `target`.
    pub fn net_payout(&self) -> i64 {
        self.price - self.fee - self.shipping
    }
}

/// Result of computing the payout for a given listing price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardQuote {
    pub price: i64,
    pub shipping: i64,
    pub fee: i64,
    pub profit: i64,
}

/// Sign and leading digit run of `input`, skipping leading whitespace.
/// `None` when there are no leading digits.
fn leading_integer(input: &str) -> Option<(bool, &str)> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    (digits_len > 0).then(|| (negative, &rest[..digits_len]))
}

/// Reads an integer the way a browser's `parseInt` does: surrounding
/// whitespace is skipped, an optional sign and the leading run of digits
/// are taken, and anything after them is ignored. `None` when there are
/// no leading digits or the value does not fit.
pub fn parse_int(input: &str) -> Option<i64> {
    let (negative, digits) = leading_integer(input)?;
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Like [`parse_int`] for a non-negative amount, telling an amount too big
/// for `i64` apart from one that is missing or negative.
fn parse_amount(input: &str, invalid: CalcError) -> Result<i64, CalcError> {
    let (negative, digits) = leading_integer(input).ok_or_else(|| invalid.clone())?;
    let magnitude: i64 = match digits.parse() {
        Ok(m) => m,
        Err(_) if negative => return Err(invalid),
        Err(_) => return Err(CalcError::AmountTooLarge),
    };

    if negative && magnitude != 0 {
        return Err(invalid);
    }
    Ok(magnitude)
}

pub fn calculate_selling_price(
    target_input: &str,
    shipping: i64,
    rate: FeeRate,
) -> Result<ReverseQuote, CalcError> {
    let target = parse_amount(target_input, CalcError::InvalidTarget)?;

    let price = target
        .checked_add(shipping)
        .and_then(|gross| rate.gross_up(gross))
        .ok_or(CalcError::AmountTooLarge)?;
    let fee = rate.fee_for(price).ok_or(CalcError::AmountTooLarge)?;

    Ok(ReverseQuote {
        target,
        shipping,
        price,
        fee,
    })
}

pub fn calculate_profit(
    price_input: &str,
    shipping: i64,
    rate: FeeRate,
) -> Result<ForwardQuote, CalcError> {
    let price = parse_amount(price_input, CalcError::BelowMinimumPrice)?;
    if price < MIN_LISTING_PRICE {
        return Err(CalcError::BelowMinimumPrice);
    }

    let fee = rate.fee_for(price).ok_or(CalcError::AmountTooLarge)?;
    // Negative payouts are legitimate results when shipping eats the proceeds.
    let profit = price - fee - shipping;

    Ok(ForwardQuote {
        price,
        shipping,
        fee,
        profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_example_rounds_price_up() {
        let q = calculate_selling_price("1000", 0, FEE_RATE).unwrap();
        assert_eq!(q.price, 1112);
        assert_eq!(q.fee, 111);
        assert_eq!(q.net_payout(), 1001);
    }

    #[test]
    fn forward_example() {
        let q = calculate_profit("1000", 200, FEE_RATE).unwrap();
        assert_eq!(q.fee, 100);
        assert_eq!(q.profit, 700);
    }

    #[test]
    fn reverse_never_undershoots_target() {
        for shipping in [0, 175, 210, 230, 450, 750, 1_000] {
            for target in 0..2_000 {
                let q = calculate_selling_price(&target.to_string(), shipping, FEE_RATE).unwrap();
                assert!(
                    q.net_payout() >= target,
                    "target {target} shipping {shipping} gave price {}",
                    q.price
                );
                assert_eq!(q.fee, q.price / 10);
                // Smallest price whose fee-free share covers target + shipping.
                assert!((q.price - 1) * 9 < (target + shipping) * 10);
                assert!(q.price * 9 >= (target + shipping) * 10);
            }
        }
    }

    #[test]
    fn exact_multiples_do_not_round_up() {
        let q = calculate_selling_price("900", 0, FEE_RATE).unwrap();
        assert_eq!(q.price, 1000);
        assert_eq!(q.fee, 100);
    }

    #[test]
    fn forward_fee_is_floored() {
        for price in 300..3_000 {
            let q = calculate_profit(&price.to_string(), 210, FEE_RATE).unwrap();
            assert_eq!(q.fee, price / 10);
            assert_eq!(q.profit, price - price / 10 - 210);
        }
    }

    #[test]
    fn forward_rejects_prices_under_minimum() {
        assert_eq!(
            calculate_profit("299", 0, FEE_RATE),
            Err(CalcError::BelowMinimumPrice)
        );
        assert_eq!(
            calculate_profit("", 0, FEE_RATE),
            Err(CalcError::BelowMinimumPrice)
        );
        assert!(calculate_profit("300", 0, FEE_RATE).is_ok());
        assert_eq!(
            CalcError::BelowMinimumPrice.to_string(),
            "Invalid input (300+)"
        );
    }

    #[test]
    fn forward_allows_negative_profit() {
        let q = calculate_profit("300", 1_000, FEE_RATE).unwrap();
        assert_eq!(q.profit, 300 - 30 - 1_000);
    }

    #[test]
    fn reverse_rejects_negative_and_non_numeric() {
        for input in ["-1", "abc", "", "   ", "-"] {
            assert_eq!(
                calculate_selling_price(input, 0, FEE_RATE),
                Err(CalcError::InvalidTarget),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn reverse_reports_prices_past_i64_as_too_large() {
        assert_eq!(
            calculate_selling_price("9223372036854775807", 0, FEE_RATE),
            Err(CalcError::AmountTooLarge)
        );
        assert_eq!(
            calculate_selling_price("99999999999999999999", 0, FEE_RATE),
            Err(CalcError::AmountTooLarge)
        );
        assert_eq!(
            calculate_selling_price("-99999999999999999999", 0, FEE_RATE),
            Err(CalcError::InvalidTarget)
        );
    }

    #[test]
    fn reverse_handles_large_targets_exactly() {
        let q = calculate_selling_price("9000000000000000", 0, FEE_RATE).unwrap();
        assert_eq!(q.price, 10_000_000_000_000_000);
        assert_eq!(q.fee, 1_000_000_000_000_000);
    }

    #[test]
    fn forward_computes_very_large_prices() {
        let q = calculate_profit("10000000000000000", 0, FEE_RATE).unwrap();
        assert_eq!(q.fee, 1_000_000_000_000_000);
        assert_eq!(q.profit, 9_000_000_000_000_000);

        let q = calculate_profit(&i64::MAX.to_string(), 0, FEE_RATE).unwrap();
        assert_eq!(q.fee, i64::MAX / 10);
    }

    #[test]
    fn forward_prices_past_i64_are_too_large_not_under_minimum() {
        let err = calculate_profit("99999999999999999999", 0, FEE_RATE).unwrap_err();
        assert_eq!(err, CalcError::AmountTooLarge);
        assert_eq!(err.to_string(), "Invalid input (amount too large)");
    }

    #[test]
    fn parse_int_is_lenient_like_browsers() {
        assert_eq!(parse_int("  42  "), Some(42));
        assert_eq!(parse_int("200円"), Some(200));
        assert_eq!(parse_int("1e3"), Some(1));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("-15"), Some(-15));
        assert_eq!(parse_int("12.9"), Some(12));
        assert_eq!(parse_int("x12"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn fee_rate_reports_percent() {
        assert_eq!(FEE_RATE.percent(), 10.0);
        assert_eq!(FeeRate::from_basis_points(250).fee_for(1_000), Some(25));
    }
}
