use serde::Deserialize;

use crate::calculator::parse_int;
use crate::errors::CalcError;

/// An entry in the shipping selector. `fee: None` is the manual-entry
/// option, which reveals a free-form field instead of carrying a price.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShippingOption {
    pub label: String,
    #[serde(default)]
    pub fee: Option<u32>,
}

impl ShippingOption {
    pub fn fixed(label: &str, fee: u32) -> Self {
        ShippingOption {
            label: label.to_string(),
            fee: Some(fee),
        }
    }

    pub fn manual(label: &str) -> Self {
        ShippingOption {
            label: label.to_string(),
            fee: None,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.fee.is_none()
    }

    /// Label without its trailing price note: `"Nekopos (210 yen)"` -> `"Nekopos"`.
    pub fn method_name(&self) -> &str {
        self.label
            .split(" (")
            .next()
            .unwrap_or(&self.label)
    }
}

pub fn default_options() -> Vec<ShippingOption> {
    vec![
        ShippingOption::manual("Manual entry"),
        ShippingOption::fixed("Nekopos (210 yen)", 210),
        ShippingOption::fixed("Yu-packet (230 yen)", 230),
        ShippingOption::fixed("Compact (450 yen)", 450),
        ShippingOption::fixed("Takkyubin 60 (750 yen)", 750),
        ShippingOption::fixed("Takkyubin 80 (850 yen)", 850),
        ShippingOption::fixed("Free shipping (0 yen)", 0),
    ]
}

/// Effective shipping fee for the selected option. A manual selection reads
/// `manual_input`; anything that is not a non-negative integer is invalid.
pub fn resolve_shipping(
    options: &[ShippingOption],
    selected: usize,
    manual_input: &str,
) -> Result<i64, CalcError> {
    let option = options.get(selected).ok_or(CalcError::InvalidShipping)?;

    let fee = match option.fee {
        Some(fee) => i64::from(fee),
        None => parse_int(manual_input).ok_or(CalcError::InvalidShipping)?,
    };

    if fee < 0 {
        return Err(CalcError::InvalidShipping);
    }
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_option_uses_encoded_fee() {
        let opts = default_options();
        assert_eq!(resolve_shipping(&opts, 1, "999"), Ok(210));
        assert_eq!(resolve_shipping(&opts, 6, ""), Ok(0));
    }

    #[test]
    fn manual_option_reads_field() {
        let opts = default_options();
        assert_eq!(resolve_shipping(&opts, 0, "175"), Ok(175));
        assert_eq!(resolve_shipping(&opts, 0, " 300円"), Ok(300));
    }

    #[test]
    fn manual_option_rejects_bad_input() {
        let opts = default_options();
        for input in ["", "abc", "-5", "   "] {
            assert_eq!(
                resolve_shipping(&opts, 0, input),
                Err(CalcError::InvalidShipping),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn unknown_index_is_invalid() {
        let opts = default_options();
        assert_eq!(
            resolve_shipping(&opts, opts.len(), "0"),
            Err(CalcError::InvalidShipping)
        );
    }

    #[test]
    fn method_name_drops_price_note() {
        assert_eq!(ShippingOption::fixed("Nekopos (210 yen)", 210).method_name(), "Nekopos");
        assert_eq!(ShippingOption::manual("Manual entry").method_name(), "Manual entry");
    }
}
