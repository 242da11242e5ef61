use serde::{Deserialize, Deserializer, Serialize};

/// Shown in place of an empty memo.
pub const MEMO_PLACEHOLDER: &str = "Untitled";

/// Unit suffixes older saves carry on their numeric strings.
const UNIT_SUFFIXES: [&str; 2] = [" 円", " yen"];

/// One saved calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub memo: String,
    pub date: String,
    #[serde(deserialize_with = "amount")]
    pub price: i64,
    #[serde(deserialize_with = "amount")]
    pub profit: i64,
    #[serde(deserialize_with = "amount")]
    pub fee: i64,
    #[serde(deserialize_with = "amount")]
    pub shipping: i64,
    #[serde(rename = "shippingMethod", default)]
    pub shipping_method: String,
}

/// Which way the calculator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Listing price from a desired payout.
    #[default]
    ReverseFromTarget,
    /// Payout from a listing price.
    ForwardFromPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    History,
    Inventory,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::History, Collection::Inventory];

    pub fn storage_key(self) -> &'static str {
        match self {
            Collection::History => "mercaliHistory",
            Collection::Inventory => "mercaliInventory",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Collection::History => "History",
            Collection::Inventory => "Inventory",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Collection::History => "No history yet.",
            Collection::Inventory => "No items are currently registered in inventory.",
        }
    }
}

/// Drops a trailing currency unit such as `"1112 円"` -> `"1112"`.
pub fn strip_unit_suffix(value: &str) -> &str {
    let value = value.trim();
    UNIT_SUFFIXES
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))
        .unwrap_or(value)
        .trim()
}

/// Accepts a JSON number or a numeric string with an optional unit suffix.
fn amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => strip_unit_suffix(&s)
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not an amount: {s:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_string_encoded_records() {
        let json = r#"{"memo":"Jacket","date":"2024/5/3","price":"1112","profit":"1000",
            "fee":"111","shipping":"0","shippingMethod":"Manual entry"}"#;
        let r: CalculationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.price, 1112);
        assert_eq!(r.profit, 1000);
        assert_eq!(r.fee, 111);
        assert_eq!(r.shipping, 0);
        assert_eq!(r.shipping_method, "Manual entry");
    }

    #[test]
    fn reads_suffixed_and_numeric_fields() {
        let json = r#"{"memo":"m","date":"d","price":1000,"profit":"700 円",
            "fee":100,"shipping":"200 yen"}"#;
        let r: CalculationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.profit, 700);
        assert_eq!(r.shipping, 200);
        assert_eq!(r.shipping_method, "");
    }

    #[test]
    fn rejects_garbage_amounts() {
        let json = r#"{"memo":"m","date":"d","price":"Invalid input","profit":0,
            "fee":"---","shipping":0}"#;
        assert!(serde_json::from_str::<CalculationRecord>(json).is_err());
    }

    #[test]
    fn writes_camel_case_method() {
        let r = CalculationRecord {
            memo: "m".into(),
            date: "2024/1/2".into(),
            price: 1,
            profit: 2,
            fee: 3,
            shipping: 4,
            shipping_method: "Nekopos".into(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["shippingMethod"], "Nekopos");
        assert_eq!(v["price"], 1);
    }

    #[test]
    fn strips_units() {
        assert_eq!(strip_unit_suffix("1112 円"), "1112");
        assert_eq!(strip_unit_suffix(" 700 yen "), "700");
        assert_eq!(strip_unit_suffix("42"), "42");
    }
}
