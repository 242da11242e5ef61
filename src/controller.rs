//! Input state and the glue between the inputs, the calculator and the store.
//!
//! Everything the window needs to compute a result lives in [`AppState`], and
//! [`calculate`] is a pure function of it, so every path the UI can take is
//! testable without a window.

use tracing::{debug, info};

use crate::calculator::{
    calculate_profit, calculate_selling_price, ForwardQuote, ReverseQuote, FEE_RATE,
};
use crate::errors::{CalcError, Result};
use crate::model::{CalculationRecord, Collection, Mode, MEMO_PLACEHOLDER};
use crate::shipping::{resolve_shipping, ShippingOption};
use crate::store::RecordStore;

pub const CURRENCY_SUFFIX: &str = " yen";
const NO_FEE: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: Mode,
    pub target_input: String,
    pub price_input: String,
    pub shipping_index: usize,
    pub manual_shipping_input: String,
    pub memo: String,
}

impl AppState {
    /// Starts in reverse mode with the first priced shipping option selected.
    pub fn new(options: &[ShippingOption]) -> Self {
        let shipping_index = options
            .iter()
            .position(|o| !o.is_manual())
            .unwrap_or(0);

        AppState {
            mode: Mode::default(),
            target_input: String::new(),
            price_input: String::new(),
            shipping_index,
            manual_shipping_input: String::new(),
            memo: String::new(),
        }
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(?mode, "switching calculation mode");
        }
        self.mode = mode;
    }

    /// Selects a shipping option. Returns whether the manual field should be shown.
    pub fn on_shipping_change(&mut self, options: &[ShippingOption], index: usize) -> bool {
        self.shipping_index = index;
        self.manual_shipping_visible(options)
    }

    pub fn manual_shipping_visible(&self, options: &[ShippingOption]) -> bool {
        options
            .get(self.shipping_index)
            .is_some_and(ShippingOption::is_manual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Reverse(ReverseQuote),
    Forward(ForwardQuote),
}

impl Quote {
    pub fn price(&self) -> i64 {
        match self {
            Quote::Reverse(q) => q.price,
            Quote::Forward(q) => q.price,
        }
    }

    /// Payout as the seller sees it: the requested target in reverse mode,
    /// the computed payout in forward mode.
    pub fn profit(&self) -> i64 {
        match self {
            Quote::Reverse(q) => q.target,
            Quote::Forward(q) => q.profit,
        }
    }

    pub fn fee(&self) -> i64 {
        match self {
            Quote::Reverse(q) => q.fee,
            Quote::Forward(q) => q.fee,
        }
    }

    pub fn shipping(&self) -> i64 {
        match self {
            Quote::Reverse(q) => q.shipping,
            Quote::Forward(q) => q.shipping,
        }
    }

    /// What actually reaches the seller after fee and shipping.
    pub fn net_payout(&self) -> i64 {
        match self {
            Quote::Reverse(q) => q.net_payout(),
            Quote::Forward(q) => q.profit,
        }
    }
}

/// What the result panel shows after a calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub shipping: Option<i64>,
    pub result: std::result::Result<Quote, CalcError>,
}

impl Outcome {
    pub fn quote(&self) -> Option<&Quote> {
        self.result.as_ref().ok()
    }

    pub fn price_text(&self) -> String {
        match &self.result {
            Ok(q) => format_amount(q.price()),
            Err(e) => e.to_string(),
        }
    }

    pub fn profit_text(&self) -> String {
        match &self.result {
            Ok(q) => format_amount(q.profit()),
            Err(e) => e.to_string(),
        }
    }

    pub fn fee_text(&self) -> String {
        match &self.result {
            Ok(q) => q.fee().to_string(),
            Err(_) => NO_FEE.to_string(),
        }
    }

    pub fn shipping_text(&self) -> String {
        self.shipping
            .map_or_else(|| NO_FEE.to_string(), |s| s.to_string())
    }
}

pub fn format_amount(value: i64) -> String {
    format!("{value}{CURRENCY_SUFFIX}")
}

/// Validates shipping, then runs whichever formula the mode selects.
pub fn calculate(state: &AppState, options: &[ShippingOption]) -> Outcome {
    let shipping = match resolve_shipping(
        options,
        state.shipping_index,
        &state.manual_shipping_input,
    ) {
        Ok(s) => s,
        Err(e) => {
            return Outcome {
                shipping: None,
                result: Err(e),
            }
        }
    };

    let result = match state.mode {
        Mode::ReverseFromTarget => {
            calculate_selling_price(&state.target_input, shipping, FEE_RATE).map(Quote::Reverse)
        }
        Mode::ForwardFromPrice => {
            calculate_profit(&state.price_input, shipping, FEE_RATE).map(Quote::Forward)
        }
    };

    Outcome {
        shipping: Some(shipping),
        result,
    }
}

/// Assembles the record the save buttons commit from the current result.
pub fn build_record(
    state: &AppState,
    outcome: &Outcome,
    options: &[ShippingOption],
    date: String,
) -> std::result::Result<CalculationRecord, CalcError> {
    let quote = outcome.quote().ok_or(CalcError::NothingToSave)?;

    let memo = match state.memo.trim() {
        "" => MEMO_PLACEHOLDER.to_string(),
        memo => memo.to_string(),
    };
    let shipping_method = options
        .get(state.shipping_index)
        .map(|o| o.method_name().to_string())
        .unwrap_or_default();

    Ok(CalculationRecord {
        memo,
        date,
        price: quote.price(),
        profit: quote.profit(),
        fee: quote.fee(),
        shipping: quote.shipping(),
        shipping_method,
    })
}

/// Today's date as `YYYY/M/D`.
pub fn today() -> String {
    chrono::Local::now().format("%Y/%-m/%-d").to_string()
}

/// Saves the current calculation into history or inventory and clears the memo.
/// An invalid calculation leaves both the store and the memo untouched.
pub fn save_item(
    state: &mut AppState,
    options: &[ShippingOption],
    store: &mut RecordStore,
    to_inventory: bool,
) -> Result<CalculationRecord> {
    let collection = if to_inventory {
        Collection::Inventory
    } else {
        Collection::History
    };

    let outcome = calculate(state, options);
    let record = build_record(state, &outcome, options, today())?;
    store.append(collection, &record)?;
    info!(
        collection = collection.title(),
        memo = %record.memo,
        price = record.price,
        "saved calculation"
    );

    state.memo.clear();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::shipping::default_options;

    fn state(options: &[ShippingOption]) -> AppState {
        AppState::new(options)
    }

    #[test]
    fn starts_in_reverse_mode_with_priced_shipping() {
        let opts = default_options();
        let s = state(&opts);
        assert_eq!(s.mode, Mode::ReverseFromTarget);
        assert_eq!(s.shipping_index, 1);
        assert!(!s.manual_shipping_visible(&opts));
    }

    #[test]
    fn reverse_mode_outcome() {
        let opts = vec![ShippingOption::fixed("Free (0 yen)", 0)];
        let mut s = state(&opts);
        s.target_input = "1000".into();

        let out = calculate(&s, &opts);
        assert_eq!(out.price_text(), "1112 yen");
        assert_eq!(out.fee_text(), "111");
        assert_eq!(out.shipping_text(), "0");
        assert_eq!(out.quote().map(Quote::net_payout), Some(1001));
    }

    #[test]
    fn forward_mode_outcome() {
        let opts = default_options();
        let mut s = state(&opts);
        s.switch_mode(Mode::ForwardFromPrice);
        s.on_shipping_change(&opts, 0);
        s.manual_shipping_input = "200".into();
        s.price_input = "1000".into();

        let out = calculate(&s, &opts);
        assert_eq!(out.profit_text(), "700 yen");
        assert_eq!(out.fee_text(), "100");
        assert_eq!(out.quote().map(Quote::net_payout), Some(700));
    }

    #[test]
    fn switching_mode_recomputes_from_other_input() {
        let opts = default_options();
        let mut s = state(&opts);
        s.target_input = "1000".into();
        s.price_input = "299".into();
        assert!(calculate(&s, &opts).quote().is_some());

        s.switch_mode(Mode::ForwardFromPrice);
        let out = calculate(&s, &opts);
        assert_eq!(out.result, Err(CalcError::BelowMinimumPrice));
        assert_eq!(out.profit_text(), "Invalid input (300+)");
        assert_eq!(out.fee_text(), "---");
    }

    #[test]
    fn blank_manual_shipping_blocks_calculation() {
        let opts = default_options();
        let mut s = state(&opts);
        assert!(s.on_shipping_change(&opts, 0));
        s.target_input = "1000".into();

        let out = calculate(&s, &opts);
        assert_eq!(out.result, Err(CalcError::InvalidShipping));
        assert_eq!(out.price_text(), "Invalid input");
        assert_eq!(out.profit_text(), "Invalid input");
        assert_eq!(out.fee_text(), "---");
        assert_eq!(out.shipping_text(), "---");
    }

    #[test]
    fn reverse_record_takes_profit_from_target() {
        let opts = default_options();
        let mut s = state(&opts);
        s.target_input = "1000".into();
        s.memo = "  Jacket ".into();

        let out = calculate(&s, &opts);
        let r = build_record(&s, &out, &opts, "2024/5/3".into()).unwrap();
        assert_eq!(r.memo, "Jacket");
        assert_eq!(r.profit, 1000);
        assert_eq!(r.shipping, 210);
        assert_eq!(r.price, 1345);
        assert_eq!(r.fee, 134);
        assert_eq!(r.shipping_method, "Nekopos");
    }

    #[test]
    fn forward_record_takes_price_from_input() {
        let opts = default_options();
        let mut s = state(&opts);
        s.switch_mode(Mode::ForwardFromPrice);
        s.price_input = "2000".into();

        let out = calculate(&s, &opts);
        let r = build_record(&s, &out, &opts, "2024/5/3".into()).unwrap();
        assert_eq!(r.memo, MEMO_PLACEHOLDER);
        assert_eq!(r.price, 2000);
        assert_eq!(r.fee, 200);
        assert_eq!(r.profit, 2000 - 200 - 210);
    }

    #[test]
    fn save_appends_and_clears_memo() {
        let opts = default_options();
        let mut store = RecordStore::open_in_memory().unwrap();
        let mut s = state(&opts);
        s.target_input = "500".into();
        s.memo = "Scarf".into();

        let saved = save_item(&mut s, &opts, &mut store, true).unwrap();
        assert!(s.memo.is_empty());
        assert_eq!(s.target_input, "500");
        assert_eq!(store.load(Collection::Inventory), vec![saved]);
        assert!(store.load(Collection::History).is_empty());
    }

    #[test]
    fn invalid_calculation_is_not_saved() {
        let opts = default_options();
        let mut store = RecordStore::open_in_memory().unwrap();
        let mut s = state(&opts);
        s.target_input = "abc".into();
        s.memo = "Scarf".into();

        let err = save_item(&mut s, &opts, &mut store, false).unwrap_err();
        assert!(matches!(err, Error::Calc(CalcError::NothingToSave)));
        assert_eq!(s.memo, "Scarf");
        assert!(store.load(Collection::History).is_empty());
    }

    #[test]
    fn today_has_no_zero_padding() {
        let d = today();
        let parts: Vec<&str> = d.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert!(!parts[1].starts_with('0'));
        assert!(!parts[2].starts_with('0'));
    }
}
