use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::InputError;

/// Column order the scaler and clusterer were fitted with.
pub const FEATURE_NAMES: [&str; 7] = [
    "avg_quantity",
    "avg_price",
    "avg_pnl",
    "pnl_volatility",
    "num_trades",
    "buy_sell_ratio",
    "win_rate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    NumberInput,
    Slider,
}

/// Form metadata for one feature: label, widget bounds, default value and the hint shown under it.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: f64,
    pub widget: Widget,
    pub hint: &'static str,
}

pub const FEATURE_FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        name: "avg_quantity",
        label: "Average Quantity",
        min: Some(1.0),
        max: Some(100000.0),
        default: 45.0,
        widget: Widget::NumberInput,
        hint: "Min: 1.0 \u{a0}\u{a0} Max: 100000.0",
    },
    FieldSpec {
        name: "avg_price",
        label: "Average Price",
        min: Some(0.0),
        max: Some(100000.0),
        default: 1750.0,
        widget: Widget::NumberInput,
        hint: "Min: 0.0 \u{a0}\u{a0} Max: 100000.0",
    },
    FieldSpec {
        name: "avg_pnl",
        label: "Average PnL",
        min: None,
        max: None,
        default: 200.0,
        widget: Widget::NumberInput,
        hint: "No strict range (depends on strategy)",
    },
    FieldSpec {
        name: "pnl_volatility",
        label: "PnL Volatility",
        min: None,
        max: None,
        default: 1500.0,
        widget: Widget::NumberInput,
        hint: "No strict range",
    },
    FieldSpec {
        name: "num_trades",
        label: "Number of Trades",
        min: Some(1.0),
        max: Some(10000.0),
        default: 20.0,
        widget: Widget::NumberInput,
        hint: "Min: 1.0 \u{a0}\u{a0} Max: 10000.0",
    },
    FieldSpec {
        name: "buy_sell_ratio",
        label: "Buy/Sell Ratio",
        min: None,
        max: None,
        default: 1.5,
        widget: Widget::NumberInput,
        hint: "Recommended range: 0.0 \u{2013} 10.0",
    },
    FieldSpec {
        name: "win_rate",
        label: "Win Rate",
        min: Some(0.0),
        max: Some(1.0),
        default: 0.7,
        widget: Widget::Slider,
        hint: "",
    },
];

/// One row of trading-behaviour metrics, as submitted by the form or the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub avg_quantity: f64,
    pub avg_price: f64,
    pub avg_pnl: f64,
    pub pnl_volatility: f64,
    pub num_trades: f64,
    pub buy_sell_ratio: f64,
    pub win_rate: f64,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        FeatureRecord {
            avg_quantity: FEATURE_FIELDS[0].default,
            avg_price: FEATURE_FIELDS[1].default,
            avg_pnl: FEATURE_FIELDS[2].default,
            pnl_volatility: FEATURE_FIELDS[3].default,
            num_trades: FEATURE_FIELDS[4].default,
            buy_sell_ratio: FEATURE_FIELDS[5].default,
            win_rate: FEATURE_FIELDS[6].default,
        }
    }
}

impl FeatureRecord {
    /// Values in `FEATURE_NAMES` order.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.avg_quantity,
            self.avg_price,
            self.avg_pnl,
            self.pnl_volatility,
            self.num_trades,
            self.buy_sell_ratio,
            self.win_rate,
        ]
    }

    /// Builds a record from raw url-encoded form fields, naming the first field that is missing
    /// or does not parse as a number.
    pub fn from_form_fields(fields: &HashMap<String, String>) -> Result<Self, InputError> {
        let mut values = [0.0; 7];
        for (slot, spec) in values.iter_mut().zip(FEATURE_FIELDS.iter()) {
            let raw = fields.get(spec.name).map_or("", |v| v.trim());
            if raw.is_empty() {
                return Err(InputError::Missing { field: spec.name });
            }
            *slot = raw.parse::<f64>().map_err(|_| InputError::NotANumber {
                field: spec.name,
                value: raw.to_string(),
            })?;
        }
        let [avg_quantity, avg_price, avg_pnl, pnl_volatility, num_trades, buy_sell_ratio, win_rate] =
            values;
        Ok(FeatureRecord {
            avg_quantity,
            avg_price,
            avg_pnl,
            pnl_volatility,
            num_trades,
            buy_sell_ratio,
            win_rate,
        })
    }

    /// Applies the widget bounds. Bounds are inclusive; unbounded fields only need to be finite.
    pub fn validate(&self) -> Result<(), InputError> {
        for (spec, value) in FEATURE_FIELDS.iter().zip(self.to_vec()) {
            if !value.is_finite() {
                return Err(InputError::NotFinite { field: spec.name });
            }
            let min = spec.min.unwrap_or(f64::NEG_INFINITY);
            let max = spec.max.unwrap_or(f64::INFINITY);
            if value < min || value > max {
                return Err(InputError::OutOfRange {
                    field: spec.name,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}
