//! Voucher input validation
//!
//! Raw form input arrives as strings; field rules parse and range-check each
//! field independently so every error can be shown at once, then cross-field
//! rules check the relationships between otherwise-valid fields. Validation
//! failures are resolved locally and never cost a network round-trip.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::aggregates::voucher::DiscountType;
use crate::domain::value_objects::VoucherCode;

/// Field names used as keys in a [`ValidationReport`].
pub mod field {
    pub const CODE: &str = "code";
    pub const DISCOUNT_VALUE: &str = "discount_value";
    pub const MIN_ORDER_VALUE: &str = "min_order_value";
    pub const MAX_DISCOUNT: &str = "max_discount";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const USAGE_LIMIT: &str = "usage_limit";
}

/// Raw create/update form payload. Blank strings mean "not supplied";
/// zero is a value, blank is not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoucherInput {
    #[serde(default)]
    pub code: String,
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: String,
    #[serde(default)]
    pub min_order_value: String,
    #[serde(default)]
    pub max_discount: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub usage_limit: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    /// Updates carry the persisted redemption tally so the usage-limit floor
    /// can be enforced; `code` is immutable and excluded from validation.
    Update { current_used_count: u32 },
}

/// Map of field name to the first error reported for that field.
/// Empty map = valid payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Field-level rules run first, so the first message per field wins.
    fn reject(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        let fields: Vec<&str> = self.errors.keys().copied().collect();
        write!(f, "{} invalid field(s): {}", fields.len(), fields.join(", "))
    }
}

/// Typed payload produced from a validated input, ready for submission.
/// `code` is `None` on update (immutable after creation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoucherPayload {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<VoucherCode>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_discount: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub usage_limit: u32,
}

/// Validate a full payload and, when valid, return it in typed form.
pub fn parse_voucher_input(
    input: &VoucherInput,
    mode: ValidationMode,
    now: DateTime<Utc>,
) -> Result<VoucherPayload, ValidationReport> {
    let mut report = ValidationReport::default();

    // Field rules never short-circuit each other.
    let code = match mode {
        ValidationMode::Create => collect(&mut report, field::CODE, code_rule(&input.code)),
        ValidationMode::Update { .. } => None,
    };
    let discount_value = collect(
        &mut report,
        field::DISCOUNT_VALUE,
        discount_value_rule(&input.discount_value, input.discount_type),
    );
    let min_order_value = collect(
        &mut report,
        field::MIN_ORDER_VALUE,
        min_order_value_rule(&input.min_order_value),
    );
    let max_discount = collect(
        &mut report,
        field::MAX_DISCOUNT,
        max_discount_rule(&input.max_discount, input.discount_type),
    )
    .flatten();
    let start_date = collect(&mut report, field::START_DATE, start_date_rule(&input.start_date));
    let end_date = collect(&mut report, field::END_DATE, end_date_rule(&input.end_date));
    let usage_limit = collect(&mut report, field::USAGE_LIMIT, usage_limit_rule(&input.usage_limit));

    // Date relations need both parsed values. An existing voucher may keep a
    // past start date; only creation pins the start to today or later.
    if let Some(start) = start_date {
        if matches!(mode, ValidationMode::Create) && start.date_naive() < now.date_naive() {
            report.reject(field::START_DATE, "Start date cannot be in the past");
        }
        if let Some(end) = end_date {
            if end <= start {
                report.reject(field::END_DATE, "End date must be after the start date");
            }
        }
    }

    // Cross-field rules, applied only when the involved fields parsed cleanly.
    if input.discount_type == DiscountType::Fixed {
        if let (Some(value), Some(min_order)) = (discount_value, min_order_value) {
            // A fixed discount above the qualifying threshold would allow
            // negative-net orders.
            if min_order > Decimal::ZERO && value > min_order {
                report.reject(
                    field::DISCOUNT_VALUE,
                    "Fixed discount cannot exceed the minimum order value",
                );
            }
        }
    }
    if input.discount_type == DiscountType::Percentage && max_discount.is_none() {
        // final gate; ordinarily already reported by the field rule
        report.reject(
            field::MAX_DISCOUNT,
            "Maximum discount is required for percentage vouchers",
        );
    }
    if let ValidationMode::Update { current_used_count } = mode {
        if let Some(limit) = usage_limit {
            if limit < current_used_count {
                report.reject(
                    field::USAGE_LIMIT,
                    format!(
                        "Usage limit cannot be lower than the {current_used_count} redemptions already recorded"
                    ),
                );
            }
        }
    }

    if !report.is_valid() {
        return Err(report);
    }
    let (Some(discount_value), Some(min_order_value), Some(start_date), Some(end_date), Some(usage_limit)) =
        (discount_value, min_order_value, start_date, end_date, usage_limit)
    else {
        // unreachable: a missing value always carries an error
        return Err(report);
    };
    Ok(VoucherPayload {
        code,
        discount_type: input.discount_type,
        discount_value,
        min_order_value,
        max_discount,
        start_date,
        end_date,
        usage_limit,
    })
}

/// Validate a full payload, reporting every field error at once.
pub fn validate_voucher_input(
    input: &VoucherInput,
    mode: ValidationMode,
    now: DateTime<Utc>,
) -> ValidationReport {
    match parse_voucher_input(input, mode, now) {
        Ok(_) => ValidationReport::default(),
        Err(report) => report,
    }
}

/// Validate a single field's raw value, for per-keystroke UI feedback.
///
/// Covers the context-free rules only; date relations (`end_date` after
/// `start_date`, create-time start floor) and cross-field rules need the full
/// payload and are applied by [`validate_voucher_input`].
pub fn validate_field(name: &str, raw: &str, discount_type: DiscountType) -> Option<String> {
    match name {
        field::CODE => code_rule(raw).err(),
        field::DISCOUNT_VALUE => discount_value_rule(raw, discount_type).err(),
        field::MIN_ORDER_VALUE => min_order_value_rule(raw).err(),
        field::MAX_DISCOUNT => max_discount_rule(raw, discount_type).err(),
        field::START_DATE => start_date_rule(raw).err(),
        field::END_DATE => end_date_rule(raw).err(),
        field::USAGE_LIMIT => usage_limit_rule(raw).err(),
        _ => None,
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn code_rule(raw: &str) -> Result<VoucherCode, String> {
    if raw.trim().is_empty() {
        return Err("Code is required".to_string());
    }
    VoucherCode::new(raw).map_err(|e| e.to_string())
}

fn discount_value_rule(raw: &str, discount_type: DiscountType) -> Result<Decimal, String> {
    if raw.trim().is_empty() {
        return Err("Discount value is required".to_string());
    }
    let value = parse_number(raw).ok_or_else(|| "Discount value must be a number".to_string())?;
    if value <= Decimal::ZERO {
        return Err("Discount value must be greater than zero".to_string());
    }
    if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err("Percentage discount cannot exceed 100".to_string());
    }
    Ok(value)
}

fn min_order_value_rule(raw: &str) -> Result<Decimal, String> {
    if raw.trim().is_empty() {
        return Err("Minimum order value is required".to_string());
    }
    let value = parse_number(raw).ok_or_else(|| "Minimum order value must be a number".to_string())?;
    if value < Decimal::ZERO {
        return Err("Minimum order value cannot be negative".to_string());
    }
    Ok(value)
}

fn max_discount_rule(raw: &str, discount_type: DiscountType) -> Result<Option<Decimal>, String> {
    // Not applicable to fixed discounts; whatever the form holds is ignored.
    if discount_type == DiscountType::Fixed {
        return Ok(None);
    }
    if raw.trim().is_empty() {
        return Err("Maximum discount is required for percentage vouchers".to_string());
    }
    let value = parse_number(raw).ok_or_else(|| "Maximum discount must be a number".to_string())?;
    if value <= Decimal::ZERO {
        return Err("Maximum discount must be greater than zero".to_string());
    }
    Ok(Some(value))
}

fn start_date_rule(raw: &str) -> Result<DateTime<Utc>, String> {
    if raw.trim().is_empty() {
        return Err("Start date is required".to_string());
    }
    parse_instant(raw).ok_or_else(|| "Start date is not a valid date".to_string())
}

fn end_date_rule(raw: &str) -> Result<DateTime<Utc>, String> {
    if raw.trim().is_empty() {
        return Err("End date is required".to_string());
    }
    parse_instant(raw).ok_or_else(|| "End date is not a valid date".to_string())
}

fn usage_limit_rule(raw: &str) -> Result<u32, String> {
    if raw.trim().is_empty() {
        return Err("Usage limit is required".to_string());
    }
    let limit: u32 = raw
        .trim()
        .parse()
        .map_err(|_| "Usage limit must be a whole number".to_string())?;
    if limit < 1 {
        return Err("Usage limit must be at least 1".to_string());
    }
    Ok(limit)
}

// =============================================================================
// Parse helpers
// =============================================================================

fn collect<T>(report: &mut ValidationReport, field: &'static str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            report.reject(field, message);
            None
        }
    }
}

fn parse_number(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// Accepts RFC 3339 instants or plain `YYYY-MM-DD` (form date inputs),
/// the latter interpreted as midnight UTC.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
