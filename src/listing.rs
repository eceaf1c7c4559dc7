//! Status-aware sorting and filtering of voucher collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::aggregates::voucher::{DiscountType, Voucher, VoucherStatus};

/// Caller-selected secondary sort key; breaks ties within a status group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Code,
    StartDate,
    EndDate,
    DiscountValue,
    UsageLimit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// ANDed list predicates. `None` (or an empty search term) is a no-op for
/// that predicate.
#[derive(Clone, Debug, Default)]
pub struct VoucherFilters {
    pub status: Option<VoucherStatus>,
    pub discount_type: Option<DiscountType>,
    pub search: String,
}

/// Order a voucher collection for display.
///
/// Two-level comparator, always in this order: status priority first
/// (most actionable group on top, never reversed by `direction`), then the
/// caller's secondary key with the caller's direction. The sort is stable.
pub fn sort_vouchers(
    vouchers: &[Voucher],
    now: DateTime<Utc>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<Voucher> {
    let mut out = vouchers.to_vec();
    out.sort_by(|a, b| {
        let by_status = a.status(now).priority().cmp(&b.status(now).priority());
        if by_status != Ordering::Equal {
            return by_status;
        }
        let secondary = match key {
            SortKey::Code => a.code.as_str().cmp(b.code.as_str()),
            SortKey::StartDate => a.start_date.cmp(&b.start_date),
            SortKey::EndDate => a.end_date.cmp(&b.end_date),
            SortKey::DiscountValue => a.discount_value.cmp(&b.discount_value),
            SortKey::UsageLimit => a.usage_limit.cmp(&b.usage_limit),
        };
        match direction {
            SortDirection::Asc => secondary,
            SortDirection::Desc => secondary.reverse(),
        }
    });
    out
}

/// Select the vouchers matching every active predicate. Status is derived per
/// voucher at `now`, never read from storage. The search term is normalized
/// to uppercase to match code normalization.
pub fn filter_vouchers(vouchers: &[Voucher], now: DateTime<Utc>, filters: &VoucherFilters) -> Vec<Voucher> {
    let needle = filters.search.trim().to_uppercase();
    vouchers
        .iter()
        .filter(|v| filters.status.map_or(true, |s| v.status(now) == s))
        .filter(|v| filters.discount_type.map_or(true, |d| v.discount_type == d))
        .filter(|v| needle.is_empty() || v.code.as_str().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::VoucherCode;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        date(2024, 6, 15)
    }

    fn voucher(code: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Voucher {
        Voucher {
            id: Uuid::new_v4(),
            code: VoucherCode::new(code).unwrap(),
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::new(1_000, 0),
            min_order_value: Decimal::new(5_000, 0),
            max_discount: None,
            start_date: start,
            end_date: end,
            usage_limit: 10,
            used_count: 0,
            is_deleted: false,
            created_at: start,
            updated_at: start,
        }
    }

    fn active(code: &str) -> Voucher {
        voucher(code, date(2024, 6, 1), date(2024, 7, 1))
    }

    fn expired(code: &str) -> Voucher {
        voucher(code, date(2024, 1, 1), date(2024, 2, 1))
    }

    fn upcoming(code: &str) -> Voucher {
        voucher(code, date(2024, 8, 1), date(2024, 9, 1))
    }

    fn codes(vouchers: &[Voucher]) -> Vec<&str> {
        vouchers.iter().map(|v| v.code.as_str()).collect()
    }

    #[test]
    fn test_status_groups_precede_column_sort() {
        // AAA is expired and alphabetically first; active vouchers still win.
        let list = vec![expired("AAA"), active("ZZZ"), active("MMM")];
        let sorted = sort_vouchers(&list, now(), SortKey::Code, SortDirection::Asc);
        assert_eq!(codes(&sorted), vec!["MMM", "ZZZ", "AAA"]);
    }

    #[test]
    fn test_direction_never_reverses_status_order() {
        let list = vec![expired("AAA"), active("ZZZ"), active("MMM")];
        let sorted = sort_vouchers(&list, now(), SortKey::Code, SortDirection::Desc);
        assert_eq!(codes(&sorted), vec!["ZZZ", "MMM", "AAA"]);
    }

    #[test]
    fn test_full_priority_ladder() {
        let mut disabled = active("DIS01");
        disabled.is_deleted = true;
        let mut used_up = active("USED1");
        used_up.used_count = used_up.usage_limit;
        let list = vec![
            disabled,
            expired("EXP01"),
            used_up,
            upcoming("SOON1"),
            active("LIVE1"),
        ];
        let sorted = sort_vouchers(&list, now(), SortKey::Code, SortDirection::Asc);
        assert_eq!(codes(&sorted), vec!["LIVE1", "SOON1", "USED1", "EXP01", "DIS01"]);
    }

    #[test]
    fn test_secondary_keys() {
        let mut a = active("AAA");
        a.discount_value = Decimal::new(500, 0);
        a.usage_limit = 3;
        let mut b = active("BBB");
        b.discount_value = Decimal::new(2_000, 0);
        b.usage_limit = 7;
        let list = vec![a, b];

        let by_value = sort_vouchers(&list, now(), SortKey::DiscountValue, SortDirection::Desc);
        assert_eq!(codes(&by_value), vec!["BBB", "AAA"]);
        let by_limit = sort_vouchers(&list, now(), SortKey::UsageLimit, SortDirection::Asc);
        assert_eq!(codes(&by_limit), vec!["AAA", "BBB"]);
    }

    #[test]
    fn test_chronological_keys() {
        let early = voucher("EARLY", date(2024, 6, 1), date(2024, 6, 20));
        let late = voucher("LATER", date(2024, 6, 10), date(2024, 7, 10));
        let list = vec![late.clone(), early.clone()];

        let by_start = sort_vouchers(&list, now(), SortKey::StartDate, SortDirection::Asc);
        assert_eq!(codes(&by_start), vec!["EARLY", "LATER"]);
        let by_end = sort_vouchers(&list, now(), SortKey::EndDate, SortDirection::Desc);
        assert_eq!(codes(&by_end), vec!["LATER", "EARLY"]);
    }

    #[test]
    fn test_filter_all_sentinels_are_noops() {
        let list = vec![active("AAA"), expired("BBB")];
        let out = filter_vouchers(&list, now(), &VoucherFilters::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_filter_by_derived_status() {
        let list = vec![active("AAA"), expired("BBB"), upcoming("CCC")];
        let filters = VoucherFilters { status: Some(VoucherStatus::Expired), ..Default::default() };
        assert_eq!(codes(&filter_vouchers(&list, now(), &filters)), vec!["BBB"]);
    }

    #[test]
    fn test_filter_by_discount_type() {
        let mut pct = active("PCT10");
        pct.discount_type = DiscountType::Percentage;
        pct.max_discount = Some(Decimal::new(1_000, 0));
        let list = vec![active("FIX10"), pct];
        let filters = VoucherFilters { discount_type: Some(DiscountType::Percentage), ..Default::default() };
        assert_eq!(codes(&filter_vouchers(&list, now(), &filters)), vec!["PCT10"]);
    }

    #[test]
    fn test_search_is_substring_and_case_normalized() {
        let list = vec![active("SUMMER10"), active("WINTER20")];
        let filters = VoucherFilters { search: "mmer".into(), ..Default::default() };
        assert_eq!(codes(&filter_vouchers(&list, now(), &filters)), vec!["SUMMER10"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let mut pct = active("SUMMERPCT");
        pct.discount_type = DiscountType::Percentage;
        pct.max_discount = Some(Decimal::new(1_000, 0));
        let list = vec![active("SUMMER10"), pct.clone(), expired("SUMMEROLD")];
        let filters = VoucherFilters {
            status: Some(VoucherStatus::Active),
            discount_type: Some(DiscountType::Percentage),
            search: "SUMMER".into(),
        };
        assert_eq!(codes(&filter_vouchers(&list, now(), &filters)), vec!["SUMMERPCT"]);
    }
}
