//! Voucher Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::VoucherCode;

/// How the discount is applied to a qualifying order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` is a percentage (0, 100]; the absolute discount is
    /// capped by `max_discount`.
    Percentage,
    /// `discount_value` is an absolute amount.
    Fixed,
}

/// Derived, never persisted. Always recomputed from the voucher's fields plus
/// the current time, so it cannot drift from the latest data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    Active,
    Upcoming,
    Expired,
    UsedUp,
    Disabled,
}

impl VoucherStatus {
    /// Fixed display priority: most actionable first. This ordering is the
    /// primary sort key for voucher lists and is never reversed by the
    /// caller's chosen direction.
    pub fn priority(self) -> u8 {
        match self {
            Self::Active => 1,
            Self::Upcoming => 2,
            Self::UsedUp => 3,
            Self::Expired => 4,
            Self::Disabled => 5,
        }
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Upcoming => "UPCOMING",
            Self::Expired => "EXPIRED",
            Self::UsedUp => "USED_UP",
            Self::Disabled => "DISABLED",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: Uuid,
    /// Immutable after creation.
    pub code: VoucherCode,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    /// Order subtotal threshold required to redeem the voucher. Zero means
    /// no threshold.
    pub min_order_value: Decimal,
    /// Caps the absolute discount; only meaningful for percentage vouchers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub usage_limit: u32,
    /// Incremented exclusively by the external redemption process.
    pub used_count: u32,
    /// Soft delete: once true the record is administratively disabled and no
    /// further edits are permitted.
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// Derive the voucher's runtime status at `now`.
    ///
    /// Precedence, first match wins:
    /// 1. disabled — administrative disable always wins, never masked by timing
    /// 2. upcoming — not yet started
    /// 3. expired — checked before usage, so a voucher that is both expired
    ///    and used up reports `Expired` (a deliberate tie-break)
    /// 4. used up
    /// 5. active
    pub fn status(&self, now: DateTime<Utc>) -> VoucherStatus {
        if self.is_deleted {
            return VoucherStatus::Disabled;
        }
        if now < self.start_date {
            return VoucherStatus::Upcoming;
        }
        if now > self.end_date {
            return VoucherStatus::Expired;
        }
        if self.used_count >= self.usage_limit {
            return VoucherStatus::UsedUp;
        }
        VoucherStatus::Active
    }

    pub fn is_editable(&self) -> bool {
        !self.is_deleted
    }

    pub fn remaining_uses(&self) -> u32 {
        self.usage_limit.saturating_sub(self.used_count)
    }

    /// One-way soft transition; repeating it is a no-op.
    pub fn disable(&mut self, now: DateTime<Utc>) {
        if !self.is_deleted {
            self.is_deleted = true;
            self.touch(now);
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
