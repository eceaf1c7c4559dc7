//! Aggregates module
pub mod voucher;

pub use voucher::{DiscountType, Voucher, VoucherStatus};
