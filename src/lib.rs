//! Voucher Lifecycle & Discount Validation Engine
//!
//! Storefront-admin logic for discount vouchers: derived runtime status,
//! field and cross-field validation of create/update payloads, status-aware
//! sorting and filtering, and CRUD orchestration over a remote voucher store.
//!
//! ## Features
//! - Derived voucher status (active/upcoming/expired/used-up/disabled)
//! - Interdependent business-rule validation before any network call
//! - Status-priority sorting with caller-selected secondary key
//! - Soft-delete lifecycle (vouchers are disabled, never removed)
//!
//! Time is always injected: every temporal decision takes an explicit `now`,
//! so the engine is deterministic under test.

use thiserror::Error;

pub mod domain;
pub mod listing;
pub mod service;
pub mod validation;

pub use domain::aggregates::voucher::{DiscountType, Voucher, VoucherStatus};
pub use domain::events::{DomainEvent, VoucherEvent};
pub use domain::value_objects::VoucherCode;
pub use listing::{filter_vouchers, sort_vouchers, SortDirection, SortKey, VoucherFilters};
pub use service::{ApiEnvelope, StoreError, StoreErrorKind, VoucherService, VoucherStore};
pub use validation::{
    parse_voucher_input, validate_field, validate_voucher_input, ValidationMode, ValidationReport,
    VoucherInput, VoucherPayload,
};

// =============================================================================
// Error Types
// =============================================================================

/// Engine-level error taxonomy.
///
/// `Validation` and `VoucherDisabled` are resolved locally and never reach the
/// transport layer. The remaining categories originate server-side; their
/// messages are passed through verbatim, with a generic per-category fallback
/// when the server supplies none.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("voucher input failed validation")]
    Validation(validation::ValidationReport),

    #[error("voucher is disabled and can no longer be edited")]
    VoucherDisabled,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Transient(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
