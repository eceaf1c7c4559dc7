//! CRUD orchestration over the remote voucher store.
//!
//! Each operation runs idle → validating → submitting → settled from the
//! caller's perspective: invalid input is rejected locally before any network
//! call, then a single request is awaited and its envelope normalized, then
//! the local collection is updated and a domain event queued. The phases are
//! observable through `tracing`, not through shared mutable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::voucher::Voucher;
use crate::domain::events::{DomainEvent, VoucherEvent};
use crate::validation::{parse_voucher_input, ValidationMode, VoucherInput, VoucherPayload};
use crate::{EngineError, Result};

// =============================================================================
// Transport envelope
// =============================================================================

/// The single response shape accepted from the persistence API. Adapting
/// whatever the server actually sends into this envelope is the transport
/// layer's job; the engine never sees duck-typed payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, message: None, data: Some(data) }
    }

    /// Server-side business-rule rejection (e.g. duplicate code).
    pub fn rejected(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None }
    }

    /// Normalize the envelope: a rejection keeps the server's message
    /// verbatim, a success without a payload is treated as a transport fault.
    pub fn into_result(self) -> std::result::Result<T, StoreError> {
        if !self.success {
            return Err(StoreError { kind: StoreErrorKind::Conflict, message: self.message });
        }
        self.data.ok_or_else(|| StoreError {
            kind: StoreErrorKind::Transient,
            message: Some("Server response was missing its payload".to_string()),
        })
    }
}

// =============================================================================
// Store collaborator
// =============================================================================

/// Server-side failure categories. Business rejections are never retried;
/// transient failures may be retried by the surrounding transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreErrorKind {
    Unauthorized,
    NotFound,
    Conflict,
    Transient,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or("store request failed"))]
pub struct StoreError {
    pub kind: StoreErrorKind,
    /// Server-reported reason, passed through verbatim when present.
    pub message: Option<String>,
}

fn or_fallback(message: Option<String>, fallback: &str) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => m,
        _ => fallback.to_string(),
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err.kind {
            StoreErrorKind::Unauthorized => {
                Self::Unauthorized(or_fallback(err.message, "You are not allowed to manage vouchers"))
            }
            StoreErrorKind::NotFound => {
                Self::NotFound(or_fallback(err.message, "The voucher no longer exists"))
            }
            StoreErrorKind::Conflict => Self::Conflict(or_fallback(
                err.message,
                "The request conflicts with an existing voucher",
            )),
            StoreErrorKind::Transient => Self::Transient(or_fallback(
                err.message,
                "The voucher service is temporarily unavailable",
            )),
        }
    }
}

/// Persistence collaborator, implemented by the transport layer.
///
/// Each call submits exactly one request; retry and timeout policy live with
/// the implementation, not the engine.
pub trait VoucherStore {
    fn create(
        &self,
        payload: &VoucherPayload,
    ) -> impl std::future::Future<Output = std::result::Result<ApiEnvelope<Voucher>, StoreError>> + Send;
    fn update(
        &self,
        id: Uuid,
        payload: &VoucherPayload,
    ) -> impl std::future::Future<Output = std::result::Result<ApiEnvelope<Voucher>, StoreError>> + Send;
    fn disable(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = std::result::Result<ApiEnvelope<Voucher>, StoreError>> + Send;
    fn get_all(
        &self,
    ) -> impl std::future::Future<Output = std::result::Result<ApiEnvelope<Vec<Voucher>>, StoreError>> + Send;
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Sequences validate → submit → normalize-response → update-local-collection
/// for voucher mutations, and owns the caller-drained event queue.
///
/// The service treats its collection as a snapshot; `used_count` is advanced
/// only by the external redemption process and picked up on [`refresh`].
///
/// [`refresh`]: VoucherService::refresh
pub struct VoucherService<S> {
    store: S,
    vouchers: Vec<Voucher>,
    events: Vec<DomainEvent>,
}

impl<S: VoucherStore> VoucherService<S> {
    pub fn new(store: S) -> Self {
        Self { store, vouchers: Vec::new(), events: Vec::new() }
    }

    /// Current local snapshot, in server order. Apply [`crate::sort_vouchers`]
    /// and [`crate::filter_vouchers`] per render pass.
    pub fn vouchers(&self) -> &[Voucher] {
        &self.vouchers
    }

    /// Drain queued domain events (the notification queue is caller-owned).
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the local snapshot with the server's collection.
    pub async fn refresh(&mut self) -> Result<&[Voucher]> {
        let vouchers = self.store.get_all().await?.into_result()?;
        tracing::debug!(count = vouchers.len(), "voucher snapshot refreshed");
        self.vouchers = vouchers;
        Ok(&self.vouchers)
    }

    /// Create a voucher. Invalid input is rejected before any store call.
    pub async fn create(&mut self, input: &VoucherInput, now: DateTime<Utc>) -> Result<Voucher> {
        tracing::debug!(code = %input.code, "validating voucher create");
        let payload = parse_voucher_input(input, ValidationMode::Create, now).map_err(|report| {
            tracing::debug!(%report, "voucher create rejected locally");
            EngineError::Validation(report)
        })?;
        tracing::debug!("submitting voucher create");
        let voucher = self.store.create(&payload).await?.into_result()?;
        self.vouchers.push(voucher.clone());
        self.events.push(DomainEvent::Voucher(VoucherEvent::Created {
            voucher_id: voucher.id,
            code: voucher.code.clone(),
        }));
        tracing::info!(voucher_id = %voucher.id, code = %voucher.code, "voucher created");
        Ok(voucher)
    }

    /// Update a voucher. Blocked entirely when the target is soft-deleted;
    /// the persisted `used_count` feeds the usage-limit floor and `code` is
    /// excluded from the editable field set.
    pub async fn update(&mut self, id: Uuid, input: &VoucherInput, now: DateTime<Utc>) -> Result<Voucher> {
        let current = self
            .vouchers
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| EngineError::NotFound("The voucher no longer exists".to_string()))?;
        if !current.is_editable() {
            return Err(EngineError::VoucherDisabled);
        }
        let mode = ValidationMode::Update { current_used_count: current.used_count };
        tracing::debug!(voucher_id = %id, "validating voucher update");
        let payload = parse_voucher_input(input, mode, now).map_err(|report| {
            tracing::debug!(voucher_id = %id, %report, "voucher update rejected locally");
            EngineError::Validation(report)
        })?;
        tracing::debug!(voucher_id = %id, "submitting voucher update");
        let voucher = self.store.update(id, &payload).await?.into_result()?;
        self.upsert(voucher.clone());
        self.events.push(DomainEvent::Voucher(VoucherEvent::Updated { voucher_id: id }));
        tracing::info!(voucher_id = %id, "voucher updated");
        Ok(voucher)
    }

    /// Disable (soft delete) a voucher. Safe to repeat: disabling an already
    /// disabled voucher settles locally without another round-trip. The
    /// record is marked deleted, never removed.
    pub async fn disable(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<Voucher> {
        if let Some(existing) = self.vouchers.iter().find(|v| v.id == id) {
            if existing.is_deleted {
                return Ok(existing.clone());
            }
        }
        tracing::debug!(voucher_id = %id, "submitting voucher disable");
        let envelope = self.store.disable(id).await?;
        if !envelope.success {
            return Err(StoreError { kind: StoreErrorKind::Conflict, message: envelope.message }.into());
        }
        let voucher = match envelope.data {
            Some(v) => {
                self.upsert(v.clone());
                v
            }
            None => {
                // server omitted the record; mark-deleted locally
                let slot = self
                    .vouchers
                    .iter_mut()
                    .find(|v| v.id == id)
                    .ok_or_else(|| EngineError::NotFound("The voucher no longer exists".to_string()))?;
                slot.disable(now);
                slot.clone()
            }
        };
        self.events.push(DomainEvent::Voucher(VoucherEvent::Disabled { voucher_id: id }));
        tracing::info!(voucher_id = %id, "voucher disabled");
        Ok(voucher)
    }

    fn upsert(&mut self, voucher: Voucher) {
        match self.vouchers.iter_mut().find(|v| v.id == voucher.id) {
            Some(slot) => *slot = voucher,
            None => self.vouchers.push(voucher),
        }
    }
}
