//! Domain events
//!
//! Raised by the CRUD orchestrator after a mutation settles successfully and
//! drained by the caller (e.g. to drive UI notifications). The queue is owned
//! by the service instance; nothing global.
use crate::domain::value_objects::VoucherCode;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    Voucher(VoucherEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoucherEvent {
    Created { voucher_id: Uuid, code: VoucherCode },
    Updated { voucher_id: Uuid },
    Disabled { voucher_id: Uuid },
}
