//! Domain model: the voucher entity, its value objects, and domain events.
pub mod aggregates;
pub mod events;
pub mod value_objects;
