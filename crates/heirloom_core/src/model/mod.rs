//! Canonical domain model for estate, item, and messaging records.
//!
//! # Responsibility
//! - Define the data structures shared by resolver, repositories, and
//!   services.
//! - Keep validation of record-local invariants next to each record.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Deletion of users and items is represented by soft-delete
//!   tombstones, not hard delete.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod estate;
pub mod item;
pub mod message;
pub mod notification;
pub mod role;
pub mod user;
