//! Access control and visibility resolution.
//!
//! # Responsibility
//! - Answer, for any (actor, record) pair, what is visible, what is
//!   editable, and who is a valid messaging counterparty.
//! - Stay a pure, synchronous computation over caller-provided
//!   snapshots; no storage access, no clock, no randomness.
//!
//! # Invariants
//! - Identical inputs always yield identical decisions.
//! - Denial is a typed result, never an error; integrity problems in
//!   input data are reported, never silently repaired.
//!
//! # See also
//! - docs/architecture/access-model.md

pub mod messaging;
pub mod mutation;
pub mod relationship;
pub mod visibility;
