//! Relationship index derived from an estate snapshot.
//!
//! # Responsibility
//! - Build the executor-to-estate and beneficiary-to-estate lookup maps
//!   every scoped visibility/eligibility decision reads.
//!
//! # Invariants
//! - Duplicate estate ids in the snapshot fail the build; the rest of
//!   the snapshot is never half-applied.
//! - Ids referencing non-existent users are retained as-is. Referential
//!   integrity against the user set is the entity store's job and must
//!   not crash the build.
//! - The index is never persisted; callers rebuild it from a fresh
//!   snapshot per decision.

use crate::model::estate::{Estate, EstateId};
use crate::model::user::UserId;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lookup tables scoping executors and beneficiaries to their estates.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    estate_of_executor: HashMap<UserId, EstateId>,
    estate_of_beneficiary: HashMap<UserId, EstateId>,
    diagnostics: Vec<IndexDiagnostic>,
}

impl RelationshipIndex {
    /// Builds the index from an estate snapshot.
    ///
    /// Snapshot order is irrelevant for correctness except when one user
    /// is associated with several estates: the first association wins
    /// and the conflict is recorded as a diagnostic.
    pub fn build(estates: &[Estate]) -> Result<Self, DataIntegrityError> {
        let mut seen_estates = HashSet::with_capacity(estates.len());
        let mut index = Self::default();

        for estate in estates {
            if !seen_estates.insert(estate.uuid) {
                return Err(DataIntegrityError::DuplicateEstateId(estate.uuid));
            }

            if let Some(executor) = estate.executor_uuid {
                match index.estate_of_executor.get(&executor) {
                    None => {
                        index.estate_of_executor.insert(executor, estate.uuid);
                    }
                    Some(kept) => index.diagnostics.push(IndexDiagnostic::ConflictingExecutor {
                        user: executor,
                        kept: *kept,
                        ignored: estate.uuid,
                    }),
                }
            }

            for beneficiary in &estate.beneficiary_uuids {
                match index.estate_of_beneficiary.get(beneficiary) {
                    None => {
                        index.estate_of_beneficiary.insert(*beneficiary, estate.uuid);
                    }
                    Some(kept) => {
                        index
                            .diagnostics
                            .push(IndexDiagnostic::ConflictingBeneficiary {
                                user: *beneficiary,
                                kept: *kept,
                                ignored: estate.uuid,
                            });
                    }
                }
            }
        }

        Ok(index)
    }

    /// Returns the estate managed by the given executor, if any.
    pub fn estate_of_executor(&self, user: UserId) -> Option<EstateId> {
        self.estate_of_executor.get(&user).copied()
    }

    /// Returns the estate the given beneficiary belongs to, if any.
    pub fn estate_of_beneficiary(&self, user: UserId) -> Option<EstateId> {
        self.estate_of_beneficiary.get(&user).copied()
    }

    /// Returns non-fatal integrity findings recorded during the build.
    ///
    /// The caller decides whether to fail the request or proceed with
    /// the first-association-wins mappings.
    pub fn diagnostics(&self) -> &[IndexDiagnostic] {
        &self.diagnostics
    }
}

/// Non-fatal integrity findings from an index build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexDiagnostic {
    /// One user is listed as executor of more than one estate.
    ConflictingExecutor {
        user: UserId,
        kept: EstateId,
        ignored: EstateId,
    },
    /// One user is listed as beneficiary of more than one estate.
    ConflictingBeneficiary {
        user: UserId,
        kept: EstateId,
        ignored: EstateId,
    },
}

/// Fatal snapshot integrity errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    DuplicateEstateId(EstateId),
}

impl Display for DataIntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEstateId(id) => {
                write!(f, "estate snapshot contains duplicate estate id: {id}")
            }
        }
    }
}

impl Error for DataIntegrityError {}
