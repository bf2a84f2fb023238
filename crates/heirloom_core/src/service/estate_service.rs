//! Estate and account management use-case service.
//!
//! # Responsibility
//! - Gate estate mutations behind the `can_manage_estates` capability
//!   and user-directory mutations behind the mutation authorizer.
//! - Enforce cross-record estate invariants above the repository layer.
//!
//! # Invariants
//! - An executor assignment must reference an active user whose role is
//!   Executor.
//! - A beneficiary link must reference an active user; duplicate links
//!   are rejected by estate validation.

use crate::access::mutation::{authorize_user, DenyReason, Operation};
use crate::model::estate::{Estate, EstateId};
use crate::model::role::Role;
use crate::model::user::{Actor, User, UserId};
use crate::repo::estate_repo::{EstateRepoError, EstateRepository};
use crate::repo::user_repo::{UserRepoError, UserRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from estate/account management operations.
#[derive(Debug)]
pub enum EstateServiceError {
    /// The actor may not perform this operation.
    AccessDenied(DenyReason),
    EstateNotFound(EstateId),
    UserNotFound(UserId),
    /// Executor assignment target does not hold the Executor role.
    NotAnExecutor(UserId),
    /// Beneficiary link target does not hold the Beneficiary role.
    NotABeneficiary(UserId),
    Repo(EstateRepoError),
    UserRepo(UserRepoError),
}

impl Display for EstateServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied(reason) => write!(f, "access denied: {reason}"),
            Self::EstateNotFound(id) => write!(f, "estate not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::NotAnExecutor(id) => {
                write!(f, "user is not an executor: {id}")
            }
            Self::NotABeneficiary(id) => {
                write!(f, "user is not a beneficiary: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::UserRepo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EstateServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UserRepo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EstateRepoError> for EstateServiceError {
    fn from(value: EstateRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<UserRepoError> for EstateServiceError {
    fn from(value: UserRepoError) -> Self {
        Self::UserRepo(value)
    }
}

/// Use-case service for estate and account management.
pub struct EstateService<E: EstateRepository, U: UserRepository> {
    estates: E,
    users: U,
}

impl<E: EstateRepository, U: UserRepository> EstateService<E, U> {
    pub fn new(estates: E, users: U) -> Self {
        Self { estates, users }
    }

    /// Creates an estate. Requires the `can_manage_estates` capability.
    pub fn create_estate(
        &self,
        actor: &Actor,
        display_name: impl Into<String>,
    ) -> Result<Estate, EstateServiceError> {
        self.require_estate_management(actor)?;

        let estate = Estate::new(display_name);
        self.estates.create_estate(&estate)?;
        info!(
            "event=estate_created module=service status=ok estate={} actor_role={}",
            estate.uuid, actor.role
        );
        Ok(estate)
    }

    /// Assigns the managing executor of an estate.
    ///
    /// The target must be an active user holding the Executor role.
    pub fn assign_executor(
        &self,
        actor: &Actor,
        estate_id: EstateId,
        executor: UserId,
    ) -> Result<(), EstateServiceError> {
        self.require_estate_management(actor)?;

        let user = self
            .users
            .get_user(executor, false)?
            .ok_or(EstateServiceError::UserNotFound(executor))?;
        if user.role != Role::Executor {
            return Err(EstateServiceError::NotAnExecutor(executor));
        }

        let mut estate = self
            .estates
            .get_estate(estate_id)?
            .ok_or(EstateServiceError::EstateNotFound(estate_id))?;
        estate.executor_uuid = Some(executor);
        self.estates.update_estate(&estate)?;
        Ok(())
    }

    /// Adds one beneficiary link to an estate.
    ///
    /// Duplicate links are rejected by estate validation before any
    /// write happens.
    pub fn add_beneficiary(
        &self,
        actor: &Actor,
        estate_id: EstateId,
        beneficiary: UserId,
    ) -> Result<(), EstateServiceError> {
        self.require_estate_management(actor)?;

        let user = self
            .users
            .get_user(beneficiary, false)?
            .ok_or(EstateServiceError::UserNotFound(beneficiary))?;
        if user.role != Role::Beneficiary {
            return Err(EstateServiceError::NotABeneficiary(beneficiary));
        }

        let mut estate = self
            .estates
            .get_estate(estate_id)?
            .ok_or(EstateServiceError::EstateNotFound(estate_id))?;
        estate.beneficiary_uuids.push(beneficiary);
        estate.validate().map_err(EstateRepoError::Validation)?;

        self.estates
            .set_beneficiaries(estate_id, &estate.beneficiary_uuids)?;
        Ok(())
    }

    /// Removes one beneficiary link from an estate.
    pub fn remove_beneficiary(
        &self,
        actor: &Actor,
        estate_id: EstateId,
        beneficiary: UserId,
    ) -> Result<(), EstateServiceError> {
        self.require_estate_management(actor)?;

        let mut estate = self
            .estates
            .get_estate(estate_id)?
            .ok_or(EstateServiceError::EstateNotFound(estate_id))?;
        estate.beneficiary_uuids.retain(|id| *id != beneficiary);

        self.estates
            .set_beneficiaries(estate_id, &estate.beneficiary_uuids)?;
        Ok(())
    }

    /// Creates a directory account. Admin-only via the mutation
    /// authorizer.
    pub fn create_user(
        &self,
        actor: &Actor,
        name: impl Into<String>,
        role: Role,
    ) -> Result<User, EstateServiceError> {
        let decision = authorize_user(actor, Operation::Create);
        if !decision.allowed {
            return Err(deny(actor, "user_create", decision.reason));
        }

        let user = User::new(name, role);
        self.users.create_user(&user)?;
        Ok(user)
    }

    /// Updates a directory account. Admin-only via the mutation
    /// authorizer.
    pub fn update_user(&self, actor: &Actor, user: &User) -> Result<(), EstateServiceError> {
        let decision = authorize_user(actor, Operation::Update);
        if !decision.allowed {
            return Err(deny(actor, "user_update", decision.reason));
        }

        self.users.update_user(user)?;
        Ok(())
    }

    /// Deactivates a directory account. Admin-only via the mutation
    /// authorizer.
    pub fn deactivate_user(&self, actor: &Actor, user: UserId) -> Result<(), EstateServiceError> {
        let decision = authorize_user(actor, Operation::Delete);
        if !decision.allowed {
            return Err(deny(actor, "user_delete", decision.reason));
        }

        self.users.soft_delete_user(user)?;
        Ok(())
    }

    fn require_estate_management(&self, actor: &Actor) -> Result<(), EstateServiceError> {
        if actor.role.capabilities().can_manage_estates {
            return Ok(());
        }
        Err(deny(actor, "estate_manage", Some(DenyReason::RoleForbidden)))
    }
}

fn deny(actor: &Actor, operation: &str, reason: Option<DenyReason>) -> EstateServiceError {
    let reason = reason.unwrap_or(DenyReason::RoleForbidden);
    warn!(
        "event=access_denied module=service operation={operation} actor_role={} reason={reason}",
        actor.role
    );
    EstateServiceError::AccessDenied(reason)
}
