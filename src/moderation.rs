//! Listing moderation lifecycle.
//!
//! A business carries its moderation state on flag and timestamp columns
//! rather than a status column. This module derives the state, validates
//! every transition, and returns the exact field effects the database layer
//! should apply. The decisions are pure so the whole machine is testable
//! without I/O.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Business;

/// Minimum accepted length for a rejection reason, in characters.
pub const MIN_REJECTION_REASON_LEN: usize = 10;

/// Moderation state derived from a listing's status fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    Pending,
    Active,
    Rejected,
}

/// Derive the moderation state of a listing.
pub fn listing_status(business: &Business) -> ListingStatus {
    if business.is_active {
        ListingStatus::Active
    } else if business.rejection_reason.is_some() {
        ListingStatus::Rejected
    } else {
        ListingStatus::Pending
    }
}

/// A transition request the current state does not allow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Only pending businesses can be approved")]
    NotPending,
    #[error("Business is already rejected")]
    AlreadyRejected,
    #[error("Rejection reason must be at least 10 characters")]
    ReasonTooShort,
    #[error("Only rejected businesses can be resubmitted")]
    NotRejected,
    #[error("Business already has an owner")]
    AlreadyOwned,
}

/// Field effects of approving a pending listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub approved_at: DateTime<Utc>,
}

/// Approve a pending listing: it becomes active and verified, and the
/// approval time is stamped. Nothing else changes.
pub fn approve(business: &Business) -> Result<Approval, TransitionError> {
    if listing_status(business) != ListingStatus::Pending {
        return Err(TransitionError::NotPending);
    }
    Ok(Approval {
        approved_at: Utc::now(),
    })
}

/// Field effects of rejecting a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
    pub rejected_at: DateTime<Utc>,
}

/// Reject a pending or active listing with a mandatory reason.
pub fn reject(business: &Business, reason: &str) -> Result<Rejection, TransitionError> {
    if listing_status(business) == ListingStatus::Rejected {
        return Err(TransitionError::AlreadyRejected);
    }
    let reason = reason.trim();
    if reason.chars().count() < MIN_REJECTION_REASON_LEN {
        return Err(TransitionError::ReasonTooShort);
    }
    Ok(Rejection {
        reason: reason.to_string(),
        rejected_at: Utc::now(),
    })
}

/// Field effects of returning a rejected listing to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resubmission {
    pub resubmitted_at: DateTime<Utc>,
}

/// Resubmit a rejected listing: the rejection fields are cleared and the
/// listing goes back to pending.
pub fn resubmit(business: &Business) -> Result<Resubmission, TransitionError> {
    if listing_status(business) != ListingStatus::Rejected {
        return Err(TransitionError::NotRejected);
    }
    Ok(Resubmission {
        resubmitted_at: Utc::now(),
    })
}

/// Field effects of claiming an anonymous listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub owner_id: i64,
    pub claimed_at: DateTime<Utc>,
}

/// Claim an unowned listing. The listing is forced back to pending so the
/// new ownership gets a fresh moderation pass; any existing rejection
/// fields are left for the owner to resolve through resubmission.
pub fn claim(business: &Business, claimant_id: i64) -> Result<Claim, TransitionError> {
    if business.owner_id.is_some() {
        return Err(TransitionError::AlreadyOwned);
    }
    Ok(Claim {
        owner_id: claimant_id,
        claimed_at: Utc::now(),
    })
}
