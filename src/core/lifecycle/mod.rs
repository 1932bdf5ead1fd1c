//! Booking lifecycle: validates and applies status transitions, and derives
//! the job lists shown to staff.

mod error;
mod projection;
mod status;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::db::{Actor, Booking, BookingRepository, StatusUpdate};

pub use error::{TransitionError, TransitionErrorKind, TransitionResult};
pub use projection::{JobCounts, JobProjection, can_complete, can_start, project_jobs};
pub use status::{BookingStatus, Role};

/// Check `from -> to` for `role` against the lifecycle and permission tables.
///
/// Roles without any grant are always `Forbidden`. For every other role a
/// terminal source is `InvalidTransition`, whatever the target. An edge the
/// lifecycle allows but the role is not granted is `Forbidden`, and so is a
/// target the role could never request from any status. Anything else off
/// the lifecycle graph is `InvalidTransition`.
pub fn check_transition(role: Role, from: BookingStatus, to: BookingStatus) -> TransitionResult<()> {
    if role.may_request(from, to) {
        return Ok(());
    }
    if !role.may_transition() {
        return Err(TransitionError::Forbidden { role, from, to });
    }
    if from.is_terminal() {
        return Err(TransitionError::InvalidTransition { from, to });
    }
    let forbidden = from.can_transition_to(to) || (to.has_incoming_edge() && !role.may_ever_request(to));
    if forbidden {
        return Err(TransitionError::Forbidden { role, from, to });
    }
    Err(TransitionError::InvalidTransition { from, to })
}

/// Owns transition validation on top of a booking store.
#[derive(Debug, Clone)]
pub struct BookingLifecycle<R> {
    repo: R,
}

impl<R: BookingRepository> BookingLifecycle<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Move booking `booking_id` to `target` on behalf of `actor_role`.
    ///
    /// The write only lands if the status is still the one that was
    /// validated; otherwise `ConcurrentModification` is returned and nothing
    /// is changed. There is no retry.
    pub async fn request_transition(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
        actor_role: Role,
    ) -> TransitionResult<Booking> {
        info!(%booking_id, %target, role = %actor_role, "transition requested");

        let booking = self
            .repo
            .fetch_booking(booking_id)
            .await?
            .ok_or(TransitionError::NotFound { booking_id })?;
        let current = booking.status;

        if let Err(err) = check_transition(actor_role, current, target) {
            info!(%booking_id, from = %current, %target, role = %actor_role, error = %err, "transition rejected");
            return Err(err);
        }

        if target == BookingStatus::Assigned && booking.assigned_staff_id.is_none() {
            warn!(%booking_id, "booking marked assigned without a staff member on record");
        }

        match self.repo.update_status(booking_id, current, target).await? {
            StatusUpdate::Updated(updated) => {
                info!(%booking_id, from = %current, to = %updated.status, "transition applied");
                Ok(updated)
            }
            StatusUpdate::Conflict { current: actual } => {
                warn!(%booking_id, expected = %current, %actual, "booking changed during transition");
                Err(TransitionError::ConcurrentModification {
                    booking_id,
                    expected: current,
                    actual,
                })
            }
            StatusUpdate::NotFound => Err(TransitionError::NotFound { booking_id }),
        }
    }

    /// Active and completed jobs among the bookings `actor` can see.
    pub async fn jobs_for(&self, actor: &Actor) -> anyhow::Result<JobProjection> {
        let bookings = self.repo.fetch_bookings_visible_to(actor).await?;
        Ok(project_jobs(&bookings, actor.role))
    }
}
