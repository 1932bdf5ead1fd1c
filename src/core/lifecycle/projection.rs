use serde::Serialize;

use crate::core::db::Booking;

use super::status::{BookingStatus, Role};

/// The staff view's partition of a booking list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProjection {
    pub role: Role,
    /// Bookings that are `assigned` or `in_progress`, in input order.
    pub active_jobs: Vec<Booking>,
    /// Bookings that are `completed`, in input order.
    pub completed_jobs: Vec<Booking>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub active: usize,
    pub completed: usize,
}

/// Partition `bookings` into active and completed jobs. Bookings in any other
/// status are left out of both. Order is preserved; nothing is re-sorted.
pub fn project_jobs(bookings: &[Booking], role: Role) -> JobProjection {
    let active_jobs = bookings
        .iter()
        .filter(|b| b.status.is_active_job())
        .cloned()
        .collect();
    let completed_jobs = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
        .cloned()
        .collect();
    JobProjection {
        role,
        active_jobs,
        completed_jobs,
    }
}

pub fn can_start(booking: &Booking) -> bool {
    booking.status == BookingStatus::Assigned
}

pub fn can_complete(booking: &Booking) -> bool {
    booking.status == BookingStatus::InProgress
}

impl JobProjection {
    pub fn counts(&self) -> JobCounts {
        JobCounts {
            active: self.active_jobs.len(),
            completed: self.completed_jobs.len(),
        }
    }

    /// Statuses the projection's role may move `booking` to.
    pub fn actions(&self, booking: &Booking) -> &'static [BookingStatus] {
        self.role.permitted_targets(booking.status)
    }
}
