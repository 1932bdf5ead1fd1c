use std::future::Future;

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::core::db::profile::Actor;
use crate::core::lifecycle::BookingStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub address_line1: String,
    pub city: String,
    pub package_name: Option<String>,
    pub scheduled_date: Date,
    pub scheduled_time: String,
    pub status: BookingStatus,
    pub assigned_staff_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    #[serde(skip)]
    pub(crate) _guard: (),
}

/// A booking as produced by checkout; always stored as `pending`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub address_line1: String,
    pub city: String,
    pub package_name: Option<String>,
    pub scheduled_date: Date,
    pub scheduled_time: String,
}

/// Outcome of a conditional status write.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Updated(Booking),
    /// The stored status was no longer the expected one.
    Conflict { current: BookingStatus },
    NotFound,
}

pub trait BookingRepository {
    fn fetch_booking(&self, id: Uuid) -> impl Future<Output = anyhow::Result<Option<Booking>>> + Send;
    fn fetch_bookings_visible_to(
        &self,
        actor: &Actor,
    ) -> impl Future<Output = anyhow::Result<Vec<Booking>>> + Send;
    /// Write `new` only if the stored status is still `expected`.
    fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new: BookingStatus,
    ) -> impl Future<Output = anyhow::Result<StatusUpdate>> + Send;
    fn add_booking(&self, booking: &NewBooking) -> impl Future<Output = anyhow::Result<Booking>> + Send;
    /// Record who will do the job. Does not touch the status.
    fn assign_staff(
        &self,
        id: Uuid,
        staff_id: Uuid,
    ) -> impl Future<Output = anyhow::Result<Option<Booking>>> + Send;
}
