mod booking;
mod model;
mod profile;
mod state;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use state::StoreState;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::lifecycle::{BookingStatus, Role};

pub use booking::{Booking, BookingRepository, NewBooking, StatusUpdate};
pub use model::{format_date, parse_date};
pub use profile::{Actor, IdentityProvider, NewProfile, Profile, ProfileRepository, SignedInProfile};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const BOOKING_COLUMNS: &str = "id, booking_number, customer_id, customer_name, customer_phone, \
    address_line1, city, package_name, scheduled_date, scheduled_time, status, \
    assigned_staff_id, created_at, updated_at";

const BOOKING_ORDER: &str = "ORDER BY scheduled_date ASC, scheduled_time ASC, rowid ASC";

/// SQLite-backed store for bookings and profiles.
#[derive(Debug, Clone)]
pub struct BookingDb {
    state: Arc<StoreState>,
}

impl BookingDb {
    pub async fn open<P: AsRef<Path>>(db_file: P) -> anyhow::Result<Self> {
        Self::open_with(db_file, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn open_with<P: AsRef<Path>>(db_file: P, max_connections: u32) -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(StoreState::open(db_file, max_connections).await?),
        })
    }

    /// Open a fresh, empty store that lives only in memory. Nothing is
    /// shared with other stores and everything is lost on `close`.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(StoreState::open_in_memory().await?),
        })
    }

    /// Flush the WAL and release the file. Further queries fail.
    pub async fn close(&self) -> anyhow::Result<()> {
        self.state.close().await
    }
}

#[derive(sqlx::FromRow)]
struct BookingRecord {
    id: String,
    booking_number: String,
    customer_id: String,
    customer_name: String,
    customer_phone: String,
    address_line1: String,
    city: String,
    package_name: Option<String>,
    scheduled_date: String,
    scheduled_time: String,
    status: i64,
    assigned_staff_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = anyhow::Error;

    fn try_from(record: BookingRecord) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: model::parse_uuid(&record.id)?,
            booking_number: record.booking_number,
            customer_id: model::parse_uuid(&record.customer_id)?,
            customer_name: record.customer_name,
            customer_phone: record.customer_phone,
            address_line1: record.address_line1,
            city: record.city,
            package_name: record.package_name,
            scheduled_date: model::parse_date(&record.scheduled_date)?,
            scheduled_time: record.scheduled_time,
            status: BookingStatus::try_from(record.status)?,
            assigned_staff_id: record
                .assigned_staff_id
                .as_deref()
                .map(model::parse_uuid)
                .transpose()?,
            created_at: model::parse_timestamp(&record.created_at)?,
            updated_at: model::parse_timestamp(&record.updated_at)?,
            _guard: (),
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRecord {
    id: String,
    email: String,
    full_name: String,
    role: i64,
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = anyhow::Error;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: model::parse_uuid(&record.id)?,
            email: record.email,
            full_name: record.full_name,
            role: Role::try_from(record.role)?,
            _guard: (),
        })
    }
}

impl BookingRepository for BookingDb {
    async fn fetch_booking(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
        let mut conn = self.state.conn().await?;
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM booking WHERE id = $1");
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut **conn)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn fetch_bookings_visible_to(&self, actor: &Actor) -> anyhow::Result<Vec<Booking>> {
        let mut conn = self.state.conn().await?;
        let filter = match actor.role {
            Role::Customer => "WHERE customer_id = $1",
            Role::Staff => "WHERE assigned_staff_id = $1",
            Role::Admin => "",
        };
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM booking {filter} {BOOKING_ORDER}");
        let mut query = sqlx::query_as::<_, BookingRecord>(&sql);
        if actor.role != Role::Admin {
            query = query.bind(actor.id.to_string());
        }
        query
            .fetch_all(&mut **conn)
            .await?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new: BookingStatus,
    ) -> anyhow::Result<StatusUpdate> {
        let mut conn = self.state.conn().await?;
        let mut tx = conn.begin_transaction().await?;
        let now = model::format_timestamp(OffsetDateTime::now_utc())?;

        let sql = format!(
            "UPDATE booking SET status = $1, updated_at = $2 \
             WHERE id = $3 AND status = $4 RETURNING {BOOKING_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(i64::from(new))
            .bind(now)
            .bind(id.to_string())
            .bind(i64::from(expected))
            .fetch_optional(&mut *tx)
            .await?;

        let outcome = match updated {
            Some(record) => StatusUpdate::Updated(Booking::try_from(record)?),
            None => {
                let current = sqlx::query_scalar::<_, i64>("SELECT status FROM booking WHERE id = $1")
                    .bind(id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?;
                match current {
                    Some(current) => StatusUpdate::Conflict {
                        current: BookingStatus::try_from(current)?,
                    },
                    None => StatusUpdate::NotFound,
                }
            }
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn add_booking(&self, booking: &NewBooking) -> anyhow::Result<Booking> {
        let mut conn = self.state.conn().await?;
        let id = Uuid::new_v4();
        let now = model::format_timestamp(OffsetDateTime::now_utc())?;
        let sql = format!(
            "INSERT INTO booking (id, booking_number, customer_id, customer_name, customer_phone, \
             address_line1, city, package_name, scheduled_date, scheduled_time, status, \
             assigned_staff_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL, $12, $12) \
             RETURNING {BOOKING_COLUMNS}"
        );
        let record = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(id.to_string())
            .bind(model::booking_number(id))
            .bind(booking.customer_id.to_string())
            .bind(&booking.customer_name)
            .bind(&booking.customer_phone)
            .bind(&booking.address_line1)
            .bind(&booking.city)
            .bind(&booking.package_name)
            .bind(model::format_date(booking.scheduled_date)?)
            .bind(&booking.scheduled_time)
            .bind(i64::from(BookingStatus::Pending))
            .bind(now)
            .fetch_one(&mut **conn)
            .await
            .with_context(|| format!("Failed to add booking for customer {}", booking.customer_id))?;
        let booking = Booking::try_from(record)?;
        tracing::info!(booking_id = %booking.id, booking_number = %booking.booking_number, "booking created");
        Ok(booking)
    }

    async fn assign_staff(&self, id: Uuid, staff_id: Uuid) -> anyhow::Result<Option<Booking>> {
        let staff = self
            .get_profile_by_id(staff_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("No profile with id {}", staff_id))?;
        if staff.role != Role::Staff {
            anyhow::bail!("Profile {} is {}, not staff", staff.email, staff.role);
        }

        let mut conn = self.state.conn().await?;
        let now = model::format_timestamp(OffsetDateTime::now_utc())?;
        let sql = format!(
            "UPDATE booking SET assigned_staff_id = $1, updated_at = $2 \
             WHERE id = $3 RETURNING {BOOKING_COLUMNS}"
        );
        let booking = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(staff_id.to_string())
            .bind(now)
            .bind(id.to_string())
            .fetch_optional(&mut **conn)
            .await?
            .map(Booking::try_from)
            .transpose()?;
        if let Some(booking) = &booking {
            tracing::info!(booking_id = %booking.id, staff_id = %staff_id, "staff recorded on booking");
        }
        Ok(booking)
    }
}

impl ProfileRepository for BookingDb {
    async fn add_profile(&self, profile: &NewProfile) -> anyhow::Result<Profile> {
        let mut conn = self.state.conn().await?;
        let record = sqlx::query_as::<_, ProfileRecord>(
            "INSERT INTO profile (id, email, full_name, role) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, full_name, role",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(i64::from(profile.role))
        .fetch_one(&mut **conn)
        .await
        .with_context(|| format!("Failed to add profile {}", profile.email))?;
        Profile::try_from(record)
    }

    async fn get_profile_by_id(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, ProfileRecord>("SELECT id, email, full_name, role FROM profile WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&mut **conn)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    async fn get_profile_by_email(&self, email: &str) -> anyhow::Result<Option<Profile>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, email, full_name, role FROM profile WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut **conn)
        .await?
        .map(Profile::try_from)
        .transpose()
    }
}
