use handrest::core::db::{
    Booking, BookingDb, BookingRepository, NewBooking, NewProfile, Profile, ProfileRepository,
};
use handrest::core::lifecycle::{BookingLifecycle, BookingStatus, Role};
use time::macros::date;

/// Creates a BookingDb backed by a file in a fresh temp directory.
/// Returns both the store and the temp directory (which must be kept alive).
pub async fn create_test_db() -> (BookingDb, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let db = BookingDb::open(dir.path().join("bookings.db"))
        .await
        .expect("Failed to open test database");
    (db, dir)
}

/// Creates an isolated in-memory BookingDb.
pub async fn create_memory_db() -> BookingDb {
    BookingDb::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

pub async fn make_profile(db: &BookingDb, email: &str, role: Role) -> Profile {
    db.add_profile(&NewProfile {
        email: email.to_string(),
        full_name: format!("Test {}", role),
        role,
    })
    .await
    .expect("Failed to add profile")
}

pub fn make_new_booking(customer: &Profile, time: &str) -> NewBooking {
    NewBooking {
        customer_id: customer.id,
        customer_name: customer.full_name.clone(),
        customer_phone: "+254700000001".to_string(),
        address_line1: "12 Riverside Drive".to_string(),
        city: "Nairobi".to_string(),
        package_name: Some("Standard Home Clean".to_string()),
        scheduled_date: date!(2026 - 11 - 20),
        scheduled_time: time.to_string(),
    }
}

/// The admin path from `pending` to each status.
fn admin_path(status: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;
    match status {
        Pending => &[],
        Confirmed => &[Confirmed],
        Assigned => &[Confirmed, Assigned],
        InProgress => &[Confirmed, Assigned, InProgress],
        Completed => &[Confirmed, Assigned, InProgress, Completed],
        Cancelled => &[Cancelled],
    }
}

/// Creates a booking for `customer` and drives it to `status` as admin,
/// recording `staff` on it when given.
pub async fn booking_in_status(
    db: &BookingDb,
    customer: &Profile,
    staff: Option<&Profile>,
    status: BookingStatus,
) -> Booking {
    let mut booking = db
        .add_booking(&make_new_booking(customer, "09:00"))
        .await
        .expect("Failed to add booking");
    if let Some(staff) = staff {
        booking = db
            .assign_staff(booking.id, staff.id)
            .await
            .expect("Failed to assign staff")
            .expect("Booking vanished");
    }
    let lifecycle = BookingLifecycle::new(db.clone());
    for step in admin_path(status) {
        booking = lifecycle
            .request_transition(booking.id, *step, Role::Admin)
            .await
            .expect("Admin path transition failed");
    }
    assert_eq!(booking.status, status);
    booking
}

pub struct Cast {
    pub customer: Profile,
    pub staff: Profile,
    pub admin: Profile,
}

pub async fn make_cast(db: &BookingDb) -> Cast {
    Cast {
        customer: make_profile(db, "customer@example.com", Role::Customer).await,
        staff: make_profile(db, "staff@handrest.com", Role::Staff).await,
        admin: make_profile(db, "admin@handrest.com", Role::Admin).await,
    }
}
