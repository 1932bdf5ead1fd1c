mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from handrest for tests
pub use handrest::core::db::{
    Actor, Booking, BookingDb, BookingRepository, IdentityProvider, NewBooking, NewProfile, Profile,
    ProfileRepository, SignedInProfile, StatusUpdate,
};
pub use handrest::core::lifecycle::{
    BookingLifecycle, BookingStatus, Role, TransitionError, TransitionErrorKind, can_complete,
    can_start, project_jobs,
};
