pub mod config;
pub mod core;
pub mod telemetry;

pub use config::{AppConfig, ConfigLoader};
pub use crate::core::db::{Actor, Booking, BookingDb, BookingRepository, IdentityProvider, SignedInProfile};
pub use crate::core::lifecycle::{
    BookingLifecycle, BookingStatus, JobProjection, Role, TransitionError, TransitionErrorKind,
    project_jobs,
};
