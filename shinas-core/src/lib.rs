//! Shinas Core - client-resident booking/session data layer
//!
//! The stateful heart of the booking client:
//! - booking normalization, submission pipeline and per-user index;
//! - account store, session manager and two-backend auth service;
//! - JSON-file persistence emulating the backend when it is out of
//!   reach.

pub mod auth;
pub mod booking;
pub mod bridge;
pub mod config;
pub mod error;
pub mod storage;

pub use auth::{AccountStore, AuthBackend, AuthService, LocalBackend, RemoteBackend, SessionManager};
pub use booking::{
    BaggageGroupDraft, BookingDraft, BookingService, BookingTransport, CommitMode,
    CommittedBooking, UserBookingIndex, VehicleDraft, normalize,
};
pub use bridge::CoreBridge;
pub use config::{BackendMode, CoreConfig};
pub use error::{CoreError, CoreResult};
