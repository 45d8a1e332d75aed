//! Booking normalization, submission and per-user indexing

mod draft;
mod index;
mod pipeline;

pub use draft::{BaggageGroupDraft, BookingDraft, VehicleDraft, normalize};
pub use index::UserBookingIndex;
pub use pipeline::{BookingService, BookingTransport, CommitMode, CommittedBooking};
