//! Shared types for the Shinas Port booking system
//!
//! Common types used across the client and core crates: domain models,
//! API request/response types, barcode payload encoding, and utility
//! functions for identifiers and timestamps.

pub mod barcode;
pub mod client;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use barcode::{LabelTarget, scan_payload};
pub use models::{
    BaggageItem, BaggagePiece, BaggageType, BookingRequest, DocumentType, StoredBooking, User,
    VehicleItem,
};
