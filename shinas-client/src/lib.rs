//! Shinas Client - HTTP client for the hosted booking/auth API
//!
//! Network-based calls to the remote backend. The core crate treats this
//! as a black-box request/response interface; transport-level failures
//! are classified separately from HTTP-level rejections so the booking
//! pipeline can degrade gracefully.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, SearchParams};

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, LoginResponse, RegisterRequest, TokenPair, UpdateUserRequest};
