//! Booking submission pipeline
//!
//! Sends a normalized booking to the remote API. Per attempt the
//! outcome is one of: committed remotely, committed via local fallback,
//! or rejected.
//!
//! Only a transport-level failure (no HTTP status came back) triggers
//! the fallback: a locally generated reference and timestamp keep the
//! user flow moving while the backend is unreachable. An HTTP-level
//! rejection is an authoritative answer and is surfaced, never masked.
//! Documented fallback policy, not a defended design choice: a
//! production deployment may prefer queue-and-retry over fabricating a
//! client-side reference.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use shared::models::BookingRequest;
use shared::util;
use shinas_client::{ClientResult, HttpClient, SearchParams};

use crate::auth::SessionManager;
use crate::booking::index::UserBookingIndex;
use crate::error::{CoreError, CoreResult};

/// How a booking reached its committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// The remote API accepted it and assigned identity
    Remote,
    /// The backend was unreachable; identity was synthesized locally
    LocalFallback,
}

/// A committed booking plus how it was committed.
#[derive(Debug, Clone)]
pub struct CommittedBooking {
    pub booking: BookingRequest,
    pub mode: CommitMode,
}

/// Transport used for booking API calls.
///
/// A trait seam so the pipeline's failure handling can be exercised
/// without a live server.
#[async_trait]
pub trait BookingTransport: Send + Sync {
    /// POST the booking; the server assigns reference and timestamp
    async fn create_booking(&self, booking: &BookingRequest) -> ClientResult<BookingRequest>;

    /// Search bookings by reference, passport or id number
    async fn search_bookings(&self, params: &SearchParams) -> ClientResult<Vec<BookingRequest>>;

    /// Fetch a booking by reference
    async fn get_booking(&self, reference: &str) -> ClientResult<BookingRequest>;
}

#[async_trait]
impl BookingTransport for HttpClient {
    async fn create_booking(&self, booking: &BookingRequest) -> ClientResult<BookingRequest> {
        HttpClient::create_booking(self, booking).await
    }

    async fn search_bookings(&self, params: &SearchParams) -> ClientResult<Vec<BookingRequest>> {
        HttpClient::search_bookings(self, params).await
    }

    async fn get_booking(&self, reference: &str) -> ClientResult<BookingRequest> {
        HttpClient::get_booking(self, reference).await
    }
}

/// Booking submission service
pub struct BookingService {
    transport: Box<dyn BookingTransport>,
    index: Arc<UserBookingIndex>,
    session: Arc<SessionManager>,
}

impl BookingService {
    /// Assemble the service
    pub fn new(
        transport: Box<dyn BookingTransport>,
        index: Arc<UserBookingIndex>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            transport,
            index,
            session,
        }
    }

    /// Submit a normalized booking.
    ///
    /// A committed outcome (remote or fallback) is recorded in the
    /// current user's booking index before returning. Callers may
    /// abandon interest in the result but cannot abort a commit already
    /// in flight.
    pub async fn submit(&self, booking: BookingRequest) -> CoreResult<CommittedBooking> {
        let committed = match self.transport.create_booking(&booking).await {
            Ok(remote) => {
                tracing::info!(reference = %remote.reference, "Booking committed remotely");
                CommittedBooking {
                    booking: remote,
                    mode: CommitMode::Remote,
                }
            }
            Err(e) if e.is_transport() => {
                let mut local = booking;
                if local.reference.is_empty() {
                    local.reference = util::local_reference();
                }
                local.created_at = Some(Utc::now());
                tracing::warn!(
                    reference = %local.reference,
                    error = %e,
                    "Backend unreachable, committed booking locally"
                );
                CommittedBooking {
                    booking: local,
                    mode: CommitMode::LocalFallback,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Booking rejected by backend");
                return Err(CoreError::Client(e));
            }
        };

        if let Some(user) = self.session.current() {
            self.index
                .add_booking(&user.id, committed.booking.clone())?;
        }

        Ok(committed)
    }

    /// Search bookings on the remote API
    pub async fn search(&self, params: &SearchParams) -> CoreResult<Vec<BookingRequest>> {
        Ok(self.transport.search_bookings(params).await?)
    }

    /// Fetch one booking by reference from the remote API
    pub async fn get_by_reference(&self, reference: &str) -> CoreResult<BookingRequest> {
        Ok(self.transport.get_booking(reference).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use shared::models::{DocumentType, User};
    use shinas_client::ClientError;
    use tempfile::TempDir;

    /// Stub transport scripted per test.
    enum Script {
        Accept,
        TransportFailure,
        HttpRejection,
    }

    struct StubTransport {
        script: Script,
    }

    #[async_trait]
    impl BookingTransport for StubTransport {
        async fn create_booking(&self, booking: &BookingRequest) -> ClientResult<BookingRequest> {
            match self.script {
                Script::Accept => {
                    let mut accepted = booking.clone();
                    accepted.reference = "SRV-0001".to_string();
                    accepted.created_at = Some(Utc::now());
                    Ok(accepted)
                }
                Script::TransportFailure => {
                    Err(ClientError::Unreachable("connection refused".to_string()))
                }
                Script::HttpRejection => {
                    Err(ClientError::Validation("departureDate required".to_string()))
                }
            }
        }

        async fn search_bookings(
            &self,
            _params: &SearchParams,
        ) -> ClientResult<Vec<BookingRequest>> {
            Ok(Vec::new())
        }

        async fn get_booking(&self, _reference: &str) -> ClientResult<BookingRequest> {
            Err(ClientError::NotFound("no such booking".to_string()))
        }
    }

    fn normalized_booking() -> BookingRequest {
        BookingRequest {
            reference: String::new(),
            created_at: None,
            has_passenger: true,
            has_baggage: false,
            has_vehicle: false,
            passenger_name: Some("Ali".to_string()),
            passenger_id_number: None,
            passport_number: None,
            phone_number: None,
            baggage_pieces: None,
            baggage_weight_kg: None,
            baggage_items: None,
            vehicle_items: None,
            vehicle_plate_number: None,
            vehicle_type: None,
            vehicle_length_m: None,
            origin_port: "Shinas".to_string(),
            destination_port: "Khasab".to_string(),
            departure_date: None,
            departure_gate: None,
            seat_number: None,
            seating_area: None,
            arrival_date: None,
            carrier_name: None,
            ticket_number: None,
            sequence_number: None,
            boarding_time: None,
            document_type: DocumentType::PassengerTicket,
        }
    }

    fn service(dir: &TempDir, script: Script) -> (BookingService, Arc<UserBookingIndex>) {
        let paths = StoragePaths::new(dir.path());
        paths.ensure_dirs().unwrap();
        let session = Arc::new(SessionManager::load(&paths).unwrap());
        session
            .set_current(Some(User {
                id: "u1".to_string(),
                email: "u1@x.com".to_string(),
                username: "u1".to_string(),
                display_name: "U1".to_string(),
                password_hash: None,
                avatar_url: None,
                role: "user".to_string(),
                email_verified: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
            .unwrap();
        let index = UserBookingIndex::load(&paths).unwrap();
        let service = BookingService::new(Box::new(StubTransport { script }), index.clone(), session);
        (service, index)
    }

    #[tokio::test]
    async fn test_remote_identity_is_trusted_verbatim() {
        let dir = TempDir::new().unwrap();
        let (service, index) = service(&dir, Script::Accept);

        let committed = service.submit(normalized_booking()).await.unwrap();
        assert_eq!(committed.mode, CommitMode::Remote);
        assert_eq!(committed.booking.reference, "SRV-0001");
        assert!(committed.booking.created_at.is_some());

        let view = index.for_user("u1");
        assert_eq!(view[0].reference, "SRV-0001");
    }

    #[tokio::test]
    async fn test_transport_failure_commits_local_fallback() {
        let dir = TempDir::new().unwrap();
        let (service, index) = service(&dir, Script::TransportFailure);

        let committed = service.submit(normalized_booking()).await.unwrap();
        assert_eq!(committed.mode, CommitMode::LocalFallback);
        assert!(committed.booking.reference.starts_with("SC-"));
        assert!(committed.booking.created_at.is_some());

        // The fallback commit feeds the index like a remote one
        assert_eq!(index.for_user("u1").len(), 1);
    }

    #[tokio::test]
    async fn test_http_rejection_is_surfaced_without_fallback() {
        let dir = TempDir::new().unwrap();
        let (service, index) = service(&dir, Script::HttpRejection);

        let result = service.submit(normalized_booking()).await;
        assert!(matches!(
            result,
            Err(CoreError::Client(ClientError::Validation(_)))
        ));
        // Nothing synthesized, nothing recorded
        assert!(index.for_user("u1").is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_session_commits_but_records_nothing() {
        let dir = TempDir::new().unwrap();
        let (service, index) = service(&dir, Script::Accept);
        service.session.logout().unwrap();

        let committed = service.submit(normalized_booking()).await.unwrap();
        assert_eq!(committed.mode, CommitMode::Remote);
        assert!(index.all_for_admin().is_empty());
    }
}
