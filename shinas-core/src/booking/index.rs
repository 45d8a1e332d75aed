//! Per-user booking index
//!
//! Durable, append-only ledger of `{userId, booking}` associations plus
//! a replay-latest view of the current user's bookings, newest first.
//! The view re-derives automatically whenever the session manager emits
//! a new current user.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use shared::models::{BookingRequest, StoredBooking};

use crate::auth::SessionManager;
use crate::error::CoreResult;
use crate::storage::{self, StoragePaths};

/// Per-user reverse index over all stored bookings
pub struct UserBookingIndex {
    paths: StoragePaths,
    ledger: Mutex<Vec<StoredBooking>>,
    view_tx: watch::Sender<Vec<BookingRequest>>,
}

impl UserBookingIndex {
    /// Load the ledger from disk with an empty view (no session yet)
    pub fn load(paths: &StoragePaths) -> CoreResult<Arc<Self>> {
        let ledger: Vec<StoredBooking> = storage::load_json(&paths.user_bookings_file())?;
        let (view_tx, _) = watch::channel(Vec::new());
        Ok(Arc::new(Self {
            paths: paths.clone(),
            ledger: Mutex::new(ledger),
            view_tx,
        }))
    }

    /// Re-derive the view whenever the session's current user changes.
    ///
    /// Registered as a synchronous observer: the new owner's view is
    /// published before the session change returns to its caller. Holds
    /// only a weak reference so the index can be dropped independently.
    pub fn attach(self: &Arc<Self>, session: &SessionManager) {
        let weak: Weak<Self> = Arc::downgrade(self);
        session.on_change(move |user| {
            if let Some(index) = weak.upgrade() {
                index.refresh(user.map(|u| u.id.as_str()));
            }
        });
    }

    /// Append a booking for a user and republish that user's view
    pub fn add_booking(&self, user_id: &str, booking: BookingRequest) -> CoreResult<()> {
        {
            let mut ledger = self.ledger.lock();
            ledger.insert(
                0,
                StoredBooking {
                    user_id: user_id.to_string(),
                    booking,
                },
            );
            storage::save_json(&self.paths.user_bookings_file(), &*ledger)?;
        }
        self.refresh(Some(user_id));
        Ok(())
    }

    /// Recompute the published view for the given user.
    /// No user means no visible bookings.
    pub fn refresh(&self, user_id: Option<&str>) {
        let view = match user_id {
            Some(id) => self.for_user(id),
            None => Vec::new(),
        };
        self.view_tx.send_replace(view);
    }

    /// All bookings owned by one user, newest first
    pub fn for_user(&self, user_id: &str) -> Vec<BookingRequest> {
        let ledger = self.ledger.lock();
        let mut bookings: Vec<BookingRequest> = ledger
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.booking.clone())
            .collect();
        sort_newest_first(&mut bookings);
        bookings
    }

    /// Subscribe to the current user's booking view
    pub fn watch_view(&self) -> watch::Receiver<Vec<BookingRequest>> {
        self.view_tx.subscribe()
    }

    /// Admin console: every booking across all users, newest first
    pub fn all_for_admin(&self) -> Vec<BookingRequest> {
        let ledger = self.ledger.lock();
        let mut bookings: Vec<BookingRequest> =
            ledger.iter().map(|entry| entry.booking.clone()).collect();
        sort_newest_first(&mut bookings);
        bookings
    }

    /// Admin console: owner associations included, newest first
    pub fn stored_for_admin(&self) -> Vec<StoredBooking> {
        let ledger = self.ledger.lock();
        let mut entries: Vec<StoredBooking> = ledger.clone();
        entries.sort_by_key(|entry| std::cmp::Reverse(created_key(&entry.booking)));
        entries
    }
}

fn created_key(booking: &BookingRequest) -> DateTime<Utc> {
    booking.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn sort_newest_first(bookings: &mut [BookingRequest]) {
    bookings.sort_by_key(|b| std::cmp::Reverse(created_key(b)));
}
