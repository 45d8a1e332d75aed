//! Booking Model
//!
//! A booking combines up to three cargo types (passenger, baggage,
//! vehicle). Each baggage piece and each vehicle carries its own barcode
//! identifier so one label can be printed per physical item.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Baggage category shown in the booking form dropdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaggageType {
    Cabin,
    #[default]
    Checked,
    Oversized,
    Sports,
    Fragile,
    Other,
}

impl BaggageType {
    /// Human-readable label used on printed tags and scan payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cabin => "Cabin",
            Self::Checked => "Checked luggage",
            Self::Oversized => "Oversized",
            Self::Sports => "Sports equipment",
            Self::Fragile => "Fragile",
            Self::Other => "Other",
        }
    }
}

/// Single baggage piece: one label with barcode per piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaggagePiece {
    pub weight_kg: f64,
    pub barcode_id: String,
}

/// One baggage group: several pieces of the same category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaggageItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baggage_type: Option<BaggageType>,
    pub piece_details: Vec<BaggagePiece>,
}

impl BaggageItem {
    /// Effective category, defaulting unspecified groups to checked luggage.
    pub fn effective_type(&self) -> BaggageType {
        self.baggage_type.unwrap_or_default()
    }
}

/// One vehicle with its own barcode identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleItem {
    pub plate_number: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
    pub barcode_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_company: Option<String>,
}

/// Printed document kind, derived from the cargo composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    PassengerTicket,
    CargoBoardingCard,
}

impl DocumentType {
    /// Title printed at the top of the document.
    pub fn title(&self) -> &'static str {
        match self {
            Self::PassengerTicket => "PASSENGER TICKET",
            Self::CargoBoardingCard => "CARGO BOARDING CARD",
        }
    }
}

/// Normalized booking record.
///
/// Immutable after creation: `reference` and `created_at` are empty until
/// the persisting authority (remote API or the local fallback path)
/// assigns them; a re-submission creates a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    pub has_passenger: bool,
    pub has_baggage: bool,
    pub has_vehicle: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Legacy total piece count, derived from `baggage_items`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baggage_pieces: Option<u32>,
    /// Legacy total weight, derived from `baggage_items`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baggage_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baggage_items: Option<Vec<BaggageItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_items: Option<Vec<VehicleItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_length_m: Option<f64>,

    pub origin_port: String,
    pub destination_port: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,

    // -- Optional print fields --
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_gate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seating_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boarding_time: Option<String>,

    pub document_type: DocumentType,
}

impl BookingRequest {
    /// Cargo composition label, e.g. `PASSENGER + BAGGAGE`.
    pub fn cargo_types_label(&self) -> String {
        let mut types = Vec::new();
        if self.has_passenger {
            types.push("PASSENGER");
        }
        if self.has_baggage {
            types.push("BAGGAGE");
        }
        if self.has_vehicle {
            types.push("VEHICLE");
        }
        types.join(" + ")
    }

    /// All baggage pieces flattened, paired with their category label.
    pub fn baggage_pieces_with_type(&self) -> Vec<(&BaggagePiece, &'static str)> {
        self.baggage_items
            .iter()
            .flatten()
            .flat_map(|item| {
                let label = item.effective_type().label();
                item.piece_details.iter().map(move |piece| (piece, label))
            })
            .collect()
    }

    /// Barcode value printed on the boarding pass itself:
    /// reference and passenger id joined by `-`, falling back to the
    /// bare reference.
    pub fn boarding_pass_barcode(&self) -> String {
        let id = self.passenger_id_number.as_deref().unwrap_or("");
        if id.is_empty() {
            self.reference.clone()
        } else if self.reference.is_empty() {
            id.to_string()
        } else {
            format!("{}-{}", self.reference, id)
        }
    }
}

/// Durable association of a booking to its owner. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBooking {
    pub user_id: String,
    pub booking: BookingRequest,
}
