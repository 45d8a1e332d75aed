//! Booking form normalization
//!
//! Expands a raw form draft into a canonical `BookingRequest`: every
//! baggage piece and vehicle gets its own barcode identifier, totals are
//! derived, and the printed document type is classified from the cargo
//! composition. `reference` and `created_at` stay empty; they belong to
//! whichever authority persists the booking.

use chrono::NaiveDate;

use shared::models::{
    BaggageItem, BaggagePiece, BaggageType, BookingRequest, DocumentType, VehicleItem,
};
use shared::util;

use crate::error::{CoreError, CoreResult};

/// One baggage group as entered in the form: a piece count and a list
/// of weights (one per piece).
#[derive(Debug, Clone, Default)]
pub struct BaggageGroupDraft {
    pub baggage_type: Option<BaggageType>,
    pub pieces: i32,
    pub weights: Vec<f64>,
}

/// One vehicle as entered in the form.
#[derive(Debug, Clone, Default)]
pub struct VehicleDraft {
    pub plate_number: String,
    pub vehicle_type: String,
    pub length_m: Option<f64>,
}

/// Raw booking form draft.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub has_passenger: bool,
    pub has_baggage: bool,
    pub has_vehicle: bool,

    pub passenger_name: Option<String>,
    pub passenger_id_number: Option<String>,
    pub passport_number: Option<String>,
    pub phone_number: Option<String>,

    pub baggage_groups: Vec<BaggageGroupDraft>,
    pub vehicles: Vec<VehicleDraft>,

    pub origin_port: String,
    pub destination_port: String,
    pub departure_date: Option<NaiveDate>,
}

/// Normalize a form draft into a booking record.
///
/// Pure aside from identifier generation; no side effects.
pub fn normalize(draft: &BookingDraft) -> CoreResult<BookingRequest> {
    if !draft.has_passenger && !draft.has_baggage && !draft.has_vehicle {
        return Err(CoreError::validation(
            "Select at least one cargo type (passenger, baggage, or vehicle)",
        ));
    }

    let baggage_items: Vec<BaggageItem> = draft
        .baggage_groups
        .iter()
        .filter_map(|group| {
            let pieces = group.pieces.max(0) as usize;
            let piece_details: Vec<BaggagePiece> = group
                .weights
                .iter()
                .take(pieces)
                .map(|w| BaggagePiece {
                    weight_kg: w.max(0.0),
                    barcode_id: util::new_barcode_id(),
                })
                .collect();
            if piece_details.is_empty() {
                return None;
            }
            Some(BaggageItem {
                baggage_type: Some(group.baggage_type.unwrap_or_default()),
                piece_details,
            })
        })
        .collect();

    let vehicle_items: Vec<VehicleItem> = draft
        .vehicles
        .iter()
        .map(|v| VehicleItem {
            plate_number: v.plate_number.clone(),
            vehicle_type: v.vehicle_type.clone(),
            length_m: v.length_m,
            barcode_id: util::new_barcode_id(),
            make: None,
            model: None,
            year: None,
            engine_number: None,
            chassis_number: None,
            owner_name: None,
            owner_contact: None,
            sender_company: None,
            receiver_company: None,
        })
        .collect();

    let total_pieces: u32 = baggage_items
        .iter()
        .map(|b| b.piece_details.len() as u32)
        .sum();
    let total_weight: f64 = baggage_items
        .iter()
        .flat_map(|b| b.piece_details.iter())
        .map(|p| p.weight_kg)
        .sum();

    let document_type = if draft.has_passenger
        && !draft.has_vehicle
        && baggage_items.is_empty()
        && total_pieces == 0
    {
        DocumentType::PassengerTicket
    } else {
        DocumentType::CargoBoardingCard
    };

    let first_vehicle = vehicle_items.first();

    Ok(BookingRequest {
        reference: String::new(),
        created_at: None,
        has_passenger: draft.has_passenger,
        has_baggage: draft.has_baggage,
        has_vehicle: draft.has_vehicle,
        passenger_name: none_if_blank(&draft.passenger_name),
        passenger_id_number: none_if_blank(&draft.passenger_id_number),
        passport_number: none_if_blank(&draft.passport_number),
        phone_number: none_if_blank(&draft.phone_number),
        baggage_pieces: (total_pieces > 0).then_some(total_pieces),
        baggage_weight_kg: (total_pieces > 0).then_some(total_weight),
        baggage_items: (!baggage_items.is_empty()).then_some(baggage_items),
        vehicle_plate_number: first_vehicle.map(|v| v.plate_number.clone()),
        vehicle_type: first_vehicle.map(|v| v.vehicle_type.clone()),
        vehicle_length_m: first_vehicle.and_then(|v| v.length_m),
        vehicle_items: (!vehicle_items.is_empty()).then_some(vehicle_items),
        origin_port: draft.origin_port.clone(),
        destination_port: draft.destination_port.clone(),
        departure_date: draft.departure_date,
        departure_gate: None,
        seat_number: None,
        seating_area: None,
        arrival_date: None,
        carrier_name: None,
        ticket_number: None,
        sequence_number: None,
        boarding_time: None,
        document_type,
    })
}

fn none_if_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
