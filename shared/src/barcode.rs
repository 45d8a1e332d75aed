//! Barcode scan payload encoding
//!
//! Builds the exact string encoded into CODE128 labels for tickets,
//! baggage tags and vehicle cards. Gate terminals scan and split these
//! payloads, so the encoding must be deterministic: same booking state,
//! byte-identical output.

use crate::models::{BaggagePiece, BookingRequest, VehicleItem};

/// Category label used for the whole-booking summary payload.
const BOARDING_CATEGORY: &str = "BOARDING";

/// Which label the payload is for.
#[derive(Debug, Clone, Copy)]
pub enum LabelTarget<'a> {
    /// Whole-booking summary (boarding pass / cargo card).
    Summary,
    /// One baggage piece tag, with its category label.
    Baggage {
        piece: &'a BaggagePiece,
        type_label: &'a str,
    },
    /// One vehicle card.
    Vehicle(&'a VehicleItem),
}

/// Encode the scan payload for a booking and label target.
///
/// Fields in fixed order, joined by `|`:
/// passenger name, passport number, id number, departure date (ISO),
/// origin port, destination port, item category, `<count>&<weight>kg`.
/// Missing fields serialize as empty strings. A payload with every field
/// blank falls back to the entity's own barcode identifier.
pub fn scan_payload(booking: &BookingRequest, target: LabelTarget<'_>) -> String {
    let (category, count, weight_kg) = match target {
        LabelTarget::Summary => (
            BOARDING_CATEGORY,
            booking.baggage_pieces.unwrap_or(0),
            booking.baggage_weight_kg.unwrap_or(0.0),
        ),
        LabelTarget::Baggage { piece, type_label } => (type_label, 1, piece.weight_kg),
        LabelTarget::Vehicle(_) => ("VEHICLE", 1, 0.0),
    };

    let count_weight = if count == 0 && weight_kg == 0.0 {
        String::new()
    } else {
        format!("{}&{}kg", count, format_weight(weight_kg))
    };

    let departure = booking
        .departure_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let data_fields = [
        booking.passenger_name.as_deref().unwrap_or(""),
        booking.passport_number.as_deref().unwrap_or(""),
        booking.passenger_id_number.as_deref().unwrap_or(""),
        departure.as_str(),
        booking.origin_port.as_str(),
        booking.destination_port.as_str(),
        count_weight.as_str(),
    ];

    // The category is a constant label; a payload whose booking data is
    // entirely blank is useless to the scanner, so fall back to the
    // entity's own identifier instead.
    if data_fields.iter().all(|f| f.is_empty()) {
        return fallback_id(booking, target);
    }

    let [name, passport, id_number, departure, origin, destination, count_weight] = data_fields;
    [
        name,
        passport,
        id_number,
        departure,
        origin,
        destination,
        category,
        count_weight,
    ]
    .join("|")
}

/// The entity's own identifier, used when the payload carries no data.
fn fallback_id(booking: &BookingRequest, target: LabelTarget<'_>) -> String {
    match target {
        LabelTarget::Summary => booking.reference.clone(),
        LabelTarget::Baggage { piece, .. } => piece.barcode_id.clone(),
        LabelTarget::Vehicle(vehicle) => vehicle.barcode_id.clone(),
    }
}

/// Format a weight so equal inputs are byte-identical: integral values
/// print without a fractional part.
fn format_weight(weight_kg: f64) -> String {
    if weight_kg == weight_kg.trunc() {
        format!("{}", weight_kg as i64)
    } else {
        format!("{}", weight_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaggageItem, BaggageType, DocumentType};
    use chrono::NaiveDate;

    fn booking() -> BookingRequest {
        BookingRequest {
            reference: "SC-REF-01".to_string(),
            created_at: None,
            has_passenger: true,
            has_baggage: true,
            has_vehicle: false,
            passenger_name: Some("Fatima Said".to_string()),
            passenger_id_number: Some("ID123".to_string()),
            passport_number: Some("P777".to_string()),
            phone_number: None,
            baggage_pieces: Some(2),
            baggage_weight_kg: Some(33.5),
            baggage_items: Some(vec![BaggageItem {
                baggage_type: Some(BaggageType::Checked),
                piece_details: vec![
                    BaggagePiece {
                        weight_kg: 20.0,
                        barcode_id: "bag-1".to_string(),
                    },
                    BaggagePiece {
                        weight_kg: 13.5,
                        barcode_id: "bag-2".to_string(),
                    },
                ],
            }]),
            vehicle_items: None,
            vehicle_plate_number: None,
            vehicle_type: None,
            vehicle_length_m: None,
            origin_port: "Shinas".to_string(),
            destination_port: "Khasab".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 12, 24),
            departure_gate: None,
            seat_number: None,
            seating_area: None,
            arrival_date: None,
            carrier_name: None,
            ticket_number: None,
            sequence_number: None,
            boarding_time: None,
            document_type: DocumentType::CargoBoardingCard,
        }
    }

    #[test]
    fn test_summary_payload_field_order() {
        let payload = scan_payload(&booking(), LabelTarget::Summary);
        assert_eq!(
            payload,
            "Fatima Said|P777|ID123|2025-12-24|Shinas|Khasab|BOARDING|2&33.5kg"
        );
    }

    #[test]
    fn test_payload_is_deterministic() {
        let b = booking();
        let first = scan_payload(&b, LabelTarget::Summary);
        let second = scan_payload(&b, LabelTarget::Summary);
        assert_eq!(first, second);
    }

    #[test]
    fn test_baggage_piece_payload_uses_piece_weight() {
        let b = booking();
        let piece = &b.baggage_items.as_ref().unwrap()[0].piece_details[0];
        let payload = scan_payload(
            &b,
            LabelTarget::Baggage {
                piece,
                type_label: BaggageType::Checked.label(),
            },
        );
        assert_eq!(
            payload,
            "Fatima Said|P777|ID123|2025-12-24|Shinas|Khasab|Checked luggage|1&20kg"
        );
    }

    #[test]
    fn test_vehicle_payload_counts_one_with_zero_weight() {
        let mut b = booking();
        b.baggage_items = None;
        let vehicle = VehicleItem {
            plate_number: "A 5512".to_string(),
            vehicle_type: "Car".to_string(),
            length_m: Some(4.2),
            barcode_id: "veh-1".to_string(),
            make: None,
            model: None,
            year: None,
            engine_number: None,
            chassis_number: None,
            owner_name: None,
            owner_contact: None,
            sender_company: None,
            receiver_company: None,
        };
        let payload = scan_payload(&b, LabelTarget::Vehicle(&vehicle));
        assert_eq!(
            payload,
            "Fatima Said|P777|ID123|2025-12-24|Shinas|Khasab|VEHICLE|1&0kg"
        );
    }

    #[test]
    fn test_missing_fields_serialize_as_empty_strings() {
        let mut b = booking();
        b.passenger_name = None;
        b.passport_number = None;
        let payload = scan_payload(&b, LabelTarget::Summary);
        assert_eq!(payload, "||ID123|2025-12-24|Shinas|Khasab|BOARDING|2&33.5kg");
    }

    #[test]
    fn test_blank_payload_falls_back_to_reference() {
        let mut b = booking();
        b.passenger_name = None;
        b.passport_number = None;
        b.passenger_id_number = None;
        b.departure_date = None;
        b.origin_port = String::new();
        b.destination_port = String::new();
        b.baggage_pieces = None;
        b.baggage_weight_kg = None;
        b.baggage_items = None;
        let payload = scan_payload(&b, LabelTarget::Summary);
        assert_eq!(payload, "SC-REF-01");
    }

    #[test]
    fn test_integral_weight_prints_without_fraction() {
        assert_eq!(format_weight(20.0), "20");
        assert_eq!(format_weight(13.5), "13.5");
        assert_eq!(format_weight(0.0), "0");
    }
}
