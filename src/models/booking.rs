use chrono::{DateTime, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consts;

/// Closed set of booking states reported by the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Default)]
pub enum BookingStatus {
    #[default]
    #[serde(rename = "PENDING")]
    #[display("PENDING")]
    Pending,
    #[serde(rename = "PAID")]
    #[display("PAID")]
    Paid,
    #[serde(rename = "CANCELLED")]
    #[display("CANCELLED")]
    Cancelled,
}

/// One reserved seat inside a booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub price: Decimal,
    pub available: bool,
    pub row_label: String,
    pub seat_number: u32,
}

impl Ticket {
    /// Seat label as shown to the user, e.g. "A5"
    pub fn seat_label(&self) -> String {
        format!("{}{}", self.row_label, self.seat_number)
    }
}

/// Read-only projection of a booking owned by the logged user.
///
/// Bookings have no local counterpart; they only exist as part of the user
/// snapshot fetched from the remote API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub movie_title: String,
    pub start_time: DateTime<Utc>,
    pub booking_status: BookingStatus,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

impl Booking {
    pub fn seat_labels(&self) -> Vec<String> {
        self.tickets.iter().map(Ticket::seat_label).collect()
    }

    pub fn start_time_display(&self) -> String {
        self.start_time
            .format(consts::DATETIME_DISPLAY_FORMAT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_deserializes_from_api_payload() {
        let payload = serde_json::json!({
            "id": 17,
            "createdAt": "2026-08-01T18:30:00Z",
            "totalPrice": 25.5,
            "movieTitle": "Blade Runner",
            "startTime": "2026-08-02T21:00:00Z",
            "bookingStatus": "PAID",
            "tickets": [
                {"id": 1, "price": 12.75, "available": false, "rowLabel": "A", "seatNumber": 5},
                {"id": 2, "price": 12.75, "available": false, "rowLabel": "A", "seatNumber": 6}
            ]
        });

        let booking: Booking = serde_json::from_value(payload).unwrap();

        assert_eq!(booking.booking_status, BookingStatus::Paid);
        assert_eq!(booking.seat_labels(), vec!["A5", "A6"]);
    }

    #[test]
    fn test_booking_without_tickets_defaults_to_empty_list() {
        let payload = serde_json::json!({
            "id": 3,
            "createdAt": "2026-08-01T18:30:00Z",
            "totalPrice": 0.0,
            "movieTitle": "Alien",
            "startTime": "2026-08-02T21:00:00Z",
            "bookingStatus": "CANCELLED"
        });

        let booking: Booking = serde_json::from_value(payload).unwrap();

        assert!(booking.tickets.is_empty());
        assert_eq!(booking.booking_status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_unknown_booking_status_is_rejected() {
        let result = serde_json::from_value::<BookingStatus>(serde_json::json!("REFUNDED"));
        assert!(result.is_err());
    }
}
