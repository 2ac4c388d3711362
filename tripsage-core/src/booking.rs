use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Hotel,
    Travel,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Hotel => "hotel",
            BookingType::Travel => "travel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hotel" => Some(BookingType::Hotel),
            "travel" => Some(BookingType::Travel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Cancellation is only valid before a booking reaches a terminal
    /// state; `cancelled` and `completed` never transition again.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// Catalog state copied at booking time; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelDetails {
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
    pub hotel_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelDetails {
    pub travel_date: NaiveDate,
    pub participants: Vec<Participant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    pub package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingDetails {
    Hotel(HotelDetails),
    Travel(TravelDetails),
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub total_price: f64,
    pub details: BookingDetails,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// There is no payment-authorization step, so new bookings start
    /// out `confirmed`. The owner comes from the verified session, never
    /// from the request body.
    pub fn new(
        user_id: Uuid,
        booking_type: BookingType,
        total_price: f64,
        details: BookingDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            booking_type,
            status: BookingStatus::Confirmed,
            total_price,
            details,
            created_at: Utc::now(),
        }
    }
}

/// The raw create-booking body. Everything is optional at the wire level
/// so validation can enumerate exactly which fields are missing.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingRequest {
    pub booking_type: Option<String>,
    pub total_price: Option<f64>,
    // Hotel fields
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub hotel_id: Option<String>,
    pub hotel_name: Option<String>,
    pub location: Option<String>,
    pub room_type: Option<String>,
    // Travel fields
    pub travel_date: Option<NaiveDate>,
    pub participants: Option<Vec<Participant>>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub destination: Option<String>,
    pub duration_days: Option<u32>,
}

impl CreateBookingRequest {
    pub fn validate(self) -> Result<(BookingType, f64, BookingDetails), ValidationError> {
        let type_str = self
            .booking_type
            .as_deref()
            .ok_or_else(|| ValidationError("missing required field: booking_type".to_string()))?;
        let booking_type = BookingType::parse(type_str).ok_or_else(|| {
            ValidationError(format!(
                "invalid booking_type '{}': must be 'hotel' or 'travel'",
                type_str
            ))
        })?;

        let mut missing = Vec::new();
        if self.total_price.is_none() {
            missing.push("total_price");
        }

        match booking_type {
            BookingType::Hotel => {
                if self.check_in_date.is_none() {
                    missing.push("check_in_date");
                }
                if self.check_out_date.is_none() {
                    missing.push("check_out_date");
                }
                if self.guests.is_none() {
                    missing.push("guests");
                }
                if self.hotel_name.is_none() && self.hotel_id.is_none() {
                    missing.push("hotel_name or hotel_id");
                }
            }
            BookingType::Travel => {
                if self.travel_date.is_none() {
                    missing.push("travel_date");
                }
                if self.participants.is_none() {
                    missing.push("participants");
                }
                if self.package_name.is_none() && self.package_id.is_none() {
                    missing.push("package_name or package_id");
                }
            }
        }

        if !missing.is_empty() {
            return Err(ValidationError(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let total_price = self.total_price.unwrap_or_default();
        if !total_price.is_finite() || total_price < 0.0 {
            return Err(ValidationError(
                "total_price must be a non-negative number".to_string(),
            ));
        }

        let details = match booking_type {
            BookingType::Hotel => {
                let (Some(check_in), Some(check_out), Some(guests)) =
                    (self.check_in_date, self.check_out_date, self.guests)
                else {
                    return Err(ValidationError("missing required fields".to_string()));
                };
                if check_out <= check_in {
                    return Err(ValidationError(
                        "check_out_date must be after check_in_date".to_string(),
                    ));
                }
                if guests == 0 {
                    return Err(ValidationError("guests must be at least 1".to_string()));
                }
                BookingDetails::Hotel(HotelDetails {
                    check_in_date: check_in,
                    check_out_date: check_out,
                    guests,
                    hotel_id: self.hotel_id,
                    hotel_name: self
                        .hotel_name
                        .unwrap_or_else(|| "Unknown hotel".to_string()),
                    location: self.location,
                    room_type: self.room_type,
                })
            }
            BookingType::Travel => {
                let Some(travel_date) = self.travel_date else {
                    return Err(ValidationError("missing required fields".to_string()));
                };
                let participants = self.participants.unwrap_or_default();
                if participants.is_empty() {
                    return Err(ValidationError(
                        "participants must be a non-empty list".to_string(),
                    ));
                }
                BookingDetails::Travel(TravelDetails {
                    travel_date,
                    participants,
                    package_id: self.package_id,
                    package_name: self
                        .package_name
                        .unwrap_or_else(|| "Unknown package".to_string()),
                    destination: self.destination,
                    duration_days: self.duration_days,
                })
            }
        };

        Ok((booking_type, total_price, details))
    }
}
