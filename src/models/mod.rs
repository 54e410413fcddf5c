#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ── Users ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id:            String,
    pub username:      String,
    pub email:         String,
    pub phone_number:  Option<String>,
    pub password_hash: String,
    pub is_admin:      bool,
    pub created_at:    NaiveDateTime,
}

// ── Sessions ─────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSession {
    pub id:         String,
    pub user_id:    String,
    pub token:      String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

// ── Bans ─────────────────────────────────────────────────────

/// Denylist entry. Each populated field is an independent filter: an attempt
/// is banned when ANY of them equals the corresponding attempt attribute.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ban {
    pub id:           String,
    pub email:        Option<String>,
    pub phone_number: Option<String>,
    pub ip_address:   Option<String>,
    pub reason:       Option<String>,
    pub created_at:   NaiveDateTime,
}

// ── Sales ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub id:                  String,
    pub name:                String,
    pub discount_percentage: f64,
    pub is_active:           bool,
    pub color:               String,
    pub created_at:          NaiveDateTime,
}

// ── Animals ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Animal {
    pub id:                 String,
    pub user_id:            String,
    pub name:               String,
    pub animal_type:        String,
    pub breed:              String,
    pub age:                Option<i32>,
    pub weight:             Option<f64>,
    pub temperament:        Option<String>,
    pub special_needs:      Option<String>,
    pub medical_conditions: Option<String>,
    pub created_at:         NaiveDateTime,
    pub updated_at:         NaiveDateTime,
}

// ── Bookings ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id:             String,
    pub user_id:        String,
    pub booking_name:   String,
    pub phone_number:   String,
    pub date:           NaiveDate,
    pub start_time:     NaiveTime,
    pub duration_hours: f64,
    pub total_cost:     f64,
    pub sale_applied:   Option<String>,
    pub status:         BookingStatus,
    pub admin_notes:    Option<String>,
    pub user_notes:     Option<String>,
    pub num_animals:    i32,
    pub created_at:     NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Denied,
    InProgress,
    Completed,
}

impl BookingStatus {
    /// Completed bookings are frozen; everything else may still be cancelled
    /// by its owner or an administrator.
    pub fn is_deletable(self) -> bool {
        !matches!(self, BookingStatus::Completed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Denied => "denied",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

// ── Booking/animal association ───────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingAnimal {
    pub id:         String,
    pub booking_id: String,
    pub animal_id:  String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_is_the_only_frozen_status() {
        assert!(BookingStatus::Pending.is_deletable());
        assert!(BookingStatus::Approved.is_deletable());
        assert!(BookingStatus::Denied.is_deletable());
        assert!(BookingStatus::InProgress.is_deletable());
        assert!(!BookingStatus::Completed.is_deletable());
    }

    #[test]
    fn status_names_use_snake_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: BookingStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, BookingStatus::Completed);
    }
}
