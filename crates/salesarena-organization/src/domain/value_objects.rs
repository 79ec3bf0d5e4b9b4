//! Value objects for the Organization & Membership context.

use std::fmt;

use chrono::{DateTime, Utc};
use salesarena_core::id::UniqueId;
use salesarena_core::result::DomainResult;
use salesarena_core::value_object::rules::{char_len, first_failure};
use salesarena_core::value_object::{Props, ValueObject};
use serde::{Deserialize, Serialize};

/// Rejection message for a blank organization name.
pub const NAME_REQUIRED: &str = "Organisationsnamn får inte vara tomt";
/// Rejection message for a name shorter than [`NAME_MIN_CHARS`].
pub const NAME_TOO_SHORT: &str = "Organisationsnamn måste vara minst 2 tecken";
/// Rejection message for a name longer than [`NAME_MAX_CHARS`].
pub const NAME_TOO_LONG: &str = "Organisationsnamn får vara högst 50 tecken";

/// Shortest accepted organization name, in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Longest accepted organization name, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Fewest seats a subscription can have.
pub const MIN_SEATS: u32 = 1;
/// Most seats a subscription can have.
pub const MAX_SEATS: u32 = 500;

/// Props behind [`OrganizationName`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationNameProps {
    /// The display name.
    pub value: String,
}

impl Props for OrganizationNameProps {
    fn normalize(self) -> Self {
        Self {
            value: self.value.trim().to_owned(),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        let len = char_len(&self.value);
        first_failure([
            (!self.value.is_empty(), NAME_REQUIRED),
            (len >= NAME_MIN_CHARS, NAME_TOO_SHORT),
            (len <= NAME_MAX_CHARS, NAME_TOO_LONG),
        ])
    }
}

/// An organization's display name: trimmed, 2 to 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrganizationName(ValueObject<OrganizationNameProps>);

impl OrganizationName {
    /// Trims and validates a raw name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the trimmed name is empty, too
    /// short, or too long.
    pub fn create(raw: &str) -> DomainResult<Self> {
        ValueObject::create(OrganizationNameProps {
            value: raw.to_owned(),
        })
        .map(Self)
    }

    /// The normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0.props().value
    }
}

impl fmt::Display for OrganizationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Props behind [`SeatLimit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatLimitProps {
    /// Number of member seats the subscription pays for.
    pub seats: u32,
}

impl Props for SeatLimitProps {
    fn validate(&self) -> DomainResult<()> {
        first_failure([
            (self.seats >= MIN_SEATS, "Antal licenser måste vara minst 1"),
            (self.seats <= MAX_SEATS, "Antal licenser får vara högst 500"),
        ])
    }
}

/// How many members an organization may have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SeatLimit(ValueObject<SeatLimitProps>);

impl SeatLimit {
    /// Validates a seat count.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `seats` is outside 1..=500.
    pub fn create(seats: u32) -> DomainResult<Self> {
        ValueObject::create(SeatLimitProps { seats }).map(Self)
    }

    /// The seat count.
    #[must_use]
    pub fn seats(&self) -> u32 {
        self.0.props().seats
    }
}

/// A member's role within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Owns the subscription; at least one is required.
    Owner,
    /// Manages members and settings.
    Admin,
    /// Leads a team and sets goals.
    Manager,
    /// Takes part in goals and competitions.
    Seller,
}

impl MemberRole {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Seller => "seller",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's membership in an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member's user id.
    pub user_id: UniqueId,
    /// The member's role.
    pub role: MemberRole,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use salesarena_core::error::DomainError;

    use super::*;

    #[test]
    fn test_name_shorter_than_two_chars_is_rejected() {
        assert_eq!(
            OrganizationName::create("A"),
            Err(DomainError::Validation(
                "Organisationsnamn måste vara minst 2 tecken".to_owned()
            ))
        );
    }

    #[test]
    fn test_name_is_trimmed() {
        let name = OrganizationName::create("  Acme  ").unwrap();
        assert_eq!(name.to_string(), "Acme");
    }

    #[test]
    fn test_valid_names_round_trip_after_trimming() {
        for raw in ["AB", " Säljteamet Nord ", "x".repeat(NAME_MAX_CHARS).as_str()] {
            let name = OrganizationName::create(raw).unwrap();
            assert_eq!(name.as_str(), raw.trim());
        }
    }

    #[test]
    fn test_blank_name_reports_required_not_too_short() {
        let err = OrganizationName::create("   ").unwrap_err();
        assert!(err.to_string().contains("får inte vara tomt"));
    }

    #[test]
    fn test_name_length_counts_characters_not_bytes() {
        // Two characters, four bytes.
        assert!(OrganizationName::create("ÅÖ").is_ok());
        let err = OrganizationName::create(&"Ö".repeat(NAME_MAX_CHARS + 1)).unwrap_err();
        assert!(err.to_string().contains("högst 50"));
    }

    #[test]
    fn test_names_compare_structurally() {
        assert_eq!(
            OrganizationName::create("Acme").unwrap(),
            OrganizationName::create(" Acme ").unwrap()
        );
    }

    #[test]
    fn test_seat_limit_bounds() {
        assert!(SeatLimit::create(0).unwrap_err().to_string().contains("minst 1"));
        assert!(SeatLimit::create(501).unwrap_err().to_string().contains("högst 500"));
        assert_eq!(SeatLimit::create(25).unwrap().seats(), 25);
    }

    #[test]
    fn test_member_role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(MemberRole::Seller).unwrap(),
            serde_json::json!("seller")
        );
        let role: MemberRole = serde_json::from_value(serde_json::json!("admin")).unwrap();
        assert_eq!(role, MemberRole::Admin);
    }
}
