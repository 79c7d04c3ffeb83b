//! The on-device user profile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Whether the user is asking for help or giving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// A senior citizen looking for help with their device.
    Senior,
    /// A volunteer offering help.
    Volunteer,
}

impl UserType {
    /// Human-readable name of the account type.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Senior => "Senior Citizen",
            Self::Volunteer => "Volunteer",
        }
    }

    /// Heading shown on the registration form.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Senior => "Seniors: Create Account!",
            Self::Volunteer => "Join us as a volunteer",
        }
    }

    /// Subheading shown on the registration form.
    #[must_use]
    pub fn subtitle(self) -> &'static str {
        match self {
            Self::Senior => "Get help with your mobile device from caring volunteers",
            Self::Volunteer => "Help seniors with their technology needs",
        }
    }

    /// Label of the button that picks this account type.
    #[must_use]
    pub fn button_text(self) -> &'static str {
        match self {
            Self::Senior => "I Need Help",
            Self::Volunteer => "I Want to Volunteer",
        }
    }

    /// Title and subtitle, one per line.
    #[must_use]
    pub fn banner(self) -> String {
        format!("{}\n{}", self.title(), self.subtitle())
    }

    /// Account type with the choice the user made to get it.
    #[must_use]
    pub fn account_label(self) -> String {
        format!("{} ({})", self.display_name(), self.button_text())
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Senior => write!(f, "senior"),
            Self::Volunteer => write!(f, "volunteer"),
        }
    }
}

/// The single user registered on this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier assigned at registration.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Phone number used to log in and to be called back.
    pub phone_number: String,
    /// Account type.
    pub user_type: UserType,
    /// Optional profile picture location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// Optional preferred way of being contacted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_contact_method: Option<String>,
    /// Whether the account is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Whether registration has completed.
    #[serde(default = "default_true")]
    pub is_registered: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create a freshly registered, active user with a new id.
    #[must_use]
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>, user_type: UserType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone_number: phone_number.into(),
            user_type,
            profile_image_url: None,
            preferred_contact_method: None,
            is_active: true,
            is_registered: true,
        }
    }

    /// Check that the required fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name or phone number is blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(Error::validation("phone number must not be empty"));
        }
        Ok(())
    }

    /// Compare a typed-in phone number against this user's, ignoring
    /// surrounding whitespace and ASCII case.
    #[must_use]
    pub fn phone_matches(&self, phone: &str) -> bool {
        self.phone_number
            .trim()
            .eq_ignore_ascii_case(phone.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_display() {
        assert_eq!(UserType::Senior.to_string(), "senior");
        assert_eq!(UserType::Volunteer.to_string(), "volunteer");
        assert_eq!(UserType::Senior.display_name(), "Senior Citizen");
        assert_eq!(UserType::Volunteer.button_text(), "I Want to Volunteer");
    }

    #[test]
    fn test_presentation_strings() {
        assert_eq!(
            UserType::Senior.banner(),
            "Seniors: Create Account!\nGet help with your mobile device from caring volunteers"
        );
        assert!(UserType::Volunteer
            .banner()
            .starts_with("Join us as a volunteer\n"));
        assert_eq!(
            UserType::Senior.account_label(),
            "Senior Citizen (I Need Help)"
        );
        assert_eq!(
            UserType::Volunteer.account_label(),
            "Volunteer (I Want to Volunteer)"
        );
    }

    #[test]
    fn test_user_new_defaults() {
        let user = User::new("Margaret", "5551234567", UserType::Senior);
        assert_eq!(user.name, "Margaret");
        assert!(user.is_active);
        assert!(user.is_registered);
        assert!(user.profile_image_url.is_none());
        assert!(user.preferred_contact_method.is_none());
    }

    #[test]
    fn test_user_ids_are_unique() {
        let a = User::new("A", "1", UserType::Senior);
        let b = User::new("A", "1", UserType::Senior);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(User::new("  ", "555", UserType::Senior).validate().is_err());
        assert!(User::new("Ann", "", UserType::Senior).validate().is_err());
        assert!(User::new("Ann", "555", UserType::Senior).validate().is_ok());
    }

    #[test]
    fn test_phone_matches_trims() {
        let user = User::new("Ann", "5551234567", UserType::Senior);
        assert!(user.phone_matches("  5551234567 "));
        assert!(!user.phone_matches("5551234568"));
        assert!(!user.phone_matches(""));
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User::new("Ann", "555", UserType::Volunteer);
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"phoneNumber\""));
        assert!(json.contains("\"userType\":\"volunteer\""));
        assert!(!json.contains("profileImageUrl"));
    }

    #[test]
    fn test_user_missing_optional_fields_default() {
        let json = r#"{
            "id": "6f1c1f4e-1a2b-4c3d-8e9f-0a1b2c3d4e5f",
            "name": "Ann",
            "phoneNumber": "555",
            "userType": "senior"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_active);
        assert!(user.is_registered);
        assert!(user.profile_image_url.is_none());
    }
}
