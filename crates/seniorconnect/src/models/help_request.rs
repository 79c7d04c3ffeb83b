//! Text help requests submitted by seniors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of help is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Anything not covered below.
    GeneralHelp,
    /// Trouble with an app.
    AppSupport,
    /// Setting up a new device.
    DeviceSetup,
    /// Something stopped working.
    Troubleshooting,
    /// Needs someone now.
    Emergency,
}

impl RequestType {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::GeneralHelp => "General Help",
            Self::AppSupport => "App Support",
            Self::DeviceSetup => "Device Setup",
            Self::Troubleshooting => "Troubleshooting",
            Self::Emergency => "Emergency",
        }
    }
}

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for a volunteer.
    Pending,
    /// A volunteer is working on it.
    InProgress,
    /// Resolved.
    Completed,
    /// Withdrawn.
    Cancelled,
}

/// Dashboard grouping for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpCategory {
    /// Device settings.
    PhoneSettings,
    /// Photos.
    Photos,
    /// Calls.
    Calls,
    /// Apps.
    Apps,
    /// Internet.
    Internet,
    /// Messages.
    Messages,
}

/// How quickly a request should be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrgencyLevel {
    /// Can wait.
    Low,
    /// Should be looked at soon.
    Medium,
    /// Needs attention now.
    High,
}

impl UrgencyLevel {
    /// Sort key; higher is more urgent.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// A help request written by a senior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequest {
    /// Request identifier.
    pub id: Uuid,
    /// The user who asked.
    pub user_id: Uuid,
    /// Short summary.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Kind of help.
    pub request_type: RequestType,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Volunteer who picked the request up, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_volunteer_id: Option<Uuid>,
    /// Attached photos or voice clips.
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

impl HelpRequest {
    /// Create a pending, unassigned request.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        request_type: RequestType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            request_type,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            assigned_volunteer_id: None,
            attachment_urls: Vec::new(),
        }
    }

    /// Dashboard category derived from the request type.
    #[must_use]
    pub fn category(&self) -> HelpCategory {
        match self.request_type {
            RequestType::AppSupport => HelpCategory::Apps,
            RequestType::Emergency => HelpCategory::Calls,
            RequestType::GeneralHelp
            | RequestType::DeviceSetup
            | RequestType::Troubleshooting => HelpCategory::PhoneSettings,
        }
    }

    /// Urgency derived from the request type.
    #[must_use]
    pub fn urgency(&self) -> UrgencyLevel {
        match self.request_type {
            RequestType::Emergency => UrgencyLevel::High,
            RequestType::Troubleshooting => UrgencyLevel::Medium,
            _ => UrgencyLevel::Low,
        }
    }
}

/// Order requests most urgent first, oldest first within a level.
pub fn sort_by_urgency(requests: &mut [HelpRequest]) {
    requests.sort_by(|a, b| {
        b.urgency()
            .rank()
            .cmp(&a.urgency().rank())
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(request_type: RequestType) -> HelpRequest {
        HelpRequest::new(Uuid::new_v4(), "t", "d", request_type)
    }

    #[test]
    fn test_new_request_is_pending() {
        let req = request(RequestType::GeneralHelp);
        assert_eq!(req.status, RequestStatus::Pending);
        assert!(req.assigned_volunteer_id.is_none());
        assert!(req.attachment_urls.is_empty());
    }

    #[test]
    fn test_derived_category() {
        assert_eq!(request(RequestType::AppSupport).category(), HelpCategory::Apps);
        assert_eq!(request(RequestType::Emergency).category(), HelpCategory::Calls);
        assert_eq!(
            request(RequestType::DeviceSetup).category(),
            HelpCategory::PhoneSettings
        );
    }

    #[test]
    fn test_derived_urgency() {
        assert_eq!(request(RequestType::Emergency).urgency(), UrgencyLevel::High);
        assert_eq!(
            request(RequestType::Troubleshooting).urgency(),
            UrgencyLevel::Medium
        );
        assert_eq!(request(RequestType::AppSupport).urgency(), UrgencyLevel::Low);
        assert!(UrgencyLevel::High.rank() > UrgencyLevel::Medium.rank());
    }

    #[test]
    fn test_sort_by_urgency() {
        let mut older = request(RequestType::GeneralHelp);
        older.created_at -= Duration::minutes(10);
        let newer = request(RequestType::GeneralHelp);
        let emergency = request(RequestType::Emergency);
        let trouble = request(RequestType::Troubleshooting);

        let mut requests = vec![newer.clone(), trouble.clone(), older.clone(), emergency.clone()];
        sort_by_urgency(&mut requests);

        let ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![emergency.id, trouble.id, older.id, newer.id]);
    }

    #[test]
    fn test_request_type_label() {
        assert_eq!(RequestType::AppSupport.label(), "App Support");
    }
}
