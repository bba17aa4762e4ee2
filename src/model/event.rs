// File: ./src/model/event.rs
// Event records as exchanged with the backend, plus request and filter payloads.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub type EventId = i64;

/// Lifecycle status of an event. Transitions are owned by the server;
/// the client only ever adopts the status it gets back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EventStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// COMPLETED and CANCELLED events never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Short symbol used by the list renderer.
    pub fn symbol(&self) -> &'static str {
        match self {
            EventStatus::Draft => "[ ]",
            EventStatus::Published => "[·]",
            EventStatus::Ongoing => "[▶]",
            EventStatus::Completed => "[✔]",
            EventStatus::Cancelled => "[✘]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    /// Server-rendered start in the timezone passed with the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_local: Option<String>,
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Partial update. `None` fields are left out of the PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Body of the start and stop transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl TransitionRequest {
    pub fn in_zone(timezone: &str) -> Self {
        Self {
            timezone: Some(timezone.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub status: Option<EventStatus>,
    pub start_date_from: Option<DateTime<Utc>>,
    pub start_date_to: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
}

impl EventFilter {
    /// Query-string pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            pairs.push(("name", name.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(from) = self.start_date_from {
            pairs.push(("startDateFrom", from.to_rfc3339()));
        }
        if let Some(to) = self.start_date_to {
            pairs.push(("startDateTo", to.to_rfc3339()));
        }
        if let Some(tz) = &self.timezone {
            pairs.push(("timezone", tz.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&EventStatus::Ongoing).unwrap(),
            "\"ONGOING\""
        );
        assert_eq!(EventStatus::from_str("published").unwrap(), EventStatus::Published);
        assert_eq!(EventStatus::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_event_parses_server_payload() {
        let json = r#"{
            "id": 7,
            "name": "Morning run",
            "startDate": "2025-03-01T08:00:00.000Z",
            "startDateLocal": "2025-03-01T09:00:00+01:00",
            "endDate": "2025-03-01T09:00:00.000Z",
            "status": "ONGOING",
            "createdAt": "2025-02-20T10:00:00.000Z",
            "updatedAt": "2025-03-01T08:00:00.000Z",
            "timezone": "Europe/Paris"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, 7);
        assert_eq!(event.status, EventStatus::Ongoing);
        assert!(event.description.is_none());
        assert_eq!(event.timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let req = UpdateEventRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"name":"Renamed"}"#);
    }

    #[test]
    fn test_filter_skips_empty_name() {
        let filter = EventFilter {
            page: Some(2),
            name: Some(String::new()),
            status: Some(EventStatus::Draft),
            ..Default::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("page", "2".to_string()), ("status", "DRAFT".to_string())]
        );
    }
}
