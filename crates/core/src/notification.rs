// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification objects and their filters and statistics.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    MedicationReminder,
    AppointmentReminder,
    TreatmentReminder,
    System,
    Custom,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::MedicationReminder => "MEDICATION_REMINDER",
            NotificationType::AppointmentReminder => "APPOINTMENT_REMINDER",
            NotificationType::TreatmentReminder => "TREATMENT_REMINDER",
            NotificationType::System => "SYSTEM",
            NotificationType::Custom => "CUSTOM",
        }
    }

    /// Reminder categories get a local delivery trigger; generic and system
    /// notifications do not.
    pub fn is_reminder(&self) -> bool {
        matches!(
            self,
            NotificationType::MedicationReminder
                | NotificationType::AppointmentReminder
                | NotificationType::TreatmentReminder
        )
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "MEDICATION_REMINDER" => Ok(NotificationType::MedicationReminder),
            "APPOINTMENT_REMINDER" => Ok(NotificationType::AppointmentReminder),
            "TREATMENT_REMINDER" => Ok(NotificationType::TreatmentReminder),
            "SYSTEM" => Ok(NotificationType::System),
            "CUSTOM" => Ok(NotificationType::Custom),
            _ => Err(Error::InvalidNotificationType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    #[default]
    Unread,
    Read,
    Archived,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "UNREAD",
            NotificationStatus::Read => "READ",
            NotificationStatus::Archived => "ARCHIVED",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "UNREAD" => Ok(NotificationStatus::Unread),
            "READ" => Ok(NotificationStatus::Read),
            "ARCHIVED" => Ok(NotificationStatus::Archived),
            _ => Err(Error::InvalidNotificationStatus(s.to_string())),
        }
    }
}

/// A notification as the server (or the local cache) represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: NotificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        self.status = NotificationStatus::Read;
        self.read_at = Some(now);
        self.updated_at = now;
    }

    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = NotificationStatus::Archived;
        self.updated_at = now;
    }

    /// True when a local delivery trigger should be scheduled at `scheduled_for`.
    pub fn needs_local_trigger(&self, now: DateTime<Utc>) -> bool {
        self.kind.is_reminder() && self.scheduled_for.is_some_and(|at| at > now)
    }
}

/// Caller input for creating a notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl NewNotification {
    /// Checks required fields and parses the type.
    pub fn validate(&self) -> Result<NotificationType> {
        for (value, field) in [
            (&self.user_id, "userId"),
            (&self.kind, "type"),
            (&self.title, "title"),
            (&self.message, "message"),
        ] {
            if value.trim().is_empty() {
                return Err(Error::FieldRequired { field });
            }
        }
        self.kind.parse()
    }

    /// JSON body for `POST /notifications`.
    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "userId": self.user_id,
            "type": self.kind.trim().to_uppercase(),
            "title": self.title,
            "message": self.message,
            "priority": self.priority.unwrap_or_default(),
        });
        if let Value::Object(map) = &mut body {
            if let Some(metadata) = &self.metadata {
                map.insert("metadata".to_string(), metadata.clone());
            }
            if let Some(at) = self.scheduled_for {
                map.insert(
                    "scheduledFor".to_string(),
                    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
            }
        }
        body
    }

    /// Builds the unread local copy used when the server cannot be reached.
    pub fn into_local(self, id: String, kind: NotificationType, now: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            kind,
            title: self.title,
            message: self.message,
            priority: self.priority.unwrap_or_default(),
            status: NotificationStatus::Unread,
            metadata: self.metadata,
            scheduled_for: self.scheduled_for,
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// List filters accepted by `GET /notifications`, also applied to the local cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFilter {
    pub status: Option<NotificationStatus>,
    pub priority: Option<Priority>,
    pub kind: Option<NotificationType>,
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for NotificationFilter {
    fn default() -> Self {
        NotificationFilter {
            status: None,
            priority: None,
            kind: None,
            search: None,
            page: 1,
            page_size: 20,
        }
    }
}

impl NotificationFilter {
    /// Query parameters in the server's naming.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority".to_string(), priority.as_str().to_string()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("type".to_string(), kind.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        if self.status.is_some_and(|s| s != notification.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != notification.priority) {
            return false;
        }
        if self.kind.is_some_and(|k| k != notification.kind) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                notification.title.to_lowercase().contains(&term)
                    || notification.message.to_lowercase().contains(&term)
            }
            None => true,
        }
    }

    /// Filters and pages a local list, newest first.
    pub fn apply(&self, notifications: &[Notification]) -> Vec<Notification> {
        let mut matching: Vec<Notification> = notifications
            .iter()
            .filter(|n| self.matches(n))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page_size = self.page_size.max(1) as usize;
        let skip = (self.page.max(1) as usize - 1) * page_size;
        matching.into_iter().skip(skip).take(page_size).collect()
    }
}

/// Counts by priority, keyed in lower case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub urgent: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPercentages {
    pub unread: f64,
    pub read: f64,
    pub archived: f64,
}

/// Aggregate notification counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: u64,
    pub unread: u64,
    pub read: u64,
    pub archived: u64,
    pub by_priority: PriorityCounts,
    pub by_type: BTreeMap<String, u64>,
    pub percentages: StatusPercentages,
    pub last_updated: DateTime<Utc>,
}

impl NotificationStats {
    /// Decodes `GET /notifications/stats`, tolerating missing fields and
    /// either upper- or lower-case priority keys.
    pub fn from_server(value: &Value, now: DateTime<Utc>) -> Self {
        let count = |v: Option<&Value>| v.and_then(Value::as_u64).unwrap_or(0);
        let by_priority = value.get("byPriority");
        let priority = |upper: &str, lower: &str| {
            let bucket = by_priority.and_then(|p| p.get(upper).or_else(|| p.get(lower)));
            count(bucket)
        };
        let by_type = value
            .get("byType")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), v.as_u64().unwrap_or(0)))
                    .collect()
            })
            .unwrap_or_default();
        let percentages = value
            .get("percentages")
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default();
        let last_updated = value
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now);

        NotificationStats {
            total: count(value.get("total")),
            unread: count(value.get("unread")),
            read: count(value.get("read")),
            archived: count(value.get("archived")),
            by_priority: PriorityCounts {
                low: priority("LOW", "low"),
                medium: priority("MEDIUM", "medium"),
                high: priority("HIGH", "high"),
                urgent: priority("URGENT", "urgent"),
            },
            by_type,
            percentages,
            last_updated,
        }
    }

    /// Computes the same counters from the local cache.
    pub fn from_local(notifications: &[Notification], now: DateTime<Utc>) -> Self {
        let mut stats = NotificationStats {
            total: notifications.len() as u64,
            unread: 0,
            read: 0,
            archived: 0,
            by_priority: PriorityCounts::default(),
            by_type: BTreeMap::new(),
            percentages: StatusPercentages::default(),
            last_updated: now,
        };
        for n in notifications {
            match n.status {
                NotificationStatus::Unread => stats.unread += 1,
                NotificationStatus::Read => stats.read += 1,
                NotificationStatus::Archived => stats.archived += 1,
            }
            match n.priority {
                Priority::Low => stats.by_priority.low += 1,
                Priority::Medium => stats.by_priority.medium += 1,
                Priority::High => stats.by_priority.high += 1,
                Priority::Urgent => stats.by_priority.urgent += 1,
            }
            *stats.by_type.entry(n.kind.as_str().to_string()).or_insert(0) += 1;
        }
        if stats.total > 0 {
            let pct = |n: u64| n as f64 * 100.0 / stats.total as f64;
            stats.percentages = StatusPercentages {
                unread: pct(stats.unread),
                read: pct(stats.read),
                archived: pct(stats.archived),
            };
        }
        stats
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
