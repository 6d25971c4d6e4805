//! Checklist collections: daily tasks, weekly goals and monthly goals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Anything kept in a dashboard collection.
pub trait Record {
    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Sorts records newest-first, the display order of every collection.
pub fn sort_newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

/// The named collections a dashboard keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Tasks,
    WeeklyGoals,
    MonthlyGoals,
    QuickAccess,
}

impl CollectionKind {
    /// The three checklist collections, in display order.
    pub const CHECKLISTS: [CollectionKind; 3] = [
        CollectionKind::MonthlyGoals,
        CollectionKind::Tasks,
        CollectionKind::WeeklyGoals,
    ];

    /// Storage name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::WeeklyGoals => "weeklyGoals",
            Self::MonthlyGoals => "monthlyGoals",
            Self::QuickAccess => "quickAccess",
        }
    }

    /// Heading shown above the collection.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Tasks => "Today's Tasks",
            Self::WeeklyGoals => "Weekly Goals",
            Self::MonthlyGoals => "Monthly Goals",
            Self::QuickAccess => "Quick Access",
        }
    }

    pub fn is_checklist(&self) -> bool {
        !matches!(self, Self::QuickAccess)
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tasks" => Ok(Self::Tasks),
            "weeklyGoals" | "weekly" => Ok(Self::WeeklyGoals),
            "monthlyGoals" | "monthly" => Ok(Self::MonthlyGoals),
            "quickAccess" | "links" => Ok(Self::QuickAccess),
            other => Err(CoreError::UnknownCollection(other.to_string())),
        }
    }
}

/// A checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ChecklistItem {
    /// Creates an open item, or `None` if `text` is blank after trimming.
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            created_at: Utc::now(),
        })
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

impl Record for ChecklistItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
