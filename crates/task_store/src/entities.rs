//! Entity types for the task store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TaskStoreError, TaskStoreResult};

/// A single todo record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, strictly increasing within a store lifetime
    pub id: i64,
    /// Task title, never empty
    pub title: String,
    /// Whether the task is done
    pub completed: bool,
    /// Created timestamp, immutable after creation
    pub created_at: DateTime<Utc>,
    /// Updated timestamp, refreshed on every successful mutation
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Title of the task to create
    pub title: String,
    /// Initial completion flag
    pub completed: bool,
}

impl NewTask {
    /// Creates a new task request with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }

    /// Sets the initial completion flag
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Partial update for a task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// Replacement title
    pub title: Option<String>,
    /// Replacement completion flag
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Returns true when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Validates the patch, normalizing a supplied title. Empty patches are
    /// rejected so an update always touches at least one field.
    pub(crate) fn normalized(mut self) -> TaskStoreResult<Self> {
        if self.is_empty() {
            return Err(TaskStoreError::Validation(
                "no fields supplied to update".to_string(),
            ));
        }
        if let Some(title) = self.title.take() {
            self.title = Some(normalize_title(&title)?);
        }
        Ok(self)
    }
}

/// Trims surrounding whitespace and rejects empty titles
pub(crate) fn normalize_title(raw: &str) -> TaskStoreResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskStoreError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_title_trims() {
        assert_eq!(normalize_title("  Buy milk  ").unwrap(), "Buy milk");
    }

    #[test]
    fn normalize_title_rejects_whitespace() {
        assert!(matches!(
            normalize_title("   "),
            Err(TaskStoreError::Validation(_))
        ));
        assert!(matches!(
            normalize_title(""),
            Err(TaskStoreError::Validation(_))
        ));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let result = TaskPatch::default().normalized();
        assert!(matches!(result, Err(TaskStoreError::Validation(_))));
    }

    #[test]
    fn patch_normalizes_supplied_title() {
        let patch = TaskPatch {
            title: Some(" Water plants ".to_string()),
            completed: None,
        };
        let normalized = patch.normalized().unwrap();
        assert_eq!(normalized.title.as_deref(), Some("Water plants"));
        assert!(normalized.completed.is_none());
    }
}
