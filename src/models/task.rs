use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    ERR_COMPLETED_NOT_BOOL, ERR_DESCRIPTION_REQUIRED, ERR_PRIORITY_INVALID, ERR_TITLE_REQUIRED,
};
use crate::error::{AppError, Result};

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(()),
        }
    }
}

/// Task as stored in the tasks file and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

/// On-disk layout of the tasks file: `{ "tasks": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Validated mutable fields of a task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
}

/// Raw request body for create/update.
///
/// Fields are kept untyped so a wrong JSON type yields a 400 naming the
/// field instead of a generic deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub completed: Value,
    #[serde(default)]
    pub priority: Value,
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl TaskPayload {
    pub fn validate(&self) -> Result<TaskInput> {
        let title = non_empty_string(&self.title)
            .ok_or_else(|| AppError::InvalidInput(ERR_TITLE_REQUIRED.to_string()))?;

        let description = non_empty_string(&self.description)
            .ok_or_else(|| AppError::InvalidInput(ERR_DESCRIPTION_REQUIRED.to_string()))?;

        let completed = self
            .completed
            .as_bool()
            .ok_or_else(|| AppError::InvalidInput(ERR_COMPLETED_NOT_BOOL.to_string()))?;

        let priority = self
            .priority
            .as_str()
            .and_then(|p| p.parse::<Priority>().ok())
            .ok_or_else(|| AppError::InvalidInput(ERR_PRIORITY_INVALID.to_string()))?;

        Ok(TaskInput {
            title,
            description,
            completed,
            priority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: Value) -> TaskPayload {
        serde_json::from_value(body).unwrap()
    }

    fn error_message(result: Result<TaskInput>) -> String {
        match result {
            Err(AppError::InvalidInput(msg)) => msg,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let input = payload(json!({
            "title": "  Buy milk ",
            "description": "2%",
            "completed": false,
            "priority": "low"
        }))
        .validate()
        .unwrap();

        assert_eq!(input.title, "Buy milk");
        assert_eq!(input.description, "2%");
        assert!(!input.completed);
        assert_eq!(input.priority, Priority::Low);
    }

    #[test]
    fn test_validate_names_violated_field() {
        let msg = error_message(
            payload(json!({"title": "   ", "description": "d", "completed": true, "priority": "high"}))
                .validate(),
        );
        assert_eq!(msg, ERR_TITLE_REQUIRED);

        let msg = error_message(
            payload(json!({"title": "t", "completed": true, "priority": "high"})).validate(),
        );
        assert_eq!(msg, ERR_DESCRIPTION_REQUIRED);

        let msg = error_message(
            payload(json!({"title": "t", "description": "d", "completed": "yes", "priority": "high"}))
                .validate(),
        );
        assert_eq!(msg, ERR_COMPLETED_NOT_BOOL);

        let msg = error_message(
            payload(json!({"title": "t", "description": "d", "completed": true, "priority": "urgent"}))
                .validate(),
        );
        assert_eq!(msg, ERR_PRIORITY_INVALID);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            completed: false,
            priority: Priority::Medium,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["priority"], "medium");
        assert!(value["createdAt"].is_string());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("medium".parse::<Priority>(), Ok(Priority::Medium));
        assert!("Medium".parse::<Priority>().is_err());
        assert!("urgent".parse::<Priority>().is_err());
    }
}
