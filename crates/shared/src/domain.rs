use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(TodoId);

impl TodoId {
    /// Id carried by a todo that has not been saved yet.
    pub const PLACEHOLDER: TodoId = TodoId(0);

    pub fn is_placeholder(self) -> bool {
        self == Self::PLACEHOLDER
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Unsaved todo shown while its create request is in flight.
    pub fn placeholder(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: TodoId::PLACEHOLDER,
            user_id,
            title: title.into(),
            completed: false,
        }
    }

    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !todo.completed,
            FilterMode::Completed => todo.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}', expected one of: all, active, completed")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterMode {
    type Err = UnknownFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        FilterMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| UnknownFilter(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_camel_case_wire_keys() {
        let todo: Todo =
            serde_json::from_str(r#"{"id":4,"userId":11,"title":"walk","completed":true}"#)
                .expect("decode");
        assert_eq!(todo.id, TodoId(4));
        assert_eq!(todo.user_id, UserId(11));
        assert!(todo.completed);

        let encoded = serde_json::to_value(&todo).expect("encode");
        assert_eq!(encoded["userId"], 11);
    }

    #[test]
    fn placeholder_has_zero_id_and_is_active() {
        let todo = Todo::placeholder(UserId(3), "draft");
        assert!(todo.id.is_placeholder());
        assert!(!todo.completed);
    }

    #[test]
    fn filter_mode_parses_case_insensitively() {
        assert_eq!("Active".parse::<FilterMode>(), Ok(FilterMode::Active));
        assert_eq!(" completed ".parse::<FilterMode>(), Ok(FilterMode::Completed));
        assert!("done".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::default(), FilterMode::All);
    }
}
