use serde::{Deserialize, Serialize};

use crate::domain::{Todo, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    pub completed: bool,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: String,
    pub completed: bool,
}

impl From<&Todo> for UpdateTodoRequest {
    fn from(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            completed: todo.completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosQuery {
    pub user_id: UserId,
}
