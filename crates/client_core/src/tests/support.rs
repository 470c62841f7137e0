use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use shared::domain::{Todo, TodoId, UserId};
use tokio::sync::{oneshot, Mutex};

use crate::{error::RemoteError, store::TodoStore};

pub(crate) const OWNER: UserId = UserId(7);

pub(crate) fn todo(id: i64, title: &str, completed: bool) -> Todo {
    Todo {
        id: TodoId(id),
        user_id: OWNER,
        title: title.to_string(),
        completed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreCall {
    List,
    Create { title: String, completed: bool },
    Update(Todo),
    Delete(TodoId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Failure {
    List,
    Create,
    Update(TodoId),
    Delete(TodoId),
}

/// Held by a test to observe and release a paused store request.
pub(crate) struct Gate {
    pub(crate) started: oneshot::Receiver<()>,
    pub(crate) release: oneshot::Sender<()>,
}

struct GateSlot {
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// In-memory store that records every call and can fail or pause chosen requests.
pub(crate) struct ScriptedStore {
    todos: Mutex<Vec<Todo>>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashSet<Failure>>,
    gates: Mutex<HashMap<TodoId, GateSlot>>,
}

impl ScriptedStore {
    pub(crate) fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|t| t.id.0).max().unwrap_or(0) + 1;
        Self {
            todos: Mutex::new(todos),
            next_id: Mutex::new(next_id),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashSet::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::with_todos(Vec::new())
    }

    pub(crate) async fn fail(&self, failure: Failure) {
        self.failures.lock().await.insert(failure);
    }

    /// Pauses the next request for `id`. Creates are keyed by the placeholder id.
    pub(crate) async fn gate(&self, id: TodoId) -> Gate {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.gates.lock().await.insert(
            id,
            GateSlot {
                started: started_tx,
                release: release_rx,
            },
        );
        Gate {
            started: started_rx,
            release: release_tx,
        }
    }

    /// Makes the next create hand out `id`, even if it is already taken.
    pub(crate) async fn assign_next_id(&self, id: i64) {
        *self.next_id.lock().await = id;
    }

    pub(crate) async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn remote_todos(&self) -> Vec<Todo> {
        self.todos.lock().await.clone()
    }

    async fn enter(
        &self,
        call: StoreCall,
        gate: Option<TodoId>,
        failure: Failure,
    ) -> Result<(), RemoteError> {
        self.calls.lock().await.push(call);
        let slot = match gate {
            Some(id) => self.gates.lock().await.remove(&id),
            None => None,
        };
        if let Some(slot) = slot {
            let _ = slot.started.send(());
            let _ = slot.release.await;
        }
        if self.failures.lock().await.contains(&failure) {
            return Err(RemoteError::status("TEST", "scripted", 500));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for ScriptedStore {
    fn owner(&self) -> UserId {
        OWNER
    }

    async fn list(&self) -> Result<Vec<Todo>, RemoteError> {
        self.enter(StoreCall::List, None, Failure::List).await?;
        Ok(self.todos.lock().await.clone())
    }

    async fn create(&self, title: &str, completed: bool) -> Result<Todo, RemoteError> {
        let call = StoreCall::Create {
            title: title.to_string(),
            completed,
        };
        self.enter(call, Some(TodoId::PLACEHOLDER), Failure::Create)
            .await?;
        let id = {
            let mut next_id = self.next_id.lock().await;
            let id = *next_id;
            *next_id += 1;
            id
        };
        let created = Todo {
            id: TodoId(id),
            user_id: OWNER,
            title: title.to_string(),
            completed,
        };
        self.todos.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, todo: &Todo) -> Result<Todo, RemoteError> {
        self.enter(
            StoreCall::Update(todo.clone()),
            Some(todo.id),
            Failure::Update(todo.id),
        )
        .await?;
        let mut todos = self.todos.lock().await;
        match todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => {
                *slot = todo.clone();
                Ok(todo.clone())
            }
            None => Err(RemoteError::status("PATCH", format!("todos/{}", todo.id), 404)),
        }
    }

    async fn delete(&self, id: TodoId) -> Result<(), RemoteError> {
        self.enter(StoreCall::Delete(id), Some(id), Failure::Delete(id))
            .await?;
        self.todos.lock().await.retain(|t| t.id != id);
        Ok(())
    }
}
