//! Authoritative in-memory todo list kept in step with a remote [`TodoStore`].

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::future::join_all;
use shared::{
    domain::{FilterMode, Todo, TodoId},
    error::ErrorKind,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    editor::EditSession,
    error::ControllerError,
    filter,
    store::TodoStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoEvent {
    Loaded { count: usize },
    PendingChanged(Option<Todo>),
    Added(Todo),
    Updated(Todo),
    Removed(TodoId),
    LoadingChanged { id: TodoId, loading: bool },
    FilterChanged(FilterMode),
    EditChanged(Option<EditSession>),
    ErrorChanged(ErrorKind),
}

/// Result of a fan-out over several todos where each request settles on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub(crate) struct ControllerState {
    pub(crate) todos: Vec<Todo>,
    pub(crate) filter: FilterMode,
    /// In-flight request count per id; an id is loading while its count is non-zero.
    pub(crate) loading: HashMap<TodoId, usize>,
    pub(crate) pending: Option<Todo>,
    pub(crate) error: ErrorKind,
    pub(crate) editing: Option<EditSession>,
}

impl ControllerState {
    pub(crate) fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub(crate) fn is_loading(&self, id: TodoId) -> bool {
        self.loading.contains_key(&id)
    }
}

/// Owned copy of the controller state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListSnapshot {
    pub todos: Vec<Todo>,
    pub filter: FilterMode,
    pub loading: BTreeSet<TodoId>,
    pub pending: Option<Todo>,
    pub error: ErrorKind,
    pub editing: Option<EditSession>,
}

impl TodoListSnapshot {
    pub fn visible_items(&self) -> Vec<&Todo> {
        filter::visible_items(&self.todos, self.filter)
    }

    pub fn active_count(&self) -> usize {
        filter::active_count(&self.todos)
    }

    pub fn completed_count(&self) -> usize {
        filter::completed_count(&self.todos)
    }

    pub fn all_completed(&self) -> bool {
        filter::all_completed(&self.todos)
    }

    pub fn has_items(&self) -> bool {
        !self.todos.is_empty()
    }

    pub fn can_clear_completed(&self) -> bool {
        self.completed_count() > 0
    }

    pub fn is_loading(&self, id: TodoId) -> bool {
        self.loading.contains(&id)
    }

    pub fn is_editing(&self, id: TodoId) -> bool {
        self.editing.as_ref().is_some_and(|session| session.id == id)
    }

    /// Title to render for `todo`: the submitted draft while its rename is in flight.
    pub fn display_title<'a>(&'a self, todo: &'a Todo) -> &'a str {
        match &self.editing {
            Some(session)
                if session.id == todo.id && session.submitted && self.is_loading(todo.id) =>
            {
                &session.draft
            }
            _ => &todo.title,
        }
    }
}

pub struct TodoListController {
    store: Arc<dyn TodoStore>,
    state: Mutex<ControllerState>,
    events: broadcast::Sender<TodoEvent>,
}

impl TodoListController {
    pub fn new(store: Arc<dyn TodoStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            store,
            state: Mutex::new(ControllerState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TodoEvent> {
        self.events.subscribe()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, event: TodoEvent) {
        let _ = self.events.send(event);
    }

    pub fn snapshot(&self) -> TodoListSnapshot {
        let state = self.state();
        TodoListSnapshot {
            todos: state.todos.clone(),
            filter: state.filter,
            loading: state.loading.keys().copied().collect(),
            pending: state.pending.clone(),
            error: state.error,
            editing: state.editing.clone(),
        }
    }

    pub fn error(&self) -> ErrorKind {
        self.state().error
    }

    pub fn dismiss_error(&self) {
        self.set_error(ErrorKind::Default);
    }

    pub(crate) fn set_error(&self, kind: ErrorKind) {
        self.state().error = kind;
        self.emit(TodoEvent::ErrorChanged(kind));
    }

    pub fn filter(&self) -> FilterMode {
        self.state().filter
    }

    pub fn set_filter(&self, mode: FilterMode) {
        self.state().filter = mode;
        self.emit(TodoEvent::FilterChanged(mode));
    }

    pub fn is_loading(&self, id: TodoId) -> bool {
        self.state().is_loading(id)
    }

    /// Replaces the list with the store's contents. On failure the list is left as it was.
    pub async fn load(&self) -> Result<usize, ControllerError> {
        match self.store.list().await {
            Ok(todos) => {
                let todos = dedup_by_id(todos);
                let count = todos.len();
                self.state().todos = todos;
                info!(count, owner = %self.store.owner(), "loaded todos");
                self.emit(TodoEvent::Loaded { count });
                Ok(count)
            }
            Err(source) => {
                warn!(error = %source, "failed to load todos");
                self.set_error(ErrorKind::UnableToLoad);
                Err(ControllerError::remote(ErrorKind::UnableToLoad, source))
            }
        }
    }

    pub async fn add_item(&self, title: &str) -> Result<Todo, ControllerError> {
        let title = title.trim();
        if title.is_empty() {
            self.set_error(ErrorKind::EmptyTitle);
            return Err(ControllerError::EmptyTitle);
        }

        let _pending = self.begin_creation(title)?;
        match self.store.create(title, false).await {
            Ok(todo) => {
                {
                    let mut state = self.state();
                    match state.todos.iter().position(|t| t.id == todo.id) {
                        Some(index) => {
                            warn!(id = %todo.id, "store returned an id already in the list");
                            state.todos[index] = todo.clone();
                        }
                        None => state.todos.push(todo.clone()),
                    }
                }
                info!(id = %todo.id, "added todo");
                self.emit(TodoEvent::Added(todo.clone()));
                Ok(todo)
            }
            Err(source) => {
                warn!(error = %source, %title, "failed to add todo");
                self.set_error(ErrorKind::AddFailed);
                Err(ControllerError::remote(ErrorKind::AddFailed, source))
            }
        }
    }

    /// Deletes `id`. Failures are recorded in the error slot and not returned.
    pub async fn remove_item(&self, id: TodoId) -> bool {
        self.delete_todo(id).await.is_ok()
    }

    pub(crate) async fn delete_todo(&self, id: TodoId) -> Result<(), ControllerError> {
        let _loading = self.begin_loading(id);
        match self.store.delete(id).await {
            Ok(()) => {
                self.state().todos.retain(|todo| todo.id != id);
                info!(%id, "removed todo");
                self.emit(TodoEvent::Removed(id));
                Ok(())
            }
            Err(source) => {
                warn!(%id, error = %source, "failed to delete todo");
                self.set_error(ErrorKind::DeleteFailed);
                Err(ControllerError::remote(ErrorKind::DeleteFailed, source))
            }
        }
    }

    pub async fn update_item(&self, todo: Todo) -> Result<Todo, ControllerError> {
        let _loading = self.begin_loading(todo.id);
        match self.store.update(&todo).await {
            Ok(updated) => {
                let replaced = {
                    let mut state = self.state();
                    match state.todos.iter().position(|t| t.id == todo.id) {
                        Some(index) => {
                            state.todos[index] = updated.clone();
                            true
                        }
                        None => false,
                    }
                };
                if replaced {
                    debug!(id = %todo.id, "updated todo");
                    self.emit(TodoEvent::Updated(updated.clone()));
                } else {
                    debug!(id = %todo.id, "updated todo is no longer in the list");
                }
                Ok(updated)
            }
            Err(source) => {
                warn!(id = %todo.id, error = %source, "failed to update todo");
                self.set_error(ErrorKind::UpdateFailed);
                Err(ControllerError::remote(ErrorKind::UpdateFailed, source))
            }
        }
    }

    pub async fn toggle_item(&self, id: TodoId) -> Result<Todo, ControllerError> {
        let todo = self
            .state()
            .find(id)
            .cloned()
            .ok_or(ControllerError::UnknownTodo(id))?;
        self.update_item(todo.with_completed(!todo.completed)).await
    }

    /// Removes every completed todo; each removal settles independently.
    pub async fn clear_completed(&self) -> BatchOutcome {
        let ids: Vec<TodoId> = self
            .state()
            .todos
            .iter()
            .filter(|todo| todo.completed)
            .map(|todo| todo.id)
            .collect();

        let results = join_all(ids.into_iter().map(|id| self.remove_item(id))).await;
        let succeeded = results.iter().filter(|removed| **removed).count();
        BatchOutcome {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// Completes every active todo, or reopens all of them when none is active.
    /// Updates are not atomic: some may land while others fail.
    pub async fn toggle_all(&self) -> BatchOutcome {
        let targets: Vec<Todo> = {
            let state = self.state();
            let any_active = state.todos.iter().any(|todo| !todo.completed);
            state
                .todos
                .iter()
                .filter(|todo| !any_active || !todo.completed)
                .map(|todo| todo.with_completed(any_active))
                .collect()
        };

        let results = join_all(targets.into_iter().map(|todo| self.update_item(todo))).await;
        let succeeded = results.iter().filter(|result| result.is_ok()).count();
        BatchOutcome {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    fn begin_creation(&self, title: &str) -> Result<PendingGuard<'_>, ControllerError> {
        let placeholder = Todo::placeholder(self.store.owner(), title);
        {
            let mut state = self.state();
            if state.pending.is_some() {
                return Err(ControllerError::CreationPending);
            }
            state.pending = Some(placeholder.clone());
        }
        self.emit(TodoEvent::PendingChanged(Some(placeholder)));
        Ok(PendingGuard { controller: self })
    }

    fn begin_loading(&self, id: TodoId) -> LoadingGuard<'_> {
        let first = {
            let mut state = self.state();
            let count = state.loading.entry(id).or_insert(0);
            *count += 1;
            *count == 1
        };
        if first {
            self.emit(TodoEvent::LoadingChanged { id, loading: true });
        }
        LoadingGuard {
            controller: self,
            id,
        }
    }
}

fn dedup_by_id(todos: Vec<Todo>) -> Vec<Todo> {
    let mut seen = HashSet::with_capacity(todos.len());
    todos
        .into_iter()
        .filter(|todo| {
            let fresh = seen.insert(todo.id);
            if !fresh {
                warn!(id = %todo.id, "dropping duplicate todo from store listing");
            }
            fresh
        })
        .collect()
}

/// Clears the creation placeholder when the create request settles or is dropped.
struct PendingGuard<'a> {
    controller: &'a TodoListController,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.controller.state().pending = None;
        self.controller.emit(TodoEvent::PendingChanged(None));
    }
}

/// Releases one in-flight slot for `id` when its request settles or is dropped.
struct LoadingGuard<'a> {
    controller: &'a TodoListController,
    id: TodoId,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let settled = {
            let mut state = self.controller.state();
            let remaining = state.loading.get_mut(&self.id).map(|count| {
                *count = count.saturating_sub(1);
                *count
            });
            if remaining == Some(0) {
                state.loading.remove(&self.id);
            }
            remaining == Some(0)
        };
        if settled {
            self.controller
                .emit(TodoEvent::LoadingChanged { id: self.id, loading: false });
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
