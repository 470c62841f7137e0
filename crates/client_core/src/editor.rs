//! Inline title editing for a single todo.

use shared::domain::{Todo, TodoId};
use tracing::debug;

use crate::{
    controller::{TodoEvent, TodoListController},
    error::ControllerError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TodoId,
    pub draft: String,
    /// Set once the draft has been sent as a rename; cleared by further typing or a failed save.
    pub submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Draft matched the current title; edit mode closed without a request.
    Unchanged,
    Renamed(Todo),
    Removed,
    /// The todo already has a request in flight; nothing was sent.
    Busy,
}

impl TodoListController {
    pub fn editing(&self) -> Option<EditSession> {
        self.state().editing.clone()
    }

    /// Opens edit mode for `id` with the draft set to its current title.
    pub fn begin_edit(&self, id: TodoId) -> Result<(), ControllerError> {
        let session = {
            let mut state = self.state();
            let todo = state.find(id).ok_or(ControllerError::UnknownTodo(id))?;
            let session = EditSession {
                id,
                draft: todo.title.clone(),
                submitted: false,
            };
            state.editing = Some(session.clone());
            session
        };
        self.emit(TodoEvent::EditChanged(Some(session)));
        Ok(())
    }

    pub fn set_draft(&self, draft: &str) -> Result<(), ControllerError> {
        let session = {
            let mut state = self.state();
            let session = state.editing.as_mut().ok_or(ControllerError::NotEditing)?;
            session.draft = draft.to_string();
            session.submitted = false;
            session.clone()
        };
        self.emit(TodoEvent::EditChanged(Some(session)));
        Ok(())
    }

    /// Leaves edit mode without sending anything. The next edit starts from the stored title.
    pub fn cancel_edit(&self) {
        let was_editing = self.state().editing.take().is_some();
        if was_editing {
            self.emit(TodoEvent::EditChanged(None));
        }
    }

    /// Applies the draft. Edit mode stays open when the request fails so the user can retry.
    pub async fn submit_edit(&self) -> Result<EditOutcome, ControllerError> {
        let (session, current, busy) = {
            let state = self.state();
            let session = state.editing.clone().ok_or(ControllerError::NotEditing)?;
            let current = state.find(session.id).cloned();
            let busy = state.is_loading(session.id);
            (session, current, busy)
        };

        let Some(current) = current else {
            self.close_edit(session.id);
            return Err(ControllerError::UnknownTodo(session.id));
        };

        let title = session.draft.trim().to_string();
        if title == current.title {
            self.close_edit(session.id);
            return Ok(EditOutcome::Unchanged);
        }
        if busy {
            debug!(id = %session.id, "ignoring edit submit while a request is in flight");
            return Ok(EditOutcome::Busy);
        }

        if title.is_empty() {
            self.delete_todo(session.id).await?;
            self.close_edit(session.id);
            return Ok(EditOutcome::Removed);
        }

        self.store_normalized_draft(session.id, &title);
        match self.update_item(current.with_title(title)).await {
            Ok(renamed) => {
                self.close_edit(session.id);
                Ok(EditOutcome::Renamed(renamed))
            }
            Err(err) => {
                self.reopen_draft(session.id);
                Err(err)
            }
        }
    }

    fn store_normalized_draft(&self, id: TodoId, title: &str) {
        let mut state = self.state();
        if let Some(session) = state.editing.as_mut().filter(|s| s.id == id) {
            session.draft = title.to_string();
            session.submitted = true;
        }
    }

    fn reopen_draft(&self, id: TodoId) {
        let mut state = self.state();
        if let Some(session) = state.editing.as_mut().filter(|s| s.id == id) {
            session.submitted = false;
        }
    }

    /// Closes edit mode only if it still belongs to `id`.
    fn close_edit(&self, id: TodoId) {
        let closed = {
            let mut state = self.state();
            if state.editing.as_ref().is_some_and(|s| s.id == id) {
                state.editing = None;
                true
            } else {
                false
            }
        };
        if closed {
            self.emit(TodoEvent::EditChanged(None));
        }
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
