//! Client-side todo list kept in sync with a remote todo collection.
//!
//! [`TodoListController`] owns the list, the active filter, the per-todo loading set, the
//! pending-creation placeholder and the inline edit session. Every mutation goes through a
//! [`TodoStore`] round trip first and is applied to the list only when the store accepts it.

pub mod controller;
pub mod editor;
pub mod error;
pub mod filter;
pub mod store;

pub use controller::{BatchOutcome, TodoEvent, TodoListController, TodoListSnapshot};
pub use editor::{EditOutcome, EditSession};
pub use error::{ControllerError, RemoteError};
pub use filter::visible_items;
pub use store::{HttpTodoStore, StoreConfig, TodoStore, DEFAULT_REQUEST_TIMEOUT};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
