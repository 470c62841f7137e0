//! Plain-text rendering of a todo list snapshot.

use std::fmt::Write as _;

use client_core::TodoListSnapshot;
use shared::domain::{FilterMode, Todo};

pub fn render(snapshot: &TodoListSnapshot) -> String {
    let mut out = String::new();

    if snapshot.has_items() {
        for todo in snapshot.visible_items() {
            render_row(&mut out, snapshot, todo);
        }
    }
    if let Some(pending) = &snapshot.pending {
        let _ = writeln!(out, "[ ]    {} (saving)", pending.title);
    }

    if snapshot.has_items() {
        let _ = writeln!(out, "{}", footer(snapshot));
    } else if snapshot.pending.is_none() {
        let _ = writeln!(out, "Nothing to do.");
    }

    if snapshot.error.is_set() {
        let _ = writeln!(out, "error: {}", snapshot.error);
    }
    out
}

fn render_row(out: &mut String, snapshot: &TodoListSnapshot, todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    let busy = if snapshot.is_loading(todo.id) {
        " (saving)"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "[{mark}] {:>3}  {}{busy}",
        todo.id.0,
        snapshot.display_title(todo)
    );
}

fn footer(snapshot: &TodoListSnapshot) -> String {
    let filters: Vec<String> = FilterMode::ALL
        .iter()
        .map(|mode| {
            if *mode == snapshot.filter {
                format!("[{mode}]")
            } else {
                mode.to_string()
            }
        })
        .collect();

    let mut footer = format!(
        "{} items left | {}",
        snapshot.active_count(),
        filters.join(" ")
    );
    if snapshot.can_clear_completed() {
        let _ = write!(footer, " | {} completed", snapshot.completed_count());
    }
    footer
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use shared::{
        domain::{TodoId, UserId},
        error::ErrorKind,
    };

    use super::*;

    fn todo(id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId(id),
            user_id: UserId(1),
            title: title.into(),
            completed,
        }
    }

    fn snapshot(todos: Vec<Todo>, filter: FilterMode) -> TodoListSnapshot {
        TodoListSnapshot {
            todos,
            filter,
            loading: BTreeSet::new(),
            pending: None,
            error: ErrorKind::Default,
            editing: None,
        }
    }

    #[test]
    fn renders_filtered_rows_and_footer() {
        let snap = snapshot(
            vec![todo(1, "walk dog", false), todo(2, "buy milk", true)],
            FilterMode::Active,
        );
        let out = render(&snap);

        assert_eq!(
            out,
            "[ ]   1  walk dog\n1 items left | all [active] completed | 1 completed\n"
        );
    }

    #[test]
    fn empty_list_hides_footer_and_shows_error() {
        let mut snap = snapshot(Vec::new(), FilterMode::All);
        snap.error = ErrorKind::UnableToLoad;

        assert_eq!(render(&snap), "Nothing to do.\nerror: Unable to load todos\n");
    }

    #[test]
    fn loading_rows_are_marked() {
        let mut snap = snapshot(vec![todo(4, "call mom", true)], FilterMode::All);
        snap.loading.insert(TodoId(4));

        assert!(render(&snap).starts_with("[x]   4  call mom (saving)\n"));
    }
}
