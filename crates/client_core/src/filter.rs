use shared::domain::{FilterMode, Todo};

pub fn visible_items(todos: &[Todo], mode: FilterMode) -> Vec<&Todo> {
    todos.iter().filter(|todo| mode.matches(todo)).collect()
}

pub fn active_count(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

pub fn completed_count(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| todo.completed).count()
}

/// False for an empty list.
pub fn all_completed(todos: &[Todo]) -> bool {
    !todos.is_empty() && todos.iter().all(|todo| todo.completed)
}
