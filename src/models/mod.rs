pub mod board;
pub mod task;
pub mod user;

pub use board::{Board, BoardInput};
pub use task::{BoardWithTasks, Task, TaskInput, TaskPriority, TaskStatus, TaskUpdate, TaskWithBoard};
pub use user::{NewUser, Role, User, UserResponse};

/// Builds an `ILIKE` pattern matching any text that contains `needle` literally.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
