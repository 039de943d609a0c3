//! Ordering engine.
//!
//! Maintains a contiguous, zero-based `order` sequence per (project, status)
//! column. Both operations take the full task list and return only the tasks
//! whose fields changed; the caller persists them in one `replace_many` step.
//!
//! Indices outside a column's bounds are clamped rather than rejected, to
//! tolerate stale indices from the display layer.

use crate::error::BoardError;
use crate::fields::Status;
use crate::task::Task;

/// The tasks of one column, sorted by `order` with an id tie-break.
///
/// Equal `order` values should not occur under correct use; the id fallback
/// keeps the sort deterministic if they ever do.
pub fn column<'a>(tasks: &'a [Task], status: Status) -> Vec<&'a Task> {
    let mut col: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
    col.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    col
}

/// Move the element at `from` to `to` within one status column, then
/// renumber the column 0..n-1. Returns the column's updated tasks.
pub fn reorder_within_column(
    tasks: &[Task],
    status: Status,
    from: usize,
    to: usize,
) -> Vec<Task> {
    let mut col: Vec<Task> = column(tasks, status).into_iter().cloned().collect();
    if col.is_empty() {
        return col;
    }
    let from = from.min(col.len() - 1);
    let to = to.min(col.len() - 1);
    let moved = col.remove(from);
    col.insert(to, moved);
    renumber(&mut col);
    col
}

/// Move a task into `dest` at `dest_index`, renumbering the destination
/// column 0..n-1. The source column keeps a gap in its sequence; display
/// always re-sorts by relative `order`, so the gap is harmless.
pub fn move_across_columns(
    tasks: &[Task],
    task_id: &str,
    dest: Status,
    dest_index: usize,
) -> Result<Vec<Task>, BoardError> {
    let mut moved = tasks
        .iter()
        .find(|t| t.id == task_id)
        .cloned()
        .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
    moved.status = dest;

    let mut col: Vec<Task> = column(tasks, dest)
        .into_iter()
        .filter(|t| t.id != task_id)
        .cloned()
        .collect();
    let dest_index = dest_index.min(col.len());
    col.insert(dest_index, moved);
    renumber(&mut col);
    Ok(col)
}

fn renumber(col: &mut [Task]) {
    for (pos, task) in col.iter_mut().enumerate() {
        task.order = pos as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;

    fn task(id: &str, status: Status, order: i64) -> Task {
        Task {
            id: id.into(),
            title: id.to_uppercase(),
            description: String::new(),
            status,
            priority: Priority::Low,
            assignee_id: None,
            due: None,
            subtasks: Vec::new(),
            dependencies: Vec::new(),
            order,
            comments: Vec::new(),
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    fn board() -> Vec<Task> {
        vec![
            task("a", Status::Todo, 0),
            task("b", Status::Todo, 1),
            task("c", Status::Todo, 2),
            task("d", Status::InProgress, 0),
        ]
    }

    /// Overlay updated tasks onto the original list, as replace_many would.
    fn apply(tasks: &mut [Task], updates: Vec<Task>) {
        for update in updates {
            let slot = tasks.iter_mut().find(|t| t.id == update.id).unwrap();
            *slot = update;
        }
    }

    fn ids_in_order(tasks: &[Task], status: Status) -> Vec<String> {
        column(tasks, status).iter().map(|t| t.id.clone()).collect()
    }

    fn assert_dense(tasks: &[Task], status: Status) {
        let orders: Vec<i64> = column(tasks, status).iter().map(|t| t.order).collect();
        let expected: Vec<i64> = (0..orders.len() as i64).collect();
        assert_eq!(orders, expected, "column {status:?} not densely packed");
    }

    #[test]
    fn test_reorder_first_to_last() {
        // [a, b, c] with index 0 -> 2 yields b=0, c=1, a=2.
        let mut tasks = board();
        let updated = reorder_within_column(&tasks, Status::Todo, 0, 2);
        apply(&mut tasks, updated);
        assert_eq!(ids_in_order(&tasks, Status::Todo), vec!["b", "c", "a"]);
        assert_dense(&tasks, Status::Todo);
    }

    #[test]
    fn test_reorder_same_index_is_identity() {
        let mut tasks = board();
        let before = ids_in_order(&tasks, Status::Todo);
        let updated = reorder_within_column(&tasks, Status::Todo, 1, 1);
        apply(&mut tasks, updated);
        assert_eq!(ids_in_order(&tasks, Status::Todo), before);
        assert_dense(&tasks, Status::Todo);
    }

    #[test]
    fn test_reorder_clamps_out_of_range_indices() {
        let mut tasks = board();
        let updated = reorder_within_column(&tasks, Status::Todo, 99, 0);
        apply(&mut tasks, updated);
        // Stale from-index clamps to the last card.
        assert_eq!(ids_in_order(&tasks, Status::Todo), vec!["c", "a", "b"]);
        assert_dense(&tasks, Status::Todo);
    }

    #[test]
    fn test_reorder_empty_column_is_a_no_op() {
        let tasks = board();
        assert!(reorder_within_column(&tasks, Status::Review, 0, 0).is_empty());
    }

    #[test]
    fn test_reorder_untouched_columns_unchanged() {
        let mut tasks = board();
        let updated = reorder_within_column(&tasks, Status::Todo, 2, 0);
        apply(&mut tasks, updated);
        assert_eq!(ids_in_order(&tasks, Status::InProgress), vec!["d"]);
        assert_eq!(tasks.iter().find(|t| t.id == "d").unwrap().order, 0);
    }

    #[test]
    fn test_move_across_renumbers_destination_only() {
        let mut tasks = board();
        let updated = move_across_columns(&tasks, "b", Status::InProgress, 0).unwrap();
        apply(&mut tasks, updated);
        assert_eq!(ids_in_order(&tasks, Status::InProgress), vec!["b", "d"]);
        assert_dense(&tasks, Status::InProgress);
        // Source column keeps its gap (a=0, c=2) but relative order holds.
        assert_eq!(ids_in_order(&tasks, Status::Todo), vec!["a", "c"]);
    }

    #[test]
    fn test_move_across_clamps_destination_index() {
        let mut tasks = board();
        let updated = move_across_columns(&tasks, "a", Status::InProgress, 42).unwrap();
        apply(&mut tasks, updated);
        assert_eq!(ids_in_order(&tasks, Status::InProgress), vec!["d", "a"]);
        assert_dense(&tasks, Status::InProgress);
    }

    #[test]
    fn test_move_unknown_task() {
        let tasks = board();
        assert_eq!(
            move_across_columns(&tasks, "zz", Status::Done, 0).unwrap_err(),
            BoardError::TaskNotFound("zz".into())
        );
    }

    #[test]
    fn test_move_round_trip_restores_both_columns() {
        let mut tasks = board();
        let original_todo = ids_in_order(&tasks, Status::Todo);
        let original_inprog = ids_in_order(&tasks, Status::InProgress);

        let updated = move_across_columns(&tasks, "b", Status::InProgress, 1).unwrap();
        apply(&mut tasks, updated);
        let updated = move_across_columns(&tasks, "b", Status::Todo, 1).unwrap();
        apply(&mut tasks, updated);

        assert_eq!(ids_in_order(&tasks, Status::Todo), original_todo);
        assert_eq!(ids_in_order(&tasks, Status::InProgress), original_inprog);
        assert_dense(&tasks, Status::Todo);
    }

    #[test]
    fn test_equal_orders_fall_back_to_id_order() {
        let tasks = vec![
            task("x", Status::Todo, 0),
            task("m", Status::Todo, 0),
            task("a", Status::Todo, 0),
        ];
        assert_eq!(ids_in_order(&tasks, Status::Todo), vec!["a", "m", "x"]);
    }

    #[test]
    fn test_order_stays_dense_across_operation_sequences() {
        let mut tasks = board();
        let ops: [(usize, usize); 4] = [(0, 2), (2, 0), (1, 2), (2, 2)];
        for (from, to) in ops {
            let updated = reorder_within_column(&tasks, Status::Todo, from, to);
            apply(&mut tasks, updated);
            assert_dense(&tasks, Status::Todo);
        }
        let updated = move_across_columns(&tasks, "c", Status::Review, 0).unwrap();
        apply(&mut tasks, updated);
        assert_dense(&tasks, Status::Review);
        let updated = reorder_within_column(&tasks, Status::Todo, 0, 1);
        apply(&mut tasks, updated);
        assert_dense(&tasks, Status::Todo);
    }
}
