//! When steps for board move BDD scenarios.

use super::world::{BoardWorld, run_async};
use kanban_board_cache::board::domain::{MoveIntent, TaskId};
use rstest_bdd_macros::when;

#[when(r#"task {task:u64} is moved from "{source}" to "{target}""#)]
fn move_task_between_columns(
    world: &mut BoardWorld,
    task: u64,
    source: String,
    target: String,
) -> Result<(), eyre::Report> {
    let project_id = world.project()?;
    let intent = MoveIntent::new(
        TaskId::new(task),
        world.column_named(&source)?,
        world.column_named(&target)?,
    );
    world.last_move_result = Some(run_async(world.cache.move_task(project_id, intent)));
    Ok(())
}
