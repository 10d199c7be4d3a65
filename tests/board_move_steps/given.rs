//! Given steps for board move BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use kanban_board_cache::board::ports::TaskMoveError;
use rstest_bdd_macros::given;

#[given(r#"a cached board for project {project:u64} with tasks in "{column}""#)]
fn cached_board_with_tasks(
    world: &mut BoardWorld,
    project: u64,
    column: String,
) -> Result<(), eyre::Report> {
    let seed = format!(
        r#"{{"projectId": {project}, "projectName": "Website relaunch", "columns": [
            {{"id": 1, "name": "{column}", "position": 0, "tasks": [
                {{"id": 11, "columnId": 1, "title": "Draft copy", "position": 0}},
                {{"id": 12, "columnId": 1, "title": "Pick palette", "position": 1}}
            ]}},
            {{"id": 2, "name": "Doing", "position": 1, "tasks": []}},
            {{"id": 3, "name": "Done", "position": 2, "tasks": []}}
        ]}}"#
    );
    let project_id = world
        .backend
        .seed_from_json(&seed)
        .wrap_err("seed board into backend")?;
    let board = run_async(world.cache.get_snapshot(project_id)).wrap_err("load board")?;

    world.project_id = Some(project_id);
    world.board_before_move = Some(board);
    Ok(())
}

#[given("the server rejects the next move")]
fn server_rejects_next_move(world: &mut BoardWorld) {
    world
        .backend
        .fail_next_move(TaskMoveError::network(std::io::Error::other(
            "connection reset",
        )));
}
