//! Then steps for board move BDD scenarios.

use super::world::BoardWorld;
use kanban_board_cache::board::{
    domain::{Task, TaskId},
    services::BoardCacheError,
};
use rstest_bdd_macros::then;

fn last_result(world: &BoardWorld) -> Result<&Result<Task, BoardCacheError>, eyre::Report> {
    world
        .last_move_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result in scenario world"))
}

#[then("the move succeeds")]
fn move_succeeds(world: &BoardWorld) -> Result<(), eyre::Report> {
    last_result(world)?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected move failure: {err}"))?;
    Ok(())
}

#[then("the move is rejected")]
fn move_is_rejected(world: &BoardWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(BoardCacheError::MoveRejected { .. })) {
        return Err(eyre::eyre!("expected a rejected move, got {result:?}"));
    }
    Ok(())
}

#[then("the move is reported as a no-op")]
fn move_is_no_op(world: &BoardWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(BoardCacheError::NoOp { .. })) {
        return Err(eyre::eyre!("expected a no-op move, got {result:?}"));
    }
    Ok(())
}

#[then("the move is refused as stale")]
fn move_is_stale(world: &BoardWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(BoardCacheError::StaleReference(_))) {
        return Err(eyre::eyre!("expected a stale reference, got {result:?}"));
    }
    Ok(())
}

#[then(r#"task {task:u64} is shown in "{column}""#)]
fn task_is_shown_in(world: &BoardWorld, task: u64, column: String) -> Result<(), eyre::Report> {
    let expected = world.column_named(&column)?;
    let board = world
        .cache
        .cached(world.project()?)
        .map_err(|err| eyre::eyre!("cache state unavailable: {err}"))?
        .ok_or_else(|| eyre::eyre!("board is no longer cached"))?;
    let location = board
        .locate(TaskId::new(task))
        .ok_or_else(|| eyre::eyre!("task {task} missing from cached board"))?;
    if location.column_id != expected {
        return Err(eyre::eyre!(
            "expected task {task} in {column:?}, found column {}",
            location.column_id
        ));
    }
    Ok(())
}

#[then("the cached board matches the board before the move")]
fn board_matches_previous(world: &BoardWorld) -> Result<(), eyre::Report> {
    let before = world
        .board_before_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing initial board in scenario world"))?;
    let current = world
        .cache
        .cached(world.project()?)
        .map_err(|err| eyre::eyre!("cache state unavailable: {err}"))?
        .ok_or_else(|| eyre::eyre!("board is no longer cached"))?;
    if current != *before {
        return Err(eyre::eyre!("cached board differs from the board before the move"));
    }
    Ok(())
}

#[then("the server recorded {count:usize} move")]
fn server_recorded_move(world: &BoardWorld, count: usize) -> Result<(), eyre::Report> {
    server_recorded(world, count)
}

#[then("the server recorded {count:usize} moves")]
fn server_recorded_moves(world: &BoardWorld, count: usize) -> Result<(), eyre::Report> {
    server_recorded(world, count)
}

fn server_recorded(world: &BoardWorld, count: usize) -> Result<(), eyre::Report> {
    let calls = world.backend.move_calls();
    if calls != count {
        return Err(eyre::eyre!("expected {count} server moves, found {calls}"));
    }
    Ok(())
}
