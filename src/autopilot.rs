//! Scripted player for headless runs: heads for the nearest treasure and
//! steers around enemies when it can.

use std::collections::BTreeSet;

use crate::engine::GameSession;
use crate::grid::GridPos;
use crate::types::{Direction, SessionState};
use crate::world::first_step_toward;

pub fn choose_direction(session: &GameSession) -> Option<Direction> {
    let level = session.level();
    if level.treasures.is_empty() {
        return None;
    }
    let from = session.player_pos();
    let enemies: BTreeSet<GridPos> = session.enemy_positions().into_iter().collect();
    let danger: BTreeSet<GridPos> = enemies
        .iter()
        .flat_map(|pos| pos.neighbors().into_iter().chain(std::iter::once(*pos)))
        .collect();

    first_step_toward(&level.grid, from, &level.treasures, |pos| {
        level.is_wall(pos) || danger.contains(&pos)
    })
    .or_else(|| {
        first_step_toward(&level.grid, from, &level.treasures, |pos| {
            level.is_wall(pos) || enemies.contains(&pos)
        })
    })
}

/// Holds exactly the chosen direction, releasing the rest.
pub fn drive(session: &mut GameSession) -> Option<Direction> {
    if session.state() != SessionState::Playing {
        return None;
    }
    let choice = choose_direction(session);
    for dir in Direction::ALL {
        session.set_direction_held(dir, Some(dir) == choice);
    }
    choice
}
