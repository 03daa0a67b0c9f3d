use crate::grid::GridPos;

pub const GRID_WIDTH: i32 = 20;
pub const GRID_HEIGHT: i32 = 15;
pub const CELL_SIZE: f32 = 32.0;

pub const SCREEN_WIDTH: f32 = GRID_WIDTH as f32 * CELL_SIZE;

pub const SPAWN: GridPos = GridPos { x: 1, y: 1 };

pub const WALL_CHANCE: f32 = 0.12;

pub const ENEMY_TARGET: usize = 6;
pub const ENEMY_ATTEMPTS: usize = 100;
pub const ENEMY_MIN_SPAWN_DISTANCE: f32 = 3.0;
pub const ENEMY_MIN_COORD: i32 = 4;
pub const ENEMY_INTERVAL_MIN: f32 = 1.5;
pub const ENEMY_INTERVAL_MAX: f32 = 3.5;
pub const TERRITORY_RADIUS: f32 = 4.0;

pub const TREASURE_TARGET: usize = 8;
pub const TREASURE_ATTEMPTS: usize = 200;
pub const TREASURE_MIN_SPAWN_DISTANCE: f32 = 1.0;
pub const TREASURE_POINTS: i32 = 10;

pub const ENTITY_SPEED: f32 = 120.0;
pub const SNAP_DISTANCE: f32 = 2.0;
pub const PLAYER_STEP_INTERVAL: f32 = 0.15;
pub const STARTING_LIFE: i32 = 3;

pub const IDLE_FRAME_SECONDS: f32 = 0.8;
pub const IDLE_FRAME_COUNT: usize = 3;
pub const MOVE_FRAME_SECONDS: f32 = 0.3;
pub const MOVE_FRAME_COUNT: usize = 4;

pub const FIRST_PHASE: u32 = 1;
pub const FINAL_PHASE: u32 = 2;

pub const TICK_RATE: u32 = 60;
pub const TICK_SECONDS: f32 = 1.0 / TICK_RATE as f32;

/// Multiplier applied to a freshly spawned enemy's re-decision interval.
pub fn get_interval_scale(phase: u32) -> f32 {
    if phase <= FIRST_PHASE {
        return 1.0;
    }
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_phases_halve_the_interval() {
        assert_eq!(get_interval_scale(1), 1.0);
        assert_eq!(get_interval_scale(2), 0.5);
        assert_eq!(get_interval_scale(5), 0.5);
    }
}
