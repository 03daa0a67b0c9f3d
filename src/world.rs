use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::constants::{
    get_interval_scale, ENEMY_ATTEMPTS, ENEMY_INTERVAL_MAX, ENEMY_INTERVAL_MIN,
    ENEMY_MIN_COORD, ENEMY_MIN_SPAWN_DISTANCE, ENEMY_TARGET, GRID_HEIGHT, GRID_WIDTH, SPAWN,
    TREASURE_ATTEMPTS, TREASURE_MIN_SPAWN_DISTANCE, TREASURE_TARGET, WALL_CHANCE,
};
use crate::grid::{GridPos, GridSpace};
use crate::rng::Rng;
use crate::types::{Direction, EnemyKind};

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub wall_chance: f32,
    pub enemy_target: usize,
    pub enemy_attempts: usize,
    pub treasure_target: usize,
    pub treasure_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            wall_chance: WALL_CHANCE,
            enemy_target: ENEMY_TARGET,
            enemy_attempts: ENEMY_ATTEMPTS,
            treasure_target: TREASURE_TARGET,
            treasure_attempts: TREASURE_ATTEMPTS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnemySpawn {
    pub pos: GridPos,
    pub kind: EnemyKind,
    pub interval: f32,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub grid: GridSpace,
    pub phase: u32,
    pub spawn: GridPos,
    pub walls: BTreeSet<GridPos>,
    pub treasures: BTreeSet<GridPos>,
    pub enemies: Vec<EnemySpawn>,
}

impl Level {
    pub fn is_wall(&self, pos: GridPos) -> bool {
        self.walls.contains(&pos)
    }

    pub fn is_blocked_by_walls(&self, pos: GridPos) -> bool {
        !self.grid.in_bounds(pos) || self.is_wall(pos)
    }
}

pub fn generate_level(phase: u32, config: &GeneratorConfig, rng: &mut Rng) -> Level {
    let grid = GridSpace::new(config.width, config.height);
    let walls = place_walls(&grid, config.wall_chance, rng);
    let enemies = place_enemies(&grid, &walls, phase, config, rng);
    let treasures = place_treasures(&grid, &walls, config, rng);

    Level {
        grid,
        phase,
        spawn: SPAWN,
        walls,
        treasures,
        enemies,
    }
}

fn place_walls(grid: &GridSpace, wall_chance: f32, rng: &mut Rng) -> BTreeSet<GridPos> {
    let mut walls = BTreeSet::new();
    for x in 0..grid.width {
        for y in 0..grid.height {
            let pos = GridPos { x, y };
            if grid.is_border(pos) || rng.bool(wall_chance) {
                walls.insert(pos);
            }
        }
    }

    // The spawn pocket overrides random walls.
    for dx in -1..=1 {
        for dy in -1..=1 {
            walls.remove(&GridPos {
                x: SPAWN.x + dx,
                y: SPAWN.y + dy,
            });
        }
    }
    restore_border(grid, &mut walls);
    walls
}

// The spawn pocket touches the border at (0, *) and (*, 0); the border wins.
fn restore_border(grid: &GridSpace, walls: &mut BTreeSet<GridPos>) {
    for pos in grid.cells() {
        if grid.is_border(pos) {
            walls.insert(pos);
        }
    }
}

fn place_enemies(
    grid: &GridSpace,
    walls: &BTreeSet<GridPos>,
    phase: u32,
    config: &GeneratorConfig,
    rng: &mut Rng,
) -> Vec<EnemySpawn> {
    let scale = get_interval_scale(phase);
    let mut enemies: Vec<EnemySpawn> = Vec::new();
    let mut attempts = 0;
    while enemies.len() < config.enemy_target && attempts < config.enemy_attempts {
        attempts += 1;
        let pos = GridPos {
            x: rng.int(ENEMY_MIN_COORD, grid.width - 2),
            y: rng.int(ENEMY_MIN_COORD, grid.height - 2),
        };
        if !grid.in_bounds(pos) || walls.contains(&pos) {
            continue;
        }
        if pos.distance(SPAWN) <= ENEMY_MIN_SPAWN_DISTANCE {
            continue;
        }
        if enemies.iter().any(|enemy| enemy.pos == pos) {
            continue;
        }
        let kind = if rng.bool(0.5) {
            EnemyKind::Goblin
        } else {
            EnemyKind::Orc
        };
        let interval = rng.uniform(ENEMY_INTERVAL_MIN, ENEMY_INTERVAL_MAX) * scale;
        enemies.push(EnemySpawn {
            pos,
            kind,
            interval,
        });
    }
    enemies
}

fn place_treasures(
    grid: &GridSpace,
    walls: &BTreeSet<GridPos>,
    config: &GeneratorConfig,
    rng: &mut Rng,
) -> BTreeSet<GridPos> {
    let mut treasures = BTreeSet::new();
    let mut attempts = 0;
    while treasures.len() < config.treasure_target && attempts < config.treasure_attempts {
        attempts += 1;
        let pos = GridPos {
            x: rng.int(1, grid.width - 2),
            y: rng.int(1, grid.height - 2),
        };
        if walls.contains(&pos) || treasures.contains(&pos) {
            continue;
        }
        if pos.distance(SPAWN) <= TREASURE_MIN_SPAWN_DISTANCE {
            continue;
        }
        if !reachable(grid, SPAWN, pos, walls) {
            continue;
        }
        treasures.insert(pos);
    }
    treasures
}

/// 4-connected breadth-first search over cells not in `blocked`.
pub fn reachable(grid: &GridSpace, from: GridPos, to: GridPos, blocked: &BTreeSet<GridPos>) -> bool {
    if !grid.in_bounds(from) || !grid.in_bounds(to) || blocked.contains(&to) {
        return false;
    }
    if from == to {
        return true;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(from);
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        for next in pos.neighbors() {
            if !grid.in_bounds(next) || blocked.contains(&next) {
                continue;
            }
            if next == to {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

pub fn reachable_cells(
    grid: &GridSpace,
    from: GridPos,
    blocked: &BTreeSet<GridPos>,
) -> HashSet<GridPos> {
    let mut out = HashSet::new();
    if !grid.in_bounds(from) || blocked.contains(&from) {
        return out;
    }
    let mut queue = VecDeque::new();
    out.insert(from);
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        for next in pos.neighbors() {
            if !grid.in_bounds(next) || blocked.contains(&next) {
                continue;
            }
            if out.insert(next) {
                queue.push_back(next);
            }
        }
    }
    out
}

/// First direction of a shortest path from `from` to the nearest goal.
pub fn first_step_toward<F>(
    grid: &GridSpace,
    from: GridPos,
    goals: &BTreeSet<GridPos>,
    mut is_blocked: F,
) -> Option<Direction>
where
    F: FnMut(GridPos) -> bool,
{
    if goals.is_empty() || !grid.in_bounds(from) || goals.contains(&from) {
        return None;
    }

    let mut first_dir: HashMap<GridPos, Direction> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        for dir in Direction::ALL {
            let next = pos.offset(dir);
            if next == from || first_dir.contains_key(&next) {
                continue;
            }
            if !grid.in_bounds(next) || is_blocked(next) {
                continue;
            }
            let origin = if pos == from {
                dir
            } else {
                match first_dir.get(&pos) {
                    Some(origin) => *origin,
                    None => continue,
                }
            };
            if goals.contains(&next) {
                return Some(origin);
            }
            first_dir.insert(next, origin);
            queue.push_back(next);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{first_step_toward, generate_level, reachable, reachable_cells, GeneratorConfig};
    use crate::constants::{ENEMY_INTERVAL_MAX, ENEMY_INTERVAL_MIN, SPAWN};
    use crate::grid::{GridPos, GridSpace};
    use crate::rng::Rng;
    use crate::types::Direction;

    fn open_config() -> GeneratorConfig {
        GeneratorConfig {
            wall_chance: 0.0,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn border_cells_are_always_walls() {
        let config = GeneratorConfig::default();
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let level = generate_level(1, &config, &mut rng);
            for pos in level.grid.cells() {
                if level.grid.is_border(pos) {
                    assert!(level.is_wall(pos), "seed={seed} border open at {pos:?}");
                }
            }
        }
    }

    #[test]
    fn spawn_pocket_is_clear() {
        let config = GeneratorConfig::default();
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let level = generate_level(1, &config, &mut rng);
            for x in 1..=2 {
                for y in 1..=2 {
                    assert!(!level.is_wall(GridPos::new(x, y)), "seed={seed}");
                }
            }
        }
    }

    #[test]
    fn treasures_are_reachable_from_spawn() {
        let config = GeneratorConfig {
            wall_chance: 0.3,
            ..GeneratorConfig::default()
        };
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let level = generate_level(1, &config, &mut rng);
            let open = reachable_cells(&level.grid, SPAWN, &level.walls);
            for treasure in &level.treasures {
                assert!(
                    open.contains(treasure),
                    "treasure is unreachable: seed={seed}, pos={treasure:?}"
                );
                assert!(treasure.distance(SPAWN) > 1.0);
            }
        }
    }

    #[test]
    fn enemies_respect_spawn_distance_and_walls() {
        let config = GeneratorConfig::default();
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let level = generate_level(2, &config, &mut rng);
            let mut seen = BTreeSet::new();
            for enemy in &level.enemies {
                assert!(!level.is_wall(enemy.pos));
                assert!(enemy.pos.distance(SPAWN) > 3.0);
                assert!(enemy.pos.x >= 4 && enemy.pos.y >= 4);
                assert!(seen.insert(enemy.pos), "seed={seed} duplicate enemy cell");
                assert!(enemy.interval >= ENEMY_INTERVAL_MIN * 0.5);
                assert!(enemy.interval < ENEMY_INTERVAL_MAX * 0.5);
            }
        }
    }

    #[test]
    fn open_grid_fills_every_quota() {
        let config = open_config();
        for seed in 0..50u32 {
            let mut rng = Rng::new(seed);
            let level = generate_level(1, &config, &mut rng);
            assert_eq!(level.walls.len(), 2 * 20 + 2 * 13);
            assert_eq!(level.treasures.len(), 8, "seed={seed}");
            assert_eq!(level.enemies.len(), 6, "seed={seed}");
            for enemy in &level.enemies {
                assert!(enemy.interval >= ENEMY_INTERVAL_MIN);
                assert!(enemy.interval < ENEMY_INTERVAL_MAX);
            }
        }
    }

    #[test]
    fn open_grid_interior_is_fully_reachable() {
        let mut rng = Rng::new(5);
        let level = generate_level(1, &open_config(), &mut rng);
        for pos in level.grid.cells() {
            if level.grid.is_border(pos) {
                assert!(!reachable(&level.grid, SPAWN, pos, &level.walls));
            } else {
                assert!(reachable(&level.grid, SPAWN, pos, &level.walls), "{pos:?}");
            }
        }
    }

    #[test]
    fn solid_fill_leaves_no_treasures_and_no_enemies() {
        let config = GeneratorConfig {
            wall_chance: 1.0,
            ..GeneratorConfig::default()
        };
        let mut rng = Rng::new(12);
        let level = generate_level(1, &config, &mut rng);
        // (2, 2) is the only open cell far enough from spawn.
        assert!(level.treasures.iter().all(|pos| *pos == GridPos::new(2, 2)));
        assert!(level.enemies.is_empty());
        assert!(!level.is_wall(GridPos::new(2, 2)));
    }

    #[test]
    fn reachable_respects_a_sealing_wall() {
        let grid = GridSpace::new(7, 5);
        let mut blocked = BTreeSet::new();
        for y in 0..5 {
            blocked.insert(GridPos::new(3, y));
        }
        assert!(reachable(&grid, GridPos::new(1, 1), GridPos::new(2, 3), &blocked));
        assert!(!reachable(&grid, GridPos::new(1, 1), GridPos::new(5, 1), &blocked));
        blocked.remove(&GridPos::new(3, 2));
        assert!(reachable(&grid, GridPos::new(1, 1), GridPos::new(5, 1), &blocked));
    }

    #[test]
    fn reachable_rejects_blocked_or_outside_target() {
        let grid = GridSpace::new(5, 5);
        let blocked = BTreeSet::from([GridPos::new(2, 2)]);
        assert!(!reachable(&grid, GridPos::new(0, 0), GridPos::new(2, 2), &blocked));
        assert!(!reachable(&grid, GridPos::new(0, 0), GridPos::new(9, 9), &blocked));
        assert!(reachable(&grid, GridPos::new(0, 0), GridPos::new(0, 0), &blocked));
    }

    #[test]
    fn first_step_heads_around_obstacles() {
        let grid = GridSpace::new(5, 3);
        let goals = BTreeSet::from([GridPos::new(4, 0)]);
        let blocked = BTreeSet::from([GridPos::new(1, 0)]);
        let dir = first_step_toward(&grid, GridPos::new(0, 0), &goals, |pos| blocked.contains(&pos));
        assert_eq!(dir, Some(Direction::Down));

        let open = first_step_toward(&grid, GridPos::new(0, 0), &goals, |_| false);
        assert_eq!(open, Some(Direction::Right));

        let sealed = first_step_toward(&grid, GridPos::new(0, 0), &goals, |pos| pos.x == 2);
        assert_eq!(sealed, None);
    }
}
