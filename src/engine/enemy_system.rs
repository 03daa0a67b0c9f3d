use super::*;

#[derive(Clone, Debug)]
pub(super) struct Enemy {
    pub(super) id: usize,
    pub(super) kind: EnemyKind,
    pub(super) motion: Motion,
    pub(super) territory_center: GridPos,
    pub(super) territory_radius: f32,
    pub(super) interval: f32,
    pub(super) timer: f32,
}

impl Enemy {
    pub(super) fn view(&self) -> EnemyView {
        EnemyView {
            id: self.id,
            entity: self.motion.view(),
            kind: self.kind,
            territory_center: self.territory_center,
        }
    }

    fn in_territory(&self, pos: GridPos) -> bool {
        pos.distance(self.territory_center) <= self.territory_radius
    }
}

impl GameSession {
    pub(super) fn spawn_enemies(&mut self) {
        self.enemies.clear();
        for spawn in &self.level.enemies {
            let id = self.next_enemy_id;
            self.next_enemy_id = self.next_enemy_id.saturating_add(1);
            self.enemies.push(Enemy {
                id,
                kind: spawn.kind,
                motion: Motion::new(spawn.pos, &self.level.grid),
                territory_center: spawn.pos,
                territory_radius: TERRITORY_RADIUS,
                interval: spawn.interval,
                timer: 0.0,
            });
        }
    }

    /// Enemies act in list order; each sees the moves already made this tick.
    pub(super) fn update_enemies(&mut self, dt: f32) {
        for idx in 0..self.enemies.len() {
            self.enemies[idx].motion.tick(dt);
            if self.enemies[idx].motion.is_moving() {
                continue;
            }
            self.enemies[idx].timer += dt;
            if self.enemies[idx].timer < self.enemies[idx].interval {
                continue;
            }
            self.enemies[idx].timer = 0.0;
            self.enemies[idx].interval = self.rng.uniform(ENEMY_INTERVAL_MIN, ENEMY_INTERVAL_MAX);
            let _ = self.try_wander(idx);
        }
    }

    pub(super) fn try_wander(&mut self, enemy_idx: usize) -> bool {
        if enemy_idx >= self.enemies.len() {
            return false;
        }
        let mut dirs = [
            Direction::Down,
            Direction::Up,
            Direction::Right,
            Direction::Left,
        ];
        self.rng.shuffle(&mut dirs);

        let from = self.enemies[enemy_idx].motion.grid_pos();
        for dir in dirs {
            let to = from.offset(dir);
            if !self.level.grid.in_bounds(to) || !self.enemies[enemy_idx].in_territory(to) {
                continue;
            }
            if self.is_blocked_for_enemy(to) {
                continue;
            }
            return self.enemies[enemy_idx].motion.request_move(to);
        }
        false
    }

    /// Walls and other enemies block; the player never does.
    pub(super) fn is_blocked_for_enemy(&self, pos: GridPos) -> bool {
        self.level.is_blocked_by_walls(pos)
            || self
                .enemies
                .iter()
                .any(|enemy| enemy.motion.grid_pos() == pos)
    }
}
