use crate::constants::{
    ENEMY_INTERVAL_MAX, ENEMY_INTERVAL_MIN, FINAL_PHASE, FIRST_PHASE, PLAYER_STEP_INTERVAL,
    STARTING_LIFE, TERRITORY_RADIUS, TREASURE_POINTS,
};
use crate::grid::GridPos;
use crate::rng::Rng;
use crate::types::{
    Direction, EnemyKind, EnemyView, InputState, PlayerView, SessionEvent, SessionState,
    Snapshot,
};
use crate::world::{generate_level, GeneratorConfig, Level};

mod enemy_system;
pub mod motion;

use self::enemy_system::Enemy;
pub use self::motion::{Animator, Motion};

#[derive(Clone, Debug)]
struct Player {
    motion: Motion,
    score: i32,
    life: i32,
}

impl Player {
    fn new(level: &Level) -> Self {
        Self {
            motion: Motion::new(level.spawn, &level.grid),
            score: 0,
            life: STARTING_LIFE,
        }
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            entity: self.motion.view(),
            score: self.score,
            life: self.life,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub seed: u32,
    pub generator: GeneratorConfig,
}

#[derive(Clone, Debug)]
pub struct GameSession {
    options: SessionOptions,
    rng: Rng,
    state: SessionState,
    level: Level,
    player: Player,
    enemies: Vec<Enemy>,
    input: InputState,
    step_timer: f32,
    music_enabled: bool,
    sound_enabled: bool,
    events: Vec<SessionEvent>,
    tick_counter: u64,
    elapsed_seconds: f32,
    next_enemy_id: usize,
}

impl GameSession {
    pub fn new(options: SessionOptions) -> Self {
        let mut rng = Rng::new(options.seed);
        let level = generate_level(FIRST_PHASE, &options.generator, &mut rng);
        let player = Player::new(&level);
        let mut session = Self {
            options,
            rng,
            state: SessionState::Menu,
            level,
            player,
            enemies: Vec::new(),
            input: InputState::default(),
            step_timer: 0.0,
            music_enabled: true,
            sound_enabled: true,
            events: Vec::new(),
            tick_counter: 0,
            elapsed_seconds: 0.0,
            next_enemy_id: 1,
        };
        session.spawn_enemies();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> u32 {
        self.level.phase
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn input(&self) -> InputState {
        self.input
    }

    pub fn player_pos(&self) -> GridPos {
        self.player.motion.grid_pos()
    }

    pub fn player_motion(&self) -> &Motion {
        &self.player.motion
    }

    pub fn score(&self) -> i32 {
        self.player.score
    }

    pub fn life(&self) -> i32 {
        self.player.life
    }

    pub fn enemy_positions(&self) -> Vec<GridPos> {
        self.enemies
            .iter()
            .map(|enemy| enemy.motion.grid_pos())
            .collect()
    }

    pub fn is_music_enabled(&self) -> bool {
        self.music_enabled
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn start_game(&mut self) -> bool {
        if self.state != SessionState::Menu {
            return false;
        }
        self.reset_game();
        self.state = SessionState::Playing;
        self.events.push(SessionEvent::GameStarted);
        true
    }

    pub fn acknowledge_game_over(&mut self) -> bool {
        if self.state != SessionState::GameOver {
            return false;
        }
        self.state = SessionState::Menu;
        self.events.push(SessionEvent::ReturnedToMenu);
        true
    }

    pub fn toggle_audio(&mut self) -> bool {
        self.music_enabled = !self.music_enabled;
        self.sound_enabled = self.music_enabled;
        self.events.push(SessionEvent::AudioToggled {
            enabled: self.music_enabled,
        });
        self.music_enabled
    }

    pub fn set_direction_held(&mut self, dir: Direction, held: bool) {
        if self.state != SessionState::Playing {
            return;
        }
        self.input.set(dir, held);
    }

    pub fn update(&mut self, dt: f32) {
        if self.state != SessionState::Playing {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_seconds += dt;

        self.player.motion.tick(dt);
        if !self.player.motion.is_moving() {
            self.step_timer += dt;
            if self.step_timer >= PLAYER_STEP_INTERVAL {
                self.step_timer = 0.0;
                let _ = self.process_continuous_movement();
            }
        }

        self.update_enemies(dt);

        if self.resolve_enemy_collision() {
            return;
        }
        self.collect_treasure();
        self.check_phase_progress();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_seconds: self.elapsed_seconds,
            state: self.state,
            phase: self.level.phase,
            music_enabled: self.music_enabled,
            width: self.level.grid.width,
            height: self.level.grid.height,
            walls: self.level.walls.iter().copied().collect(),
            treasures: self.level.treasures.iter().copied().collect(),
            player: self.player.view(),
            enemies: self.enemies.iter().map(Enemy::view).collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn reset_game(&mut self) {
        self.level = generate_level(FIRST_PHASE, &self.options.generator, &mut self.rng);
        self.player = Player::new(&self.level);
        self.spawn_enemies();
        self.input.clear();
        self.step_timer = 0.0;
    }

    fn advance_phase(&mut self) {
        let phase = self.level.phase + 1;
        self.level = generate_level(phase, &self.options.generator, &mut self.rng);
        self.player.motion.reset_to(self.level.spawn);
        self.spawn_enemies();
        self.events.push(SessionEvent::PhaseAdvanced { phase });
    }

    fn process_continuous_movement(&mut self) -> bool {
        let from = self.player.motion.grid_pos();
        let Some(dir) = Direction::INPUT_PRIORITY
            .into_iter()
            .find(|dir| self.input.is_held(*dir) && self.level.grid.in_bounds(from.offset(*dir)))
        else {
            return false;
        };
        let to = from.offset(dir);
        if self.level.is_blocked_by_walls(to) {
            return false;
        }
        self.player.motion.request_move(to)
    }

    fn resolve_enemy_collision(&mut self) -> bool {
        let pos = self.player.motion.grid_pos();
        let Some(enemy_id) = self
            .enemies
            .iter()
            .find(|enemy| enemy.motion.grid_pos() == pos)
            .map(|enemy| enemy.id)
        else {
            return false;
        };
        self.state = SessionState::GameOver;
        self.player.life = 0;
        self.input.clear();
        self.events.push(SessionEvent::PlayerCaught {
            x: pos.x,
            y: pos.y,
            enemy_id,
        });
        true
    }

    fn collect_treasure(&mut self) {
        let pos = self.player.motion.grid_pos();
        if !self.level.treasures.remove(&pos) {
            return;
        }
        self.player.score += TREASURE_POINTS;
        self.events.push(SessionEvent::TreasureCollected {
            x: pos.x,
            y: pos.y,
            score: self.player.score,
        });
    }

    fn check_phase_progress(&mut self) {
        if !self.level.treasures.is_empty() {
            return;
        }
        if self.level.phase < FINAL_PHASE {
            self.advance_phase();
            return;
        }
        self.state = SessionState::GameOver;
        self.events.push(SessionEvent::GameWon {
            score: self.player.score,
        });
    }
}
