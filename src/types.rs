use serde::Serialize;

use crate::grid::{GridPos, PixelPos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Tie-break for held keys: left beats right beats up beats down.
    pub const INPUT_PRIORITY: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Menu,
    Playing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Goblin,
    Orc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    Idle,
    Moving,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
        }
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn any_held(&self) -> bool {
        self.left || self.right || self.up || self.down
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EntityView {
    pub grid: GridPos,
    pub pixel: PixelPos,
    pub moving: bool,
    pub animation: AnimationState,
    pub frame: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub entity: EntityView,
    pub score: i32,
    pub life: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: usize,
    #[serde(flatten)]
    pub entity: EntityView,
    pub kind: EnemyKind,
    #[serde(rename = "territoryCenter")]
    pub territory_center: GridPos,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    GameStarted,
    TreasureCollected {
        x: i32,
        y: i32,
        score: i32,
    },
    PhaseAdvanced {
        phase: u32,
    },
    PlayerCaught {
        x: i32,
        y: i32,
        #[serde(rename = "enemyId")]
        enemy_id: usize,
    },
    GameWon {
        score: i32,
    },
    ReturnedToMenu,
    AudioToggled {
        enabled: bool,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: f32,
    pub state: SessionState,
    pub phase: u32,
    #[serde(rename = "musicEnabled")]
    pub music_enabled: bool,
    pub width: i32,
    pub height: i32,
    pub walls: Vec<GridPos>,
    pub treasures: Vec<GridPos>,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub events: Vec<SessionEvent>,
}

impl Snapshot {
    pub fn score(&self) -> i32 {
        self.player.score
    }

    pub fn life(&self) -> i32 {
        self.player.life
    }

    pub fn treasure_count(&self) -> usize {
        self.treasures.len()
    }
}
