use std::collections::HashMap;

use serde::Serialize;

use crate::constants::{CELL_SIZE, SCREEN_WIDTH};
use crate::engine::GameSession;
use crate::types::{AnimationState, EnemyKind, SessionState, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color { r, g, b }
}

const PLAYER_IDLE: [Color; 3] = [rgb(0, 255, 0), rgb(0, 200, 0), rgb(0, 255, 50)];
const PLAYER_MOVE: [Color; 4] = [
    rgb(50, 255, 50),
    rgb(0, 255, 0),
    rgb(100, 255, 100),
    rgb(0, 200, 0),
];
const GOBLIN_IDLE: [Color; 3] = [rgb(255, 0, 0), rgb(200, 0, 0), rgb(255, 50, 50)];
const GOBLIN_MOVE: [Color; 4] = [
    rgb(255, 0, 0),
    rgb(200, 0, 0),
    rgb(255, 100, 100),
    rgb(150, 0, 0),
];
const ORC_IDLE: [Color; 3] = [rgb(150, 0, 0), rgb(100, 0, 0), rgb(180, 0, 0)];
const ORC_MOVE: [Color; 4] = [
    rgb(150, 0, 0),
    rgb(100, 0, 0),
    rgb(120, 0, 0),
    rgb(180, 20, 20),
];
const TREASURE: Color = rgb(255, 215, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: Color,
    pub wall: Color,
    pub wall_border: Color,
}

pub fn palette_for_phase(phase: u32) -> Palette {
    if phase <= 1 {
        Palette {
            background: rgb(15, 15, 25),
            wall: rgb(80, 80, 80),
            wall_border: rgb(60, 60, 60),
        }
    } else {
        Palette {
            background: rgb(25, 10, 10),
            wall: rgb(100, 60, 60),
            wall_border: rgb(80, 40, 40),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drawable {
    Player,
    Enemy(EnemyKind),
    Wall,
    Treasure,
}

impl Drawable {
    fn asset_stem(self) -> &'static str {
        match self {
            Drawable::Player => "player",
            Drawable::Enemy(EnemyKind::Goblin) => "goblin",
            Drawable::Enemy(EnemyKind::Orc) => "orc",
            Drawable::Wall => "wall",
            Drawable::Treasure => "treasure",
        }
    }

    /// Pixels trimmed from each side of the cell for the flat-color shape.
    fn inset(self) -> f32 {
        match self {
            Drawable::Player => 1.0,
            Drawable::Enemy(_) => 2.0,
            Drawable::Wall => 0.0,
            Drawable::Treasure => 6.0,
        }
    }
}

pub trait AssetCatalog {
    /// Source edge length in pixels, if the image is available.
    fn image_size(&self, name: &str) -> Option<f32>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetCatalog for NoAssets {
    fn image_size(&self, _name: &str) -> Option<f32> {
        None
    }
}

impl AssetCatalog for HashMap<String, f32> {
    fn image_size(&self, name: &str) -> Option<f32> {
        self.get(name).copied().filter(|size| *size > 0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderDescriptor {
    Image { name: String, scale: f32 },
    Primitive { color: Color, inset: f32 },
}

pub fn image_name(drawable: Drawable, animation: AnimationState, frame: usize) -> String {
    match drawable {
        Drawable::Wall | Drawable::Treasure => drawable.asset_stem().to_string(),
        Drawable::Player | Drawable::Enemy(_) => {
            let state = match animation {
                AnimationState::Idle => "idle",
                AnimationState::Moving => "move",
            };
            format!("{}_{}_{}", drawable.asset_stem(), state, frame)
        }
    }
}

pub fn resolve(
    drawable: Drawable,
    animation: AnimationState,
    frame: usize,
    phase: u32,
    catalog: &dyn AssetCatalog,
) -> RenderDescriptor {
    let name = image_name(drawable, animation, frame);
    if let Some(size) = catalog.image_size(&name) {
        return RenderDescriptor::Image {
            name,
            scale: CELL_SIZE / size,
        };
    }
    RenderDescriptor::Primitive {
        color: primitive_color(drawable, animation, frame, phase),
        inset: drawable.inset(),
    }
}

fn primitive_color(drawable: Drawable, animation: AnimationState, frame: usize, phase: u32) -> Color {
    let frames: &[Color] = match (drawable, animation) {
        (Drawable::Player, AnimationState::Idle) => &PLAYER_IDLE,
        (Drawable::Player, AnimationState::Moving) => &PLAYER_MOVE,
        (Drawable::Enemy(EnemyKind::Goblin), AnimationState::Idle) => &GOBLIN_IDLE,
        (Drawable::Enemy(EnemyKind::Goblin), AnimationState::Moving) => &GOBLIN_MOVE,
        (Drawable::Enemy(EnemyKind::Orc), AnimationState::Idle) => &ORC_IDLE,
        (Drawable::Enemy(EnemyKind::Orc), AnimationState::Moving) => &ORC_MOVE,
        (Drawable::Wall, _) => return palette_for_phase(phase).wall,
        (Drawable::Treasure, _) => return TREASURE,
    };
    frames[frame % frames.len()]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Victory,
    Defeat,
}

pub fn outcome(snapshot: &Snapshot) -> Option<Outcome> {
    if snapshot.state != SessionState::GameOver {
        return None;
    }
    if snapshot.life() <= 0 {
        Some(Outcome::Defeat)
    } else {
        Some(Outcome::Victory)
    }
}

pub fn hud_lines(snapshot: &Snapshot) -> Vec<String> {
    vec![
        format!("Score: {}", snapshot.score()),
        format!("Life: {}", snapshot.life()),
        format!("Treasures: {}", snapshot.treasure_count()),
        format!("Phase: {}", snapshot.phase),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Start,
    ToggleMusic,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }
}

const BUTTON_WIDTH: f32 = 200.0;
const BUTTON_HEIGHT: f32 = 50.0;

pub fn menu_buttons() -> [(MenuAction, Rect); 3] {
    let x = SCREEN_WIDTH / 2.0 - BUTTON_WIDTH / 2.0;
    let button = |y| Rect {
        x,
        y,
        w: BUTTON_WIDTH,
        h: BUTTON_HEIGHT,
    };
    [
        (MenuAction::Start, button(180.0)),
        (MenuAction::ToggleMusic, button(250.0)),
        (MenuAction::Quit, button(320.0)),
    ]
}

pub fn menu_action_at(x: f32, y: f32) -> Option<MenuAction> {
    menu_buttons()
        .into_iter()
        .find(|(_, rect)| rect.contains(x, y))
        .map(|(action, _)| action)
}

/// `Quit` is left to the caller.
pub fn dispatch_menu_click(session: &mut GameSession, x: f32, y: f32) -> Option<MenuAction> {
    if session.state() != SessionState::Menu {
        return None;
    }
    let action = menu_action_at(x, y)?;
    match action {
        MenuAction::Start => {
            let _ = session.start_game();
        }
        MenuAction::ToggleMusic => {
            let _ = session.toggle_audio();
        }
        MenuAction::Quit => {}
    }
    Some(action)
}

pub const MUSIC_TRACK: &str = "theme";
pub const MUSIC_VOLUME: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AudioCommand {
    SetVolume { volume: f32 },
    PlayMusic { track: String },
    StopMusic,
}

#[derive(Clone, Debug, Default)]
pub struct AudioDirector {
    applied: Option<bool>,
}

impl AudioDirector {
    pub fn sync(&mut self, music_enabled: bool) -> Vec<AudioCommand> {
        if self.applied == Some(music_enabled) {
            return Vec::new();
        }
        self.applied = Some(music_enabled);
        if music_enabled {
            vec![
                AudioCommand::SetVolume {
                    volume: MUSIC_VOLUME,
                },
                AudioCommand::PlayMusic {
                    track: MUSIC_TRACK.to_string(),
                },
            ]
        } else {
            vec![AudioCommand::StopMusic]
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine::SessionOptions;

    #[test]
    fn missing_image_falls_back_to_frame_color() {
        let descriptor = resolve(
            Drawable::Enemy(EnemyKind::Orc),
            AnimationState::Moving,
            3,
            1,
            &NoAssets,
        );
        assert_eq!(
            descriptor,
            RenderDescriptor::Primitive {
                color: rgb(180, 20, 20),
                inset: 2.0,
            }
        );
    }

    #[test]
    fn available_image_is_scaled_to_cell() {
        let catalog = HashMap::from([("player_idle_1".to_string(), 64.0)]);
        let descriptor = resolve(Drawable::Player, AnimationState::Idle, 1, 1, &catalog);
        assert_eq!(
            descriptor,
            RenderDescriptor::Image {
                name: "player_idle_1".to_string(),
                scale: 0.5,
            }
        );
        let other = resolve(Drawable::Player, AnimationState::Moving, 1, 1, &catalog);
        assert!(matches!(other, RenderDescriptor::Primitive { .. }));
    }

    #[test]
    fn wall_color_follows_phase() {
        let phase_one = resolve(Drawable::Wall, AnimationState::Idle, 0, 1, &NoAssets);
        let phase_two = resolve(Drawable::Wall, AnimationState::Idle, 0, 2, &NoAssets);
        assert_ne!(phase_one, phase_two);
        assert_eq!(palette_for_phase(2).background, rgb(25, 10, 10));
    }

    #[test]
    fn menu_regions_map_to_actions() {
        assert_eq!(menu_action_at(320.0, 200.0), Some(MenuAction::Start));
        assert_eq!(menu_action_at(230.0, 260.0), Some(MenuAction::ToggleMusic));
        assert_eq!(menu_action_at(409.0, 369.0), Some(MenuAction::Quit));
        assert_eq!(menu_action_at(320.0, 240.0), None);
        assert_eq!(menu_action_at(10.0, 200.0), None);
    }

    #[test]
    fn menu_click_starts_game_only_from_menu() {
        let mut session = GameSession::new(SessionOptions::default());
        assert_eq!(
            dispatch_menu_click(&mut session, 320.0, 200.0),
            Some(MenuAction::Start)
        );
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(dispatch_menu_click(&mut session, 320.0, 260.0), None);
        assert!(session.is_music_enabled());
    }

    #[test]
    fn outcome_reads_life_at_game_over() {
        let mut session = GameSession::new(SessionOptions::default());
        let mut snapshot = session.build_snapshot(false);
        assert_eq!(outcome(&snapshot), None);
        snapshot.state = SessionState::GameOver;
        assert_eq!(outcome(&snapshot), Some(Outcome::Victory));
        snapshot.player.life = 0;
        assert_eq!(outcome(&snapshot), Some(Outcome::Defeat));
    }

    #[test]
    fn audio_director_emits_on_change_only() {
        let mut director = AudioDirector::default();
        assert_eq!(director.sync(true).len(), 2);
        assert!(director.sync(true).is_empty());
        assert_eq!(director.sync(false), vec![AudioCommand::StopMusic]);
        assert_eq!(director.sync(true).len(), 2);
    }

    #[test]
    fn hud_lists_score_life_treasures_phase() {
        let mut session = GameSession::new(SessionOptions::default());
        session.start_game();
        let snapshot = session.build_snapshot(false);
        let lines = hud_lines(&snapshot);
        assert_eq!(lines[0], "Score: 0");
        assert_eq!(lines[1], "Life: 3");
        assert_eq!(lines[3], "Phase: 1");
    }
}
