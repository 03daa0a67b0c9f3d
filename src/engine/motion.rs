use crate::constants::{
    ENTITY_SPEED, IDLE_FRAME_COUNT, IDLE_FRAME_SECONDS, MOVE_FRAME_COUNT, MOVE_FRAME_SECONDS,
    SNAP_DISTANCE,
};
use crate::grid::{GridPos, GridSpace, PixelPos};
use crate::types::{AnimationState, EntityView};

#[derive(Clone, Debug)]
pub struct Animator {
    frame_count: usize,
    frame_seconds: f32,
    frame: usize,
    elapsed: f32,
}

impl Animator {
    pub fn new(frame_count: usize, frame_seconds: f32) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_seconds,
            frame: 0,
            elapsed: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.frame_seconds {
            self.elapsed = 0.0;
            self.frame = (self.frame + 1) % self.frame_count;
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }
}

/// Grid position jumps to the destination when a move starts.
#[derive(Clone, Debug)]
pub struct Motion {
    grid_pos: GridPos,
    pixel: PixelPos,
    target: PixelPos,
    moving: bool,
    speed: f32,
    cell_size: f32,
    idle_anim: Animator,
    move_anim: Animator,
}

impl Motion {
    pub fn new(pos: GridPos, grid: &GridSpace) -> Self {
        let pixel = grid.to_pixel(pos);
        Self {
            grid_pos: pos,
            pixel,
            target: pixel,
            moving: false,
            speed: ENTITY_SPEED,
            cell_size: grid.cell_size,
            idle_anim: Animator::new(IDLE_FRAME_COUNT, IDLE_FRAME_SECONDS),
            move_anim: Animator::new(MOVE_FRAME_COUNT, MOVE_FRAME_SECONDS),
        }
    }

    pub fn grid_pos(&self) -> GridPos {
        self.grid_pos
    }

    pub fn pixel(&self) -> PixelPos {
        self.pixel
    }

    pub fn target(&self) -> PixelPos {
        self.target
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn request_move(&mut self, to: GridPos) -> bool {
        if self.moving {
            return false;
        }
        self.grid_pos = to;
        self.target = PixelPos {
            x: to.x as f32 * self.cell_size,
            y: to.y as f32 * self.cell_size,
        };
        self.moving = true;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        self.idle_anim.update(dt);
        self.move_anim.update(dt);

        if !self.moving {
            return;
        }
        let dx = self.target.x - self.pixel.x;
        let dy = self.target.y - self.pixel.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < SNAP_DISTANCE {
            self.pixel = self.target;
            self.moving = false;
            return;
        }
        let step = (self.speed * dt.max(0.0)).min(distance);
        self.pixel.x += dx / distance * step;
        self.pixel.y += dy / distance * step;
    }

    pub fn reset_to(&mut self, pos: GridPos) {
        self.grid_pos = pos;
        self.pixel = PixelPos {
            x: pos.x as f32 * self.cell_size,
            y: pos.y as f32 * self.cell_size,
        };
        self.target = self.pixel;
        self.moving = false;
    }

    pub fn animation_state(&self) -> AnimationState {
        if self.moving {
            AnimationState::Moving
        } else {
            AnimationState::Idle
        }
    }

    pub fn frame(&self) -> usize {
        if self.moving {
            self.move_anim.frame()
        } else {
            self.idle_anim.frame()
        }
    }

    pub fn view(&self) -> EntityView {
        EntityView {
            grid: self.grid_pos,
            pixel: self.pixel,
            moving: self.moving,
            animation: self.animation_state(),
            frame: self.frame(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Animator, Motion};
    use crate::constants::TICK_SECONDS;
    use crate::grid::{GridPos, GridSpace, PixelPos};
    use crate::types::AnimationState;

    fn run_until_idle(motion: &mut Motion, dt: f32) -> usize {
        let mut ticks = 0;
        while motion.is_moving() {
            motion.tick(dt);
            ticks += 1;
            assert!(ticks < 10_000, "motion never converged");
        }
        ticks
    }

    #[test]
    fn grid_position_updates_before_arrival() {
        let grid = GridSpace::default();
        let mut motion = Motion::new(GridPos::new(1, 1), &grid);
        assert!(motion.request_move(GridPos::new(2, 1)));
        assert_eq!(motion.grid_pos(), GridPos::new(2, 1));
        assert_eq!(motion.pixel(), PixelPos::new(32.0, 32.0));
        assert_eq!(motion.target(), PixelPos::new(64.0, 32.0));
        assert_eq!(motion.animation_state(), AnimationState::Moving);
    }

    #[test]
    fn converges_exactly_on_target() {
        let grid = GridSpace::default();
        for dt in [TICK_SECONDS, 0.001, 0.05, 0.5, 3.0] {
            let mut motion = Motion::new(GridPos::new(4, 4), &grid);
            assert!(motion.request_move(GridPos::new(4, 5)));
            run_until_idle(&mut motion, dt);
            assert_eq!(motion.pixel(), grid.to_pixel(GridPos::new(4, 5)));
            assert_eq!(motion.pixel(), motion.target());
        }
    }

    #[test]
    fn one_cell_takes_about_a_quarter_second() {
        let grid = GridSpace::default();
        let mut motion = Motion::new(GridPos::new(4, 4), &grid);
        motion.request_move(GridPos::new(5, 4));
        let ticks = run_until_idle(&mut motion, TICK_SECONDS);
        // 32 px at 120 px/s, with the final 2 px snapped.
        assert!((14..=17).contains(&ticks), "ticks={ticks}");
    }

    #[test]
    fn rejects_move_while_moving() {
        let grid = GridSpace::default();
        let mut motion = Motion::new(GridPos::new(4, 4), &grid);
        assert!(motion.request_move(GridPos::new(5, 4)));
        assert!(!motion.request_move(GridPos::new(4, 5)));
        assert_eq!(motion.grid_pos(), GridPos::new(5, 4));
    }

    #[test]
    fn zero_dt_while_at_target_does_not_divide_by_zero() {
        let grid = GridSpace::default();
        let mut motion = Motion::new(GridPos::new(3, 3), &grid);
        motion.request_move(GridPos::new(3, 3));
        motion.tick(0.0);
        assert!(!motion.is_moving());
        assert!(motion.pixel().x.is_finite());
    }

    #[test]
    fn reset_drops_move_in_progress() {
        let grid = GridSpace::default();
        let mut motion = Motion::new(GridPos::new(6, 6), &grid);
        motion.request_move(GridPos::new(7, 6));
        motion.tick(TICK_SECONDS);
        motion.reset_to(GridPos::new(1, 1));
        assert!(!motion.is_moving());
        assert_eq!(motion.pixel(), PixelPos::new(32.0, 32.0));
        assert_eq!(motion.target(), motion.pixel());
    }

    #[test]
    fn animator_wraps_frame_index() {
        let mut anim = Animator::new(3, 0.8);
        for _ in 0..3 {
            anim.update(0.8);
        }
        assert_eq!(anim.frame(), 0);
        anim.update(0.5);
        assert_eq!(anim.frame(), 0);
        anim.update(0.4);
        assert_eq!(anim.frame(), 1);
    }
}
