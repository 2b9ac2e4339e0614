//! Per-room simulation state: paddles, ball, bricks, power-ups and score.

use serde::Serialize;

use super::{
    settings::{Court, GameMode, Settings},
    value_object::Direction,
};

/// Left or right half of the court
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Paddle {
    /// Top edge
    pub y: f32,
    /// Current height; differs from the settings baseline while shrunk
    pub height: f32,
}

impl Paddle {
    fn new(height: f32) -> Self {
        Self {
            y: Court::PADDLE_START_Y,
            height,
        }
    }

    /// Keep the paddle fully inside the court.
    pub fn clamp_to_court(&mut self) {
        self.y = self.y.clamp(0.0, (Court::HEIGHT - self.height).max(0.0));
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn spans(&self, y: f32) -> bool {
        y > self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub slowed: bool,
}

impl Ball {
    /// Ball at the court center moving at `(speed, speed)`
    pub fn serve(speed: f32) -> Self {
        let (x, y) = Court::center();
        Self {
            x,
            y,
            vx: speed,
            vy: speed,
            slowed: false,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    /// Rescale the velocity to `speed`, keeping its direction.
    pub fn set_speed(&mut self, speed: f32) {
        let angle = self.vy.atan2(self.vx);
        self.vx = speed * angle.cos();
        self.vy = speed * angle.sin();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Brick {
    /// Top-left corner
    pub x: f32,
    pub y: f32,
    pub intact: bool,
}

impl Brick {
    pub fn center(&self) -> (f32, f32) {
        (
            self.x + Court::BRICK_WIDTH / 2.0,
            self.y + Court::BRICK_HEIGHT / 2.0,
        )
    }

    /// Whether the brick overlaps the ball's bounding box
    pub fn overlaps(&self, ball: &Ball) -> bool {
        ball.x + Court::BALL_RADIUS > self.x
            && ball.x - Court::BALL_RADIUS < self.x + Court::BRICK_WIDTH
            && ball.y + Court::BALL_RADIUS > self.y
            && ball.y - Court::BALL_RADIUS < self.y + Court::BRICK_HEIGHT
    }
}

/// Lay out `settings.brick_rows` rows of intact bricks centered horizontally.
pub fn generate_bricks(settings: &Settings) -> Vec<Brick> {
    let pitch_x = Court::BRICK_WIDTH + Court::BRICK_GAP;
    let pitch_y = Court::BRICK_HEIGHT + Court::BRICK_GAP;
    let start_x = Court::WIDTH / 2.0 - (Court::BRICK_COLUMNS as f32 * pitch_x) / 2.0;

    (0..settings.brick_rows)
        .flat_map(|row| {
            (0..Court::BRICK_COLUMNS).map(move |col| Brick {
                x: start_x + col as f32 * pitch_x,
                y: Court::BRICK_START_Y + row as f32 * pitch_y,
                intact: true,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    SlowBall,
    PaddleShrink,
}

impl PowerUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::SlowBall => "slowBall",
            PowerUpKind::PaddleShrink => "paddleShrink",
        }
    }
}

/// Applied or reverted power-up effect, as announced to room members
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerUpEffect {
    pub kind: PowerUpKind,
    /// Paddle side for shrinks
    pub target: Option<Side>,
    /// Resulting paddle height for shrinks
    pub height: Option<f32>,
}

/// Scheduled reversion of a consumed power-up's effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRevert {
    /// Simulation clock value at which the effect reverts
    pub expires_at_ms: u64,
    /// Paddle affected by a shrink
    pub target: Option<Side>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    /// True until picked up; never flips back
    pub active: bool,
    pub duration_ms: u64,
    pub revert: Option<PendingRevert>,
}

/// Match score, shaped by the room's game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Score {
    Classic { left: u32, right: u32 },
    Team { left: u32, right: u32 },
    Cooperative { shared: u32 },
}

impl Score {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Classic => Score::Classic { left: 0, right: 0 },
            GameMode::Team => Score::Team { left: 0, right: 0 },
            GameMode::Cooperative => Score::Cooperative { shared: 0 },
        }
    }

    /// Credit one point to `side`, or to the shared counter.
    pub fn award(&mut self, side: Side) {
        match self {
            Score::Classic { left, right } | Score::Team { left, right } => match side {
                Side::Left => *left += 1,
                Side::Right => *right += 1,
            },
            Score::Cooperative { shared } => *shared += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub left_paddle: Paddle,
    pub right_paddle: Paddle,
    pub ball: Ball,
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub score: Score,
    /// Simulated time since the match started
    pub elapsed_ms: u64,
    #[serde(skip)]
    next_power_up_id: u32,
}

impl GameState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            left_paddle: Paddle::new(settings.paddle_height),
            right_paddle: Paddle::new(settings.paddle_height),
            ball: Ball::serve(settings.ball_speed),
            bricks: generate_bricks(settings),
            power_ups: Vec::new(),
            score: Score::for_mode(settings.game_mode),
            elapsed_ms: 0,
            next_power_up_id: 0,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left_paddle,
            Side::Right => &self.right_paddle,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left_paddle,
            Side::Right => &mut self.right_paddle,
        }
    }

    /// Step a paddle by one move increment, clamped to the court.
    pub fn move_paddle(&mut self, side: Side, direction: Direction) {
        let paddle = self.paddle_mut(side);
        paddle.y += direction.value() * Court::PADDLE_STEP;
        paddle.clamp_to_court();
    }

    pub fn bricks_remaining(&self) -> usize {
        self.bricks.iter().filter(|brick| brick.intact).count()
    }

    pub(crate) fn allocate_power_up_id(&mut self) -> u32 {
        self.next_power_up_id += 1;
        self.next_power_up_id
    }
}
