//! One fixed simulation step for a running room.
//!
//! Pure with respect to I/O: everything observable is returned as
//! [`PhysicsEvent`]s and the mutated [`GameState`].

use std::f32::consts::PI;

use rand::Rng;

use super::{
    game_state::{GameState, PendingRevert, PowerUp, PowerUpEffect, PowerUpKind, Side},
    settings::{Court, Settings},
};

/// Scheduler cadence
pub const TICK_MS: u64 = 30;

const MAX_BOUNCE_ANGLE: f32 = 75.0 * PI / 180.0;
const PADDLE_SPEEDUP: f32 = 1.1;
const BRICK_DAMPING: f32 = 0.9;
const POWER_UP_SPAWN_CHANCE: f64 = 0.2;
const POWER_UP_DURATION_MS: u64 = 5000;
const POWER_UP_PICKUP_MARGIN: f32 = 10.0;
const PADDLE_SHRINK: f32 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsEvent {
    PaddleHit(Side),
    BrickBroken { index: usize, scored_by: Side },
    BallReset,
    PowerUpSpawned(PowerUp),
    /// A power-up was picked up and its effect applied
    PowerUpApplied(PowerUpEffect),
    /// A timed effect ran out and was reverted
    PowerUpExpired(PowerUpEffect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub events: Vec<PhysicsEvent>,
    pub bricks_remaining: usize,
}

/// Advance `state` by one tick of `dt_ms` simulated milliseconds.
///
/// Ball motion is expressed in units per tick; `dt_ms` only drives the
/// power-up expiry clock.
pub fn step<R: Rng + ?Sized>(
    state: &mut GameState,
    settings: &Settings,
    dt_ms: u64,
    rng: &mut R,
) -> StepOutcome {
    let mut events = Vec::new();

    state.elapsed_ms += dt_ms;
    expire_effects(state, settings, &mut events);

    integrate(state);
    reflect_walls(state);
    collide_paddles(state, settings, &mut events);
    collide_bricks(state, settings, rng, &mut events);
    reset_if_out(state, settings, &mut events);
    collect_power_ups(state, &mut events);

    state
        .power_ups
        .retain(|power_up| power_up.active || power_up.revert.is_some());

    StepOutcome {
        events,
        bricks_remaining: state.bricks_remaining(),
    }
}

fn integrate(state: &mut GameState) {
    state.ball.x += state.ball.vx;
    state.ball.y += state.ball.vy;
}

fn reflect_walls(state: &mut GameState) {
    let ball = &mut state.ball;
    let above_top = ball.y - Court::BALL_RADIUS < 0.0 && ball.vy < 0.0;
    let below_bottom = ball.y + Court::BALL_RADIUS > Court::HEIGHT && ball.vy > 0.0;
    if above_top || below_bottom {
        ball.vy = -ball.vy;
    }
}

fn collide_paddles(state: &mut GameState, settings: &Settings, events: &mut Vec<PhysicsEvent>) {
    let ball = state.ball;
    let left_face = Court::LEFT_PADDLE_X + Court::PADDLE_WIDTH;
    let right_face = Court::RIGHT_PADDLE_X;

    let hits_left = ball.vx < 0.0
        && ball.x - Court::BALL_RADIUS < left_face
        && ball.x + Court::BALL_RADIUS > Court::LEFT_PADDLE_X
        && state.left_paddle.spans(ball.y);
    let hits_right = ball.vx > 0.0
        && ball.x + Court::BALL_RADIUS > right_face
        && ball.x - Court::BALL_RADIUS < Court::RIGHT_PADDLE_X + Court::PADDLE_WIDTH
        && state.right_paddle.spans(ball.y);

    for (side, hit) in [(Side::Left, hits_left), (Side::Right, hits_right)] {
        if hit {
            bounce_off_paddle(state, settings, side);
            events.push(PhysicsEvent::PaddleHit(side));
        }
    }
}

/// Reflect the ball off `side`'s paddle with an angle proportional to the
/// strike offset from the paddle center.
fn bounce_off_paddle(state: &mut GameState, settings: &Settings, side: Side) {
    let paddle = *state.paddle(side);
    let ball = &mut state.ball;

    let offset = ((paddle.center_y() - ball.y) / (paddle.height / 2.0)).clamp(-1.0, 1.0);
    let angle = offset * MAX_BOUNCE_ANGLE;
    let speed = (ball.speed() * PADDLE_SPEEDUP).clamp(settings.ball_speed, settings.ball_speed * 2.0);
    let away = match side {
        Side::Left => 1.0,
        Side::Right => -1.0,
    };

    ball.vx = away * speed * angle.cos();
    ball.vy = -speed * angle.sin();
}

fn collide_bricks<R: Rng + ?Sized>(
    state: &mut GameState,
    settings: &Settings,
    rng: &mut R,
    events: &mut Vec<PhysicsEvent>,
) {
    for index in 0..state.bricks.len() {
        let brick = state.bricks[index];
        if !brick.intact || !brick.overlaps(&state.ball) {
            continue;
        }
        state.bricks[index].intact = false;

        let ball = &mut state.ball;
        ball.vy = -ball.vy;
        let speed = (ball.speed() * BRICK_DAMPING).max(settings.ball_speed);
        ball.set_speed(speed);

        let scored_by = if ball.vx > 0.0 { Side::Right } else { Side::Left };
        state.score.award(scored_by);
        events.push(PhysicsEvent::BrickBroken { index, scored_by });

        if rng.r#gen::<f64>() < POWER_UP_SPAWN_CHANCE {
            let kind = if rng.r#gen::<f64>() < 0.5 {
                PowerUpKind::SlowBall
            } else {
                PowerUpKind::PaddleShrink
            };
            let (x, y) = brick.center();
            let power_up = PowerUp {
                id: state.allocate_power_up_id(),
                kind,
                x,
                y,
                active: true,
                duration_ms: POWER_UP_DURATION_MS,
                revert: None,
            };
            state.power_ups.push(power_up);
            events.push(PhysicsEvent::PowerUpSpawned(power_up));
        }
    }
}

/// Serve from the center toward the side that did not just score.
fn reset_if_out(state: &mut GameState, settings: &Settings, events: &mut Vec<PhysicsEvent>) {
    let ball = &mut state.ball;
    let out_left = ball.x - Court::BALL_RADIUS < 0.0;
    let out_right = ball.x + Court::BALL_RADIUS > Court::WIDTH;
    if !(out_left || out_right) {
        return;
    }

    let (x, y) = Court::center();
    ball.x = x;
    ball.y = y;
    ball.vx = -ball.vx.signum() * settings.ball_speed;
    events.push(PhysicsEvent::BallReset);
}

fn collect_power_ups(state: &mut GameState, events: &mut Vec<PhysicsEvent>) {
    let reach = Court::BALL_RADIUS + POWER_UP_PICKUP_MARGIN;

    for index in 0..state.power_ups.len() {
        let power_up = state.power_ups[index];
        if !power_up.active {
            continue;
        }
        let distance = (state.ball.x - power_up.x).hypot(state.ball.y - power_up.y);
        if distance >= reach {
            continue;
        }

        state.power_ups[index].active = false;
        let expires_at_ms = state.elapsed_ms + power_up.duration_ms;

        match power_up.kind {
            PowerUpKind::SlowBall => {
                if state.ball.slowed {
                    continue;
                }
                let ball = &mut state.ball;
                ball.vx /= 2.0;
                ball.vy /= 2.0;
                ball.slowed = true;
                state.power_ups[index].revert = Some(PendingRevert {
                    expires_at_ms,
                    target: None,
                });
                events.push(PhysicsEvent::PowerUpApplied(PowerUpEffect {
                    kind: PowerUpKind::SlowBall,
                    target: None,
                    height: None,
                }));
            }
            PowerUpKind::PaddleShrink => {
                let target = if state.ball.x < Court::WIDTH / 2.0 {
                    Side::Right
                } else {
                    Side::Left
                };
                let paddle = state.paddle_mut(target);
                paddle.height = (paddle.height - PADDLE_SHRINK).max(Court::MIN_PADDLE_HEIGHT);
                let height = paddle.height;
                state.power_ups[index].revert = Some(PendingRevert {
                    expires_at_ms,
                    target: Some(target),
                });
                events.push(PhysicsEvent::PowerUpApplied(PowerUpEffect {
                    kind: PowerUpKind::PaddleShrink,
                    target: Some(target),
                    height: Some(height),
                }));
            }
        }
    }
}

/// Revert every consumed effect whose expiry is due and drop its power-up.
fn expire_effects(state: &mut GameState, settings: &Settings, events: &mut Vec<PhysicsEvent>) {
    let now = state.elapsed_ms;
    let (due, pending): (Vec<PowerUp>, Vec<PowerUp>) = state
        .power_ups
        .drain(..)
        .partition(|power_up| matches!(power_up.revert, Some(revert) if revert.expires_at_ms <= now));
    state.power_ups = pending;

    for power_up in due {
        let Some(revert) = power_up.revert else {
            continue;
        };
        match (power_up.kind, revert.target) {
            (PowerUpKind::SlowBall, _) => {
                state.ball.set_speed(settings.ball_speed);
                state.ball.slowed = false;
                events.push(PhysicsEvent::PowerUpExpired(PowerUpEffect {
                    kind: PowerUpKind::SlowBall,
                    target: None,
                    height: None,
                }));
            }
            (PowerUpKind::PaddleShrink, Some(target)) => {
                let paddle = state.paddle_mut(target);
                paddle.height = settings.paddle_height;
                paddle.clamp_to_court();
                events.push(PhysicsEvent::PowerUpExpired(PowerUpEffect {
                    kind: PowerUpKind::PaddleShrink,
                    target: Some(target),
                    height: Some(settings.paddle_height),
                }));
            }
            (PowerUpKind::PaddleShrink, None) => {
                tracing::warn!("paddle shrink power-up {} expired without a target", power_up.id);
            }
        }
    }
}
