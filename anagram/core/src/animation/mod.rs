//! Animation Engine - Time-Boxed Tile Transitions
//!
//! Four effects can be scheduled against a tile's visual handle:
//!
//! - **Appear**: opacity ramps 0.1 to 0.9 in nine steps, then settles at 1
//! - **Move**: linear interpolation to the target at a fixed tick, landing
//!   exactly on target in the last step
//! - **Retype**: opacity dips to 0 and back while the glyph is swapped at the
//!   zero-opacity step
//! - **Disappear**: opacity ramps down to 0, then the visual is detached
//!
//! # Architecture
//!
//! ```text
//! Tile ──(AnimationPlan)──> AnimationDriver::start ──> AnimationHandle
//!                                  │
//!                                  ├─ TokioDriver: one task + interval per animation
//!                                  └─ InstantDriver: all steps applied immediately
//! ```
//!
//! A plan is pure data: a step period and the [`FrameOp`]s applied on each
//! step. Every running animation owns its own timer; there is no central
//! clock and no ordering between animations of different tiles.

mod driver;

pub use driver::{AnimationDriver, InstantDriver, TokioDriver};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::geometry::Point;

/// Opacity ramp for [`Effect::Appear`]
const APPEAR_OPACITY: [f32; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Opacity dip for [`Effect::Retype`]; the glyph swaps on the 0.0 entry
const RETYPE_OPACITY: [f32; 10] = [0.8, 0.6, 0.4, 0.2, 0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Opacity ramp for [`Effect::Disappear`]
const DISAPPEAR_OPACITY: [f32; 10] = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0];

/// Timing for tile animations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Total length of each effect
    pub duration: Duration,
    /// Sampling interval of [`Effect::Move`]
    pub move_tick: Duration,
    /// Cancel a tile's in-flight animations before re-targeting it
    pub cancel_superseded: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(100),
            move_tick: Duration::from_millis(10),
            cancel_superseded: false,
        }
    }
}

/// Kind of tile transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Fade in a newly created tile
    Appear,
    /// Slide to a new position
    Move,
    /// Cross-fade to a new letter
    Retype,
    /// Fade out and detach
    Disappear,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Appear => "appear",
            Self::Move => "move",
            Self::Retype => "retype",
            Self::Disappear => "disappear",
        };
        f.write_str(name)
    }
}

/// A single mutation of a tile's visual
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOp {
    /// Set opacity (0.0 = transparent, 1.0 = opaque)
    Opacity(f32),
    /// Set absolute position
    Position(Point),
    /// Replace the displayed letter
    Glyph(char),
    /// Remove the visual from its container
    Detach,
}

/// Step-by-step description of one effect
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationPlan {
    effect: Effect,
    period: Duration,
    steps: Vec<Vec<FrameOp>>,
}

impl AnimationPlan {
    fn opacity_ramp(effect: Effect, duration: Duration, ramp: &[f32]) -> Self {
        let period = duration / u32::try_from(ramp.len()).unwrap_or(u32::MAX).max(1);
        let steps = ramp.iter().map(|o| vec![FrameOp::Opacity(*o)]).collect();
        Self {
            effect,
            period,
            steps,
        }
    }

    /// Fade in from transparent
    #[must_use]
    pub fn appear(config: &AnimationConfig) -> Self {
        let mut plan = Self::opacity_ramp(Effect::Appear, config.duration, &APPEAR_OPACITY);
        plan.steps.push(vec![FrameOp::Opacity(1.0)]);
        plan
    }

    /// Slide from `from` to `to` (absolute points)
    #[must_use]
    pub fn move_to(config: &AnimationConfig, from: Point, to: Point) -> Self {
        let period = config.move_tick.max(Duration::from_millis(1));
        let iterations = (config.duration.as_millis() / period.as_millis()).max(1);
        let iterations = u32::try_from(iterations).unwrap_or(u32::MAX);
        let dx = f64::from(to.x - from.x) / f64::from(iterations);
        let dy = f64::from(to.y - from.y) / f64::from(iterations);

        let mut steps: Vec<Vec<FrameOp>> = (1..=iterations)
            .map(|count| {
                let count = f64::from(count);
                #[allow(clippy::cast_possible_truncation)]
                let pt = Point::new(
                    from.x + (count * dx).floor() as i32,
                    from.y + (count * dy).floor() as i32,
                );
                vec![FrameOp::Position(pt)]
            })
            .collect();
        steps.push(vec![FrameOp::Position(to)]);

        Self {
            effect: Effect::Move,
            period,
            steps,
        }
    }

    /// Cross-fade to `value`
    #[must_use]
    pub fn retype(config: &AnimationConfig, value: char) -> Self {
        let mut plan = Self::opacity_ramp(Effect::Retype, config.duration, &RETYPE_OPACITY);
        for step in &mut plan.steps {
            if step.first() == Some(&FrameOp::Opacity(0.0)) {
                step.push(FrameOp::Glyph(value));
            }
        }
        plan.steps.push(vec![FrameOp::Opacity(1.0)]);
        plan
    }

    /// Fade out, then detach
    #[must_use]
    pub fn disappear(config: &AnimationConfig) -> Self {
        let mut plan = Self::opacity_ramp(Effect::Disappear, config.duration, &DISAPPEAR_OPACITY);
        plan.steps.push(vec![FrameOp::Detach]);
        plan
    }

    /// Effect this plan performs
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Time between consecutive steps
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Operations applied on each step
    #[must_use]
    pub fn steps(&self) -> &[Vec<FrameOp>] {
        &self.steps
    }

    /// Time from the first step to the last
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        let gaps = u32::try_from(self.steps.len().saturating_sub(1)).unwrap_or(u32::MAX);
        self.period * gaps
    }
}

/// Observable state of a tile's visual
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    /// Absolute (document) position
    pub position: Point,
    /// Current opacity
    pub opacity: f32,
    /// Displayed letter
    pub glyph: char,
    /// Whether the visual is still in its container
    pub attached: bool,
}

/// Animation-capable visual handle for one tile
///
/// Clones share state, so animation tasks and the presentation adapter see
/// the same visual.
#[derive(Clone)]
pub struct TileVisual {
    state: Arc<Mutex<VisualState>>,
}

impl TileVisual {
    /// Create an attached, fully transparent visual
    #[must_use]
    pub fn new(glyph: char, position: Point) -> Self {
        Self {
            state: Arc::new(Mutex::new(VisualState {
                position,
                opacity: 0.0,
                glyph,
                attached: true,
            })),
        }
    }

    /// Copy of the current state
    #[must_use]
    pub fn state(&self) -> VisualState {
        *self.state.lock()
    }

    /// Current absolute position
    #[must_use]
    pub fn position(&self) -> Point {
        self.state.lock().position
    }

    /// Current opacity
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.state.lock().opacity
    }

    /// Displayed letter
    #[must_use]
    pub fn glyph(&self) -> char {
        self.state.lock().glyph
    }

    /// Whether the visual is still attached
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    /// Place the visual immediately (direct manipulation)
    pub fn set_position(&self, position: Point) {
        self.state.lock().position = position;
    }

    /// Apply one frame operation
    pub fn apply(&self, op: FrameOp) {
        let mut state = self.state.lock();
        match op {
            FrameOp::Opacity(opacity) => state.opacity = opacity.clamp(0.0, 1.0),
            FrameOp::Position(position) => state.position = position,
            FrameOp::Glyph(glyph) => state.glyph = glyph,
            FrameOp::Detach => state.attached = false,
        }
    }
}

impl fmt::Debug for TileVisual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TileVisual").field(&self.state()).finish()
    }
}

/// Lifecycle of a started animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationStatus {
    /// Steps remain
    Running,
    /// All steps applied on schedule
    Finished,
    /// Cancelled; remaining steps were applied at once
    Cancelled,
}

impl AnimationStatus {
    /// Whether the animation will not apply any more steps
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

struct Playback {
    visual: TileVisual,
    plan: AnimationPlan,
    next: usize,
}

struct Shared {
    playback: Mutex<Playback>,
    status: watch::Sender<AnimationStatus>,
}

/// Handle to a started animation
///
/// Carries the completion signal and the cancellation entry point. Drivers
/// advance the animation with [`step`](Self::step); callers observe it with
/// [`status`](Self::status) and [`wait`](Self::wait).
#[derive(Clone)]
pub struct AnimationHandle {
    effect: Effect,
    shared: Arc<Shared>,
}

impl AnimationHandle {
    /// Prepare `plan` to run against `visual`; no step is applied yet
    #[must_use]
    pub fn new(visual: TileVisual, plan: AnimationPlan) -> Self {
        let (status, _) = watch::channel(AnimationStatus::Running);
        Self {
            effect: plan.effect(),
            shared: Arc::new(Shared {
                playback: Mutex::new(Playback {
                    visual,
                    plan,
                    next: 0,
                }),
                status,
            }),
        }
    }

    /// Effect being played
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Step period of the underlying plan
    #[must_use]
    pub fn period(&self) -> Duration {
        self.shared.playback.lock().plan.period()
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> AnimationStatus {
        *self.shared.status.borrow()
    }

    /// Whether no more steps will be applied
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Apply the next step
    ///
    /// Returns `true` while more steps remain. After the last step, or once
    /// the animation was cancelled, returns `false`.
    pub fn step(&self) -> bool {
        let mut playback = self.shared.playback.lock();
        if self.is_finished() {
            return false;
        }
        if let Some(ops) = playback.plan.steps.get(playback.next).cloned() {
            for op in ops {
                playback.visual.apply(op);
            }
            playback.next += 1;
        }
        if playback.next >= playback.plan.steps.len() {
            self.shared.status.send_replace(AnimationStatus::Finished);
            return false;
        }
        true
    }

    /// Apply every remaining step now
    pub fn finish_now(&self) {
        while self.step() {}
    }

    /// Cancel the animation
    ///
    /// The timer stops and the remaining steps are applied at once so the
    /// visual lands in the effect's end state. Returns `false` if the
    /// animation had already completed.
    pub fn cancel(&self) -> bool {
        let mut playback = self.shared.playback.lock();
        if self.is_finished() {
            return false;
        }
        let next = playback.next;
        let remaining = playback.plan.steps.split_off(next);
        for op in remaining.into_iter().flatten() {
            playback.visual.apply(op);
        }
        playback.next = playback.plan.steps.len();
        self.shared.status.send_replace(AnimationStatus::Cancelled);
        true
    }

    /// Wait until the animation finishes or is cancelled
    pub async fn wait(&self) -> AnimationStatus {
        let mut rx = self.shared.status.subscribe();
        let status = rx
            .wait_for(|status| status.is_terminal())
            .await
            .map(|status| *status);
        status.unwrap_or_else(|_| self.status())
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("effect", &self.effect)
            .field("status", &self.status())
            .finish()
    }
}
