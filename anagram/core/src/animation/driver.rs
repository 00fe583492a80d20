//! Animation Drivers
//!
//! A driver turns an [`AnimationPlan`] into a running animation. The tokio
//! driver gives every animation its own task and interval timer; the instant
//! driver applies the whole plan synchronously.

use std::fmt;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::{AnimationHandle, AnimationPlan, TileVisual};

/// Starts animations against tile visuals
pub trait AnimationDriver: Send + Sync + fmt::Debug {
    /// Start playing `plan` on `visual`; must not block
    fn start(&self, visual: &TileVisual, plan: AnimationPlan) -> AnimationHandle;
}

/// Plays each animation on its own tokio task
///
/// The first step is applied before `start` returns; the rest follow on the
/// plan's period. Outside a tokio runtime the plan is applied at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDriver;

impl TokioDriver {
    /// Create a tokio driver
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AnimationDriver for TokioDriver {
    fn start(&self, visual: &TileVisual, plan: AnimationPlan) -> AnimationHandle {
        let handle = AnimationHandle::new(visual.clone(), plan);
        if !handle.step() {
            return handle;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(run_timer(handle.clone()));
            }
            Err(_) => {
                tracing::warn!(
                    effect = %handle.effect(),
                    "No tokio runtime for animation, applying immediately"
                );
                handle.finish_now();
            }
        }
        handle
    }
}

async fn run_timer(handle: AnimationHandle) {
    let mut interval = tokio::time::interval(handle.period().max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; step one was applied by `start`
    interval.tick().await;

    loop {
        interval.tick().await;
        if !handle.step() {
            break;
        }
    }
    tracing::trace!(effect = %handle.effect(), status = ?handle.status(), "Animation ended");
}

/// Applies every step synchronously
///
/// Useful headless and in tests: the visual is in its end state as soon as
/// `start` returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantDriver;

impl AnimationDriver for InstantDriver {
    fn start(&self, visual: &TileVisual, plan: AnimationPlan) -> AnimationHandle {
        let handle = AnimationHandle::new(visual.clone(), plan);
        handle.finish_now();
        handle
    }
}
