//! Entrance animation
//!
//! A single-shot angular sweep: `Idle -> Animating { progress } -> Settled`.
//! The state machine is independent of rendering and of time sources; the
//! driver ticks it from one tokio task and publishes every frame on a watch
//! channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::constants::chart::{DEFAULT_ANIMATION_MS, FRAME_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AnimationState {
    Idle,
    Animating { progress: f64 },
    Settled,
}

impl AnimationState {
    pub fn progress(&self) -> f64 {
        match self {
            AnimationState::Idle => 0.0,
            AnimationState::Animating { progress } => *progress,
            AnimationState::Settled => 1.0,
        }
    }

    /// Clip sweep in degrees
    pub fn sweep_deg(&self) -> f64 {
        self.progress() * 360.0
    }

    /// Hit-testing and hover only apply once the sweep is done.
    pub fn is_interactive(&self) -> bool {
        matches!(self, AnimationState::Settled)
    }
}

#[derive(Debug, Clone)]
pub struct EntranceAnimation {
    state: AnimationState,
    duration: Duration,
    started_at: Option<Instant>,
}

impl Default for EntranceAnimation {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_ANIMATION_MS))
    }
}

impl EntranceAnimation {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: AnimationState::Idle,
            duration,
            started_at: None,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Start the sweep. Returns `false` if it already ran or is running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != AnimationState::Idle {
            return false;
        }
        self.started_at = Some(now);
        self.state = if self.duration.is_zero() {
            AnimationState::Settled
        } else {
            AnimationState::Animating { progress: 0.0 }
        };
        true
    }

    /// Advance to `now`. Progress never goes backwards.
    pub fn tick(&mut self, now: Instant) -> AnimationState {
        let (AnimationState::Animating { progress: previous }, Some(started_at)) =
            (self.state, self.started_at)
        else {
            return self.state;
        };

        let elapsed = now.saturating_duration_since(started_at);
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64())
            .clamp(0.0, 1.0)
            .max(previous);

        self.state = if progress >= 1.0 {
            AnimationState::Settled
        } else {
            AnimationState::Animating { progress }
        };
        self.state
    }

    /// Jump straight to the settled state.
    pub fn finish(&mut self) {
        self.state = AnimationState::Settled;
    }
}

/// Drives an [`EntranceAnimation`] at a fixed frame interval.
///
/// The ticker stops on its own once settled; [`AnimationDriver::stop`]
/// cancels it early and dropping the driver does the same.
pub struct AnimationDriver {
    animation: Arc<Mutex<EntranceAnimation>>,
    frames: watch::Receiver<AnimationState>,
    ticker: Option<JoinHandle<()>>,
}

impl AnimationDriver {
    pub fn start(duration: Duration) -> Self {
        Self::start_with_interval(duration, Duration::from_millis(FRAME_INTERVAL_MS))
    }

    pub fn start_with_interval(duration: Duration, frame_interval: Duration) -> Self {
        let mut animation = EntranceAnimation::new(duration);
        animation.start(Instant::now());
        let initial = animation.state();

        let animation = Arc::new(Mutex::new(animation));
        let (tx, frames) = watch::channel(initial);

        let ticker = (!initial.is_interactive()).then(|| {
            let animation = Arc::clone(&animation);
            tokio::spawn(async move {
                let mut interval = time::interval(frame_interval);
                loop {
                    interval.tick().await;
                    let state = match animation.lock() {
                        Ok(mut guard) => guard.tick(Instant::now()),
                        Err(_) => break,
                    };
                    if tx.send(state).is_err() || state.is_interactive() {
                        break;
                    }
                }
                debug!("Chart animation ticker finished");
            })
        });

        Self {
            animation,
            frames,
            ticker,
        }
    }

    pub fn state(&self) -> AnimationState {
        *self.frames.borrow()
    }

    /// Receiver of every published frame
    pub fn subscribe(&self) -> watch::Receiver<AnimationState> {
        self.frames.clone()
    }

    /// Wait until the animation settles or the ticker stops.
    pub async fn settled(&self) -> AnimationState {
        let mut frames = self.frames.clone();
        match frames.wait_for(|s| s.is_interactive()).await {
            Ok(state) => *state,
            Err(_) => self.current(),
        }
    }

    /// Cancel the ticker. The state stays where it was.
    pub fn stop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn current(&self) -> AnimationState {
        self.animation
            .lock()
            .map(|a| a.state())
            .unwrap_or(AnimationState::Settled)
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
