//! One-shot pattern playback on a worker thread.
//!
//! The worker writes each step, then sleeps on a condvar for the step's
//! duration so [`Playback::stop`] can cut it short. The step write happens
//! with the state lock held: once `stop` returns, the worker has written
//! its last value.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::app::led_info::LedInfo;
use crate::app::ports::LedPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    /// Interrupted by [`Playback::stop`].
    Stopped,
    /// Played every step of every repeat.
    Completed,
}

pub struct Playback {
    state: Mutex<PlaybackState>,
    wake: Condvar,
}

impl Playback {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlaybackState::Running),
            wake: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> PlaybackState {
        *self.lock()
    }

    /// Interrupt a running playback. Returns `true` if it was running.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if *state != PlaybackState::Running {
            return false;
        }
        *state = PlaybackState::Stopped;
        self.wake.notify_all();
        true
    }

    /// Play `info` to the end or until stopped. Blocks the calling thread.
    pub fn run(&self, info: &LedInfo, port: &dyn LedPort) -> PlaybackState {
        let steps = info.steps().unwrap_or(&[]);
        for _ in 0..info.repeat_count() {
            for step in steps {
                let state = self.lock();
                if *state != PlaybackState::Running {
                    return *state;
                }
                port.set_led(&info.step_state(step));
                let (state, _) = self
                    .wake
                    .wait_timeout_while(
                        state,
                        Duration::from_millis(u64::from(step.duration_ms)),
                        |s| *s == PlaybackState::Running,
                    )
                    .unwrap_or_else(PoisonError::into_inner);
                if *state != PlaybackState::Running {
                    return *state;
                }
            }
        }

        let mut state = self.lock();
        if *state == PlaybackState::Running {
            *state = PlaybackState::Completed;
        }
        *state
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}
