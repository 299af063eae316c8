use crate::timer::{TickControl, TimerHandle, spawn_ticker};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BURN_DURATION: Duration = Duration::from_millis(1500);
pub const RELEASE_NOTICE: &str = "This won't be saved. It's just for you, right now.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseState {
    pub text: String,
    pub burning: bool,
    pub burns: u32,
}

/// Write-then-discard journal. The buffer only ever lives in memory.
pub struct ReleasePad {
    state: Arc<Mutex<ReleaseState>>,
    timer: Option<TimerHandle<ReleaseState>>,
}

impl ReleasePad {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ReleaseState::default())),
            timer: None,
        }
    }

    pub fn snapshot(&self) -> ReleaseState {
        match self.state.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the draft. Ignored while a burn is in progress.
    pub fn write(&mut self, text: impl Into<String>) {
        if let Ok(mut s) = self.state.lock() {
            if !s.burning {
                s.text = text.into();
            }
        }
    }

    /// Starts burning the draft; returns false for blank text or a burn already running.
    pub fn burn(&mut self) -> bool {
        {
            let Ok(mut s) = self.state.lock() else {
                return false;
            };
            if s.burning || s.text.trim().is_empty() {
                return false;
            }
            s.burning = true;
        }
        self.timer = Some(spawn_ticker(
            Arc::clone(&self.state),
            BURN_DURATION,
            |s: &mut ReleaseState| {
                s.text.clear();
                s.burning = false;
                s.burns += 1;
                TickControl::Stop
            },
        ));
        true
    }

    pub fn cancel(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        if let Ok(mut s) = self.state.lock() {
            s.text.clear();
            s.burning = false;
        }
    }
}

impl Default for ReleasePad {
    fn default() -> Self {
        Self::new()
    }
}
