use crate::timer::{TickControl, TimerHandle, spawn_ticker};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_COUNTDOWN_SECS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownState {
    pub total_secs: u32,
    pub remaining_secs: u32,
    pub running: bool,
    pub completed: bool,
}

impl CountdownState {
    /// `m:ss`
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

/// "Just start" timer: runs immediately, one tick per second, stoppable early.
pub struct Countdown {
    state: Arc<Mutex<CountdownState>>,
    timer: Option<TimerHandle<CountdownState>>,
}

impl Countdown {
    pub fn start(total_secs: u32) -> Self {
        let state = Arc::new(Mutex::new(CountdownState {
            total_secs,
            remaining_secs: total_secs,
            running: total_secs > 0,
            completed: total_secs == 0,
        }));
        let timer = (total_secs > 0).then(|| {
            spawn_ticker(Arc::clone(&state), Duration::from_secs(1), |s: &mut CountdownState| {
                s.remaining_secs = s.remaining_secs.saturating_sub(1);
                if s.remaining_secs == 0 {
                    s.running = false;
                    s.completed = true;
                    return TickControl::Stop;
                }
                TickControl::Continue
            })
        });
        Self { state, timer }
    }

    pub fn snapshot(&self) -> CountdownState {
        match self.state.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.snapshot().completed
    }

    /// "I'm done for now": finishes immediately with the time left on the clock.
    pub fn stop_early(&mut self) {
        self.cancel();
        let mut s = match self.state.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        s.running = false;
        s.completed = true;
    }

    /// Tears the timer down without marking completion.
    pub fn cancel(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        if let Ok(mut s) = self.state.lock() {
            s.running = false;
        }
    }
}
