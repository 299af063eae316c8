use crate::timer::{TickControl, TimerHandle, spawn_ticker};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl BreathPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe in",
            Self::HoldIn | Self::HoldOut => "Hold",
            Self::Exhale => "Breathe out",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Inhale => Self::HoldIn,
            Self::HoldIn => Self::Exhale,
            Self::Exhale => Self::HoldOut,
            Self::HoldOut => Self::Inhale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingPattern {
    pub phase_secs: u32,
    pub cycles: u32,
}

impl BreathingPattern {
    /// 4-4-4-4, four rounds.
    pub const SQUARE: Self = Self {
        phase_secs: 4,
        cycles: 4,
    };
}

impl Default for BreathingPattern {
    fn default() -> Self {
        Self::SQUARE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreathingState {
    pub phase: BreathPhase,
    /// Zero-based.
    pub cycle: u32,
    pub total_cycles: u32,
    pub finished: bool,
}

impl BreathingState {
    /// "Cycle 2 of 4"
    pub fn cycle_label(&self) -> String {
        format!("Cycle {} of {}", self.cycle + 1, self.total_cycles)
    }

    fn advance(&mut self) -> TickControl {
        if self.phase == BreathPhase::HoldOut {
            if self.cycle + 1 >= self.total_cycles {
                self.finished = true;
                return TickControl::Stop;
            }
            self.cycle += 1;
        }
        self.phase = self.phase.next();
        TickControl::Continue
    }
}

/// Square-breathing guide; the phase advances once per phase duration.
pub struct Breathing {
    pattern: BreathingPattern,
    state: Arc<Mutex<BreathingState>>,
    timer: Option<TimerHandle<BreathingState>>,
}

impl Breathing {
    pub fn start(pattern: BreathingPattern) -> Self {
        let state = Arc::new(Mutex::new(BreathingState {
            phase: BreathPhase::Inhale,
            cycle: 0,
            total_cycles: pattern.cycles,
            finished: pattern.cycles == 0,
        }));
        let timer = (pattern.cycles > 0).then(|| {
            spawn_ticker(
                Arc::clone(&state),
                Duration::from_secs(u64::from(pattern.phase_secs)),
                BreathingState::advance,
            )
        });
        Self {
            pattern,
            state,
            timer,
        }
    }

    pub fn pattern(&self) -> BreathingPattern {
        self.pattern
    }

    pub fn snapshot(&self) -> BreathingState {
        match self.state.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.snapshot().finished
    }

    pub fn cancel(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }
}
