//! Cancellable fixed-period tick scheduler for exercise widgets.
//!
//! The tick callback and `cancel` serialize on the widget's state mutex, so once
//! `cancel` returns no further tick can observe or mutate that state.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

pub struct TimerHandle<S> {
    state: Arc<Mutex<S>>,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<S> TimerHandle<S> {
    pub fn cancel(&mut self) {
        {
            // Held (even if poisoned) so an in-flight tick finishes first.
            let _guard = self.state.lock();
            self.token.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the ticker stopped itself, was cancelled, or panicked.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }
}

impl<S> Drop for TimerHandle<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runs `on_tick` every `period`, first after one full period, until it
/// returns [`TickControl::Stop`] or the handle is cancelled or dropped.
pub fn spawn_ticker<S, F>(state: Arc<Mutex<S>>, period: Duration, mut on_tick: F) -> TimerHandle<S>
where
    S: Send + 'static,
    F: FnMut(&mut S) -> TickControl + Send + 'static,
{
    let token = CancellationToken::new();
    let task_token = token.clone();
    let task_state = Arc::clone(&state);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => break,
                _ = ticker.tick() => {
                    if run_tick(&task_state, &task_token, &mut on_tick) == TickControl::Stop {
                        break;
                    }
                }
            }
        }
        tracing::trace!(cancelled = task_token.is_cancelled(), "ticker exited");
    });

    TimerHandle {
        state,
        token,
        task: Some(task),
    }
}

fn run_tick<S, F>(state: &Mutex<S>, token: &CancellationToken, on_tick: &mut F) -> TickControl
where
    F: FnMut(&mut S) -> TickControl,
{
    let Ok(mut guard) = state.lock() else {
        tracing::warn!("exercise state lock poisoned; stopping ticker");
        return TickControl::Stop;
    };
    if token.is_cancelled() {
        return TickControl::Stop;
    }
    on_tick(&mut *guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(state: &Arc<Mutex<u32>>) -> u32 {
        *state.lock().expect("state lock")
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_until_stopped() {
        let state = Arc::new(Mutex::new(0u32));
        let handle = spawn_ticker(Arc::clone(&state), Duration::from_secs(1), |n| {
            *n += 1;
            if *n == 3 {
                TickControl::Stop
            } else {
                TickControl::Continue
            }
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(count(&state), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count(&state), 3);
        assert!(handle.is_finished());
        assert!(!handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_later_ticks() {
        let state = Arc::new(Mutex::new(0u32));
        let mut handle = spawn_ticker(Arc::clone(&state), Duration::from_secs(1), |n| {
            *n += 1;
            TickControl::Continue
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.cancel();
        let at_cancel = count(&state);
        assert_eq!(at_cancel, 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count(&state), at_cancel);
        assert!(handle.is_cancelled());
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let state = Arc::new(Mutex::new(0u32));
        let handle = spawn_ticker(Arc::clone(&state), Duration::from_secs(1), |n| {
            *n += 1;
            TickControl::Continue
        });
        drop(handle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count(&state), 0);
    }
}
