//! Timer that flips cards on behalf of the computer.
//!
//! The driver keeps at most one timer task alive. Every time the status or level
//! changes the old task is aborted and, if the game is being played, a new one is
//! spawned with a fresh epoch. Ticks carry their epoch so a tick that was queued just
//! before a re-arm is recognised as stale and dropped.

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::level::{Level, level_config};
use crate::state::{GameState, GameStatus};

/// One timer firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AiTick {
    pub epoch: u64,
}

struct Armed {
    epoch: u64,
    task: JoinHandle<()>,
}

pub struct AiDriver<T> {
    sink: WeakUnboundedSender<T>,
    wrap: fn(AiTick) -> T,
    epoch: u64,
    watched: Option<(GameStatus, Level)>,
    armed: Option<Armed>,
}

impl<T: Send + 'static> AiDriver<T> {
    /// Ticks are delivered to `sink` after being wrapped by `wrap`.
    pub fn new(sink: WeakUnboundedSender<T>, wrap: fn(AiTick) -> T) -> Self {
        Self {
            sink,
            wrap,
            epoch: 0,
            watched: None,
            armed: None,
        }
    }

    /// Matches the timer to `state`: re-armed on a status or level change, stopped
    /// outside of play. Must run inside a tokio runtime.
    pub fn sync(&mut self, state: &GameState) {
        let key = (state.status, state.level);
        if self.watched == Some(key) {
            return;
        }
        self.watched = Some(key);
        self.stop();
        if state.is_playing() {
            self.arm(state.level);
        }
    }

    /// Whether `tick` comes from the timer that is currently armed.
    pub fn accepts(&self, tick: AiTick) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|armed| armed.epoch == tick.epoch)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
            debug!(epoch = armed.epoch, "ai timer stopped");
        }
    }

    fn arm(&mut self, level: Level) {
        self.epoch += 1;
        let epoch = self.epoch;
        let period = level_config(level).ai_flip_interval();
        let sink = self.sink.clone();
        let wrap = self.wrap;
        // Measured from arming, not from whenever the task is first polled.
        let start = Instant::now() + period;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inbox) = sink.upgrade() else { break };
                if inbox.send(wrap(AiTick { epoch })).is_err() {
                    break;
                }
            }
        });
        debug!(epoch, level = %level, period_ms = period.as_millis() as u64, "ai timer armed");
        self.armed = Some(Armed { epoch, task });
    }
}

impl<T> Drop for AiDriver<T> {
    fn drop(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    fn playing(level: Level) -> GameState {
        GameState {
            level,
            status: GameStatus::Playing,
            ..GameState::initial(0, "")
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AiTick>) -> Vec<AiTick> {
        let mut ticks = Vec::new();
        while let Ok(tick) = rx.try_recv() {
            ticks.push(tick);
        }
        ticks
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = AiDriver::new(tx.downgrade(), |tick| tick);
        driver.sync(&playing(Level::FIRST));
        tokio::time::sleep(Duration::from_millis(9_100)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 9_100 / 3_000);
        assert!(ticks.iter().all(|tick| driver.accepts(*tick)));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_counts_from_arming_not_first_poll() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = AiDriver::new(tx.downgrade(), |tick| tick);
        driver.sync(&playing(Level::FIRST));
        // The clock moves on before the timer task gets its first poll.
        tokio::time::advance(Duration::from_millis(2_000)).await;
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_mid_interval_never_double_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = AiDriver::new(tx.downgrade(), |tick| tick);
        driver.sync(&playing(Level::FIRST));
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let level_two = Level::new(2).expect("valid level");
        driver.sync(&playing(level_two));
        // Level 2 flips every 2950ms, counted from the re-arm at 1500ms.
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 1);
        assert!(driver.accepts(ticks[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn same_status_and_level_keeps_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = AiDriver::new(tx.downgrade(), |tick| tick);
        let state = playing(Level::FIRST);
        driver.sync(&state);
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        driver.sync(&GameState {
            player_deck: 27,
            ..state
        });
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_outside_of_play() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = AiDriver::new(tx.downgrade(), |tick| tick);
        let state = playing(Level::FIRST);
        driver.sync(&state);
        let stale = AiTick { epoch: 1 };
        assert!(driver.accepts(stale));
        driver.sync(&GameState {
            status: GameStatus::GameOver,
            ..state
        });
        assert!(!driver.is_armed());
        assert!(!driver.accepts(stale));
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert!(drain(&mut rx).is_empty());
    }
}
