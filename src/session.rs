//! Live game session.
//!
//! A session is one tokio task owning the [`Game`]. User actions, AI timer ticks,
//! finished tip lookups and bell-feedback expiry all arrive on one channel and are
//! handled one at a time, so transitions never interleave. After every change the
//! task publishes a [`Screen`] on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::action::Action;
use crate::driver::{AiDriver, AiTick};
use crate::error::GameError;
use crate::game::{Game, Outcome};
use crate::level::Level;
use crate::state::{GameState, GameStatus};
use crate::tips::{DEFAULT_TIP_TIMEOUT, PLACEHOLDER_TIP, TipProvider, tip_or_fallback};

pub const BELL_FEEDBACK: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Upper bound on a single tip lookup.
    pub tip_timeout: Duration,
    /// How long the bell shows as ringing after an accepted ring.
    pub bell_feedback: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tip_timeout: DEFAULT_TIP_TIMEOUT,
            bell_feedback: BELL_FEEDBACK,
        }
    }
}

/// Everything a front end needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub state: GameState,
    pub tip: String,
    pub bell_ringing: bool,
}

enum Command {
    Act {
        action: Action,
        reply: Option<oneshot::Sender<Result<Outcome, GameError>>>,
    },
    AiTick(AiTick),
    Tip {
        level: Level,
        text: String,
    },
    BellQuiet {
        ring: u64,
    },
    Shutdown,
}

/// Handle to a running session. Dropping it ends the session.
pub struct SessionHandle {
    commands: UnboundedSender<Command>,
    screens: watch::Receiver<Screen>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Spawns the session task on the current tokio runtime.
    pub fn spawn<P: TipProvider>(game: Game, tips: P, config: SessionConfig) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let screen = Screen {
            state: game.snapshot(),
            tip: PLACEHOLDER_TIP.to_string(),
            bell_ringing: false,
        };
        let (screen_tx, screens) = watch::channel(screen);
        let weak = commands.downgrade();
        let session = Session {
            game,
            tips: Arc::new(tips),
            config,
            driver: AiDriver::new(weak.clone(), Command::AiTick),
            inbox_tx: weak,
            screens: screen_tx,
            tip: PLACEHOLDER_TIP.to_string(),
            tip_for: None,
            watched: None,
            bell_ringing: false,
            rings: 0,
        };
        let task = tokio::spawn(session.run(inbox));
        Self {
            commands,
            screens,
            task,
        }
    }

    /// Applies `action` and waits for the engine's answer.
    pub async fn act(&self, action: Action) -> Result<Outcome, GameError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(Command::Act {
                action,
                reply: Some(reply),
            })
            .map_err(|_| GameError::SessionClosed)?;
        answer.await.map_err(|_| GameError::SessionClosed)?
    }

    /// Queues `action` without waiting. Rejected actions are ignored.
    pub fn send(&self, action: Action) -> Result<(), GameError> {
        self.commands
            .send(Command::Act {
                action,
                reply: None,
            })
            .map_err(|_| GameError::SessionClosed)
    }

    pub fn screen(&self) -> Screen {
        self.screens.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Screen> {
        self.screens.clone()
    }

    /// Stops the AI timer and waits for the session task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(err) = self.task.await {
            debug!(error = %err, "session task ended abnormally");
        }
    }
}

struct Session<P> {
    game: Game,
    tips: Arc<P>,
    config: SessionConfig,
    driver: AiDriver<Command>,
    inbox_tx: WeakUnboundedSender<Command>,
    screens: watch::Sender<Screen>,
    tip: String,
    /// Level whose tip is currently wanted; stale answers are dropped.
    tip_for: Option<Level>,
    watched: Option<(GameStatus, Level)>,
    bell_ringing: bool,
    rings: u64,
}

impl<P: TipProvider> Session<P> {
    async fn run(mut self, mut inbox: UnboundedReceiver<Command>) {
        self.after_transition();
        while let Some(command) = inbox.recv().await {
            match command {
                Command::Act { action, reply } => {
                    let result = self.game.apply(action);
                    match &result {
                        Ok(outcome) => {
                            if matches!(outcome, Outcome::Rang(_)) {
                                self.ring_feedback();
                            }
                            self.after_transition();
                        }
                        Err(err) => debug!(error = %err, "ignored action"),
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                Command::AiTick(tick) => {
                    if !self.driver.accepts(tick) {
                        debug!(epoch = tick.epoch, "dropped stale ai tick");
                        continue;
                    }
                    match self.game.flip() {
                        Ok(_) => self.after_transition(),
                        Err(err) => debug!(error = %err, "ai flip ignored"),
                    }
                }
                Command::Tip { level, text } => {
                    if self.tip_for == Some(level) {
                        self.tip = text;
                        self.publish();
                    }
                }
                Command::BellQuiet { ring } => {
                    if ring == self.rings {
                        self.bell_ringing = false;
                        self.publish();
                    }
                }
                Command::Shutdown => break,
            }
        }
        self.driver.stop();
        debug!("session ended");
    }

    fn after_transition(&mut self) {
        let key = (self.game.status(), self.game.level());
        if self.watched != Some(key) {
            self.watched = Some(key);
            let (status, level) = key;
            if matches!(status, GameStatus::Start | GameStatus::LevelClear) {
                self.request_tip(level);
            }
        }
        self.driver.sync(self.game.state());
        self.publish();
    }

    fn request_tip(&mut self, level: Level) {
        self.tip_for = Some(level);
        let tips = Arc::clone(&self.tips);
        let inbox = self.inbox_tx.clone();
        let timeout = self.config.tip_timeout;
        tokio::spawn(async move {
            let text = tip_or_fallback(tips.as_ref(), level, timeout).await;
            if let Some(inbox) = inbox.upgrade() {
                let _ = inbox.send(Command::Tip { level, text });
            }
        });
    }

    fn ring_feedback(&mut self) {
        self.rings += 1;
        self.bell_ringing = true;
        let ring = self.rings;
        let inbox = self.inbox_tx.clone();
        let delay = self.config.bell_feedback;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inbox) = inbox.upgrade() {
                let _ = inbox.send(Command::BellQuiet { ring });
            }
        });
    }

    fn publish(&self) {
        self.screens.send_replace(Screen {
            state: self.game.snapshot(),
            tip: self.tip.clone(),
            bell_ringing: self.bell_ringing,
        });
    }
}
