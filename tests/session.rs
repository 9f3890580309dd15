use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fruitbell::tips::{FALLBACK_TIP, PLACEHOLDER_TIP};
use fruitbell::{
    Action, FruitType, Game, GameBuilder, GameError, GameStatus, Level, Outcome, Screen,
    SessionConfig, SessionHandle, StaticTips, TipError, TipProvider,
};
use tokio::sync::watch;

struct OfflineTips;

impl TipProvider for OfflineTips {
    async fn fetch_tip(&self, _level: Level) -> Result<String, TipError> {
        Err(TipError::NotConfigured("offline"))
    }
}

fn game() -> Game {
    GameBuilder::new().with_seed(3).build().expect("game")
}

fn flips_so_far(handle: &SessionHandle) -> u32 {
    let state = handle.screen().state;
    56 - (state.player_deck + state.ai_deck)
}

#[tokio::test(start_paused = true)]
async fn computer_flips_on_the_level_interval() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    session.act(Action::Start).await?;

    tokio::time::sleep(Duration::from_millis(9_100)).await;
    assert_eq!(flips_so_far(&session), 3);

    // The first tick lands on the player's turn and flips the player's deck.
    let state = session.screen().state;
    assert_eq!((state.player_deck, state.ai_deck), (26, 27));
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn no_flips_outside_of_play() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(flips_so_far(&session), 0);

    session.act(Action::Start).await?;
    session.act(Action::RingBell).await?;
    assert_eq!(session.screen().state.status, GameStatus::GameOver);
    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(flips_so_far(&session), 0);
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn restarting_mid_interval_rearms_a_single_timer() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    session.act(Action::Start).await?;
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    session.act(Action::RingBell).await?;
    session.act(Action::Restart).await?;
    session.act(Action::Start).await?;

    // The old timer would have fired at 3000ms; the new one fires at 4500ms.
    tokio::time::sleep(Duration::from_millis(1_600)).await;
    assert_eq!(flips_so_far(&session), 0);
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(flips_so_far(&session), 1);
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn player_flips_do_not_reset_the_timer() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    session.act(Action::Start).await?;
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    session.act(Action::Flip).await?;
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(flips_so_far(&session), 2);
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rejected_actions_are_reported_and_ignored() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    let before = session.screen().state;
    let err = session.act(Action::Flip).await.expect_err("cannot flip before start");
    assert!(matches!(err, GameError::InvalidTransition { .. }));
    session.send(Action::NextLevel)?;
    tokio::task::yield_now().await;
    assert_eq!(session.screen().state, before);
    session.shutdown().await;
    Ok(())
}

/// Numbers each lookup so repeated fetches for the same level are distinguishable.
#[derive(Clone, Default)]
struct CountingTips {
    calls: Arc<AtomicUsize>,
}

impl CountingTips {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TipProvider for CountingTips {
    async fn fetch_tip(&self, level: Level) -> Result<String, TipError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("tip {level} ({call})"))
    }
}

/// Answers level 1 only after five seconds.
struct SlowFirstLevel;

impl TipProvider for SlowFirstLevel {
    async fn fetch_tip(&self, level: Level) -> Result<String, TipError> {
        if level == Level::FIRST {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(format!("tip {level}"))
    }
}

async fn wait_for_tip(screens: &mut watch::Receiver<Screen>, tip: &str) {
    tokio::time::timeout(
        Duration::from_secs(30),
        screens.wait_for(|screen| screen.tip == tip),
    )
    .await
    .unwrap_or_else(|_| panic!("tip {tip:?} never arrived"))
    .expect("session alive");
}

fn two_level_game() -> Result<Game, GameError> {
    // Level 1 and level 2 both have 5 as their only target.
    GameBuilder::new()
        .with_script([(FruitType::Plum, 5), (FruitType::Banana, 5)])
        .build()
}

#[tokio::test(start_paused = true)]
async fn tips_are_fetched_on_start_and_level_clear_only() -> Result<(), GameError> {
    let tips = CountingTips::default();
    let session = SessionHandle::spawn(two_level_game()?, tips.clone(), SessionConfig::default());
    let mut screens = session.subscribe();
    assert_eq!(screens.borrow().tip, PLACEHOLDER_TIP);

    wait_for_tip(&mut screens, "tip 1 (1)").await;
    assert_eq!(tips.calls(), 1);

    session.act(Action::Start).await?;
    session.act(Action::Flip).await?;
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert_eq!(tips.calls(), 1);

    let outcome = session.act(Action::RingBell).await?;
    assert!(matches!(outcome, Outcome::Rang(ref verdict) if verdict.is_success()));
    assert_eq!(session.screen().state.status, GameStatus::LevelClear);
    wait_for_tip(&mut screens, "tip 1 (2)").await;
    assert_eq!(tips.calls(), 2);

    session.act(Action::NextLevel).await?;
    session.act(Action::Flip).await?;
    session.act(Action::RingBell).await?;
    wait_for_tip(&mut screens, "tip 2 (3)").await;
    assert_eq!(tips.calls(), 3);
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn late_tips_for_an_earlier_level_are_dropped() -> Result<(), GameError> {
    let session = SessionHandle::spawn(two_level_game()?, SlowFirstLevel, SessionConfig::default());
    let mut screens = session.subscribe();

    session.act(Action::Start).await?;
    session.act(Action::Flip).await?;
    session.act(Action::RingBell).await?;
    session.act(Action::NextLevel).await?;
    session.act(Action::Flip).await?;
    session.act(Action::RingBell).await?;
    assert_eq!(session.screen().state.status, GameStatus::LevelClear);
    assert_eq!(session.screen().state.level, Level::new(2)?);
    wait_for_tip(&mut screens, "tip 2").await;

    // Both level 1 lookups finish now, after the session has moved on.
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(session.screen().tip, "tip 2");
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_tips_fall_back_without_touching_the_game() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), OfflineTips, SessionConfig::default());
    let mut screens = session.subscribe();
    screens
        .wait_for(|screen| screen.tip == FALLBACK_TIP)
        .await
        .map_err(|_| GameError::SessionClosed)?;
    assert_eq!(session.screen().state.status, GameStatus::Start);
    session.act(Action::Start).await?;
    assert_eq!(session.screen().state.status, GameStatus::Playing);
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn bell_shows_briefly_after_a_ring() -> Result<(), GameError> {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    session.act(Action::Start).await?;
    session.act(Action::RingBell).await?;
    assert!(session.screen().bell_ringing);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(!session.screen().bell_ringing);
    session.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_the_screen_feed() {
    let session = SessionHandle::spawn(game(), StaticTips::default(), SessionConfig::default());
    let screens = session.subscribe();
    session.shutdown().await;
    assert!(screens.has_changed().is_err());
}
