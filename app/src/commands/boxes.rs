//! Reward box commands

use super::achievements::refresh_achievements;
use crate::AppState;
use chrono::{DateTime, Utc};
use lootinyang_core::{BoxTier, OpenBoxOutcome, Result, RewardBox};
use lootinyang_engine::{generate_items, RandomSource};
use lootinyang_persistence::sqlite;
use tracing::info;

/// A user's boxes, newest first
pub async fn list_boxes(state: &AppState, user_id: &str, only_unopened: bool) -> Result<Vec<RewardBox>> {
    sqlite::list_reward_boxes(state.db.pool(), user_id, only_unopened).await
}

/// Issue a box outside the check-in flow (gifts and events)
pub async fn grant_box(state: &AppState, user_id: &str, tier: BoxTier, now: DateTime<Utc>) -> Result<RewardBox> {
    let reward_box = sqlite::create_reward_box(state.db.pool(), user_id, tier, now).await?;
    info!(user_id, box_id = reward_box.id, %tier, "box granted");
    state.notifications.notify_box_issued(&reward_box).await;
    Ok(reward_box)
}

/// Open one of the user's boxes.
///
/// Items are drawn from `rng` and stored together with the opened flag in a
/// single update. Boxes of other users read as `NotFound`.
pub async fn open_box<R: RandomSource + ?Sized>(
    state: &AppState,
    user_id: &str,
    box_id: i64,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<OpenBoxOutcome> {
    let pool = state.db.pool();
    let reward_box = match sqlite::get_reward_box(pool, box_id).await? {
        Some(b) if b.user_id == user_id => b,
        _ => return Ok(OpenBoxOutcome::NotFound { box_id }),
    };
    if reward_box.opened {
        return Ok(OpenBoxOutcome::AlreadyOpened {
            box_id,
            opened_at: reward_box.opened_at,
        });
    }

    let items = generate_items(reward_box.tier, rng)?;
    let outcome = sqlite::open_reward_box(pool, box_id, &items, now).await?;

    if let OpenBoxOutcome::Opened(opened) = &outcome {
        info!(user_id, box_id, tier = %opened.tier, items = opened.items.len(), "box opened");
        state.notifications.notify_box_opened(box_id, &opened.items).await;
        refresh_achievements(state, user_id, now.date_naive(), now).await?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lootinyang_core::Rarity;
    use lootinyang_engine::{RngSource, SequenceSource};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_open_box_once() {
        let state = AppState::in_memory().await.unwrap();
        let granted = grant_box(&state, "u1", BoxTier::Daily, at()).await.unwrap();
        let mut rng = SequenceSource::new(vec![0.0]);

        let outcome = open_box(&state, "u1", granted.id, &mut rng, at()).await.unwrap();
        let opened = match outcome {
            OpenBoxOutcome::Opened(b) => b,
            other => panic!("expected Opened, got {:?}", other),
        };
        assert_eq!(opened.items.len(), 1);
        assert_eq!(opened.items[0].rarity, Rarity::Common);

        let again = open_box(&state, "u1", granted.id, &mut rng, at()).await.unwrap();
        assert_eq!(again, OpenBoxOutcome::AlreadyOpened { box_id: granted.id, opened_at: Some(at()) });
        assert!(list_boxes(&state, "u1", true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_or_missing_box_not_found() {
        let state = AppState::in_memory().await.unwrap();
        let granted = grant_box(&state, "u1", BoxTier::Weekly, at()).await.unwrap();
        let mut rng = RngSource::seeded(1);

        let foreign = open_box(&state, "u2", granted.id, &mut rng, at()).await.unwrap();
        assert_eq!(foreign, OpenBoxOutcome::NotFound { box_id: granted.id });
        let missing = open_box(&state, "u1", 999, &mut rng, at()).await.unwrap();
        assert_eq!(missing, OpenBoxOutcome::NotFound { box_id: 999 });
    }

    #[tokio::test]
    async fn test_tenth_open_unlocks_achievement() {
        let state = AppState::in_memory().await.unwrap();
        let mut rng = RngSource::seeded(42);

        for n in 1..=10 {
            let granted = grant_box(&state, "u1", BoxTier::Monthly, at()).await.unwrap();
            let outcome = open_box(&state, "u1", granted.id, &mut rng, at()).await.unwrap();
            if let OpenBoxOutcome::Opened(b) = outcome {
                assert_eq!(b.items.len(), 3);
            }
            let unlocked = sqlite::unlocked_achievement_ids(state.db.pool(), "u1").await.unwrap();
            assert_eq!(unlocked.contains("open_10_boxes"), n == 10);
        }
    }
}
