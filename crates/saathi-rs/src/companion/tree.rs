//! The resilience tree: growth points, stages and the daily check-in.
//!
//! Points come from saved journal entries and from one check-in per
//! calendar day.

use chrono::NaiveDate;
use serde::Serialize;

use super::store::{StoreError, WellnessStore};

/// How grown the tree is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GrowthStage {
    Sapling,
    Growing,
    Strong,
    Flourishing,
}

impl GrowthStage {
    pub fn from_points(points: u32) -> Self {
        match points {
            0..=5 => GrowthStage::Sapling,
            6..=15 => GrowthStage::Growing,
            16..=30 => GrowthStage::Strong,
            _ => GrowthStage::Flourishing,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GrowthStage::Sapling => "Sapling",
            GrowthStage::Growing => "Growing",
            GrowthStage::Strong => "Strong",
            GrowthStage::Flourishing => "Flourishing",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GrowthStage::Sapling => {
                "Your resilience journey has just begun. Keep nurturing your tree!"
            }
            GrowthStage::Growing => {
                "Your tree is growing stronger. Consistent self-care makes a difference."
            }
            GrowthStage::Strong => {
                "Look at that growth! Your tree is becoming a symbol of your strength."
            }
            GrowthStage::Flourishing => {
                "Your resilience tree is flourishing! A testament to your dedication to your well-being."
            }
        }
    }
}

/// Snapshot of a user's tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStatus {
    pub growth_points: u32,
    pub stage: GrowthStage,
    pub checked_in_today: bool,
}

/// Outcome of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    /// False when the user had already checked in on that day.
    pub awarded: bool,
    pub growth_points: u32,
}

pub fn status(
    store: &dyn WellnessStore,
    user_id: &str,
    today: NaiveDate,
) -> Result<TreeStatus, StoreError> {
    let growth_points = store.growth_points(user_id)?;
    Ok(TreeStatus {
        growth_points,
        stage: GrowthStage::from_points(growth_points),
        checked_in_today: store.last_check_in(user_id)? == Some(today),
    })
}

/// Add one growth point and return the new total.
pub fn award_point(store: &dyn WellnessStore, user_id: &str) -> Result<u32, StoreError> {
    store.increment_growth_points(user_id)
}

/// Award the daily check-in point unless `today` was already claimed.
pub fn check_in(
    store: &dyn WellnessStore,
    user_id: &str,
    today: NaiveDate,
) -> Result<CheckIn, StoreError> {
    match store.claim_check_in(user_id, today)? {
        Some(growth_points) => Ok(CheckIn {
            awarded: true,
            growth_points,
        }),
        None => Ok(CheckIn {
            awarded: false,
            growth_points: store.growth_points(user_id)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::store::MemoryStore;
    use std::sync::Arc;
    use std::thread;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn stage_boundaries() {
        assert_eq!(GrowthStage::from_points(0), GrowthStage::Sapling);
        assert_eq!(GrowthStage::from_points(5), GrowthStage::Sapling);
        assert_eq!(GrowthStage::from_points(6), GrowthStage::Growing);
        assert_eq!(GrowthStage::from_points(15), GrowthStage::Growing);
        assert_eq!(GrowthStage::from_points(16), GrowthStage::Strong);
        assert_eq!(GrowthStage::from_points(30), GrowthStage::Strong);
        assert_eq!(GrowthStage::from_points(31), GrowthStage::Flourishing);
    }

    #[test]
    fn check_in_once_per_day() {
        let store = MemoryStore::new();
        let first = check_in(&store, "u1", day(18)).unwrap();
        assert_eq!(
            first,
            CheckIn {
                awarded: true,
                growth_points: 1
            }
        );

        let again = check_in(&store, "u1", day(18)).unwrap();
        assert_eq!(
            again,
            CheckIn {
                awarded: false,
                growth_points: 1
            }
        );

        let next_day = check_in(&store, "u1", day(19)).unwrap();
        assert_eq!(next_day.growth_points, 2);
    }

    #[test]
    fn status_reflects_store() {
        let store = MemoryStore::new();
        store.set_growth_points("u1", 16).unwrap();
        store.set_last_check_in("u1", day(17)).unwrap();

        let s = status(&store, "u1", day(18)).unwrap();
        assert_eq!(s.stage, GrowthStage::Strong);
        assert!(!s.checked_in_today);
        assert!(s.stage.description().starts_with("Look at that growth!"));
    }

    #[test]
    fn concurrent_awards_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        award_point(store.as_ref(), "u1").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.growth_points("u1").unwrap(), 16_000);
    }

    #[test]
    fn racing_check_ins_award_once() {
        for round in 0..200 {
            let store = Arc::new(MemoryStore::new());
            let user = format!("u{round}");
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let store = store.clone();
                    let user = user.clone();
                    thread::spawn(move || check_in(store.as_ref(), &user, day(18)).unwrap())
                })
                .collect();
            let awarded = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|c| c.awarded)
                .count();
            assert_eq!(awarded, 1);
            assert_eq!(store.growth_points(&user).unwrap(), 1);
        }
    }
}
