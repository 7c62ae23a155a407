//! Initiative roller: d20 per unlocked creature, then a stable re-sort that
//! keeps locked creatures anchored at their positions.
//!
//! Also holds the `Idle | Rolling` phase machine that stands in for the
//! host's one-second "rolling" animation: a roll is requested, and applied
//! by a later settle call once its deadline has passed.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::tracker::creature::CreatureId;
use crate::tracker::history::{HistoryEntry, RolledCreature};
use crate::tracker::store::CreatureStore;

/// Source of die results.
pub trait Dice {
    /// Uniform result in `1..=sides`.
    fn roll(&mut self, sides: u32) -> i32;
}

/// Dice backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn roll(&mut self, sides: u32) -> i32 {
        let sides = i32::try_from(sides.max(1)).unwrap_or(i32::MAX);
        rand::thread_rng().gen_range(1..=sides)
    }
}

/// Dice backed by any caller-owned RNG (seeded in tests).
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl<R: Rng> Dice for RngDice<R> {
    fn roll(&mut self, sides: u32) -> i32 {
        let sides = i32::try_from(sides.max(1)).unwrap_or(i32::MAX);
        self.0.gen_range(1..=sides)
    }
}

/// Roll initiative for every unlocked creature and re-sort the store.
///
/// Unlocked creatures are stably sorted with non-defeated ahead of defeated
/// and higher initiative first. Locked creatures keep both their initiative
/// and their index; the sorted unlocked creatures fill the remaining slots
/// in order.
pub fn roll_initiative(
    store: &mut CreatureStore,
    dice: &mut dyn Dice,
    sides: u32,
    timestamp: u64,
) -> HistoryEntry {
    let order: Vec<CreatureId> = store.order().to_vec();

    for &id in &order {
        if let Some(creature) = store.get_mut(id) {
            if !creature.is_locked {
                creature.initiative = dice.roll(sides).saturating_add(creature.initiative_bonus);
            }
        }
    }

    let mut unlocked: Vec<(CreatureId, bool, i32)> = order
        .iter()
        .filter_map(|&id| store.get(id))
        .filter(|c| !c.is_locked)
        .map(|c| (c.id, c.is_defeated(), c.initiative))
        .collect();
    // sort_by is stable: ties keep their pre-roll relative order
    unlocked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| b.2.cmp(&a.2)));

    let mut queue = unlocked.into_iter().map(|(id, _, _)| id);
    let recomposed: Vec<CreatureId> = order
        .iter()
        .map(|&id| match store.get(id) {
            Some(c) if c.is_locked => id,
            _ => queue.next().unwrap_or(id),
        })
        .collect();
    store.set_order(recomposed);

    let entry = HistoryEntry {
        timestamp,
        order: store
            .iter()
            .map(|c| RolledCreature {
                name: c.name.clone(),
                initiative: c.initiative,
            })
            .collect(),
    };
    info!(creatures = entry.order.len(), timestamp, "rolled initiative");
    entry
}

/// Re-entrancy guard around a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RollPhase {
    #[default]
    Idle,
    #[serde(rename_all = "camelCase")]
    Rolling { requested_at: u64, ready_at: u64 },
}

impl RollPhase {
    pub fn is_rolling(&self) -> bool {
        matches!(self, RollPhase::Rolling { .. })
    }

    /// Enter `Rolling`. Rejected while a roll is already pending.
    pub fn begin(&mut self, now: u64, delay_ms: u64) -> Result<u64, TrackerError> {
        if self.is_rolling() {
            return Err(TrackerError::RollInProgress);
        }
        let ready_at = now.saturating_add(delay_ms);
        *self = RollPhase::Rolling {
            requested_at: now,
            ready_at,
        };
        debug!(now, ready_at, "roll requested");
        Ok(ready_at)
    }

    /// Whether a pending roll is due at `now`. Errors when idle.
    pub fn is_due(&self, now: u64) -> Result<bool, TrackerError> {
        match *self {
            RollPhase::Idle => Err(TrackerError::NoRollPending),
            RollPhase::Rolling { ready_at, .. } => Ok(now >= ready_at),
        }
    }

    pub fn finish(&mut self) {
        *self = RollPhase::Idle;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tracker::creature::{CreatureField, CreatureTemplate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;

    /// Replays a fixed sequence of die results, then repeats the last one.
    pub(crate) struct FixedDice(pub VecDeque<i32>, pub i32);

    impl FixedDice {
        pub(crate) fn new(draws: &[i32]) -> Self {
            Self(draws.iter().copied().collect(), draws.last().copied().unwrap_or(1))
        }
    }

    impl Dice for FixedDice {
        fn roll(&mut self, _sides: u32) -> i32 {
            self.0.pop_front().unwrap_or(self.1)
        }
    }

    fn add_with_ac(store: &mut CreatureStore, name: &str, hp: i32, ac: i32, bonus: i32) -> CreatureId {
        let t = CreatureTemplate::parse(
            name,
            &hp.to_string(),
            &ac.to_string(),
            &bonus.to_string(),
            "",
        )
        .unwrap();
        store.add(&t, 1)[0]
    }

    fn add(store: &mut CreatureStore, name: &str, hp: i32, bonus: i32) -> CreatureId {
        add_with_ac(store, name, hp, 12, bonus)
    }

    fn names(store: &CreatureStore) -> Vec<String> {
        store.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn goblin_scenario() {
        let mut store = CreatureStore::new();
        let goblin = add_with_ac(&mut store, "Goblin", 7, 13, 2);
        let c = store.get(goblin).unwrap();
        assert_eq!((c.max_hp, c.current_hp, c.ac, c.initiative_bonus, c.initiative), (7, 7, 13, 2, 0));

        roll_initiative(&mut store, &mut FixedDice::new(&[15]), 20, 1);
        assert_eq!(store.get(goblin).unwrap().initiative, 17);

        store.toggle_lock(goblin);
        roll_initiative(&mut store, &mut FixedDice::new(&[3]), 20, 2);
        assert_eq!(store.get(goblin).unwrap().initiative, 17);
    }

    #[test]
    fn defeated_sorts_last_regardless_of_initiative() {
        let mut store = CreatureStore::new();
        let b = add(&mut store, "B", 5, 0);
        let a = add(&mut store, "A", 10, 0);
        store.update(b, CreatureField::CurrentHp(0));
        // B rolls 18, A rolls 5; B is defeated so A still leads
        roll_initiative(&mut store, &mut FixedDice::new(&[18, 5]), 20, 1);
        assert_eq!(store.order(), &[a, b]);
    }

    #[test]
    fn descending_with_stable_ties() {
        let mut store = CreatureStore::new();
        add(&mut store, "Slow", 5, 0);
        add(&mut store, "TieFirst", 5, 0);
        add(&mut store, "TieSecond", 5, 0);
        add(&mut store, "Fast", 5, 0);
        roll_initiative(&mut store, &mut FixedDice::new(&[2, 10, 10, 19]), 20, 1);
        assert_eq!(names(&store), ["Fast", "TieFirst", "TieSecond", "Slow"]);
    }

    #[test]
    fn locked_creatures_stay_at_their_index() {
        let mut store = CreatureStore::new();
        add(&mut store, "U1", 5, 0);
        let anchor = add(&mut store, "Anchor", 5, 0);
        add(&mut store, "U2", 5, 0);
        add(&mut store, "U3", 5, 0);
        store.update(anchor, CreatureField::Initiative(1));
        store.toggle_lock(anchor);

        roll_initiative(&mut store, &mut FixedDice::new(&[3, 12, 20]), 20, 1);
        assert_eq!(names(&store), ["U3", "Anchor", "U2", "U1"]);
        assert_eq!(store.get(anchor).unwrap().initiative, 1);
    }

    #[test]
    fn history_entry_mirrors_final_order() {
        let mut store = CreatureStore::new();
        add(&mut store, "A", 5, 1);
        add(&mut store, "B", 5, 0);
        let entry = roll_initiative(&mut store, &mut FixedDice::new(&[4, 9]), 20, 42);
        assert_eq!(entry.timestamp, 42);
        let pairs: Vec<(&str, i32)> = entry
            .order
            .iter()
            .map(|r| (r.name.as_str(), r.initiative))
            .collect();
        assert_eq!(pairs, [("B", 9), ("A", 5)]);
    }

    #[test]
    fn random_rolls_respect_invariants() {
        let mut rng = RngDice(StdRng::seed_from_u64(7));
        for round in 0..50u64 {
            let mut store = CreatureStore::new();
            let mut locked = Vec::new();
            for i in 0..8 {
                let id = add(&mut store, &format!("C{i}"), 10, i - 3);
                if i % 3 == 0 {
                    store.update(id, CreatureField::CurrentHp(0));
                }
                if i % 4 == 1 {
                    store.update(id, CreatureField::Initiative(100 + i));
                    store.toggle_lock(id);
                    locked.push((id, store.order().len() - 1, 100 + i));
                }
            }

            roll_initiative(&mut store, &mut rng, 20, round);

            for &(id, idx, init) in &locked {
                assert_eq!(store.order()[idx], id);
                assert_eq!(store.get(id).unwrap().initiative, init);
            }
            let unlocked: Vec<_> = store.iter().filter(|c| !c.is_locked).collect();
            for c in &unlocked {
                assert!(c.initiative >= 1 + c.initiative_bonus);
                assert!(c.initiative <= 20 + c.initiative_bonus);
            }
            for pair in unlocked.windows(2) {
                let (x, y) = (pair[0], pair[1]);
                assert!(!x.is_defeated() || y.is_defeated());
                if x.is_defeated() == y.is_defeated() {
                    assert!(x.initiative >= y.initiative);
                    if x.initiative == y.initiative {
                        assert!(x.id < y.id);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_store_rolls_to_empty_entry() {
        let mut store = CreatureStore::new();
        let entry = roll_initiative(&mut store, &mut ThreadDice, 20, 1);
        assert!(entry.order.is_empty());
    }

    #[test]
    fn thread_dice_stays_in_range() {
        let mut dice = ThreadDice;
        for _ in 0..200 {
            let r = dice.roll(20);
            assert!((1..=20).contains(&r));
        }
    }

    #[test]
    fn phase_rejects_reentry() {
        let mut phase = RollPhase::default();
        assert!(matches!(phase.is_due(0), Err(TrackerError::NoRollPending)));
        assert_eq!(phase.begin(1_000, 1_000).unwrap(), 2_000);
        assert!(matches!(phase.begin(1_500, 1_000), Err(TrackerError::RollInProgress)));
        assert!(!phase.is_due(1_999).unwrap());
        assert!(phase.is_due(2_000).unwrap());
        phase.finish();
        assert!(!phase.is_rolling());
    }

    #[test]
    fn phase_serializes_with_status_tag() {
        let idle = serde_json::to_string(&RollPhase::Idle).unwrap();
        assert_eq!(idle, r#"{"status":"idle"}"#);
        let rolling = serde_json::to_string(&RollPhase::Rolling {
            requested_at: 1,
            ready_at: 2,
        })
        .unwrap();
        assert_eq!(rolling, r#"{"status":"rolling","requestedAt":1,"readyAt":2}"#);
    }
}
