use std::time::Duration;
use tamagosui_chain::types::{
    GameBalance,
    PetStats,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time,
};

/// Locally displayed stat values while the pet sleeps. Fractional so that
/// sub-unit per-second rates accumulate instead of rounding away. Purely
/// cosmetic: replaced by the authoritative stats on the next real refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayStats {
    pub energy: f64,
    pub happiness: f64,
    pub hunger: f64,
}

impl DisplayStats {
    pub fn from_stats(stats: &PetStats) -> Self {
        DisplayStats {
            energy: stats.energy as f64,
            happiness: stats.happiness as f64,
            hunger: stats.hunger as f64,
        }
    }

    /// One second of simulated sleep: energy recovers, hunger and happiness
    /// drain, all derived from the balance's per-millisecond rates and
    /// clamped to [0, max_stat].
    pub fn tick(self, balance: &GameBalance) -> Self {
        let max = balance.max_stat as f64;
        let energy_per_second = 1_000.0 / balance.sleep_energy_gain_ms.max(1) as f64;
        let hunger_loss_per_second = 1_000.0 / balance.sleep_hunger_loss_ms.max(1) as f64;
        let happiness_loss_per_second =
            1_000.0 / balance.sleep_happiness_loss_ms.max(1) as f64;

        DisplayStats {
            energy: (self.energy + energy_per_second).min(max),
            hunger: (self.hunger - hunger_loss_per_second).max(0.0),
            happiness: (self.happiness - happiness_loss_per_second).max(0.0),
        }
    }
}

/// A cancellable 1 Hz simulation task tied to the sleeping state: spawned
/// when sleep begins, dropped (aborting the timer) when sleep ends or the
/// dashboard goes away. Each tick publishes the extrapolated stats on a
/// watch channel.
pub struct SleepTicker {
    task: JoinHandle<()>,
}

impl SleepTicker {
    pub fn spawn(
        initial: DisplayStats,
        balance: GameBalance,
    ) -> (Self, watch::Receiver<DisplayStats>) {
        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            // the first tick of a tokio interval fires immediately
            interval.tick().await;
            let mut stats = initial;
            loop {
                interval.tick().await;
                stats = stats.tick(&balance);
                if tx.send(stats).is_err() {
                    break;
                }
            }
        });
        (SleepTicker { task }, rx)
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SleepTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;

    fn balance() -> GameBalance {
        GameBalance::default()
    }

    #[test]
    fn tick__gains_exactly_one_energy_per_second_at_1000ms_rate() {
        // given sleep_energy_gain_ms = 1000 and max_stat = 100
        let start = DisplayStats {
            energy: 50.0,
            happiness: 50.0,
            hunger: 50.0,
        };

        // when
        let after = start.tick(&balance());

        // then
        assert_eq!(after.energy, 51.0);
    }

    #[test]
    fn tick__never_exceeds_max_stat() {
        let start = DisplayStats {
            energy: 99.8,
            happiness: 50.0,
            hunger: 50.0,
        };
        let after = start.tick(&balance()).tick(&balance());
        assert_eq!(after.energy, 100.0);
    }

    #[test]
    fn tick__clamps_hunger_at_zero_not_negative() {
        // given hunger 5 and a loss of 2 per tick
        let mut b = balance();
        b.sleep_hunger_loss_ms = 500;
        let mut stats = DisplayStats {
            energy: 0.0,
            happiness: 50.0,
            hunger: 5.0,
        };

        // when: three ticks burn 6 from 5
        for _ in 0..3 {
            stats = stats.tick(&b);
        }

        // then
        assert_eq!(stats.hunger, 0.0);
    }

    #[test]
    fn from_stats__mirrors_authoritative_values() {
        let stats = PetStats {
            energy: 42,
            happiness: 7,
            hunger: 99,
        };
        let display = DisplayStats::from_stats(&stats);
        assert_eq!(display.energy, 42.0);
        assert_eq!(display.happiness, 7.0);
        assert_eq!(display.hunger, 99.0);
    }

    proptest! {
        #[test]
        fn tick__stays_within_bounds_for_any_rates(
            energy in 0.0f64..100.0,
            happiness in 0.0f64..100.0,
            hunger in 0.0f64..100.0,
            gain_ms in 1u64..10_000,
            hunger_ms in 1u64..10_000,
            happiness_ms in 1u64..10_000,
        ) {
            let b = GameBalance {
                sleep_energy_gain_ms: gain_ms,
                sleep_hunger_loss_ms: hunger_ms,
                sleep_happiness_loss_ms: happiness_ms,
                ..GameBalance::default()
            };
            let mut stats = DisplayStats { energy, happiness, hunger };
            for _ in 0..10 {
                stats = stats.tick(&b);
                prop_assert!(stats.energy <= 100.0);
                prop_assert!(stats.hunger >= 0.0);
                prop_assert!(stats.happiness >= 0.0);
            }
        }
    }
}
