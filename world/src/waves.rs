//! Wave scheduling for scripted spawn queues.

use std::time::Duration;

use lane_defence_core::{Catalog, EnemyClassId, WaveError};

/// Floor applied to zero spawn intervals so queues still drain one enemy
/// per entry per tick.
const MIN_SPAWN_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Debug)]
struct QueueEntry {
    class: EnemyClassId,
    remaining: u32,
    interval: Duration,
    next_due: Duration,
}

#[derive(Clone, Debug)]
struct ActiveWave {
    /// One-based index of the wave being spawned.
    number: u32,
    entries: Vec<QueueEntry>,
}

/// Schedules scripted waves and drains their spawn queues over time.
#[derive(Clone, Debug)]
pub(crate) struct WaveDirector {
    started: u32,
    active: Option<ActiveWave>,
}

impl WaveDirector {
    pub(crate) fn new() -> Self {
        Self {
            started: 0,
            active: None,
        }
    }

    /// Number of waves started so far.
    pub(crate) fn started(&self) -> u32 {
        self.started
    }

    /// Reports whether a spawn queue is currently draining.
    pub(crate) fn is_spawning(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn reset(&mut self) {
        self.started = 0;
        self.active = None;
    }

    /// Arms the next scripted wave, returning its one-based number.
    ///
    /// Every entry of the wave becomes due immediately; the first enemies
    /// spawn on the next tick.
    pub(crate) fn start_next(
        &mut self,
        clock: Duration,
        catalog: &Catalog,
    ) -> Result<u32, WaveError> {
        if self.active.is_some() {
            return Err(WaveError::SpawnInProgress);
        }
        let Some(script) = catalog.wave(self.started) else {
            return Err(WaveError::WavesExhausted);
        };
        let entries = script
            .entries
            .iter()
            .map(|entry| QueueEntry {
                class: entry.enemy,
                remaining: entry.count,
                interval: entry.interval,
                next_due: clock,
            })
            .collect();
        self.started += 1;
        self.active = Some(ActiveWave {
            number: self.started,
            entries,
        });
        Ok(self.started)
    }

    /// Advances the active spawn queue, collecting enemy classes due to
    /// spawn this tick.
    ///
    /// Each entry releases at most one enemy per call. Returns the wave
    /// number on the first call that finds the queue fully drained.
    pub(crate) fn advance(
        &mut self,
        clock: Duration,
        due: &mut Vec<EnemyClassId>,
    ) -> Option<u32> {
        let wave = self.active.as_mut()?;
        let mut drained = true;
        for entry in &mut wave.entries {
            if entry.remaining == 0 {
                continue;
            }
            drained = false;
            if clock >= entry.next_due {
                due.push(entry.class);
                entry.remaining -= 1;
                entry.next_due = clock
                    + if entry.interval.is_zero() {
                        MIN_SPAWN_INTERVAL
                    } else {
                        entry.interval
                    };
            }
        }
        if drained {
            let number = wave.number;
            self.active = None;
            Some(number)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{EnemyClass, MatchRules, WaveEntry, WaveScript};

    fn catalog_with_waves(waves: Vec<WaveScript>) -> Catalog {
        Catalog::new(
            MatchRules {
                starting_money: 100,
                starting_lives: 10,
            },
            Vec::new(),
            vec![EnemyClass {
                name: String::from("runner"),
                health: 10.0,
                armor: 0.0,
                speed: 60.0,
                reward: 5,
                flying: false,
                boss: false,
            }],
            waves,
        )
        .expect("catalog")
    }

    fn single_entry_wave(count: u32, interval: Duration) -> WaveScript {
        WaveScript {
            entries: vec![WaveEntry {
                enemy: EnemyClassId::new(0),
                count,
                interval,
            }],
        }
    }

    #[test]
    fn start_rejects_while_spawn_queue_is_active() {
        let catalog = catalog_with_waves(vec![
            single_entry_wave(2, Duration::from_millis(500)),
            single_entry_wave(2, Duration::from_millis(500)),
        ]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));
        assert_eq!(
            director.start_next(Duration::ZERO, &catalog),
            Err(WaveError::SpawnInProgress)
        );
    }

    #[test]
    fn start_rejects_once_waves_are_exhausted() {
        let catalog = catalog_with_waves(vec![single_entry_wave(1, Duration::ZERO)]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));
        let mut due = Vec::new();
        let _ = director.advance(Duration::from_millis(20), &mut due);
        assert_eq!(director.advance(Duration::from_millis(40), &mut due), Some(1));
        assert_eq!(
            director.start_next(Duration::from_millis(40), &catalog),
            Err(WaveError::WavesExhausted)
        );
    }

    #[test]
    fn entries_release_one_enemy_per_call() {
        let catalog = catalog_with_waves(vec![single_entry_wave(3, Duration::ZERO)]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));

        let mut due = Vec::new();
        assert_eq!(director.advance(Duration::from_millis(20), &mut due), None);
        assert_eq!(due.len(), 1);
        assert_eq!(director.advance(Duration::from_millis(40), &mut due), None);
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn intervals_gate_consecutive_spawns() {
        let catalog = catalog_with_waves(vec![single_entry_wave(2, Duration::from_millis(700))]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));

        let mut due = Vec::new();
        assert_eq!(director.advance(Duration::from_millis(50), &mut due), None);
        assert_eq!(due.len(), 1);

        // 700ms have not elapsed since the first spawn.
        assert_eq!(director.advance(Duration::from_millis(700), &mut due), None);
        assert_eq!(due.len(), 1);

        assert_eq!(director.advance(Duration::from_millis(750), &mut due), None);
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn clearing_lags_one_call_behind_the_final_spawn() {
        let catalog = catalog_with_waves(vec![single_entry_wave(1, Duration::ZERO)]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));

        let mut due = Vec::new();
        assert_eq!(director.advance(Duration::from_millis(20), &mut due), None);
        assert_eq!(due.len(), 1);
        assert!(director.is_spawning());

        assert_eq!(director.advance(Duration::from_millis(40), &mut due), Some(1));
        assert_eq!(due.len(), 1);
        assert!(!director.is_spawning());
    }

    #[test]
    fn parallel_entries_drain_independently() {
        let catalog = catalog_with_waves(vec![WaveScript {
            entries: vec![
                WaveEntry {
                    enemy: EnemyClassId::new(0),
                    count: 1,
                    interval: Duration::from_millis(500),
                },
                WaveEntry {
                    enemy: EnemyClassId::new(0),
                    count: 2,
                    interval: Duration::from_millis(100),
                },
            ],
        }]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));

        let mut due = Vec::new();
        assert_eq!(director.advance(Duration::from_millis(50), &mut due), None);
        assert_eq!(due.len(), 2);
        assert_eq!(director.advance(Duration::from_millis(200), &mut due), None);
        assert_eq!(due.len(), 3);
        assert_eq!(director.advance(Duration::from_millis(300), &mut due), Some(1));
    }

    #[test]
    fn reset_forgets_progress() {
        let catalog = catalog_with_waves(vec![single_entry_wave(1, Duration::ZERO)]);
        let mut director = WaveDirector::new();
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));
        director.reset();
        assert_eq!(director.started(), 0);
        assert!(!director.is_spawning());
        assert_eq!(director.start_next(Duration::ZERO, &catalog), Ok(1));
    }
}
