use crate::catalog::Catalog;
use crate::config::StateStore;
use crate::model::{PersistedSnapshot, Track};
use crate::shuffle;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashSet;

/// A "previous" request within this many seconds of the track start navigates
/// to the prior track; past it, the request restarts the current track.
pub const RESTART_THRESHOLD_SECONDS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Outcome of a "previous" request, so the caller knows whether to seek the
/// transport back to zero or to load a new track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousAction {
    RestartedCurrent,
    TrackChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndedAction {
    ReplayCurrent,
    TrackChanged,
}

/// The playback state machine. Sole mutator of current index, repeat/random
/// flags, shuffle history, and resume position; every transition persists the
/// snapshot through the state store.
#[derive(Debug)]
pub struct PlayerCore {
    catalog: Catalog,
    current_index: usize,
    is_repeat: bool,
    is_random: bool,
    played: HashSet<usize>,
    current_time: Option<f64>,
    rng: SmallRng,
    store: StateStore,
    pub dirty: bool,
    pub status: String,
}

impl PlayerCore {
    /// Builds the core from a persisted snapshot. Snapshot indices are
    /// validated against the freshly built catalog: if the library changed
    /// between runs, a stale current index falls back to the first track and
    /// stale played entries are dropped.
    pub fn from_persisted(catalog: Catalog, snapshot: PersistedSnapshot, store: StateStore) -> Self {
        let track_count = catalog.len();
        let current_index = if snapshot.current_index < track_count {
            snapshot.current_index
        } else {
            0
        };
        let played: HashSet<usize> = snapshot
            .played_indices
            .into_iter()
            .filter(|idx| *idx < track_count)
            .collect();
        let current_time = snapshot.current_time.filter(|secs| secs.is_finite());

        Self {
            catalog,
            current_index,
            is_repeat: snapshot.is_repeat,
            is_random: snapshot.is_random,
            played,
            current_time,
            rng: SmallRng::from_os_rng(),
            store,
            dirty: true,
            status: String::from("Ready"),
        }
    }

    pub fn snapshot(&self) -> PersistedSnapshot {
        let mut played_indices: Vec<usize> = self.played.iter().copied().collect();
        played_indices.sort_unstable();
        PersistedSnapshot {
            current_index: self.current_index,
            is_repeat: self.is_repeat,
            is_random: self.is_random,
            current_time: self.current_time,
            played_indices,
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.store.save(&self.snapshot())
    }

    /// Makes `index` the current track and records it in the shuffle history.
    /// Whether the transport starts playing is the caller's decision.
    pub fn load_track(&mut self, index: usize) {
        assert!(
            index < self.catalog.len(),
            "track index {index} out of range for catalog of {}",
            self.catalog.len()
        );
        self.current_index = index;
        self.played.insert(index);
        self.current_time = Some(0.0);
        self.dirty = true;
        self.persist();
    }

    /// Explicit pick from the playlist; repeat/random flags do not apply.
    pub fn select_track(&mut self, index: usize) -> &Track {
        self.load_track(index);
        self.catalog.track(self.current_index)
    }

    pub fn advance(&mut self, direction: Direction) -> &Track {
        let track_count = self.catalog.len();
        let next = if self.is_random && direction == Direction::Next {
            shuffle::next_random_index(
                &mut self.rng,
                self.current_index,
                track_count,
                &mut self.played,
            )
        } else {
            let step = match direction {
                Direction::Next => 1,
                Direction::Previous => track_count - 1,
            };
            (self.current_index + step) % track_count
        };
        self.load_track(next);
        self.catalog.track(self.current_index)
    }

    /// Past the restart threshold a "previous" press means "replay this
    /// track", not "go back one".
    pub fn handle_previous_request(&mut self, position_secs: f64) -> PreviousAction {
        if position_secs > RESTART_THRESHOLD_SECONDS {
            self.current_time = Some(0.0);
            self.dirty = true;
            self.persist();
            return PreviousAction::RestartedCurrent;
        }
        self.advance(Direction::Previous);
        PreviousAction::TrackChanged
    }

    pub fn handle_track_ended(&mut self) -> EndedAction {
        if self.is_repeat {
            self.current_time = Some(0.0);
            self.dirty = true;
            self.persist();
            return EndedAction::ReplayCurrent;
        }
        self.advance(Direction::Next);
        EndedAction::TrackChanged
    }

    pub fn toggle_repeat(&mut self) {
        self.is_repeat = !self.is_repeat;
        self.set_status(if self.is_repeat {
            "Repeat on"
        } else {
            "Repeat off"
        });
        self.persist();
    }

    /// Shuffle history deliberately survives mode toggles.
    pub fn toggle_random(&mut self) {
        self.is_random = !self.is_random;
        self.set_status(if self.is_random {
            "Random on"
        } else {
            "Random off"
        });
        self.persist();
    }

    /// Records the playback position reported by the transport. Non-finite
    /// values are treated as unknown rather than stored.
    pub fn tick(&mut self, position_secs: f64) {
        self.current_time = position_secs.is_finite().then_some(position_secs);
        self.persist();
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> &Track {
        self.catalog.track(self.current_index)
    }

    pub fn is_repeat(&self) -> bool {
        self.is_repeat
    }

    pub fn is_random(&self) -> bool {
        self.is_random
    }

    pub fn resume_position(&self) -> Option<f64> {
        self.current_time
    }

    pub fn played(&self) -> &HashSet<usize> {
        &self.played
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn persist(&mut self) {
        if let Err(err) = self.save() {
            self.set_status(&format!("save error: {err:#}"));
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}
