use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of the fixed playlist. `id` is assigned from catalog order at
/// scan time and stays stable for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: u32,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
}

/// Snapshot of playback state written after every meaningful state change and
/// read once at startup. Every field defaults independently so a partial or
/// older snapshot still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub is_repeat: bool,
    #[serde(default)]
    pub is_random: bool,
    /// Last known playback position in seconds. `Some(0.0)` is a valid resume
    /// point; `None` means no position was recorded.
    #[serde(default)]
    pub current_time: Option<f64>,
    #[serde(default)]
    pub played_indices: Vec<usize>,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_repeat: false,
            is_random: false,
            current_time: None,
            played_indices: Vec::new(),
        }
    }
}
