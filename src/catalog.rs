use crate::model::Track;
use anyhow::{Result, bail};
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::ffi::OsStr;
use std::path::Path;
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg", "m4a", "aac", "opus"];

/// The fixed, ordered playlist. Built once at startup; catalog indices are
/// the addressing scheme used by the rest of the player.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Scans `root` recursively for audio files, ordered by path.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut tracks = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_audio(path) {
                continue;
            }

            let metadata = embedded_metadata(path);
            let title = metadata
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| {
                    path.file_stem()
                        .and_then(OsStr::to_str)
                        .unwrap_or("unknown")
                        .to_string()
                });

            tracks.push(Track {
                id: 0,
                path: path.to_path_buf(),
                title,
                artist: metadata.artist,
            });
        }

        tracks.sort_by(|a, b| a.path.cmp(&b.path));
        for (index, track) in tracks.iter_mut().enumerate() {
            track.id = index as u32;
        }

        Self::from_tracks(tracks)
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            bail!("catalog is empty: no playable tracks");
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Panics on an out-of-range index; all call sites derive indices from
    /// this catalog or from modular arithmetic over its length.
    pub fn track(&self, index: usize) -> &Track {
        &self.tracks[index]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[derive(Default)]
struct TrackMetadata {
    title: Option<String>,
    artist: Option<String>,
}

fn embedded_metadata(path: &Path) -> TrackMetadata {
    let Ok(tagged_file) = Probe::open(path).and_then(|probe| probe.read()) else {
        return TrackMetadata::default();
    };

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return TrackMetadata::default();
    };

    TrackMetadata {
        title: tag.title().map(|title| title.into_owned()),
        artist: tag.artist().map(|artist| artist.into_owned()),
    }
}

fn is_audio(path: &Path) -> bool {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
}
