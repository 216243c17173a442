use crate::audio::{AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::catalog::Catalog;
use crate::config::StateStore;
use crate::core::{PlayerCore, PreviousAction};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

const SCRUB_SECONDS: u64 = 5;
const POSITION_SAVE_INTERVAL: Duration = Duration::from_secs(1);

pub fn run(music_dir: &Path) -> Result<()> {
    let store = StateStore::open_default()?;
    let catalog = Catalog::scan(music_dir)?;
    let snapshot = store.load()?;
    let mut core = PlayerCore::from_persisted(catalog, snapshot, store);

    let mut audio: Box<dyn AudioEngine> = match RodioAudioEngine::new() {
        Ok(engine) => Box::new(engine),
        Err(_) => Box::new(NullAudioEngine::new()),
    };

    restore_playback(&mut core, &mut *audio);

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut selected = core.current_index();
    let mut last_tick = Instant::now();
    let mut last_position_save = Instant::now();

    let result: Result<()> = loop {
        maybe_auto_advance_track(&mut core, &mut *audio);
        maybe_record_position(&mut core, &*audio, &mut last_position_save);

        if core.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| crate::ui::draw(frame, &core, &*audio, selected))?;
            core.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
            KeyCode::Char('q') => break Ok(()),
            KeyCode::Down => {
                selected = (selected + 1).min(core.catalog().len() - 1);
                core.dirty = true;
            }
            KeyCode::Up => {
                selected = selected.saturating_sub(1);
                core.dirty = true;
            }
            KeyCode::Enter => {
                let path = core.select_track(selected).path.clone();
                start_playback(&mut core, &mut *audio, &path);
            }
            KeyCode::Char(' ') => {
                if audio.is_paused() {
                    audio.resume();
                    core.status = String::from("Resumed");
                } else {
                    audio.pause();
                    core.status = String::from("Paused");
                }
                core.dirty = true;
            }
            KeyCode::Char('n') => {
                let path = core.advance(crate::core::Direction::Next).path.clone();
                start_playback(&mut core, &mut *audio, &path);
            }
            KeyCode::Char('b') => {
                let position_secs = audio
                    .position()
                    .map(|position| position.as_secs_f64())
                    .unwrap_or(0.0);
                match core.handle_previous_request(position_secs) {
                    PreviousAction::RestartedCurrent => {
                        if let Err(err) = audio.seek_to(Duration::ZERO) {
                            core.status = format!("seek error: {err:#}");
                            core.dirty = true;
                        }
                    }
                    PreviousAction::TrackChanged => {
                        let path = core.current_track().path.clone();
                        start_playback(&mut core, &mut *audio, &path);
                    }
                }
            }
            KeyCode::Char('r') => core.toggle_repeat(),
            KeyCode::Char('y') => core.toggle_random(),
            KeyCode::Right => scrub(&mut core, &mut *audio, SCRUB_SECONDS as i64),
            KeyCode::Left => scrub(&mut core, &mut *audio, -(SCRUB_SECONDS as i64)),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let next = (audio.volume() + 0.05).clamp(0.0, 2.0);
                audio.set_volume(next);
                core.status = format!("Volume: {}%", (next * 100.0).round() as u16);
                core.dirty = true;
            }
            KeyCode::Char('-') => {
                let next = (audio.volume() - 0.05).clamp(0.0, 2.0);
                audio.set_volume(next);
                core.status = format!("Volume: {}%", (next * 100.0).round() as u16);
                core.dirty = true;
            }
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    let save_result = core.save();
    result?;
    save_result?;
    Ok(())
}

/// Brings the persisted session back: a saved position means the session
/// resumes paused at that position; no saved position means a fresh start
/// that plays immediately. The resume position must be captured before
/// `load_track`, which resets it to the track start.
fn restore_playback(core: &mut PlayerCore, audio: &mut dyn AudioEngine) {
    let resume = core.resume_position();
    core.load_track(core.current_index());

    let path = core.current_track().path.clone();
    if let Err(err) = audio.play(&path) {
        core.status = format!("playback error: {err:#}");
        core.dirty = true;
        return;
    }

    if let Some(secs) = resume {
        audio.pause();
        if audio.seek_to(Duration::from_secs_f64(secs.max(0.0))).is_ok() {
            core.tick(secs);
        }
    }
}

fn maybe_auto_advance_track(core: &mut PlayerCore, audio: &mut dyn AudioEngine) {
    if audio.current_track().is_none() || audio.is_paused() || !audio.is_finished() {
        return;
    }

    // Replay and track-change both come down to handing the (possibly new)
    // current track back to the transport.
    let _ = core.handle_track_ended();
    let path = core.current_track().path.clone();
    start_playback(core, audio, &path);
}

fn maybe_record_position(core: &mut PlayerCore, audio: &dyn AudioEngine, last_save: &mut Instant) {
    if audio.current_track().is_none()
        || audio.is_paused()
        || last_save.elapsed() < POSITION_SAVE_INTERVAL
    {
        return;
    }

    if let Some(position) = audio.position() {
        core.tick(position.as_secs_f64());
        *last_save = Instant::now();
    }
}

fn start_playback(core: &mut PlayerCore, audio: &mut dyn AudioEngine, path: &Path) {
    if let Err(err) = audio.play(path) {
        core.status = format!("playback error: {err:#}");
        core.dirty = true;
    }
}

fn scrub(core: &mut PlayerCore, audio: &mut dyn AudioEngine, delta_secs: i64) {
    let Some(position) = audio.position() else {
        return;
    };

    let delta = Duration::from_secs(delta_secs.unsigned_abs());
    let target = if delta_secs < 0 {
        position.saturating_sub(delta)
    } else {
        position.saturating_add(delta)
    };

    if audio.seek_to(target).is_ok() {
        core.tick(target.as_secs_f64());
        core.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PersistedSnapshot, Track};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct TestAudioEngine {
        paused: bool,
        current: Option<PathBuf>,
        finished: bool,
        played: Vec<PathBuf>,
        seeks: Vec<Duration>,
        position: Option<Duration>,
    }

    impl TestAudioEngine {
        fn idle() -> Self {
            Self {
                paused: false,
                current: None,
                finished: false,
                played: Vec::new(),
                seeks: Vec::new(),
                position: None,
            }
        }

        fn finished_with_current(path: &str) -> Self {
            Self {
                current: Some(PathBuf::from(path)),
                finished: true,
                ..Self::idle()
            }
        }
    }

    impl AudioEngine for TestAudioEngine {
        fn play(&mut self, path: &Path) -> Result<()> {
            self.current = Some(path.to_path_buf());
            self.finished = false;
            self.paused = false;
            self.played.push(path.to_path_buf());
            Ok(())
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn stop(&mut self) {
            self.current = None;
            self.finished = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn current_track(&self) -> Option<&Path> {
            self.current.as_deref()
        }

        fn position(&self) -> Option<Duration> {
            self.position
        }

        fn duration(&self) -> Option<Duration> {
            None
        }

        fn seek_to(&mut self, position: Duration) -> Result<()> {
            self.seeks.push(position);
            Ok(())
        }

        fn volume(&self) -> f32 {
            1.0
        }

        fn set_volume(&mut self, _volume: f32) {}

        fn is_finished(&self) -> bool {
            self.finished
        }
    }

    fn test_core(len: usize, snapshot: PersistedSnapshot) -> (PlayerCore, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let store = StateStore::at(dir.path().join("state.json"));
        let tracks = (0..len)
            .map(|n| Track {
                id: n as u32,
                path: PathBuf::from(format!("track_{n}.mp3")),
                title: format!("track_{n}"),
                artist: None,
            })
            .collect();
        let catalog = Catalog::from_tracks(tracks).expect("catalog");
        (PlayerCore::from_persisted(catalog, snapshot, store), dir)
    }

    #[test]
    fn auto_advance_plays_next_track_when_finished() {
        let (mut core, _dir) = test_core(2, PersistedSnapshot::default());
        core.load_track(0);

        let mut audio = TestAudioEngine::finished_with_current("track_0.mp3");
        maybe_auto_advance_track(&mut core, &mut audio);

        assert_eq!(audio.played, vec![PathBuf::from("track_1.mp3")]);
        assert_eq!(core.current_index(), 1);
    }

    #[test]
    fn auto_advance_replays_current_track_when_repeat_is_on() {
        let (mut core, _dir) = test_core(3, PersistedSnapshot::default());
        core.load_track(1);
        core.toggle_repeat();

        let mut audio = TestAudioEngine::finished_with_current("track_1.mp3");
        maybe_auto_advance_track(&mut core, &mut audio);

        assert_eq!(audio.played, vec![PathBuf::from("track_1.mp3")]);
        assert_eq!(core.current_index(), 1);
    }

    #[test]
    fn auto_advance_waits_while_paused() {
        let (mut core, _dir) = test_core(2, PersistedSnapshot::default());
        core.load_track(0);

        let mut audio = TestAudioEngine::finished_with_current("track_0.mp3");
        audio.paused = true;
        maybe_auto_advance_track(&mut core, &mut audio);

        assert!(audio.played.is_empty());
        assert_eq!(core.current_index(), 0);
    }

    #[test]
    fn restore_with_saved_position_starts_paused_and_seeks() {
        let snapshot = PersistedSnapshot {
            current_index: 1,
            current_time: Some(42.0),
            ..PersistedSnapshot::default()
        };
        let (mut core, _dir) = test_core(3, snapshot);

        let mut audio = TestAudioEngine::idle();
        restore_playback(&mut core, &mut audio);

        assert!(audio.paused);
        assert_eq!(audio.played, vec![PathBuf::from("track_1.mp3")]);
        assert_eq!(audio.seeks, vec![Duration::from_secs(42)]);
        assert_eq!(core.resume_position(), Some(42.0));
    }

    #[test]
    fn restore_with_zero_position_still_seeks() {
        let snapshot = PersistedSnapshot {
            current_time: Some(0.0),
            ..PersistedSnapshot::default()
        };
        let (mut core, _dir) = test_core(2, snapshot);

        let mut audio = TestAudioEngine::idle();
        restore_playback(&mut core, &mut audio);

        assert!(audio.paused);
        assert_eq!(audio.seeks, vec![Duration::ZERO]);
    }

    #[test]
    fn fresh_start_plays_immediately() {
        let (mut core, _dir) = test_core(2, PersistedSnapshot::default());

        let mut audio = TestAudioEngine::idle();
        restore_playback(&mut core, &mut audio);

        assert!(!audio.paused);
        assert_eq!(audio.played, vec![PathBuf::from("track_0.mp3")]);
        assert!(audio.seeks.is_empty());
    }

    #[test]
    fn position_saves_are_throttled() {
        let (mut core, _dir) = test_core(2, PersistedSnapshot::default());
        core.load_track(0);

        let mut audio = TestAudioEngine::idle();
        audio.current = Some(PathBuf::from("track_0.mp3"));
        audio.position = Some(Duration::from_secs(9));

        let mut last_save = Instant::now();
        maybe_record_position(&mut core, &audio, &mut last_save);
        assert_eq!(core.resume_position(), Some(0.0), "save within interval skipped");

        let mut stale = Instant::now() - POSITION_SAVE_INTERVAL * 2;
        maybe_record_position(&mut core, &audio, &mut stale);
        assert_eq!(core.resume_position(), Some(9.0));
    }
}
