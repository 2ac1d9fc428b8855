//! A site adapter for a simulated page
//!
//! Serves as the reference integration: it fills in the player and playlist
//! objects from page state on every cycle and turns host actions into page
//! changes, which the next cycle reports back.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use log::{debug, info};

use crate::adapters::{PlayerActions, PlaylistActions, SiteAdapter};
use crate::bridge::{Bridge, Registration};
use crate::data::{LoopMode, Metadata, PlaybackStatus, PlaylistInfo, PlaylistOrdering};
use crate::error::AdapterError;
use crate::objects::{Player, Playlist};

/// State of the simulated page
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePage {
    /// Whether the page finished loading its player widget
    pub loaded: bool,
    pub tracks: Vec<Metadata>,
    pub current: usize,
    pub status: PlaybackStatus,
    pub repeat: LoopMode,
    pub volume: f64,
    pub shuffle: bool,
    pub like: bool,
    /// Position in microseconds
    pub position: i64,
    pub playlists: Vec<PlaylistInfo>,
    pub active_playlist: usize,
}

fn test_track(id: u32, track: &str, length: i64) -> Metadata {
    Metadata {
        url: format!("http://webmusic.tiede.org/id/{}", id),
        artists: vec!["Artist 1".to_string(), "Artist 2".to_string()],
        track: track.to_string(),
        album: "Test Album".to_string(),
        art_url: String::new(),
        track_length: length,
    }
}

impl Default for ExamplePage {
    fn default() -> Self {
        ExamplePage {
            loaded: true,
            tracks: vec![
                test_track(1, "Test Track", 180_000_000),
                test_track(2, "Test Track 2", 240_000_000),
            ],
            current: 0,
            status: PlaybackStatus::Play,
            repeat: LoopMode::None,
            volume: 0.5,
            shuffle: false,
            like: false,
            position: 0,
            playlists: vec![
                PlaylistInfo::new("/org/webmusic/playlist/1", "Testplaylist", ""),
                PlaylistInfo::new("/org/webmusic/playlist/2", "Testplaylist2", ""),
            ],
            active_playlist: 0,
        }
    }
}

impl ExamplePage {
    pub fn current_track(&self) -> Metadata {
        self.tracks.get(self.current).cloned().unwrap_or_default()
    }

    /// Let playback progress by `elapsed` microseconds
    pub fn advance(&mut self, elapsed: i64) {
        if self.status != PlaybackStatus::Play {
            return;
        }
        self.position += elapsed;
        let length = self.current_track().track_length;
        if length > 0 && self.position >= length {
            self.position = 0;
            if self.repeat != LoopMode::Track {
                self.skip(1);
            }
        }
    }

    fn skip(&mut self, step: isize) {
        if self.tracks.is_empty() {
            return;
        }
        let count = self.tracks.len() as isize;
        let next = self.current as isize + step;
        self.current = if self.repeat == LoopMode::None {
            next.clamp(0, count - 1) as usize
        } else {
            next.rem_euclid(count) as usize
        };
        self.position = 0;
    }
}

/// Action handlers operating on the simulated page
#[derive(Clone)]
pub struct ExampleActions {
    page: Arc<Mutex<ExamplePage>>,
}

impl ExampleActions {
    fn page(&self) -> Result<MutexGuard<'_, ExamplePage>, AdapterError> {
        self.page
            .lock()
            .map_err(|_| AdapterError::Page("page state is not accessible".to_string()))
    }
}

impl PlayerActions for ExampleActions {
    fn play(&mut self) -> Result<(), AdapterError> {
        self.page()?.status = PlaybackStatus::Play;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AdapterError> {
        self.page()?.status = PlaybackStatus::Pause;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AdapterError> {
        let mut page = self.page()?;
        page.status = PlaybackStatus::Stop;
        page.position = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<(), AdapterError> {
        self.page()?.skip(1);
        Ok(())
    }

    fn previous(&mut self) -> Result<(), AdapterError> {
        self.page()?.skip(-1);
        Ok(())
    }

    fn repeat(&mut self, mode: LoopMode) -> Result<(), AdapterError> {
        self.page()?.repeat = mode;
        Ok(())
    }

    fn volume(&mut self, level: f64) -> Result<(), AdapterError> {
        self.page()?.volume = level;
        Ok(())
    }

    fn toggle_shuffle(&mut self) -> Result<(), AdapterError> {
        let mut page = self.page()?;
        page.shuffle = !page.shuffle;
        Ok(())
    }

    fn toggle_like(&mut self) -> Result<(), AdapterError> {
        let mut page = self.page()?;
        page.like = !page.like;
        Ok(())
    }

    fn track_position(&mut self, position: i64) -> Result<(), AdapterError> {
        let mut page = self.page()?;
        let length = page.current_track().track_length;
        page.position = position.clamp(0, length.max(0));
        Ok(())
    }
}

impl PlaylistActions for ExampleActions {
    fn get_playlists(
        &mut self,
        index: u32,
        max_count: u32,
        order: PlaylistOrdering,
        reverse_order: bool,
    ) -> Result<Vec<PlaylistInfo>, AdapterError> {
        let mut playlists = self.page()?.playlists.clone();
        if order == PlaylistOrdering::Alphabetical {
            playlists.sort_by(|a, b| a.name.cmp(&b.name));
        }
        if reverse_order {
            playlists.reverse();
        }
        Ok(playlists
            .into_iter()
            .skip(index as usize)
            .take(max_count as usize)
            .collect())
    }

    fn activate_playlist(&mut self, id: &str) -> Result<(), AdapterError> {
        let mut page = self.page()?;
        match page.playlists.iter().position(|playlist| playlist.id == id) {
            Some(index) => {
                page.active_playlist = index;
                page.current = 0;
                page.position = 0;
                Ok(())
            }
            None => Err(AdapterError::Page(format!("no playlist {}", id))),
        }
    }
}

/// Adapter for the simulated page
pub struct ExampleAdapter {
    page: Arc<Mutex<ExamplePage>>,
    player: Arc<RwLock<Player>>,
    playlist: Arc<RwLock<Playlist>>,
    step_us: i64,
}

impl ExampleAdapter {
    /// Create the player and playlist objects and register them with the bridge
    pub fn install(bridge: &Bridge) -> Result<ExampleAdapter, AdapterError> {
        Self::install_with_page(bridge, ExamplePage::default())
    }

    pub fn install_with_page(bridge: &Bridge, page: ExamplePage) -> Result<ExampleAdapter, AdapterError> {
        let page = Arc::new(Mutex::new(page));
        let actions = ExampleActions { page: page.clone() };

        let mut player = bridge.new_player();
        player.set_actions(Box::new(actions.clone()));
        let mut playlist = bridge.new_playlist();
        playlist.set_actions(Box::new(actions));

        let player = Arc::new(RwLock::new(player));
        let playlist = Arc::new(RwLock::new(playlist));

        if bridge.register(player.clone()) == Registration::Rejected {
            return Err(AdapterError::Page("player could not be registered".to_string()));
        }
        if bridge.register(playlist.clone()) == Registration::Rejected {
            return Err(AdapterError::Page("playlist could not be registered".to_string()));
        }

        let step_us = bridge.config().poll_interval().as_micros() as i64;
        Ok(ExampleAdapter {
            page,
            player,
            playlist,
            step_us,
        })
    }

    /// Handle to the simulated page
    pub fn page(&self) -> Arc<Mutex<ExamplePage>> {
        self.page.clone()
    }

    pub fn player(&self) -> Arc<RwLock<Player>> {
        self.player.clone()
    }

    pub fn playlist(&self) -> Arc<RwLock<Playlist>> {
        self.playlist.clone()
    }

    /// Playback progress per cycle, in microseconds
    pub fn with_step(mut self, step_us: i64) -> Self {
        self.step_us = step_us;
        self
    }

    fn snapshot(&self) -> Result<ExamplePage, AdapterError> {
        let mut page = self
            .page
            .lock()
            .map_err(|_| AdapterError::Page("page state is not accessible".to_string()))?;
        if !page.loaded {
            return Err(AdapterError::NotReady);
        }
        page.advance(self.step_us);
        Ok(page.clone())
    }
}

impl SiteAdapter for ExampleAdapter {
    fn name(&self) -> &str {
        "example"
    }

    fn start(&mut self) -> Result<(), AdapterError> {
        let mut player = self
            .player
            .write()
            .map_err(|_| AdapterError::Page("player is not accessible".to_string()))?;
        player.set_can_control(true);
        player.set_can_play(true);
        player.set_can_pause(true);
        player.set_can_seek(true);
        player.set_can_go_next(true);
        player.set_can_go_previous(true);
        player.set_can_shuffle(true);
        player.set_can_repeat(true);
        player.set_can_like(true);
        info!("Example site started");
        Ok(())
    }

    fn update(&mut self) -> Result<(), AdapterError> {
        let page = self.snapshot()?;

        {
            let mut player = self
                .player
                .write()
                .map_err(|_| AdapterError::Page("player is not accessible".to_string()))?;
            player.set_ready(true);
            player.set_metadata(page.current_track());
            player.set_playback_status(page.status);
            player.set_repeat(page.repeat);
            player.set_volume(page.volume);
            player.set_shuffle(page.shuffle);
            player.set_like(page.like);
            player.set_track_position(page.position);
            player.send_property_change();
        }

        let mut playlist = self
            .playlist
            .write()
            .map_err(|_| AdapterError::Page("playlist is not accessible".to_string()))?;
        playlist.set_count(page.playlists.len() as u32);
        playlist.set_active_playlist(page.playlists.get(page.active_playlist).cloned());
        if playlist.send_property_change() {
            debug!("Playlist state sent");
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.page.lock().map(|page| page.loaded).unwrap_or(false)
    }
}
