//! Playlist navigation
//!
//! A player source is one URL, a list of URLs, or a list of items with titles and
//! posters. Advancing loads the next item through the coordinator, which refuses
//! while a quality switch is in flight.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::coordinator::PlaybackCoordinator;
use crate::error::{Error, Result};
use crate::events::PlayerEvent;
use crate::types::PlaylistItem;

/// Accepted shapes of a player source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaylistSource {
    Single(Url),
    Urls(Vec<Url>),
    Items(Vec<PlaylistItem>),
}

impl PlaylistSource {
    pub fn into_items(self) -> Vec<PlaylistItem> {
        match self {
            PlaylistSource::Single(src) => vec![item_for(src, 0)],
            PlaylistSource::Urls(urls) => urls.into_iter().enumerate().map(|(i, src)| item_for(src, i)).collect(),
            PlaylistSource::Items(items) => items,
        }
    }
}

fn item_for(src: Url, index: usize) -> PlaylistItem {
    let title = src
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Video {}", index + 1));
    PlaylistItem::new(src, title)
}

/// What to do when the current item ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Single looping item: seek back to the start
    Restart,
    Advance(usize),
    Stop,
}

#[derive(Debug, Clone)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
    index: usize,
    loop_playback: bool,
}

impl Playlist {
    pub fn new(source: PlaylistSource, loop_playback: bool) -> Result<Self> {
        let items = source.into_items();
        if items.is_empty() {
            return Err(Error::InvalidConfig("playlist has no items".to_string()));
        }
        Ok(Self {
            items,
            index: 0,
            loop_playback,
        })
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &PlaylistItem {
        &self.items[self.index]
    }

    pub fn next_index(&self) -> Option<usize> {
        if self.index + 1 < self.items.len() {
            Some(self.index + 1)
        } else if self.loop_playback {
            Some(0)
        } else {
            None
        }
    }

    pub fn previous_index(&self) -> Option<usize> {
        if self.index > 0 {
            Some(self.index - 1)
        } else if self.loop_playback {
            Some(self.items.len() - 1)
        } else {
            None
        }
    }

    pub fn end_action(&self) -> EndAction {
        if self.items.len() == 1 {
            return if self.loop_playback {
                EndAction::Restart
            } else {
                EndAction::Stop
            };
        }
        match self.next_index() {
            Some(index) => EndAction::Advance(index),
            None => EndAction::Stop,
        }
    }

    /// Load item `index`. The position only moves once the source is accepted.
    pub async fn select(&mut self, coordinator: &PlaybackCoordinator, index: usize, autoplay: bool) -> Result<()> {
        let item = self
            .items
            .get(index)
            .cloned()
            .ok_or(Error::PlaylistIndexOutOfRange {
                index,
                count: self.items.len(),
            })?;

        coordinator.load_source(&item.src).await?;
        self.index = index;
        info!(index, title = %item.title, "Playlist item selected");
        coordinator.emit(PlayerEvent::PlaylistItemChanged { index, item });

        if autoplay {
            coordinator.play().await;
        }
        Ok(())
    }

    /// Returns false at either end of a non-looping list
    pub async fn next(&mut self, coordinator: &PlaybackCoordinator) -> Result<bool> {
        match self.next_index() {
            Some(index) => self.select(coordinator, index, true).await.map(|_| true),
            None => Ok(false),
        }
    }

    pub async fn previous(&mut self, coordinator: &PlaybackCoordinator) -> Result<bool> {
        match self.previous_index() {
            Some(index) => self.select(coordinator, index, true).await.map(|_| true),
            None => Ok(false),
        }
    }

    pub async fn handle_ended(&mut self, coordinator: &PlaybackCoordinator) -> Result<EndAction> {
        let action = self.end_action();
        debug!(?action, "Playlist item ended");
        match action {
            EndAction::Restart => {
                coordinator.seek(0.0).await;
                coordinator.play().await;
            }
            EndAction::Advance(index) => self.select(coordinator, index, true).await?,
            EndAction::Stop => {}
        }
        Ok(action)
    }
}

#[cfg(all(test, feature = "simulated"))]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::coordinator::MediaCatalog;
    use crate::media::{MediaResource, SimulatedMedia, SimulatedMediaConfig};

    fn url(name: &str) -> Url {
        Url::parse(&format!("https://cdn.example.com/{}", name)).unwrap()
    }

    fn urls() -> PlaylistSource {
        PlaylistSource::Urls(vec![url("a.mp4"), url("b.mp4"), url("c.mp4")])
    }

    #[test]
    fn test_source_shapes() {
        let single: PlaylistSource = serde_json::from_str(r#""https://cdn.example.com/a.mp4""#).unwrap();
        assert_eq!(single.into_items()[0].title, "a.mp4");

        let items: PlaylistSource =
            serde_json::from_str(r#"[{"src": "https://cdn.example.com/a.mp4", "title": "Intro"}]"#).unwrap();
        assert_eq!(items.into_items()[0].title, "Intro");

        let list: PlaylistSource = serde_json::from_str(r#"["https://cdn.example.com/"]"#).unwrap();
        assert_eq!(list.into_items()[0].title, "Video 1");
    }

    #[test]
    fn test_empty_playlist_rejected() {
        assert!(Playlist::new(PlaylistSource::Urls(vec![]), false).is_err());
    }

    #[test]
    fn test_navigation_bounds() {
        let playlist = Playlist::new(urls(), false).unwrap();
        assert_eq!(playlist.previous_index(), None);
        assert_eq!(playlist.next_index(), Some(1));

        let looping = Playlist::new(urls(), true).unwrap();
        assert_eq!(looping.previous_index(), Some(2));
    }

    #[test]
    fn test_end_actions() {
        let single = Playlist::new(PlaylistSource::Single(url("a.mp4")), true).unwrap();
        assert_eq!(single.end_action(), EndAction::Restart);

        let single = Playlist::new(PlaylistSource::Single(url("a.mp4")), false).unwrap();
        assert_eq!(single.end_action(), EndAction::Stop);

        let mut list = Playlist::new(urls(), false).unwrap();
        assert_eq!(list.end_action(), EndAction::Advance(1));
        list.index = 2;
        assert_eq!(list.end_action(), EndAction::Stop);
        list.loop_playback = true;
        assert_eq!(list.end_action(), EndAction::Advance(0));
    }

    #[tokio::test]
    async fn test_select_loads_and_announces() {
        let (media, mut rx) = SimulatedMedia::with_source(url("a.mp4"), SimulatedMediaConfig::default());
        let coordinator = PlaybackCoordinator::new(media.clone(), MediaCatalog::default(), PlayerConfig::default());
        coordinator.drain(&mut rx).await;
        let mut events = coordinator.subscribe_events();

        let mut playlist = Playlist::new(urls(), false).unwrap();
        assert!(tokio_test::assert_ok!(playlist.next(&coordinator).await));
        coordinator.drain(&mut rx).await;

        assert_eq!(playlist.index(), 1);
        assert_eq!(media.source(), Some(url("b.mp4")));
        let mut announced = None;
        while let Ok(event) = events.try_recv() {
            if let PlayerEvent::PlaylistItemChanged { index, item } = event {
                announced = Some((index, item.title));
            }
        }
        assert_eq!(announced, Some((1, "b.mp4".to_string())));

        let err = tokio_test::assert_err!(playlist.select(&coordinator, 7, false).await);
        assert!(matches!(err, Error::PlaylistIndexOutOfRange { index: 7, count: 3 }));
        assert_eq!(playlist.index(), 1);
    }
}
