use std::sync::Arc;

use shared::domain::{Band, BandId, MusicianId};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    error::FetchError,
    fetcher::{BandFetcher, RequestTracker},
    navigation::Route,
    source::BandSource,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberItem {
    /// Stable key for list reconciliation.
    pub key: MusicianId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandDetail {
    pub band_id: BandId,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// `None` when the band has no musicians; the section is omitted.
    pub members: Option<Vec<MemberItem>>,
    pub back_link: Route,
}

impl BandDetail {
    pub fn from_band(band: &Band) -> Self {
        let members = (!band.musicians.is_empty()).then(|| {
            band.musicians
                .iter()
                .map(|musician| MemberItem {
                    key: musician.id.clone(),
                    label: format!("{} - {}", musician.name, musician.instrument),
                })
                .collect()
        });

        Self {
            band_id: band.id.clone(),
            title: band.name.clone(),
            subtitle: format!("{} • Formed {}", band.genre, band.formed_year),
            description: band.description.clone(),
            members,
            back_link: Route::Home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailViewState {
    Loading,
    Error(String),
    NotFound,
    Loaded(BandDetail),
}

/// Read-only projection of one band.
pub struct DetailView {
    fetcher: BandFetcher,
    requests: RequestTracker,
    view: watch::Sender<DetailViewState>,
}

impl DetailView {
    pub fn new(source: Arc<dyn BandSource>) -> Arc<Self> {
        let (view, _) = watch::channel(DetailViewState::Loading);
        Arc::new(Self {
            fetcher: BandFetcher::new(source),
            requests: RequestTracker::default(),
            view,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailViewState> {
        self.view.subscribe()
    }

    pub fn view_state(&self) -> DetailViewState {
        self.view.borrow().clone()
    }

    /// Fetches `band_id` and publishes the result unless a newer `show`
    /// call or `unmount` happened in the meantime.
    pub async fn show(&self, band_id: BandId) {
        let ticket = self.requests.begin(band_id.clone());
        self.view.send_replace(DetailViewState::Loading);

        let result = self.fetcher.fetch(&band_id).await;
        if !self.requests.is_current(&ticket) {
            debug!(band_id = %band_id, "discarding stale band detail");
            return;
        }

        let next = match result {
            Ok(band) => DetailViewState::Loaded(BandDetail::from_band(&band)),
            Err(FetchError::NotFound(_)) => DetailViewState::NotFound,
            Err(err @ FetchError::Transport(_)) => DetailViewState::Error(err.to_string()),
        };
        self.view.send_replace(next);
    }

    pub fn unmount(&self) {
        self.requests.cancel();
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
