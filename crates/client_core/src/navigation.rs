use std::fmt;

use shared::domain::BandId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    BandDetail(BandId),
    EditBand(BandId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::BandDetail(band_id) => format!("/bands/{band_id}"),
            Route::EditBand(band_id) => format!("/bands/{band_id}/edit"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Forwards navigation requests to whoever owns the receiving end, usually
/// the shell's router loop.
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        debug!(%route, "navigating");
        if self.tx.send(route).is_err() {
            warn!("navigation receiver dropped; route discarded");
        }
    }
}
