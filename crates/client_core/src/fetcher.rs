use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::domain::{Band, BandId};
use tracing::{debug, warn};

use crate::{error::FetchError, source::BandSource};

/// Identifies one fetch by the band it was issued for and its position in
/// the owning view's request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    band_id: BandId,
}

impl FetchTicket {
    pub fn band_id(&self) -> &BandId {
        &self.band_id
    }
}

/// Tracks the newest request a view has issued so that late results for
/// older requests can be dropped instead of applied.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn begin(&self, band_id: BandId) -> FetchTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket { seq, band_id }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    /// Invalidates every ticket issued so far.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct BandFetcher {
    source: Arc<dyn BandSource>,
}

impl BandFetcher {
    pub fn new(source: Arc<dyn BandSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, band_id: &BandId) -> Result<Band, FetchError> {
        let band = match self.source.get_band(band_id).await {
            Ok(band) => band,
            Err(err) => {
                if err.is_not_found() {
                    debug!(band_id = %band_id, "band not found");
                } else {
                    warn!(band_id = %band_id, error = %err, "band fetch failed");
                }
                return Err(err);
            }
        };

        if band.id != *band_id {
            warn!(requested = %band_id, returned = %band.id, "source returned a different band");
            return Err(FetchError::Transport(format!(
                "source returned band {} for request {band_id}",
                band.id
            )));
        }

        debug!(band_id = %band_id, name = %band.name, musicians = band.musicians.len(), "fetched band");
        Ok(band)
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
