use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, Either};
use reqwest::{Client, StatusCode};
use shared::{
    domain::{Band, BandId},
    error::ApiErrorBody,
    protocol::{UpdateBandRequest, BAND_COLLECTION_SEGMENTS},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientBuildError, FetchError, SubmitError};

/// Read side of the band api.
#[async_trait]
pub trait BandSource: Send + Sync {
    async fn get_band(&self, band_id: &BandId) -> Result<Band, FetchError>;
}

/// Write side of the band api.
#[async_trait]
pub trait BandUpdater: Send + Sync {
    async fn update_band(
        &self,
        band_id: &BandId,
        request: &UpdateBandRequest,
    ) -> Result<(), SubmitError>;
}

#[derive(Clone)]
pub struct HttpBandClient {
    http: Client,
    base_url: Url,
}

impl HttpBandClient {
    pub fn new(base_url: &str) -> Result<Self, ClientBuildError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientBuildError> {
        let parsed = Url::parse(base_url).map_err(|source| ClientBuildError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientBuildError::NotABase(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn band_url(&self, band_id: &BandId) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base urls are rejected in the constructor
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(BAND_COLLECTION_SEGMENTS)
                .push(band_id.as_str());
        }
        url
    }
}

#[async_trait]
impl BandSource for HttpBandClient {
    async fn get_band(&self, band_id: &BandId) -> Result<Band, FetchError> {
        let url = self.band_url(band_id);
        debug!(%url, "fetching band");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(band_id.clone()));
        }

        let band: Option<Band> = response
            .error_for_status()
            .map_err(|err| FetchError::Transport(err.to_string()))?
            .json()
            .await
            .map_err(|err| FetchError::Transport(format!("invalid band payload: {err}")))?;

        band.ok_or_else(|| FetchError::NotFound(band_id.clone()))
    }
}

#[async_trait]
impl BandUpdater for HttpBandClient {
    async fn update_band(
        &self,
        band_id: &BandId,
        request: &UpdateBandRequest,
    ) -> Result<(), SubmitError> {
        let url = self.band_url(band_id);
        let response = self
            .http
            .put(url)
            .json(request)
            .send()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(band_id = %band_id, status = status.as_u16(), "band updated");
            return Ok(());
        }

        let body = response.bytes().await.unwrap_or_default();
        let reason = ApiErrorBody::from_slice(&body).message().map(str::to_string);
        warn!(
            band_id = %band_id,
            status = status.as_u16(),
            reason = reason.as_deref().unwrap_or("<none>"),
            "band update rejected"
        );
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            reason,
        })
    }
}

/// Races a primary source against a fallback and keeps the first band
/// either of them produces.
pub struct FallbackBandSource {
    primary: Arc<dyn BandSource>,
    fallback: Arc<dyn BandSource>,
}

impl FallbackBandSource {
    pub fn new(primary: Arc<dyn BandSource>, fallback: Arc<dyn BandSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl BandSource for FallbackBandSource {
    async fn get_band(&self, band_id: &BandId) -> Result<Band, FetchError> {
        let primary = self.primary.get_band(band_id);
        let fallback = self.fallback.get_band(band_id);

        match future::select(primary, fallback).await {
            Either::Left((Ok(band), _)) => Ok(band),
            Either::Right((Ok(band), _)) => {
                debug!(band_id = %band_id, "band served by fallback source");
                Ok(band)
            }
            Either::Left((Err(primary_err), fallback)) => match fallback.await {
                Ok(band) => {
                    debug!(band_id = %band_id, error = %primary_err, "primary source failed; fallback answered");
                    Ok(band)
                }
                Err(fallback_err) => Err(merge_failures(primary_err, fallback_err)),
            },
            Either::Right((Err(fallback_err), primary)) => match primary.await {
                Ok(band) => Ok(band),
                Err(primary_err) => Err(merge_failures(primary_err, fallback_err)),
            },
        }
    }
}

fn merge_failures(primary: FetchError, fallback: FetchError) -> FetchError {
    match (primary, fallback) {
        (FetchError::NotFound(band_id), _) | (_, FetchError::NotFound(band_id)) => {
            FetchError::NotFound(band_id)
        }
        (primary, fallback) => {
            warn!(%primary, %fallback, "both band sources failed");
            primary
        }
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
