#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Band, BandId, Genre, Musician, MusicianId},
    error::ApiErrorBody,
    protocol::UpdateBandRequest,
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    error::{FetchError, SubmitError},
    navigation::{Navigator, Route},
    source::{BandSource, BandUpdater},
};

pub fn the_reds() -> Band {
    Band {
        id: BandId::from("5"),
        name: "The Reds".to_string(),
        genre: Genre::Rock,
        description: "A rock band from 1990".to_string(),
        formed_year: 1990,
        musicians: Vec::new(),
    }
}

pub fn blue_notes() -> Band {
    Band {
        id: BandId::from("9"),
        name: "Blue Notes".to_string(),
        genre: Genre::Jazz,
        description: "Late night quartet from Chicago".to_string(),
        formed_year: 1962,
        musicians: vec![
            Musician {
                id: MusicianId::from("91"),
                name: "Ada".to_string(),
                instrument: "Saxophone".to_string(),
            },
            Musician {
                id: MusicianId::from("92"),
                name: "Ben".to_string(),
                instrument: "Double Bass".to_string(),
            },
        ],
    }
}

/// In-memory read side with optional per-band latency.
#[derive(Default)]
pub struct StaticBandSource {
    bands: HashMap<BandId, Band>,
    delays: HashMap<BandId, Duration>,
    failure: Option<FetchError>,
    calls: std::sync::Mutex<Vec<BandId>>,
}

impl StaticBandSource {
    pub fn with_bands(bands: impl IntoIterator<Item = Band>) -> Self {
        Self {
            bands: bands
                .into_iter()
                .map(|band| (band.id.clone(), band))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, band_id: &str, delay: Duration) -> Self {
        self.delays.insert(BandId::from(band_id), delay);
        self
    }

    pub fn calls(&self) -> Vec<BandId> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl BandSource for StaticBandSource {
    async fn get_band(&self, band_id: &BandId) -> Result<Band, FetchError> {
        self.calls.lock().expect("calls").push(band_id.clone());
        if let Some(delay) = self.delays.get(band_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.bands
            .get(band_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(band_id.clone()))
    }
}

/// Records update calls and answers from a scripted queue (success once the
/// queue is empty).
#[derive(Default)]
pub struct RecordingUpdater {
    requests: Mutex<Vec<(BandId, UpdateBandRequest)>>,
    responses: Mutex<VecDeque<Result<(), SubmitError>>>,
    latency: Option<Duration>,
}

impl RecordingUpdater {
    pub fn answering(responses: impl IntoIterator<Item = Result<(), SubmitError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn requests(&self) -> Vec<(BandId, UpdateBandRequest)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl BandUpdater for RecordingUpdater {
    async fn update_band(
        &self,
        band_id: &BandId,
        request: &UpdateBandRequest,
    ) -> Result<(), SubmitError> {
        self.requests
            .lock()
            .await
            .push((band_id.clone(), request.clone()));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.responses.lock().await.pop_front().unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: std::sync::Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("routes").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("routes").push(route);
    }
}

#[derive(Clone, Default)]
pub struct MockApiState {
    pub bands: Arc<Mutex<HashMap<String, Band>>>,
    pub updates: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    /// Bodies served verbatim for GET, ahead of `bands`.
    pub raw_bands: Arc<HashMap<String, serde_json::Value>>,
    pub reject_with: Option<(StatusCode, Option<String>)>,
    pub fail_reads: bool,
}

impl MockApiState {
    pub fn with_bands(bands: impl IntoIterator<Item = Band>) -> Self {
        let bands = bands
            .into_iter()
            .map(|band| (band.id.as_str().to_string(), band))
            .collect();
        Self {
            bands: Arc::new(Mutex::new(bands)),
            ..Self::default()
        }
    }

    pub fn with_raw_band(band_id: &str, body: serde_json::Value) -> Self {
        Self {
            raw_bands: Arc::new(HashMap::from([(band_id.to_string(), body)])),
            ..Self::default()
        }
    }

    pub fn rejecting(mut self, status: StatusCode, reason: Option<&str>) -> Self {
        self.reject_with = Some((status, reason.map(str::to_string)));
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }
}

async fn handle_get_band(
    State(state): State<MockApiState>,
    Path(band_id): Path<String>,
) -> Response {
    if state.fail_reads {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if band_id == "missing" {
        return StatusCode::NOT_FOUND.into_response();
    }
    if let Some(body) = state.raw_bands.get(&band_id) {
        return Json(body.clone()).into_response();
    }
    // unknown ids answer `null`, the way the directory api does
    Json(state.bands.lock().await.get(&band_id).cloned()).into_response()
}

async fn handle_put_band(
    State(state): State<MockApiState>,
    Path(band_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.updates.lock().await.push((band_id.clone(), body.clone()));

    if let Some((status, reason)) = &state.reject_with {
        return match reason {
            Some(reason) => (*status, Json(ApiErrorBody::new(reason.clone()))).into_response(),
            None => (*status, "upstream exploded").into_response(),
        };
    }

    let mut bands = state.bands.lock().await;
    let Some(band) = bands.get_mut(&band_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Ok(update) = serde_json::from_value::<UpdateBandRequest>(body) {
        band.name = update.name;
        band.genre = update.genre;
        band.description = update.description;
        band.formed_year = update.formed_year;
    }
    Json(band.clone()).into_response()
}

pub async fn spawn_band_api(state: MockApiState) -> std::io::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/bands/:id", get(handle_get_band).put(handle_put_band))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}
