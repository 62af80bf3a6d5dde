use serde::{Deserialize, Serialize};

use crate::domain::Genre;

pub const DEFAULT_API_URL: &str = "https://music-band-jekc.onrender.com";

/// Path segments under the api base url that hold band resources.
pub const BAND_COLLECTION_SEGMENTS: [&str; 2] = ["api", "bands"];

/// Full-field update sent with `PUT /api/bands/{id}`. The id travels in the
/// path, never in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBandRequest {
    pub name: String,
    pub genre: Genre,
    pub description: String,
    pub formed_year: i32,
}
