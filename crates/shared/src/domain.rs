use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Ids arrive from the API as either JSON strings or integers; both are kept
/// as their textual form and compared verbatim.
macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_text()))
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Signed(value) => value.to_string(),
            RawId::Unsigned(value) => value.to_string(),
        }
    }
}

id_newtype!(BandId);
id_newtype!(MusicianId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Rock,
    Jazz,
    Electronic,
    Pop,
    #[serde(rename = "Hip Hop")]
    HipHop,
    Classical,
    Country,
    Indie,
}

impl Genre {
    /// Select order used by the edit form.
    pub const ALL: [Genre; 8] = [
        Genre::Rock,
        Genre::Jazz,
        Genre::Electronic,
        Genre::Pop,
        Genre::HipHop,
        Genre::Classical,
        Genre::Country,
        Genre::Indie,
    ];

    /// Wire value, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Rock => "Rock",
            Genre::Jazz => "Jazz",
            Genre::Electronic => "Electronic",
            Genre::Pop => "Pop",
            Genre::HipHop => "Hip Hop",
            Genre::Classical => "Classical",
            Genre::Country => "Country",
            Genre::Indie => "Indie",
        }
    }

    /// Option label shown next to the wire value in a genre picker.
    pub fn label(self) -> &'static str {
        match self {
            Genre::Rock => "🎸 Rock",
            Genre::Jazz => "🎷 Jazz",
            Genre::Electronic => "🎧 Electronic",
            Genre::Pop => "🎵 Pop",
            Genre::HipHop => "🎤 Hip Hop",
            Genre::Classical => "🎼 Classical",
            Genre::Country => "🤠 Country",
            Genre::Indie => "🎤 Indie",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Musician {
    pub id: MusicianId,
    pub name: String,
    pub instrument: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub id: BandId,
    pub name: String,
    pub genre: Genre,
    pub description: String,
    pub formed_year: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub musicians: Vec<Musician>,
}

/// The api sends `null` for bands that never had members listed.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
