use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of the current track
///
/// This is the payload of the MPRIS `Metadata` property. The host models it as a
/// single compound value, so it is always transmitted as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// URL identifying the track on the site
    pub url: String,

    /// One or more artist names
    #[serde(deserialize_with = "one_or_many")]
    pub artists: Vec<String>,

    /// Track title
    pub track: String,

    /// Album title
    pub album: String,

    /// URL of the album picture
    pub art_url: String,

    /// Track length in microseconds
    pub track_length: i64,
}

impl Metadata {
    /// Create an empty metadata record
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is known about the current track
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
            && self.artists.is_empty()
            && self.track.is_empty()
            && self.album.is_empty()
            && self.art_url.is_empty()
            && self.track_length == 0
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.track.is_empty() { "Unknown Title" } else { &self.track };
        write!(f, "{}", title)?;
        if !self.artists.is_empty() {
            write!(f, " by {}", self.artists.join(", "))?;
        }
        if !self.album.is_empty() {
            write!(f, " (Album: {})", self.album)?;
        }
        Ok(())
    }
}

/// Sites report either a single artist string or a list of names
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(name)) if name.is_empty() => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
        None => Vec::new(),
    })
}
