use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::models::Hashtag;
use crate::persistence::{self, DynSnapshotStore, HASHTAG_PARTITION};

/// Always offered by the picker, independent of trending state.
pub const STATIC_HASHTAGS: &[&str] = &[
    "#KRCT",
    "#Campus",
    "#Study",
    "#Events",
    "#College",
    "#Student",
    "#University",
    "#Academic",
];

fn default_trending() -> Vec<Hashtag> {
    vec![
        Hashtag::new("#KRCT", 245, true),
        Hashtag::new("#CampusLife", 189, true),
        Hashtag::new("#TechFest2024", 167, true),
        Hashtag::new("#StudyGroup", 156, false),
        Hashtag::new("#PlacementSeason", 134, true),
        Hashtag::new("#CulturalDay", 122, true),
        Hashtag::new("#KRCTSports", 98, false),
        Hashtag::new("#Alumni2024", 87, true),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagState {
    pub trending_hashtags: Vec<Hashtag>,
    /// Insertion order, no duplicates
    pub custom_hashtags: Vec<String>,
}

impl Default for HashtagState {
    fn default() -> Self {
        Self {
            trending_hashtags: default_trending(),
            custom_hashtags: Vec::new(),
        }
    }
}

pub struct HashtagStore {
    state: HashtagState,
    snapshots: Option<DynSnapshotStore>,
}

impl Default for HashtagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HashtagStore {
    pub fn new() -> Self {
        Self {
            state: HashtagState::default(),
            snapshots: None,
        }
    }

    pub fn with_snapshots(snapshots: DynSnapshotStore) -> Self {
        let state = persistence::restore_or(Some(&snapshots), HASHTAG_PARTITION, HashtagState::default);
        Self {
            state,
            snapshots: Some(snapshots),
        }
    }

    pub fn trending(&self) -> &[Hashtag] {
        &self.state.trending_hashtags
    }

    pub fn custom(&self) -> &[String] {
        &self.state.custom_hashtags
    }

    /// Insert with set semantics. Returns false when the tag was already present.
    /// Callers normalize first (see [`normalize_hashtag`]).
    pub fn add_custom_hashtag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.state.custom_hashtags.contains(&tag) {
            return false;
        }
        tracing::debug!("Adding custom hashtag {}", tag);
        self.state.custom_hashtags.push(tag);
        self.commit();
        true
    }

    /// Full replacement of the trending list.
    pub fn update_trending_hashtags(&mut self, hashtags: Vec<Hashtag>) {
        self.state.trending_hashtags = hashtags;
        self.commit();
    }

    /// Exact-match lookup; bumps the count and marks the tag rising.
    pub fn increment_hashtag_count(&mut self, tag: &str) -> StoreResult<()> {
        let hashtag = self
            .state
            .trending_hashtags
            .iter_mut()
            .find(|h| h.tag == tag)
            .ok_or_else(|| StoreError::HashtagNotFound(tag.to_string()))?;

        hashtag.count += 1;
        hashtag.is_rising = true;
        self.commit();
        Ok(())
    }

    /// Picker suggestions: trending, static, then custom tags containing
    /// `search` (case-insensitive). An empty search yields nothing.
    pub fn suggestions(&self, search: &str) -> Vec<String> {
        if search.is_empty() {
            return Vec::new();
        }
        let needle = search.to_lowercase();

        self.state
            .trending_hashtags
            .iter()
            .map(|h| h.tag.as_str())
            .chain(STATIC_HASHTAGS.iter().copied())
            .chain(self.state.custom_hashtags.iter().map(String::as_str))
            .filter(|tag| tag.to_lowercase().contains(&needle))
            .map(str::to_string)
            .collect()
    }

    fn commit(&self) {
        persistence::mirror(self.snapshots.as_ref(), HASHTAG_PARTITION, &self.state);
    }
}

/// Strip whitespace and ensure a single leading `#`.
pub fn normalize_hashtag(raw: &str) -> Result<String, ValidationError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let body = compact.trim_start_matches('#');
    if body.is_empty() {
        return Err(ValidationError::EmptyHashtag);
    }
    if compact.starts_with('#') {
        Ok(compact)
    } else {
        Ok(format!("#{}", compact))
    }
}

/// Hashtags appearing in free text, in order of first appearance.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for word in content.split_whitespace() {
        let Some(rest) = word.strip_prefix('#') else {
            continue;
        };
        let body: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if body.is_empty() {
            continue;
        }
        let tag = format!("#{}", body);
        if !found.contains(&tag) {
            found.push(tag);
        }
    }
    found
}
