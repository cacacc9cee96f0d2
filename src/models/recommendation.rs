use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tier::Tier;

/// Number of cast members shown next to a recommendation
pub const DISPLAY_CAST_LIMIT: usize = 3;

/// One scored movie as returned by the blend service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// External (IMDb) rating
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub votes: Option<u64>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub cast: Option<Vec<String>>,
    /// Synopsis excerpt
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnail_width: Option<u32>,
    #[serde(default)]
    pub thumbnail_height: Option<u32>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub genre_score: Option<f64>,
    #[serde(default)]
    pub plot_score: Option<f64>,
    #[serde(default)]
    pub actor_score: Option<f64>,
    #[serde(default)]
    pub imdb_bonus: Option<f64>,
    #[serde(default)]
    pub recency_bonus: Option<f64>,
    #[serde(default)]
    pub combined_score: Option<f64>,
    /// Fields this client does not model, kept so the item round-trips as received
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Named partial scores the service used to rank an item
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubScores {
    pub genre: Option<f64>,
    pub plot: Option<f64>,
    pub actor: Option<f64>,
    pub rating_bonus: Option<f64>,
    pub recency_bonus: Option<f64>,
}

impl RecommendationItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            rating: None,
            votes: None,
            genres: None,
            cast: None,
            extract: None,
            thumbnail: None,
            thumbnail_width: None,
            thumbnail_height: None,
            href: None,
            genre_score: None,
            plot_score: None,
            actor_score: None,
            imdb_bonus: None,
            recency_bonus: None,
            combined_score: None,
            extra: Map::new(),
        }
    }

    pub fn sub_scores(&self) -> SubScores {
        SubScores {
            genre: self.genre_score,
            plot: self.plot_score,
            actor: self.actor_score,
            rating_bonus: self.imdb_bonus,
            recency_bonus: self.recency_bonus,
        }
    }

    /// First few cast members, in billing order
    pub fn display_cast(&self) -> &[String] {
        match &self.cast {
            Some(cast) => &cast[..cast.len().min(DISPLAY_CAST_LIMIT)],
            None => &[],
        }
    }

    /// Still or poster reference; the service sends "" when it has none
    pub fn still(&self) -> Option<&str> {
        self.thumbnail.as_deref().filter(|t| !t.is_empty())
    }
}

/// Ordered output of one successful blend; position is rank
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RankedResultSet {
    items: Vec<RecommendationItem>,
}

impl RankedResultSet {
    pub fn new(items: Vec<RecommendationItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RecommendationItem] {
        &self.items
    }

    pub fn get(&self, rank: usize) -> Option<&RecommendationItem> {
        self.items.get(rank)
    }

    /// Items in rank order, paired with their presentation tier
    pub fn with_tiers(&self) -> impl Iterator<Item = (usize, Tier, &RecommendationItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(rank, item)| (rank, Tier::of(rank), item))
    }
}

impl From<Vec<RecommendationItem>> for RankedResultSet {
    fn from(items: Vec<RecommendationItem>) -> Self {
        Self::new(items)
    }
}
