//! Per-country chart data as far as the globe cares: the cover images of
//! the country's tracks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryChart {
    #[serde(default)]
    pub track_image_urls: Vec<String>,
}

impl CountryChart {
    /// Image used for the country's material.
    pub fn first_image(&self) -> Option<&str> {
        self.track_image_urls.first().map(String::as_str)
    }

    /// A country is selectable once its chart has at least one image.
    pub fn has_images(&self) -> bool {
        !self.track_image_urls.is_empty()
    }
}

/// Source of chart data. Charts may arrive after the globe is built; see
/// [`GlobeScene::refresh_charts`](crate::GlobeScene::refresh_charts).
pub trait ChartProvider {
    fn chart_for(&self, country: &str) -> Option<CountryChart>;
}

/// Charts keyed by country name, as loaded from
/// `{ "<country>": { "track_image_urls": [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSet(BTreeMap<String, CountryChart>);

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, country: impl Into<String>, chart: CountryChart) {
        self.0.insert(country.into(), chart);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ChartProvider for ChartSet {
    fn chart_for(&self, country: &str) -> Option<CountryChart> {
        self.0.get(country).cloned()
    }
}
