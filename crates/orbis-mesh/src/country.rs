//! Per-country polygon data as delivered by the data provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Triangulated country outline on the unit sphere.
///
/// `vertices` is a flat `[lon, lat, lon, lat, ...]` array in degrees.
/// `triangles` indexes vertex pairs three at a time. `polygons` lists, per
/// polygon, the outer boundary loop followed by any hole loops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRenderData {
    pub vertices: Vec<f64>,
    pub triangles: Vec<u32>,
    #[serde(default)]
    pub polygons: Vec<Vec<Vec<u32>>>,
}

impl CountryRenderData {
    /// Number of (lon, lat) vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Check the index invariants the mesh builder relies on.
    pub fn validate(&self, country: &str) -> Result<(), MeshError> {
        if self.vertices.len() % 2 != 0 {
            return Err(MeshError::OddVertexArray {
                country: country.to_string(),
                len: self.vertices.len(),
            });
        }
        if let Some(position) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::NonFiniteCoordinate {
                country: country.to_string(),
                position,
            });
        }
        if self.triangles.len() % 3 != 0 {
            return Err(MeshError::RaggedTriangles {
                country: country.to_string(),
                len: self.triangles.len(),
            });
        }

        let vertex_count = self.vertex_count();
        let loops = self.polygons.iter().flatten().flatten();
        if let Some(&index) = self
            .triangles
            .iter()
            .chain(loops)
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                country: country.to_string(),
                index,
                vertex_count,
            });
        }
        Ok(())
    }
}

/// All countries keyed by name, in a stable (alphabetical) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountrySet {
    countries: BTreeMap<String, CountryRenderData>,
}

impl CountrySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: CountryRenderData) {
        self.countries.insert(name.into(), data);
    }

    pub fn get(&self, name: &str) -> Option<&CountryRenderData> {
        self.countries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryRenderData)> {
        self.countries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Drop every country whose data fails validation, logging each one.
    ///
    /// Returns the number of countries removed.
    pub fn retain_valid(&mut self) -> usize {
        let before = self.countries.len();
        self.countries.retain(|name, data| match data.validate(name) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping country: {e}");
                false
            }
        });
        before - self.countries.len()
    }
}
