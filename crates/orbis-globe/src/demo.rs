//! Built-in sample data, used when no country file is configured and by
//! tests. Countries are lon/lat rectangles subdivided finely enough that
//! their triangles stay outside the base sphere.

use orbis_mesh::{CountryRenderData, CountrySet};

use crate::chart::{ChartSet, CountryChart};

/// Cells per side of each demo rectangle.
const STEPS: u32 = 8;

/// Name, centre longitude, centre latitude, half extents in degrees.
const DEMO_COUNTRIES: &[(&str, f64, f64, f64, f64)] = &[
    // Straight ahead of the default camera.
    ("Borealia", 180.0, 37.0, 10.0, 8.0),
    ("Oceanis", 150.0, 5.0, 8.0, 6.0),
    ("Meridia", -150.0, -15.0, 9.0, 7.0),
    ("Verdant", 60.0, 20.0, 12.0, 9.0),
    ("Cascadia", -100.0, 45.0, 10.0, 6.0),
    ("Austral", 0.0, -40.0, 14.0, 8.0),
];

/// Countries with cover images.
const DEMO_CHARTS: &[(&str, &[&str])] = &[
    ("Borealia", &["covers/borealia.png", "covers/borealia-2.png"]),
    ("Meridia", &["covers/meridia.png"]),
    ("Verdant", &["covers/verdant.png"]),
];

/// A `STEPS` × `STEPS` grid over the rectangle with a single outline loop.
pub fn lon_lat_patch(lon: f64, lat: f64, half_lon: f64, half_lat: f64) -> CountryRenderData {
    let row = STEPS + 1;
    let mut vertices = Vec::with_capacity((row * row * 2) as usize);
    for j in 0..row {
        for i in 0..row {
            let u = f64::from(i) / f64::from(STEPS);
            let v = f64::from(j) / f64::from(STEPS);
            vertices.push(lon - half_lon + 2.0 * half_lon * u);
            vertices.push(lat - half_lat + 2.0 * half_lat * v);
        }
    }

    let index = |i: u32, j: u32| j * row + i;
    let mut triangles = Vec::with_capacity((STEPS * STEPS * 6) as usize);
    for j in 0..STEPS {
        for i in 0..STEPS {
            let (a, b, c, d) = (
                index(i, j),
                index(i + 1, j),
                index(i + 1, j + 1),
                index(i, j + 1),
            );
            triangles.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    let mut outline = Vec::with_capacity((STEPS * 4) as usize);
    outline.extend((0..STEPS).map(|i| index(i, 0)));
    outline.extend((0..STEPS).map(|j| index(STEPS, j)));
    outline.extend((1..=STEPS).rev().map(|i| index(i, STEPS)));
    outline.extend((1..=STEPS).rev().map(|j| index(0, j)));

    CountryRenderData {
        vertices,
        triangles,
        polygons: vec![vec![outline]],
    }
}

pub fn demo_countries() -> CountrySet {
    let mut set = CountrySet::new();
    for &(name, lon, lat, half_lon, half_lat) in DEMO_COUNTRIES {
        set.insert(name, lon_lat_patch(lon, lat, half_lon, half_lat));
    }
    set
}

pub fn demo_charts() -> ChartSet {
    let mut charts = ChartSet::new();
    for &(name, urls) in DEMO_CHARTS {
        charts.insert(
            name,
            CountryChart {
                track_image_urls: urls.iter().map(|u| u.to_string()).collect(),
            },
        );
    }
    charts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_is_valid() {
        let patch = lon_lat_patch(10.0, 20.0, 5.0, 4.0);
        assert!(patch.validate("patch").is_ok());
        assert_eq!(patch.vertex_count(), 81);
        assert_eq!(patch.triangle_count(), 128);
        let outline = &patch.polygons[0][0];
        assert_eq!(outline.len(), 32);
        let mut unique = outline.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), outline.len());
    }

    #[test]
    fn test_demo_sets() {
        let mut countries = demo_countries();
        assert_eq!(countries.len(), DEMO_COUNTRIES.len());
        assert_eq!(countries.retain_valid(), 0);
        assert_eq!(demo_charts().len(), DEMO_CHARTS.len());
    }
}
