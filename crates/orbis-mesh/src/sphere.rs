//! Latitude/longitude sphere used as the globe's base surface.

use std::f32::consts::PI;

use glam::Vec3;

use crate::geometry::CountryGeometry;

/// Build a UV sphere as triangle soup in the same stream layout as country
/// meshes, so the globe renderer treats both alike.
///
/// `u` runs with longitude and `v` from the south pole (0) to the north
/// pole (1). Segment counts below the minimum (3 around, 2 vertical) are
/// raised to it.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> CountryGeometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let point = |ix: u32, iy: u32| {
        let u = ix as f32 / width_segments as f32;
        let v = iy as f32 / height_segments as f32;
        let phi = u * 2.0 * PI;
        let theta = v * PI;
        let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
        (normal * radius, normal, [u, 1.0 - v])
    };

    let mut geometry = CountryGeometry::default();
    let mut emit = |corners: [(u32, u32); 3]| {
        for (ix, iy) in corners {
            let (p, n, uv) = point(ix, iy);
            geometry.positions.extend_from_slice(&p.to_array());
            geometry.normals.extend_from_slice(&n.to_array());
            geometry.uvs.extend_from_slice(&uv);
        }
    };

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = (ix + 1, iy);
            let b = (ix, iy);
            let c = (ix, iy + 1);
            let d = (ix + 1, iy + 1);
            // pole rows collapse one triangle of each quad
            if iy != 0 {
                emit([a, b, d]);
            }
            if iy != height_segments - 1 {
                emit([b, c, d]);
            }
        }
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_count() {
        let sphere = uv_sphere(1.0, 8, 4);
        // 2 per quad minus one per quad on each pole row
        assert_eq!(sphere.triangle_count(), 8 * 4 * 2 - 8 * 2);
    }

    #[test]
    fn test_all_points_on_radius() {
        let sphere = uv_sphere(0.995, 16, 8);
        for i in 0..sphere.vertex_count() {
            assert!((sphere.position(i).length() - 0.995).abs() < 1e-5);
        }
    }

    #[test]
    fn test_minimum_segments() {
        let sphere = uv_sphere(1.0, 0, 0);
        assert_eq!(sphere.triangle_count(), 3 * 2 * 2 - 3 * 2);
        assert_eq!(sphere.normals.len(), sphere.positions.len());
    }

    #[test]
    fn test_bounds_cover_sphere() {
        let bounds = uv_sphere(2.0, 32, 16).bounds();
        assert!((bounds.max.y - 2.0).abs() < 1e-5);
        assert!((bounds.min.y + 2.0).abs() < 1e-5);
        assert!(bounds.center().length() < 1e-3);
    }
}
