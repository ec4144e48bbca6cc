//! Country shell and extrusion geometry.
//!
//! Vertices are projected from (lon, lat) onto the unit sphere. The outer
//! shell reuses the country's triangulation. An inner radius at or below 1
//! adds a second, scaled copy of every vertex. Below 1 the polygon loops are
//! stitched into side walls between the two shells, which is what turns a
//! flat country into a raised slab when the mesh is scaled up.
//!
//! Output is un-indexed triangle soup: three vertices per triangle, with the
//! position, normal and UV streams kept parallel.

use glam::{Vec2, Vec3};

use crate::country::CountryRenderData;
use crate::vertex_format::GlobeVertex;

/// Inner radius that yields the outward surface shell only.
pub const SHELL_ONLY: f32 = f32::INFINITY;

/// Spreads smaller than this are treated as degenerate when rescaling UVs.
const MIN_UV_SPREAD: f32 = 1e-9;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any point will expand.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut aabb, p| {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
            aabb
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// This box after a uniform scale about the origin.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }
}

/// Triangle soup for one country mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryGeometry {
    /// xyz per vertex, 9 floats per triangle.
    pub positions: Vec<f32>,
    /// uv per vertex, 6 floats per triangle.
    pub uvs: Vec<f32>,
    /// xyz per vertex, parallel to `positions`.
    pub normals: Vec<f32>,
}

impl CountryGeometry {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[vertex * 3..vertex * 3 + 3])
    }

    /// Iterate the triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions.chunks_exact(9).map(|t| {
            [
                Vec3::from_slice(&t[0..3]),
                Vec3::from_slice(&t[3..6]),
                Vec3::from_slice(&t[6..9]),
            ]
        })
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points((0..self.vertex_count()).map(|i| self.position(i)))
    }

    /// Interleave the three streams into GPU vertices.
    pub fn to_vertices(&self) -> Vec<GlobeVertex> {
        (0..self.vertex_count())
            .map(|i| GlobeVertex {
                position: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                ],
                normal: [
                    self.normals[i * 3],
                    self.normals[i * 3 + 1],
                    self.normals[i * 3 + 2],
                ],
                uv: [self.uvs[i * 2], self.uvs[i * 2 + 1]],
            })
            .collect()
    }

    fn push(&mut self, corners: [(Vec3, Vec2); 3], normals: [Vec3; 3]) {
        for ((p, uv), n) in corners.into_iter().zip(normals) {
            self.positions.extend_from_slice(&p.to_array());
            self.uvs.extend_from_slice(&uv.to_array());
            self.normals.extend_from_slice(&n.to_array());
        }
    }
}

/// Project degrees longitude/latitude onto the unit sphere.
///
/// `+y` is the north pole, (0, 0) lands on `-z` and longitude grows toward `-x`.
pub fn lon_lat_to_unit(lon: f64, lat: f64) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (180.0 - lon).to_radians();
    Vec3::new(
        (-theta.sin() * phi.sin()) as f32,
        phi.cos() as f32,
        (theta.cos() * phi.sin()) as f32,
    )
}

/// Equirectangular texture coordinate before per-country rescaling.
fn equirectangular_uv(lon: f64, lat: f64) -> Vec2 {
    Vec2::new((0.5 + lon / 360.0) as f32, (0.5 + lat / 180.0) as f32)
}

/// Stretch UVs so the country's own box covers exactly `[0, 1]` on each axis.
fn rescale_uvs(uvs: &mut [Vec2]) {
    if uvs.is_empty() {
        return;
    }
    let (lo, hi) = uvs.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), uv| (lo.min(*uv), hi.max(*uv)),
    );
    let mut spread = hi - lo;
    if spread.x < MIN_UV_SPREAD {
        spread.x = 1.0;
    }
    if spread.y < MIN_UV_SPREAD {
        spread.y = 1.0;
    }
    for uv in uvs.iter_mut() {
        *uv = (*uv - lo) / spread;
    }
}

/// Build the mesh for one country.
///
/// * `inner_radius > 1` (see [`SHELL_ONLY`]): outward surface only.
/// * `inner_radius == 1`: surface plus a coincident back-facing shell.
/// * `0 < inner_radius < 1`: closed slab with both shells and quad walls.
/// * `inner_radius <= 0`: surface plus walls collapsing to a single point.
///
/// Indices must already satisfy [`CountryRenderData::validate`].
pub fn build_country_geometry(data: &CountryRenderData, inner_radius: f32) -> CountryGeometry {
    let n = data.vertex_count();
    let mut vertices: Vec<Vec3> = Vec::with_capacity(n * 2);
    let mut uvs: Vec<Vec2> = Vec::with_capacity(n);

    for pair in data.vertices.chunks_exact(2) {
        let (lon, lat) = (pair[0], pair[1]);
        vertices.push(lon_lat_to_unit(lon, lat));
        uvs.push(equirectangular_uv(lon, lat));
    }
    rescale_uvs(&mut uvs);

    let has_inner_shell = inner_radius <= 1.0;
    if has_inner_shell {
        for i in 0..n {
            vertices.push(vertices[i] * inner_radius);
        }
    }

    let mut geometry = CountryGeometry::default();
    let at = |i: usize| (vertices[i], uvs[i % n]);

    for tri in data.triangles.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        geometry.push(
            [at(a), at(b), at(c)],
            [vertices[a], vertices[b], vertices[c]],
        );

        if has_inner_shell && inner_radius > 0.0 {
            geometry.push(
                [at(n + b), at(n + a), at(n + c)],
                [-vertices[b], -vertices[a], -vertices[c]],
            );
        }
    }

    if inner_radius < 1.0 {
        for polygon in &data.polygons {
            for (loop_index, ring) in polygon.iter().enumerate() {
                let is_hole = loop_index > 0;
                for k in 0..ring.len() {
                    let a = ring[k] as usize;
                    let b = ring[(k + 1) % ring.len()] as usize;
                    let (va1, vb1, va2) = (vertices[a], vertices[b], vertices[n + a]);

                    if is_hole {
                        let normal = (va2 - va1).cross(vb1 - va1).normalize_or_zero();
                        let flat = [normal; 3];
                        geometry.push([at(b), at(a), at(n + a)], flat);
                        if inner_radius > 0.0 {
                            geometry.push([at(b), at(n + a), at(n + b)], flat);
                        }
                    } else {
                        let normal = (vb1 - va1).cross(va2 - va1).normalize_or_zero();
                        let flat = [normal; 3];
                        geometry.push([at(a), at(b), at(n + a)], flat);
                        if inner_radius > 0.0 {
                            geometry.push([at(b), at(n + b), at(n + a)], flat);
                        }
                    }
                }
            }
        }
    }

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    /// 10°×10° square just north-east of (0, 0), split into two triangles.
    fn square() -> CountryRenderData {
        CountryRenderData {
            vertices: vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0],
            triangles: vec![0, 1, 2, 0, 2, 3],
            polygons: vec![vec![vec![0, 1, 2, 3]]],
        }
    }

    /// Square with a square hole: 8 vertices, outer ring and one hole.
    fn square_with_hole() -> CountryRenderData {
        CountryRenderData {
            vertices: vec![
                0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0, // outer
                3.0, 3.0, 7.0, 3.0, 7.0, 7.0, 3.0, 7.0, // hole
            ],
            triangles: vec![
                0, 1, 5, 0, 5, 4, 1, 2, 6, 1, 6, 5, 2, 3, 7, 2, 7, 6, 3, 0, 4, 3, 4, 7,
            ],
            polygons: vec![vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]],
        }
    }

    fn uv_range(geometry: &CountryGeometry) -> (Vec2, Vec2) {
        geometry.uvs.chunks_exact(2).fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), uv| {
                let uv = Vec2::new(uv[0], uv[1]);
                (lo.min(uv), hi.max(uv))
            },
        )
    }

    #[test]
    fn test_projection_reference_points() {
        let north = lon_lat_to_unit(0.0, 90.0);
        assert!((north - Vec3::Y).length() < EPS);

        let origin = lon_lat_to_unit(0.0, 0.0);
        assert!((origin - Vec3::NEG_Z).length() < EPS);
        let east = lon_lat_to_unit(90.0, 0.0);
        assert!((east - Vec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_projection_is_unit_length() {
        for (lon, lat) in [(-170.0, -80.0), (33.3, 12.5), (179.9, 45.0)] {
            assert!((lon_lat_to_unit(lon, lat).length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_shell_only_matches_triangle_count() {
        let data = square();
        let geometry = build_country_geometry(&data, SHELL_ONLY);
        assert_eq!(geometry.triangle_count(), data.triangle_count());
        assert_eq!(geometry.positions.len(), data.triangles.len() * 3);
        assert_eq!(geometry.uvs.len(), data.triangles.len() * 2);
        assert_eq!(geometry.normals.len(), geometry.positions.len());
    }

    #[test]
    fn test_shell_only_positions_come_from_input_vertices() {
        let data = square();
        let geometry = build_country_geometry(&data, SHELL_ONLY);
        let sources: Vec<Vec3> = data
            .vertices
            .chunks_exact(2)
            .map(|p| lon_lat_to_unit(p[0], p[1]))
            .collect();
        for i in 0..geometry.vertex_count() {
            let p = geometry.position(i);
            assert!(sources.iter().any(|s| (*s - p).length() < EPS));
        }
    }

    #[test]
    fn test_uvs_span_unit_square() {
        let geometry = build_country_geometry(&square(), SHELL_ONLY);
        let (lo, hi) = uv_range(&geometry);
        assert!(lo.abs_diff_eq(Vec2::ZERO, EPS));
        assert!(hi.abs_diff_eq(Vec2::ONE, EPS));
    }

    #[test]
    fn test_degenerate_uv_spread_is_finite() {
        // all three vertices on the same meridian: zero u spread
        let data = CountryRenderData {
            vertices: vec![5.0, 0.0, 5.0, 5.0, 5.0, 10.0],
            triangles: vec![0, 1, 2],
            polygons: vec![],
        };
        let geometry = build_country_geometry(&data, SHELL_ONLY);
        assert!(geometry.uvs.iter().all(|v| v.is_finite()));
        let (lo, hi) = uv_range(&geometry);
        assert_eq!(lo.x, 0.0);
        assert_eq!(hi.x, 0.0);
        assert!((hi.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_inner_radius_one_adds_reversed_shell_without_walls() {
        let data = square();
        let geometry = build_country_geometry(&data, 1.0);
        assert_eq!(geometry.triangle_count(), data.triangle_count() * 2);

        // second triangle is the reversed twin of the first
        let tris: Vec<[Vec3; 3]> = geometry.triangles().collect();
        assert!((tris[1][0] - tris[0][1]).length() < EPS);
        assert!((tris[1][1] - tris[0][0]).length() < EPS);
        assert!((tris[1][2] - tris[0][2]).length() < EPS);
    }

    #[test]
    fn test_extrusion_triangle_count() {
        let data = square();
        let geometry = build_country_geometry(&data, 0.9);
        // two shells plus two wall triangles per boundary edge
        let edges = 4;
        assert_eq!(
            geometry.triangle_count(),
            data.triangle_count() * 2 + edges * 2
        );
    }

    #[test]
    fn test_extrusion_with_hole_counts_hole_edges() {
        let data = square_with_hole();
        let geometry = build_country_geometry(&data, 0.5);
        assert_eq!(
            geometry.triangle_count(),
            data.triangle_count() * 2 + (4 + 4) * 2
        );
    }

    #[test]
    fn test_zero_inner_radius_single_wall_triangles() {
        let data = square();
        let geometry = build_country_geometry(&data, 0.0);
        // no reversed shell, one wall triangle per edge
        assert_eq!(geometry.triangle_count(), data.triangle_count() + 4);
    }

    #[test]
    fn test_inner_shell_is_scaled() {
        let geometry = build_country_geometry(&square(), 0.5);
        let radii: Vec<f32> = (0..geometry.vertex_count())
            .map(|i| geometry.position(i).length())
            .collect();
        assert!(radii.iter().any(|r| (r - 1.0).abs() < EPS));
        assert!(radii.iter().any(|r| (r - 0.5).abs() < EPS));
        assert!(radii.iter().all(|r| (r - 1.0).abs() < EPS || (r - 0.5).abs() < EPS));
    }

    #[test]
    fn test_wall_normals_are_unit_and_tangent() {
        let data = square_with_hole();
        let geometry = build_country_geometry(&data, 0.9);
        let shell_tris = data.triangle_count() * 2;
        for (t, tri) in geometry.triangles().enumerate().skip(shell_tris) {
            let normal = Vec3::from_slice(&geometry.normals[t * 9..t * 9 + 3]);
            assert!((normal.length() - 1.0).abs() < EPS);
            // walls lie in planes through the globe centre
            for corner in tri {
                assert!(normal.dot(corner).abs() < 1e-4, "wall {t} not radial");
            }
        }
    }

    #[test]
    fn test_surface_normals_are_radial() {
        let geometry = build_country_geometry(&square(), SHELL_ONLY);
        for i in 0..geometry.vertex_count() {
            let n = Vec3::from_slice(&geometry.normals[i * 3..i * 3 + 3]);
            assert!((n - geometry.position(i)).length() < EPS);
        }
    }

    #[test]
    fn test_bounds_and_vertices() {
        let geometry = build_country_geometry(&square(), SHELL_ONLY);
        let bounds = geometry.bounds();
        assert!(!bounds.is_empty());
        assert!(bounds.center().z < 0.0);

        let vertices = geometry.to_vertices();
        assert_eq!(vertices.len(), geometry.vertex_count());
        assert_eq!(vertices[2].uv, [geometry.uvs[4], geometry.uvs[5]]);
    }

    #[test]
    fn test_empty_country() {
        let geometry = build_country_geometry(&CountryRenderData::default(), 0.9);
        assert_eq!(geometry.triangle_count(), 0);
        assert!(geometry.bounds().is_empty());
    }
}
