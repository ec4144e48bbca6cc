//! Ray casts against the globe: the base sphere analytically, country
//! meshes triangle by triangle behind a bounding-box test.

use glam::{Vec2, Vec3};
use orbis_input::Picker;
use orbis_mesh::Aabb;
use orbis_render::{OrbitCamera, Ray};

use crate::scene::GlobeScene;

const EPSILON: f32 = 1e-7;

/// Möller–Trumbore. Hits from either side count because the winding of the
/// source polygons is not normalized. Returns the ray parameter.
pub fn intersect_triangle(ray: &Ray, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

/// Nearest positive hit with a sphere centred at the origin.
pub fn intersect_sphere(ray: &Ray, radius: f32) -> Option<f32> {
    let b = ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [-b - root, -b + root].into_iter().find(|&t| t > EPSILON)
}

/// Slab test.
pub fn intersects_aabb(ray: &Ray, aabb: &Aabb) -> bool {
    if aabb.is_empty() {
        return false;
    }
    let inv = ray.direction.recip();
    let t0 = (aabb.min - ray.origin) * inv;
    let t1 = (aabb.max - ray.origin) * inv;
    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();
    t_far >= t_near.max(0.0)
}

/// Picks countries under a logical window position.
pub struct ScenePicker<'a> {
    pub scene: &'a GlobeScene,
    pub camera: &'a OrbitCamera,
    /// Logical window size.
    pub viewport: Vec2,
}

impl ScenePicker<'_> {
    fn to_ndc(&self, position: Vec2) -> Vec2 {
        let size = self.viewport.max(Vec2::ONE);
        Vec2::new(position.x / size.x * 2.0 - 1.0, 1.0 - position.y / size.y * 2.0)
    }
}

impl Picker for ScenePicker<'_> {
    fn pick(&self, position: Vec2) -> Option<String> {
        let ray = self.camera.ray_from_ndc(self.to_ndc(position));
        let id = self.scene.pick(&ray)?;
        self.scene.country(id).map(|c| c.name.clone())
    }
}
