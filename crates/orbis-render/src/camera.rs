//! Perspective camera that always looks at the globe centre.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Camera data uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Camera orbiting the origin. Position is driven by the dolly state and
/// camera animations; orientation is derived from it.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub position: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl OrbitCamera {
    pub fn new(position: Vec3, fov_y_degrees: f32) -> Self {
        Self {
            position,
            fov_y: fov_y_degrees.to_radians(),
            ..Self::default()
        }
    }

    /// World up, switched to `+z` when looking straight down a pole.
    fn up(&self) -> Vec3 {
        let dir = self.position.normalize_or_zero();
        if dir.dot(Vec3::Y).abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, self.up())
    }

    /// Reverse-Z projection: the near plane maps to depth 1, far to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Picking ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection_matrix().inverse();
        let near = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        Ray {
            origin: self.position,
            direction: (near - self.position).normalize_or_zero(),
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 4.0),
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_hits_origin() {
        let camera = OrbitCamera::new(Vec3::new(0.0, 2.4, 3.2), 45.0);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let to_origin = (-camera.position).normalize();
        assert!((ray.direction - to_origin).length() < 1e-4);
        assert!((ray.at(4.0)).length() < 1e-3);
    }

    #[test]
    fn test_off_center_ray_tilts_right() {
        let camera = OrbitCamera::new(Vec3::new(0.0, 0.0, 4.0), 45.0);
        let ray = camera.ray_from_ndc(Vec2::new(0.5, 0.0));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.z < 0.0);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = OrbitCamera::default();
        let vp = camera.view_projection_matrix();
        let near_point = camera.position + (-camera.position).normalize() * camera.near;
        let clip = vp * near_point.extend(1.0);
        assert!((clip.z / clip.w - 1.0).abs() < 1e-3);

        let far_point = camera.position + (-camera.position).normalize() * camera.far;
        let clip = vp * far_point.extend(1.0);
        assert!((clip.z / clip.w).abs() < 1e-3);
    }

    #[test]
    fn test_polar_position_has_valid_view() {
        let camera = OrbitCamera::new(Vec3::new(0.0, 3.0, 0.0), 45.0);
        let view = camera.view_matrix();
        assert!(view.is_finite());
    }

    #[test]
    fn test_aspect_ratio_ignores_zero_height() {
        let mut camera = OrbitCamera::default();
        camera.set_aspect_ratio(1200.0, 800.0);
        assert!((camera.aspect_ratio - 1.5).abs() < 1e-6);
        camera.set_aspect_ratio(1200.0, 0.0);
        assert!((camera.aspect_ratio - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        let uniform = OrbitCamera::default().to_uniform();
        assert_eq!(uniform.camera_pos, [0.0, 0.0, 4.0, 1.0]);
    }
}
