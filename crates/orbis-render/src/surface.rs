//! Window surface sizing in logical and physical pixels.
//!
//! The compositor works on a logical size times a device pixel ratio. winit
//! reports physical sizes and a scale factor. [`SurfaceWrapper`] reconciles
//! the two, honours a configured pixel-ratio override, and converts pointer
//! positions to normalized device coordinates for picking.

use glam::Vec2;

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

/// Emitted when the surface dimensions or scale factor change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResizeEvent {
    /// Size to configure the swapchain with.
    pub physical: PhysicalSize,
    /// Logical width (physical / scale factor).
    pub logical_width: f64,
    /// Logical height (physical / scale factor).
    pub logical_height: f64,
    /// Pixel ratio the compositor should render at.
    pub pixel_ratio: f64,
}

pub struct SurfaceWrapper {
    physical_width: u32,
    physical_height: u32,
    scale_factor: f64,
    /// `None` follows the window scale factor.
    pixel_ratio_override: Option<f64>,
    configured: bool,
}

impl SurfaceWrapper {
    /// Zero initial dimensions (common on Wayland before the first configure)
    /// are clamped to 1 and the wrapper starts unconfigured.
    ///
    /// A non-positive `pixel_ratio_override` follows the window scale factor.
    pub fn new(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        pixel_ratio_override: f64,
    ) -> Self {
        Self {
            physical_width: physical_width.max(MIN_SURFACE_DIMENSION),
            physical_height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor: sanitize_scale(scale_factor),
            pixel_ratio_override: (pixel_ratio_override > 0.0).then_some(pixel_ratio_override),
            configured: physical_width > 0 && physical_height > 0,
        }
    }

    /// Returns an event only if the dimensions actually changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);

        if width == self.physical_width && height == self.physical_height && self.configured {
            return None;
        }

        self.physical_width = width;
        self.physical_height = height;
        self.configured = true;
        Some(self.event())
    }

    /// A scale change always produces an event: the pixel ratio changed
    /// even when the physical size did not.
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> SurfaceResizeEvent {
        self.scale_factor = sanitize_scale(new_scale_factor);
        self.physical_width = new_physical_width.max(MIN_SURFACE_DIMENSION);
        self.physical_height = new_physical_height.max(MIN_SURFACE_DIMENSION);
        self.configured = true;
        self.event()
    }

    /// The current sizes as a resize event.
    pub fn event(&self) -> SurfaceResizeEvent {
        SurfaceResizeEvent {
            physical: self.physical_size(),
            logical_width: self.logical_width(),
            logical_height: self.logical_height(),
            pixel_ratio: self.pixel_ratio(),
        }
    }

    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.physical_width,
            height: self.physical_height,
        }
    }

    pub fn logical_width(&self) -> f64 {
        self.physical_width as f64 / self.scale_factor
    }

    pub fn logical_height(&self) -> f64 {
        self.physical_height as f64 / self.scale_factor
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Device pixel ratio used for off-screen targets.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio_override.unwrap_or(self.scale_factor)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.physical_width as f32 / self.physical_height as f32
    }

    /// Whether the surface has received a real (non-zero) size.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Convert a logical pointer position to normalized device coordinates
    /// (`x` right, `y` up, both in `[-1, 1]` inside the window).
    pub fn logical_to_ndc(&self, position: Vec2) -> Vec2 {
        let w = self.logical_width().max(1.0) as f32;
        let h = self.logical_height().max(1.0) as f32;
        Vec2::new(position.x / w * 2.0 - 1.0, 1.0 - position.y / h * 2.0)
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
