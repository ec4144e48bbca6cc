//! Off-screen colour targets and the ping-pong pair the compositor renders
//! through.

/// A colour texture that is (re)allocated lazily to its recorded size.
pub struct RenderTarget {
    label: &'static str,
    width: u32,
    height: u32,
    texture: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl RenderTarget {
    pub fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            width: width.max(1),
            height: height.max(1),
            texture: None,
        }
    }

    /// Record a new size. The texture is replaced on the next [`ensure`](Self::ensure).
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the GPU texture exists and matches the recorded size.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.texture
            .as_ref()
            .is_some_and(|(t, _)| t.width() == self.width && t.height() == self.height)
    }

    /// Allocate or replace the texture if it is missing or stale.
    pub fn ensure(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.is_allocated()
            && self
                .texture
                .as_ref()
                .is_some_and(|(t, _)| t.format() == format)
        {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(self.label),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("Allocated {} at {}x{}", self.label, self.width, self.height);
        self.texture = Some((texture, view));
    }

    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.texture.as_ref().map(|(_, view)| view)
    }
}

/// Two equally sized targets. Passes read from `read` and write to
/// `write`; [`swap`](Self::swap) exchanges them.
pub struct PingPong {
    pub read: RenderTarget,
    pub write: RenderTarget,
}

impl PingPong {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            read: RenderTarget::new("compositor-target-a", width, height),
            write: RenderTarget::new("compositor-target-b", width, height),
        }
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.read.set_size(width, height);
        self.write.set_size(width, height);
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    pub fn ensure(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        self.read.ensure(device, format);
        self.write.ensure(device, format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::init_headless_blocking;

    #[test]
    fn test_set_size_is_lazy() {
        let mut target = RenderTarget::new("t", 800, 600);
        target.set_size(1200, 800);
        assert_eq!(target.size(), (1200, 800));
        assert!(!target.is_allocated());
        assert!(target.view().is_none());
    }

    #[test]
    fn test_zero_size_clamped() {
        let target = RenderTarget::new("t", 0, 0);
        assert_eq!(target.size(), (1, 1));
    }

    #[test]
    fn test_swap_exchanges_targets() {
        let mut pair = PingPong::new(4, 4);
        pair.read.set_size(8, 8);
        pair.swap();
        assert_eq!(pair.write.size(), (8, 8));
        assert_eq!(pair.read.size(), (4, 4));
    }

    #[test]
    fn test_ensure_allocates_at_recorded_size() {
        let Some((device, _queue)) = init_headless_blocking() else {
            return;
        };
        let mut pair = PingPong::new(800, 600);
        pair.ensure(&device, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert!(pair.read.is_allocated());

        pair.set_size(1200, 800);
        assert!(!pair.write.is_allocated());
        pair.ensure(&device, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert!(pair.write.is_allocated());
        assert_eq!(pair.write.size(), (1200, 800));
    }
}
