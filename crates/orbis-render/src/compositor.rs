//! Ordered chain of passes rendered through a pair of ping-pong targets.

use crate::pass::{FrameContext, Pass, PassIo};
use crate::target::PingPong;

pub struct Compositor {
    passes: Vec<Box<dyn Pass>>,
    targets: PingPong,
    format: wgpu::TextureFormat,
    logical_width: u32,
    logical_height: u32,
    pixel_ratio: f64,
}

impl Compositor {
    /// `format` must match the swapchain so any pass can be the last one.
    pub fn new(format: wgpu::TextureFormat, width: u32, height: u32, pixel_ratio: f64) -> Self {
        let mut compositor = Self {
            passes: Vec::new(),
            targets: PingPong::new(1, 1),
            format,
            logical_width: width,
            logical_height: height,
            pixel_ratio: 1.0,
        };
        compositor.set_pixel_ratio(pixel_ratio);
        compositor
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Logical size times pixel ratio, at least 1×1.
    #[must_use]
    pub fn effective_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.logical_width), scale(self.logical_height))
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn targets(&self) -> &PingPong {
        &self.targets
    }

    /// Resize both ping-pong targets and every pass.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.logical_width = width;
        self.logical_height = height;
        let (w, h) = self.effective_size();
        self.targets.set_size(w, h);
        for pass in &mut self.passes {
            pass.set_size(w, h);
        }
        log::debug!("Compositor resized to {w}x{h}");
    }

    /// Change the device pixel ratio and re-apply the current size.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        self.set_size(self.logical_width, self.logical_height);
    }

    /// Append a pass, sized to the current effective size.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        let index = self.passes.len();
        self.insert_pass(pass, index);
    }

    /// Insert a pass at `index` (clamped to the end).
    pub fn insert_pass(&mut self, mut pass: Box<dyn Pass>, index: usize) {
        let (w, h) = self.effective_size();
        pass.set_size(w, h);
        let index = index.min(self.passes.len());
        self.passes.insert(index, pass);
    }

    /// Remove the first pass with `label`.
    pub fn remove_pass(&mut self, label: &str) -> Option<Box<dyn Pass>> {
        let index = self.passes.iter().position(|p| p.label() == label)?;
        Some(self.passes.remove(index))
    }

    pub fn pass_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|p| p.label())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass(&self, index: usize) -> Option<&dyn Pass> {
        self.passes.get(index).map(|p| p.as_ref())
    }

    /// First pass of type `P`.
    pub fn pass_ref<P: Pass>(&self) -> Option<&P> {
        self.passes
            .iter()
            .find_map(|p| p.as_any().downcast_ref::<P>())
    }

    /// First pass of type `P`, mutably.
    pub fn pass_mut<P: Pass>(&mut self) -> Option<&mut P> {
        self.passes
            .iter_mut()
            .find_map(|p| p.as_any_mut().downcast_mut::<P>())
    }

    /// Enable or disable the first pass of type `P`. Returns whether it exists.
    pub fn set_enabled<P: Pass>(&mut self, enabled: bool) -> bool {
        match self.pass_mut::<P>() {
            Some(pass) => {
                pass.state_mut().enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether no enabled pass follows `index`.
    #[must_use]
    pub fn is_last_enabled_pass(&self, index: usize) -> bool {
        !self.passes[index + 1..].iter().any(|p| p.state().enabled)
    }

    /// Set `render_to_screen` on the last enabled pass only.
    pub fn update_screen_flags(&mut self) {
        for index in 0..self.passes.len() {
            let last = self.is_last_enabled_pass(index);
            let state = self.passes[index].state_mut();
            state.render_to_screen = state.enabled && last;
        }
    }

    pub fn swap_buffers(&mut self) {
        self.targets.swap();
    }

    /// Run every enabled pass in order, presenting into `screen`.
    pub fn render(&mut self, frame: &mut FrameContext<'_>, screen: &wgpu::TextureView) {
        self.targets.ensure(frame.device, self.format);
        self.update_screen_flags();

        for index in 0..self.passes.len() {
            if !self.passes[index].state().enabled {
                continue;
            }
            let Self {
                passes,
                targets,
                format,
                ..
            } = self;
            let (Some(read), Some(write)) = (targets.read.view(), targets.write.view()) else {
                log::error!("Compositor targets missing, skipping frame");
                return;
            };
            let pass = &mut passes[index];
            let io = PassIo {
                format: *format,
                read,
                write,
                screen,
                render_to_screen: pass.state().render_to_screen,
            };
            pass.render(frame, &io);

            if pass.state().needs_swap {
                targets.swap();
            }
        }
    }
}
