//! The interactive globe: scene assembly from country data and chart
//! metadata, selection and hover state, the animations they drive, and the
//! GPU renderer that draws it all through the compositor.

pub mod chart;
pub mod demo;
pub mod engine;
pub mod events;
pub mod material;
pub mod picking;
pub mod renderer;
pub mod scene;

pub use chart::{ChartProvider, ChartSet, CountryChart};
pub use demo::{demo_charts, demo_countries, lon_lat_patch};
pub use engine::{AnimationKey, Completion, GlobeEngine};
pub use events::{Inbox, Notification, Outbox, SelectionEvent, Severity};
pub use material::{
    FileTextureSource, Material, MaterialCache, MaterialId, MaterialKey, PALETTE, TextureError,
    TextureSource, decode_texture, load_texture, palette_color,
};
pub use picking::{ScenePicker, intersect_sphere, intersect_triangle, intersects_aabb};
pub use renderer::{GLOBE_SHADER_SOURCE, GlobeRenderer, MeshUniform, OCEAN_COLOR};
pub use scene::{BASE_RADIUS, CountryEntry, CountryId, EXTRUDE_SUFFIX, GlobeScene, MeshId, SceneMesh};
