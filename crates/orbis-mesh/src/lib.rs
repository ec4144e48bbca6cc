//! Globe mesh generation: country shells and extrusions built from lon/lat
//! polygon data, the base sphere, and the shared vertex format.

pub mod country;
pub mod error;
pub mod geometry;
pub mod sphere;
pub mod vertex_format;

pub use country::{CountryRenderData, CountrySet};
pub use error::MeshError;
pub use geometry::{Aabb, CountryGeometry, SHELL_ONLY, build_country_geometry, lon_lat_to_unit};
pub use sphere::uv_sphere;
pub use vertex_format::{GLOBE_VERTEX_ATTRIBUTES, GLOBE_VERTEX_LAYOUT, GlobeVertex};
