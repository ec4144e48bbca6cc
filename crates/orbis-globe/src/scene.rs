//! The globe scene: a base sphere plus a flat and an optional extruded mesh
//! per country, addressed through explicit ids instead of name lookups.

use orbis_config::GlobeConfig;
use orbis_mesh::{
    Aabb, CountryGeometry, CountryRenderData, CountrySet, SHELL_ONLY, build_country_geometry,
    uv_sphere,
};
use orbis_render::Ray;
use rustc_hash::FxHashMap;

use crate::chart::ChartProvider;
use crate::material::{MaterialCache, MaterialId, MaterialKey, PALETTE};
use crate::picking::{intersect_sphere, intersect_triangle, intersects_aabb};

/// Radius of the base sphere, just under the country shells.
pub const BASE_RADIUS: f32 = 0.995;
const BASE_WIDTH_SEGMENTS: u32 = 30;
const BASE_HEIGHT_SEGMENTS: u32 = 15;

/// Suffix of extrusion mesh names.
pub const EXTRUDE_SUFFIX: &str = "_extrude";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

#[derive(Debug, Clone)]
pub struct SceneMesh {
    /// `<country>` or `<country>_extrude`; the base sphere is unnamed.
    pub name: Option<String>,
    pub country: Option<CountryId>,
    pub geometry: CountryGeometry,
    /// Bounds at scale 1.
    pub bounds: Aabb,
    /// `None` for the base sphere.
    pub material: Option<MaterialId>,
    pub visible: bool,
    /// Uniform scale about the globe centre.
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct CountryEntry {
    pub name: String,
    pub flat: MeshId,
    pub extrude: Option<MeshId>,
    pub material: MaterialId,
    pub palette_index: usize,
    source: CountryRenderData,
}

pub struct GlobeScene {
    meshes: Vec<SceneMesh>,
    countries: Vec<CountryEntry>,
    by_name: FxHashMap<String, CountryId>,
    materials: MaterialCache,
    base: MeshId,
    extrude_inner_radius: f32,
    outlined: Vec<CountryId>,
}

impl GlobeScene {
    /// Assemble the globe. Countries whose chart has at least one image get
    /// an extrusion mesh and an image material.
    pub fn build(countries: &CountrySet, charts: &dyn ChartProvider, config: &GlobeConfig) -> Self {
        let mut scene = Self {
            meshes: Vec::with_capacity(countries.len() * 2 + 1),
            countries: Vec::with_capacity(countries.len()),
            by_name: FxHashMap::default(),
            materials: MaterialCache::new(),
            base: MeshId(0),
            extrude_inner_radius: config.extrude_inner_radius,
            outlined: Vec::new(),
        };
        let base_geometry = uv_sphere(BASE_RADIUS, BASE_WIDTH_SEGMENTS, BASE_HEIGHT_SEGMENTS);
        scene.base = scene.push_mesh(None, None, base_geometry, None, true);

        for (index, (name, data)) in countries.iter().enumerate() {
            let palette_index = index % PALETTE.len();
            let image = charts
                .chart_for(name)
                .and_then(|c| c.first_image().map(str::to_string));
            let key = match &image {
                Some(url) => MaterialKey::Image(url.clone()),
                None => MaterialKey::Palette(palette_index),
            };
            let material = scene.materials.get_or_insert(key, palette_index);

            let id = CountryId(scene.countries.len());
            let flat = scene.push_mesh(
                Some(name.to_string()),
                Some(id),
                build_country_geometry(data, SHELL_ONLY),
                Some(material),
                true,
            );
            scene.countries.push(CountryEntry {
                name: name.to_string(),
                flat,
                extrude: None,
                material,
                palette_index,
                source: data.clone(),
            });
            scene.by_name.insert(name.to_string(), id);
            if image.is_some() {
                scene.add_extrude(id);
            }
        }

        tracing::info!(
            countries = scene.countries.len(),
            extrudable = scene.extrudable_count(),
            materials = scene.materials.len(),
            "Globe assembled"
        );
        scene
    }

    fn push_mesh(
        &mut self,
        name: Option<String>,
        country: Option<CountryId>,
        geometry: CountryGeometry,
        material: Option<MaterialId>,
        visible: bool,
    ) -> MeshId {
        let id = MeshId(self.meshes.len());
        let bounds = geometry.bounds();
        self.meshes.push(SceneMesh {
            name,
            country,
            geometry,
            bounds,
            material,
            visible,
            scale: 1.0,
        });
        id
    }

    fn add_extrude(&mut self, id: CountryId) {
        let entry = &self.countries[id.0];
        let name = format!("{}{EXTRUDE_SUFFIX}", entry.name);
        let geometry = build_country_geometry(&entry.source, self.extrude_inner_radius);
        let material = entry.material;
        let mesh = self.push_mesh(Some(name), Some(id), geometry, Some(material), false);
        self.countries[id.0].extrude = Some(mesh);
    }

    /// Build extrusion meshes for countries whose chart images arrived after
    /// assembly, switching them to their image material. Returns the
    /// countries that became selectable.
    pub fn refresh_charts(&mut self, charts: &dyn ChartProvider) -> Vec<CountryId> {
        let mut added = Vec::new();
        for index in 0..self.countries.len() {
            let entry = &self.countries[index];
            if entry.extrude.is_some() {
                continue;
            }
            let Some(url) = charts
                .chart_for(&entry.name)
                .and_then(|c| c.first_image().map(str::to_string))
            else {
                continue;
            };
            let material = self
                .materials
                .get_or_insert(MaterialKey::Image(url), entry.palette_index);
            let flat = entry.flat;
            self.countries[index].material = material;
            self.meshes[flat.0].material = Some(material);
            self.add_extrude(CountryId(index));
            added.push(CountryId(index));
        }
        if !added.is_empty() {
            tracing::info!(count = added.len(), "Chart data arrived for more countries");
        }
        added
    }

    pub fn base_mesh(&self) -> MeshId {
        self.base
    }

    pub fn find(&self, name: &str) -> Option<CountryId> {
        self.by_name.get(name).copied()
    }

    pub fn country(&self, id: CountryId) -> Option<&CountryEntry> {
        self.countries.get(id.0)
    }

    pub fn countries(&self) -> impl Iterator<Item = (CountryId, &CountryEntry)> {
        self.countries
            .iter()
            .enumerate()
            .map(|(i, c)| (CountryId(i), c))
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn extrudable_count(&self) -> usize {
        self.countries.iter().filter(|c| c.extrude.is_some()).count()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&SceneMesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &SceneMesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn materials(&self) -> &MaterialCache {
        &self.materials
    }

    pub fn has_extrude(&self, id: CountryId) -> bool {
        self.country(id).is_some_and(|c| c.extrude.is_some())
    }

    /// Show the extrusion instead of the flat mesh, or back. Countries
    /// without an extrusion keep their flat mesh.
    pub fn set_extruded(&mut self, id: CountryId, extruded: bool) {
        let Some(entry) = self.countries.get(id.0) else {
            return;
        };
        let Some(extrude) = entry.extrude else {
            return;
        };
        let flat = entry.flat;
        self.meshes[flat.0].visible = !extruded;
        self.meshes[extrude.0].visible = extruded;
    }

    pub fn is_extruded(&self, id: CountryId) -> bool {
        self.country(id)
            .and_then(|c| c.extrude)
            .is_some_and(|m| self.meshes[m.0].visible)
    }

    pub fn set_extrude_scale(&mut self, id: CountryId, scale: f32) {
        if let Some(extrude) = self.country(id).and_then(|c| c.extrude) {
            self.meshes[extrude.0].scale = scale;
        }
    }

    pub fn extrude_scale(&self, id: CountryId) -> Option<f32> {
        let extrude = self.country(id)?.extrude?;
        Some(self.meshes[extrude.0].scale)
    }

    /// Whichever mesh of the pair is showing.
    pub fn visible_mesh(&self, id: CountryId) -> Option<MeshId> {
        let entry = self.country(id)?;
        match entry.extrude {
            Some(extrude) if self.meshes[extrude.0].visible => Some(extrude),
            _ => Some(entry.flat),
        }
    }

    /// Centre of the country's flat mesh bounds.
    pub fn country_center(&self, id: CountryId) -> Option<glam::Vec3> {
        let entry = self.country(id)?;
        let bounds = &self.meshes[entry.flat.0].bounds;
        (!bounds.is_empty()).then(|| bounds.center())
    }

    pub fn set_outlined(&mut self, countries: impl IntoIterator<Item = CountryId>) {
        self.outlined.clear();
        for id in countries {
            if id.0 < self.countries.len() && !self.outlined.contains(&id) {
                self.outlined.push(id);
            }
        }
    }

    pub fn outlined(&self) -> &[CountryId] {
        &self.outlined
    }

    /// Visible meshes of the outlined countries.
    pub fn outlined_meshes(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.outlined
            .iter()
            .filter_map(|&id| self.visible_mesh(id))
    }

    /// Nearest visible country along `ray`. The base sphere occludes what
    /// lies behind it but is never picked itself.
    pub fn pick(&self, ray: &Ray) -> Option<CountryId> {
        let mut nearest = intersect_sphere(ray, BASE_RADIUS).unwrap_or(f32::INFINITY);
        let mut hit = None;
        for mesh in &self.meshes {
            let Some(country) = mesh.country else {
                continue;
            };
            if !mesh.visible || !intersects_aabb(ray, &mesh.bounds.scaled(mesh.scale)) {
                continue;
            }
            for triangle in mesh.geometry.triangles() {
                let scaled = triangle.map(|v| v * mesh.scale);
                if let Some(t) = intersect_triangle(ray, scaled)
                    && t < nearest
                {
                    nearest = t;
                    hit = Some(country);
                }
            }
        }
        hit
    }
}
