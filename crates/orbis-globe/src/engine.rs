//! The engine context: owns the scene, animations, camera dolly, starfield
//! and interaction state, and applies selection changes to all of them.
//!
//! Selecting a country raises its extrusion and flies the camera to it with
//! input detached; the selection becomes final when the flight lands.
//! Deselecting lowers the extrusion and flies back to the distance the user
//! had before, re-attaching input once there.

use glam::{Vec2, Vec3};
use orbis_animation::{
    AnimationRecord, Animator, Clip, Direction, DollyDirection, DollyState, Easing, Track,
    TrackValue,
};
use orbis_config::{GlobeConfig, InputConfig, Quality};
use orbis_input::{Intent, InteractionController, PointerEvent};
use orbis_render::OrbitCamera;
use orbis_space::{StarfieldMotion, StarfieldState, StarfieldStateMachine};

use crate::chart::ChartProvider;
use crate::events::{Notification, Outbox, SelectionEvent};
use crate::picking::ScenePicker;
use crate::scene::{CountryId, GlobeScene};

const EXTRUDE_EASING: Easing = Easing::QuadOut;
const CAMERA_EASING: Easing = Easing::CubicInOut;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    Country(CountryId),
    Camera,
}

/// What a finished animation means for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Extruded(CountryId),
    /// The extrusion is back at rest; show the flat mesh again.
    Intruded(CountryId),
    /// The select flight landed.
    ArrivedAtCountry(CountryId),
    /// The deselect flight landed.
    ReturnedToOrbit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionPhase {
    Flying,
    Selected,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    country: CountryId,
    phase: SelectionPhase,
}

pub struct GlobeEngine {
    scene: GlobeScene,
    animator: Animator<AnimationKey, Completion>,
    dolly: DollyState,
    camera: OrbitCamera,
    starfield: StarfieldStateMachine,
    motion: StarfieldMotion,
    controller: InteractionController,
    outbox: Outbox,
    config: GlobeConfig,
    quality: Quality,
    viewport: Vec2,
    hovered: Option<CountryId>,
    selection: Option<Selection>,
}

impl GlobeEngine {
    pub fn new(
        scene: GlobeScene,
        globe: &GlobeConfig,
        input: &InputConfig,
        quality: Quality,
        outbox: Outbox,
    ) -> Self {
        let start = Vec3::from_array(globe.camera_start);
        let mut starfield = StarfieldStateMachine::new();
        let motion = starfield.tick(0.0);
        let mut engine = Self {
            scene,
            animator: Animator::new(),
            dolly: DollyState::new(start, globe.min_distance, globe.dolly_step),
            camera: OrbitCamera::new(start, globe.fov_degrees),
            starfield,
            motion,
            controller: InteractionController::new(input),
            outbox,
            config: globe.clone(),
            quality,
            viewport: Vec2::ONE,
            hovered: None,
            selection: None,
        };
        let extrudable: Vec<CountryId> = engine
            .scene
            .countries()
            .filter(|(_, c)| c.extrude.is_some())
            .map(|(id, _)| id)
            .collect();
        for id in extrudable {
            engine.register_extrude_record(id);
        }
        engine
    }

    fn register_extrude_record(&mut self, id: CountryId) {
        let scale = self.config.extrude_scale;
        let duration = self.config.extrude_duration_s;
        self.animator.register(AnimationRecord {
            key: AnimationKey::Country(id),
            forward: Clip::new(
                Track::Scale { from: 1.0, to: scale },
                duration,
                EXTRUDE_EASING,
                Completion::Extruded(id),
            ),
            reverse: Some(Clip::new(
                Track::Scale { from: scale, to: 1.0 },
                duration,
                EXTRUDE_EASING,
                Completion::Intruded(id),
            )),
        });
    }

    /// Pick up chart data that arrived after assembly.
    pub fn refresh_charts(&mut self, charts: &dyn ChartProvider) -> usize {
        let added = self.scene.refresh_charts(charts);
        for &id in &added {
            self.register_extrude_record(id);
        }
        added.len()
    }

    // --- Accessors ---

    pub fn scene(&self) -> &GlobeScene {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn dolly_state(&self) -> &DollyState {
        &self.dolly
    }

    pub fn animator(&self) -> &Animator<AnimationKey, Completion> {
        &self.animator
    }

    pub fn starfield(&self) -> &StarfieldStateMachine {
        &self.starfield
    }

    /// Starfield phases from the most recent tick.
    pub fn starfield_motion(&self) -> StarfieldMotion {
        self.motion
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn input_enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    /// The selected country, once its camera flight has landed.
    pub fn selected(&self) -> Option<&str> {
        let selection = self.selection?;
        if selection.phase != SelectionPhase::Selected {
            return None;
        }
        self.country_name(selection.country)
    }

    /// Country being selected or selected.
    pub fn selection_target(&self) -> Option<&str> {
        self.country_name(self.selection?.country)
    }

    pub fn hovered(&self) -> Option<&str> {
        self.country_name(self.hovered?)
    }

    fn country_name(&self, id: CountryId) -> Option<&str> {
        self.scene.country(id).map(|c| c.name.as_str())
    }

    // --- Settings ---

    /// Logical window size, used for picking and the camera aspect.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
        self.camera.set_aspect_ratio(width, height);
    }

    /// Returns whether the tier changed.
    pub fn set_quality(&mut self, quality: Quality) -> bool {
        if quality == self.quality {
            return false;
        }
        tracing::info!(from = ?self.quality, to = ?quality, "Quality changed");
        self.quality = quality;
        true
    }

    pub fn set_starfield_state(&mut self, state: StarfieldState) {
        self.starfield.set_state(state);
    }

    // --- Interaction ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let picker = ScenePicker {
            scene: &self.scene,
            camera: &self.camera,
            viewport: self.viewport,
        };
        let intents = self.controller.handle(event, &picker);
        for intent in intents {
            self.handle_intent(intent);
        }
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Hover(name) => self.hover(name.as_deref()),
            Intent::Select(name) => {
                self.select(&name);
            }
            Intent::Dolly(direction) => {
                self.dolly(direction);
            }
            Intent::Orbit(delta) => {
                self.dolly.orbit(delta);
                self.camera.position = self.dolly.position();
            }
        }
    }

    pub fn dolly(&mut self, direction: DollyDirection) -> bool {
        let moved = self.dolly.dolly(direction);
        self.camera.position = self.dolly.position();
        moved
    }

    /// Outline a country, or clear the hover with `None`. Broadcasts
    /// `Hovered` with an empty name for nothing.
    pub fn hover(&mut self, name: Option<&str>) {
        let id = name.and_then(|n| self.scene.find(n));
        self.hovered = id;
        let name = id.and_then(|id| self.country_name(id)).unwrap_or_default();
        self.outbox
            .broadcast(SelectionEvent::Hovered(name.to_string()));
        self.update_outline();
    }

    fn update_outline(&mut self) {
        let selected = self.selection.map(|s| s.country);
        self.scene
            .set_outlined(self.hovered.into_iter().chain(selected));
    }

    /// Start selecting `name`. Countries without chart data only produce a
    /// notification. Returns whether the selection started.
    pub fn select(&mut self, name: &str) -> bool {
        let Some(id) = self.scene.find(name) else {
            tracing::warn!(country = name, "Select of unknown country ignored");
            return false;
        };
        if !self.scene.has_extrude(id) {
            self.outbox
                .notify(Notification::info(format!("no chart data for {name}")));
            return false;
        }
        if let Some(current) = self.selection {
            tracing::debug!(
                country = name,
                current = ?self.country_name(current.country),
                "Select ignored while another country is selected"
            );
            return false;
        }

        self.scene.set_extruded(id, true);
        self.animator
            .play(&AnimationKey::Country(id), Direction::Forward);

        self.controller.set_enabled(false);
        self.dolly.remember_user_distance();
        let from = self.dolly.position();
        let direction = self
            .scene
            .country_center(id)
            .map(|c| c.normalize_or_zero())
            .filter(|d| *d != Vec3::ZERO)
            .unwrap_or_else(|| self.dolly.direction());
        self.fly_camera(
            from,
            direction * self.config.select_distance,
            Completion::ArrivedAtCountry(id),
        );

        self.selection = Some(Selection {
            country: id,
            phase: SelectionPhase::Flying,
        });
        self.hovered = None;
        self.update_outline();
        tracing::info!(country = name, "Selecting");
        true
    }

    /// Clear the selection. Returns whether there was one.
    pub fn deselect(&mut self) -> bool {
        let Some(selection) = self.selection.take() else {
            return false;
        };
        let id = selection.country;
        self.animator
            .play(&AnimationKey::Country(id), Direction::Reverse);

        match self.dolly.take_user_distance() {
            Some(distance) => {
                let from = self.dolly.position();
                self.fly_camera(
                    from,
                    self.dolly.direction() * distance,
                    Completion::ReturnedToOrbit,
                );
            }
            None => self.controller.set_enabled(true),
        }

        self.update_outline();
        self.outbox.broadcast(SelectionEvent::SelectionCleared);
        tracing::info!(country = ?self.country_name(id), "Deselected");
        true
    }

    fn fly_camera(&mut self, from: Vec3, to: Vec3, on_finish: Completion) {
        self.animator.play_clip(
            AnimationKey::Camera,
            Clip::new(
                Track::CameraPath { from, to },
                self.config.camera_move_duration_s,
                CAMERA_EASING,
                on_finish,
            ),
        );
    }

    // --- Frame ---

    /// Advance the starfield and every animation by `dt` seconds and apply
    /// completions.
    pub fn tick(&mut self, dt: f32) -> StarfieldMotion {
        self.motion = self.starfield.tick(dt);

        let output = self.animator.advance(dt);
        for sample in &output.samples {
            match (sample.key, sample.value) {
                (AnimationKey::Country(id), TrackValue::Scale(scale)) => {
                    self.scene.set_extrude_scale(id, scale)
                }
                (AnimationKey::Camera, TrackValue::Position(position)) => {
                    self.dolly.set_position(position)
                }
                (key, value) => {
                    tracing::warn!(?key, ?value, "Animation sample does not fit its key")
                }
            }
        }
        for finished in output.finished {
            self.complete(finished.on_finish);
        }

        self.camera.position = self.dolly.position();
        self.motion
    }

    fn complete(&mut self, completion: Completion) {
        tracing::debug!(?completion, "Animation finished");
        match completion {
            Completion::Extruded(_) => {}
            Completion::Intruded(id) => self.scene.set_extruded(id, false),
            Completion::ArrivedAtCountry(id) => {
                let Some(selection) = self.selection.as_mut().filter(|s| s.country == id) else {
                    return;
                };
                selection.phase = SelectionPhase::Selected;
                let name = self.country_name(id).unwrap_or_default().to_string();
                self.outbox.broadcast(SelectionEvent::Hovered(String::new()));
                self.outbox.broadcast(SelectionEvent::Selected(name));
            }
            Completion::ReturnedToOrbit => self.controller.set_enabled(true),
        }
    }
}
