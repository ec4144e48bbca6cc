//! Selection flow through the public engine API: animations, input gating,
//! mesh visibility and the events observers see.

use glam::Vec2;
use orbis_config::{GlobeConfig, InputConfig, Quality};
use orbis_globe::{
    AnimationKey, GlobeEngine, GlobeScene, Inbox, Outbox, SelectionEvent, Severity,
    demo_charts, demo_countries,
};
use orbis_input::{PointerEvent, PointerId, PointerKind};

const FRAME: f32 = 1.0 / 60.0;

fn engine() -> (GlobeEngine, Inbox) {
    let globe = GlobeConfig::default();
    let scene = GlobeScene::build(&demo_countries(), &demo_charts(), &globe);
    let (outbox, inbox) = Outbox::channel();
    let mut engine = GlobeEngine::new(scene, &globe, &InputConfig::default(), Quality::Mid, outbox);
    engine.resize(800.0, 600.0);
    (engine, inbox)
}

/// Tick until no animation is running, at most ten seconds of frames.
fn settle(engine: &mut GlobeEngine) {
    for _ in 0..600 {
        if engine.animator().active_count() == 0 {
            return;
        }
        engine.tick(FRAME);
    }
    panic!("animations did not settle");
}

fn assert_one_visible_per_pair(engine: &GlobeEngine) {
    let scene = engine.scene();
    for (_, country) in scene.countries() {
        let flat = scene.mesh(country.flat).unwrap().visible;
        match country.extrude {
            Some(extrude) => {
                let extruded = scene.mesh(extrude).unwrap().visible;
                assert_ne!(flat, extruded, "{} shows both or neither mesh", country.name);
            }
            None => assert!(flat),
        }
    }
}

#[test]
fn select_without_chart_only_notifies() {
    let (mut engine, inbox) = engine();
    let visibility = |engine: &GlobeEngine| -> Vec<bool> {
        engine.scene().meshes().map(|(_, mesh)| mesh.visible).collect()
    };
    let before = visibility(&engine);
    let camera = engine.camera().position;

    assert!(!engine.select("Oceanis"));
    engine.tick(FRAME);

    assert_eq!(visibility(&engine), before);
    assert_one_visible_per_pair(&engine);
    let oceanis = engine.scene().find("Oceanis").unwrap();
    let flat = engine.scene().country(oceanis).unwrap().flat;
    assert!(engine.scene().mesh(flat).unwrap().visible);
    assert!(engine.scene().outlined().is_empty());
    assert_eq!(engine.camera().position, camera);

    let notifications = inbox.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].severity, Severity::Info);
    assert!(notifications[0].message.contains("Oceanis"));
    assert_eq!(engine.animator().active_count(), 0);
    assert!(engine.input_enabled());
    assert!(engine.selection_target().is_none());
    assert!(inbox.drain_selection().is_empty());
}

#[test]
fn select_unknown_country_is_ignored() {
    let (mut engine, inbox) = engine();
    assert!(!engine.select("Atlantis"));
    assert!(inbox.drain_notifications().is_empty());
    assert_eq!(engine.animator().active_count(), 0);
}

#[test]
fn select_runs_one_extrude_and_one_camera_animation() {
    let (mut engine, inbox) = engine();
    let id = engine.scene().find("Borealia").unwrap();

    assert!(engine.select("Borealia"));

    assert_eq!(engine.animator().active_count(), 2);
    assert!(engine.animator().active_for(&AnimationKey::Country(id)).is_some());
    assert!(engine.animator().active_for(&AnimationKey::Camera).is_some());
    assert!(!engine.input_enabled());
    assert!(engine.scene().is_extruded(id));
    assert_eq!(engine.selection_target(), Some("Borealia"));
    assert_eq!(engine.selected(), None);

    settle(&mut engine);

    assert_eq!(engine.animator().active_count(), 0);
    assert_eq!(engine.selected(), Some("Borealia"));
    let scale = engine.scene().extrude_scale(id).unwrap();
    assert!((scale - GlobeConfig::default().extrude_scale).abs() < 1e-4);
    let distance = engine.camera().position.length();
    assert!((distance - GlobeConfig::default().select_distance).abs() < 1e-3);
    assert_eq!(
        inbox.drain_selection(),
        vec![
            SelectionEvent::Hovered(String::new()),
            SelectionEvent::Selected("Borealia".into()),
        ]
    );
}

#[test]
fn second_select_is_refused_while_selected() {
    let (mut engine, _inbox) = engine();
    assert!(engine.select("Borealia"));
    assert!(!engine.select("Verdant"));
    settle(&mut engine);
    assert!(!engine.select("Meridia"));
    assert_eq!(engine.selected(), Some("Borealia"));
}

#[test]
fn deselect_returns_to_user_distance_then_enables_input() {
    let (mut engine, inbox) = engine();
    let id = engine.scene().find("Borealia").unwrap();
    let start = engine.camera().position.length();

    engine.select("Borealia");
    settle(&mut engine);
    inbox.drain_selection();

    assert!(engine.deselect());
    assert_eq!(inbox.drain_selection(), vec![SelectionEvent::SelectionCleared]);
    assert!(!engine.input_enabled());
    assert!(engine.scene().is_extruded(id));

    settle(&mut engine);

    assert!(engine.input_enabled());
    assert!(!engine.scene().is_extruded(id));
    assert!((engine.camera().position.length() - start).abs() < 1e-3);
    assert!(engine.selection_target().is_none());
    assert!(!engine.deselect());
}

#[test]
fn exactly_one_mesh_of_each_pair_is_visible_throughout() {
    let (mut engine, _inbox) = engine();
    assert_one_visible_per_pair(&engine);
    engine.select("Meridia");
    for _ in 0..30 {
        engine.tick(FRAME);
        assert_one_visible_per_pair(&engine);
    }
    engine.deselect();
    for _ in 0..120 {
        engine.tick(FRAME);
        assert_one_visible_per_pair(&engine);
    }
}

#[test]
fn reselect_during_return_keeps_extrusion() {
    let (mut engine, _inbox) = engine();
    let id = engine.scene().find("Borealia").unwrap();
    engine.select("Borealia");
    settle(&mut engine);
    engine.deselect();
    engine.tick(0.1);

    // The pending lower is replaced, so its completion never hides the slab.
    assert!(engine.select("Borealia"));
    settle(&mut engine);
    assert!(engine.scene().is_extruded(id));
    assert_eq!(engine.selected(), Some("Borealia"));
}

#[test]
fn click_at_screen_centre_selects_the_country_in_front() {
    let (mut engine, inbox) = engine();
    let centre = Vec2::new(400.0, 300.0);
    engine.handle_pointer(PointerEvent::Down {
        id: PointerId::MOUSE,
        kind: PointerKind::Mouse,
        position: centre,
    });
    engine.handle_pointer(PointerEvent::Up {
        id: PointerId::MOUSE,
        kind: PointerKind::Mouse,
        position: centre,
    });

    assert_eq!(engine.selection_target(), Some("Borealia"));
    settle(&mut engine);
    assert!(
        inbox
            .drain_selection()
            .contains(&SelectionEvent::Selected("Borealia".into()))
    );
}

#[test]
fn pointer_input_is_ignored_during_flight() {
    let (mut engine, _inbox) = engine();
    engine.select("Borealia");
    let before = engine.camera().position;
    engine.handle_pointer(PointerEvent::Wheel { delta: 1.0 });
    assert_eq!(engine.camera().position, before);
}

#[test]
fn hover_over_ocean_clears_outline() {
    let (mut engine, inbox) = engine();
    engine.handle_pointer(PointerEvent::Move {
        id: PointerId::MOUSE,
        kind: PointerKind::Mouse,
        position: Vec2::new(400.0, 300.0),
    });
    assert_eq!(engine.hovered(), Some("Borealia"));
    assert_eq!(engine.scene().outlined().len(), 1);

    // Far corner misses the globe.
    engine.handle_pointer(PointerEvent::Move {
        id: PointerId::MOUSE,
        kind: PointerKind::Mouse,
        position: Vec2::new(2.0, 2.0),
    });
    assert_eq!(engine.hovered(), None);
    assert!(engine.scene().outlined().is_empty());
    assert_eq!(
        inbox.drain_selection(),
        vec![
            SelectionEvent::Hovered("Borealia".into()),
            SelectionEvent::Hovered(String::new()),
        ]
    );
}

#[test]
fn late_charts_make_countries_selectable() {
    let (mut engine, _inbox) = engine();
    assert!(!engine.select("Oceanis"));

    let mut charts = orbis_globe::ChartSet::new();
    charts.insert(
        "Oceanis",
        orbis_globe::CountryChart {
            track_image_urls: vec!["covers/oceanis.png".into()],
        },
    );
    assert_eq!(engine.refresh_charts(&charts), 1);
    assert!(engine.select("Oceanis"));
}
