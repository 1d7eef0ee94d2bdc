// Host-side tests for scene composition and the frame clock.

use tree_core::*;

fn small_params() -> SceneParams {
    SceneParams {
        foliage_count: 600,
        ornament_count: 40,
        star_count: 300,
        ..SceneParams::default()
    }
}

fn run(scene: &mut Scene<()>, clock: &mut FrameClock, state: TreeState, seconds: f32) {
    let steps = (seconds * 60.0) as usize;
    for _ in 0..steps {
        clock.advance(1.0 / 60.0);
        scene.update(&clock.frame(state));
    }
}

#[test]
fn same_seed_builds_identical_scene() {
    let a: Scene<()> = Scene::new(&small_params(), 9);
    let b: Scene<()> = Scene::new(&small_params(), 9);
    assert_eq!(a.foliage().targets(), b.foliage().targets());
    assert_eq!(a.foliage().chaos(), b.foliage().chaos());
    assert_eq!(a.ornaments().ornaments(), b.ornaments().ornaments());

    let c: Scene<()> = Scene::new(&small_params(), 10);
    assert_ne!(a.foliage().chaos(), c.foliage().chaos());
}

#[test]
fn generated_layers_have_requested_sizes() {
    let scene: Scene<()> = Scene::new(&small_params(), 1);
    assert_eq!(scene.foliage().len(), 600);
    assert_eq!(scene.foliage().randoms().len(), 600);
    assert!(scene.foliage().randoms().iter().all(|r| (0.0..1.0).contains(r)));
    assert_eq!(scene.ornaments().len(), 40);
    for (i, o) in scene.ornaments().ornaments().iter().enumerate() {
        assert_eq!(o.id as usize, i);
        assert!(o.scale >= 0.1 && o.scale < 0.5);
        assert!(ORNAMENT_PALETTE.contains(&o.color));
        assert!((o.chaos - glam::Vec3::Y * CHAOS_LIFT).length() <= ORNAMENT_CHAOS_RADIUS + 1e-3);
    }
}

#[test]
fn formed_scene_stays_on_the_tree() {
    let mut scene: Scene<()> = Scene::new(&small_params(), 2);
    let mut clock = FrameClock::new();
    run(&mut scene, &mut clock, TreeState::Formed, 2.0);

    let mut out = SceneInstances::default();
    scene.write_instances(&mut out);
    assert_eq!(out.particles.len(), 600);
    for (inst, target) in out.particles.iter().zip(scene.foliage().targets()) {
        assert_eq!(glam::Vec3::from(inst.position), *target);
    }
    let star = out.star.matrix().w_axis.truncate();
    assert!((star - STAR_FORMED_POSITION).length() < 1e-5);
}

#[test]
fn chaos_scatters_every_layer_and_ornaments_lag() {
    let mut scene: Scene<()> = Scene::new(&small_params(), 3);
    let mut clock = FrameClock::new();
    run(&mut scene, &mut clock, TreeState::Chaos, 0.5);
    // Ornaments use a slower rate than the particle layer
    assert!(scene.ornaments().progress().value() < scene.foliage().progress().value());

    run(&mut scene, &mut clock, TreeState::Chaos, 8.0);
    assert!(scene.foliage().progress().value() > 0.999);
    let mut out = SceneInstances::default();
    scene.write_instances(&mut out);
    for (inst, chaos) in out.particles.iter().zip(scene.foliage().chaos()) {
        let d = (glam::Vec3::from(inst.position) - *chaos).length();
        assert!(d < 0.25, "particle {d} away from its chaos slot");
    }

    // And back again
    run(&mut scene, &mut clock, TreeState::Formed, 10.0);
    assert!(scene.foliage().progress().value() < 1e-3);
    assert!(scene.ornaments().progress().value() < 1e-3);
}

#[test]
fn photos_join_and_leave_the_scene() {
    let mut scene: Scene<u32> = Scene::new(&small_params(), 4);
    let ids = scene.add_photos(vec![
        Ok(("a".to_string(), 1)),
        Err(TreeError::TextureDecode {
            name: "b".into(),
            reason: "bad header".into(),
        }),
        Ok(("c".to_string(), 3)),
    ]);
    assert_eq!(ids.len(), 2);
    let mut clock = FrameClock::new();
    clock.advance(0.016);
    scene.update(&clock.frame(TreeState::Formed));

    let mut out = SceneInstances::default();
    scene.write_instances(&mut out);
    assert_eq!(out.photos.len(), 2);

    let removed = scene.remove_photo(ids[0]).unwrap();
    assert_eq!(removed.texture, 1);
    scene.write_instances(&mut out);
    assert_eq!(out.photos.len(), 1);
    assert_eq!(out.photos[0].slot, 1);

    scene.teardown();
    assert!(scene.photos().is_empty());
}

#[test]
fn root_matrix_applies_offset() {
    let mut scene: Scene<()> = Scene::new(&small_params(), 5);
    scene.update(&FrameInput::new(0.0, 0.0, TreeState::Formed));
    let origin = scene.root_matrix().transform_point3(glam::Vec3::ZERO);
    assert!((origin - SCENE_OFFSET).length() < 0.06);
}

#[test]
fn clock_ignores_bad_deltas() {
    let mut clock = FrameClock::new();
    assert_eq!(clock.advance(0.5), 0.5);
    assert_eq!(clock.advance(-3.0), 0.0);
    assert_eq!(clock.advance(f32::NAN), 0.0);
    assert_eq!(clock.advance(f32::INFINITY), 0.0);
    assert!((clock.elapsed() - 0.5).abs() < 1e-6);
    let f = clock.frame(TreeState::Chaos);
    assert_eq!(f.dt, 0.0);
    assert_eq!(f.state, TreeState::Chaos);
}

#[test]
fn clock_first_tick_has_zero_delta() {
    let mut clock = FrameClock::new();
    assert_eq!(clock.tick(), 0.0);
    let dt = clock.tick();
    assert!(dt >= 0.0);
}

#[test]
fn default_setup_matches_scene_camera() {
    let setup = SceneSetup::default();
    assert_eq!(setup.camera.eye, glam::Vec3::new(0.0, 4.0, 20.0));
    assert!((setup.camera.fovy_radians - 50f32.to_radians()).abs() < 1e-6);
    assert!(setup.orbit.min_distance < setup.orbit.max_distance);
    assert!(!setup.lights.is_empty());
}

#[test]
fn tree_state_display_and_targets() {
    assert_eq!(TreeState::default(), TreeState::Formed);
    assert_eq!(TreeState::Formed.to_string(), "FORMED");
    assert_eq!(TreeState::Chaos.to_string(), "CHAOS");
    assert_eq!(TreeState::Formed.target(), 0.0);
    assert_eq!(TreeState::Chaos.target(), 1.0);
}

#[test]
fn starfield_fills_its_shell() {
    let scene: Scene<()> = Scene::new(&small_params(), 6);
    let stars = scene.starfield();
    assert_eq!(stars.len(), 300);
    let (inner, outer) = stars.band();
    assert_eq!(inner, STARFIELD_RADIUS);
    assert_eq!(outer, STARFIELD_RADIUS + STARFIELD_DEPTH);
    for p in stars.points() {
        let r = p.length();
        assert!(r >= inner - 1e-3 && r <= outer + 1e-3, "star at {r}");
    }
    for &size in stars.sizes() {
        assert!(size >= STARFIELD_FACTOR * 0.5 && size < STARFIELD_FACTOR);
    }

    let none: Scene<()> = Scene::new(
        &SceneParams {
            star_count: 0,
            ..small_params()
        },
        6,
    );
    assert!(none.starfield().is_empty());
}

#[test]
fn starfield_ignores_the_transition() {
    let mut scene: Scene<()> = Scene::new(&small_params(), 7);
    let before = scene.starfield().points().to_vec();
    let mut clock = FrameClock::new();
    run(&mut scene, &mut clock, TreeState::Chaos, 3.0);
    assert_eq!(scene.starfield().points(), &before[..]);

    let twinkle = scene.starfield().twinkle();
    assert!((2.0 / 3.0 - 1e-6..=4.0 / 3.0 + 1e-6).contains(&twinkle));

    let mut out = SceneInstances::default();
    scene.write_instances(&mut out);
    assert_eq!(out.backdrop.len(), 300);
    for (inst, p) in out.backdrop.iter().zip(&before) {
        assert_eq!(glam::Vec3::from(inst.position), *p);
    }
}

#[test]
fn orbit_round_trips_the_default_camera() {
    let setup = SceneSetup::default();
    let orbit = Orbit::from_camera(&setup.camera);
    assert!((orbit.eye(setup.camera.target) - setup.camera.eye).length() < 1e-4);
    assert_eq!(setup.orbit.clamp(orbit), orbit);
}

#[test]
fn orbit_camera_stays_inside_limits() {
    let mut setup = SceneSetup::default();
    setup.orbit_camera(0.7, 10.0, 100.0);
    let orbit = Orbit::from_camera(&setup.camera);
    assert!((orbit.polar - setup.orbit.max_polar).abs() < 1e-4);
    assert!((orbit.distance - setup.orbit.max_distance).abs() < 1e-3);

    setup.orbit_camera(0.0, -10.0, 0.01);
    let orbit = Orbit::from_camera(&setup.camera);
    assert!((orbit.polar - setup.orbit.min_polar).abs() < 1e-4);
    assert!((orbit.distance - setup.orbit.min_distance).abs() < 1e-3);

    // Bad zoom factors leave the distance alone
    let before = setup.camera.eye;
    setup.orbit_camera(0.0, 0.0, f32::NAN);
    setup.orbit_camera(0.0, 0.0, -2.0);
    assert!((setup.camera.eye - before).length() < 1e-4);
}
