// Host-side tests for the photo slot arena and texture lifetimes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tree_core::photos::{PhotoArena, PhotoId};
use tree_core::{FrameInput, TreeError, TreeState};

/// Stand-in texture that counts releases.
#[derive(Debug)]
struct CountedTexture {
    released: Arc<AtomicUsize>,
}

impl Drop for CountedTexture {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn tex(released: &Arc<AtomicUsize>) -> CountedTexture {
    CountedTexture {
        released: Arc::clone(released),
    }
}

#[test]
fn removal_keeps_other_slots_stable() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = PhotoArena::default();
    let a = arena.add(&mut rng, "a.png", tex(&released));
    let b = arena.add(&mut rng, "b.png", tex(&released));
    let c = arena.add(&mut rng, "c.png", tex(&released));
    assert_eq!(
        [arena.slot_of(a), arena.slot_of(b), arena.slot_of(c)],
        [Some(0), Some(1), Some(2)]
    );

    drop(arena.remove(b).unwrap());
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.slot_count(), 3);
    assert_eq!(arena.slot_of(a), Some(0));
    assert_eq!(arena.slot_of(c), Some(2));
    let slots: Vec<usize> = arena.iter().map(|(slot, _)| slot).collect();
    assert_eq!(slots, vec![0, 2]);

    // The freed slot is reused; the id is new
    let d = arena.add(&mut rng, "d.png", tex(&released));
    assert_eq!(arena.slot_of(d), Some(1));
    assert!(d != a && d != b && d != c);
    assert_eq!(arena.newest(), Some(d));
}

#[test]
fn ids_are_never_reused() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(2);
    let mut arena = PhotoArena::default();
    let mut seen = Vec::new();
    for i in 0..10 {
        let id = arena.add(&mut rng, format!("{i}.jpg"), tex(&released));
        assert!(!seen.contains(&id));
        seen.push(id);
        if i % 2 == 0 {
            arena.remove(id).unwrap();
        }
    }
    assert_eq!(arena.len(), 5);
    assert_eq!(released.load(Ordering::SeqCst), 5);
}

#[test]
fn removing_unknown_photo_is_an_error() {
    let mut arena: PhotoArena<CountedTexture> = PhotoArena::default();
    match arena.remove(PhotoId(77)) {
        Err(TreeError::UnknownPhoto(id)) => assert_eq!(id, PhotoId(77)),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn removing_twice_fails_the_second_time() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(3);
    let mut arena = PhotoArena::default();
    let id = arena.add(&mut rng, "x.png", tex(&released));
    assert!(arena.remove(id).is_ok());
    assert!(arena.remove(id).is_err());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_decodes_are_skipped_without_affecting_others() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(4);
    let mut arena = PhotoArena::default();
    let results = vec![
        Ok(("one.png".to_string(), tex(&released))),
        Err(TreeError::TextureDecode {
            name: "broken.png".into(),
            reason: "truncated".into(),
        }),
        Ok(("two.png".to_string(), tex(&released))),
    ];
    let ids = arena.add_all(&mut rng, results);
    assert_eq!(ids.len(), 2);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.get(ids[1]).map(|p| p.name.as_str()), Some("two.png"));
    assert_eq!(arena.slot_of(ids[1]), Some(1));
}

#[test]
fn clear_and_drop_release_every_texture() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(5);
    let mut arena = PhotoArena::default();
    for i in 0..4 {
        arena.add(&mut rng, format!("{i}"), tex(&released));
    }
    arena.clear();
    assert_eq!(released.load(Ordering::SeqCst), 4);
    assert!(arena.is_empty());

    for i in 0..3 {
        arena.add(&mut rng, format!("{i}"), tex(&released));
    }
    drop(arena);
    assert_eq!(released.load(Ordering::SeqCst), 7);
}

#[test]
fn photos_animate_and_write_instances_in_slot_order() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(6);
    let mut arena = PhotoArena::default();
    let ids: Vec<PhotoId> = (0..3)
        .map(|i| arena.add(&mut rng, format!("{i}"), tex(&released)))
        .collect();
    arena.remove(ids[0]).unwrap();

    let mut t = 0.0;
    for _ in 0..60 {
        t += 0.05;
        arena.step(&FrameInput::new(0.05, t, TreeState::Chaos));
    }
    let mut out = Vec::new();
    arena.write_instances(&mut out);
    assert_eq!(out.iter().map(|p| p.slot).collect::<Vec<_>>(), vec![1, 2]);
    for (_, photo) in arena.iter() {
        assert!(photo.motion.progress().value() > 0.9);
        assert!(photo.motion.transform().scale < 0.7);
    }
}

#[test]
fn formed_photos_sit_on_the_cone() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut rng = StdRng::seed_from_u64(7);
    let mut arena = PhotoArena::new(14.0, 6.5);
    for i in 0..20 {
        arena.add(&mut rng, format!("{i}"), tex(&released));
    }
    for (_, photo) in arena.iter() {
        let p = photo.motion.target;
        assert!(p.y >= -7.0 && p.y <= 7.0);
        let r = (p.x * p.x + p.z * p.z).sqrt();
        assert!((r - 6.5 * (1.0 - (p.y + 7.0) / 14.0)).abs() < 1e-3);
        let s = photo.motion.rotation_speed;
        assert!(s.abs().max_element() <= 1.5);
    }
}
