use pixel_physics::physics::StateCache;
use pixel_physics::{Boundary, Frame, ParamSet, PhysicsConfig, PhysicsEngine};

#[test]
fn ninth_key_evicts_the_oldest() {
    let mut cache = StateCache::default();
    assert_eq!(cache.capacity(), 8);
    for i in 0..9 {
        cache.get_or_create(&format!("k{i}"), 4, 4);
    }
    assert_eq!(cache.len(), 8);
    assert!(!cache.contains("k0"));
    for i in 1..9 {
        assert!(cache.contains(&format!("k{i}")), "k{i} should survive");
    }
}

#[test]
fn touching_a_key_protects_it_from_eviction() {
    let mut cache = StateCache::new(3);
    cache.get_or_create("a", 2, 2);
    cache.get_or_create("b", 2, 2);
    cache.get_or_create("c", 2, 2);
    cache.get_or_create("a", 2, 2);
    cache.get_or_create("d", 2, 2);
    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert_eq!(cache.keys(), vec!["d", "a", "c"]);
}

#[test]
fn peek_does_not_refresh_recency() {
    let mut cache = StateCache::new(2);
    cache.get_or_create("a", 2, 2);
    cache.get_or_create("b", 2, 2);
    assert!(cache.peek("a").is_some());
    cache.get_or_create("c", 2, 2);
    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
}

#[test]
fn existing_state_survives_lookup() {
    let mut cache = StateCache::new(4);
    cache.get_or_create("wave", 3, 3).vx.as_mut_slice()[4] = 1.5;
    let again = cache.get_or_create("wave", 3, 3);
    assert!((again.vx.get(1, 1) - 1.5).abs() < 1e-6);
}

#[test]
fn remove_and_clear_release_memory() {
    let mut cache = StateCache::new(4);
    cache.get_or_create("a", 10, 10);
    cache.get_or_create("b", 10, 20);
    assert_eq!(cache.field_bytes(), 4 * 4 * (100 + 200));
    cache.remove("a");
    cache.remove("missing");
    assert_eq!(cache.keys(), vec!["b"]);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.field_bytes(), 0);
}

#[test]
fn engine_respects_configured_capacity() {
    let frame = Frame::filled(8, 8, [90, 90, 90]);
    let mut engine = PhysicsEngine::new(PhysicsConfig {
        cache_capacity: 2,
        ..PhysicsConfig::default()
    });
    for seed in 0..5u64 {
        engine
            .apply(&frame, "liquify", &ParamSet::new(), seed, 0, 100, Boundary::Clamp)
            .expect("render");
    }
    assert_eq!(engine.cache().keys(), vec!["liquify_4", "liquify_3"]);
}

#[test]
fn long_sessions_stay_bounded() {
    let frame = Frame::filled(6, 6, [10, 20, 30]);
    let mut engine = PhysicsEngine::default();
    let variants = ["gravity", "vortex", "melt", "quantum", "haunt"];
    for seed in 0..6u64 {
        for v in variants {
            engine
                .apply(&frame, v, &ParamSet::new(), seed, 1, 100, Boundary::Clamp)
                .expect("render");
            assert!(engine.cache().len() <= 8);
        }
    }
    let kept = engine.cache().keys();
    assert_eq!(kept.len(), 8);
    assert_eq!(kept[0], "haunt_5");
    assert!(kept.contains(&"gravity_5"));
    assert!(!kept.contains(&"gravity_4"));
}
