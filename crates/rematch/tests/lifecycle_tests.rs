// Lifecycle behavior: deferred compile failure, call order, disposal.
use rematch::{Engine, Pattern, PatternError, PatternOptions};
use std::sync::Arc;

fn private_pattern(engine: &Arc<Engine>, pattern: &str) -> Pattern {
    Pattern::with_engine(Arc::clone(engine), pattern, PatternOptions::default())
}

#[test]
fn construction_never_fails() {
    let valid = Pattern::new("A+");
    assert!(valid.is_valid());

    let invalid = Pattern::new("(unclosed");
    assert!(!invalid.is_valid());
    assert!(!invalid.is_disposed());
}

#[test]
fn invalid_pattern_surfaces_with_its_text() {
    let pattern = Pattern::new("(unclosed");
    match pattern.find_index("text", 0) {
        Err(PatternError::InvalidPattern { pattern: source }) => {
            assert_eq!(source, "(unclosed");
        }
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
    assert!(matches!(
        pattern.search("text", 0),
        Err(PatternError::InvalidPattern { .. })
    ));
    assert!(matches!(
        pattern.search_captures("text", 0),
        Err(PatternError::InvalidPattern { .. })
    ));
    assert!(matches!(
        pattern.match_position(0),
        Err(PatternError::InvalidPattern { .. })
    ));
    assert!(matches!(
        pattern.release_region(),
        Err(PatternError::InvalidPattern { .. })
    ));
}

#[test]
fn accessors_need_a_search_first() {
    let pattern = Pattern::new("A");
    assert!(matches!(
        pattern.match_position(0),
        Err(PatternError::NoSearch)
    ));
    assert!(matches!(
        pattern.match_length(0),
        Err(PatternError::NoSearch)
    ));
    assert!(matches!(pattern.captured(0), Err(PatternError::NoSearch)));
}

#[test]
fn find_index_does_not_stand_in_for_a_search() {
    let pattern = Pattern::new("A");
    assert_eq!(pattern.find_index("--A", 0).unwrap(), 2);
    assert!(matches!(
        pattern.match_position(0),
        Err(PatternError::NoSearch)
    ));
}

#[test]
fn disposal_rejects_every_later_operation() {
    let pattern = Pattern::new("A");
    pattern.search("A", 0).unwrap();
    pattern.dispose();

    assert!(pattern.is_disposed());
    assert!(!pattern.has_region());
    assert!(matches!(
        pattern.find_index("A", 0),
        Err(PatternError::Disposed)
    ));
    assert!(matches!(pattern.search("A", 0), Err(PatternError::Disposed)));
    assert!(matches!(
        pattern.search_captures("A", 0),
        Err(PatternError::Disposed)
    ));
    assert!(matches!(
        pattern.match_position(0),
        Err(PatternError::Disposed)
    ));
    assert!(matches!(
        pattern.match_length(0),
        Err(PatternError::Disposed)
    ));
    assert!(matches!(pattern.captured(0), Err(PatternError::Disposed)));
    assert!(matches!(
        pattern.release_region(),
        Err(PatternError::Disposed)
    ));
}

#[test]
fn disposal_is_idempotent() {
    let pattern = Pattern::new("A");
    pattern.dispose();
    pattern.dispose();
    pattern.dispose();
    assert!(pattern.is_disposed());
}

#[test]
fn disposal_wins_over_invalidity() {
    let pattern = Pattern::new("(unclosed");
    pattern.dispose();
    assert!(matches!(
        pattern.find_index("x", 0),
        Err(PatternError::Disposed)
    ));
}

#[test]
fn dispose_returns_every_engine_resource() {
    let engine = Arc::new(Engine::new());
    let pattern = private_pattern(&engine, "(A)(B)?");
    pattern.search("AB", 0).unwrap();
    pattern.search("A", 0).unwrap();
    pattern.search_captures("AB", 0).unwrap();
    pattern.dispose();

    let stats = engine.stats();
    assert_eq!(stats.patterns_compiled, 1);
    assert_eq!(stats.patterns_released, 1);
    assert_eq!(stats.regions_created, 3);
    assert_eq!(stats.regions_released, 3);
    assert_eq!(stats.live_patterns(), 0);
    assert_eq!(stats.live_regions(), 0);
}

#[test]
fn dropping_a_pattern_releases_its_resources() {
    let engine = Arc::new(Engine::new());
    {
        let pattern = private_pattern(&engine, "A+");
        pattern.search("AAA", 0).unwrap();
    }
    let stats = engine.stats();
    assert_eq!(stats.live_patterns(), 0);
    assert_eq!(stats.live_regions(), 0);
}

#[test]
fn drop_after_dispose_releases_only_once() {
    let engine = Arc::new(Engine::new());
    {
        let pattern = private_pattern(&engine, "A");
        pattern.search("A", 0).unwrap();
        pattern.dispose();
    }
    let stats = engine.stats();
    assert_eq!(stats.patterns_released, 1);
    assert_eq!(stats.regions_released, 1);
}

#[test]
fn release_region_resets_the_search_state() {
    let engine = Arc::new(Engine::new());
    let pattern = private_pattern(&engine, "A");
    pattern.release_region().unwrap();

    pattern.search("A", 0).unwrap();
    assert!(pattern.has_region());
    pattern.release_region().unwrap();
    assert!(!pattern.has_region());
    assert!(matches!(
        pattern.match_position(0),
        Err(PatternError::NoSearch)
    ));
    assert_eq!(engine.stats().regions_released, 1);
}

#[test]
fn failed_compilations_hold_no_engine_resources() {
    let engine = Arc::new(Engine::new());
    let pattern = private_pattern(&engine, "(unclosed");
    drop(pattern);

    let stats = engine.stats();
    assert_eq!(stats.patterns_compiled, 0);
    assert_eq!(stats.patterns_failed, 1);
    assert_eq!(stats.patterns_released, 0);
    assert_eq!(stats.regions_created, 0);
}
