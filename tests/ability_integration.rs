//! Ability and cooldown integration tests

use combat_ai_core::abilities::*;
use combat_ai_core::core::config::AbilityConfig;
use std::collections::HashSet;

#[test]
fn test_fresh_cooldown_reports() {
    let mut cooldowns = CooldownRegistry::new();
    cooldowns.start("k", 10.0);

    assert!(cooldowns.is_active("k"));
    let remaining = cooldowns.remaining("k");
    assert!((9.9..=10.0).contains(&remaining));
    assert!(cooldowns.progress("k") <= 0.1);
}

#[test]
fn test_never_started_key_is_ready() {
    let cooldowns = CooldownRegistry::new();
    assert!(!cooldowns.is_active("never"));
    assert_eq!(cooldowns.remaining("never"), 0.0);
    assert_eq!(cooldowns.progress("never"), 1.0);
}

#[test]
fn test_reset_all_clears_everything() {
    let mut cooldowns = CooldownRegistry::new();
    for i in 0..50 {
        cooldowns.start(format!("key_{}", i), 1.0 + i as f32);
    }
    assert_eq!(cooldowns.active_count(), 50);

    cooldowns.reset_all();
    for i in 0..50 {
        assert!(!cooldowns.is_active(&format!("key_{}", i)));
    }
}

#[test]
fn test_cooldown_expires_over_ticks() {
    let mut cooldowns = CooldownRegistry::new();
    cooldowns.start("dash", 1.0);
    for _ in 0..9 {
        cooldowns.update(0.1);
    }
    assert!(cooldowns.is_active("dash"));
    cooldowns.update(0.2);
    assert!(!cooldowns.is_active("dash"));
    assert_eq!(cooldowns.active_count(), 0);
}

#[test]
fn test_catalog_has_four_unique_ids() {
    let registry = AbilityRegistry::new();
    assert_eq!(registry.len(), 4);
    let ids: HashSet<&str> = registry.abilities().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_upgrade_touches_only_target() {
    let mut registry = AbilityRegistry::new();
    assert!(registry.upgrade(2));

    for (index, ability) in registry.abilities().iter().enumerate() {
        let expected = if index == 2 { 1 } else { 0 };
        assert_eq!(ability.upgrade_level, expected);
    }
    assert!(!registry.upgrade(4));
    assert!(!registry.upgrade_by_id("teleport"));
}

#[test]
fn test_cooldown_floor_at_high_levels() {
    let mut registry = AbilityRegistry::new();
    for _ in 0..1000 {
        registry.upgrade_by_id("dash");
    }
    let dash = registry.ability_by_id("dash").expect("dash registered");
    assert!(dash.modified_cooldown() >= 0.5 * dash.base_cooldown);
}

#[test]
fn test_use_cycle() {
    let mut registry = AbilityRegistry::new();
    let state = PhysicalState::new(true, 100.0);
    let shield = registry.index_of("shield").expect("shield registered");

    let used = registry.use_ability(shield, &state).expect("shield ready");
    assert_eq!(used.kind, AbilityKind::Shield);
    assert!(!registry.is_ready(shield));
    assert_eq!(registry.cooldown_progress(shield), 0.0);

    let err = registry.use_ability(shield, &state).unwrap_err();
    assert!(matches!(err, AbilityUseError::OnCooldown { .. }));

    for _ in 0..130 {
        registry.update(0.1);
    }
    assert!(registry.is_ready(shield));
    assert_eq!(registry.remaining_cooldown(shield), 0.0);
}

#[test]
fn test_use_rejections_in_order() {
    let mut registry = AbilityRegistry::new();

    let airborne = PhysicalState::new(false, 100.0);
    assert_eq!(
        registry.use_ability_by_id("dash", &airborne),
        Err(AbilityUseError::Unusable("Tactical Dash".to_string()))
    );

    let drained = PhysicalState::new(true, 1.0);
    assert!(matches!(
        registry.use_ability_by_id("time_slow", &drained),
        Err(AbilityUseError::InsufficientEnergy { .. })
    ));

    assert!(matches!(
        registry.use_ability_by_id("warp", &drained),
        Err(AbilityUseError::UnknownAbility(_))
    ));

    // Rejections never start a cooldown
    assert_eq!(registry.cooldowns().active_count(), 0);
}

#[test]
fn test_upgrade_levels_survive_snapshot() {
    let mut registry = AbilityRegistry::with_config(&AbilityConfig::default());
    registry.upgrade_by_id("emp");
    registry.upgrade_by_id("emp");
    registry.upgrade_by_id("dash");

    let json = registry.snapshot_json().expect("snapshot serializes");

    let mut restored = AbilityRegistry::new();
    restored.apply_snapshot_json(&json).expect("snapshot parses");
    assert_eq!(restored.snapshot(), registry.snapshot());
    assert_eq!(restored.ability_by_id("emp").map(|a| a.upgrade_level), Some(2));

    assert!(restored.apply_snapshot_json("not json").is_err());
}
