#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure damage resolution shared by melee strikes, projectile hits and splash.

use lane_defence_core::{
    ArmorDefinition, DamageKind, Health, RESISTANCE_MULTIPLIER, VULNERABILITY_MULTIPLIER,
};
use log::debug;

/// Armor attached to a live attacker.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmorLayer {
    durability: f32,
    damage_reduction: f32,
    resists: Vec<DamageKind>,
    vulnerable_to: Vec<DamageKind>,
}

impl ArmorLayer {
    /// Builds a fresh armor layer from its definition.
    #[must_use]
    pub fn from_definition(definition: &ArmorDefinition) -> Self {
        Self {
            durability: definition.durability.max(0.0),
            damage_reduction: definition.damage_reduction.clamp(0.0, 1.0),
            resists: definition.resists.clone(),
            vulnerable_to: definition.vulnerable_to.clone(),
        }
    }

    /// Remaining durability.
    #[must_use]
    pub const fn durability(&self) -> f32 {
        self.durability
    }

    /// Fraction of incoming damage removed before durability absorbs it.
    #[must_use]
    pub const fn damage_reduction(&self) -> f32 {
        self.damage_reduction
    }

    /// Multiplier the layer applies to damage of the provided kind.
    #[must_use]
    pub fn multiplier(&self, kind: DamageKind) -> f32 {
        if self.resists.contains(&kind) {
            RESISTANCE_MULTIPLIER
        } else if self.vulnerable_to.contains(&kind) {
            VULNERABILITY_MULTIPLIER
        } else {
            1.0
        }
    }
}

/// Outcome of a single damage application.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Damage after resistance or vulnerability multipliers.
    pub resolved: f32,
    /// Portion consumed by armor durability.
    pub absorbed: f32,
    /// Portion removed from health.
    pub to_health: f32,
    /// Indicates that the armor broke and was detached by this hit.
    pub armor_broken: bool,
    /// Indicates that health is depleted after the hit.
    pub depleted: bool,
}

impl DamageReport {
    /// Damage that landed on armor or health after every reduction.
    #[must_use]
    pub fn landed(&self) -> f32 {
        self.absorbed + self.to_health
    }
}

/// Applies armor multipliers to a base damage value.
///
/// Negative input is treated as zero so damage never heals.
#[must_use]
pub fn resolve(base: f32, kind: DamageKind, armor: Option<&ArmorLayer>) -> f32 {
    let base = base.max(0.0);
    match armor {
        Some(layer) => base * layer.multiplier(kind),
        None => base,
    }
}

/// Resolves damage against optional armor and subtracts the remainder from health.
///
/// With armor attached the resolved amount is reduced by the armor's damage
/// reduction and consumed by durability; whatever durability cannot absorb
/// spills onto health in the same call. The armor is detached exactly once,
/// when its durability reaches zero.
pub fn apply_damage(
    health: &mut Health,
    armor: &mut Option<ArmorLayer>,
    base: f32,
    kind: DamageKind,
) -> DamageReport {
    let resolved = resolve(base, kind, armor.as_ref());
    let mut report = DamageReport {
        resolved,
        ..DamageReport::default()
    };

    let spill = match armor.as_mut() {
        Some(layer) => {
            let reduced = resolved * (1.0 - layer.damage_reduction);
            let absorbed = reduced.min(layer.durability);
            layer.durability -= absorbed;
            report.absorbed = absorbed;
            reduced - absorbed
        }
        None => resolved,
    };

    if armor
        .as_ref()
        .is_some_and(|layer| layer.durability <= 0.0)
    {
        let _ = armor.take();
        report.armor_broken = true;
        debug!("armor broke, {spill} damage spilled into health");
    }

    report.to_health = health.apply_damage(spill);
    report.depleted = health.is_depleted();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::EffectCue;

    fn armor(durability: f32, reduction: f32) -> ArmorDefinition {
        ArmorDefinition {
            durability,
            damage_reduction: reduction,
            resists: vec![DamageKind::Frost],
            vulnerable_to: vec![DamageKind::Fire],
            break_cue: EffectCue::default(),
        }
    }

    #[test]
    fn resolve_applies_multipliers() {
        let layer = ArmorLayer::from_definition(&armor(10.0, 0.0));

        assert_eq!(resolve(10.0, DamageKind::Physical, None), 10.0);
        assert_eq!(resolve(10.0, DamageKind::Fire, None), 10.0);
        assert_eq!(resolve(10.0, DamageKind::Frost, Some(&layer)), 5.0);
        assert_eq!(resolve(10.0, DamageKind::Fire, Some(&layer)), 20.0);
        assert_eq!(resolve(10.0, DamageKind::Physical, Some(&layer)), 10.0);
        assert_eq!(resolve(-4.0, DamageKind::Fire, Some(&layer)), 0.0);
    }

    #[test]
    fn overflow_spills_into_health_and_breaks_armor_once() {
        let mut health = Health::new(10.0);
        let mut layer = Some(ArmorLayer::from_definition(&armor(4.0, 0.5)));

        let report = apply_damage(&mut health, &mut layer, 20.0, DamageKind::Physical);

        assert_eq!(report.resolved, 20.0);
        assert_eq!(report.absorbed, 4.0);
        assert_eq!(report.to_health, 6.0);
        assert!(report.armor_broken);
        assert!(!report.depleted);
        assert!(layer.is_none());
        assert_eq!(health.current(), 4.0);

        let second = apply_damage(&mut health, &mut layer, 2.0, DamageKind::Physical);
        assert!(!second.armor_broken, "armor only breaks once");
        assert_eq!(second.to_health, 2.0);
        assert_eq!(health.current(), 2.0);
    }

    #[test]
    fn intact_armor_shields_health() {
        let mut health = Health::new(10.0);
        let mut layer = Some(ArmorLayer::from_definition(&armor(30.0, 0.25)));

        let report = apply_damage(&mut health, &mut layer, 8.0, DamageKind::Physical);

        assert_eq!(report.absorbed, 6.0);
        assert_eq!(report.to_health, 0.0);
        assert_eq!(report.landed(), 6.0, "reduction is not counted as landed");
        assert!(!report.armor_broken);
        assert_eq!(layer.as_ref().map(ArmorLayer::durability), Some(24.0));
        assert_eq!(health.current(), 10.0);
    }

    #[test]
    fn unarmored_damage_goes_straight_to_health() {
        let mut health = Health::new(5.0);
        let mut layer = None;

        let report = apply_damage(&mut health, &mut layer, 9.0, DamageKind::Lightning);

        assert_eq!(report.to_health, 5.0);
        assert!(report.depleted);
        assert!(!report.armor_broken);
    }

    #[test]
    fn health_never_increases_under_any_damage() {
        let kinds = [
            DamageKind::Physical,
            DamageKind::Fire,
            DamageKind::Frost,
            DamageKind::Poison,
            DamageKind::Lightning,
            DamageKind::Explosive,
        ];
        let amounts = [-5.0, 0.0, 0.5, 3.0, 12.0, 250.0];
        for kind in kinds {
            for base in amounts {
                for durability in [0.0, 2.0, 50.0] {
                    let mut health = Health::new(40.0);
                    let mut layer = Some(ArmorLayer::from_definition(&armor(durability, 0.3)));
                    let before = health.current();
                    let report = apply_damage(&mut health, &mut layer, base, kind);
                    assert!(health.current() <= before);
                    assert!(health.current() >= 0.0);
                    assert!(report.to_health >= 0.0);
                }
            }
        }
    }
}
