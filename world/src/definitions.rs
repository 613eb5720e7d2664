//! Immutable definition tables indexed by typed kind keys.

use lane_defence_core::{
    AttackerDefinition, AttackerKind, DefenderDefinition, DefenderKind, ProjectileDefinition,
    ProjectileKind,
};
use lane_defence_pool::PoolSettings;

/// Every attacker, projectile and defender definition known to a world.
///
/// Kinds are assigned in insertion order, so the first attacker added is
/// `AttackerKind::new(0)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Definitions {
    attackers: Vec<(AttackerDefinition, PoolSettings)>,
    projectiles: Vec<(ProjectileDefinition, PoolSettings)>,
    defenders: Vec<DefenderDefinition>,
}

impl Definitions {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attacker definition with its pool settings.
    ///
    /// Returns `None` once every kind value is taken.
    pub fn add_attacker(
        &mut self,
        definition: AttackerDefinition,
        pool: PoolSettings,
    ) -> Option<AttackerKind> {
        let kind = AttackerKind::new(u16::try_from(self.attackers.len()).ok()?);
        self.attackers.push((definition, pool));
        Some(kind)
    }

    /// Adds a projectile definition with its pool settings.
    ///
    /// Returns `None` once every kind value is taken.
    pub fn add_projectile(
        &mut self,
        definition: ProjectileDefinition,
        pool: PoolSettings,
    ) -> Option<ProjectileKind> {
        let kind = ProjectileKind::new(u16::try_from(self.projectiles.len()).ok()?);
        self.projectiles.push((definition, pool));
        Some(kind)
    }

    /// Adds a defender definition.
    ///
    /// Returns `None` once every kind value is taken.
    pub fn add_defender(&mut self, definition: DefenderDefinition) -> Option<DefenderKind> {
        let kind = DefenderKind::new(u16::try_from(self.defenders.len()).ok()?);
        self.defenders.push(definition);
        Some(kind)
    }

    /// Definition of the attacker kind.
    #[must_use]
    pub fn attacker(&self, kind: AttackerKind) -> Option<&AttackerDefinition> {
        self.attackers
            .get(usize::from(kind.get()))
            .map(|(definition, _)| definition)
    }

    /// Pool settings of the attacker kind.
    #[must_use]
    pub fn attacker_pool(&self, kind: AttackerKind) -> Option<PoolSettings> {
        self.attackers
            .get(usize::from(kind.get()))
            .map(|(_, settings)| *settings)
    }

    /// Definition of the projectile kind.
    #[must_use]
    pub fn projectile(&self, kind: ProjectileKind) -> Option<&ProjectileDefinition> {
        self.projectiles
            .get(usize::from(kind.get()))
            .map(|(definition, _)| definition)
    }

    /// Pool settings of the projectile kind.
    #[must_use]
    pub fn projectile_pool(&self, kind: ProjectileKind) -> Option<PoolSettings> {
        self.projectiles
            .get(usize::from(kind.get()))
            .map(|(_, settings)| *settings)
    }

    /// Definition of the defender kind.
    #[must_use]
    pub fn defender(&self, kind: DefenderKind) -> Option<&DefenderDefinition> {
        self.defenders.get(usize::from(kind.get()))
    }

    /// Looks up an attacker kind by name.
    #[must_use]
    pub fn attacker_kind(&self, name: &str) -> Option<AttackerKind> {
        let index = self
            .attackers
            .iter()
            .position(|(definition, _)| definition.name == name)?;
        u16::try_from(index).ok().map(AttackerKind::new)
    }

    /// Looks up a projectile kind by name.
    #[must_use]
    pub fn projectile_kind(&self, name: &str) -> Option<ProjectileKind> {
        let index = self
            .projectiles
            .iter()
            .position(|(definition, _)| definition.name == name)?;
        u16::try_from(index).ok().map(ProjectileKind::new)
    }

    /// Looks up a defender kind by name.
    #[must_use]
    pub fn defender_kind(&self, name: &str) -> Option<DefenderKind> {
        let index = self
            .defenders
            .iter()
            .position(|definition| definition.name == name)?;
        u16::try_from(index).ok().map(DefenderKind::new)
    }

    /// Every attacker kind in ascending order.
    pub fn attacker_kinds(&self) -> impl Iterator<Item = AttackerKind> + '_ {
        (0..self.attackers.len())
            .filter_map(|index| u16::try_from(index).ok())
            .map(AttackerKind::new)
    }

    /// Every projectile kind in ascending order.
    pub fn projectile_kinds(&self) -> impl Iterator<Item = ProjectileKind> + '_ {
        (0..self.projectiles.len())
            .filter_map(|index| u16::try_from(index).ok())
            .map(ProjectileKind::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_insertion_order() {
        let mut definitions = Definitions::new();
        let bolt = ProjectileDefinition {
            name: "bolt".to_owned(),
            ..ProjectileDefinition::default()
        };
        let grunt = AttackerDefinition {
            name: "grunt".to_owned(),
            ..AttackerDefinition::default()
        };
        let brute = AttackerDefinition {
            name: "brute".to_owned(),
            ..AttackerDefinition::default()
        };

        assert_eq!(
            definitions.add_projectile(bolt, PoolSettings::default()),
            Some(ProjectileKind::new(0))
        );
        assert_eq!(
            definitions.add_attacker(grunt, PoolSettings::default()),
            Some(AttackerKind::new(0))
        );
        assert_eq!(
            definitions.add_attacker(brute, PoolSettings::new(2, 8, false)),
            Some(AttackerKind::new(1))
        );

        assert_eq!(definitions.attacker_kind("brute"), Some(AttackerKind::new(1)));
        assert_eq!(
            definitions.attacker_pool(AttackerKind::new(1)),
            Some(PoolSettings::new(2, 8, false))
        );
        assert_eq!(definitions.projectile_kind("bolt"), Some(ProjectileKind::new(0)));
        assert!(definitions.defender(DefenderKind::new(0)).is_none());
        assert_eq!(definitions.attacker_kinds().count(), 2);
    }
}
