//! Read-only records describing panel types and enemy archetypes.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, PanelTypeId};

/// Name of the plain traversable panel.
pub const NORMAL_PANEL: &str = "normal";
/// Name of the panel patrol-and-strike attacks leave behind.
pub const CRACKED_PANEL: &str = "cracked";
/// Name of the impassable panel a cracked panel turns into.
pub const BROKEN_PANEL: &str = "broken";
/// Name of the damage-over-time panel.
pub const POISON_PANEL: &str = "poison";

/// Named combination of movement and attack logic bound to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Archetype {
    /// Waits for the navi to share its row, lunges beside it, then retreats.
    PatrolStrike,
    /// Teleports around its own side, then flanks the navi with a wide slash.
    TeleportFlank,
}

/// Recurring effect carried by a panel type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    /// Plain panel.
    #[default]
    None,
    /// Damages the occupant once per tick.
    Poison,
    /// Breaks once its occupant steps off.
    Cracked,
}

/// Definition of a panel type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDefinition {
    /// Unique name of the panel type.
    pub name: String,
    /// Whether entities may stand on the panel.
    #[serde(default = "default_traversable")]
    pub traversable: bool,
    /// Effect bound to cells of this type.
    #[serde(default)]
    pub effect: EffectKind,
    /// Per-tick magnitude of the effect.
    #[serde(default)]
    pub magnitude: u32,
    /// Optional lifetime of the effect in milliseconds.
    #[serde(default)]
    pub effect_duration_ms: Option<u64>,
    /// Panel type a cracked panel becomes once vacated.
    #[serde(default)]
    pub breaks_into: Option<String>,
    /// Presentation material for the panel.
    #[serde(default)]
    pub material: Option<String>,
}

fn default_traversable() -> bool {
    true
}

impl PanelDefinition {
    /// Plain traversable panel.
    #[must_use]
    pub fn normal() -> Self {
        Self {
            name: NORMAL_PANEL.to_owned(),
            traversable: true,
            effect: EffectKind::None,
            magnitude: 0,
            effect_duration_ms: None,
            breaks_into: None,
            material: Some("panel".to_owned()),
        }
    }

    /// Cracked panel that breaks into [`BROKEN_PANEL`] when vacated.
    #[must_use]
    pub fn cracked() -> Self {
        Self {
            name: CRACKED_PANEL.to_owned(),
            effect: EffectKind::Cracked,
            breaks_into: Some(BROKEN_PANEL.to_owned()),
            material: Some("panel-cracked".to_owned()),
            ..Self::normal()
        }
    }

    /// Impassable broken panel.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            name: BROKEN_PANEL.to_owned(),
            traversable: false,
            material: Some("panel-broken".to_owned()),
            ..Self::normal()
        }
    }

    /// Poison panel dealing `magnitude` damage per tick.
    #[must_use]
    pub fn poison(magnitude: u32) -> Self {
        Self {
            name: POISON_PANEL.to_owned(),
            effect: EffectKind::Poison,
            magnitude,
            material: Some("panel-poison".to_owned()),
            ..Self::normal()
        }
    }

    /// Panels of the battle prototype in identifier order: normal, cracked,
    /// broken and poison.
    #[must_use]
    pub fn prototype_set() -> Vec<Self> {
        vec![Self::normal(), Self::cracked(), Self::broken(), Self::poison(1)]
    }

    /// Lifetime of the effect, when it expires at all.
    #[must_use]
    pub fn effect_duration(&self) -> Option<Duration> {
        self.effect_duration_ms.map(Duration::from_millis)
    }
}

/// Definition of an enemy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Unique name of the enemy.
    pub name: String,
    /// Behaviour bound to the enemy.
    #[serde(default)]
    pub archetype: Option<Archetype>,
    /// Base delay between movement decisions in milliseconds.
    pub move_delay_ms: u64,
    /// Delay before the very first movement decision, if it differs from the base.
    #[serde(default)]
    pub initial_move_delay_ms: Option<u64>,
    /// Base delay between attacks in milliseconds.
    pub attack_delay_ms: u64,
    /// Fixed damage dealt by a successful attack.
    pub damage: u32,
    /// Starting health.
    pub health: u32,
}

impl EnemyDefinition {
    /// Hammer-style patrol-and-strike enemy with the prototype's tuning.
    #[must_use]
    pub fn patrol_strike(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            archetype: Some(Archetype::PatrolStrike),
            move_delay_ms: 2_000,
            initial_move_delay_ms: Some(100),
            attack_delay_ms: 800,
            damage: 30,
            health: 200,
        }
    }

    /// Sword-style teleport-and-flank enemy with the prototype's tuning.
    #[must_use]
    pub fn teleport_flank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            archetype: Some(Archetype::TeleportFlank),
            move_delay_ms: 1_000,
            initial_move_delay_ms: None,
            attack_delay_ms: 1_000,
            damage: 80,
            health: 400,
        }
    }

    /// One enemy of each archetype, as fielded by the battle prototype.
    #[must_use]
    pub fn prototype_set() -> Vec<Self> {
        vec![Self::patrol_strike("hammer"), Self::teleport_flank("swordsman")]
    }

    /// Behaviour bound to the enemy.
    pub fn archetype(&self) -> Result<Archetype, ConfigError> {
        self.archetype
            .ok_or_else(|| ConfigError::MissingArchetype(self.name.clone()))
    }

    /// Base delay between movement decisions.
    #[must_use]
    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    /// Delay before the first movement decision.
    #[must_use]
    pub fn initial_move_delay(&self) -> Duration {
        self.initial_move_delay_ms
            .map_or_else(|| self.move_delay(), Duration::from_millis)
    }

    /// Base delay between attacks.
    #[must_use]
    pub fn attack_delay(&self) -> Duration {
        Duration::from_millis(self.attack_delay_ms)
    }
}

/// Validated, indexed collection of panel and enemy definitions.
///
/// Panel type identifiers are positions in the panel list, so the order of
/// `panels` is part of the data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definitions {
    panels: Vec<PanelDefinition>,
    panel_ids: BTreeMap<String, PanelTypeId>,
    enemies: BTreeMap<String, EnemyDefinition>,
}

impl Definitions {
    /// Validates and indexes the provided records.
    pub fn new(
        panels: Vec<PanelDefinition>,
        enemies: Vec<EnemyDefinition>,
    ) -> Result<Self, ConfigError> {
        let mut panel_ids = BTreeMap::new();
        for (index, panel) in panels.iter().enumerate() {
            let id = PanelTypeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if panel_ids.insert(panel.name.clone(), id).is_some() {
                return Err(ConfigError::DuplicatePanel(panel.name.clone()));
            }
        }

        for panel in &panels {
            if let Some(target) = &panel.breaks_into {
                if !panel_ids.contains_key(target) {
                    return Err(ConfigError::UnknownPanel(target.clone()));
                }
            }
        }

        let mut indexed = BTreeMap::new();
        for enemy in enemies {
            if enemy.health == 0 {
                return Err(ConfigError::DepletedEnemy(enemy.name));
            }
            if enemy.archetype()? == Archetype::PatrolStrike
                && !panel_ids.contains_key(CRACKED_PANEL)
            {
                return Err(ConfigError::MissingCrackedPanel);
            }
            let name = enemy.name.clone();
            if indexed.insert(name.clone(), enemy).is_some() {
                return Err(ConfigError::DuplicateEnemy(name));
            }
        }

        Ok(Self {
            panels,
            panel_ids,
            enemies: indexed,
        })
    }

    /// Catalog mirroring the battle prototype.
    pub fn prototype() -> Result<Self, ConfigError> {
        Self::new(PanelDefinition::prototype_set(), EnemyDefinition::prototype_set())
    }

    /// Looks up a panel definition by identifier.
    #[must_use]
    pub fn panel(&self, id: PanelTypeId) -> Option<&PanelDefinition> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.panels.get(index))
    }

    /// Resolves a panel name to its identifier.
    #[must_use]
    pub fn panel_id(&self, name: &str) -> Option<PanelTypeId> {
        self.panel_ids.get(name).copied()
    }

    /// Resolves a panel name, failing when it is not defined.
    pub fn require_panel(&self, name: &str) -> Result<PanelTypeId, ConfigError> {
        self.panel_id(name)
            .ok_or_else(|| ConfigError::UnknownPanel(name.to_owned()))
    }

    /// Looks up an enemy definition by name.
    #[must_use]
    pub fn enemy(&self, name: &str) -> Option<&EnemyDefinition> {
        self.enemies.get(name)
    }
}
