//! TOML battle scenarios.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use panel_battle_core::{CellCoord, Definitions, EnemyDefinition, PanelDefinition};
use panel_battle_system_battle_loop::Config;
use panel_battle_world::GridLayout;
use serde::Deserialize;

/// Complete description of a battle run.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) seed: u64,
    #[serde(default = "default_tick_ms")]
    pub(crate) tick_ms: u64,
    #[serde(default = "default_ticks")]
    pub(crate) ticks: u64,
    pub(crate) grid: GridSpec,
    #[serde(default)]
    pub(crate) panels: Vec<PanelDefinition>,
    #[serde(default)]
    pub(crate) enemies: Vec<EnemyDefinition>,
    pub(crate) navi: NaviSpec,
    #[serde(default)]
    pub(crate) spawns: Vec<SpawnSpec>,
    #[serde(default)]
    pub(crate) script: Vec<ScriptEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GridSpec {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) player_columns: u32,
    #[serde(default)]
    pub(crate) neutral_columns: u32,
    pub(crate) default_panel: String,
    #[serde(default)]
    pub(crate) overrides: Vec<PanelOverride>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PanelOverride {
    pub(crate) cell: CellCoord,
    pub(crate) panel: String,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NaviSpec {
    pub(crate) cell: CellCoord,
    pub(crate) health: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SpawnSpec {
    pub(crate) enemy: String,
    pub(crate) cell: CellCoord,
}

/// Scripted input applied before the step with the matching index.
#[derive(Clone, Copy, Debug, Deserialize)]
pub(crate) struct ScriptEntry {
    pub(crate) tick: u64,
    #[serde(flatten)]
    pub(crate) action: ScriptAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum ScriptAction {
    Move { cell: CellCoord },
    Pause,
    Resume,
}

fn default_tick_ms() -> u64 {
    50
}

fn default_ticks() -> u64 {
    1_200
}

impl Scenario {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub(crate) fn config(&self) -> Config {
        Config::new(Duration::from_millis(self.tick_ms), self.seed)
    }

    /// Panel and enemy catalog; omitted lists fall back to the prototype's.
    pub(crate) fn definitions(&self) -> Result<Definitions> {
        let panels = if self.panels.is_empty() {
            PanelDefinition::prototype_set()
        } else {
            self.panels.clone()
        };
        let enemies = if self.enemies.is_empty() {
            EnemyDefinition::prototype_set()
        } else {
            self.enemies.clone()
        };
        Definitions::new(panels, enemies).context("invalid definitions")
    }

    pub(crate) fn layout(&self, definitions: &Definitions) -> Result<GridLayout> {
        let grid = &self.grid;
        let default_panel = definitions.require_panel(&grid.default_panel)?;
        let mut layout = GridLayout::new(grid.columns, grid.rows, grid.player_columns, default_panel)
            .with_neutral_columns(grid.neutral_columns);
        for entry in &grid.overrides {
            let panel = definitions
                .require_panel(&entry.panel)
                .with_context(|| format!("override at {:?}", entry.cell))?;
            layout = layout.with_panel(entry.cell, panel);
        }
        Ok(layout)
    }
}
