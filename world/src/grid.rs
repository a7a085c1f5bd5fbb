//! Static spatial queries over the rectangular panel grid.

use std::time::Duration;

use panel_battle_core::{
    CellCoord, ConfigError, Definitions, Direction, EffectKind, EntityId, GridCell,
    PanelDefinition, PanelTypeId, Side,
};

use crate::panel_effect::{EffectTick, PanelEffect};

/// Construction parameters for the battle grid.
///
/// Columns are split left to right into the player side, an optional neutral
/// strip, and the enemy side. Side ownership never changes after the grid is
/// built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    player_columns: u32,
    neutral_columns: u32,
    default_panel: PanelTypeId,
    overrides: Vec<(CellCoord, PanelTypeId)>,
}

impl GridLayout {
    /// Creates a layout whose first `player_columns` columns belong to the player.
    #[must_use]
    pub fn new(columns: u32, rows: u32, player_columns: u32, default_panel: PanelTypeId) -> Self {
        Self {
            columns,
            rows,
            player_columns,
            neutral_columns: 0,
            default_panel,
            overrides: Vec::new(),
        }
    }

    /// Reserves `count` columns after the player side for neither combatant.
    #[must_use]
    pub fn with_neutral_columns(mut self, count: u32) -> Self {
        self.neutral_columns = count;
        self
    }

    /// Starts the battle with `panel` at `cell` instead of the default panel.
    #[must_use]
    pub fn with_panel(mut self, cell: CellCoord, panel: PanelTypeId) -> Self {
        self.overrides.push((cell, panel));
        self
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side owning every cell of the provided column.
    #[must_use]
    pub fn side_of_column(&self, column: u32) -> Side {
        if column < self.player_columns {
            Side::Player
        } else if column < self.player_columns.saturating_add(self.neutral_columns) {
            Side::Neutral
        } else {
            Side::Enemy
        }
    }
}

#[derive(Clone, Debug)]
struct CellState {
    side: Side,
    panel: PanelTypeId,
    traversable: bool,
    effect: PanelEffect,
}

impl CellState {
    fn with_panel(side: Side, panel: PanelTypeId, definition: &PanelDefinition) -> Self {
        Self {
            side,
            panel,
            traversable: definition.traversable,
            effect: PanelEffect::bind(definition),
        }
    }
}

/// Dense index of every cell and its occupant.
///
/// All lookups are total: coordinates outside the grid produce `None`,
/// `false`, or an empty list and never panic.
#[derive(Clone, Debug)]
pub struct GridIndex {
    columns: u32,
    rows: u32,
    cells: Vec<CellState>,
    occupancy: Vec<Option<EntityId>>,
}

impl GridIndex {
    pub(crate) fn build(layout: &GridLayout, definitions: &Definitions) -> Result<Self, ConfigError> {
        if layout.columns == 0 || layout.rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }

        let default_definition = definitions
            .panel(layout.default_panel)
            .ok_or(ConfigError::UnknownPanelId(layout.default_panel))?;

        let capacity_u64 = u64::from(layout.columns) * u64::from(layout.rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for _row in 0..layout.rows {
            for column in 0..layout.columns {
                cells.push(CellState::with_panel(
                    layout.side_of_column(column),
                    layout.default_panel,
                    default_definition,
                ));
            }
        }

        let mut grid = Self {
            columns: layout.columns,
            rows: layout.rows,
            cells,
            occupancy: vec![None; capacity],
        };

        for (cell, panel) in &layout.overrides {
            let definition = definitions
                .panel(*panel)
                .ok_or(ConfigError::UnknownPanelId(*panel))?;
            let index = grid
                .index(*cell)
                .ok_or(ConfigError::OverrideOutOfBounds(*cell))?;
            let side = grid.cells[index].side;
            grid.cells[index] = CellState::with_panel(side, *panel, definition);
        }

        Ok(grid)
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Looks up the cell at `coord`. An expired effect reads as
    /// [`EffectKind::None`].
    #[must_use]
    pub fn cell_at(&self, coord: CellCoord) -> Option<GridCell> {
        let index = self.index(coord)?;
        let state = self.cells.get(index)?;
        Some(GridCell {
            coord,
            traversable: state.traversable,
            side: state.side,
            occupant: self.occupancy.get(index).copied().flatten(),
            panel: state.panel,
            effect: if state.effect.is_active() {
                state.effect.kind()
            } else {
                EffectKind::None
            },
        })
    }

    /// Looks up the neighbour of `coord` in one cardinal direction.
    #[must_use]
    pub fn relative(&self, coord: CellCoord, direction: Direction) -> Option<GridCell> {
        let _ = self.index(coord)?;
        self.cell_at(coord.step(direction)?)
    }

    /// Every cell owned by `side`, in row-major order.
    #[must_use]
    pub fn cells_on_side(&self, side: Side) -> Vec<GridCell> {
        self.coords()
            .filter_map(|coord| self.cell_at(coord))
            .filter(|cell| cell.side == side)
            .collect()
    }

    /// Reports whether an entity may enter `coord` right now: the panel must
    /// be traversable and nobody may be standing on it.
    #[must_use]
    pub fn is_traversable(&self, coord: CellCoord) -> bool {
        self.cell_at(coord)
            .map_or(false, |cell| cell.traversable && cell.occupant.is_none())
    }

    /// Entity standing on `coord`, if any.
    #[must_use]
    pub fn occupant(&self, coord: CellCoord) -> Option<EntityId> {
        self.index(coord)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    pub(crate) fn effect(&self, coord: CellCoord) -> Option<&PanelEffect> {
        self.index(coord)
            .and_then(|index| self.cells.get(index))
            .map(|state| &state.effect)
    }

    pub(crate) fn occupy(&mut self, entity: EntityId, coord: CellCoord) {
        if let Some(slot) = self.index(coord).and_then(|index| self.occupancy.get_mut(index)) {
            *slot = Some(entity);
        }
    }

    pub(crate) fn vacate(&mut self, coord: CellCoord) {
        if let Some(slot) = self.index(coord).and_then(|index| self.occupancy.get_mut(index)) {
            *slot = None;
        }
    }

    /// Swaps occupancy from `from` to `to` as one step. Callers validate the
    /// destination first.
    pub(crate) fn relocate(&mut self, entity: EntityId, from: CellCoord, to: CellCoord) {
        if self.occupant(from) == Some(entity) {
            self.vacate(from);
        }
        self.occupy(entity, to);
    }

    /// Rebinds `coord` to a new panel type and returns the previous type.
    /// The old effect is discarded.
    pub(crate) fn set_panel(
        &mut self,
        coord: CellCoord,
        panel: PanelTypeId,
        definition: &PanelDefinition,
    ) -> Option<PanelTypeId> {
        let index = self.index(coord)?;
        let state = self.cells.get_mut(index)?;
        let previous = state.panel;
        if previous != panel {
            *state = CellState::with_panel(state.side, panel, definition);
        }
        Some(previous)
    }

    /// Advances every bound effect by one tick in row-major order.
    pub(crate) fn advance_effects(&mut self, dt: Duration) -> Vec<(CellCoord, EffectKind, EffectTick)> {
        let columns = self.columns;
        let mut results = Vec::new();
        for (index, state) in self.cells.iter_mut().enumerate() {
            let outcome = state.effect.advance(dt);
            if outcome == EffectTick::Idle {
                continue;
            }
            let Some(coord) = coord_for_index(index, columns) else {
                continue;
            };
            results.push((coord, state.effect.kind(), outcome));
        }
        results
    }

    fn coords(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn coord_for_index(index: usize, columns: u32) -> Option<CellCoord> {
    let width = usize::try_from(columns).ok()?;
    if width == 0 {
        return None;
    }
    let column = u32::try_from(index % width).ok()?;
    let row = u32::try_from(index / width).ok()?;
    Some(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_battle_core::{BROKEN_PANEL, NORMAL_PANEL, POISON_PANEL};

    fn standard_grid() -> GridIndex {
        let definitions = Definitions::prototype().expect("prototype catalog");
        let normal = definitions.panel_id(NORMAL_PANEL).expect("normal panel");
        let broken = definitions.panel_id(BROKEN_PANEL).expect("broken panel");
        let layout = GridLayout::new(6, 3, 3, normal).with_panel(CellCoord::new(4, 1), broken);
        GridIndex::build(&layout, &definitions).expect("valid layout")
    }

    #[test]
    fn empty_layout_is_rejected() {
        let definitions = Definitions::prototype().expect("prototype catalog");
        let layout = GridLayout::new(0, 3, 0, PanelTypeId::new(0));
        assert_eq!(
            GridIndex::build(&layout, &definitions).err(),
            Some(ConfigError::EmptyGrid)
        );
    }

    #[test]
    fn overrides_outside_the_grid_are_rejected() {
        let definitions = Definitions::prototype().expect("prototype catalog");
        let layout = GridLayout::new(2, 2, 1, PanelTypeId::new(0))
            .with_panel(CellCoord::new(5, 0), PanelTypeId::new(0));
        assert_eq!(
            GridIndex::build(&layout, &definitions).err(),
            Some(ConfigError::OverrideOutOfBounds(CellCoord::new(5, 0)))
        );
    }

    #[test]
    fn sides_split_by_column() {
        let grid = standard_grid();
        let player = grid.cells_on_side(Side::Player);
        let enemy = grid.cells_on_side(Side::Enemy);
        assert_eq!(player.len(), 9);
        assert_eq!(enemy.len(), 9);
        assert!(grid.cells_on_side(Side::Neutral).is_empty());
        assert!(player.iter().all(|cell| cell.coord.column() < 3));
    }

    #[test]
    fn cells_on_side_are_row_major() {
        let grid = standard_grid();
        let coords: Vec<_> = grid
            .cells_on_side(Side::Enemy)
            .into_iter()
            .map(|cell| (cell.coord.row(), cell.coord.column()))
            .collect();
        let mut sorted = coords.clone();
        sorted.sort_unstable();
        assert_eq!(coords, sorted);
        assert_eq!(coords.first(), Some(&(0, 3)));
    }

    #[test]
    fn neutral_strip_sits_between_sides() {
        let layout = GridLayout::new(7, 3, 3, PanelTypeId::new(0)).with_neutral_columns(1);
        assert_eq!(layout.side_of_column(2), Side::Player);
        assert_eq!(layout.side_of_column(3), Side::Neutral);
        assert_eq!(layout.side_of_column(4), Side::Enemy);
    }

    #[test]
    fn relative_walks_cardinal_neighbours() {
        let grid = standard_grid();
        let centre = CellCoord::new(2, 1);
        let right = grid.relative(centre, Direction::Right).expect("right");
        assert_eq!(right.coord, CellCoord::new(3, 1));
        assert_eq!(right.side, Side::Enemy);
        assert_eq!(
            grid.relative(centre, Direction::Up).map(|cell| cell.coord),
            Some(CellCoord::new(2, 0))
        );
        assert!(grid.relative(CellCoord::new(5, 2), Direction::Right).is_none());
        assert!(grid.relative(CellCoord::new(5, 2), Direction::Down).is_none());
        assert!(grid.relative(CellCoord::new(0, 0), Direction::Left).is_none());
    }

    #[test]
    fn relative_from_outside_the_grid_is_empty() {
        let grid = standard_grid();
        assert!(grid.relative(CellCoord::new(6, 1), Direction::Left).is_none());
    }

    #[test]
    fn traversable_requires_flag_and_vacancy() {
        let mut grid = standard_grid();
        assert!(grid.is_traversable(CellCoord::new(1, 1)));
        assert!(!grid.is_traversable(CellCoord::new(4, 1)));

        grid.occupy(EntityId::new(3), CellCoord::new(1, 1));
        assert!(!grid.is_traversable(CellCoord::new(1, 1)));
        assert_eq!(grid.occupant(CellCoord::new(1, 1)), Some(EntityId::new(3)));
    }

    #[test]
    fn relocate_moves_occupancy_in_one_step() {
        let mut grid = standard_grid();
        let entity = EntityId::new(1);
        grid.occupy(entity, CellCoord::new(0, 0));
        grid.relocate(entity, CellCoord::new(0, 0), CellCoord::new(2, 2));
        assert_eq!(grid.occupant(CellCoord::new(0, 0)), None);
        assert_eq!(grid.occupant(CellCoord::new(2, 2)), Some(entity));
    }

    #[test]
    fn set_panel_replaces_effect_wholesale() {
        let definitions = Definitions::prototype().expect("prototype catalog");
        let mut grid = standard_grid();
        let poison = definitions.panel_id(POISON_PANEL).expect("poison");
        let normal = definitions.panel_id(NORMAL_PANEL).expect("normal");
        let cell = CellCoord::new(0, 2);

        let previous = grid.set_panel(cell, poison, definitions.panel(poison).expect("def"));
        assert_eq!(previous, Some(normal));
        assert_eq!(grid.cell_at(cell).map(|c| c.effect), Some(EffectKind::Poison));

        let _ = grid.set_panel(cell, normal, definitions.panel(normal).expect("def"));
        assert_eq!(grid.cell_at(cell).map(|c| c.effect), Some(EffectKind::None));
        assert!(grid.effect(cell).map_or(false, |effect| !effect.is_active()));
    }

    #[test]
    fn expired_effect_reads_as_plain_panel() {
        let mut poison = PanelDefinition::poison(1);
        poison.effect_duration_ms = Some(100);
        let definitions = Definitions::new(
            vec![PanelDefinition::normal(), poison],
            Vec::new(),
        )
        .expect("definitions");
        let poison = definitions.panel_id(POISON_PANEL).expect("poison");
        let cell = CellCoord::new(1, 1);
        let layout = GridLayout::new(4, 2, 2, PanelTypeId::new(0)).with_panel(cell, poison);
        let mut grid = GridIndex::build(&layout, &definitions).expect("valid layout");

        let first = grid.advance_effects(Duration::from_millis(100));
        assert_eq!(first, vec![(cell, EffectKind::Poison, EffectTick::Apply(1))]);
        assert_eq!(grid.cell_at(cell).map(|c| c.effect), Some(EffectKind::Poison));

        let second = grid.advance_effects(Duration::from_millis(100));
        assert_eq!(second, vec![(cell, EffectKind::Poison, EffectTick::Expired)]);
        assert_eq!(grid.cell_at(cell).map(|c| c.effect), Some(EffectKind::None));
        assert_eq!(grid.cell_at(cell).map(|c| c.panel), Some(poison));
    }

    #[test]
    fn index_round_trips_through_coordinates() {
        assert_eq!(coord_for_index(7, 6), Some(CellCoord::new(1, 1)));
        assert_eq!(coord_for_index(3, 0), None);
    }
}
