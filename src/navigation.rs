//! Keyboard navigation between form cells.
//!
//! Form controls are laid out on sheets as a grid of `(row, col)` cells.
//! Up and Down move to the nearest populated row of the same column;
//! Enter, or a move with no target in the column, follows the tab order.

use std::collections::HashMap;

/// Kind of control occupying a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Single-line text input.
    Text,
    /// Multi-line text; keeps every navigation key for itself.
    TextArea,
    /// Drop-down; keeps Up and Down for itself.
    Select,
    /// One button of a radio group.
    Radio {
        /// Whether this button is the selected one.
        checked: bool,
    },
    /// Any other focusable control.
    Other,
}

/// A form control placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Sheet the cell belongs to.
    pub sheet: u32,
    /// Grid row.
    pub row: i32,
    /// Grid column.
    pub col: i32,
    /// Tab order position, if any.
    pub tab_index: Option<i32>,
    /// Kind of control.
    pub kind: CellKind,
    /// False for hidden, read-only or disabled controls.
    pub focusable: bool,
}

impl Cell {
    /// Create a focusable cell.
    pub fn new(sheet: u32, row: i32, col: i32, tab_index: Option<i32>, kind: CellKind) -> Self {
        Self {
            sheet,
            row,
            col,
            tab_index,
            kind,
            focusable: true,
        }
    }
}

/// Navigation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Enter / Return.
    Enter,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
}

/// Cells of a form in document order.
#[derive(Debug, Default)]
pub struct CellGrid {
    cells: Vec<Cell>,
    /// Rows present in each `(sheet, col)`, in document order.
    column_rows: HashMap<(u32, i32), Vec<i32>>,
}

impl CellGrid {
    /// Create a grid from cells in document order.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            column_rows: HashMap::new(),
        }
    }

    /// All cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn find(&self, sheet: u32, row: i32, col: i32) -> Option<usize> {
        self.cells
            .iter()
            .position(|c| c.focusable && c.sheet == sheet && c.row == row && c.col == col)
    }

    fn rows_of_column(&mut self, sheet: u32, col: i32) -> &[i32] {
        let cells = &self.cells;
        self.column_rows.entry((sheet, col)).or_insert_with(|| {
            cells
                .iter()
                .filter(|c| c.focusable && c.sheet == sheet && c.col == col)
                .map(|c| c.row)
                .collect()
        })
    }

    /// Search the column for the next row in the direction of `key`.
    fn vertical_target(&mut self, from: &Cell, key: NavKey) -> Option<usize> {
        let (sheet, row, col) = (from.sheet, from.row, from.col);
        let mut below = row + 1;
        let mut above = row - 1;
        let mut last = below;
        let mut first = above;

        while (key == NavKey::Down && below <= last) || (key == NavKey::Up && above >= first) {
            let target_row = if key == NavKey::Up { above } else { below };
            if let Some(index) = self.find(sheet, target_row, col) {
                return Some(index);
            }

            let rows = self.rows_of_column(sheet, col);
            let (Some(&lo), Some(&hi)) = (rows.first(), rows.last()) else {
                return None;
            };
            first = lo;
            last = hi;
            let position = rows.iter().position(|&r| r == row);

            if key == NavKey::Down && row < last {
                match position.and_then(|p| rows.get(p + 1)) {
                    Some(&next) => below = next,
                    None => break,
                }
            } else if key == NavKey::Up && row > first {
                match position.and_then(|p| p.checked_sub(1)).and_then(|p| rows.get(p)) {
                    Some(&prev) => above = prev,
                    None => break,
                }
            } else {
                break;
            }
        }
        None
    }

    /// Cell in tab order after (or, for Up, before) `from`.
    fn tab_target(&self, from: &Cell, key: NavKey) -> Option<usize> {
        let tab = from.tab_index?;
        let wanted = if key == NavKey::Up { tab - 1 } else { tab + 1 };
        let in_sheet = |c: &Cell| c.focusable && c.sheet == from.sheet;

        let candidates: Vec<usize> = (0..self.cells.len())
            .filter(|&i| in_sheet(&self.cells[i]) && self.cells[i].tab_index == Some(wanted))
            .collect();

        if candidates.is_empty() {
            return self
                .cells
                .iter()
                .position(|c| in_sheet(c) && c.tab_index.is_some());
        }
        if candidates
            .iter()
            .any(|&i| matches!(self.cells[i].kind, CellKind::Radio { .. }))
        {
            return candidates
                .into_iter()
                .find(|&i| self.cells[i].kind == CellKind::Radio { checked: true });
        }
        candidates.first().copied()
    }

    /// Index of the cell that should receive focus after `key` is pressed
    /// on cell `from`, or `None` when focus stays put.
    pub fn next_focus(&mut self, from: usize, key: NavKey) -> Option<usize> {
        let cell = self.cells.get(from)?.clone();
        match (cell.kind, key) {
            (CellKind::TextArea, _) => return None,
            (CellKind::Select, NavKey::Up | NavKey::Down) => return None,
            _ => {},
        }
        if key != NavKey::Enter {
            if let Some(target) = self.vertical_target(&cell, key) {
                return Some(target);
            }
        }
        self.tab_target(&cell, key)
    }
}
