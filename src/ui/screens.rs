/// Number of item cards shown in each row of the grid.
pub(crate) const GRID_COLUMNS: usize = 3;

/// Cursor over the binder grid. Tracks the highlighted card index and keeps it
/// inside the current item count.
#[derive(Default)]
pub(crate) struct GridCursor {
    pub(crate) selected: usize,
}

impl GridCursor {
    pub(crate) fn move_horizontal(&mut self, offset: isize, len: usize) {
        let new_index = self.selected as isize + offset;
        if (0..len as isize).contains(&new_index) {
            self.selected = new_index as usize;
        }
    }

    pub(crate) fn move_vertical(&mut self, offset: isize, len: usize) {
        let new_index = self.selected as isize + offset * GRID_COLUMNS as isize;
        if (0..len as isize).contains(&new_index) {
            self.selected = new_index as usize;
        }
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Pull the cursor back inside the grid after items disappear.
    pub(crate) fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub(crate) fn row(&self) -> usize {
        self.selected / GRID_COLUMNS
    }

    /// First row to draw so the highlighted row stays on screen.
    pub(crate) fn first_visible_row(&self, visible_rows: usize) -> usize {
        (self.row() + 1).saturating_sub(visible_rows.max(1))
    }
}

/// Number of grid rows needed for `len` items.
pub(crate) fn row_count(len: usize) -> usize {
    len.div_ceil(GRID_COLUMNS)
}

/// Scroll state of the detail screen's preview pane.
#[derive(Default)]
pub(crate) struct DetailScroll {
    pub(crate) offset: u16,
}

impl DetailScroll {
    pub(crate) fn scroll(&mut self, delta: i32) {
        let next = (self.offset as i32 + delta).clamp(0, u16::MAX as i32);
        self.offset = next as u16;
    }

    pub(crate) fn reset(&mut self) {
        self.offset = 0;
    }
}
