use crate::shared::{DisplayState, Page, Row};

// state local to the tui; page and row are synced from DisplayState each
// frame so key resolution always matches what's on screen
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub page: Page,
    pub selected_row: usize,
}

impl TuiState {
    pub fn sync(&mut self, ds: &DisplayState) {
        self.page = ds.page;
        self.selected_row = ds.selected_row;
    }

    pub fn row(&self) -> Row {
        self.page.row(self.selected_row)
    }
}
