//! Test utilities for widget rendering tests.
//!
//! Provides a test terminal with fixed dimensions to render widgets into and
//! inspect the rendered text and cell styles.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
};

/// A fixed-size test terminal for rendering components and comparing output.
pub struct TestTerminal {
    pub buffer: Buffer,
    pub area: Rect,
}

impl TestTerminal {
    /// Create a test terminal with fixed width and height.
    pub fn new(width: u16, height: u16) -> Self {
        let area = Rect::new(0, 0, width, height);
        let buffer = Buffer::empty(area);
        Self { buffer, area }
    }

    /// Get the rendered terminal output as a string.
    /// Returns exactly what would appear on screen - each row is a line.
    pub fn render_to_string(&self) -> String {
        let mut lines = Vec::new();
        for y in 0..self.area.height {
            let mut line = String::new();
            for x in 0..self.area.width {
                let cell = self.buffer.cell(Position::new(x, y)).unwrap();
                let symbol = cell.symbol();
                if symbol.is_empty() {
                    line.push(' ');
                } else {
                    line.push_str(symbol);
                }
            }
            // Trim trailing spaces for cleaner comparison
            lines.push(line.trim_end().to_string());
        }
        // Remove trailing empty lines
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }
        lines.join("\n")
    }

    /// Symbol drawn at a position, `None` outside the terminal.
    pub fn symbol_at(&self, x: u16, y: u16) -> Option<&str> {
        self.buffer.cell(Position::new(x, y)).map(|cell| cell.symbol())
    }

    /// Every position whose foreground colour is `color`.
    pub fn cells_with_fg(&self, color: Color) -> Vec<(u16, u16)> {
        let mut cells = Vec::new();
        for y in 0..self.area.height {
            for x in 0..self.area.width {
                if let Some(cell) = self.buffer.cell(Position::new(x, y)) {
                    if cell.fg == color {
                        cells.push((x, y));
                    }
                }
            }
        }
        cells
    }
}
