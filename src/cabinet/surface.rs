use ratatui::buffer::{Buffer, Cell};
use ratatui::prelude::*;

/// Width and height of a game's playfield, in terminal cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

impl Resolution {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// The shared character-cell canvas every game draws into.
///
/// There is one surface per controller. It is resized to the launching game's
/// resolution and blanked when the game exits; it is never recreated.
pub struct RenderSurface {
    buffer: Buffer,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self {
            buffer: Buffer::empty(Rect::default()),
        }
    }

    pub fn resize(&mut self, resolution: Resolution) {
        self.buffer
            .resize(Rect::new(0, 0, resolution.width, resolution.height));
        self.buffer.reset();
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.buffer.area.width, self.buffer.area.height)
    }

    pub fn width(&self) -> u16 {
        self.buffer.area.width
    }

    pub fn height(&self) -> u16 {
        self.buffer.area.height
    }

    /// Blanks every cell, keeping the current size.
    pub fn clear(&mut self) {
        self.buffer.reset();
    }

    /// Paints every cell with a space in the given style.
    pub fn fill(&mut self, style: Style) {
        for cell in self.buffer.content.iter_mut() {
            cell.reset();
            cell.set_style(style);
        }
    }

    /// Draws one character. Coordinates outside the surface are ignored.
    pub fn put(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if x < 0 || y < 0 || x > u16::MAX as i32 || y > u16::MAX as i32 {
            return;
        }
        if let Some(cell) = self.buffer.cell_mut((x as u16, y as u16)) {
            cell.set_char(ch).set_style(style);
        }
    }

    /// Draws a string left to right from `(x, y)`, clipped at the edge.
    pub fn text(&mut self, x: i32, y: i32, s: &str, style: Style) {
        for (offset, ch) in s.chars().enumerate() {
            self.put(x + offset as i32, y, ch, style);
        }
    }

    /// Draws `s` horizontally centred on row `y`.
    pub fn text_centered(&mut self, y: i32, s: &str, style: Style) {
        let len = s.chars().count() as i32;
        let x = (self.width() as i32 - len) / 2;
        self.text(x, y, s, style);
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.cell((x, y))
    }

    pub fn symbol_at(&self, x: u16, y: u16) -> Option<&str> {
        self.cell(x, y).map(|c| c.symbol())
    }

    /// True when nothing has been drawn since the last clear.
    pub fn is_blank(&self) -> bool {
        self.buffer
            .content
            .iter()
            .all(|cell| cell.symbol() == " " && cell.bg == Color::Reset)
    }
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &RenderSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.width().min(area.width);
        let height = self.height().min(area.height);
        for y in 0..height {
            for x in 0..width {
                if let (Some(src), Some(dst)) = (
                    self.buffer.cell((x, y)),
                    buf.cell_mut((area.x + x, area.y + y)),
                ) {
                    *dst = src.clone();
                }
            }
        }
    }
}
