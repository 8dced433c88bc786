//! Fixed-pitch glyph layout over a configurable viewport.

/// Viewport dimensions and cursor stepping for layout.
///
/// The left margin is one `h_step`, the top margin one `v_step`, and the
/// right margin sits one `h_step` in from the viewport edge. Passing the
/// configuration as a value (instead of module constants) keeps layout
/// deterministic at arbitrary viewport sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    pub viewport_width: i32,
    pub viewport_height: i32,
    pub h_step: i32,
    pub v_step: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            h_step: 13,
            v_step: 18,
        }
    }
}

/// One positioned character of the display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPlacement {
    pub x: i32,
    pub y: i32,
    pub glyph: char,
}

/// Produces glyph placements with fixed-pitch advance and wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    /// Lays `text` out as an ordered display list.
    ///
    /// Two cursors start at the margins. Every character is emitted at the
    /// current cursor, then the horizontal cursor advances one `h_step`;
    /// reaching the right margin, or having just emitted a newline, resets
    /// the horizontal cursor and advances the vertical one. Newlines are
    /// emitted as placements like any other character before the cursor
    /// reset takes effect.
    pub fn layout(&self, text: &str) -> Vec<GlyphPlacement> {
        let mut placements = Vec::with_capacity(text.len());
        let mut cursor_x = self.config.h_step;
        let mut cursor_y = self.config.v_step;

        for glyph in text.chars() {
            placements.push(GlyphPlacement {
                x: cursor_x,
                y: cursor_y,
                glyph,
            });

            cursor_x += self.config.h_step;
            if cursor_x >= self.config.viewport_width - self.config.h_step || glyph == '\n' {
                cursor_x = self.config.h_step;
                cursor_y += self.config.v_step;
            }
        }

        placements
    }

    /// Redraw filter: whether a placement falls inside the viewport at the
    /// given scroll offset. A glyph straddling either edge counts as visible.
    pub fn is_visible(&self, placement: &GlyphPlacement, scroll: i32) -> bool {
        placement.y <= scroll + self.config.viewport_height
            && placement.y + self.config.v_step >= scroll
    }
}
