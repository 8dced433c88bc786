//! Session coordination: the load pipeline, scroll state, and the render
//! sink contract.

use nb_core::NimbusResult;
use nb_layout::GlyphPlacement;
use nb_layout::LayoutConfig;
use nb_layout::LayoutEngine;
use nb_net::FetchClient;
use nb_net::Locator;
use nb_net::fetch_following_redirect;
use nb_text::extract_text;

/// Vertical distance moved by one scroll command.
pub const SCROLL_STEP: i32 = 100;

/// Paint surface the session draws into. Implemented by the host shell.
pub trait RenderSink {
    fn clear(&mut self);
    fn draw_glyph(&mut self, x: i32, y: i32, glyph: char);
}

/// One browsing session.
///
/// Owns the fetch client, the current display list, and the scroll offset.
/// The display list is regenerated in full on every load; scroll commands
/// only change which slice of it is painted.
pub struct Session {
    client: FetchClient,
    engine: LayoutEngine,
    display_list: Vec<GlyphPlacement>,
    scroll: i32,
}

impl Session {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            client: FetchClient::new(),
            engine: LayoutEngine::new(config),
            display_list: Vec::new(),
            scroll: 0,
        }
    }

    /// Loads a locator end to end: classify, fetch (at most one redirect
    /// hop), extract text, lay out glyphs.
    ///
    /// The display list is emptied up front, so a failed load leaves nothing
    /// on screen rather than partial or stale output.
    pub fn load(&mut self, raw: &str) -> NimbusResult<()> {
        self.display_list.clear();
        self.scroll = 0;

        let locator = Locator::parse(raw)?;
        log::info!("loading `{raw}`");
        let body = fetch_following_redirect(&self.client, &locator)?;
        let text = extract_text(&body);
        self.display_list = self.engine.layout(&text);

        log::debug!("laid out {} glyphs", self.display_list.len());
        Ok(())
    }

    pub fn display_list(&self) -> &[GlyphPlacement] {
        &self.display_list
    }

    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    pub fn config(&self) -> LayoutConfig {
        self.engine.config()
    }

    pub fn scroll_down(&mut self) {
        self.scroll += SCROLL_STEP;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = (self.scroll - SCROLL_STEP).max(0);
    }

    /// Wheel input. Positive delta scrolls toward the top of the document;
    /// the offset is clamped at zero like every other scroll command.
    pub fn scroll_wheel(&mut self, delta: i32) {
        self.scroll = (self.scroll - delta).max(0);
    }

    /// Repaints the visible slice of the display list into `sink`. Never
    /// re-fetches or re-lays-out.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        sink.clear();

        for placement in &self.display_list {
            if !self.engine.is_visible(placement, self.scroll) {
                continue;
            }
            sink.draw_glyph(placement.x, placement.y - self.scroll, placement.glyph);
        }
    }
}
