use eframe::egui;
use nb_browser::RenderSink;
use nb_browser::Session;
use nb_layout::LayoutConfig;

mod startup;
mod ui;

const WINDOW_TITLE: &str = "Nimbus";
const CHROME_HEIGHT: f32 = 56.0;
const GLYPH_FONT_SIZE: f32 = 14.0;

pub(crate) use startup::run;
