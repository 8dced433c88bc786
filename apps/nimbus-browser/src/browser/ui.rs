use super::*;

pub(crate) struct BrowserUiApp {
    session: Session,
    address_input: String,
    status_line: String,
}

impl BrowserUiApp {
    pub(crate) fn new(config: LayoutConfig, initial: String) -> Self {
        let mut app = Self {
            session: Session::new(config),
            address_input: initial.clone(),
            status_line: "Ready".to_owned(),
        };
        app.navigate(initial);
        app
    }

    fn navigate(&mut self, raw: String) {
        self.address_input = raw.clone();

        match self.session.load(&raw) {
            Ok(()) => {
                self.status_line = if raw.is_empty() {
                    "Ready".to_owned()
                } else {
                    format!("Loaded {raw}")
                };
            }
            Err(error) => {
                log::warn!("load failed: {error}");
                self.status_line = format!("Load failed: {error}");
            }
        }
    }

    fn handle_scroll_input(&mut self, ctx: &egui::Context) {
        let (down, up, wheel) = ctx.input(|input| {
            (
                input.key_pressed(egui::Key::ArrowDown),
                input.key_pressed(egui::Key::ArrowUp),
                input.raw_scroll_delta.y,
            )
        });

        if down {
            self.session.scroll_down();
        }
        if up {
            self.session.scroll_up();
        }
        if wheel != 0.0 {
            self.session.scroll_wheel(wheel as i32);
        }
    }
}

impl eframe::App for BrowserUiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_scroll_input(ctx);

        let mut requested: Option<String> = None;
        egui::TopBottomPanel::top("address_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.address_input)
                        .hint_text("Enter locator")
                        .desired_width(ui.available_width() - 60.0),
                );
                let submitted = response.lost_focus()
                    && ui.input(|input| input.key_pressed(egui::Key::Enter));

                if ui.button("Go").clicked() || submitted {
                    requested = Some(self.address_input.clone());
                }
            });
            ui.label(&self.status_line);
        });

        if let Some(raw) = requested {
            self.navigate(raw);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let (_response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::hover());
            let clip = painter.clip_rect();
            let mut sink = PainterSink {
                painter: &painter,
                clip,
            };
            self.session.draw(&mut sink);
        });
    }
}

/// Render sink backed by an egui painter for one frame.
struct PainterSink<'a> {
    painter: &'a egui::Painter,
    clip: egui::Rect,
}

impl RenderSink for PainterSink<'_> {
    fn clear(&mut self) {
        self.painter
            .rect_filled(self.clip, egui::CornerRadius::ZERO, egui::Color32::WHITE);
    }

    fn draw_glyph(&mut self, x: i32, y: i32, glyph: char) {
        // Control characters (the newline placements in the display list)
        // have no visible form.
        if glyph.is_control() {
            return;
        }

        self.painter.text(
            egui::pos2(self.clip.min.x + x as f32, self.clip.min.y + y as f32),
            egui::Align2::CENTER_CENTER,
            glyph,
            egui::FontId::monospace(GLYPH_FONT_SIZE),
            egui::Color32::BLACK,
        );
    }
}
