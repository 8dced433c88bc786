use super::*;

pub(crate) fn run() -> Result<(), eframe::Error> {
    let config = LayoutConfig::default();
    let initial = initial_locator(std::env::args().skip(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([
                config.viewport_width as f32,
                config.viewport_height as f32 + CHROME_HEIGHT,
            ]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |_cc| Ok(Box::new(ui::BrowserUiApp::new(config, initial)))),
    )
}

/// The sole positional input is one locator string; everything past it is
/// ignored. An absent argument means the blank sentinel (an empty page).
fn initial_locator(mut args: impl Iterator<Item = String>) -> String {
    args.next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::initial_locator;

    #[test]
    fn first_argument_is_the_locator() {
        let args = vec!["http://example.com/".to_owned(), "ignored".to_owned()];
        assert_eq!(initial_locator(args.into_iter()), "http://example.com/");
    }

    #[test]
    fn missing_argument_means_blank() {
        assert_eq!(initial_locator(Vec::<String>::new().into_iter()), "");
    }
}
