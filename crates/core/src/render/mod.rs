use crossterm::style::{Attribute, Color, ContentStyle};

use crate::{config::Palette, controller::View};

/// Immutable set of text styles handed to [`render`].
#[derive(Debug, Clone, Copy)]
pub struct Styles {
    pub prompt: ContentStyle,
    pub text: ContentStyle,
    pub placeholder: ContentStyle,
    pub cursor: ContentStyle,
    pub blinking_cursor: ContentStyle,
    pub frame: ContentStyle,
    pub help: ContentStyle,
    pub cursor_mode_help: ContentStyle,
}

impl Styles {
    pub fn from_palette(palette: &Palette) -> Self {
        let focused = foreground(palette.focused);
        let blurred = foreground(palette.blurred);

        let mut cursor = focused;
        cursor.attributes.set(Attribute::Reverse);
        let mut blinking_cursor = cursor;
        blinking_cursor.attributes.set(Attribute::SlowBlink);

        Self {
            prompt: focused,
            text: focused,
            placeholder: blurred,
            cursor,
            blinking_cursor,
            frame: ContentStyle::default(),
            help: blurred,
            cursor_mode_help: foreground(palette.cursor_mode_help),
        }
    }

    /// No colours or attributes at all.
    pub fn plain() -> Self {
        let plain = ContentStyle::default();
        Self {
            prompt: plain,
            text: plain,
            placeholder: plain,
            cursor: plain,
            blinking_cursor: plain,
            frame: plain,
            help: plain,
            cursor_mode_help: plain,
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::from_palette(&Palette::default())
    }
}

fn foreground(ansi: u8) -> ContentStyle {
    ContentStyle {
        foreground_color: Some(Color::AnsiValue(ansi)),
        ..ContentStyle::default()
    }
}

/// Lays out one screen from the controller's view. Pure: the same view and
/// styles always give the same text.
pub fn render(view: &View<'_>, styles: &Styles) -> String {
    let mut lines = vec![view.input.view(styles), String::new()];
    lines.push(styles.frame.apply(view.frame).to_string());
    if let Some(chord) = &view.chord {
        lines.push(chord.clone());
    }
    lines.push(String::new());

    let tempo = match view.tempo.bpm() {
        Some(bpm) => format!("tempo: {bpm} bpm"),
        None => "tempo: unset".to_string(),
    };
    lines.push(styles.help.apply(tempo).to_string());

    lines.push(format!(
        "{}{}{}",
        styles.help.apply("cursor mode is "),
        styles.cursor_mode_help.apply(view.input.cursor_mode().label()),
        styles.help.apply(" (ctrl+r to change style)"),
    ));

    lines.join("\n")
}
