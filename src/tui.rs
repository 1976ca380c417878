use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::DefaultTerminal;

use crate::fmt::price;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const DISABLED_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const ERROR_STYLE: Style = Style::new().fg(Color::Red);

pub const PRICE_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const BUTTON_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Rgb(25, 118, 210))
    .add_modifier(Modifier::BOLD);

/// One color per point, cycled (charts color by point).
pub const PALETTE: [Color; 10] = [
    Color::Rgb(44, 175, 254),
    Color::Rgb(84, 79, 197),
    Color::Rgb(0, 226, 114),
    Color::Rgb(254, 106, 53),
    Color::Rgb(107, 138, 188),
    Color::Rgb(214, 86, 141),
    Color::Rgb(250, 164, 58),
    Color::Rgb(199, 84, 80),
    Color::Rgb(46, 184, 184),
    Color::Rgb(194, 207, 77),
];

pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

pub fn price_span(amount: f64) -> Span<'static> {
    Span::styled(price(amount), PRICE_STYLE)
}

/// Break `text` into lines no wider than `width`. Always at least one line.
pub fn wrap_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| Line::from(line.into_owned()))
        .collect()
}

/// Enter the alternate screen, restoring the terminal if anything panics
/// while it is active. Pair with [`ratatui::restore`].
pub fn init_terminal() -> DefaultTerminal {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
    ratatui::init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_lines_fits_width() {
        let lines = wrap_lines("No products found in home-decoration", 12);
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| l.width() <= 16));
        assert!(wrap_lines("Loading...", 0).len() > 1);
        assert_eq!(wrap_lines("", 20).len(), 1);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
        assert_ne!(palette_color(0), palette_color(1));
    }
}
