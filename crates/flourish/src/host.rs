//! Named containers of the terminal screen.

use flourish_field::Host;
use ratatui::layout::{Constraint, Layout, Rect};

/// The whole terminal.
pub const SCREEN: &str = "screen";
/// The terminal above the help line.
pub const HERO: &str = "hero";

/// Rows reserved for the help line.
const HELP_HEIGHT: u16 = 1;

/// Current terminal layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Screen {
    area: Rect,
}

impl Screen {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    /// Follow a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Area above the help line.
    pub fn hero(&self) -> Rect {
        let [hero, _] = self.split();
        hero
    }

    /// The help line at the bottom.
    pub fn help(&self) -> Rect {
        let [_, help] = self.split();
        help
    }

    fn split(&self) -> [Rect; 2] {
        Layout::vertical([Constraint::Fill(1), Constraint::Length(HELP_HEIGHT)]).areas(self.area)
    }
}

impl Host for Screen {
    fn container(&self, name: &str) -> Option<Rect> {
        match name {
            SCREEN => Some(self.area),
            HERO => Some(self.hero()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_containers() {
        let screen = Screen::new(Rect::new(0, 0, 80, 24));
        assert_eq!(screen.container(SCREEN), Some(Rect::new(0, 0, 80, 24)));
        assert_eq!(screen.container(HERO), Some(Rect::new(0, 0, 80, 23)));
        assert_eq!(screen.help(), Rect::new(0, 23, 80, 1));
        assert_eq!(screen.container("footer"), None);
    }

    #[test]
    fn test_resize() {
        let mut screen = Screen::default();
        screen.resize(120, 40);
        assert_eq!(screen.area(), Rect::new(0, 0, 120, 40));
        assert_eq!(screen.hero().height, 39);
    }
}
