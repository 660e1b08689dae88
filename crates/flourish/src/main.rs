use std::{
    cell::RefCell,
    io::{Write, stdout},
    rc::Rc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
};
use flourish_config::{Config, LayerKind};
use flourish_field::{FrameClock, FrameHandle, FrameScheduler, MountedField};
use glam::Vec2;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::Paragraph,
};
use tracing::{debug, info, warn};

mod host;
mod logging;

use host::Screen;

/// Accent color of the title and key hints.
const ACCENT: Color = Color::Rgb(102, 126, 234);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    if let Some(path) = logging::init(&config.log_level) {
        info!(log = %path.display(), "flourish starting");
    }

    let terminal = ratatui::init();
    // Without mouse capture the fields still animate, they just ignore the pointer.
    set_pointer_capture(&mut stdout(), true);
    let result = App::new(config).run(terminal);
    set_pointer_capture(&mut stdout(), false);
    ratatui::restore();
    result
}

/// Turn mouse and focus reporting on or off. Failures are logged, not fatal.
fn set_pointer_capture(out: &mut impl Write, enabled: bool) -> bool {
    let result = if enabled {
        execute!(out, EnableMouseCapture, EnableFocusChange)
    } else {
        execute!(out, DisableMouseCapture, DisableFocusChange)
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, enabled, "failed to switch mouse capture");
            false
        }
    }
}

/// One field layer and its frame registration.
#[derive(Debug)]
struct Layer {
    kind: LayerKind,
    /// `None` until the layer has been mounted successfully.
    field: Option<Rc<RefCell<MountedField>>>,
    /// Present while the layer is animating.
    handle: Option<FrameHandle>,
}

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            field: None,
            handle: None,
        }
    }

    /// Whether the layer is mounted and attached to its container.
    fn is_visible(&self) -> bool {
        self.field
            .as_ref()
            .is_some_and(|f| f.borrow().surface().is_attached())
    }
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Are all layers frozen?
    paused: bool,
    config: Config,
    screen: Screen,
    scheduler: FrameScheduler,
    /// Layers from bottom to top.
    layers: Vec<Layer>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        Self {
            running: false,
            paused: false,
            config,
            screen: Screen::default(),
            scheduler: FrameScheduler::new(),
            layers: LayerKind::ALL.into_iter().map(Layer::new).collect(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        self.screen.resize(size.width, size.height);
        self.start_enabled_layers();

        self.running = true;
        let mut clock = FrameClock::from_fps(self.config.frame_rate, Instant::now());
        while self.running {
            let now = Instant::now();
            if clock.is_due(now) {
                clock.mark(now);
                self.scheduler.run_frame();
                terminal.draw(|frame| self.render(frame))?;
            }
            self.handle_crossterm_events(clock.remaining(Instant::now()))?;
        }
        info!(frames = self.scheduler.frames(), "flourish exiting");
        Ok(())
    }

    /// Start every layer enabled in the configuration.
    fn start_enabled_layers(&mut self) {
        for i in 0..self.layers.len() {
            if self.config.layer(self.layers[i].kind).enabled {
                self.start_layer(i);
            }
        }
    }

    /// Mount the layer if needed, attach it and schedule it unless paused.
    fn start_layer(&mut self, index: usize) {
        let kind = self.layers[index].kind;
        if self.layers[index].field.is_none() {
            let settings = self.config.layer(kind);
            let scale = Vec2::from(self.config.cell_scale);
            match MountedField::mount(
                &self.screen,
                &settings.container,
                settings.params(kind),
                scale,
            ) {
                Ok(mut field) => {
                    field.set_opacity(settings.layer_opacity);
                    self.layers[index].field = Some(Rc::new(RefCell::new(field)));
                }
                Err(err) => {
                    warn!(layer = kind.name(), %err, "layer not activated");
                    return;
                }
            }
        }

        let layer = &mut self.layers[index];
        let Some(field) = layer.field.clone() else {
            return;
        };
        field.borrow_mut().attach();
        if !self.paused && layer.handle.is_none() {
            layer.handle = Some(self.scheduler.start(field));
        }
        debug!(layer = kind.name(), paused = self.paused, "layer shown");
    }

    /// Cancel the layer's frames and detach its surface.
    fn stop_layer(&mut self, index: usize) {
        let layer = &mut self.layers[index];
        if let Some(handle) = layer.handle.take() {
            self.scheduler.stop(handle);
        }
        if let Some(field) = &layer.field {
            field.borrow_mut().detach();
        }
        debug!(layer = layer.kind.name(), "layer hidden");
    }

    fn toggle_layer(&mut self, kind: LayerKind) {
        let Some(index) = self.layers.iter().position(|l| l.kind == kind) else {
            return;
        };
        if self.layers[index].is_visible() {
            self.stop_layer(index);
        } else {
            self.start_layer(index);
        }
    }

    /// Freeze or resume every visible layer. Frozen layers keep their last frame.
    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        for layer in self.layers.iter_mut().filter(|l| l.is_visible()) {
            if self.paused {
                if let Some(handle) = layer.handle.take() {
                    self.scheduler.stop(handle);
                }
            } else if let Some(field) = layer.field.clone() {
                layer.handle = Some(self.scheduler.start(field));
            }
        }
        debug!(paused = self.paused, "pause toggled");
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        for layer in &self.layers {
            if let Some(field) = &layer.field {
                frame.render_widget(field.borrow().surface(), area);
            }
        }

        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Top padding
            Constraint::Length(1), // Title
            Constraint::Length(1), // Subtitle
            Constraint::Fill(1),   // Bottom padding
        ])
        .split(self.screen.hero());

        let title = Paragraph::new("f l o u r i s h")
            .style(Style::new().fg(ACCENT).bold())
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[1]);

        if self.paused {
            let paused = Paragraph::new("paused").dark_gray().alignment(Alignment::Center);
            frame.render_widget(paused, chunks[2]);
        }

        frame.render_widget(self.help_line(), self.screen.help());
    }

    fn help_line(&self) -> Line<'static> {
        let state = |kind: LayerKind| {
            let on = self
                .layers
                .iter()
                .any(|l: &Layer| l.kind == kind && l.is_visible());
            if on { " on  " } else { " off  " }
        };
        Line::from(vec![
            "q".bold().fg(ACCENT),
            " quit  ".dark_gray(),
            "p".bold().fg(ACCENT),
            " pause  ".dark_gray(),
            "1".bold().fg(ACCENT),
            " shapes".dark_gray(),
            state(LayerKind::Shapes).dark_gray(),
            "2".bold().fg(ACCENT),
            " particles".dark_gray(),
            state(LayerKind::Particles).dark_gray(),
            "3".bold().fg(ACCENT),
            " ambient".dark_gray(),
            state(LayerKind::Ambient).dark_gray(),
        ])
        .centered()
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most `timeout` for the first event, then drains the queue.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        let mut wait = timeout;
        while event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(width, height) => self.on_resize(width, height),
                Event::FocusLost => self.forget_pointer(),
                _ => {}
            }
            wait = Duration::ZERO;
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('p')) => self.toggle_pause(),
            (_, KeyCode::Char('1')) => self.toggle_layer(LayerKind::Shapes),
            (_, KeyCode::Char('2')) => self.toggle_layer(LayerKind::Particles),
            (_, KeyCode::Char('3')) => self.toggle_layer(LayerKind::Ambient),
            _ => {}
        }
    }

    /// Feed pointer moves to every mounted field.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
            return;
        }
        for field in self.layers.iter().filter_map(|l| l.field.as_ref()) {
            field.borrow().track_pointer(mouse.column, mouse.row);
        }
    }

    fn forget_pointer(&mut self) {
        for field in self.layers.iter().filter_map(|l| l.field.as_ref()) {
            field.borrow().pointer().forget();
        }
    }

    /// Resize every mounted surface to its container. A layer whose
    /// container disappeared is stopped.
    fn on_resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height);
        debug!(width, height, "terminal resized");
        for i in 0..self.layers.len() {
            let Some(field) = self.layers[i].field.clone() else {
                continue;
            };
            let result = field.borrow_mut().relayout(&self.screen);
            if let Err(err) = result {
                warn!(layer = self.layers[i].kind.name(), %err, "layer lost its container");
                self.stop_layer(i);
            }
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::*;

    fn app_with(config: Config) -> App {
        let mut app = App::new(config);
        app.screen = Screen::new(Rect::new(0, 0, 80, 24));
        app.start_enabled_layers();
        app
    }

    fn press(app: &mut App, c: char) {
        app.on_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn test_all_layers_start_by_default() {
        let app = app_with(Config::default());
        assert_eq!(app.scheduler.len(), 3);
        assert!(app.layers.iter().all(Layer::is_visible));
    }

    #[test]
    fn test_toggle_layer_stops_and_restarts() {
        let mut app = app_with(Config::default());
        press(&mut app, '1');
        assert_eq!(app.scheduler.len(), 2);
        let shapes = &app.layers[1];
        assert_eq!(shapes.kind, LayerKind::Shapes);
        assert!(!shapes.is_visible());
        assert!(shapes.handle.is_none());

        press(&mut app, '1');
        assert_eq!(app.scheduler.len(), 3);
        assert!(app.layers[1].is_visible());
    }

    #[test]
    fn test_pause_freezes_without_hiding() {
        let mut app = app_with(Config::default());
        press(&mut app, 'p');
        assert!(app.paused);
        assert!(app.scheduler.is_empty());
        assert!(app.layers.iter().all(Layer::is_visible));

        // Showing a layer while paused does not schedule it.
        press(&mut app, '2');
        press(&mut app, '2');
        assert!(app.scheduler.is_empty());

        press(&mut app, 'p');
        assert_eq!(app.scheduler.len(), 3);
    }

    #[test]
    fn test_missing_container_only_disables_that_layer() {
        let mut config = Config::default();
        config.shapes.container = "sidebar".to_string();
        let app = app_with(config);
        assert_eq!(app.scheduler.len(), 2);
        assert!(app.layers[1].field.is_none());
        assert!(app.layers[0].is_visible() && app.layers[2].is_visible());
    }

    #[test]
    fn test_disabled_layer_starts_on_toggle() {
        let mut config = Config::default();
        config.ambient.enabled = false;
        let mut app = app_with(config);
        assert_eq!(app.scheduler.len(), 2);
        press(&mut app, '3');
        assert_eq!(app.scheduler.len(), 3);
    }

    #[test]
    fn test_resize_follows_containers() {
        let mut app = app_with(Config::default());
        app.on_resize(100, 30);
        let ambient = app.layers[0].field.as_ref().unwrap();
        assert_eq!(ambient.borrow().surface().area(), Rect::new(0, 0, 100, 29));
    }

    #[test]
    fn test_mouse_moves_update_pointers() {
        let mut app = app_with(Config::default());
        app.on_mouse_event(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        });
        let shapes = app.layers[1].field.clone().unwrap();
        assert_eq!(shapes.borrow().pointer().latest(), Some(Vec2::new(84.0, 88.0)));

        app.forget_pointer();
        assert_eq!(shapes.borrow().pointer().latest(), None);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_pointer_capture_failure_is_reported() {
        assert!(!set_pointer_capture(&mut BrokenPipe, true));
        assert!(!set_pointer_capture(&mut BrokenPipe, false));
    }

    #[test]
    fn test_pointer_capture_writes_escape_sequences() {
        let mut out = Vec::new();
        assert!(set_pointer_capture(&mut out, true));
        let enabled = out.len();
        assert!(enabled > 0);
        assert!(set_pointer_capture(&mut out, false));
        assert!(out.len() > enabled);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(Config::default());
        app.running = true;
        press(&mut app, 'q');
        assert!(!app.running);
    }
}
