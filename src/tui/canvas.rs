use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

use crate::graph::demo::demo_store;
use crate::graph::model::{Device, ProfilePatch};
use crate::graph::store::EntityStore;
use crate::parser::config::{self, Config};
use crate::parser::inventory::{JsonFile, Persistence};
use crate::topology::controller::InteractionState;
use crate::topology::scene::Scene;
use crate::topology::session::{MapCommands, MapSession};
use crate::topology::viewport::CanvasSize;
use crate::tui::input::{self, Action, Direction};
use crate::tui::render::{self, DeviceDetails, MapRenderData};
use crate::tui::settings::{self, SettingsEvent, SettingsPanelState};
use crate::workspace;

#[derive(Debug)]
struct AppState {
    session: MapSession,
    persistence: Option<JsonFile>,
    demo: bool,
    show_help: bool,
    show_settings: bool,
    settings_state: SettingsPanelState,
    pointer_inside: bool,
    canvas_area: Rect,
    status_message: Option<String>,
}

impl AppState {
    fn load(demo: bool) -> Result<Self> {
        if demo {
            let mut app = Self::new(demo_store()?, None, &Config::default());
            app.demo = true;
            app.status_message = Some("demo mode: changes are in-memory only".to_string());
            return Ok(app);
        }
        let root = workspace::find_root()?;
        Self::open(&root)
    }

    fn open(root: &Path) -> Result<Self> {
        let config = config::load(&workspace::config_path(root))?;
        let persistence = JsonFile::new(workspace::inventory_path(root));
        let store = persistence.load()?;
        Ok(Self::new(store, Some(persistence), &config))
    }

    fn new(store: EntityStore, persistence: Option<JsonFile>, config: &Config) -> Self {
        Self {
            // Resized to the real canvas on the first draw.
            session: MapSession::open(store, CanvasSize::new(80.0, 24.0), config.zoom_step),
            persistence,
            demo: false,
            show_help: false,
            show_settings: false,
            settings_state: SettingsPanelState::default(),
            pointer_inside: false,
            canvas_area: Rect::default(),
            status_message: None,
        }
    }

    fn set_canvas_area(&mut self, area: Rect) {
        self.canvas_area = area;
        self.session.set_canvas(CanvasSize::new(
            f64::from(area.width),
            f64::from(area.height),
        ));
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.set_canvas_area(render::map_areas(frame.area()).canvas);

        let scene = self.session.scene();
        let store = self.session.store();
        let details = self
            .session
            .selected_device()
            .map(|device| self.details_for(device, &scene));
        render::draw(
            frame,
            &MapRenderData {
                scene: &scene,
                profiles: store.profiles(),
                profile_sizes: store
                    .profiles()
                    .iter()
                    .map(|p| self.session.devices_in_profile(&p.id).len())
                    .collect(),
                active_profile: store.active_profile(),
                zoom: self.session.controller().viewport().zoom(),
                hidden_types: self.session.controller().hidden_types(),
                details,
                mode: mode_badge(self.session.controller().state()),
                status_message: self.status_message.as_deref(),
                show_help: self.show_help,
                demo: self.demo,
            },
        );

        if self.show_settings {
            let profile = store.active_profile();
            settings::draw(frame, &self.settings_state, &profile.name, &profile.config);
        }
    }

    fn details_for<'a>(&'a self, device: &'a Device, scene: &Scene) -> DeviceDetails<'a> {
        let store = self.session.store();
        let profile_names = self
            .session
            .profiles_of_device(&device.id)
            .into_iter()
            .filter_map(|id| store.profile(id))
            .map(|profile| profile.name.as_str())
            .collect();
        let links = store
            .devices()
            .iter()
            .filter(|other| other.id != device.id && device.is_linked_to(other))
            .collect();
        DeviceDetails {
            device,
            position: scene.node(&device.id).map(|node| node.anchor),
            profile_names,
            links,
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.show_settings {
            self.handle_settings_key(key)?;
            return Ok(false);
        }
        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return Ok(false);
        }

        self.status_message = None;
        match input::action_for_key(key) {
            Action::Pan(direction) => {
                let (dx, dy) = match direction {
                    Direction::Up => (0.0, -1.0),
                    Direction::Down => (0.0, 1.0),
                    Direction::Left => (-1.0, 0.0),
                    Direction::Right => (1.0, 0.0),
                };
                self.session.pan_by(dx, dy);
            }
            Action::ZoomIn => self.session.zoom_in(),
            Action::ZoomOut => self.session.zoom_out(),
            Action::Reset => self.session.reset(),
            Action::NextProfile => self.switch_profile(1)?,
            Action::PrevProfile => self.switch_profile(-1)?,
            Action::ToggleType(device_type) => {
                self.session.toggle_device_type(device_type);
                let state = if self
                    .session
                    .controller()
                    .hidden_types()
                    .contains(&device_type)
                {
                    "hidden"
                } else {
                    "shown"
                };
                self.status_message = Some(format!("{} devices {state}", device_type.label()));
            }
            Action::NextDevice => self.session.cycle_selection(1),
            Action::PrevDevice => self.session.cycle_selection(-1),
            Action::ClearSelection => self.session.clear_selection(),
            Action::OpenSettings => {
                self.show_settings = true;
                self.settings_state = SettingsPanelState::default();
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Quit => return Ok(true),
            Action::Noop => {}
        }
        Ok(false)
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<()> {
        let profile = self.session.store().active_profile();
        let profile_id = profile.id.clone();
        let mut profile_config = profile.config;
        match settings::handle_key(key, &mut self.settings_state, &mut profile_config) {
            SettingsEvent::Changed => {
                self.session.store_mut().update_profile(
                    &profile_id,
                    ProfilePatch {
                        config: Some(profile_config),
                        ..ProfilePatch::default()
                    },
                )?;
            }
            SettingsEvent::Close => self.show_settings = false,
            SettingsEvent::None => {}
        }
        Ok(())
    }

    fn switch_profile(&mut self, delta: isize) -> Result<()> {
        self.session.cycle_profile(delta)?;
        let name = &self.session.store().active_profile().name;
        debug!(profile = %name, "switched profile");
        self.status_message = Some(format!("profile: {name}"));
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.show_settings || self.show_help {
            return;
        }
        if let Some(pointer) =
            input::pointer_for_mouse(mouse, self.canvas_area, &mut self.pointer_inside)
        {
            self.session.pointer(pointer);
        }
    }

    fn persist(&self) -> Result<()> {
        if self.demo {
            return Ok(());
        }
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        persistence.save(self.session.store())?;
        info!(path = %persistence.path().display(), "map saved");
        Ok(())
    }
}

pub fn run(demo: bool) -> Result<()> {
    let mut app = AppState::load(demo)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key)? {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }

    app.persist()
}

fn mode_badge(state: &InteractionState) -> Option<&'static str> {
    match state {
        InteractionState::DraggingDevice { moved: true, .. } => Some("MOVE"),
        InteractionState::PanningCanvas { moved: true, .. } => Some("PAN"),
        _ => None,
    }
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{DEFAULT_PROFILE_ID, DeviceType};
    use crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn demo_app() -> AppState {
        let mut app = AppState::load(true).unwrap();
        app.set_canvas_area(Rect::new(0, 0, 100, 100));
        app
    }

    #[test]
    fn mouse_drag_moves_device_on_active_profile() {
        let mut app = demo_app();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 25, 30));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 45, 50));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 60, 70));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 60, 70));

        let wap = app.session.store().device("wap-1").unwrap();
        let moved = wap.positions[DEFAULT_PROFILE_ID];
        assert!((moved.x - 60.0).abs() < 1e-9, "x = {}", moved.x);
        assert!((moved.y - 70.0).abs() < 1e-9, "y = {}", moved.y);
        assert_eq!(wap.positions["floor-1"].x, 35.0);
    }

    #[test]
    fn drag_shows_move_badge_until_release() {
        let mut app = demo_app();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 25, 30));
        assert_eq!(mode_badge(app.session.controller().state()), None);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 30));
        assert_eq!(mode_badge(app.session.controller().state()), Some("MOVE"));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 30));
        assert_eq!(mode_badge(app.session.controller().state()), None);
    }

    #[test]
    fn bracket_keys_cycle_selection() {
        let mut app = demo_app();
        app.handle_key(press(KeyCode::Char(']'))).unwrap();
        app.handle_key(press(KeyCode::Char(']'))).unwrap();
        assert_eq!(app.session.selected_device().map(|d| d.id.as_str()), Some("server-1"));
        app.handle_key(press(KeyCode::Esc)).unwrap();
        assert!(app.session.selected_device().is_none());
    }

    #[test]
    fn settings_panel_edits_active_profile_config() {
        let mut app = demo_app();
        app.handle_key(press(KeyCode::Char('s'))).unwrap();
        assert!(app.show_settings);
        for code in [KeyCode::Down, KeyCode::Down, KeyCode::Enter, KeyCode::Esc] {
            app.handle_key(press(code)).unwrap();
        }
        assert!(!app.show_settings);
        assert!(!app.session.store().active_profile().config.show_labels);
        assert!(!app.session.scene().show_labels);
    }

    #[test]
    fn tab_cycles_profiles_and_reports_name() {
        let mut app = demo_app();
        app.handle_key(press(KeyCode::Tab)).unwrap();
        assert_eq!(app.session.store().active_profile_id(), "floor-1");
        assert_eq!(app.status_message.as_deref(), Some("profile: Floor 1"));
        app.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))
            .unwrap();
        assert_eq!(app.session.store().active_profile_id(), DEFAULT_PROFILE_ID);
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut app = demo_app();
        app.handle_key(press(KeyCode::Char('?'))).unwrap();
        assert!(app.show_help);
        assert!(!app.handle_key(press(KeyCode::Char('1'))).unwrap());
        assert!(app.session.controller().hidden_types().is_empty());
        assert!(!app.handle_key(press(KeyCode::Char('q'))).unwrap());
        assert!(!app.show_help);
        assert!(app.handle_key(press(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn type_toggle_hides_devices_and_says_so() {
        let mut app = demo_app();
        app.handle_key(press(KeyCode::Char('1'))).unwrap();
        assert!(app.session.controller().hidden_types().contains(&DeviceType::Wap));
        assert_eq!(app.status_message.as_deref(), Some("WAP devices hidden"));
        assert!(app.session.scene().node("wap-1").is_none());
    }

    #[test]
    fn details_list_profile_names_and_links() {
        let mut app = demo_app();
        app.session.pointer(crate::topology::controller::PointerEvent::Down(
            crate::topology::viewport::Point::new(25.0, 30.0),
        ));
        app.session.pointer(crate::topology::controller::PointerEvent::Up(
            crate::topology::viewport::Point::new(25.0, 30.0),
        ));
        let scene = app.session.scene();
        let device = app.session.selected_device().unwrap();
        let details = app.details_for(device, &scene);
        assert_eq!(details.position.map(|p| (p.x, p.y)), Some((25.0, 30.0)));
        assert_eq!(details.profile_names, vec!["Default View", "Floor 1"]);
        let links: Vec<&str> = details.links.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(links, vec!["server-1", "laptop-1"]);
    }

    #[test]
    fn quitting_saves_moved_positions() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(workspace::netmap_dir(dir.path())).unwrap();
        let file = JsonFile::new(workspace::inventory_path(dir.path()));
        file.save(&demo_store().unwrap()).unwrap();

        let mut app = AppState::open(dir.path()).unwrap();
        app.session
            .store_mut()
            .set_device_position("laptop-1", DEFAULT_PROFILE_ID, 10.0, 90.0)
            .unwrap();
        app.persist().unwrap();

        let reloaded = file.load().unwrap();
        assert_eq!(
            reloaded.device("laptop-1").unwrap().positions[DEFAULT_PROFILE_ID].y,
            90.0
        );
    }

    #[test]
    fn demo_mode_never_writes() {
        let app = demo_app();
        assert!(app.persistence.is_none());
        app.persist().unwrap();
    }
}
