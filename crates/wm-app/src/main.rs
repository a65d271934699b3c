// ABOUTME: Main application entry point.
// ABOUTME: Sets up the window and event loop, gathers input snapshots and drives the window manager.

use std::sync::Arc;

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use wm_core::{ColorScheme, Config, Event, KeyboardState, MouseState, SubscriberId};
use wm_manager::{
    default_layout, pane_registry, CursorGlyph, FrameInput, LayoutStore, WindowManager,
};
use wm_render::Renderer;

const TITLE: &str = "splitwm";

/// Translate a winit key into the subset panes understand
fn pane_key(key: &Key) -> Option<wm_core::Key> {
    use wm_core::Key as K;
    let Key::Named(named) = key else {
        return None;
    };
    Some(match named {
        NamedKey::Enter => K::Enter,
        NamedKey::Backspace => K::Backspace,
        NamedKey::Delete => K::Delete,
        NamedKey::Escape => K::Escape,
        NamedKey::Tab => K::Tab,
        NamedKey::ArrowUp => K::Up,
        NamedKey::ArrowDown => K::Down,
        NamedKey::ArrowLeft => K::Left,
        NamedKey::ArrowRight => K::Right,
        NamedKey::Home => K::Home,
        NamedKey::End => K::End,
        NamedKey::PageUp => K::PageUp,
        NamedKey::PageDown => K::PageDown,
        NamedKey::F1 => K::F(1),
        NamedKey::F2 => K::F(2),
        NamedKey::F3 => K::F(3),
        NamedKey::F4 => K::F(4),
        NamedKey::F5 => K::F(5),
        NamedKey::F6 => K::F(6),
        NamedKey::F7 => K::F(7),
        NamedKey::F8 => K::F(8),
        NamedKey::F9 => K::F(9),
        NamedKey::F10 => K::F(10),
        NamedKey::F11 => K::F(11),
        NamedKey::F12 => K::F(12),
        _ => return None,
    })
}

fn cursor_icon(glyph: CursorGlyph) -> CursorIcon {
    match glyph {
        CursorGlyph::Arrow => CursorIcon::Default,
        CursorGlyph::ResizeEW => CursorIcon::EwResize,
        CursorGlyph::ResizeNS => CursorIcon::NsResize,
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    config: Config,
    wm: WindowManager,
    store: Option<LayoutStore>,
    subscriber: SubscriberId,

    modifiers: ModifiersState,
    /// Cursor position in display units
    cursor_pos: [f32; 2],
    buttons: [bool; 3],
    wheel: [f32; 2],
    mouse: MouseState,
    keyboard: KeyboardState,
    zoom_requested: bool,
    /// Stands in for the F-key command bar claiming the keyboard
    status_bar_focus: bool,

    title: String,
    cursor: CursorGlyph,
}

impl App {
    fn new() -> Self {
        let config = Config::load_or_default();
        tracing::info!("Loaded config: color scheme {}", config.color_scheme.name);

        let store = match LayoutStore::at_default_path() {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("Layout will not be saved: {}", e);
                None
            }
        };
        let root = match &store {
            Some(store) => store.load_or_default(&pane_registry()),
            None => default_layout(),
        };

        let mut wm = WindowManager::new(root, &config);
        let subscriber = wm.events().subscribe();

        Self {
            window: None,
            renderer: None,
            config,
            wm,
            store,
            subscriber,
            modifiers: ModifiersState::empty(),
            cursor_pos: [0.0, 0.0],
            buttons: [false; 3],
            wheel: [0.0, 0.0],
            mouse: MouseState::default(),
            keyboard: KeyboardState::default(),
            zoom_requested: false,
            status_bar_focus: false,
            title: TITLE.to_string(),
            cursor: CursorGlyph::Arrow,
        }
    }

    fn scale_factor(&self) -> f32 {
        self.window
            .as_ref()
            .map(|w| w.scale_factor() as f32)
            .unwrap_or(1.0)
    }

    fn save_layout(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(self.wm.root()) {
                tracing::error!("Failed to save layout: {}", e);
            }
        }
    }

    fn cycle_color_scheme(&mut self) {
        let presets = ColorScheme::presets();
        let current = presets
            .iter()
            .position(|cs| cs.name == self.config.color_scheme.name)
            .unwrap_or(0);
        let next = presets[(current + 1) % presets.len()].clone();
        self.config.color_scheme = next.clone();
        self.wm.set_color_scheme(next);
        if let Err(e) = self.config.save_to_default() {
            tracing::error!("Failed to save config: {}", e);
        }
    }

    /// Handle app-level shortcuts; returns true if the key was consumed
    fn handle_shortcut(&mut self, key: &Key) -> bool {
        let ctrl = self.modifiers.control_key();
        match key {
            Key::Character(c) if ctrl && c.eq_ignore_ascii_case("f") => {
                self.zoom_requested = true;
                true
            }
            Key::Character(c) if ctrl && c.eq_ignore_ascii_case("e") => {
                self.wm.toggle_editor();
                true
            }
            Key::Character(c) if ctrl && c.eq_ignore_ascii_case("s") => {
                self.save_layout();
                true
            }
            Key::Character(c) if ctrl && c.eq_ignore_ascii_case("t") => {
                self.cycle_color_scheme();
                true
            }
            Key::Named(NamedKey::Escape) if self.wm.edit().is_armed() => {
                self.wm.editor_action(wm_manager::EditorAction::Cancel);
                true
            }
            Key::Named(NamedKey::F1) => {
                self.status_bar_focus = !self.status_bar_focus;
                true
            }
            _ => false,
        }
    }

    fn handle_events(&mut self) {
        for event in self.wm.events().get(self.subscriber) {
            match event {
                Event::LayoutChanged => {
                    if !self.wm.edit().is_open() {
                        self.save_layout();
                    }
                }
                Event::KeyboardFocusChanged(focus) => {
                    tracing::debug!("Keyboard focus now {:?}", focus);
                }
                Event::CommandEntered { pane, text } => {
                    tracing::info!("Command from {}: {}", pane, text);
                }
            }
        }
    }

    fn redraw(&mut self) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        let scale = self
            .window
            .as_ref()
            .map(|w| w.scale_factor() as f32)
            .unwrap_or(1.0);
        let (fb_width, fb_height) = renderer.size();
        let framebuffer_size = [fb_width as f32, fb_height as f32];
        let display_size = [framebuffer_size[0] / scale, framebuffer_size[1] / scale];

        self.mouse = self
            .mouse
            .next_frame(self.cursor_pos, self.buttons, std::mem::take(&mut self.wheel));
        let input = FrameInput {
            framebuffer_size,
            display_size,
            mouse: &self.mouse,
            keyboard: &self.keyboard,
            ui_wants_mouse: false,
            ui_wants_keyboard: false,
            status_bar_has_focus: self.status_bar_focus,
            zoom_toggle: self.zoom_requested,
        };

        renderer.set_clear_color(self.wm.color_scheme().background);
        let commands = self.wm.draw_frame(&input);
        if let Err(e) = renderer.render(commands) {
            tracing::error!("Render error: {}", e);
        }

        self.keyboard.end_frame();
        self.zoom_requested = false;
        self.handle_events();

        if let Some(window) = &self.window {
            let cursor = self.wm.cursor();
            if cursor != self.cursor {
                window.set_cursor(cursor_icon(cursor));
                self.cursor = cursor;
            }

            let help = self.wm.edit().help_text();
            let title = if help.is_empty() {
                TITLE.to_string()
            } else {
                format!("{} - {}", TITLE, help)
            };
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(Arc::clone(&window))) {
            Ok(renderer) => renderer,
            Err(e) => {
                tracing::error!("Failed to create renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        let physical_size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            physical_size.width,
            physical_size.height,
            window.scale_factor()
        );

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                self.save_layout();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                let held = [
                    (wm_core::Key::Shift, self.modifiers.shift_key()),
                    (wm_core::Key::Control, self.modifiers.control_key()),
                    (wm_core::Key::Alt, self.modifiers.alt_key()),
                ];
                for (key, down) in held {
                    if down {
                        self.keyboard.held.insert(key);
                    } else {
                        self.keyboard.held.remove(&key);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale = self.scale_factor();
                self.cursor_pos = [position.x as f32 / scale, position.y as f32 / scale];
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let index = match button {
                    MouseButton::Left => 0,
                    MouseButton::Right => 1,
                    MouseButton::Middle => 2,
                    _ => return,
                };
                self.buttons[index] = state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let [x, y] = match delta {
                    MouseScrollDelta::LineDelta(x, y) => [x, y],
                    MouseScrollDelta::PixelDelta(pos) => [(pos.x / 20.0) as f32, (pos.y / 20.0) as f32],
                };
                self.wheel[0] += x;
                self.wheel[1] += y;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key = pane_key(&event.logical_key);
                if event.state != ElementState::Pressed {
                    if let Some(key) = key {
                        self.keyboard.held.remove(&key);
                    }
                    return;
                }
                if !event.repeat && self.handle_shortcut(&event.logical_key) {
                    return;
                }
                if let Some(key) = key {
                    self.keyboard.pressed.insert(key);
                    self.keyboard.held.insert(key);
                }
                if !self.modifiers.control_key() {
                    if let Some(text) = &event.text {
                        self.keyboard.text.push_str(text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting splitwm");

    let event_loop = EventLoop::new()?;
    let mut app = App::new();

    event_loop.run_app(&mut app)?;

    Ok(())
}
