// ABOUTME: The window manager: owns the split tree and drives it once per frame.
// ABOUTME: Resolves focus and mouse ownership, dispatches edit picks, and records draw commands.

use std::collections::{BTreeMap, HashMap};

use glam::Mat4;
use wm_core::{
    split_line_width, Color, ColorScheme, Config, Event, EventStream, Extent2D, KeyboardState,
    MouseButton, MouseState, PaneId,
};
use wm_layout::{
    find_pane_for_mouse, DisplayNode, Element, ElementMut, Hit, NodeFilter, PaneBounds, SplitAxis,
    TreePane,
};
use wm_render::{ortho_2d, CommandBuffer};

use crate::edit::{EditOp, EditState, EditorAction};
use crate::pane::{Pane, PaneContext, SettingField, SettingsUi};
use crate::panes::{PaneKind, PaneType};

/// Per-frame input gathered by the host application
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Drawable size in physical pixels
    pub framebuffer_size: [f32; 2],
    /// Window size in display (logical) units
    pub display_size: [f32; 2],
    pub mouse: &'a MouseState,
    pub keyboard: &'a KeyboardState,
    /// Some host UI (menus, dialogs) is using the mouse this frame
    pub ui_wants_mouse: bool,
    pub ui_wants_keyboard: bool,
    /// The command bar claims keyboard input
    pub status_bar_has_focus: bool,
    /// Toggle showing the pane under the mouse as the only pane
    pub zoom_toggle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorGlyph {
    #[default]
    Arrow,
    /// Over a divider between side-by-side panes
    ResizeEW,
    /// Over a divider between stacked panes
    ResizeNS,
}

/// Bookkeeping for one pane's settings window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsWindow {
    pub title: String,
    pub visible: bool,
    /// Fields declared by the pane the last time the window was drawn
    pub fields: Vec<SettingField>,
}

pub struct WindowManager {
    root: DisplayNode<PaneKind>,
    color_scheme: ColorScheme,
    status_bar_height: f32,
    editor_bar_height: f32,
    events: EventStream,

    focus: Option<PaneId>,
    focus_stack: Vec<PaneId>,
    mouse_override: Option<Hit>,
    filter: NodeFilter,
    show_pane_as_root: bool,
    edit: EditState,

    settings: BTreeMap<PaneId, SettingsWindow>,
    setting_edits: HashMap<PaneId, Vec<SettingField>>,

    last_hit: Option<Hit>,
    cursor: CursorGlyph,
    status_bar_has_focus: bool,
    command_buffer: CommandBuffer,
}

impl WindowManager {
    pub fn new(mut root: DisplayNode<PaneKind>, config: &Config) -> Self {
        let cs = config.color_scheme.clone();
        activate_all(&mut root, &cs);
        tracing::info!("Window manager started with {} panes", root.leaf_count());
        Self {
            root,
            color_scheme: cs,
            status_bar_height: config.status_bar_height.max(0.0),
            editor_bar_height: config.editor_bar_height.max(0.0),
            events: EventStream::new(),
            focus: None,
            focus_stack: Vec::new(),
            mouse_override: None,
            filter: NodeFilter::Identity,
            show_pane_as_root: false,
            edit: EditState::default(),
            settings: BTreeMap::new(),
            setting_edits: HashMap::new(),
            last_hit: None,
            cursor: CursorGlyph::Arrow,
            status_bar_has_focus: false,
            command_buffer: CommandBuffer::new(),
        }
    }

    pub fn root(&self) -> &DisplayNode<PaneKind> {
        &self.root
    }

    pub fn events(&mut self) -> &mut EventStream {
        &mut self.events
    }

    pub fn color_scheme(&self) -> &ColorScheme {
        &self.color_scheme
    }

    pub fn set_color_scheme(&mut self, cs: ColorScheme) {
        tracing::info!("Switching color scheme to {}", cs.name);
        self.color_scheme = cs;
        activate_all(&mut self.root, &self.color_scheme);
    }

    pub fn keyboard_focus(&self) -> Option<PaneId> {
        self.focus
    }

    pub fn mouse_owner(&self) -> Option<Hit> {
        self.mouse_override
    }

    pub fn last_hit(&self) -> Option<Hit> {
        self.last_hit
    }

    pub fn cursor(&self) -> CursorGlyph {
        self.cursor
    }

    pub fn node_filter(&self) -> NodeFilter {
        self.filter
    }

    pub fn is_showing_pane_as_root(&self) -> bool {
        self.show_pane_as_root
    }

    pub fn edit(&self) -> &EditState {
        &self.edit
    }

    pub fn pane_is_present(&self, id: PaneId) -> bool {
        self.root.contains_pane(id)
    }

    /// Height of the chrome above the panes in display units
    pub fn chrome_height(&self) -> f32 {
        if self.edit.is_open() {
            self.status_bar_height + self.editor_bar_height
        } else {
            self.status_bar_height
        }
    }

    /// Editor bar rectangle for a window of `display_size`
    pub fn editor_bar(&self, display_size: [f32; 2]) -> Extent2D {
        Extent2D::new(
            [0.0, self.status_bar_height],
            [display_size[0], self.status_bar_height + self.editor_bar_height],
        )
    }

    fn set_focus(&mut self, focus: Option<PaneId>) {
        if self.focus != focus {
            tracing::debug!("Keyboard focus {:?} -> {:?}", self.focus, focus);
            self.focus = focus;
            self.events.post(Event::KeyboardFocusChanged(focus));
        }
    }

    /// Give `id` keyboard focus. A transient take remembers the previous
    /// focus so [`Self::release_keyboard_focus`] can return to it.
    pub fn take_keyboard_focus(&mut self, id: PaneId, transient: bool) {
        if self.focus == Some(id) {
            return;
        }
        if transient {
            if let Some(previous) = self.focus {
                self.focus_stack.push(previous);
            }
        } else {
            self.focus_stack.clear();
        }
        self.set_focus(Some(id));
    }

    pub fn release_keyboard_focus(&mut self) {
        let previous = self.focus_stack.pop();
        self.set_focus(previous);
    }

    /// Drop focus on panes that left the layout, then pick a default if unset
    fn resolve_keyboard_focus(&mut self) {
        let root = &self.root;
        self.focus_stack.retain(|id| root.contains_pane(*id));
        if let Some(id) = self.focus {
            if !self.root.contains_pane(id) {
                self.set_focus(None);
            }
        }
        if self.focus.is_some() {
            return;
        }

        let mut console = None;
        let mut eligible = None;
        self.root.visit_panes(&mut |element| {
            if let Element::Pane(pane) = element {
                if pane.is_console() && console.is_none() {
                    console = Some(pane.id());
                }
                if pane.can_take_keyboard_focus() && eligible.is_none() {
                    eligible = Some(pane.id());
                }
            }
        });
        if let Some(id) = console.or(eligible) {
            self.set_focus(Some(id));
        }
    }

    /// Forget a zoom whose pane no longer exists
    fn resolve_filter(&mut self) {
        if let NodeFilter::Zoom(id) = self.filter {
            if !self.root.contains_pane(id) {
                tracing::debug!("Zoomed pane {} is gone; showing the whole layout", id);
                self.filter = NodeFilter::Identity;
                self.show_pane_as_root = false;
            }
        }
    }

    fn toggle_zoom(&mut self, display: Extent2D, point: [f32; 2], gutter: f32) {
        if self.show_pane_as_root {
            self.show_pane_as_root = false;
            self.filter = NodeFilter::Identity;
            return;
        }
        match find_pane_for_mouse(&self.root, &self.filter, display, point, gutter) {
            Some(Hit::Pane(id)) => {
                tracing::info!("Showing pane {} as root", id);
                self.show_pane_as_root = true;
                self.filter = NodeFilter::Zoom(id);
            }
            _ => tracing::debug!("Zoom requested but the mouse is not over a pane"),
        }
    }

    /// Replace the whole layout. Returns the previous tree, already deactivated.
    pub fn activate_config(&mut self, mut root: DisplayNode<PaneKind>) -> DisplayNode<PaneKind> {
        deactivate_all(&mut self.root);
        self.settings.clear();
        self.setting_edits.clear();
        activate_all(&mut root, &self.color_scheme);

        let old = std::mem::replace(&mut self.root, root);
        self.focus_stack.clear();
        self.set_focus(None);
        self.mouse_override = None;
        self.last_hit = None;
        self.filter = NodeFilter::Identity;
        self.show_pane_as_root = false;
        self.edit = EditState::default();
        tracing::info!("Activated new layout with {} panes", self.root.leaf_count());
        self.events.post(Event::LayoutChanged);
        old
    }

    pub fn open_editor(&mut self) {
        self.edit.open(&self.root);
    }

    pub fn save_editor(&mut self) {
        if self.edit.is_open() {
            tracing::info!("Saving layout edits");
            self.edit.save();
            self.events.post(Event::LayoutChanged);
        }
    }

    pub fn revert_editor(&mut self) {
        if self.edit.revert(&mut self.root, &self.color_scheme) {
            self.after_edit();
        }
    }

    pub fn toggle_editor(&mut self) {
        if self.edit.is_open() {
            self.save_editor();
        } else {
            self.open_editor();
        }
    }

    pub fn editor_action(&mut self, action: EditorAction) {
        tracing::debug!("Editor action {:?}", action);
        match action {
            EditorAction::Create(ty) => self.edit.choose_new_pane(ty),
            EditorAction::Button(op) => self.edit.press_button(op),
            EditorAction::Cancel => self.edit.cancel(),
            EditorAction::Save => self.save_editor(),
            EditorAction::Revert => self.revert_editor(),
        }
    }

    pub fn press_edit_button(&mut self, op: EditOp) {
        self.editor_action(EditorAction::Button(op));
    }

    pub fn choose_new_pane(&mut self, ty: PaneType) {
        self.editor_action(EditorAction::Create(ty));
    }

    fn after_edit(&mut self) {
        self.resolve_filter();
        let root = &self.root;
        self.settings.retain(|id, _| root.contains_pane(*id));
        self.setting_edits.retain(|id, _| root.contains_pane(*id));
        let stale = |hit: Hit| !hit.is_divider() && !root.contains_pane(hit.id());
        if self.mouse_override.is_some_and(stale) {
            self.mouse_override = None;
        }
        self.events.post(Event::LayoutChanged);
    }

    /// Panes that have a settings window, sorted by name
    pub fn settings_menu_entries(&self) -> Vec<(PaneId, String)> {
        let mut entries = Vec::new();
        self.root.visit_panes(&mut |element| {
            if let Element::Pane(pane) = element {
                if pane.has_settings_ui() {
                    entries.push((pane.id(), pane.name()));
                }
            }
        });
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        entries
    }

    pub fn open_pane_settings(&mut self, id: PaneId) -> bool {
        let Some(pane) = self.root.node_for_pane(id).and_then(|node| node.pane()) else {
            tracing::warn!("No pane {} to open settings for", id);
            return false;
        };
        if !pane.has_settings_ui() {
            return false;
        }
        let title = format!("{} settings", pane.name());
        let window = self.settings.entry(id).or_insert_with(|| SettingsWindow {
            title: title.clone(),
            visible: false,
            fields: Vec::new(),
        });
        window.title = title;
        window.visible = true;
        true
    }

    pub fn close_pane_settings(&mut self, id: PaneId) {
        if let Some(window) = self.settings.get_mut(&id) {
            window.visible = false;
        }
    }

    pub fn settings_window(&self, id: PaneId) -> Option<&SettingsWindow> {
        self.settings.get(&id)
    }

    /// Queue a field edit; it is applied the next time the window is drawn
    pub fn submit_setting(&mut self, id: PaneId, label: &str, value: &str) {
        self.setting_edits.entry(id).or_default().push(SettingField {
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    /// Run the settings form of every visible settings window
    pub fn draw_settings_windows(&mut self) {
        let mut changed = false;
        let mut gone = Vec::new();
        for (id, window) in self.settings.iter_mut().filter(|(_, w)| w.visible) {
            let Some(pane) = self.root.node_for_pane_mut(*id).and_then(|node| node.pane_mut()) else {
                gone.push(*id);
                continue;
            };
            let edits = self.setting_edits.remove(id).unwrap_or_default();
            let had_edits = !edits.is_empty();
            let mut ui = SettingsUi::new(edits);
            pane.draw_settings_ui(&mut ui);
            let fields = ui.into_fields();
            if had_edits && fields != window.fields {
                changed = true;
            }
            window.fields = fields;
        }
        for id in gone {
            self.settings.remove(&id);
        }
        if changed {
            self.events.post(Event::LayoutChanged);
        }
    }

    /// Record everything for one frame and return the finished command buffer.
    pub fn draw_frame(&mut self, input: &FrameInput<'_>) -> &CommandBuffer {
        self.command_buffer.reset();
        self.status_bar_has_focus = input.status_bar_has_focus;

        let [fb_w, fb_h] = input.framebuffer_size;
        let [d_w, d_h] = input.display_size;
        if d_w <= 0.0 || d_h <= 0.0 || fb_w <= 0.0 || fb_h <= 0.0 {
            return &self.command_buffer;
        }
        let dpi = fb_h / d_h;
        let gutter = split_line_width(dpi);
        let mouse = input.mouse;

        self.command_buffer.reset_state();
        self.command_buffer.clear(self.color_scheme.background);

        // Chrome clicks happen before anything below can react to them
        if self.edit.is_open() && mouse.is_clicked(MouseButton::Primary) {
            let bar = self.editor_bar(input.display_size);
            let clicked = self
                .edit
                .action_rects(bar, self.root.leaf_count())
                .into_iter()
                .find(|(_, rect)| rect.inside(mouse.pos));
            if let Some((action, _)) = clicked {
                self.editor_action(action);
            }
        }

        let top = self.chrome_height().min(d_h);
        let display_true_full = Extent2D::from_size(d_w, d_h);
        let display_full = Extent2D::new([0.0, top], [d_w, d_h]);
        let framebuffer_full = Extent2D::new([0.0, top * dpi], [fb_w, fb_h]);

        let over_chrome = self.mouse_override.is_none() && !display_full.inside(mouse.pos);
        let ui_wants_mouse = input.ui_wants_mouse || over_chrome;

        self.resolve_filter();
        self.resolve_keyboard_focus();

        if input.zoom_toggle && !input.ui_wants_keyboard {
            self.toggle_zoom(display_full, mouse.pos, gutter);
        }

        let hit = find_pane_for_mouse(&self.root, &self.filter, display_full, mouse.pos, gutter);
        self.last_hit = hit;

        if let Some(Hit::Pane(id)) = hit {
            if self.edit.is_armed() && mouse.is_clicked(MouseButton::Primary) && !ui_wants_mouse {
                if self.edit.handle_pick(&mut self.root, id, &self.color_scheme) {
                    self.after_edit();
                }
                self.resolve_keyboard_focus();
            }
        }

        if ui_wants_mouse || !(mouse.any_dragging() || mouse.any_clicked()) {
            self.mouse_override = None;
        } else if self.mouse_override.is_none() {
            self.mouse_override = hit;
        }

        self.cursor = if ui_wants_mouse && self.mouse_override.is_none() {
            CursorGlyph::Arrow
        } else {
            match self.mouse_override.or(hit) {
                Some(Hit::Divider(_, SplitAxis::Horizontal)) => CursorGlyph::ResizeEW,
                Some(Hit::Divider(..)) => CursorGlyph::ResizeNS,
                _ => CursorGlyph::Arrow,
            }
        };

        self.draw_panes(
            input,
            framebuffer_full,
            display_full,
            display_true_full,
            dpi,
            gutter,
            ui_wants_mouse,
        );
        self.draw_settings_windows();
        self.draw_chrome(display_true_full);

        &self.command_buffer
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_panes(
        &mut self,
        input: &FrameInput<'_>,
        framebuffer_full: Extent2D,
        display_full: Extent2D,
        display_true_full: Extent2D,
        dpi: f32,
        gutter: f32,
        ui_wants_mouse: bool,
    ) {
        let Self {
            root,
            color_scheme,
            events,
            focus,
            mouse_override,
            filter,
            edit,
            command_buffer: cb,
            status_bar_has_focus,
            ..
        } = self;
        let mouse = input.mouse;
        let armed = edit.is_armed();
        let focus = *focus;
        let mouse_override = *mouse_override;
        let status_bar_has_focus = *status_bar_has_focus;
        let cs = &*color_scheme;
        let bounds = PaneBounds::root(framebuffer_full, display_full, display_true_full);

        root.visit_panes_with_bounds(&*filter, bounds, gutter, &mut |b, element| match element {
            ElementMut::Pane(pane) => {
                let id = pane.id();
                let has_focus = focus == Some(id);
                let inside = b.display.inside(mouse.pos);
                let owns_mouse = match mouse_override {
                    Some(hit) => hit.id() == id,
                    None => inside && !ui_wants_mouse,
                };

                cb.scissor(b.framebuffer);
                cb.viewport(b.framebuffer);
                let mut ctx = PaneContext {
                    pane_extent: b.display,
                    parent_pane_extent: b.parent_display,
                    full_display_extent: b.full_display,
                    high_dpi_scale: dpi,
                    keyboard: (has_focus && !status_bar_has_focus).then_some(input.keyboard),
                    mouse: owns_mouse.then(|| mouse.relative_to(b.display.p0)),
                    color_scheme: cs,
                    events: &mut *events,
                };
                pane.draw(&mut ctx, cb);
                cb.reset_state();

                if armed && inside && !ui_wants_mouse {
                    set_display_matrices(cb, &b.full_display);
                    cb.blend(true);
                    cb.fill_rect(b.display, Color::SELECTION);
                    cb.reset_state();
                }
                if has_focus && !status_bar_has_focus {
                    set_display_matrices(cb, &b.full_display);
                    let inset = Extent2D::new(
                        [b.display.p0[0] + 1.0, b.display.p0[1] + 1.0],
                        [b.display.p1[0] - 1.0, b.display.p1[1] - 1.0],
                    );
                    cb.outline_rect(inset, cs.text_highlight, 1.0);
                    cb.reset_state();
                }
            }
            ElementMut::Divider(line) => {
                let owned = matches!(mouse_override, Some(Hit::Divider(id, _)) if id == line.id());
                if owned && mouse.is_dragging(MouseButton::Primary) {
                    line.drag(mouse.drag_delta, &b.parent_display);
                }
                cb.scissor(b.framebuffer);
                cb.clear(cs.ui_control);
                cb.reset_state();
            }
        });
    }

    /// Status bar strip and, while editing, the editor bar with its controls
    fn draw_chrome(&mut self, display: Extent2D) {
        let cs = &self.color_scheme;
        let cb = &mut self.command_buffer;
        set_display_matrices(cb, &display);

        let status = Extent2D::new([0.0, 0.0], [display.width(), self.status_bar_height]);
        if !status.is_empty() {
            cb.fill_rect(status, cs.ui_control_active);
            if self.status_bar_has_focus {
                cb.outline_rect(status, cs.text_highlight, 1.0);
            }
        }

        if self.edit.is_open() {
            let bar = Extent2D::new(
                [0.0, self.status_bar_height],
                [display.width(), self.status_bar_height + self.editor_bar_height],
            );
            cb.fill_rect(bar, cs.background);
            for (action, rect) in self.edit.action_rects(bar, self.root.leaf_count()) {
                let fill = if self.edit.is_action_selected(action) {
                    cs.text_highlight
                } else {
                    match action {
                        EditorAction::Create(_) => cs.ui_control_active,
                        _ => cs.ui_control,
                    }
                };
                cb.fill_rect(rect, fill);
                cb.outline_rect(rect, cs.text, 1.0);
            }
        }
        cb.reset_state();
    }
}

/// Projection in display units over the whole framebuffer
fn set_display_matrices(cb: &mut CommandBuffer, display: &Extent2D) {
    cb.load_projection(ortho_2d(display.p1[0], display.p1[1]));
    cb.load_model_view(Mat4::IDENTITY);
}

fn activate_all(root: &mut DisplayNode<PaneKind>, cs: &ColorScheme) {
    root.visit_panes_mut(&mut |element| {
        if let ElementMut::Pane(pane) = element {
            pane.activate(cs);
        }
    });
}

fn deactivate_all(root: &mut DisplayNode<PaneKind>) {
    root.visit_panes_mut(&mut |element| {
        if let ElementMut::Pane(pane) = element {
            pane.deactivate();
        }
    });
}
