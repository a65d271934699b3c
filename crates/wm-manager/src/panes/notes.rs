// ABOUTME: Read-only notes pane with a title and body text.
// ABOUTME: The title and text are edited through its settings window.

use serde::{Deserialize, Serialize};
use wm_core::{ColorScheme, Extent2D, PaneId};
use wm_render::CommandBuffer;

use crate::pane::{Pane, PaneContext, SettingsUi};

const HEADER_HEIGHT: f32 = 20.0;
const LINE_HEIGHT: f32 = 16.0;
const CELL_WIDTH: f32 = 8.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesState {
    pub title: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug)]
pub struct NotesPane {
    id: PaneId,
    title: String,
    text: String,
    /// Scroll offset in lines; fractional wheel deltas accumulate
    scroll: f32,
}

impl NotesPane {
    pub fn new(title: &str, text: &str) -> Self {
        Self {
            id: PaneId::fresh(),
            title: title.to_string(),
            text: text.to_string(),
            scroll: 0.0,
        }
    }

    pub fn from_state(state: NotesState) -> Self {
        Self::new(&state.title, &state.text)
    }

    pub fn state(&self) -> NotesState {
        NotesState {
            title: self.title.clone(),
            text: self.text.clone(),
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn name(&self) -> String {
        self.title.clone()
    }

    pub fn duplicate(&self, mark_as_copy: bool) -> Self {
        let title = if mark_as_copy {
            format!("{} Copy", self.title)
        } else {
            self.title.clone()
        };
        Self::new(&title, &self.text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn first_visible_line(&self) -> usize {
        self.scroll as usize
    }

    fn scroll_by(&mut self, lines: f32) {
        if !lines.is_finite() {
            return;
        }
        let max = self.text.lines().count().saturating_sub(1) as f32;
        self.scroll = (self.scroll - lines).clamp(0.0, max);
    }
}

impl Default for NotesPane {
    fn default() -> Self {
        Self::new("Notes", "")
    }
}

impl Pane for NotesPane {
    fn draw(&mut self, ctx: &mut PaneContext<'_>, cb: &mut CommandBuffer) {
        if let Some(mouse) = &ctx.mouse {
            if mouse.wheel[1] != 0.0 {
                self.scroll_by(mouse.wheel[1]);
            }
        }

        let [w, h] = ctx.size();
        let cs = ctx.color_scheme;
        ctx.set_window_coordinate_matrices(cb);

        cb.fill_rect(Extent2D::new([0.0, 0.0], [w, HEADER_HEIGHT.min(h)]), cs.ui_control);
        let title_width = (self.title.chars().count() as f32 * CELL_WIDTH).min(w - 8.0);
        if title_width > 0.0 {
            cb.fill_rect(
                Extent2D::new([4.0, 5.0], [4.0 + title_width, HEADER_HEIGHT - 5.0]),
                cs.text_highlight,
            );
        }

        let mut y = HEADER_HEIGHT;
        for line in self.text.lines().skip(self.first_visible_line()) {
            if y + LINE_HEIGHT > h {
                break;
            }
            let width = (line.chars().count() as f32 * CELL_WIDTH).min(w - 8.0);
            if width > 0.0 {
                cb.fill_rect(
                    Extent2D::new([4.0, y + 4.0], [4.0 + width, y + LINE_HEIGHT - 4.0]),
                    cs.text.with_alpha(0.35),
                );
            }
            y += LINE_HEIGHT;
        }
    }

    fn activate(&mut self, _cs: &ColorScheme) {
        self.scroll = 0.0;
    }

    fn deactivate(&mut self) {}

    fn can_take_keyboard_focus(&self) -> bool {
        false
    }

    fn has_settings_ui(&self) -> bool {
        true
    }

    fn draw_settings_ui(&mut self, ui: &mut SettingsUi) {
        ui.text_field("Title", &mut self.title);
        if ui.text_field("Text", &mut self.text) {
            self.scroll = 0.0;
        }
    }
}
