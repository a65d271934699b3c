// ABOUTME: The capability set every pane provides to the window manager.
// ABOUTME: Also defines the per-draw context and the settings form panes fill in.

use glam::Mat4;
use wm_core::{ColorScheme, EventStream, Extent2D, KeyboardState, MouseState};
use wm_render::{ortho_2d, CommandBuffer};

/// Everything a pane may look at while drawing one frame.
pub struct PaneContext<'a> {
    /// Pane rectangle in display coordinates
    pub pane_extent: Extent2D,
    pub parent_pane_extent: Extent2D,
    pub full_display_extent: Extent2D,
    /// Framebuffer pixels per display unit
    pub high_dpi_scale: f32,
    /// Present only when the pane has keyboard focus
    pub keyboard: Option<&'a KeyboardState>,
    /// Present only when the pane owns the mouse; position is pane-local
    pub mouse: Option<MouseState>,
    pub color_scheme: &'a ColorScheme,
    pub events: &'a mut EventStream,
}

impl PaneContext<'_> {
    pub fn has_keyboard_focus(&self) -> bool {
        self.keyboard.is_some()
    }

    pub fn size(&self) -> [f32; 2] {
        [self.pane_extent.width(), self.pane_extent.height()]
    }

    /// Pane-local coordinates: origin at the pane's top-left, display units
    pub fn set_window_coordinate_matrices(&self, cb: &mut CommandBuffer) {
        cb.load_projection(ortho_2d(self.pane_extent.width(), self.pane_extent.height()));
        cb.load_model_view(Mat4::IDENTITY);
    }
}

/// One labelled text field shown in a pane's settings window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingField {
    pub label: String,
    pub value: String,
}

/// Immediate-mode settings form.
///
/// Panes declare their fields every time the window is drawn; queued edits
/// for a field are written back into the pane's value as it is declared.
#[derive(Debug, Default)]
pub struct SettingsUi {
    edits: Vec<SettingField>,
    fields: Vec<SettingField>,
}

impl SettingsUi {
    pub fn new(edits: Vec<SettingField>) -> Self {
        Self {
            edits,
            fields: Vec::new(),
        }
    }

    /// Declare a text field; returns true when a queued edit changed `value`
    pub fn text_field(&mut self, label: &str, value: &mut String) -> bool {
        let mut changed = false;
        if let Some(pos) = self.edits.iter().position(|e| e.label == label) {
            let edit = self.edits.remove(pos);
            changed = *value != edit.value;
            *value = edit.value;
        }
        self.fields.push(SettingField {
            label: label.to_string(),
            value: value.clone(),
        });
        changed
    }

    pub fn into_fields(self) -> Vec<SettingField> {
        self.fields
    }
}

/// What the window manager needs from a pane's content.
///
/// Identity, naming and duplication come from [`wm_layout::TreePane`].
pub trait Pane {
    fn draw(&mut self, ctx: &mut PaneContext<'_>, cb: &mut CommandBuffer);

    /// Called when the pane becomes part of the displayed layout
    fn activate(&mut self, cs: &ColorScheme);

    fn deactivate(&mut self);

    fn can_take_keyboard_focus(&self) -> bool;

    /// Console panes are preferred when keyboard focus has to be picked
    fn is_console(&self) -> bool {
        false
    }

    fn has_settings_ui(&self) -> bool {
        false
    }

    fn draw_settings_ui(&mut self, _ui: &mut SettingsUi) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_applies_queued_edit() {
        let mut ui = SettingsUi::new(vec![SettingField {
            label: "Title".to_string(),
            value: "Runway notes".to_string(),
        }]);
        let mut title = "Notes".to_string();
        let mut body = "abc".to_string();

        assert!(ui.text_field("Title", &mut title));
        assert!(!ui.text_field("Body", &mut body));
        assert_eq!(title, "Runway notes");
        assert_eq!(body, "abc");

        let fields = ui.into_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].value, "Runway notes");
    }

    #[test]
    fn edit_is_consumed_once() {
        let mut ui = SettingsUi::new(vec![SettingField {
            label: "Title".to_string(),
            value: "X".to_string(),
        }]);
        let mut title = String::new();
        assert!(ui.text_field("Title", &mut title));
        title.clear();
        assert!(!ui.text_field("Title", &mut title));
        assert!(title.is_empty());
    }
}
