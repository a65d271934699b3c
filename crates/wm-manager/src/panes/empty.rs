// ABOUTME: Pane with no content.
// ABOUTME: Fills new split halves and stands in for panes that could not be restored.

use wm_core::{ColorScheme, PaneId};
use wm_render::CommandBuffer;

use crate::pane::{Pane, PaneContext};

#[derive(Debug)]
pub struct EmptyPane {
    id: PaneId,
}

impl EmptyPane {
    pub fn new() -> Self {
        Self { id: PaneId::fresh() }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn name(&self) -> String {
        "(Empty)".to_string()
    }

    pub fn duplicate(&self, _mark_as_copy: bool) -> Self {
        Self::new()
    }
}

impl Default for EmptyPane {
    fn default() -> Self {
        Self::new()
    }
}

impl Pane for EmptyPane {
    fn draw(&mut self, _ctx: &mut PaneContext<'_>, _cb: &mut CommandBuffer) {}

    fn activate(&mut self, _cs: &ColorScheme) {}

    fn deactivate(&mut self) {}

    fn can_take_keyboard_focus(&self) -> bool {
        false
    }
}
