// ABOUTME: The closed set of pane variants and their registry.
// ABOUTME: PaneKind adapts each variant to the layout tree and the layout file.

mod console;
mod empty;
mod notes;

pub use console::{ConsolePane, ConsoleState};
pub use empty::EmptyPane;
pub use notes::{NotesPane, NotesState};

use wm_core::{ColorScheme, PaneId};
use wm_layout::{PaneCodec, PaneRegistry, TreePane};
use wm_render::CommandBuffer;

use crate::pane::{Pane, PaneContext, SettingsUi};

#[derive(Debug)]
pub enum PaneKind {
    Empty(EmptyPane),
    Console(ConsolePane),
    Notes(NotesPane),
}

/// Variants offered by the layout editor's "Create New" chooser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneType {
    Empty,
    Console,
    Notes,
}

impl PaneType {
    pub const ALL: [PaneType; 3] = [PaneType::Console, PaneType::Empty, PaneType::Notes];

    pub fn label(self) -> &'static str {
        match self {
            PaneType::Empty => "Empty",
            PaneType::Console => "Command-line interface",
            PaneType::Notes => "Notes viewer",
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            PaneType::Empty => "EmptyPane",
            PaneType::Console => "ConsolePane",
            PaneType::Notes => "NotesPane",
        }
    }

    pub fn create(self) -> PaneKind {
        match self {
            PaneType::Empty => PaneKind::Empty(EmptyPane::new()),
            PaneType::Console => PaneKind::Console(ConsolePane::new()),
            PaneType::Notes => PaneKind::Notes(NotesPane::default()),
        }
    }
}

impl PaneKind {
    pub fn pane_type(&self) -> PaneType {
        match self {
            PaneKind::Empty(_) => PaneType::Empty,
            PaneKind::Console(_) => PaneType::Console,
            PaneKind::Notes(_) => PaneType::Notes,
        }
    }

    fn content(&self) -> &dyn Pane {
        match self {
            PaneKind::Empty(p) => p,
            PaneKind::Console(p) => p,
            PaneKind::Notes(p) => p,
        }
    }

    fn content_mut(&mut self) -> &mut dyn Pane {
        match self {
            PaneKind::Empty(p) => p,
            PaneKind::Console(p) => p,
            PaneKind::Notes(p) => p,
        }
    }
}

impl From<EmptyPane> for PaneKind {
    fn from(pane: EmptyPane) -> Self {
        PaneKind::Empty(pane)
    }
}

impl From<ConsolePane> for PaneKind {
    fn from(pane: ConsolePane) -> Self {
        PaneKind::Console(pane)
    }
}

impl From<NotesPane> for PaneKind {
    fn from(pane: NotesPane) -> Self {
        PaneKind::Notes(pane)
    }
}

impl TreePane for PaneKind {
    fn id(&self) -> PaneId {
        match self {
            PaneKind::Empty(p) => p.id(),
            PaneKind::Console(p) => p.id(),
            PaneKind::Notes(p) => p.id(),
        }
    }

    fn name(&self) -> String {
        match self {
            PaneKind::Empty(p) => p.name(),
            PaneKind::Console(p) => p.name(),
            PaneKind::Notes(p) => p.name(),
        }
    }

    fn duplicate(&self, mark_as_copy: bool) -> Self {
        match self {
            PaneKind::Empty(p) => PaneKind::Empty(p.duplicate(mark_as_copy)),
            PaneKind::Console(p) => PaneKind::Console(p.duplicate(mark_as_copy)),
            PaneKind::Notes(p) => PaneKind::Notes(p.duplicate(mark_as_copy)),
        }
    }

    fn placeholder() -> Self {
        PaneKind::Empty(EmptyPane::new())
    }
}

impl Pane for PaneKind {
    fn draw(&mut self, ctx: &mut PaneContext<'_>, cb: &mut CommandBuffer) {
        self.content_mut().draw(ctx, cb)
    }

    fn activate(&mut self, cs: &ColorScheme) {
        self.content_mut().activate(cs)
    }

    fn deactivate(&mut self) {
        self.content_mut().deactivate()
    }

    fn can_take_keyboard_focus(&self) -> bool {
        self.content().can_take_keyboard_focus()
    }

    fn is_console(&self) -> bool {
        self.content().is_console()
    }

    fn has_settings_ui(&self) -> bool {
        self.content().has_settings_ui()
    }

    fn draw_settings_ui(&mut self, ui: &mut SettingsUi) {
        self.content_mut().draw_settings_ui(ui)
    }
}

impl PaneCodec for PaneKind {
    fn type_name(&self) -> &'static str {
        self.pane_type().type_name()
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            PaneKind::Empty(_) => Ok(serde_json::json!({})),
            PaneKind::Console(p) => serde_json::to_value(p.state()),
            PaneKind::Notes(p) => serde_json::to_value(p.state()),
        }
    }
}

/// Registry that can decode every pane variant in a layout file
pub fn pane_registry() -> PaneRegistry<PaneKind> {
    let mut registry = PaneRegistry::new();
    registry
        .register(PaneType::Empty.type_name(), |_| Ok(EmptyPane::new().into()))
        .register(PaneType::Console.type_name(), |value| {
            let state: ConsoleState = serde_json::from_value(value)?;
            Ok(ConsolePane::from_state(state).into())
        })
        .register(PaneType::Notes.type_name(), |value| {
            let state: NotesState = serde_json::from_value(value)?;
            Ok(NotesPane::from_state(state).into())
        });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_layout::DisplayNode;

    #[test]
    fn registry_knows_every_type() {
        let registry = pane_registry();
        for ty in PaneType::ALL {
            assert!(registry.contains(ty.type_name()), "{}", ty.type_name());
            assert_eq!(ty.create().pane_type(), ty);
        }
    }

    #[test]
    fn layout_roundtrip_keeps_variants() {
        let mut root = DisplayNode::leaf(PaneKind::from(NotesPane::new("Plan", "line 1\nline 2")));
        root.split_y(0.7, DisplayNode::leaf(PaneKind::from(ConsolePane::new())));
        let json = root.to_json().unwrap();

        let loaded = DisplayNode::from_json(&json, &pane_registry()).unwrap();
        let [top, bottom] = loaded.children().unwrap();
        match top.pane() {
            Some(PaneKind::Notes(notes)) => {
                assert_eq!(notes.name(), "Plan");
                assert_eq!(notes.text(), "line 1\nline 2");
            }
            other => panic!("expected notes pane, got {other:?}"),
        }
        assert!(matches!(bottom.pane(), Some(PaneKind::Console(_))));
    }

    #[test]
    fn focus_capabilities() {
        assert!(PaneType::Console.create().can_take_keyboard_focus());
        assert!(PaneType::Console.create().is_console());
        assert!(!PaneType::Notes.create().can_take_keyboard_focus());
        assert!(!PaneType::Empty.create().can_take_keyboard_focus());
        assert!(PaneType::Notes.create().has_settings_ui());
    }

    #[test]
    fn placeholder_is_empty() {
        assert_eq!(PaneKind::placeholder().pane_type(), PaneType::Empty);
    }
}
