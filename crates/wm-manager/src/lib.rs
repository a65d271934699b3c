// ABOUTME: Window management for splitwm: panes, layout editing and per-frame control.
// ABOUTME: Routes input to panes by geometry and records their drawing into one command buffer.

pub mod edit;
pub mod manager;
pub mod pane;
pub mod panes;
pub mod store;

pub use edit::{EditOp, EditState, EditorAction, ModalButtonSet, PickHandler};
pub use manager::{CursorGlyph, FrameInput, SettingsWindow, WindowManager};
pub use pane::{Pane, PaneContext, SettingField, SettingsUi};
pub use panes::{pane_registry, ConsolePane, EmptyPane, NotesPane, PaneKind, PaneType};
pub use store::{default_layout, LayoutStore, StoreError};
