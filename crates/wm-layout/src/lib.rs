// ABOUTME: Binary split layout for splitwm panes.
// ABOUTME: Tree structure, bounds traversal, hit testing and JSON persistence.

mod bounds;
mod persist;
mod tree;

#[cfg(test)]
mod testing;

pub use bounds::{find_pane_for_mouse, Hit, NodeFilter, PaneBounds};
pub use persist::{LayoutError, NodeRecord, PaneCodec, PaneDecoder, PaneRegistry, SplitLineRecord};
pub use tree::{DisplayNode, Element, ElementMut, SplitAxis, SplitLine, TreePane};
