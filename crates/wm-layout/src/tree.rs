// ABOUTME: Binary split tree of panes and divider lines.
// ABOUTME: Supports identity search, splitting, deleting, swapping, duplication and traversal.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use wm_core::{Extent2D, PaneId};

/// What the layout tree needs from the panes it stores.
pub trait TreePane: Sized {
    fn id(&self) -> PaneId;

    fn name(&self) -> String;

    /// Independent copy with a fresh identity. `mark_as_copy` lets the pane
    /// adjust its name so the copy can be told apart from the original.
    fn duplicate(&self, mark_as_copy: bool) -> Self;

    /// Inert pane used to fill a slot that could not be restored
    fn placeholder() -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// Leaf node; no split
    #[default]
    None,
    /// Split along x: children side by side, divider is a vertical strip
    Horizontal,
    /// Split along y: children stacked, divider is a horizontal strip
    Vertical,
}

/// Draggable divider between the two children of an internal node
#[derive(Debug, PartialEq)]
pub struct SplitLine {
    /// Fraction of the parent extent given to the first child
    pub pos: f32,
    pub axis: SplitAxis,
    id: PaneId,
}

impl SplitLine {
    pub const MIN_POS: f32 = 0.01;
    pub const MAX_POS: f32 = 0.99;

    pub fn new(axis: SplitAxis, pos: f32) -> Self {
        Self {
            pos,
            axis,
            id: PaneId::fresh(),
        }
    }

    /// Bring a stored fraction into the draggable range; non-finite values
    /// become the midpoint
    pub fn sanitize_pos(pos: f32) -> f32 {
        if pos.is_finite() {
            pos.clamp(Self::MIN_POS, Self::MAX_POS)
        } else {
            0.5
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        "Split Line"
    }

    /// Same position and axis under a new identity
    pub fn duplicate(&self) -> Self {
        Self::new(self.axis, self.pos)
    }

    /// Split an extent the way this divider partitions its node
    pub fn split_extent(&self, extent: &Extent2D, gutter: f32) -> (Extent2D, Extent2D, Extent2D) {
        match self.axis {
            SplitAxis::Vertical => extent.split_y(self.pos, gutter),
            _ => extent.split_x(self.pos, gutter),
        }
    }

    /// Move the divider by a pointer delta measured in the parent's display space
    pub fn drag(&mut self, delta: [f32; 2], parent: &Extent2D) {
        let moved = match self.axis {
            SplitAxis::Vertical if parent.height() > 0.0 => delta[1] / parent.height(),
            SplitAxis::Vertical => 0.0,
            _ if parent.width() > 0.0 => delta[0] / parent.width(),
            _ => 0.0,
        };
        if moved.is_finite() {
            self.pos = Self::sanitize_pos(self.pos + moved);
        }
    }
}

/// A node is either a leaf holding a pane or a split holding a divider and two children.
#[derive(Debug)]
pub enum DisplayNode<P> {
    Leaf(P),
    Split {
        line: SplitLine,
        children: [Box<DisplayNode<P>>; 2],
    },
}

/// Panes and dividers as seen during traversal
#[derive(Debug)]
pub enum Element<'a, P> {
    Pane(&'a P),
    Divider(&'a SplitLine),
}

#[derive(Debug)]
pub enum ElementMut<'a, P> {
    Pane(&'a mut P),
    Divider(&'a mut SplitLine),
}

impl<P: TreePane> Element<'_, P> {
    pub fn id(&self) -> PaneId {
        match self {
            Element::Pane(p) => p.id(),
            Element::Divider(d) => d.id(),
        }
    }
}

impl<P: TreePane> ElementMut<'_, P> {
    pub fn id(&self) -> PaneId {
        match self {
            ElementMut::Pane(p) => p.id(),
            ElementMut::Divider(d) => d.id(),
        }
    }
}

impl<P: TreePane> DisplayNode<P> {
    pub fn leaf(pane: P) -> Self {
        DisplayNode::Leaf(pane)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DisplayNode::Leaf(_))
    }

    pub fn axis(&self) -> SplitAxis {
        match self {
            DisplayNode::Leaf(_) => SplitAxis::None,
            DisplayNode::Split { line, .. } => line.axis,
        }
    }

    pub fn pane(&self) -> Option<&P> {
        match self {
            DisplayNode::Leaf(pane) => Some(pane),
            DisplayNode::Split { .. } => None,
        }
    }

    pub fn pane_mut(&mut self) -> Option<&mut P> {
        match self {
            DisplayNode::Leaf(pane) => Some(pane),
            DisplayNode::Split { .. } => None,
        }
    }

    pub fn split_line(&self) -> Option<&SplitLine> {
        match self {
            DisplayNode::Leaf(_) => None,
            DisplayNode::Split { line, .. } => Some(line),
        }
    }

    pub fn children(&self) -> Option<[&DisplayNode<P>; 2]> {
        match self {
            DisplayNode::Leaf(_) => None,
            DisplayNode::Split { children, .. } => Some([&children[0], &children[1]]),
        }
    }

    /// Number of panes in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            DisplayNode::Leaf(_) => 1,
            DisplayNode::Split { children, .. } => {
                children[0].leaf_count() + children[1].leaf_count()
            }
        }
    }

    pub fn contains_pane(&self, id: PaneId) -> bool {
        self.node_for_pane(id).is_some()
    }

    /// Pane ids in traversal order
    pub fn pane_ids(&self) -> Vec<PaneId> {
        let mut ids = Vec::new();
        self.visit_panes(&mut |element| {
            if let Element::Pane(pane) = element {
                ids.push(pane.id());
            }
        });
        ids
    }

    /// Deep copy sharing no pane or divider identity with `self`
    pub fn duplicate(&self) -> Self {
        match self {
            DisplayNode::Leaf(pane) => DisplayNode::Leaf(pane.duplicate(false)),
            DisplayNode::Split { line, children } => DisplayNode::Split {
                line: line.duplicate(),
                children: [
                    Box::new(children[0].duplicate()),
                    Box::new(children[1].duplicate()),
                ],
            },
        }
    }

    /// The leaf node holding the pane with this identity
    pub fn node_for_pane(&self, id: PaneId) -> Option<&DisplayNode<P>> {
        match self {
            DisplayNode::Leaf(pane) if pane.id() == id => Some(self),
            DisplayNode::Leaf(_) => None,
            DisplayNode::Split { children, .. } => children[0]
                .node_for_pane(id)
                .or_else(|| children[1].node_for_pane(id)),
        }
    }

    pub fn node_for_pane_mut(&mut self, id: PaneId) -> Option<&mut DisplayNode<P>> {
        if self.pane().is_some_and(|p| p.id() == id) {
            return Some(self);
        }
        match self {
            DisplayNode::Leaf(_) => None,
            DisplayNode::Split { children, .. } => {
                let [first, second] = children;
                if first.contains_pane(id) {
                    first.node_for_pane_mut(id)
                } else {
                    second.node_for_pane_mut(id)
                }
            }
        }
    }

    /// Index of the direct child that is a leaf holding `id`
    fn child_index_for_pane(&self, id: PaneId) -> Option<usize> {
        let DisplayNode::Split { children, .. } = self else {
            return None;
        };
        children
            .iter()
            .position(|child| child.pane().is_some_and(|p| p.id() == id))
    }

    /// The internal node whose child `index` is the leaf holding `id`
    pub fn parent_node_for_pane(&self, id: PaneId) -> Option<(&DisplayNode<P>, usize)> {
        if let Some(index) = self.child_index_for_pane(id) {
            return Some((self, index));
        }
        match self {
            DisplayNode::Leaf(_) => None,
            DisplayNode::Split { children, .. } => children[0]
                .parent_node_for_pane(id)
                .or_else(|| children[1].parent_node_for_pane(id)),
        }
    }

    pub fn parent_node_for_pane_mut(&mut self, id: PaneId) -> Option<(&mut DisplayNode<P>, usize)> {
        if let Some(index) = self.child_index_for_pane(id) {
            return Some((self, index));
        }
        match self {
            DisplayNode::Leaf(_) => None,
            DisplayNode::Split { children, .. } => {
                let [first, second] = children;
                if first.contains_pane(id) {
                    first.parent_node_for_pane_mut(id)
                } else {
                    second.parent_node_for_pane_mut(id)
                }
            }
        }
    }

    /// Turn this leaf into a horizontal split: `[self, new_child]`
    pub fn split_x(&mut self, fraction: f32, new_child: DisplayNode<P>) -> bool {
        self.split(SplitAxis::Horizontal, fraction, new_child)
    }

    /// Turn this leaf into a vertical split: `[self, new_child]`
    pub fn split_y(&mut self, fraction: f32, new_child: DisplayNode<P>) -> bool {
        self.split(SplitAxis::Vertical, fraction, new_child)
    }

    fn split(&mut self, axis: SplitAxis, fraction: f32, new_child: DisplayNode<P>) -> bool {
        if !self.is_leaf() {
            tracing::error!("splitting a non-leaf node:\n{}", self.dump());
            return false;
        }
        let original = std::mem::replace(self, DisplayNode::Leaf(P::placeholder()));
        *self = DisplayNode::Split {
            line: SplitLine::new(axis, fraction),
            children: [Box::new(original), Box::new(new_child)],
        };
        true
    }

    /// In-order walk over panes and dividers: first subtree, divider, second subtree.
    pub fn visit_panes<F>(&self, visit: &mut F)
    where
        F: FnMut(Element<'_, P>),
    {
        match self {
            DisplayNode::Leaf(pane) => visit(Element::Pane(pane)),
            DisplayNode::Split { line, children } => {
                children[0].visit_panes(visit);
                visit(Element::Divider(line));
                children[1].visit_panes(visit);
            }
        }
    }

    pub fn visit_panes_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(ElementMut<'_, P>),
    {
        match self {
            DisplayNode::Leaf(pane) => visit(ElementMut::Pane(pane)),
            DisplayNode::Split { line, children } => {
                let [first, second] = children;
                first.visit_panes_mut(visit);
                visit(ElementMut::Divider(line));
                second.visit_panes_mut(visit);
            }
        }
    }

    /// Replace the pane `id` with `pane`, returning the pane that was there
    pub fn replace_pane(&mut self, id: PaneId, pane: P) -> Option<P> {
        let slot = self.node_for_pane_mut(id)?.pane_mut()?;
        Some(std::mem::replace(slot, pane))
    }

    /// Exchange the positions of two panes. Both must be present.
    pub fn swap_panes(&mut self, a: PaneId, b: PaneId) -> bool {
        if !self.contains_pane(a) || !self.contains_pane(b) {
            return false;
        }
        if a == b {
            return true;
        }
        let hole = P::placeholder();
        let hole_id = hole.id();
        let Some(pane_a) = self.replace_pane(a, hole) else {
            return false;
        };
        let Some(pane_b) = self.replace_pane(b, pane_a) else {
            return false;
        };
        self.replace_pane(hole_id, pane_b).is_some()
    }

    /// Split the leaf holding `id` into `[new_pane, original]` at the midpoint
    pub fn split_pane(&mut self, id: PaneId, axis: SplitAxis, new_pane: P) -> bool {
        if axis == SplitAxis::None {
            tracing::error!("split_pane called without an axis");
            return false;
        }
        let Some(node) = self.node_for_pane_mut(id) else {
            tracing::error!("split_pane: pane {} not in tree", id);
            return false;
        };
        let original = std::mem::replace(node, DisplayNode::Leaf(P::placeholder()));
        *node = DisplayNode::Split {
            line: SplitLine::new(axis, 0.5),
            children: [Box::new(DisplayNode::Leaf(new_pane)), Box::new(original)],
        };
        true
    }

    /// Remove the pane `id`, collapsing its parent onto the sibling subtree.
    ///
    /// Returns the removed pane. The last remaining pane cannot be removed.
    pub fn remove_pane(&mut self, id: PaneId) -> Option<P> {
        let Some((parent, index)) = self.parent_node_for_pane_mut(id) else {
            if self.contains_pane(id) {
                tracing::error!("refusing to delete the only pane {}", id);
            } else {
                tracing::error!("remove_pane: pane {} not in tree", id);
            }
            return None;
        };
        match std::mem::replace(parent, DisplayNode::Leaf(P::placeholder())) {
            DisplayNode::Split {
                children: [first, second],
                ..
            } => {
                let (removed, kept) = if index == 0 {
                    (first, second)
                } else {
                    (second, first)
                };
                *parent = *kept;
                match *removed {
                    DisplayNode::Leaf(pane) => Some(pane),
                    DisplayNode::Split { .. } => None,
                }
            }
            leaf => {
                *parent = leaf;
                None
            }
        }
    }

    /// Indented listing of the tree for logging
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into("", &mut out);
        out
    }

    fn dump_into(&self, indent: &str, out: &mut String) {
        match self {
            DisplayNode::Leaf(pane) => {
                let _ = writeln!(out, "{indent}pane {} ({})", pane.id(), pane.name());
            }
            DisplayNode::Split { line, children } => {
                let _ = writeln!(
                    out,
                    "{indent}split {:?} at {:.3} {}",
                    line.axis,
                    line.pos,
                    line.id()
                );
                let nested = format!("{indent}     ");
                for child in children {
                    child.dump_into(&nested, out);
                }
            }
        }
    }
}
