// ABOUTME: Rectangle assignment for panes and dividers, plus mouse hit testing.
// ABOUTME: Both walk the tree through a node filter so a single pane can be zoomed.

use wm_core::{Extent2D, PaneId};

use crate::tree::{DisplayNode, ElementMut, SplitAxis, TreePane};

/// Substitution applied to every node before it is laid out or hit tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeFilter {
    #[default]
    Identity,
    /// Show the subtree containing this pane as if its leaf were the root
    Zoom(PaneId),
}

impl NodeFilter {
    pub fn apply<'a, P: TreePane>(&self, node: &'a DisplayNode<P>) -> &'a DisplayNode<P> {
        match *self {
            NodeFilter::Identity => node,
            NodeFilter::Zoom(id) => node.node_for_pane(id).unwrap_or(node),
        }
    }

    /// Pane to descend to when this filter replaces `node`
    fn zoom_target<P: TreePane>(&self, node: &DisplayNode<P>) -> Option<PaneId> {
        match *self {
            NodeFilter::Zoom(id) if !node.is_leaf() && node.contains_pane(id) => Some(id),
            _ => None,
        }
    }
}

/// Rectangles handed to the bounds visitor for one pane or divider
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaneBounds {
    /// Region in framebuffer pixels
    pub framebuffer: Extent2D,
    /// Same region in display (logical) coordinates
    pub display: Extent2D,
    /// Display region of the enclosing internal node
    pub parent_display: Extent2D,
    /// Entire window in display coordinates
    pub full_display: Extent2D,
}

impl PaneBounds {
    /// Bounds for the root of a tree; its parent is itself
    pub fn root(framebuffer: Extent2D, display: Extent2D, full_display: Extent2D) -> Self {
        Self {
            framebuffer,
            display,
            parent_display: display,
            full_display,
        }
    }
}

/// Result of a mouse hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Pane(PaneId),
    Divider(PaneId, SplitAxis),
}

impl Hit {
    pub fn id(&self) -> PaneId {
        match self {
            Hit::Pane(id) | Hit::Divider(id, _) => *id,
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, Hit::Divider(..))
    }
}

impl<P: TreePane> DisplayNode<P> {
    /// Visit every visible pane and divider with its rectangles.
    ///
    /// Framebuffer and display rectangles are split with the same fractions and
    /// gutter width. Dividers are visited between their two subtrees.
    pub fn visit_panes_with_bounds<F>(
        &mut self,
        filter: &NodeFilter,
        bounds: PaneBounds,
        gutter: f32,
        visit: &mut F,
    ) where
        F: FnMut(&PaneBounds, ElementMut<'_, P>),
    {
        if let Some(id) = filter.zoom_target(self) {
            if let Some(node) = self.node_for_pane_mut(id) {
                node.visit_panes_with_bounds(filter, bounds, gutter, visit);
            }
            return;
        }

        match self {
            DisplayNode::Leaf(pane) => visit(&bounds, ElementMut::Pane(pane)),
            DisplayNode::Split { line, children } => {
                let (fb0, fb_gutter, fb1) = line.split_extent(&bounds.framebuffer, gutter);
                let (d0, d_gutter, d1) = line.split_extent(&bounds.display, gutter);
                let child = |framebuffer, display| PaneBounds {
                    framebuffer,
                    display,
                    parent_display: bounds.display,
                    full_display: bounds.full_display,
                };

                let [first, second] = children;
                first.visit_panes_with_bounds(filter, child(fb0, d0), gutter, visit);
                visit(&child(fb_gutter, d_gutter), ElementMut::Divider(line));
                second.visit_panes_with_bounds(filter, child(fb1, d1), gutter, visit);
            }
        }
    }
}

/// Find the pane or divider under `point`, both in display coordinates.
pub fn find_pane_for_mouse<P: TreePane>(
    node: &DisplayNode<P>,
    filter: &NodeFilter,
    extent: Extent2D,
    point: [f32; 2],
    gutter: f32,
) -> Option<Hit> {
    if !extent.inside(point) {
        return None;
    }
    match filter.apply(node) {
        DisplayNode::Leaf(pane) => Some(Hit::Pane(pane.id())),
        DisplayNode::Split { line, children } => {
            let (d0, d_gutter, d1) = line.split_extent(&extent, gutter);
            if d0.inside(point) {
                find_pane_for_mouse(&children[0], filter, d0, point, gutter)
            } else if d_gutter.inside(point) {
                Some(Hit::Divider(line.id(), line.axis))
            } else if d1.inside(point) {
                find_pane_for_mouse(&children[1], filter, d1, point, gutter)
            } else {
                tracing::error!("Mouse not overlapping anything? {:?} in {:?}", point, extent);
                None
            }
        }
    }
}
