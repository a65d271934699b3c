// ABOUTME: Layout editor state: modal buttons, pending pane picks and the backup tree.
// ABOUTME: Picks rewrite the split tree in place (copy, exchange, split, delete, replace).

use wm_core::{ColorScheme, Extent2D, PaneId};
use wm_layout::{DisplayNode, SplitAxis, TreePane};

use crate::pane::Pane;
use crate::panes::{EmptyPane, PaneKind, PaneType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Copy,
    Exchange,
    SplitHorizontal,
    SplitVertical,
    Delete,
}

impl EditOp {
    pub const ALL: [EditOp; 5] = [
        EditOp::Copy,
        EditOp::Exchange,
        EditOp::SplitHorizontal,
        EditOp::SplitVertical,
        EditOp::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditOp::Copy => "Copy",
            EditOp::Exchange => "Exchange",
            EditOp::SplitHorizontal => "Split Horizontally",
            EditOp::SplitVertical => "Split Vertically",
            EditOp::Delete => "Delete",
        }
    }

    fn arm_help(self) -> &'static str {
        match self {
            EditOp::Copy => "Select window to copy",
            EditOp::Exchange => "Select first window for exchange",
            EditOp::SplitHorizontal | EditOp::SplitVertical => "Select window to split",
            EditOp::Delete => "Select window to delete",
        }
    }

    /// Operations that need two panes are hidden when there is only one
    pub fn is_visible(self, leaf_count: usize) -> bool {
        match self {
            EditOp::SplitHorizontal | EditOp::SplitVertical => true,
            EditOp::Copy | EditOp::Exchange | EditOp::Delete => leaf_count > 1,
        }
    }
}

/// Row of mutually exclusive buttons; at most one is armed.
#[derive(Debug, Clone)]
pub struct ModalButtonSet {
    buttons: Vec<EditOp>,
    active: Option<EditOp>,
}

impl Default for ModalButtonSet {
    fn default() -> Self {
        let mut set = Self {
            buttons: Vec::new(),
            active: None,
        };
        for op in EditOp::ALL {
            set.add(op);
        }
        set
    }
}

impl ModalButtonSet {
    pub fn add(&mut self, op: EditOp) {
        if !self.buttons.contains(&op) {
            self.buttons.push(op);
        }
    }

    /// Deselect the armed button, if any
    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<EditOp> {
        self.active
    }

    pub fn visible(&self, leaf_count: usize) -> impl Iterator<Item = EditOp> + '_ {
        self.buttons
            .iter()
            .copied()
            .filter(move |op| op.is_visible(leaf_count))
    }

    /// Press a button. Returns true if it is now armed, false if it was disarmed.
    fn press(&mut self, op: EditOp) -> bool {
        if self.active == Some(op) {
            self.active = None;
            false
        } else {
            self.active = Some(op);
            true
        }
    }
}

/// What the next pane pick will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickHandler {
    Op(EditOp),
    Replace(PaneType),
}

/// Controls shown in the editor bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Create(PaneType),
    Button(EditOp),
    Cancel,
    Save,
    Revert,
}

#[derive(Debug, Default)]
pub struct EditState {
    open: bool,
    buttons: ModalButtonSet,
    first_pick: Option<PaneId>,
    pending: Option<PickHandler>,
    create_prompt: Option<PaneType>,
    help_text: String,
    backup: Option<DisplayNode<PaneKind>>,
}

impl EditState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    pub fn pending(&self) -> Option<PickHandler> {
        self.pending
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn first_pick(&self) -> Option<PaneId> {
        self.first_pick
    }

    pub fn active_button(&self) -> Option<EditOp> {
        self.buttons.active()
    }

    pub fn create_prompt(&self) -> Option<PaneType> {
        self.create_prompt
    }

    /// Start editing; keeps a copy of the tree for revert
    pub fn open(&mut self, root: &DisplayNode<PaneKind>) {
        if self.open {
            return;
        }
        tracing::info!("Opening layout editor");
        self.open = true;
        self.backup = Some(root.duplicate());
    }

    /// Keep the edits and close the editor
    pub fn save(&mut self) {
        self.cancel();
        self.open = false;
        self.backup = None;
    }

    /// Restore the tree from when the editor was opened and close it.
    ///
    /// Returns true if the tree was replaced.
    pub fn revert(&mut self, root: &mut DisplayNode<PaneKind>, cs: &ColorScheme) -> bool {
        self.cancel();
        self.open = false;
        let Some(backup) = self.backup.take() else {
            return false;
        };
        root.visit_panes_mut(&mut |element| {
            if let wm_layout::ElementMut::Pane(pane) = element {
                pane.deactivate();
            }
        });
        *root = backup;
        root.visit_panes_mut(&mut |element| {
            if let wm_layout::ElementMut::Pane(pane) = element {
                pane.activate(cs);
            }
        });
        tracing::info!("Reverted layout edits");
        true
    }

    /// Press one of the modal buttons
    pub fn press_button(&mut self, op: EditOp) {
        self.create_prompt = None;
        if self.buttons.press(op) {
            self.first_pick = None;
            self.help_text = op.arm_help().to_string();
            self.pending = Some(PickHandler::Op(op));
        } else {
            self.pending = None;
            self.help_text.clear();
        }
    }

    /// Choose a variant from "Create New"; the next pick is replaced with it
    pub fn choose_new_pane(&mut self, ty: PaneType) {
        self.buttons.clear();
        self.first_pick = None;
        self.create_prompt = Some(ty);
        self.help_text = format!("Select location for new {} window", ty.label());
        self.pending = Some(PickHandler::Replace(ty));
    }

    /// Drop any armed handler
    pub fn cancel(&mut self) {
        self.pending = None;
        self.first_pick = None;
        self.create_prompt = None;
        self.help_text.clear();
        self.buttons.clear();
    }

    /// Controls in left-to-right order for a tree with `leaf_count` panes
    pub fn actions(&self, leaf_count: usize) -> Vec<EditorAction> {
        let mut actions: Vec<EditorAction> =
            PaneType::ALL.iter().map(|ty| EditorAction::Create(*ty)).collect();
        actions.extend(self.buttons.visible(leaf_count).map(EditorAction::Button));
        if self.is_armed() {
            actions.push(EditorAction::Cancel);
        }
        actions.push(EditorAction::Save);
        actions.push(EditorAction::Revert);
        actions
    }

    /// Lay the controls out as equal slots across the editor bar
    pub fn action_rects(&self, bar: Extent2D, leaf_count: usize) -> Vec<(EditorAction, Extent2D)> {
        let actions = self.actions(leaf_count);
        if actions.is_empty() || bar.is_empty() {
            return Vec::new();
        }
        let pad = 4.0;
        let slot = bar.width() / actions.len() as f32;
        actions
            .into_iter()
            .enumerate()
            .map(|(i, action)| {
                let x0 = bar.p0[0] + i as f32 * slot;
                let rect = Extent2D::new(
                    [x0 + pad, bar.p0[1] + pad],
                    [(x0 + slot - pad).max(x0 + pad), (bar.p1[1] - pad).max(bar.p0[1] + pad)],
                );
                (action, rect)
            })
            .collect()
    }

    /// Whether an action is currently selected (armed button or chosen variant)
    pub fn is_action_selected(&self, action: EditorAction) -> bool {
        match action {
            EditorAction::Button(op) => self.buttons.active() == Some(op),
            EditorAction::Create(ty) => self.create_prompt == Some(ty),
            _ => false,
        }
    }

    fn finish(&mut self) {
        self.pending = None;
        self.first_pick = None;
        self.create_prompt = None;
        self.help_text.clear();
        self.buttons.clear();
    }

    /// Dispatch a pick of `picked` to the armed handler.
    ///
    /// Returns true if the tree changed.
    pub fn handle_pick(
        &mut self,
        root: &mut DisplayNode<PaneKind>,
        picked: PaneId,
        cs: &ColorScheme,
    ) -> bool {
        let Some(handler) = self.pending else {
            return false;
        };
        if !root.contains_pane(picked) {
            tracing::warn!("Picked pane {} is not in the layout", picked);
            return false;
        }
        tracing::debug!("Before {:?} on {}:\n{}", handler, picked, root.dump());

        let changed = match handler {
            PickHandler::Replace(ty) => {
                let mut pane = ty.create();
                pane.activate(cs);
                let changed = install(root, picked, pane);
                self.finish();
                changed
            }
            PickHandler::Op(EditOp::Copy) => match self.first_pick {
                None => {
                    self.first_pick = Some(picked);
                    self.help_text = "Select destination for copy".to_string();
                    false
                }
                Some(source) => {
                    let copy = root
                        .node_for_pane(source)
                        .and_then(|node| node.pane())
                        .map(|pane| pane.duplicate(true));
                    let changed = match copy {
                        Some(mut copy) => {
                            copy.activate(cs);
                            install(root, picked, copy)
                        }
                        None => {
                            tracing::error!("Copy source {} disappeared", source);
                            false
                        }
                    };
                    self.finish();
                    changed
                }
            },
            PickHandler::Op(EditOp::Exchange) => match self.first_pick {
                None => {
                    self.first_pick = Some(picked);
                    self.help_text = "Select second window for exchange".to_string();
                    false
                }
                Some(first) => {
                    let changed = first != picked && root.swap_panes(first, picked);
                    self.finish();
                    changed
                }
            },
            PickHandler::Op(op @ (EditOp::SplitHorizontal | EditOp::SplitVertical)) => {
                let axis = if op == EditOp::SplitHorizontal {
                    SplitAxis::Horizontal
                } else {
                    SplitAxis::Vertical
                };
                let mut pane = PaneKind::from(EmptyPane::new());
                pane.activate(cs);
                let changed = root.split_pane(picked, axis, pane);
                self.finish();
                changed
            }
            PickHandler::Op(EditOp::Delete) => {
                let changed = match root.remove_pane(picked) {
                    Some(mut removed) => {
                        removed.deactivate();
                        true
                    }
                    None => false,
                };
                self.finish();
                changed
            }
        };

        if changed {
            tracing::debug!("After {:?}:\n{}", handler, root.dump());
        }
        changed
    }
}

/// Put `pane` where `target` is, deactivating whatever was there
fn install(root: &mut DisplayNode<PaneKind>, target: PaneId, pane: PaneKind) -> bool {
    match root.replace_pane(target, pane) {
        Some(mut old) => {
            old.deactivate();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panes::{ConsolePane, NotesPane};
    use wm_layout::Element;

    fn names(root: &DisplayNode<PaneKind>) -> Vec<String> {
        let mut out = Vec::new();
        root.visit_panes(&mut |element| {
            if let Element::Pane(p) = element {
                out.push(p.name());
            }
        });
        out
    }

    /// Notes "A" | Notes "B"
    fn two_panes() -> (DisplayNode<PaneKind>, PaneId, PaneId) {
        let a = PaneKind::from(NotesPane::new("A", ""));
        let b = PaneKind::from(NotesPane::new("B", ""));
        let (ia, ib) = (a.id(), b.id());
        let mut root = DisplayNode::leaf(a);
        root.split_x(0.5, DisplayNode::leaf(b));
        (root, ia, ib)
    }

    #[test]
    fn pressing_button_arms_and_sets_help() {
        let mut edit = EditState::default();
        edit.press_button(EditOp::Copy);
        assert_eq!(edit.pending(), Some(PickHandler::Op(EditOp::Copy)));
        assert_eq!(edit.active_button(), Some(EditOp::Copy));
        assert_eq!(edit.help_text(), "Select window to copy");

        // Pressing the armed button again disarms
        edit.press_button(EditOp::Copy);
        assert_eq!(edit.pending(), None);
        assert_eq!(edit.active_button(), None);
        assert_eq!(edit.help_text(), "");
    }

    #[test]
    fn switching_buttons_clears_first_pick() {
        let (mut root, ia, _) = two_panes();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.press_button(EditOp::Exchange);
        edit.handle_pick(&mut root, ia, &cs);
        assert_eq!(edit.first_pick(), Some(ia));

        edit.press_button(EditOp::Copy);
        assert_eq!(edit.first_pick(), None);
        assert_eq!(edit.active_button(), Some(EditOp::Copy));
    }

    #[test]
    fn pick_without_handler_does_nothing() {
        let (mut root, ia, _) = two_panes();
        let mut edit = EditState::default();
        assert!(!edit.handle_pick(&mut root, ia, &ColorScheme::default()));
        assert_eq!(names(&root), vec!["A", "B"]);
    }

    #[test]
    fn copy_replaces_destination_with_marked_duplicate() {
        let (mut root, ia, ib) = two_panes();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.press_button(EditOp::Copy);

        assert!(!edit.handle_pick(&mut root, ia, &cs));
        assert_eq!(edit.help_text(), "Select destination for copy");
        assert!(edit.handle_pick(&mut root, ib, &cs));

        assert_eq!(names(&root), vec!["A", "A Copy"]);
        assert!(!root.contains_pane(ib));
        assert!(root.contains_pane(ia));
        assert!(!edit.is_armed());
        assert_eq!(edit.active_button(), None);
    }

    #[test]
    fn exchange_swaps_two_panes() {
        let (mut root, ia, ib) = two_panes();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.press_button(EditOp::Exchange);
        assert_eq!(edit.help_text(), "Select first window for exchange");
        edit.handle_pick(&mut root, ia, &cs);
        assert_eq!(edit.help_text(), "Select second window for exchange");
        assert!(edit.handle_pick(&mut root, ib, &cs));
        assert_eq!(root.pane_ids(), vec![ib, ia]);
    }

    #[test]
    fn exchange_same_pane_twice_is_noop_and_disarms() {
        let (mut root, ia, _) = two_panes();
        let before = root.dump();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.press_button(EditOp::Exchange);
        edit.handle_pick(&mut root, ia, &cs);
        assert!(!edit.handle_pick(&mut root, ia, &cs));

        assert_eq!(root.dump(), before);
        assert!(!edit.is_armed());
        assert_eq!(edit.active_button(), None);
        assert_eq!(edit.first_pick(), None);
    }

    #[test]
    fn split_horizontal_then_delete_new_pane() {
        let console = PaneKind::from(ConsolePane::new());
        let ic = console.id();
        let mut root = DisplayNode::leaf(console);
        let cs = ColorScheme::default();
        let mut edit = EditState::default();

        edit.press_button(EditOp::SplitHorizontal);
        assert_eq!(edit.help_text(), "Select window to split");
        assert!(edit.handle_pick(&mut root, ic, &cs));
        assert_eq!(root.axis(), SplitAxis::Horizontal);
        assert_eq!(root.split_line().unwrap().pos, 0.5);
        let [first, second] = root.children().unwrap();
        assert_eq!(first.pane().unwrap().pane_type(), PaneType::Empty);
        assert_eq!(second.pane().unwrap().id(), ic);
        let new_id = first.pane().unwrap().id();

        edit.press_button(EditOp::Delete);
        assert!(edit.handle_pick(&mut root, new_id, &cs));
        assert!(root.is_leaf());
        assert_eq!(root.pane().unwrap().id(), ic);
    }

    #[test]
    fn delete_refused_on_single_pane() {
        let pane = PaneKind::from(ConsolePane::new());
        let id = pane.id();
        let mut root = DisplayNode::leaf(pane);
        let mut edit = EditState::default();
        edit.press_button(EditOp::Delete);
        assert!(!edit.handle_pick(&mut root, id, &ColorScheme::default()));
        assert_eq!(root.pane().unwrap().id(), id);
        assert!(!edit.is_armed());
    }

    #[test]
    fn create_new_replaces_picked_pane() {
        let (mut root, _, ib) = two_panes();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.choose_new_pane(PaneType::Console);
        assert_eq!(edit.create_prompt(), Some(PaneType::Console));
        assert_eq!(
            edit.help_text(),
            "Select location for new Command-line interface window"
        );

        assert!(edit.handle_pick(&mut root, ib, &cs));
        assert_eq!(names(&root), vec!["A", "Console"]);
        assert_eq!(edit.create_prompt(), None);
        assert!(!edit.is_armed());
    }

    #[test]
    fn revert_restores_backup() {
        let (mut root, _, ib) = two_panes();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.open(&root);
        edit.press_button(EditOp::Delete);
        edit.handle_pick(&mut root, ib, &cs);
        assert_eq!(names(&root), vec!["A"]);

        assert!(edit.revert(&mut root, &cs));
        assert_eq!(names(&root), vec!["A", "B"]);
        assert!(!edit.is_open());
    }

    #[test]
    fn save_keeps_edits() {
        let (mut root, _, ib) = two_panes();
        let cs = ColorScheme::default();
        let mut edit = EditState::default();
        edit.open(&root);
        edit.press_button(EditOp::Delete);
        edit.handle_pick(&mut root, ib, &cs);
        edit.save();
        assert!(!edit.is_open());
        assert!(!edit.revert(&mut root, &cs));
        assert_eq!(names(&root), vec!["A"]);
    }

    #[test]
    fn button_visibility_depends_on_leaf_count() {
        let edit = EditState::default();
        let single = edit.actions(1);
        assert!(single.contains(&EditorAction::Button(EditOp::SplitVertical)));
        assert!(!single.contains(&EditorAction::Button(EditOp::Delete)));
        assert!(!single.contains(&EditorAction::Cancel));
        assert!(edit.actions(2).contains(&EditorAction::Button(EditOp::Exchange)));
    }

    #[test]
    fn action_rects_fit_inside_bar() {
        let mut edit = EditState::default();
        edit.press_button(EditOp::SplitVertical);
        let bar = Extent2D::new([0.0, 24.0], [1100.0, 84.0]);
        let rects = edit.action_rects(bar, 3);
        assert_eq!(rects.len(), edit.actions(3).len());
        for (_, r) in &rects {
            assert!(r.p0[0] >= bar.p0[0] && r.p1[0] <= bar.p1[0]);
            assert!(r.p0[1] >= bar.p0[1] && r.p1[1] <= bar.p1[1]);
        }
        assert!(edit.is_action_selected(EditorAction::Button(EditOp::SplitVertical)));
    }
}
