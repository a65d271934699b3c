// ABOUTME: Command-line style pane with an input line and a bounded history.
// ABOUTME: Submitted lines are posted to the event stream.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use wm_core::{ColorScheme, Event, EventStream, Extent2D, Key, KeyboardState, PaneId};
use wm_render::CommandBuffer;

use crate::pane::{Pane, PaneContext};

/// Display units per character cell
const CELL_WIDTH: f32 = 8.0;
const LINE_HEIGHT: f32 = 16.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleState {
    #[serde(default)]
    pub history: Vec<String>,
}

#[derive(Debug)]
pub struct ConsolePane {
    id: PaneId,
    input: String,
    history: VecDeque<String>,
    active: bool,
}

impl ConsolePane {
    pub const MAX_HISTORY: usize = 100;

    pub fn new() -> Self {
        Self {
            id: PaneId::fresh(),
            input: String::new(),
            history: VecDeque::new(),
            active: false,
        }
    }

    pub fn from_state(state: ConsoleState) -> Self {
        let mut pane = Self::new();
        for line in state.history {
            pane.push_history(line);
        }
        pane
    }

    pub fn state(&self) -> ConsoleState {
        ConsoleState {
            history: self.history.iter().cloned().collect(),
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn name(&self) -> String {
        "Console".to_string()
    }

    pub fn duplicate(&self, _mark_as_copy: bool) -> Self {
        Self::from_state(self.state())
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn push_history(&mut self, line: String) {
        if self.history.len() == Self::MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(line);
    }

    fn submit(&mut self, events: &mut EventStream) {
        let line = std::mem::take(&mut self.input);
        if line.trim().is_empty() {
            return;
        }
        tracing::debug!("Console {} submitted {:?}", self.id, line);
        events.post(Event::CommandEntered {
            pane: self.id,
            text: line.clone(),
        });
        self.push_history(line);
    }

    fn process_keys(&mut self, keyboard: &KeyboardState, events: &mut EventStream) {
        self.input
            .extend(keyboard.text.chars().filter(|c| !c.is_control()));
        if keyboard.is_pressed(Key::Backspace) {
            self.input.pop();
        }
        if keyboard.is_pressed(Key::Escape) {
            self.input.clear();
        }
        if keyboard.is_pressed(Key::Enter) {
            self.submit(events);
        }
    }
}

impl Default for ConsolePane {
    fn default() -> Self {
        Self::new()
    }
}

impl Pane for ConsolePane {
    fn draw(&mut self, ctx: &mut PaneContext<'_>, cb: &mut CommandBuffer) {
        if let Some(keyboard) = ctx.keyboard {
            self.process_keys(keyboard, ctx.events);
        }

        let [w, h] = ctx.size();
        let cs = ctx.color_scheme;
        ctx.set_window_coordinate_matrices(cb);

        let input_top = (h - LINE_HEIGHT).max(0.0);
        cb.fill_rect(Extent2D::new([0.0, input_top], [w, h]), cs.ui_control_active);

        // History grows upward from the input line; each line is a bar as wide as its text
        let mut y = input_top;
        for line in self.history.iter().rev() {
            if y < LINE_HEIGHT {
                break;
            }
            y -= LINE_HEIGHT;
            let width = (line.chars().count() as f32 * CELL_WIDTH).min(w);
            cb.fill_rect(
                Extent2D::new([4.0, y + 4.0], [4.0 + width, y + LINE_HEIGHT - 4.0]),
                cs.text.with_alpha(0.35),
            );
        }

        let typed = (self.input.chars().count() as f32 * CELL_WIDTH).min(w);
        if typed > 0.0 {
            cb.fill_rect(
                Extent2D::new([4.0, input_top + 4.0], [4.0 + typed, h - 4.0]),
                cs.text.with_alpha(0.6),
            );
        }
        if ctx.has_keyboard_focus() {
            let x = (4.0 + typed).min(w - CELL_WIDTH);
            cb.fill_rect(
                Extent2D::new([x, input_top + 2.0], [x + CELL_WIDTH, h - 2.0]),
                cs.text,
            );
        }
    }

    fn activate(&mut self, _cs: &ColorScheme) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn can_take_keyboard_focus(&self) -> bool {
        true
    }

    fn is_console(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str, pressed: &[Key]) -> KeyboardState {
        let mut kb = KeyboardState::default();
        kb.text.push_str(text);
        kb.pressed.extend(pressed.iter().copied());
        kb
    }

    #[test]
    fn enter_submits_line_and_posts_event() {
        let mut events = EventStream::new();
        let sub = events.subscribe();
        let mut console = ConsolePane::new();

        console.process_keys(&typed("ls -l", &[]), &mut events);
        assert_eq!(console.input(), "ls -l");
        console.process_keys(&typed("", &[Key::Enter]), &mut events);

        assert_eq!(console.input(), "");
        assert_eq!(console.history().collect::<Vec<_>>(), vec!["ls -l"]);
        assert_eq!(
            events.get(sub),
            vec![Event::CommandEntered {
                pane: console.id(),
                text: "ls -l".to_string()
            }]
        );
    }

    #[test]
    fn blank_lines_are_not_recorded() {
        let mut events = EventStream::new();
        let mut console = ConsolePane::new();
        console.process_keys(&typed("   ", &[Key::Enter]), &mut events);
        assert_eq!(console.history().count(), 0);
    }

    #[test]
    fn backspace_and_escape_edit_input() {
        let mut events = EventStream::new();
        let mut console = ConsolePane::new();
        console.process_keys(&typed("abc", &[]), &mut events);
        console.process_keys(&typed("", &[Key::Backspace]), &mut events);
        assert_eq!(console.input(), "ab");
        console.process_keys(&typed("", &[Key::Escape]), &mut events);
        assert_eq!(console.input(), "");
    }

    #[test]
    fn history_is_bounded() {
        let state = ConsoleState {
            history: (0..ConsolePane::MAX_HISTORY + 5).map(|i| i.to_string()).collect(),
        };
        let console = ConsolePane::from_state(state);
        assert_eq!(console.history().count(), ConsolePane::MAX_HISTORY);
        assert_eq!(console.history().next(), Some("5"));
    }

    #[test]
    fn duplicate_keeps_history_with_new_identity() {
        let console = ConsolePane::from_state(ConsoleState {
            history: vec!["one".to_string()],
        });
        let copy = console.duplicate(true);
        assert_ne!(copy.id(), console.id());
        assert_eq!(copy.history().collect::<Vec<_>>(), vec!["one"]);
    }
}
