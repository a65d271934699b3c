// ABOUTME: Per-frame keyboard and mouse snapshots.
// ABOUTME: Derives clicks, releases and drag deltas from successive button states.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Secondary,
    Tertiary,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [
        MouseButton::Primary,
        MouseButton::Secondary,
        MouseButton::Tertiary,
    ];

    fn index(self) -> usize {
        match self {
            MouseButton::Primary => 0,
            MouseButton::Secondary => 1,
            MouseButton::Tertiary => 2,
        }
    }
}

/// Mouse state for one frame, in display coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseState {
    pub pos: [f32; 2],
    pub down: [bool; 3],
    /// Went down this frame
    pub clicked: [bool; 3],
    /// Went up this frame
    pub released: [bool; 3],
    /// Held down and moved at some point since it went down
    pub dragging: [bool; 3],
    /// Cursor movement since the previous frame while any button drags
    pub drag_delta: [f32; 2],
    pub wheel: [f32; 2],
}

impl MouseState {
    /// Derive the next frame's state from the new cursor position and button levels.
    pub fn next_frame(&self, pos: [f32; 2], down: [bool; 3], wheel: [f32; 2]) -> Self {
        let moved = pos != self.pos;
        let mut next = MouseState {
            pos,
            down,
            wheel,
            ..Default::default()
        };
        for i in 0..3 {
            next.clicked[i] = down[i] && !self.down[i];
            next.released[i] = !down[i] && self.down[i];
            next.dragging[i] = down[i] && self.down[i] && (self.dragging[i] || moved);
        }
        if next.dragging.iter().any(|d| *d) {
            next.drag_delta = [pos[0] - self.pos[0], pos[1] - self.pos[1]];
        }
        next
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down[button.index()]
    }

    pub fn is_clicked(&self, button: MouseButton) -> bool {
        self.clicked[button.index()]
    }

    pub fn is_released(&self, button: MouseButton) -> bool {
        self.released[button.index()]
    }

    pub fn is_dragging(&self, button: MouseButton) -> bool {
        self.dragging[button.index()]
    }

    pub fn any_clicked(&self) -> bool {
        self.clicked.iter().any(|c| *c)
    }

    pub fn any_dragging(&self) -> bool {
        self.dragging.iter().any(|d| *d)
    }

    /// Copy of this state with the position expressed relative to `origin`
    pub fn relative_to(&self, origin: [f32; 2]) -> Self {
        Self {
            pos: [self.pos[0] - origin[0], self.pos[1] - origin[1]],
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    /// Function keys F1 through F12
    F(u8),
}

/// Keyboard state for one frame
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    /// Keys that went down this frame
    pub pressed: HashSet<Key>,
    /// Keys currently held (including modifiers)
    pub held: HashSet<Key>,
    /// Printable text entered this frame
    pub text: String,
}

impl KeyboardState {
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Clear per-frame edges, keeping held keys
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.text.clear();
    }
}
