// ABOUTME: Shared types and configuration for splitwm.
// ABOUTME: Defines colors, geometry, input snapshots, events, and config file handling.

pub mod color;
pub mod config;
pub mod events;
pub mod extent;
pub mod id;
pub mod input;

pub use color::Color;
pub use config::{ColorScheme, Config, ConfigError};
pub use events::{Event, EventStream, SubscriberId};
pub use extent::{split_line_width, Extent2D};
pub use id::PaneId;
pub use input::{Key, KeyboardState, MouseButton, MouseState};
