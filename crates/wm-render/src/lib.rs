// ABOUTME: Drawing surface shared by splitwm panes.
// ABOUTME: Panes record into a command buffer; the renderer tessellates and presents it with wgpu.

pub mod command;
mod gpu;
mod pipeline;
pub mod renderer;
pub mod tessellate;

pub use command::{ortho_2d, BufferData, BufferId, Command, CommandBuffer};
pub use renderer::{RenderError, Renderer};
pub use tessellate::{tessellate, Batch, ScissorRect, SolidVertex};
