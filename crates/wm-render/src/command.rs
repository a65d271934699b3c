// ABOUTME: Recorded drawing commands shared by all panes in a frame.
// ABOUTME: Panes append state changes and draws; the renderer replays them.

use glam::Mat4;
use wm_core::{Color, Extent2D};

/// Handle to data uploaded with [`CommandBuffer::float2_buffer`] or [`CommandBuffer::int_buffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u32);

#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    Float2(Vec<[f32; 2]>),
    Int(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fill the scissor rectangle (or the whole framebuffer) with a color
    Clear(Color),
    /// Framebuffer rectangle that clip space maps onto
    Viewport(Extent2D),
    /// Framebuffer rectangle outside of which nothing is drawn
    Scissor(Extent2D),
    LoadProjection(Mat4),
    LoadModelView(Mat4),
    Blend(bool),
    SetColor(Color),
    LineWidth(f32),
    /// Positions used by subsequent draws
    VertexArray(BufferId),
    /// Each group of four indices is one quad
    DrawQuads(BufferId),
    /// Each pair of indices is one segment
    DrawLines(BufferId),
    /// Back to full-framebuffer viewport, no scissor, identity transforms
    ResetState,
}

/// Orthographic projection for a region `width` x `height` with y pointing down
pub fn ortho_2d(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0)
}

#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    buffers: Vec<BufferData>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all commands and uploads so the buffer can be reused next frame
    pub fn reset(&mut self) {
        self.commands.clear();
        self.buffers.clear();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn buffer(&self, id: BufferId) -> Option<&BufferData> {
        self.buffers.get(id.0 as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn upload(&mut self, data: BufferData) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(data);
        id
    }

    pub fn float2_buffer(&mut self, data: &[[f32; 2]]) -> BufferId {
        self.upload(BufferData::Float2(data.to_vec()))
    }

    pub fn int_buffer(&mut self, data: &[u32]) -> BufferId {
        self.upload(BufferData::Int(data.to_vec()))
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.push(Command::Clear(color));
    }

    pub fn viewport(&mut self, extent: Extent2D) {
        self.commands.push(Command::Viewport(extent));
    }

    pub fn scissor(&mut self, extent: Extent2D) {
        self.commands.push(Command::Scissor(extent));
    }

    pub fn load_projection(&mut self, m: Mat4) {
        self.commands.push(Command::LoadProjection(m));
    }

    pub fn load_model_view(&mut self, m: Mat4) {
        self.commands.push(Command::LoadModelView(m));
    }

    pub fn blend(&mut self, enabled: bool) {
        self.commands.push(Command::Blend(enabled));
    }

    pub fn set_color(&mut self, color: Color) {
        self.commands.push(Command::SetColor(color));
    }

    pub fn line_width(&mut self, width: f32) {
        self.commands.push(Command::LineWidth(width));
    }

    pub fn vertex_array(&mut self, positions: BufferId) {
        self.commands.push(Command::VertexArray(positions));
    }

    pub fn draw_quads(&mut self, indices: BufferId) {
        self.commands.push(Command::DrawQuads(indices));
    }

    pub fn draw_lines(&mut self, indices: BufferId) {
        self.commands.push(Command::DrawLines(indices));
    }

    pub fn reset_state(&mut self) {
        self.commands.push(Command::ResetState);
    }

    /// Filled rectangle in the current projection's coordinates
    pub fn fill_rect(&mut self, rect: Extent2D, color: Color) {
        let positions = self.float2_buffer(&rect_corners(&rect));
        let indices = self.int_buffer(&[0, 1, 2, 3]);
        self.set_color(color);
        self.vertex_array(positions);
        self.draw_quads(indices);
    }

    /// Rectangle outline in the current projection's coordinates
    pub fn outline_rect(&mut self, rect: Extent2D, color: Color, width: f32) {
        let positions = self.float2_buffer(&rect_corners(&rect));
        let indices = self.int_buffer(&[0, 1, 1, 2, 2, 3, 3, 0]);
        self.set_color(color);
        self.line_width(width);
        self.vertex_array(positions);
        self.draw_lines(indices);
    }
}

fn rect_corners(rect: &Extent2D) -> [[f32; 2]; 4] {
    [
        [rect.p0[0], rect.p0[1]],
        [rect.p1[0], rect.p0[1]],
        [rect.p1[0], rect.p1[1]],
        [rect.p0[0], rect.p1[1]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_are_addressable() {
        let mut cb = CommandBuffer::new();
        let a = cb.float2_buffer(&[[1.0, 2.0]]);
        let b = cb.int_buffer(&[7, 8]);
        assert_ne!(a, b);
        assert_eq!(cb.buffer(a), Some(&BufferData::Float2(vec![[1.0, 2.0]])));
        assert_eq!(cb.buffer(b), Some(&BufferData::Int(vec![7, 8])));
    }

    #[test]
    fn fill_rect_records_color_and_quad() {
        let mut cb = CommandBuffer::new();
        cb.fill_rect(Extent2D::from_size(4.0, 2.0), Color::WHITE);
        let commands = cb.commands();
        assert_eq!(commands[0], Command::SetColor(Color::WHITE));
        assert!(matches!(commands[1], Command::VertexArray(_)));
        assert!(matches!(commands[2], Command::DrawQuads(_)));
    }

    #[test]
    fn reset_empties_buffer() {
        let mut cb = CommandBuffer::new();
        cb.clear(Color::BLACK);
        cb.float2_buffer(&[[0.0, 0.0]]);
        cb.reset();
        assert!(cb.is_empty());
        assert_eq!(cb.buffer(BufferId(0)), None);
    }

    #[test]
    fn ortho_maps_corners_to_clip_space() {
        let m = ortho_2d(200.0, 100.0);
        let top_left = m.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = m.project_point3(glam::Vec3::new(200.0, 100.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
    }
}
