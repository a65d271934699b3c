// ABOUTME: Converts a recorded command buffer into colored triangles in framebuffer pixels.
// ABOUTME: Triangles are grouped into batches that share a scissor rectangle.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wm_core::{Color, Extent2D};

use crate::command::{ortho_2d, BufferData, BufferId, Command, CommandBuffer};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SolidVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Scissor in whole framebuffer pixels, already clipped to the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    fn from_extent(extent: &Extent2D, framebuffer: [u32; 2]) -> Self {
        let fw = framebuffer[0] as f32;
        let fh = framebuffer[1] as f32;
        let x0 = extent.p0[0].floor().clamp(0.0, fw);
        let y0 = extent.p0[1].floor().clamp(0.0, fh);
        let x1 = extent.p1[0].ceil().clamp(x0, fw);
        let y1 = extent.p1[1].ceil().clamp(y0, fh);
        Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn to_extent(self) -> Extent2D {
        Extent2D::new(
            [self.x as f32, self.y as f32],
            [(self.x + self.width) as f32, (self.y + self.height) as f32],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub scissor: ScissorRect,
    pub vertices: Vec<SolidVertex>,
}

struct DrawState {
    framebuffer: [u32; 2],
    viewport: Extent2D,
    scissor: ScissorRect,
    projection: Mat4,
    model_view: Mat4,
    blend: bool,
    color: Color,
    line_width: f32,
    positions: Option<BufferId>,
}

impl DrawState {
    fn new(framebuffer: [u32; 2]) -> Self {
        let full = Extent2D::from_size(framebuffer[0] as f32, framebuffer[1] as f32);
        Self {
            framebuffer,
            viewport: full,
            scissor: ScissorRect::from_extent(&full, framebuffer),
            projection: ortho_2d(full.width(), full.height()),
            model_view: Mat4::IDENTITY,
            blend: true,
            color: Color::WHITE,
            line_width: 1.0,
            positions: None,
        }
    }

    /// Apply the transforms and the viewport mapping
    fn to_framebuffer(&self, p: [f32; 2]) -> [f32; 2] {
        let clip = (self.projection * self.model_view).project_point3(Vec3::new(p[0], p[1], 0.0));
        let vp = &self.viewport;
        [
            vp.p0[0] + (clip.x + 1.0) * 0.5 * vp.width(),
            vp.p0[1] + (1.0 - clip.y) * 0.5 * vp.height(),
        ]
    }

    fn draw_color(&self) -> [f32; 4] {
        if self.blend {
            self.color.to_array()
        } else {
            self.color.with_alpha(1.0).to_array()
        }
    }
}

struct Tessellator<'a> {
    cb: &'a CommandBuffer,
    state: DrawState,
    batches: Vec<Batch>,
}

impl<'a> Tessellator<'a> {
    fn emit(&mut self, vertices: &[SolidVertex]) {
        if self.state.scissor.is_empty() {
            return;
        }
        let scissor = self.state.scissor;
        if let Some(batch) = self.batches.last_mut().filter(|b| b.scissor == scissor) {
            batch.vertices.extend_from_slice(vertices);
        } else {
            self.batches.push(Batch {
                scissor,
                vertices: vertices.to_vec(),
            });
        }
    }

    fn emit_quad(&mut self, corners: [[f32; 2]; 4], color: [f32; 4]) {
        let v = |position| SolidVertex { position, color };
        self.emit(&[
            v(corners[0]),
            v(corners[1]),
            v(corners[2]),
            v(corners[0]),
            v(corners[2]),
            v(corners[3]),
        ]);
    }

    fn vertices_and_indices(&self, indices: BufferId) -> Option<(&'a [[f32; 2]], &'a [u32])> {
        let cb = self.cb;
        let Some(positions) = self.state.positions else {
            tracing::warn!("draw issued without a vertex array");
            return None;
        };
        match (cb.buffer(positions), cb.buffer(indices)) {
            (Some(BufferData::Float2(p)), Some(BufferData::Int(i))) => Some((p, i)),
            _ => {
                tracing::warn!("draw issued with mismatched buffers {:?} / {:?}", positions, indices);
                None
            }
        }
    }

    fn draw_quads(&mut self, indices: BufferId) {
        let Some((positions, indices)) = self.vertices_and_indices(indices) else {
            return;
        };
        let color = self.state.draw_color();
        for quad in indices.chunks_exact(4) {
            let mut corners = [[0.0; 2]; 4];
            let mut valid = true;
            for (corner, &index) in corners.iter_mut().zip(quad) {
                match positions.get(index as usize) {
                    Some(p) => *corner = self.state.to_framebuffer(*p),
                    None => valid = false,
                }
            }
            if valid {
                self.emit_quad(corners, color);
            } else {
                tracing::warn!("quad index out of range: {:?}", quad);
            }
        }
    }

    fn draw_lines(&mut self, indices: BufferId) {
        let Some((positions, indices)) = self.vertices_and_indices(indices) else {
            return;
        };
        let color = self.state.draw_color();
        let half = self.state.line_width.max(1.0) / 2.0;
        for segment in indices.chunks_exact(2) {
            let (Some(a), Some(b)) = (
                positions.get(segment[0] as usize),
                positions.get(segment[1] as usize),
            ) else {
                tracing::warn!("line index out of range: {:?}", segment);
                continue;
            };
            let [x0, y0] = self.state.to_framebuffer(*a);
            let [x1, y1] = self.state.to_framebuffer(*b);
            let dx = x1 - x0;
            let dy = y1 - y0;
            let len = (dx * dx + dy * dy).sqrt();
            if len < 0.001 {
                continue;
            }
            // Perpendicular offset for thickness, extended along the segment so corners meet
            let (ux, uy) = (dx / len * half, dy / len * half);
            let (px, py) = (-uy, ux);
            self.emit_quad(
                [
                    [x0 - ux + px, y0 - uy + py],
                    [x0 - ux - px, y0 - uy - py],
                    [x1 + ux - px, y1 + uy - py],
                    [x1 + ux + px, y1 + uy + py],
                ],
                color,
            );
        }
    }

    fn run(mut self) -> Vec<Batch> {
        let cb = self.cb;
        for command in cb.commands() {
            match command {
                Command::Clear(color) => {
                    let r = self.state.scissor.to_extent();
                    self.emit_quad(
                        [
                            [r.p0[0], r.p0[1]],
                            [r.p1[0], r.p0[1]],
                            [r.p1[0], r.p1[1]],
                            [r.p0[0], r.p1[1]],
                        ],
                        color.with_alpha(1.0).to_array(),
                    );
                }
                Command::Viewport(extent) => self.state.viewport = *extent,
                Command::Scissor(extent) => {
                    self.state.scissor = ScissorRect::from_extent(extent, self.state.framebuffer)
                }
                Command::LoadProjection(m) => self.state.projection = *m,
                Command::LoadModelView(m) => self.state.model_view = *m,
                Command::Blend(enabled) => self.state.blend = *enabled,
                Command::SetColor(color) => self.state.color = *color,
                Command::LineWidth(width) => self.state.line_width = *width,
                Command::VertexArray(id) => self.state.positions = Some(*id),
                Command::DrawQuads(id) => self.draw_quads(*id),
                Command::DrawLines(id) => self.draw_lines(*id),
                Command::ResetState => self.state = DrawState::new(self.state.framebuffer),
            }
        }
        self.batches
    }
}

/// Replay `cb` against a framebuffer of the given pixel size.
pub fn tessellate(cb: &CommandBuffer, framebuffer: [u32; 2]) -> Vec<Batch> {
    Tessellator {
        cb,
        state: DrawState::new(framebuffer),
        batches: Vec::new(),
    }
    .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(batch: &Batch) -> ([f32; 2], [f32; 2]) {
        let mut lo = [f32::MAX; 2];
        let mut hi = [f32::MIN; 2];
        for v in &batch.vertices {
            for i in 0..2 {
                lo[i] = lo[i].min(v.position[i]);
                hi[i] = hi[i].max(v.position[i]);
            }
        }
        (lo, hi)
    }

    #[test]
    fn clear_covers_framebuffer() {
        let mut cb = CommandBuffer::new();
        cb.clear(Color::rgba(0.2, 0.3, 0.4, 0.1));
        let batches = tessellate(&cb, [640, 480]);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].vertices.len(), 6);
        assert_eq!(bounds(&batches[0]), ([0.0, 0.0], [640.0, 480.0]));
        assert_eq!(batches[0].vertices[0].color[3], 1.0);
    }

    #[test]
    fn pane_projection_maps_into_viewport() {
        let mut cb = CommandBuffer::new();
        let fb = Extent2D::new([100.0, 50.0], [300.0, 150.0]);
        cb.viewport(fb);
        cb.scissor(fb);
        cb.load_projection(ortho_2d(100.0, 50.0));
        cb.fill_rect(Extent2D::from_size(100.0, 50.0), Color::WHITE);

        let batches = tessellate(&cb, [400, 300]);
        assert_eq!(batches.len(), 1);
        let (lo, hi) = bounds(&batches[0]);
        assert!((lo[0] - 100.0).abs() < 1e-3 && (lo[1] - 50.0).abs() < 1e-3);
        assert!((hi[0] - 300.0).abs() < 1e-3 && (hi[1] - 150.0).abs() < 1e-3);
        assert_eq!(
            batches[0].scissor,
            ScissorRect {
                x: 100,
                y: 50,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn scissor_change_starts_new_batch() {
        let mut cb = CommandBuffer::new();
        cb.scissor(Extent2D::from_size(10.0, 10.0));
        cb.clear(Color::BLACK);
        cb.fill_rect(Extent2D::from_size(5.0, 5.0), Color::WHITE);
        cb.scissor(Extent2D::new([10.0, 0.0], [20.0, 10.0]));
        cb.clear(Color::BLACK);
        cb.reset_state();
        cb.clear(Color::WHITE);

        let batches = tessellate(&cb, [20, 10]);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].vertices.len(), 12);
        assert_eq!(batches[1].scissor.x, 10);
        assert_eq!(batches[2].scissor.width, 20);
    }

    #[test]
    fn empty_scissor_draws_nothing() {
        let mut cb = CommandBuffer::new();
        cb.scissor(Extent2D::new([50.0, 50.0], [50.0, 80.0]));
        cb.clear(Color::WHITE);
        assert!(tessellate(&cb, [100, 100]).is_empty());
    }

    #[test]
    fn blend_off_forces_opaque() {
        let mut cb = CommandBuffer::new();
        cb.blend(false);
        cb.fill_rect(Extent2D::from_size(1.0, 1.0), Color::SELECTION);
        let batches = tessellate(&cb, [4, 4]);
        assert_eq!(batches[0].vertices[0].color, [0.5, 0.5, 0.5, 1.0]);

        let mut cb = CommandBuffer::new();
        cb.fill_rect(Extent2D::from_size(1.0, 1.0), Color::SELECTION);
        let batches = tessellate(&cb, [4, 4]);
        assert_eq!(batches[0].vertices[0].color, [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn lines_become_quads_of_line_width() {
        let mut cb = CommandBuffer::new();
        let positions = cb.float2_buffer(&[[10.0, 20.0], [30.0, 20.0]]);
        let indices = cb.int_buffer(&[0, 1]);
        cb.line_width(4.0);
        cb.vertex_array(positions);
        cb.draw_lines(indices);

        let batches = tessellate(&cb, [100, 100]);
        let (lo, hi) = bounds(&batches[0]);
        assert!((lo[1] - 18.0).abs() < 1e-3);
        assert!((hi[1] - 22.0).abs() < 1e-3);
        assert!((lo[0] - 8.0).abs() < 1e-3);
        assert!((hi[0] - 32.0).abs() < 1e-3);
    }

    #[test]
    fn bad_indices_are_skipped() {
        let mut cb = CommandBuffer::new();
        let positions = cb.float2_buffer(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let indices = cb.int_buffer(&[0, 1, 2, 3, 0, 1, 2, 9]);
        cb.vertex_array(positions);
        cb.draw_quads(indices);
        let batches = tessellate(&cb, [10, 10]);
        assert_eq!(batches[0].vertices.len(), 6);
    }

    #[test]
    fn draw_without_vertex_array_is_ignored() {
        let mut cb = CommandBuffer::new();
        let indices = cb.int_buffer(&[0, 1, 2, 3]);
        cb.draw_quads(indices);
        assert!(tessellate(&cb, [10, 10]).is_empty());
    }
}
