//! Renderer that records draw calls instead of drawing
//!
//! Used by the demo binary and by tests. Textures and fonts still have to be
//! registered, so missing-asset paths behave like a real backend.

use glam::IVec2;

use super::{RenderError, Renderer, Vertex};
use crate::assets::Registry;
use crate::sim::{DrawParams, Rect};

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear([u8; 4]),
    Sprite {
        image: String,
        clip: Rect,
        dest: Rect,
        angle: f64,
        flip: (bool, bool),
    },
    Outline(Vec<Vertex>),
    Text {
        font: String,
        text: String,
        pos: IVec2,
        color: [u8; 4],
    },
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    /// Registered texture sizes
    pub textures: Registry<IVec2>,
    /// Registered font point sizes
    pub fonts: Registry<u16>,
    commands: Vec<DrawCommand>,
    /// Outline vertices of the current frame, packed the way a GPU backend
    /// uploads them
    vertex_bytes: Vec<u8>,
    last_frame: Vec<DrawCommand>,
    frames_presented: u64,
    fullscreen: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, key: &str, size: IVec2) -> Self {
        self.textures.insert(key, size);
        self
    }

    pub fn with_font(mut self, key: &str, size: u16) -> Self {
        self.fonts.insert(key, size);
        self
    }

    /// Calls recorded since the last `clear`
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Packed outline vertex data recorded since the last `clear`
    pub fn vertex_bytes(&self) -> &[u8] {
        &self.vertex_bytes
    }

    /// Number of outline vertices recorded since the last `clear`
    pub fn vertex_count(&self) -> usize {
        self.vertex_bytes.len() / Vertex::STRIDE
    }

    /// Calls of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Number of sprite draws in the current command list
    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
            .count()
    }
}

impl Renderer for HeadlessRenderer {
    fn clear(&mut self, color: [u8; 4]) {
        self.commands.clear();
        self.vertex_bytes.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_sprite(&mut self, params: &DrawParams<'_>) -> Result<(), RenderError> {
        if !self.textures.contains(params.image) {
            return Err(RenderError::MissingTexture(params.image.to_string()));
        }
        self.commands.push(DrawCommand::Sprite {
            image: params.image.to_string(),
            clip: params.clip,
            dest: params.dest,
            angle: params.angle,
            flip: params.flip,
        });
        Ok(())
    }

    fn draw_outline(&mut self, vertices: &[Vertex]) -> Result<(), RenderError> {
        if vertices.len() < 2 {
            return Err(RenderError::Draw(format!(
                "outline needs at least 2 vertices, got {}",
                vertices.len()
            )));
        }
        self.vertex_bytes
            .extend_from_slice(bytemuck::cast_slice(vertices));
        self.commands.push(DrawCommand::Outline(vertices.to_vec()));
        Ok(())
    }

    fn draw_text(
        &mut self,
        font: &str,
        text: &str,
        pos: IVec2,
        color: [u8; 4],
    ) -> Result<(), RenderError> {
        if !self.fonts.contains(font) {
            return Err(RenderError::MissingFont(font.to_string()));
        }
        self.commands.push(DrawCommand::Text {
            font: font.to_string(),
            text: text.to_string(),
            pos,
            color,
        });
        Ok(())
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.commands);
        self.frames_presented += 1;
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }
}
