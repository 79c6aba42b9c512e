//! Sprite frames and timed animations
//!
//! An `Animation` owns its frames and playback state. Advancing is the only
//! mutation during rendering; `render_frame` is a pure query that produces
//! draw parameters for the renderer sink.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Integer rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// A single frame: which image, where to clip it, and how big to draw it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    image: String,
    clip: Rect,
    size: IVec2,
}

impl Frame {
    pub fn new(image: impl Into<String>, clip: Rect, size: IVec2) -> Self {
        Self {
            image: image.into(),
            clip,
            size,
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    /// Ratio between draw size and clip size on each axis
    fn base_scale(&self) -> DVec2 {
        let axis = |size: i32, clip: i32| {
            if clip == 0 {
                0.0
            } else {
                size as f64 / clip as f64
            }
        };
        DVec2::new(axis(self.size.x, self.clip.w), axis(self.size.y, self.clip.h))
    }
}

/// Everything a renderer needs to draw one frame of a sprite
#[derive(Debug, Clone, PartialEq)]
pub struct DrawParams<'a> {
    pub image: &'a str,
    pub clip: Rect,
    pub dest: Rect,
    /// Clockwise rotation in degrees
    pub angle: f64,
    /// (horizontal, vertical)
    pub flip: (bool, bool),
}

/// Scale, rotation and flip applied on top of the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: DVec2,
    pub angle: f64,
    pub flip: (bool, bool),
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: DVec2::ONE,
            angle: 0.0,
            flip: (false, false),
        }
    }
}

/// A looping sequence of frames with playback rate and transform state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnimationDef")]
pub struct Animation {
    frames: Vec<Frame>,
    /// Frames per second; 0 means the animation never advances
    pub rate: f64,
    /// Draw origin in clip pixels, subtracted from the draw position
    pub origin: IVec2,
    pub transform: Transform,
    index: usize,
    accumulator: f64,
}

/// Unchecked wire form of `Animation`
#[derive(Deserialize)]
struct AnimationDef {
    frames: Vec<Frame>,
    rate: f64,
    origin: IVec2,
    #[serde(default)]
    transform: Transform,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    accumulator: f64,
}

impl TryFrom<AnimationDef> for Animation {
    type Error = EngineError;

    fn try_from(def: AnimationDef) -> Result<Self, Self::Error> {
        let mut anim = Animation::new(def.frames, def.rate, def.origin)?;
        if def.index >= anim.frames.len() {
            return Err(EngineError::FrameOutOfRange {
                index: def.index,
                frames: anim.frames.len(),
            });
        }
        anim.transform = def.transform;
        anim.index = def.index;
        anim.accumulator = def.accumulator;
        Ok(anim)
    }
}

impl Animation {
    pub fn new(frames: Vec<Frame>, rate: f64, origin: IVec2) -> Result<Self, EngineError> {
        if frames.is_empty() {
            return Err(EngineError::EmptyAnimation);
        }
        Ok(Self {
            frames,
            rate,
            origin,
            transform: Transform::default(),
            index: 0,
            accumulator: 0.0,
        })
    }

    /// Single-frame animation that never advances
    pub fn still(frame: Frame, origin: IVec2) -> Self {
        Self {
            frames: vec![frame],
            rate: 0.0,
            origin,
            transform: Transform::default(),
            index: 0,
            accumulator: 0.0,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.index]
    }

    /// Advance playback by `elapsed` seconds
    ///
    /// Once a full frame's worth of time has accumulated the index moves by one
    /// (wrapping) and the accumulator restarts from zero. Static animations
    /// (rate 0) don't accumulate at all.
    pub fn advance(&mut self, elapsed: f64) {
        if self.rate == 0.0 {
            return;
        }
        self.accumulator += elapsed * self.rate;
        if self.accumulator >= 1.0 {
            self.index = (self.index + 1) % self.frames.len();
            self.accumulator = 0.0;
        }
    }

    /// Rewind to the first frame, keeping transform state
    pub fn restart(&mut self) {
        self.index = 0;
        self.accumulator = 0.0;
    }

    /// Draw parameters for the current frame at world position `pos`
    pub fn render_frame(&self, pos: DVec2) -> DrawParams<'_> {
        let frame = self.current_frame();
        let base = frame.base_scale();
        let scale = self.transform.scale;
        let pos = pos.as_ivec2();
        let dest = Rect::new(
            pos.x - (self.origin.x as f64 * base.x * scale.x) as i32,
            pos.y - (self.origin.y as f64 * base.y * scale.y) as i32,
            (frame.size.x as f64 * scale.x) as i32,
            (frame.size.y as f64 * scale.y) as i32,
        );
        DrawParams {
            image: &frame.image,
            clip: frame.clip,
            dest,
            angle: self.transform.angle,
            flip: self.transform.flip,
        }
    }
}
