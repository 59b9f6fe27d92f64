//! Renderer seam
//!
//! Pixel work happens outside the crate. A renderer only ever sees the
//! world through a `FrameView` built under the world lock.

use super::runtime_data::FrameView;
use crate::error::EngineResult;

pub trait WorldRenderer {
    fn render_frame(&mut self, frame: &FrameView<'_>) -> EngineResult<()>;
}
