use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{Canvas, TextureSink};

/// Texture sink used by tests and headless hosts.
///
/// Nothing is uploaded anywhere, but the canvas is still checked against the
/// size of the first upload so tests catch a surface that changes shape
/// mid-stream.
#[derive(Debug, Default)]
pub struct NullTextureSink {
    pub upload_count: usize,
    pub last_viewport: Option<Viewport>,
    pub last_pixels: Vec<u8>,
}

impl TextureSink for NullTextureSink {
    fn upload(&mut self, canvas: &Canvas) -> ChartResult<()> {
        if let Some(previous) = self.last_viewport {
            if previous != canvas.viewport() {
                return Err(crate::error::ChartError::InvalidData(format!(
                    "texture size changed from {}x{} to {}x{}",
                    previous.width,
                    previous.height,
                    canvas.width(),
                    canvas.height()
                )));
            }
        }
        self.upload_count += 1;
        self.last_viewport = Some(canvas.viewport());
        self.last_pixels.clear();
        self.last_pixels.extend_from_slice(canvas.as_bytes());
        Ok(())
    }
}
