use std::io::Write;

use cairo::{Format, ImageSurface};

use crate::error::{ChartError, ChartResult};
use crate::render::{Canvas, TextureSink};

/// Uploads chart canvases into a Cairo ARGB32 image surface.
///
/// The surface can be handed to any Cairo consumer as a texture, or written
/// out as PNG for snapshot diagnostics.
#[derive(Debug)]
pub struct CairoTextureSink {
    surface: ImageSurface,
    upload_count: usize,
}

impl CairoTextureSink {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            upload_count: 0,
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.upload_count
    }

    pub fn write_png<W: Write>(&self, stream: &mut W) -> ChartResult<()> {
        self.surface
            .write_to_png(stream)
            .map_err(|err| ChartError::InvalidData(format!("failed to write png: {err}")))
    }
}

impl TextureSink for CairoTextureSink {
    fn upload(&mut self, canvas: &Canvas) -> ChartResult<()> {
        let width = canvas.width() as usize;
        let height = canvas.height() as usize;
        if width != self.surface.width() as usize || height != self.surface.height() as usize {
            return Err(ChartError::InvalidData(format!(
                "canvas {}x{} does not match cairo surface {}x{}",
                width,
                height,
                self.surface.width(),
                self.surface.height()
            )));
        }

        self.surface.flush();
        let stride = self.surface.stride() as usize;
        let source = canvas.as_bytes();
        {
            let mut data = self.surface.data().map_err(|err| {
                ChartError::InvalidData(format!("failed to borrow cairo surface data: {err}"))
            })?;
            for y in 0..height {
                for x in 0..width {
                    let src = (y * width + x) * 4;
                    let dst = y * stride + x * 4;
                    let [r, g, b, a] = [
                        source[src],
                        source[src + 1],
                        source[src + 2],
                        source[src + 3],
                    ];
                    // ARGB32 is native-endian premultiplied; BGRA byte order on little-endian.
                    let pixel = u32::from(a) << 24
                        | u32::from(premultiply(r, a)) << 16
                        | u32::from(premultiply(g, a)) << 8
                        | u32::from(premultiply(b, a));
                    data[dst..dst + 4].copy_from_slice(&pixel.to_ne_bytes());
                }
            }
        }
        self.surface.mark_dirty();
        self.upload_count += 1;
        Ok(())
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
