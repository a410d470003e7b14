use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, RectPrimitive};

const BYTES_PER_PIXEL: usize = 4;

/// Off-screen RGBA8 surface a chart engine paints into.
///
/// Pixels are stored row-major, straight alpha, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    viewport: Viewport,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(viewport: Viewport) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let len = viewport.width as usize * viewport.height as usize * BYTES_PER_PIXEL;
        Ok(Self {
            viewport,
            pixels: vec![0; len],
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGBA value at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    pub fn fill(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        let rgba = color.to_rgba8();
        for chunk in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&rgba);
        }
        Ok(())
    }

    /// Fills `rect` clipped to the surface; partially covered pixels are
    /// painted when their center lies inside the rectangle.
    pub fn fill_rect(&mut self, rect: RectPrimitive) -> ChartResult<()> {
        rect.validate()?;
        let rgba = rect.fill_color.to_rgba8();

        let x0 = clip_to_span(rect.x, self.viewport.width);
        let x1 = clip_to_span(rect.x + rect.width, self.viewport.width);
        let y0 = clip_to_span(rect.y, self.viewport.height);
        let y1 = clip_to_span(rect.y + rect.height, self.viewport.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let offset = self.offset(x, y);
                self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
            }
        }
        Ok(())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.viewport.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

fn clip_to_span(edge: f64, span: u32) -> u32 {
    (edge - 0.5).ceil().clamp(0.0, f64::from(span)) as u32
}
