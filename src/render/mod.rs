pub(crate) mod complex;
pub(crate) mod cpu;
pub(crate) mod frame;
pub(crate) mod legend;
pub(crate) mod scene;

/// CPU-readable RGBA8 frame produced by the rasterizer.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel bytes in RGBA8 order, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is alpha-premultiplied.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes of pixel `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4)?.try_into().ok()
    }
}
