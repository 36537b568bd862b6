use nalgebra::Point2;

/// Errors produced when wrapping raw sensor buffers.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid image buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
}

/// Borrowed single-channel image, row-major, `data.len() == width * height`.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a, T> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [T],
}

/// Raw 16-bit infrared or depth frame.
pub type Image16View<'a> = ImageView<'a, u16>;
/// 8-bit grayscale frame.
pub type Image8View<'a> = ImageView<'a, u8>;

impl<'a, T: Copy> ImageView<'a, T> {
    /// Wrap `data` after checking it matches the stated resolution.
    pub fn new(width: usize, height: usize, data: &'a [T]) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(ImageError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// True when the buffer length agrees with the dimensions.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == self.width * self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

/// Bilinearly interpolate `img` at a sub-pixel location.
///
/// The four nearest samples are blended; the right/bottom neighbours are
/// clamped to the last column/row. Returns `None` when the location is
/// outside the image or the view is inconsistent (the caller must treat
/// that as an invalid sample).
#[inline]
pub fn interpolate_bilinear<T>(img: &ImageView<'_, T>, p: Point2<f32>) -> Option<f32>
where
    T: Copy + Into<f32>,
{
    if !img.is_consistent() || !p.x.is_finite() || !p.y.is_finite() {
        return None;
    }
    if p.x < 0.0 || p.y < 0.0 || p.x >= img.width as f32 || p.y >= img.height as f32 {
        return None;
    }

    let x0 = p.x.floor() as usize;
    let y0 = p.y.floor() as usize;
    let x1 = (x0 + 1).min(img.width - 1);
    let y1 = (y0 + 1).min(img.height - 1);

    let dx = p.x - x0 as f32;
    let dy = p.y - y0 as f32;

    let at = |x: usize, y: usize| -> f32 { img.data[y * img.width + x].into() };
    let q00 = at(x0, y0);
    let q01 = at(x1, y0);
    let q10 = at(x0, y1);
    let q11 = at(x1, y1);

    Some(
        q00 * (1.0 - dx) * (1.0 - dy)
            + q01 * dx * (1.0 - dy)
            + q10 * (1.0 - dx) * dy
            + q11 * dx * dy,
    )
}
