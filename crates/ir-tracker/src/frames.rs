//! Recorded frames stored as 16-bit grayscale PNG files.

use std::path::Path;

use image::{ImageBuffer, Luma};

/// A raw single-channel frame as delivered by the sensor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
}

#[derive(thiserror::Error, Debug)]
pub enum FrameIoError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("frame buffer does not match {width}x{height}")]
    Size { width: usize, height: usize },
}

/// Load a frame; 8-bit inputs are widened to 16 bits.
pub fn load_raw_frame(path: impl AsRef<Path>) -> Result<RawFrame, FrameIoError> {
    let img = image::open(path)?.into_luma16();
    let (w, h) = img.dimensions();
    Ok(RawFrame {
        width: w as usize,
        height: h as usize,
        data: img.into_raw(),
    })
}

/// Save a frame as a 16-bit PNG.
pub fn save_raw_frame(path: impl AsRef<Path>, frame: &RawFrame) -> Result<(), FrameIoError> {
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(frame.width as u32, frame.height as u32, frame.data.clone()).ok_or(
            FrameIoError::Size {
                width: frame.width,
                height: frame.height,
            },
        )?;
    img.save(path)?;
    Ok(())
}
