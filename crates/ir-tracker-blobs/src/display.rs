//! 8-bit renditions of the raw frames and marker overlays.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use ir_tracker_core::Image16View;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Cross marker appearance plus depth display scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayParams {
    /// Total arm-to-arm length of the cross in pixels.
    pub cross_size: u32,
    pub cross_thickness: u32,
    pub cross_intensity: u8,
    /// Raw depth above this renders black.
    pub max_display_depth: u16,
    /// Raw depth that maps to full white.
    pub depth_white_point: f32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            cross_size: 25,
            cross_thickness: 5,
            cross_intensity: 100,
            max_display_depth: 4090,
            depth_white_point: 1000.0,
        }
    }
}

/// Brighten a raw 16-bit infrared frame into 8 bits.
///
/// Each sample is shifted right by 2 and saturated to 255, which is also the
/// input the blob detector expects.
pub fn rebalance_to_8bit(ab: &Image16View<'_>) -> GrayImage {
    let mut out = GrayImage::new(ab.width as u32, ab.height as u32);
    rebalance_into(ab, &mut out);
    out
}

/// [`rebalance_to_8bit`] into a reusable buffer (reallocated on size change).
pub fn rebalance_into(ab: &Image16View<'_>, out: &mut GrayImage) {
    ensure_size(out, ab.width, ab.height);
    for (dst, &raw) in out.iter_mut().zip(ab.data) {
        *dst = (raw >> 2).min(255) as u8;
    }
}

/// Map raw depth to a display image, rounding to the nearest level; invalid
/// depth renders black.
pub fn depth_to_display(depth: &Image16View<'_>, params: &DisplayParams) -> GrayImage {
    let mut out = GrayImage::new(depth.width as u32, depth.height as u32);
    depth_to_display_into(depth, params, &mut out);
    out
}

pub fn depth_to_display_into(depth: &Image16View<'_>, params: &DisplayParams, out: &mut GrayImage) {
    ensure_size(out, depth.width, depth.height);
    for (dst, &raw) in out.iter_mut().zip(depth.data) {
        *dst = if raw > params.max_display_depth {
            0
        } else {
            (raw as f32 * 255.0 / params.depth_white_point).round().min(255.0) as u8
        };
    }
}

/// Draw a `+` cross centred on `center`, clipped to the image.
pub fn draw_marker_cross(image: &mut GrayImage, center: Point2<f32>, params: &DisplayParams) {
    if !center.x.is_finite() || !center.y.is_finite() || params.cross_thickness == 0 {
        return;
    }
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    let half = (params.cross_size / 2) as i32;
    let half_t = (params.cross_thickness / 2) as i32;
    let len = 2 * half as u32 + 1;
    let color = Luma([params.cross_intensity]);

    draw_filled_rect_mut(
        image,
        Rect::at(cx - half, cy - half_t).of_size(len, params.cross_thickness),
        color,
    );
    draw_filled_rect_mut(
        image,
        Rect::at(cx - half_t, cy - half).of_size(params.cross_thickness, len),
        color,
    );
}

/// Draw a cross at every pixel in `centers`.
pub fn draw_marker_crosses(image: &mut GrayImage, centers: &[Point2<f32>], params: &DisplayParams) {
    for &c in centers {
        draw_marker_cross(image, c, params);
    }
}

fn ensure_size(img: &mut GrayImage, width: usize, height: usize) {
    if img.width() as usize != width || img.height() as usize != height {
        *img = GrayImage::new(width as u32, height as u32);
    }
}
