use image::GrayImage;
use ir_tracker_blobs::{
    depth_to_display_into, draw_marker_crosses, rebalance_into, validate_blobs_3d, BlobDetector,
    ValidatedBlob, ValidationStats,
};
use ir_tracker_core::{estimate_rigid_transform, Image16View, UnmapToUnitPlane};
use ir_tracker_match::find_correspondences;
use nalgebra::{Matrix4, Point2, Point3};

use crate::config::TrackerConfig;
use crate::dictionary::ToolDictionary;
use crate::error::TrackerError;
use crate::params::TrackerParams;
use crate::tool::{ToolId, TrackedTool};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One synchronized sensor frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Raw 16-bit infrared (active brightness) samples, row-major.
    pub ab: &'a [u16],
    /// Raw 16-bit depth samples, row-major, same resolution as `ab`.
    pub depth: &'a [u16],
    /// Depth camera to world, applied as a full homogeneous transform.
    pub depth_to_world: Matrix4<f64>,
}

/// What happened to one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub blobs_2d: usize,
    pub blobs_3d: usize,
    pub validation: ValidationStats,
    pub tracked_tools: usize,
    pub lost_tools: usize,
}

type BoxedUnmap = Box<dyn UnmapToUnitPlane + Send + Sync>;

/// Per-frame marker tracker for a fixed set of rigid tools.
///
/// Owns the tool dictionary and all per-frame scratch buffers; buffers are
/// cleared and reused every frame. Not meant to be shared across threads
/// while a frame is being processed.
pub struct ToolTracker {
    params: TrackerParams,
    tools: ToolDictionary,
    detector: BlobDetector,
    unmap: Option<BoxedUnmap>,
    display_enabled: bool,

    ab8: GrayImage,
    ab_display: GrayImage,
    depth_display: GrayImage,
    blobs_2d: Vec<Point2<f32>>,
    validated: Vec<ValidatedBlob>,
    pool_world: Vec<Point3<f64>>,
    pool_depth: Vec<Point3<f64>>,
    pool_pixels: Vec<Point2<f32>>,
}

impl std::fmt::Debug for ToolTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolTracker")
            .field("params", &self.params)
            .field("tools", &self.tools)
            .field("has_unmap", &self.unmap.is_some())
            .field("display_enabled", &self.display_enabled)
            .finish_non_exhaustive()
    }
}

impl ToolTracker {
    /// Build a tracker over `tools`.
    ///
    /// Markers closer than the duplicate tolerance are merged, and tools left
    /// with fewer than 3 distinct markers are dropped with a warning.
    pub fn new(params: TrackerParams, mut tools: ToolDictionary) -> Self {
        normalize_geometry(&mut tools, params.correspondence.duplicate_tolerance);
        let (w, h) = (params.width as u32, params.height as u32);
        Self {
            detector: BlobDetector::new(params.blob).with_method(params.method),
            params,
            tools,
            unmap: None,
            display_enabled: false,
            ab8: GrayImage::new(w, h),
            ab_display: GrayImage::new(w, h),
            depth_display: GrayImage::new(w, h),
            blobs_2d: Vec::new(),
            validated: Vec::new(),
            pool_world: Vec::new(),
            pool_depth: Vec::new(),
            pool_pixels: Vec::new(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.tracker, config.build_dictionary())
    }

    /// Install the pixel to unit-plane capability. Until one is set, no blob
    /// validates and every tool stays lost.
    pub fn set_unmap<U>(&mut self, unmap: U)
    where
        U: UnmapToUnitPlane + Send + Sync + 'static,
    {
        self.unmap = Some(Box::new(unmap));
    }

    pub fn set_display_enabled(&mut self, enabled: bool) {
        self.display_enabled = enabled;
    }

    pub fn display_enabled(&self) -> bool {
        self.display_enabled
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn tools(&self) -> &ToolDictionary {
        &self.tools
    }

    pub fn tool(&self, id: ToolId) -> Option<&TrackedTool> {
        self.tools.get(id)
    }

    pub fn tracked_tools_count(&self) -> usize {
        self.tools.visible_count()
    }

    /// Validated 3D blobs of the last frame.
    pub fn validated_blobs(&self) -> &[ValidatedBlob] {
        &self.validated
    }

    /// Run the full pipeline on one frame.
    ///
    /// Brighten, detect 2D blobs, lift them to 3D and update every tool.
    /// Only buffers that do not match the configured resolution produce an
    /// error; the tool state is left untouched in that case.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn process_frame(&mut self, frame: &FrameInput<'_>) -> Result<FrameSummary, TrackerError> {
        let (w, h) = (self.params.width, self.params.height);
        let ab = Image16View::new(w, h, frame.ab).map_err(TrackerError::InvalidAbFrame)?;
        let depth = Image16View::new(w, h, frame.depth).map_err(TrackerError::InvalidDepthFrame)?;

        self.blobs_2d.clear();
        self.validated.clear();

        rebalance_into(&ab, &mut self.ab8);
        if self.display_enabled {
            copy_image(&self.ab8, &mut self.ab_display);
            depth_to_display_into(&depth, &self.params.display, &mut self.depth_display);
        }

        self.detector.detect_into(&mut self.ab8, &mut self.blobs_2d);

        let validation = match &self.unmap {
            Some(unmap) => validate_blobs_3d(
                &depth,
                &frame.depth_to_world,
                &self.blobs_2d,
                unmap.as_ref(),
                &self.params.depth,
                &mut self.validated,
            ),
            None => {
                log::trace!("no unmap capability installed, skipping 3D validation");
                ValidationStats::default()
            }
        };

        let blobs = std::mem::take(&mut self.validated);
        let tracked = self.update_tools(&blobs);
        self.validated = blobs;

        if self.display_enabled {
            for tool in self.tools.iter().filter(|t| t.visible) {
                draw_marker_crosses(&mut self.ab_display, &tool.observed_pixels, &self.params.display);
                draw_marker_crosses(
                    &mut self.depth_display,
                    &tool.observed_pixels,
                    &self.params.display,
                );
            }
        }

        let summary = FrameSummary {
            blobs_2d: self.blobs_2d.len(),
            blobs_3d: self.validated.len(),
            validation,
            tracked_tools: tracked,
            lost_tools: self.tools.len() - tracked,
        };
        log::debug!(
            "frame: {} blobs, {} validated, {}/{} tools tracked",
            summary.blobs_2d,
            summary.blobs_3d,
            summary.tracked_tools,
            self.tools.len()
        );
        Ok(summary)
    }

    /// Match every tool against `blobs` and update its state.
    ///
    /// Tools are visited in ascending id order. Each tool is reset, matched
    /// against the points not yet claimed by an earlier tool, and on success
    /// posed with the rigid solver; its matched points are then removed from
    /// the pool. Returns the number of visible tools.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(blobs = blobs.len()))
    )]
    pub fn update_tools(&mut self, blobs: &[ValidatedBlob]) -> usize {
        let Self {
            params,
            tools,
            pool_world,
            pool_depth,
            pool_pixels,
            ..
        } = self;

        pool_world.clear();
        pool_depth.clear();
        pool_pixels.clear();
        for b in blobs {
            pool_world.push(b.world_point);
            pool_depth.push(b.depth_point);
            pool_pixels.push(b.pixel);
        }

        let mut tracked = 0;
        for tool in tools.iter_mut() {
            tool.reset();

            let set = match find_correspondences(&tool.geometry, pool_world, &params.correspondence)
            {
                Ok(set) => set,
                Err(e) => {
                    log::trace!("tool {}: {e}", tool.id);
                    continue;
                }
            };
            let matched = set.accepted();
            if matched.len() != tool.geometry.len() {
                log::debug!(
                    "tool {}: matched {} points for {} markers, skipped",
                    tool.id,
                    matched.len(),
                    tool.geometry.len()
                );
                continue;
            }

            tool.observed_world.extend(matched.iter().map(|&i| pool_world[i]));
            tool.observed_depth.extend(matched.iter().map(|&i| pool_depth[i]));
            tool.observed_pixels.extend(matched.iter().map(|&i| pool_pixels[i]));

            tool.pose_world = estimate_rigid_transform(&tool.geometry, &tool.observed_world);
            tool.pose_sensor = estimate_rigid_transform(&tool.geometry, &tool.observed_depth);
            tool.visible = true;
            tracked += 1;

            let mut claimed = matched.to_vec();
            claimed.sort_unstable_by(|a, b| b.cmp(a));
            for i in claimed {
                pool_world.remove(i);
                pool_depth.remove(i);
                pool_pixels.remove(i);
            }
        }

        tracked
    }

    /// Append the output records (see [`ToolDictionary::serialize_into`]).
    pub fn serialize_into(&self, out: &mut Vec<f64>) {
        self.tools.serialize_into(out);
    }

    pub fn serialized(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.serialize_into(&mut out);
        out
    }

    /// The labelled infrared and depth display images, when enabled.
    pub fn display_images(&self) -> Option<(&GrayImage, &GrayImage)> {
        self.display_enabled
            .then_some((&self.ab_display, &self.depth_display))
    }

    /// Copy the display images into caller buffers.
    ///
    /// Returns `false` (and copies nothing) when display is disabled or a
    /// buffer does not hold exactly `width * height` bytes.
    pub fn copy_display_images(&self, ab_out: &mut [u8], depth_out: &mut [u8]) -> bool {
        let expected = self.params.width * self.params.height;
        if !self.display_enabled || ab_out.len() != expected || depth_out.len() != expected {
            return false;
        }
        if self.ab_display.as_raw().len() != expected || self.depth_display.as_raw().len() != expected
        {
            return false;
        }
        ab_out.copy_from_slice(self.ab_display.as_raw());
        depth_out.copy_from_slice(self.depth_display.as_raw());
        true
    }
}

fn normalize_geometry(tools: &mut ToolDictionary, tolerance: f64) {
    tools.retain(|tool| {
        let removed = tool.dedup_geometry(tolerance);
        if tool.geometry.len() < 3 {
            log::warn!(
                "dropping tool {} ({:?}): {} distinct markers, need at least 3",
                tool.id,
                tool.name,
                tool.geometry.len()
            );
            return false;
        }
        if removed > 0 {
            log::warn!("tool {}: merged {removed} duplicate markers", tool.id);
        }
        true
    });
}

fn copy_image(src: &GrayImage, dst: &mut GrayImage) {
    if dst.dimensions() != src.dimensions() {
        *dst = GrayImage::new(src.width(), src.height());
    }
    dst.copy_from_slice(src.as_raw());
}
