use ir_tracker_core::RigidTransform;
use ir_tracker_match::dedup_indices;
use nalgebra::{Point2, Point3};

/// Tool identity; the configuration format stores it as a byte.
pub type ToolId = u8;

/// A rigid marker tool: fixed geometry plus per-frame tracking state.
///
/// When `visible` is set, the three `observed_*` lists have exactly the
/// length of `geometry` and `observed_world[i]` is the measurement of
/// `geometry[i]`. When not visible they are empty and both poses are the
/// identity.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedTool {
    pub id: ToolId,
    pub name: String,
    /// Marker positions in the tool frame (meters).
    pub geometry: Vec<Point3<f64>>,
    pub visible: bool,
    /// Tool frame to world frame.
    pub pose_world: RigidTransform,
    /// Tool frame to depth sensor frame.
    pub pose_sensor: RigidTransform,
    pub observed_world: Vec<Point3<f64>>,
    pub observed_depth: Vec<Point3<f64>>,
    pub observed_pixels: Vec<Point2<f32>>,
}

impl TrackedTool {
    pub fn new(id: ToolId, name: impl Into<String>, geometry: Vec<Point3<f64>>) -> Self {
        Self {
            id,
            name: name.into(),
            geometry,
            visible: false,
            pose_world: RigidTransform::identity(),
            pose_sensor: RigidTransform::identity(),
            observed_world: Vec::new(),
            observed_depth: Vec::new(),
            observed_pixels: Vec::new(),
        }
    }

    /// Forget the previous frame; capacity of the observed lists is kept.
    pub fn reset(&mut self) {
        self.visible = false;
        self.pose_world = RigidTransform::identity();
        self.pose_sensor = RigidTransform::identity();
        self.observed_world.clear();
        self.observed_depth.clear();
        self.observed_pixels.clear();
    }

    /// Drop markers closer than `tolerance` to an earlier marker; returns
    /// how many were removed.
    pub fn dedup_geometry(&mut self, tolerance: f64) -> usize {
        let keep = dedup_indices(&self.geometry, tolerance);
        let removed = self.geometry.len() - keep.len();
        if removed > 0 {
            self.geometry = keep.into_iter().map(|i| self.geometry[i]).collect();
        }
        removed
    }

    /// Output record: `[id, visible, 16 column-major world pose elements]`.
    pub fn serialize_into(&self, out: &mut Vec<f64>) {
        out.push(self.id as f64);
        out.push(if self.visible { 1.0 } else { 0.0 });
        out.extend_from_slice(&self.pose_world.to_column_major());
    }
}
