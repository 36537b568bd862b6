use approx::assert_abs_diff_eq;
use image::{ImageBuffer, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use ir_tracker::blobs::BlobDetectionMethod;
use ir_tracker::core::{PinholeUnmap, RigidTransform, UnmapToUnitPlane};
use ir_tracker::{
    FrameInput, ToolDictionary, ToolTracker, TrackedTool, TrackerParams,
};
use nalgebra::{Point2, Point3, Rotation3, UnitQuaternion, Vector3};

type Frame16 = ImageBuffer<Luma<u16>, Vec<u16>>;

const SIZE: u32 = 512;

/// Marker pixel centres and their ranges in millimeters.
const MARKERS: [((i32, i32), u16); 4] = [
    ((126, 156), 500),
    ((206, 156), 500),
    ((206, 276), 500),
    ((356, 336), 560),
];

fn camera() -> PinholeUnmap {
    PinholeUnmap::new(600.0, 600.0, 256.0, 256.0, SIZE as usize, SIZE as usize)
}

fn depth_to_world() -> RigidTransform {
    RigidTransform::from_parts(
        Rotation3::from_axis_angle(&Vector3::x_axis(), 0.2).into_inner(),
        Vector3::new(0.1, 1.5, -0.3),
    )
}

fn tool_pose() -> RigidTransform {
    let q = UnitQuaternion::from_euler_angles(0.3, -0.7, 1.9);
    RigidTransform::from_parts(
        q.to_rotation_matrix().into_inner(),
        Vector3::new(0.4, -1.2, 2.5),
    )
}

/// Same lifting the tracker performs: unit-plane ray scaled by range.
fn world_point(pixel: (i32, i32), range_mm: u16) -> Point3<f64> {
    let uv = camera()
        .unmap(Point2::new(pixel.0 as f32, pixel.1 as f32))
        .expect("inside image");
    let ray = Vector3::new(uv.x as f64, uv.y as f64, 1.0).normalize();
    let depth_point = Point3::from(ray * (range_mm as f64 / 1000.0));
    depth_to_world().transform_point(&depth_point)
}

/// Tool geometry chosen so that the tool at `tool_pose()` lands on the markers.
fn tool_geometry() -> Vec<Point3<f64>> {
    let inv = tool_pose().inverse();
    MARKERS
        .iter()
        .map(|&(px, range)| inv.transform_point(&world_point(px, range)))
        .collect()
}

fn render(markers: &[((i32, i32), u16)]) -> (Frame16, Frame16) {
    let mut ab = Frame16::new(SIZE, SIZE);
    let mut depth = Frame16::new(SIZE, SIZE);
    for &(center, range) in markers {
        draw_filled_circle_mut(&mut depth, center, 9, Luma([range]));
        draw_filled_circle_mut(&mut ab, center, 6, Luma([1000u16]));
    }
    (ab, depth)
}

fn tracker(method: BlobDetectionMethod) -> ToolTracker {
    let params = TrackerParams {
        method,
        ..TrackerParams::default()
    };
    let mut tools = ToolDictionary::new();
    tools.insert(TrackedTool::new(5, "probe", tool_geometry()));
    let mut tracker = ToolTracker::new(params, tools);
    tracker.set_unmap(camera());
    tracker
}

fn frame<'a>(ab: &'a Frame16, depth: &'a Frame16) -> FrameInput<'a> {
    FrameInput {
        ab: ab.as_raw(),
        depth: depth.as_raw(),
        depth_to_world: depth_to_world().m,
    }
}

#[test]
fn tracks_tool_then_loses_it() {
    let mut tracker = tracker(BlobDetectionMethod::Basic);

    let (ab, depth) = render(&MARKERS);
    let summary = tracker.process_frame(&frame(&ab, &depth)).expect("frame");
    assert_eq!(summary.blobs_2d, 4);
    assert_eq!(summary.blobs_3d, 4);
    assert_eq!(summary.tracked_tools, 1);

    let tool = tracker.tool(5).expect("tool");
    assert!(tool.visible);
    for (a, b) in tool.pose_world.m.iter().zip(tool_pose().m.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
    }
    assert_abs_diff_eq!(tool.pose_world.rotation().determinant(), 1.0, epsilon = 1e-9);

    // Sensor pose = world pose seen from the depth camera.
    let expected_sensor = depth_to_world().inverse().compose(&tool_pose());
    for (a, b) in tool.pose_sensor.m.iter().zip(expected_sensor.m.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
    }

    // Observations follow geometry order.
    for (obs, &((x, y), _)) in tool.observed_pixels.iter().zip(MARKERS.iter()) {
        assert_abs_diff_eq!(obs.x, x as f32, epsilon = 1e-3);
        assert_abs_diff_eq!(obs.y, y as f32, epsilon = 1e-3);
    }

    let out = tracker.serialized();
    assert_eq!(out.len(), 18);
    assert_eq!(&out[..2], &[5.0, 1.0]);
    assert_abs_diff_eq!(out[14], 0.4, epsilon = 1e-4);
    assert_abs_diff_eq!(out[15], -1.2, epsilon = 1e-4);
    assert_abs_diff_eq!(out[16], 2.5, epsilon = 1e-4);

    // Second frame: only two markers remain visible.
    let (ab, depth) = render(&MARKERS[..2]);
    let summary = tracker.process_frame(&frame(&ab, &depth)).expect("frame");
    assert_eq!(summary.blobs_3d, 2);
    assert_eq!(summary.tracked_tools, 0);

    let tool = tracker.tool(5).expect("tool");
    assert!(!tool.visible);
    assert!(tool.observed_world.is_empty());
    assert!(tool.observed_pixels.is_empty());
    assert_eq!(tool.pose_world, RigidTransform::identity());
    assert_eq!(tracker.serialized()[1], 0.0);
}

#[test]
fn invalid_depth_drops_every_blob() {
    let mut tracker = tracker(BlobDetectionMethod::Basic);
    let (ab, _) = render(&MARKERS);

    let zero = Frame16::new(SIZE, SIZE);
    let summary = tracker.process_frame(&frame(&ab, &zero)).expect("frame");
    assert_eq!(summary.blobs_2d, 4);
    assert_eq!(summary.blobs_3d, 0);
    assert_eq!(summary.validation.invalid_depth, 4);

    let far = Frame16::from_pixel(SIZE, SIZE, Luma([4091u16]));
    let summary = tracker.process_frame(&frame(&ab, &far)).expect("frame");
    assert_eq!(summary.blobs_3d, 0);
    assert_eq!(tracker.tracked_tools_count(), 0);
}

#[test]
fn refined_detection_also_tracks() {
    let mut tracker = tracker(BlobDetectionMethod::RefineByScaling);
    let (ab, depth) = render(&MARKERS);
    let summary = tracker.process_frame(&frame(&ab, &depth)).expect("frame");
    assert_eq!(summary.tracked_tools, 1);

    let tool = tracker.tool(5).expect("tool");
    let t = tool.pose_world.translation();
    assert_abs_diff_eq!(t.x, 0.4, epsilon = 0.01);
    assert_abs_diff_eq!(t.y, -1.2, epsilon = 0.01);
    assert_abs_diff_eq!(t.z, 2.5, epsilon = 0.01);
}

#[test]
fn display_images_carry_marker_crosses() {
    let mut tracker = tracker(BlobDetectionMethod::Basic);
    tracker.set_display_enabled(true);
    let (ab, depth) = render(&MARKERS);
    tracker.process_frame(&frame(&ab, &depth)).expect("frame");

    let (ab_disp, depth_disp) = tracker.display_images().expect("display enabled");
    let ((x, y), _) = MARKERS[0];
    // Cross arm just outside the disk.
    assert_eq!(ab_disp.get_pixel(x as u32 + 10, y as u32)[0], 100);
    assert_eq!(depth_disp.get_pixel(x as u32, y as u32 + 11)[0], 100);
    // Brightened marker away from the cross arms.
    assert_eq!(ab_disp.get_pixel(x as u32 + 4, y as u32 + 4)[0], 250);
    // Untouched background.
    assert_eq!(ab_disp.get_pixel(10, 10)[0], 0);

    let n = (SIZE * SIZE) as usize;
    let (mut a, mut d) = (vec![0u8; n], vec![0u8; n]);
    assert!(tracker.copy_display_images(&mut a, &mut d));
    assert_eq!(a.as_slice(), ab_disp.as_raw().as_slice());
}
