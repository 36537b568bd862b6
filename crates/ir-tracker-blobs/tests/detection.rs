use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use ir_tracker_blobs::{BlobDetectionMethod, BlobDetector, BlobDetectorParams};
use nalgebra::Point2;

const WHITE: Luma<u8> = Luma([250]);

fn canvas() -> GrayImage {
    GrayImage::new(256, 256)
}

fn find_near(found: &[Point2<f32>], x: f32, y: f32, tol: f32) -> bool {
    found
        .iter()
        .any(|p| (p.x - x).abs() <= tol && (p.y - y).abs() <= tol)
}

#[test]
fn detects_round_markers_with_subpixel_centroids() {
    let mut img = canvas();
    draw_filled_circle_mut(&mut img, (60, 50), 6, WHITE);
    draw_filled_circle_mut(&mut img, (180, 90), 8, WHITE);
    draw_filled_circle_mut(&mut img, (120, 200), 5, WHITE);

    let detector = BlobDetector::new(BlobDetectorParams::default());
    let found = detector.detect(&mut img);

    assert_eq!(found.len(), 3, "found {found:?}");
    assert!(find_near(&found, 60.0, 50.0, 0.05));
    assert!(find_near(&found, 180.0, 90.0, 0.05));
    assert!(find_near(&found, 120.0, 200.0, 0.05));
}

#[test]
fn rejects_tiny_huge_and_elongated_shapes() {
    let mut img = GrayImage::new(512, 512);
    // too small
    draw_filled_circle_mut(&mut img, (30, 30), 1, WHITE);
    // too large
    draw_filled_circle_mut(&mut img, (300, 300), 100, WHITE);
    // thin bar
    draw_filled_rect_mut(&mut img, Rect::at(20, 100).of_size(60, 3), WHITE);
    // crescent
    draw_filled_circle_mut(&mut img, (80, 420), 30, WHITE);
    draw_filled_circle_mut(&mut img, (88, 420), 28, Luma([0]));
    // the only valid one
    draw_filled_circle_mut(&mut img, (150, 40), 6, WHITE);

    let found = BlobDetector::default().detect(&mut img);
    assert_eq!(found.len(), 1, "found {found:?}");
    assert!(find_near(&found, 150.0, 40.0, 0.05));
}

#[test]
fn dim_blobs_below_threshold_are_ignored() {
    let mut img = canvas();
    draw_filled_circle_mut(&mut img, (60, 60), 8, Luma([180]));
    draw_filled_circle_mut(&mut img, (150, 60), 8, Luma([181]));

    let found = BlobDetector::default().detect(&mut img);
    assert_eq!(found.len(), 1);
    assert!(find_near(&found, 150.0, 60.0, 0.05));
}

#[test]
fn refined_centres_agree_with_basic_ones() {
    let mut img = canvas();
    draw_filled_circle_mut(&mut img, (70, 70), 9, WHITE);
    draw_filled_circle_mut(&mut img, (200, 120), 6, WHITE);
    // touches the border: crop margin is clamped
    draw_filled_circle_mut(&mut img, (4, 180), 7, WHITE);

    let basic = BlobDetector::default().detect(&mut img.clone());
    let refined = BlobDetector::default()
        .with_method(BlobDetectionMethod::RefineByScaling)
        .detect(&mut img);

    assert_eq!(refined.len(), basic.len());
    assert!(find_near(&refined, 70.0, 70.0, 0.5), "refined {refined:?}");
    assert!(find_near(&refined, 200.0, 120.0, 0.5), "refined {refined:?}");
}

#[test]
fn output_buffer_is_reused() {
    let mut img = canvas();
    draw_filled_circle_mut(&mut img, (60, 50), 6, WHITE);
    let mut out = vec![Point2::new(-1.0, -1.0); 5];
    BlobDetector::default().detect_into(&mut img, &mut out);
    assert_eq!(out.len(), 1);
}
