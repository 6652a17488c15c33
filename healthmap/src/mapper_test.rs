#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn frac_approx_eq(a: FracPoint, b: FracPoint) -> bool {
    approx_eq(a.fx, b.fx) && approx_eq(a.fy, b.fy)
}

// --- FracPoint ---

#[test]
fn clamped_keeps_in_range_values() {
    let f = FracPoint::clamped(0.25, 0.75);
    assert_eq!(f.fx, 0.25);
    assert_eq!(f.fy, 0.75);
}

#[test]
fn clamped_pins_out_of_range_values() {
    let f = FracPoint::clamped(-0.2, 1.7);
    assert_eq!(f.fx, 0.0);
    assert_eq!(f.fy, 1.0);
}

#[test]
fn clamped_maps_nan_to_zero() {
    let f = FracPoint::clamped(f64::NAN, 0.5);
    assert_eq!(f.fx, 0.0);
}

#[test]
fn to_logical_scales_by_canvas_size() {
    let p = FracPoint::clamped(0.5, 0.5).to_logical();
    assert!(point_approx_eq(p, Point::new(200.0, 150.0)));
}

#[test]
fn from_logical_is_inverse_of_to_logical() {
    let f = FracPoint::clamped(0.123, 0.987);
    assert!(frac_approx_eq(FracPoint::from_logical(f.to_logical()), f));
}

// --- ScreenRect ---

#[test]
fn zero_width_rect_is_not_measurable() {
    assert!(!ScreenRect::sized(0.0, 100.0).is_measurable());
}

#[test]
fn nan_rect_is_not_measurable() {
    assert!(!ScreenRect::new(f64::NAN, 0.0, 10.0, 10.0).is_measurable());
}

#[test]
fn positive_rect_is_measurable() {
    assert!(ScreenRect::new(-20.0, 5.0, 10.0, 10.0).is_measurable());
}

// --- pixel_to_fraction ---

#[test]
fn pixel_to_fraction_on_small_canvas() {
    let rect = ScreenRect::sized(200.0, 150.0);
    let f = pixel_to_fraction(Point::new(100.0, 80.0), rect).unwrap();
    assert!(approx_eq(f.fx, 0.5));
    assert!(approx_eq(f.fy, 80.0 / 150.0));
}

#[test]
fn pixel_to_fraction_subtracts_box_origin() {
    let rect = ScreenRect::new(50.0, 30.0, 400.0, 300.0);
    let f = pixel_to_fraction(Point::new(150.0, 105.0), rect).unwrap();
    assert!(approx_eq(f.fx, 0.25));
    assert!(approx_eq(f.fy, 0.25));
}

#[test]
fn pixel_to_fraction_edges_are_exact() {
    let rect = ScreenRect::new(10.0, 10.0, 320.0, 240.0);
    let origin = pixel_to_fraction(Point::new(10.0, 10.0), rect).unwrap();
    let corner = pixel_to_fraction(Point::new(330.0, 250.0), rect).unwrap();
    assert_eq!(origin.fx, 0.0);
    assert_eq!(origin.fy, 0.0);
    assert_eq!(corner.fx, 1.0);
    assert_eq!(corner.fy, 1.0);
}

#[test]
fn pixel_to_fraction_clamps_outside_points() {
    let rect = ScreenRect::sized(100.0, 100.0);
    let f = pixel_to_fraction(Point::new(-5.0, 140.0), rect).unwrap();
    assert_eq!(f.fx, 0.0);
    assert_eq!(f.fy, 1.0);
}

#[test]
fn pixel_to_fraction_unmeasurable_is_none() {
    assert!(pixel_to_fraction(Point::new(1.0, 1.0), ScreenRect::sized(0.0, 0.0)).is_none());
}

// --- fraction_to_pixel ---

#[test]
fn fraction_to_pixel_on_large_canvas() {
    let rect = ScreenRect::sized(800.0, 600.0);
    let f = FracPoint { fx: 0.5, fy: 80.0 / 150.0 };
    let p = fraction_to_pixel(f, rect).unwrap();
    assert!(point_approx_eq(p, Point::new(400.0, 320.0)));
}

#[test]
fn fraction_to_pixel_adds_box_origin() {
    let rect = ScreenRect::new(100.0, 200.0, 400.0, 300.0);
    let p = fraction_to_pixel(FracPoint { fx: 0.0, fy: 1.0 }, rect).unwrap();
    assert!(point_approx_eq(p, Point::new(100.0, 500.0)));
}

#[test]
fn fraction_to_pixel_unmeasurable_is_none() {
    let rect = ScreenRect::sized(-1.0, 10.0);
    assert!(fraction_to_pixel(FracPoint { fx: 0.5, fy: 0.5 }, rect).is_none());
}

// --- Round trips ---

#[test]
fn round_trip_grid_across_box_sizes() {
    let boxes = [
        ScreenRect::sized(1.0, 1.0),
        ScreenRect::sized(200.0, 150.0),
        ScreenRect::new(13.5, -7.25, 1024.0, 333.0),
        ScreenRect::new(0.0, 0.0, 37.0, 2000.0),
    ];
    for rect in boxes {
        for i in 0..=10 {
            for j in 0..=10 {
                let f = FracPoint { fx: f64::from(i) / 10.0, fy: f64::from(j) / 10.0 };
                let back = pixel_to_fraction(fraction_to_pixel(f, rect).unwrap(), rect).unwrap();
                assert!(frac_approx_eq(f, back), "{f:?} -> {back:?} in {rect:?}");
            }
        }
    }
}

#[test]
fn marker_survives_canvas_resize() {
    let small = ScreenRect::sized(200.0, 150.0);
    let large = ScreenRect::sized(800.0, 600.0);
    let f = pixel_to_fraction(Point::new(100.0, 80.0), small).unwrap();
    let p = fraction_to_pixel(f, large).unwrap();
    assert!(point_approx_eq(p, Point::new(400.0, 320.0)));
}

// --- CoordinateMapper ---

#[test]
fn mapper_uses_current_metrics() {
    let mut mapper = CoordinateMapper::new(FixedViewport::mounted(ScreenRect::sized(200.0, 150.0)));
    let f = mapper.client_to_fraction(Point::new(100.0, 75.0)).unwrap();
    assert!(frac_approx_eq(f, FracPoint { fx: 0.5, fy: 0.5 }));

    mapper.metrics_mut().set_rect(ScreenRect::sized(400.0, 300.0));
    let p = mapper.fraction_to_client(f).unwrap();
    assert!(point_approx_eq(p, Point::new(200.0, 150.0)));
}

#[test]
fn mapper_client_to_logical() {
    let mapper = CoordinateMapper::new(FixedViewport::mounted(ScreenRect::sized(800.0, 600.0)));
    let p = mapper.client_to_logical(Point::new(400.0, 300.0)).unwrap();
    assert!(point_approx_eq(p, Point::new(200.0, 150.0)));
}

#[test]
fn unmounted_mapper_no_ops() {
    let mapper = CoordinateMapper::new(FixedViewport::unmounted());
    assert!(mapper.rect().is_none());
    assert!(mapper.client_to_fraction(Point::new(1.0, 1.0)).is_none());
    assert!(mapper.client_to_logical(Point::new(1.0, 1.0)).is_none());
    assert!(mapper.fraction_to_client(FracPoint { fx: 0.5, fy: 0.5 }).is_none());
}

#[test]
fn unmount_after_mount_no_ops() {
    let mut mapper = CoordinateMapper::new(FixedViewport::mounted(ScreenRect::sized(10.0, 10.0)));
    mapper.metrics_mut().unmount();
    assert!(mapper.client_to_fraction(Point::new(1.0, 1.0)).is_none());
}

#[test]
fn zero_sized_metrics_no_op() {
    let mapper = CoordinateMapper::new(FixedViewport::mounted(ScreenRect::sized(0.0, 0.0)));
    assert!(mapper.rect().is_none());
    assert!(mapper.client_to_fraction(Point::new(0.0, 0.0)).is_none());
}
