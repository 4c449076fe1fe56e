// ============================================================================
// ARC GEOMETRY
// ============================================================================

use std::f64::consts::{FRAC_PI_2, PI};

/// Nominal angular size of one tessellated arc segment.
pub const SEGMENT_DEGREES: f64 = 5.0;

/// Upper bound on segments per arc: ten full turns at [`SEGMENT_DEGREES`].
pub const MAX_STEPS: usize = 720;

/// A point in widget space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Converts a dial angle (degrees, zero pointing north) into the radians
/// expected by [`point_on_arc`] (zero pointing east).
pub fn compass_radians(degrees: f64) -> f64 {
    degrees_to_radians(degrees) - FRAC_PI_2
}

/// `center + radius * (cos(angle), sin(angle))`.
pub fn point_on_arc(center: Point, angle_radians: f64, radius: f64) -> Point {
    Point::new(
        center.x + radius * angle_radians.cos(),
        center.y + radius * angle_radians.sin(),
    )
}

/// A circular band whose inner edge may taper between its two ends.
///
/// The outer edge sits at a constant `outer_radius`; the inner edge starts
/// at `start_inner_radius` and is linearly interpolated to
/// `end_inner_radius`. Angles are radians as taken by [`point_on_arc`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnulusBand {
    pub center: Point,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub start_inner_radius: f64,
    pub end_angle: f64,
    pub end_inner_radius: f64,
}

impl AnnulusBand {
    /// Number of segments used for each of the two arcs, between one and
    /// [`MAX_STEPS`].
    pub fn steps(&self) -> usize {
        let delta = (self.end_angle - self.start_angle).abs();
        if !delta.is_finite() {
            return 1;
        }
        let steps = (delta / degrees_to_radians(SEGMENT_DEGREES)).round();
        steps.clamp(1.0, MAX_STEPS as f64) as usize
    }

    /// Walks the outline of the band as a closed polygon.
    ///
    /// Every call starts from scratch, so the iterator can be requested as
    /// many times as needed.
    pub fn points(&self) -> AnnulusPoints {
        AnnulusPoints {
            band: *self,
            steps: self.steps(),
            index: 0,
        }
    }
}

/// Outline of an [`AnnulusBand`]: outer edge start to end, then the inner
/// edge back from end to start.
///
/// Yields `2 * steps + 2` points. Each point is computed from its index
/// rather than by accumulating increments, so both explicit boundary points
/// land exactly on the requested angles.
#[derive(Debug, Clone)]
pub struct AnnulusPoints {
    band: AnnulusBand,
    steps: usize,
    index: usize,
}

impl AnnulusPoints {
    fn len_total(&self) -> usize {
        self.steps.saturating_mul(2).saturating_add(2)
    }
}

impl Iterator for AnnulusPoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let band = &self.band;
        let steps = self.steps;
        let i = self.index;
        if i >= self.len_total() {
            return None;
        }
        self.index += 1;

        let angle_delta = band.end_angle - band.start_angle;
        let point = if i < steps {
            let t = i as f64 / steps as f64;
            point_on_arc(
                band.center,
                band.start_angle + angle_delta * t,
                band.outer_radius,
            )
        } else if i == steps {
            point_on_arc(band.center, band.end_angle, band.outer_radius)
        } else if i < 2 * steps + 1 {
            let t = (i - steps - 1) as f64 / steps as f64;
            let radius_delta = band.end_inner_radius - band.start_inner_radius;
            point_on_arc(
                band.center,
                band.end_angle - angle_delta * t,
                band.end_inner_radius - radius_delta * t,
            )
        } else {
            point_on_arc(band.center, band.start_angle, band.start_inner_radius)
        };
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len_total().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AnnulusPoints {}

/// Tessellates a variable-thickness band into a closed polygon.
pub fn plot_annulus_band(
    center: Point,
    outer_radius: f64,
    start_angle: f64,
    start_inner_radius: f64,
    end_angle: f64,
    end_inner_radius: f64,
) -> AnnulusPoints {
    AnnulusBand {
        center,
        outer_radius,
        start_angle,
        start_inner_radius,
        end_angle,
        end_inner_radius,
    }
    .points()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn point_on_arc_cardinal_directions() {
        let origin = Point::new(0.0, 0.0);
        assert!(close(point_on_arc(origin, 0.0, 10.0), Point::new(10.0, 0.0)));
        assert!(close(
            point_on_arc(origin, FRAC_PI_2, 10.0),
            Point::new(0.0, 10.0)
        ));
    }

    #[test]
    fn point_on_arc_is_offset_by_center() {
        let p = point_on_arc(Point::new(5.0, -3.0), PI, 2.0);
        assert!(close(p, Point::new(3.0, -3.0)));
    }

    #[test]
    fn compass_zero_points_north() {
        let p = point_on_arc(Point::default(), compass_radians(0.0), 1.0);
        assert!(close(p, Point::new(0.0, -1.0)));
        let p = point_on_arc(Point::default(), compass_radians(90.0), 1.0);
        assert!(close(p, Point::new(1.0, 0.0)));
    }

    #[test]
    fn band_outline_order_and_endpoints() {
        let band = AnnulusBand {
            center: Point::new(50.0, 50.0),
            outer_radius: 50.0,
            start_angle: compass_radians(-90.0),
            start_inner_radius: 50.0,
            end_angle: compass_radians(90.0),
            end_inner_radius: 40.0,
        };
        let points: Vec<Point> = band.points().collect();

        // 180 degrees at 5 degrees per segment.
        assert_eq!(band.steps(), 36);
        assert_eq!(points.len(), 2 * 36 + 2);

        assert!(close(
            points[0],
            point_on_arc(band.center, band.start_angle, 50.0)
        ));
        assert!(close(points[36], point_on_arc(band.center, band.end_angle, 50.0)));
        assert!(close(points[37], point_on_arc(band.center, band.end_angle, 40.0)));
        assert!(close(
            points[points.len() - 1],
            point_on_arc(band.center, band.start_angle, 50.0)
        ));
    }

    #[test]
    fn outer_edge_stays_on_outer_radius() {
        let center = Point::new(10.0, 10.0);
        let points: Vec<Point> =
            plot_annulus_band(center, 8.0, 0.0, 6.0, 1.0, 2.0).collect();
        let steps = (points.len() - 2) / 2;
        for p in &points[..=steps] {
            let r = ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt();
            assert!((r - 8.0).abs() < EPS);
        }
    }

    #[test]
    fn inner_radius_interpolates_monotonically() {
        let center = Point::default();
        let points: Vec<Point> =
            plot_annulus_band(center, 100.0, 0.0, 90.0, PI, 60.0).collect();
        let steps = (points.len() - 2) / 2;
        let radii: Vec<f64> = points[steps + 1..]
            .iter()
            .map(|p| (p.x * p.x + p.y * p.y).sqrt())
            .collect();
        assert!((radii[0] - 60.0).abs() < EPS);
        assert!((radii[radii.len() - 1] - 90.0).abs() < EPS);
        assert!(radii.windows(2).all(|w| w[1] >= w[0] - EPS));
    }

    #[test]
    fn zero_span_still_emits_boundary_points() {
        let points: Vec<Point> =
            plot_annulus_band(Point::default(), 10.0, 0.0, 5.0, 0.0, 5.0).collect();
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn tiny_span_rounds_up_to_one_step() {
        let band = AnnulusBand {
            center: Point::default(),
            outer_radius: 1.0,
            start_angle: 0.0,
            start_inner_radius: 0.5,
            end_angle: degrees_to_radians(1.0),
            end_inner_radius: 0.5,
        };
        assert_eq!(band.steps(), 1);
    }

    #[test]
    fn reversed_span_walks_backwards() {
        let points: Vec<Point> =
            plot_annulus_band(Point::default(), 10.0, PI, 8.0, 0.0, 8.0).collect();
        assert_eq!(points.len(), 2 * 36 + 2);
        assert!(close(points[0], Point::new(-10.0, 0.0)));
        assert!(close(points[36], Point::new(10.0, 0.0)));
        // Passes through PI/2, the bottom of the circle in widget space.
        assert!(close(points[18], Point::new(0.0, 10.0)));
    }

    #[test]
    fn non_finite_angles_terminate() {
        let band = AnnulusBand {
            center: Point::default(),
            outer_radius: 1.0,
            start_angle: 0.0,
            start_inner_radius: 0.5,
            end_angle: f64::INFINITY,
            end_inner_radius: 0.5,
        };
        assert_eq!(band.points().count(), 4);
    }

    #[test]
    fn huge_span_is_capped() {
        let band = AnnulusBand {
            center: Point::default(),
            outer_radius: 1.0,
            start_angle: 0.0,
            start_inner_radius: 0.5,
            end_angle: 1e300,
            end_inner_radius: 0.5,
        };
        assert_eq!(band.steps(), MAX_STEPS);
        let points = band.points();
        assert_eq!(points.len(), 2 * MAX_STEPS + 2);
        assert_eq!(points.take(10).count(), 10);
    }

    #[test]
    fn points_are_restartable() {
        let band = AnnulusBand {
            center: Point::new(1.0, 2.0),
            outer_radius: 3.0,
            start_angle: -1.0,
            start_inner_radius: 2.0,
            end_angle: 1.0,
            end_inner_radius: 1.0,
        };
        let first: Vec<Point> = band.points().collect();
        let second: Vec<Point> = band.points().collect();
        assert_eq!(first, second);
        assert_eq!(band.points().len(), first.len());
    }
}
