// ============================================================================
// SWOOP
// ============================================================================

use crate::config::SwoopConfig;
use crate::geometry::{compass_radians, AnnulusBand, Point};
use crate::observe::{Listeners, Subscription};

/// Angles in degrees (zero north, clockwise), thicknesses in pixels
/// measured inwards from the outer edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwoopParams {
    pub start_angle: f64,
    pub end_angle: f64,
    pub start_thickness: f64,
    pub end_thickness: f64,
}

impl Default for SwoopParams {
    fn default() -> Self {
        Self {
            start_angle: -90.0,
            end_angle: 90.0,
            start_thickness: 0.0,
            end_thickness: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwoopProperty {
    StartAngle,
    EndAngle,
    StartThickness,
    EndThickness,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwoopEvent {
    PropertyChanged(SwoopProperty),
    /// The outline changed; the host should fetch [`Swoop::polygon`] again.
    Redraw,
}

/// An arc-shaped band that tapers from `start_thickness` to
/// `end_thickness`, inscribed in the widget's bounds.
#[derive(Debug)]
pub struct Swoop {
    params: SwoopParams,
    width: f64,
    height: f64,
    loaded: bool,
    listeners: Listeners<SwoopEvent>,
}

impl Swoop {
    pub fn new(config: &SwoopConfig) -> Self {
        Self {
            params: SwoopParams {
                start_angle: config.start_angle,
                end_angle: config.end_angle,
                start_thickness: config.start_thickness,
                end_thickness: config.end_thickness,
            },
            width: config.width,
            height: config.height,
            loaded: false,
            listeners: Listeners::new(),
        }
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&SwoopEvent) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn load(&mut self) {
        self.loaded = true;
        self.listeners.notify(&SwoopEvent::Redraw);
    }

    pub fn unload(&mut self) {
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn params(&self) -> SwoopParams {
        self.params
    }

    pub fn set_start_angle(&mut self, degrees: f64) {
        self.params.start_angle = degrees;
        self.changed(SwoopProperty::StartAngle);
    }

    pub fn set_end_angle(&mut self, degrees: f64) {
        self.params.end_angle = degrees;
        self.changed(SwoopProperty::EndAngle);
    }

    pub fn set_start_thickness(&mut self, thickness: f64) {
        self.params.start_thickness = thickness;
        self.changed(SwoopProperty::StartThickness);
    }

    pub fn set_end_thickness(&mut self, thickness: f64) {
        self.params.end_thickness = thickness;
        self.changed(SwoopProperty::EndThickness);
    }

    /// Negative sizes are treated as zero.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.changed(SwoopProperty::Size);
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn outer_radius(&self) -> f64 {
        self.width.max(self.height) / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn band(&self) -> AnnulusBand {
        let outer_radius = self.outer_radius();
        AnnulusBand {
            center: self.center(),
            outer_radius,
            start_angle: compass_radians(self.params.start_angle),
            start_inner_radius: outer_radius - self.params.start_thickness,
            end_angle: compass_radians(self.params.end_angle),
            end_inner_radius: outer_radius - self.params.end_thickness,
        }
    }

    /// Closed outline of the swoop in widget coordinates.
    pub fn polygon(&self) -> Vec<Point> {
        self.band().points().collect()
    }

    /// Size changes always redraw; parameter changes only once loaded.
    fn changed(&self, property: SwoopProperty) {
        self.listeners.notify(&SwoopEvent::PropertyChanged(property));
        if self.loaded || property == SwoopProperty::Size {
            self.listeners.notify(&SwoopEvent::Redraw);
        }
    }
}

impl Default for Swoop {
    fn default() -> Self {
        Self::new(&SwoopConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPS: f64 = 1e-9;

    fn sized(width: f64, height: f64) -> Swoop {
        let mut swoop = Swoop::default();
        swoop.set_size(width, height);
        swoop
    }

    #[test]
    fn radius_follows_larger_dimension() {
        let swoop = sized(200.0, 100.0);
        assert_eq!(swoop.outer_radius(), 100.0);
        assert_eq!(swoop.center(), Point::new(100.0, 50.0));
    }

    #[test]
    fn default_swoop_spans_west_to_east_through_north() {
        let swoop = sized(100.0, 100.0);
        let polygon = swoop.polygon();

        assert_eq!(polygon.len(), 2 * 36 + 2);
        let first = polygon[0];
        assert!((first.x - 0.0).abs() < EPS && (first.y - 50.0).abs() < EPS);
        let top = polygon[18];
        assert!((top.x - 50.0).abs() < EPS && top.y.abs() < EPS);
        let east = polygon[36];
        assert!((east.x - 100.0).abs() < EPS && (east.y - 50.0).abs() < EPS);
        // End thickness 10 pulls the inner edge in at the east end.
        let inner_east = polygon[37];
        assert!((inner_east.x - 90.0).abs() < EPS);
        // Start thickness 0 closes the band back onto the outer edge.
        let last = polygon[polygon.len() - 1];
        assert!((last.x - first.x).abs() < EPS && (last.y - first.y).abs() < EPS);
    }

    #[test]
    fn collapsed_widget_yields_finite_outline() {
        let swoop = sized(0.0, 0.0);
        let polygon = swoop.polygon();
        assert!(!polygon.is_empty());
        assert!(polygon.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn equal_angles_do_not_hang() {
        let mut swoop = sized(50.0, 50.0);
        swoop.set_start_angle(30.0);
        swoop.set_end_angle(30.0);
        assert_eq!(swoop.polygon().len(), 4);
    }

    #[test]
    fn redraw_only_when_loaded() {
        let mut swoop = Swoop::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let log = Rc::clone(&log);
            swoop.subscribe(move |event| log.borrow_mut().push(*event))
        };

        swoop.set_end_thickness(4.0);
        swoop.load();
        swoop.set_start_angle(-45.0);

        assert_eq!(
            *log.borrow(),
            vec![
                SwoopEvent::PropertyChanged(SwoopProperty::EndThickness),
                SwoopEvent::Redraw,
                SwoopEvent::PropertyChanged(SwoopProperty::StartAngle),
                SwoopEvent::Redraw,
            ]
        );
        assert_eq!(swoop.params().end_thickness, 4.0);
    }

    #[test]
    fn resize_redraws_even_when_unloaded() {
        let mut swoop = Swoop::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let log = Rc::clone(&log);
            swoop.subscribe(move |event| log.borrow_mut().push(*event))
        };

        swoop.set_size(80.0, 40.0);
        assert!(!swoop.is_loaded());
        assert_eq!(
            *log.borrow(),
            vec![
                SwoopEvent::PropertyChanged(SwoopProperty::Size),
                SwoopEvent::Redraw,
            ]
        );
    }
}
