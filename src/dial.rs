// ============================================================================
// DIAL360
// ============================================================================
//
// The toolkit-independent half of the Dial360 gauge.
//
// A `Dial360` owns a `GaugeModel` and a `NotchController` and keeps
// them in step: changing the bounds or the notch source rebuilds the notch
// layout, and every change that moves the needle is reported to the host as
// a `DialEvent::NeedleRetarget` once the dial is loaded.
//
// Host listeners are always invoked after the dial has released its own
// state, so they may freely call back into the dial or mutate the notch
// collection.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::Dial360Config;
use crate::gauge::{AnimationRequest, GaugeModel};
use crate::notch::{AngularSpan, CollectionChange, NotchController, NotchLayout, NotchSource};
use crate::observe::{Listeners, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialProperty {
    Value,
    Minimum,
    Maximum,
    Label,
    Notches,
    DefaultNotchCount,
    AnimationDuration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialEvent {
    PropertyChanged(DialProperty),
    NotchesRebuilt { span: AngularSpan, count: usize },
    NeedleRetarget { angle: f64, duration: Duration },
}

struct DialCore {
    gauge: GaugeModel,
    notches: NotchController,
    loaded: bool,
}

impl DialCore {
    fn rebuild(&mut self, events: &mut Vec<DialEvent>) {
        self.notches.rebuild(self.gauge.real_range());
        self.apply_layout(events);
    }

    fn collection_changed(&mut self, change: &CollectionChange, events: &mut Vec<DialEvent>) {
        self.notches
            .on_collection_changed(change, self.gauge.real_range());
        self.apply_layout(events);
        self.retarget(events);
    }

    fn apply_layout(&mut self, events: &mut Vec<DialEvent>) {
        let layout = self.notches.layout();
        let (span, count) = (layout.span, layout.notches.len());
        self.gauge.set_span(span);
        if self.loaded {
            events.push(DialEvent::NotchesRebuilt { span, count });
        }
    }

    fn retarget(&self, events: &mut Vec<DialEvent>) {
        if self.loaded {
            events.push(DialEvent::NeedleRetarget {
                angle: self.gauge.needle_angle(),
                duration: self.gauge.animation_duration(),
            });
        }
    }

    fn rebuild_and_retarget(&mut self, events: &mut Vec<DialEvent>) {
        self.rebuild(events);
        self.retarget(events);
    }
}

struct Shared {
    core: RefCell<DialCore>,
    listeners: Listeners<DialEvent>,
}

impl Shared {
    fn update<R>(&self, f: impl FnOnce(&mut DialCore, &mut Vec<DialEvent>) -> R) -> R {
        let mut events = Vec::new();
        let result = {
            let mut core = self.core.borrow_mut();
            f(&mut *core, &mut events)
        };
        self.dispatch(&events);
        result
    }

    // Collections are only mutated by the host, never from inside `update`,
    // so `core` is free here.
    fn collection_changed(&self, change: &CollectionChange) {
        self.update(|core, events| core.collection_changed(change, events));
    }

    fn dispatch(&self, events: &[DialEvent]) {
        for event in events {
            self.listeners.notify(event);
        }
    }
}

/// A circular needle gauge with labelled notches.
///
/// Cloning yields another handle onto the same dial.
#[derive(Clone)]
pub struct Dial360 {
    shared: Rc<Shared>,
}

impl Dial360 {
    pub fn new(config: &Dial360Config) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let notches = NotchController::new(config.default_notch_count, move |change| {
                if let Some(shared) = weak.upgrade() {
                    shared.collection_changed(change);
                }
            });

            let mut gauge = GaugeModel::new(config.minimum, config.maximum);
            gauge.set_value(config.value);
            gauge.set_label(config.label.clone());
            gauge.set_animation_duration(config.animation_duration);

            Shared {
                core: RefCell::new(DialCore {
                    gauge,
                    notches,
                    loaded: false,
                }),
                listeners: Listeners::new(),
            }
        });

        let dial = Self { shared };
        dial.shared.update(|core, events| {
            core.notches.set_collection(config.notches.clone());
            core.rebuild(events);
        });
        dial
    }

    /// Registers a host listener for [`DialEvent`]s.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&DialEvent) + 'static) -> Subscription {
        self.shared.listeners.subscribe(listener)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Starts observing the notch collection, rebuilds, and requests an
    /// initial needle animation.
    pub fn load(&self) {
        self.shared.update(|core, events| {
            core.loaded = true;
            core.notches.attach();
            core.rebuild_and_retarget(events);
        });
        tracing::debug!("dial loaded");
    }

    /// Stops observing the notch collection. No animation or rebuild events
    /// are raised until the next [`Dial360::load`].
    pub fn unload(&self) {
        self.shared.update(|core, _| {
            core.loaded = false;
            core.notches.detach();
        });
        tracing::debug!("dial unloaded");
    }

    pub fn is_loaded(&self) -> bool {
        self.shared.core.borrow().loaded
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    pub fn value(&self) -> f64 {
        self.shared.core.borrow().gauge.value()
    }

    pub fn set_value(&self, value: f64) {
        self.shared.update(|core, events| {
            core.gauge.set_value(value);
            events.push(DialEvent::PropertyChanged(DialProperty::Value));
            core.retarget(events);
        });
    }

    pub fn minimum(&self) -> f64 {
        self.shared.core.borrow().gauge.minimum()
    }

    pub fn set_minimum(&self, minimum: f64) {
        self.shared.update(|core, events| {
            core.gauge.set_minimum(minimum);
            events.push(DialEvent::PropertyChanged(DialProperty::Minimum));
            core.rebuild_and_retarget(events);
        });
    }

    pub fn maximum(&self) -> f64 {
        self.shared.core.borrow().gauge.maximum()
    }

    pub fn set_maximum(&self, maximum: f64) {
        self.shared.update(|core, events| {
            core.gauge.set_maximum(maximum);
            events.push(DialEvent::PropertyChanged(DialProperty::Maximum));
            core.rebuild_and_retarget(events);
        });
    }

    pub fn label(&self) -> String {
        self.shared.core.borrow().gauge.label().to_owned()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        self.shared.update(|core, events| {
            core.gauge.set_label(label);
            events.push(DialEvent::PropertyChanged(DialProperty::Label));
        });
    }

    pub fn animation_duration(&self) -> Duration {
        self.shared.core.borrow().gauge.animation_duration()
    }

    /// Only affects animations requested after the change.
    pub fn set_animation_duration(&self, duration: Duration) {
        self.shared.update(|core, events| {
            core.gauge.set_animation_duration(duration);
            events.push(DialEvent::PropertyChanged(DialProperty::AnimationDuration));
        });
    }

    pub fn notches(&self) -> Option<NotchSource> {
        self.shared.core.borrow().notches.collection().cloned()
    }

    /// Replaces the notch source. `None` switches to generated notches.
    pub fn set_notches(&self, notches: Option<NotchSource>) {
        self.shared.update(|core, events| {
            core.notches.set_collection(notches);
            events.push(DialEvent::PropertyChanged(DialProperty::Notches));
            core.rebuild_and_retarget(events);
        });
    }

    pub fn default_notch_count(&self) -> usize {
        self.shared.core.borrow().notches.default_notch_count()
    }

    /// Counts are clamped to `MIN_NOTCH_COUNT..=MAX_NOTCH_COUNT`.
    pub fn set_default_notch_count(&self, count: usize) {
        self.shared.update(|core, events| {
            core.notches.set_default_notch_count(count);
            events.push(DialEvent::PropertyChanged(DialProperty::DefaultNotchCount));
            core.rebuild_and_retarget(events);
        });
    }

    // ------------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------------

    pub fn real_minimum(&self) -> f64 {
        self.shared.core.borrow().gauge.real_minimum()
    }

    pub fn real_maximum(&self) -> f64 {
        self.shared.core.borrow().gauge.real_maximum()
    }

    pub fn normalized_value(&self) -> f64 {
        self.shared.core.borrow().gauge.normalized_value()
    }

    pub fn needle_angle(&self) -> f64 {
        self.shared.core.borrow().gauge.needle_angle()
    }

    pub fn span(&self) -> AngularSpan {
        self.shared.core.borrow().gauge.span()
    }

    pub fn layout(&self) -> NotchLayout {
        self.shared.core.borrow().notches.layout().clone()
    }

    pub fn is_observing_notches(&self) -> bool {
        self.shared.core.borrow().notches.is_observing()
    }

    /// Number of notch rebuilds so far.
    pub fn rebuild_count(&self) -> u64 {
        self.shared.core.borrow().notches.generation()
    }

    /// Animation parameters from the needle's rendered angle to the target
    /// for the current value.
    pub fn animation_request(&self, current_angle: f64) -> AnimationRequest {
        self.shared.core.borrow().gauge.animation_request(current_angle)
    }
}

impl Default for Dial360 {
    fn default() -> Self {
        Self::new(&Dial360Config::default())
    }
}

impl fmt::Debug for Dial360 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("Dial360")
            .field("gauge", &core.gauge)
            .field("notches", &core.notches)
            .field("loaded", &core.loaded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notch::{Notch, NotchCollection};

    fn record(dial: &Dial360) -> (Rc<RefCell<Vec<DialEvent>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = {
            let log = Rc::clone(&log);
            dial.subscribe(move |event| log.borrow_mut().push(event.clone()))
        };
        (log, sub)
    }

    fn retargets(log: &RefCell<Vec<DialEvent>>) -> Vec<f64> {
        log.borrow()
            .iter()
            .filter_map(|event| match event {
                DialEvent::NeedleRetarget { angle, .. } => Some(*angle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn generates_default_notches() {
        let dial = Dial360::default();
        let layout = dial.layout();
        assert_eq!(layout.span, AngularSpan::DEFAULT);
        assert_eq!(layout.notches.len(), 11);
        assert_eq!(layout.notches[10], Notch::new("100", 150.0));
    }

    #[test]
    fn value_change_retargets_only_when_loaded() {
        let dial = Dial360::default();
        let (log, _sub) = record(&dial);

        dial.set_value(50.0);
        assert!(retargets(&log).is_empty());
        assert_eq!(
            log.borrow()[0],
            DialEvent::PropertyChanged(DialProperty::Value)
        );

        dial.load();
        dial.set_value(100.0);
        assert_eq!(retargets(&log), vec![0.0, 150.0]);
    }

    #[test]
    fn value_past_maximum_targets_max_angle() {
        let config = Dial360Config::builder()
            .minimum(50.0)
            .maximum(100.0)
            .value(75.0)
            .build();
        let dial = Dial360::new(&config);
        dial.load();
        let from = dial.needle_angle();

        dial.set_value(120.0);
        let request = dial.animation_request(from);
        assert_eq!(request.from, 0.0);
        assert_eq!(request.to, 150.0);
        assert_eq!(request.duration, Duration::from_millis(750));
    }

    #[test]
    fn bounds_change_relabels_generated_notches() {
        let dial = Dial360::default();
        dial.set_minimum(200.0);
        let labels: Vec<String> = dial.layout().notches.into_iter().map(|n| n.label).collect();
        assert_eq!(labels.first().map(String::as_str), Some("100"));
        assert_eq!(labels.last().map(String::as_str), Some("200"));
        assert_eq!(dial.real_minimum(), 100.0);
        assert_eq!(dial.real_maximum(), 200.0);
    }

    #[test]
    fn live_collection_changes_move_the_needle() {
        let notches = NotchCollection::from_iter([Notch::new("A", -150.0), Notch::new("B", 150.0)]);
        let config = Dial360Config::builder()
            .minimum(0.0)
            .maximum(100.0)
            .value(50.0)
            .notches(notches.clone().into())
            .build();
        let dial = Dial360::new(&config);
        dial.load();
        assert_eq!(dial.needle_angle(), 0.0);

        let (log, _sub) = record(&dial);
        notches.push(Notch::new("C", 170.0));
        assert_eq!(dial.span().max_angle, 170.0);
        assert_eq!(dial.needle_angle(), 10.0);
        assert_eq!(retargets(&log), vec![10.0]);
        assert!(log.borrow().contains(&DialEvent::NotchesRebuilt {
            span: AngularSpan {
                min_angle: -150.0,
                max_angle: 170.0
            },
            count: 3
        }));
    }

    #[test]
    fn swapped_out_collection_is_ignored() {
        let first = NotchCollection::from_iter([Notch::new("A", -150.0)]);
        let second = NotchCollection::from_iter([Notch::new("B", 10.0)]);
        let third = NotchCollection::from_iter([Notch::new("C", 20.0)]);
        let dial = Dial360::default();
        dial.load();

        dial.set_notches(Some(first.clone().into()));
        dial.set_notches(Some(second.clone().into()));
        dial.set_notches(Some(third.clone().into()));
        assert_eq!(first.observer_count(), 0);
        assert_eq!(second.observer_count(), 0);
        assert_eq!(third.observer_count(), 1);

        let before = dial.rebuild_count();
        second.push(Notch::new("stale", 99.0));
        first.clear();
        assert_eq!(dial.rebuild_count(), before);

        third.push(Notch::new("D", 30.0));
        assert_eq!(dial.rebuild_count(), before + 1);
    }

    #[test]
    fn swap_during_collection_notify_skips_old_collection() {
        let old = NotchCollection::from_iter([Notch::new("A", -150.0)]);
        let new = NotchCollection::from_iter([Notch::new("B", 40.0)]);
        let dial = Dial360::default();

        let _swap = {
            let dial = dial.clone();
            let new = new.clone();
            old.subscribe(move |_| dial.set_notches(Some(new.clone().into())))
        };
        dial.set_notches(Some(old.clone().into()));
        dial.load();

        let before = dial.rebuild_count();
        old.push(Notch::new("stale", 99.0));
        assert_eq!(dial.rebuild_count(), before + 1);
        assert_eq!(dial.layout().notches, vec![Notch::new("B", 40.0)]);
        assert_eq!(old.observer_count(), 1);
    }

    #[test]
    fn same_collection_set_twice_observes_once() {
        let notches = NotchCollection::new();
        let dial = Dial360::default();
        dial.load();
        dial.set_notches(Some(notches.clone().into()));
        dial.set_notches(Some(notches.clone().into()));
        assert_eq!(notches.observer_count(), 1);

        let before = dial.rebuild_count();
        notches.push(Notch::new("x", 0.0));
        assert_eq!(dial.rebuild_count(), before + 1);
    }

    #[test]
    fn empty_collection_uses_default_span() {
        let dial = Dial360::default();
        dial.set_notches(Some(NotchCollection::new().into()));
        let layout = dial.layout();
        assert_eq!(layout.span, AngularSpan::DEFAULT);
        assert!(layout.notches.is_empty());
    }

    #[test]
    fn unload_stops_observing_and_load_catches_up() {
        let notches = NotchCollection::from_iter([Notch::new("A", -90.0), Notch::new("B", 90.0)]);
        let dial = Dial360::default();
        dial.set_notches(Some(notches.clone().into()));
        assert!(dial.is_observing_notches());

        dial.load();
        assert_eq!(notches.observer_count(), 1);
        dial.unload();
        assert!(!dial.is_observing_notches());
        assert_eq!(notches.observer_count(), 0);

        let before = dial.rebuild_count();
        notches.push(Notch::new("C", 120.0));
        assert_eq!(dial.rebuild_count(), before);
        assert_eq!(dial.span().max_angle, 90.0);

        dial.load();
        assert_eq!(dial.span().max_angle, 120.0);
        assert_eq!(notches.observer_count(), 1);
    }

    #[test]
    fn listener_may_mutate_collection() {
        let notches = NotchCollection::from_iter([Notch::new("A", -150.0), Notch::new("B", 150.0)]);
        let dial = Dial360::default();
        dial.set_notches(Some(notches.clone().into()));
        dial.load();

        let _sub = {
            let notches = notches.clone();
            dial.subscribe(move |event| {
                if *event == DialEvent::PropertyChanged(DialProperty::Label) {
                    notches.push(Notch::new("Z", 160.0));
                }
            })
        };
        dial.set_label("speed");
        assert_eq!(dial.label(), "speed");
        assert_eq!(dial.span().max_angle, 160.0);
    }

    #[test]
    fn collection_listener_may_mutate_collection() {
        let notches = NotchCollection::from_iter([Notch::new("A", -150.0)]);
        let dial = Dial360::default();
        dial.set_notches(Some(notches.clone().into()));
        dial.load();

        let _echo = {
            let inner = notches.clone();
            notches.subscribe(move |change| {
                if *change == (CollectionChange::Inserted { index: 1 }) {
                    inner.push(Notch::new("echo", 170.0));
                }
            })
        };
        let before = dial.rebuild_count();
        notches.push(Notch::new("B", 150.0));
        assert_eq!(dial.rebuild_count(), before + 2);
        assert_eq!(dial.span().max_angle, 170.0);
        assert_eq!(dial.needle_angle(), dial.span().min_angle);
    }

    #[test]
    fn fixed_notches_are_not_observed() {
        let dial = Dial360::default();
        dial.load();
        dial.set_notches(Some(vec![Notch::new("lo", -30.0), Notch::new("hi", 60.0)].into()));
        assert!(!dial.is_observing_notches());
        assert_eq!(
            dial.span(),
            AngularSpan {
                min_angle: -30.0,
                max_angle: 60.0
            }
        );
    }

    #[test]
    fn default_notch_count_is_clamped() {
        let dial = Dial360::default();
        dial.set_default_notch_count(1);
        assert_eq!(dial.default_notch_count(), 2);
        assert_eq!(dial.layout().notches.len(), 2);
    }

    #[test]
    fn property_events_are_raised() {
        let dial = Dial360::default();
        let (log, _sub) = record(&dial);
        dial.set_animation_duration(Duration::from_secs(1));
        dial.set_maximum(10.0);
        dial.set_notches(None);
        let properties: Vec<DialProperty> = log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                DialEvent::PropertyChanged(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            properties,
            vec![
                DialProperty::AnimationDuration,
                DialProperty::Maximum,
                DialProperty::Notches
            ]
        );
        assert_eq!(dial.animation_duration(), Duration::from_secs(1));
    }
}
