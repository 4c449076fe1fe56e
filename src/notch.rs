// ============================================================================
// NOTCHES
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::observe::{Listeners, Subscription};

/// A labelled tick mark on the dial face. `angle` is in degrees, zero
/// pointing north.
#[derive(Debug, Clone, PartialEq)]
pub struct Notch {
    pub label: String,
    pub angle: f64,
}

impl Notch {
    pub fn new(label: impl Into<String>, angle: f64) -> Self {
        Self {
            label: label.into(),
            angle,
        }
    }
}

/// Structural change raised by a [`NotchCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    Inserted { index: usize },
    Removed { index: usize },
    Replaced { index: usize },
    Reset,
}

struct CollectionInner {
    items: RefCell<Vec<Notch>>,
    listeners: Listeners<CollectionChange>,
}

/// A shared, observable list of notches.
///
/// Clones are handles onto the same list. Every structural mutation is
/// stored first and then reported to subscribers.
#[derive(Clone)]
pub struct NotchCollection {
    inner: Rc<CollectionInner>,
}

impl NotchCollection {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Notch> {
        self.inner.items.borrow().get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<Notch> {
        self.inner.items.borrow().clone()
    }

    pub fn push(&self, notch: Notch) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            items.push(notch);
            items.len() - 1
        };
        self.raise(CollectionChange::Inserted { index });
    }

    /// Inserts at `index`, appending when `index` is past the end.
    pub fn insert(&self, index: usize, notch: Notch) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, notch);
            index
        };
        self.raise(CollectionChange::Inserted { index });
    }

    pub fn remove(&self, index: usize) -> Option<Notch> {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.raise(CollectionChange::Removed { index });
        }
        removed
    }

    pub fn replace(&self, index: usize, notch: Notch) -> Option<Notch> {
        let previous = {
            let mut items = self.inner.items.borrow_mut();
            items
                .get_mut(index)
                .map(|slot| std::mem::replace(slot, notch))
        };
        if previous.is_some() {
            self.raise(CollectionChange::Replaced { index });
        }
        previous
    }

    pub fn clear(&self) {
        self.inner.items.borrow_mut().clear();
        self.raise(CollectionChange::Reset);
    }

    /// True when both handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use = "dropping the subscription stops observation"]
    pub fn subscribe(&self, listener: impl Fn(&CollectionChange) + 'static) -> Subscription {
        self.inner.listeners.subscribe(listener)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn raise(&self, change: CollectionChange) {
        tracing::trace!(?change, len = self.len(), "notch collection changed");
        self.inner.listeners.notify(&change);
    }
}

impl Default for NotchCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Notch>> for NotchCollection {
    fn from(items: Vec<Notch>) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                items: RefCell::new(items),
                listeners: Listeners::new(),
            }),
        }
    }
}

impl FromIterator<Notch> for NotchCollection {
    fn from_iter<I: IntoIterator<Item = Notch>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Debug for NotchCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotchCollection")
            .field("items", &*self.inner.items.borrow())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Where a dial takes its notches from.
#[derive(Debug, Clone)]
pub enum NotchSource {
    /// A live list; structural changes trigger a rebuild.
    Observable(NotchCollection),
    /// A fixed list that is never observed.
    Fixed(Rc<[Notch]>),
}

impl NotchSource {
    pub fn to_vec(&self) -> Vec<Notch> {
        match self {
            Self::Observable(collection) => collection.to_vec(),
            Self::Fixed(notches) => notches.to_vec(),
        }
    }
}

impl From<NotchCollection> for NotchSource {
    fn from(collection: NotchCollection) -> Self {
        Self::Observable(collection)
    }
}

impl From<Vec<Notch>> for NotchSource {
    fn from(notches: Vec<Notch>) -> Self {
        Self::Fixed(notches.into())
    }
}

// ============================================================================
// SPAN AND LAYOUT
// ============================================================================

/// Angular travel of the needle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularSpan {
    pub min_angle: f64,
    pub max_angle: f64,
}

impl AngularSpan {
    pub const DEFAULT: Self = Self {
        min_angle: -150.0,
        max_angle: 150.0,
    };

    pub fn sweep(&self) -> f64 {
        self.max_angle - self.min_angle
    }

    /// Angle at fraction `t` of the way from `min_angle` to `max_angle`.
    pub fn angle_at(&self, t: f64) -> f64 {
        self.min_angle + t * self.sweep()
    }

    fn enclosing(angles: impl IntoIterator<Item = f64>) -> Option<Self> {
        angles.into_iter().fold(None, |span, angle| {
            Some(match span {
                None => Self {
                    min_angle: angle,
                    max_angle: angle,
                },
                Some(Self {
                    min_angle,
                    max_angle,
                }) => Self {
                    min_angle: min_angle.min(angle),
                    max_angle: max_angle.max(angle),
                },
            })
        })
    }
}

impl Default for AngularSpan {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Effective value bounds, always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Orders the two bounds.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// What the dial should draw after a rebuild.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotchLayout {
    pub span: AngularSpan,
    pub notches: Vec<Notch>,
}

/// Formats a notch label as a plain, culture-independent decimal.
///
/// Uses the shortest representation that parses back to the same value and
/// never switches to exponent notation.
pub fn format_label(value: f64) -> String {
    // -0.0 would otherwise print as "-0".
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub const DEFAULT_NOTCH_COUNT: usize = 11;
pub const MIN_NOTCH_COUNT: usize = 2;
/// One notch per degree of the default sweep.
pub const MAX_NOTCH_COUNT: usize = 301;

/// Tracks the dial's notch source and derives the [`NotchLayout`] from it.
///
/// At most one collection is observed at a time. Replacing the source always
/// drops the subscription on the previously held collection before
/// subscribing to the new one.
pub struct NotchController {
    source: Option<NotchSource>,
    subscription: Option<Subscription>,
    on_change: Rc<dyn Fn(&CollectionChange)>,
    default_notch_count: usize,
    layout: NotchLayout,
    generation: u64,
}

impl NotchController {
    /// `on_change` is invoked for every structural change of the observed
    /// collection; the owner is expected to route it back into
    /// [`NotchController::on_collection_changed`].
    pub fn new(default_notch_count: usize, on_change: impl Fn(&CollectionChange) + 'static) -> Self {
        Self {
            source: None,
            subscription: None,
            on_change: Rc::new(on_change),
            default_notch_count: clamp_notch_count(default_notch_count),
            layout: NotchLayout::default(),
            generation: 0,
        }
    }

    pub fn collection(&self) -> Option<&NotchSource> {
        self.source.as_ref()
    }

    /// Swaps the notch source. The caller rebuilds afterwards.
    pub fn set_collection(&mut self, source: Option<NotchSource>) {
        self.detach();
        self.source = source;
        self.attach();
        tracing::debug!(
            observing = self.is_observing(),
            explicit = self.source.is_some(),
            "notch source replaced"
        );
    }

    /// Stops observing the current collection without forgetting it.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Observes the current collection if it is observable and not already
    /// observed.
    pub fn attach(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        if let Some(NotchSource::Observable(collection)) = &self.source {
            let on_change = Rc::clone(&self.on_change);
            self.subscription = Some(collection.subscribe(move |change| on_change(change)));
        }
    }

    pub fn is_observing(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    pub fn default_notch_count(&self) -> usize {
        self.default_notch_count
    }

    pub fn set_default_notch_count(&mut self, count: usize) {
        self.default_notch_count = clamp_notch_count(count);
    }

    pub fn on_collection_changed(&mut self, change: &CollectionChange, range: ValueRange) -> &NotchLayout {
        tracing::trace!(?change, "rebuilding notches after collection change");
        self.rebuild(range)
    }

    /// Recomputes the span and the notches to draw.
    ///
    /// Without a source, `default_notch_count` notches are spread evenly over
    /// [`AngularSpan::DEFAULT`] and labelled with the matching value from
    /// `range`. With a source, the span encloses the supplied angles; an
    /// empty source keeps the default span and draws nothing.
    pub fn rebuild(&mut self, range: ValueRange) -> &NotchLayout {
        self.layout = match &self.source {
            None => generate_default_layout(self.default_notch_count, range),
            Some(source) => {
                let notches = source.to_vec();
                let span = AngularSpan::enclosing(notches.iter().map(|n| n.angle))
                    .unwrap_or(AngularSpan::DEFAULT);
                NotchLayout { span, notches }
            }
        };
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            notches = self.layout.notches.len(),
            min_angle = self.layout.span.min_angle,
            max_angle = self.layout.span.max_angle,
            "notch layout rebuilt"
        );
        &self.layout
    }

    pub fn layout(&self) -> &NotchLayout {
        &self.layout
    }

    pub fn span(&self) -> AngularSpan {
        self.layout.span
    }

    /// Number of rebuilds performed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for NotchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotchController")
            .field("source", &self.source)
            .field("observing", &self.is_observing())
            .field("default_notch_count", &self.default_notch_count)
            .field("layout", &self.layout)
            .field("generation", &self.generation)
            .finish()
    }
}

fn clamp_notch_count(count: usize) -> usize {
    if count < MIN_NOTCH_COUNT {
        tracing::warn!(
            requested = count,
            used = MIN_NOTCH_COUNT,
            "default notch count too small, clamping"
        );
        MIN_NOTCH_COUNT
    } else if count > MAX_NOTCH_COUNT {
        tracing::warn!(
            requested = count,
            used = MAX_NOTCH_COUNT,
            "default notch count too large, clamping"
        );
        MAX_NOTCH_COUNT
    } else {
        count
    }
}

fn generate_default_layout(count: usize, range: ValueRange) -> NotchLayout {
    let span = AngularSpan::DEFAULT;
    let spaces = (count.max(MIN_NOTCH_COUNT) - 1) as f64;
    let angle_step = span.sweep() / spaces;
    let value_step = range.width() / spaces;

    let notches = (0..count)
        .map(|i| {
            let i = i as f64;
            Notch::new(
                format_label(range.min + i * value_step),
                span.min_angle + i * angle_step,
            )
        })
        .collect();
    NotchLayout { span, notches }
}
