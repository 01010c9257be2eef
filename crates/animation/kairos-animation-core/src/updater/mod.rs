//! The incremental scheduler.
//!
//! Binders start dirty and are sampled unconditionally on the next `update`.
//! After that they are tracked per curve: the curve's invariance snapshot feeds
//! [`VaryCurves`], and a later `update` only re-samples curves whose output may
//! differ between the previous time and the new one. Curve mutations either
//! send the curve's binders back to dirty (when the applied value may be stale)
//! or patch the bookkeeping in place.

pub mod vary_curves;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hashbrown::{HashMap, HashSet};
use indexmap::IndexSet;
use kairos_api_core::Value;
use log::{debug, trace, warn};

pub use vary_curves::{CurveSet, VaryCurves};

use crate::config::Config;
use crate::curve::{Curve, ValueChangeListener};
use crate::ids::{BinderId, CurveId, IdAllocator, ListenerId};
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

/// Receives sampled values. Called synchronously from `Updater::update`.
pub type Setter = Rc<dyn Fn(Value)>;

struct BinderSlot {
    curve: Curve,
    ty: Type,
    setter: Setter,
}

impl BinderSlot {
    fn sample(&self, time: Time) -> (Setter, Value) {
        (self.setter.clone(), self.curve.get_value(time, &self.ty))
    }
}

/// Bookkeeping for a curve with at least one tracked binder.
struct Tracked {
    curve: Curve,
    invariance: Invariance,
    listener_id: ListenerId,
    _listener: Rc<dyn ValueChangeListener>,
    binders: HashSet<BinderId>,
}

struct TrackedListener {
    updater: Weak<RefCell<UpdaterState>>,
    deferred: Rc<RefCell<Vec<CurveId>>>,
}

impl ValueChangeListener for TrackedListener {
    fn on_value_change(&self, curve: &Curve, interval: Interval) {
        let Some(state) = self.updater.upgrade() else {
            return;
        };
        let Ok(mut state) = state.try_borrow_mut() else {
            debug!("curve {:?} changed while the updater was busy; deferred", curve.id());
            self.deferred.borrow_mut().push(curve.id());
            return;
        };
        state.on_value_change(curve, interval);
    }
}

pub(crate) struct UpdaterState {
    this: Weak<RefCell<UpdaterState>>,
    config: Config,
    ids: IdAllocator,
    previous_time: Option<Time>,
    binders: HashMap<BinderId, BinderSlot>,
    dirty: IndexSet<BinderId>,
    tracked: HashMap<CurveId, Tracked>,
    vary: VaryCurves,
    /// Curves whose change arrived while the state was borrowed. They are
    /// released at the start of the next update.
    deferred: Rc<RefCell<Vec<CurveId>>>,
}

impl UpdaterState {
    fn new(this: &Weak<RefCell<UpdaterState>>, config: Config) -> Self {
        Self {
            this: this.clone(),
            ids: IdAllocator::new(),
            previous_time: None,
            binders: HashMap::with_capacity(config.binder_capacity),
            dirty: IndexSet::with_capacity(config.binder_capacity),
            tracked: HashMap::with_capacity(config.curve_capacity),
            vary: VaryCurves::new(config.coalesce_ranges),
            deferred: Rc::default(),
            config,
        }
    }

    pub(crate) fn register(&mut self, curve: Curve, ty: Type, setter: Setter) -> BinderId {
        let id = self.ids.alloc_binder();
        debug!("binder {:?} bound to curve {:?} as {}", id, curve.id(), ty);
        self.binders.insert(id, BinderSlot { curve, ty, setter });
        self.dirty.insert(id);
        id
    }

    /// Forget a binder. The removed slot is handed back so the caller can drop
    /// it (and whatever its setter owns) outside the borrow.
    fn unregister(&mut self, id: BinderId) -> Option<BinderSlot> {
        let slot = self.binders.remove(&id)?;
        debug!("binder {:?} unbound", id);
        if self.dirty.shift_remove(&id) {
            return Some(slot);
        }
        let curve_id = slot.curve.id();
        let emptied = match self.tracked.get_mut(&curve_id) {
            Some(tracked) => {
                tracked.binders.remove(&id);
                tracked.binders.is_empty()
            }
            None => false,
        };
        if emptied {
            if let Some(tracked) = self.tracked.remove(&curve_id) {
                self.release(tracked);
            }
        }
        Some(slot)
    }

    fn collect_samples(&mut self, time: Time) -> Vec<(Setter, Value)> {
        self.release_deferred();
        let dirty: Vec<BinderId> = self.dirty.drain(..).collect();
        let mut calls: Vec<(Setter, Value)> = dirty
            .iter()
            .filter_map(|id| self.binders.get(id))
            .map(|slot| slot.sample(time))
            .collect();
        let fresh = calls.len();

        if let Some(previous) = self.previous_time {
            let mut stale: Vec<BinderId> = self
                .vary
                .get_vary_curves(previous, time)
                .iter()
                .filter_map(|curve| self.tracked.get(curve))
                .flat_map(|tracked| tracked.binders.iter().copied())
                .collect();
            stale.sort_unstable();
            calls.extend(
                stale
                    .iter()
                    .filter_map(|id| self.binders.get(id))
                    .map(|slot| slot.sample(time)),
            );
        }

        for id in dirty {
            self.track(id);
        }
        self.previous_time = Some(time);
        trace!(
            "update at {}: {} dirty, {} re-sampled",
            time,
            fresh,
            calls.len() - fresh
        );
        calls
    }

    fn track(&mut self, id: BinderId) {
        let Some(slot) = self.binders.get(&id) else {
            return;
        };
        let curve = slot.curve.clone();
        if let Some(tracked) = self.tracked.get_mut(&curve.id()) {
            tracked.binders.insert(id);
            return;
        }

        let invariance = curve.get_invariance(Interval::UNIVERSAL);
        let listener: Rc<dyn ValueChangeListener> = Rc::new(TrackedListener {
            updater: self.this.clone(),
            deferred: self.deferred.clone(),
        });
        let listener_id = curve.add_value_change_listener(Rc::downgrade(&listener));
        self.vary
            .add_curve(curve.id(), &invariance, Interval::UNIVERSAL);
        debug!(
            "tracking curve {:?} ({} constant regions)",
            curve.id(),
            invariance.len()
        );
        self.tracked.insert(
            curve.id(),
            Tracked {
                curve,
                invariance,
                listener_id,
                _listener: listener,
                binders: HashSet::from_iter([id]),
            },
        );
    }

    fn release_deferred(&mut self) {
        let deferred: Vec<CurveId> = self.deferred.borrow_mut().drain(..).collect();
        for curve_id in deferred {
            if let Some(tracked) = self.tracked.remove(&curve_id) {
                self.release(tracked);
            }
        }
    }

    /// Drop a curve's listener and volatility. Its remaining binders become dirty.
    fn release(&mut self, tracked: Tracked) {
        let curve_id = tracked.curve.id();
        tracked
            .curve
            .remove_value_change_listener(tracked.listener_id);
        self.vary
            .remove_curve(curve_id, &tracked.invariance, Interval::UNIVERSAL);
        let mut binders: Vec<BinderId> = tracked.binders.into_iter().collect();
        binders.sort_unstable();
        self.dirty.extend(binders);
        debug!("stopped tracking curve {:?}", curve_id);
    }

    fn on_value_change(&mut self, curve: &Curve, interval: Interval) {
        let stale = self
            .previous_time
            .map_or(true, |t| interval.includes_time(t));
        if stale {
            if let Some(tracked) = self.tracked.remove(&curve.id()) {
                self.release(tracked);
            }
            return;
        }
        let Some(tracked) = self.tracked.get_mut(&curve.id()) else {
            return;
        };
        let aligned = tracked.invariance.expand_interval_by_alignment(interval);
        let sub = curve.get_invariance(aligned);
        tracked.invariance =
            self.vary
                .modify_curve(curve.id(), interval, &sub, &tracked.invariance);
        trace!("curve {:?} changed over {}; bookkeeping patched", curve.id(), interval);
    }
}

/// Drives every binder registered with it along one timeline.
pub struct Updater {
    state: Rc<RefCell<UpdaterState>>,
}

impl Updater {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: Rc::new_cyclic(|this| RefCell::new(UpdaterState::new(this, config))),
        }
    }

    /// Bring every bound parameter up to date for `time`. Times may move in
    /// either direction.
    pub fn update(&mut self, time: impl Into<Time>) {
        let calls = self.state.borrow_mut().collect_samples(time.into());
        for (setter, value) in calls {
            setter(value);
        }
    }

    /// The time of the last `update`, `None` before the first one.
    pub fn previous_time(&self) -> Option<Time> {
        self.state.borrow().previous_time
    }

    pub fn binder_count(&self) -> usize {
        self.state.borrow().binders.len()
    }

    /// Binders waiting for their first (or a forced) sample.
    pub fn dirty_count(&self) -> usize {
        self.state.borrow().dirty.len()
    }

    pub fn tracked_curve_count(&self) -> usize {
        self.state.borrow().tracked.len()
    }

    pub fn config(&self) -> Config {
        self.state.borrow().config.clone()
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<UpdaterState>> {
        Rc::downgrade(&self.state)
    }

    pub(crate) fn register(&self, curve: Curve, ty: Type, setter: Setter) -> BinderId {
        self.state.borrow_mut().register(curve, ty, setter)
    }
}

impl Default for Updater {
    fn default() -> Self {
        Self::new()
    }
}

/// Unregister `id` from the updater behind `state`, if it is still alive.
pub(crate) fn unregister(state: &Weak<RefCell<UpdaterState>>, id: BinderId) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let removed = match state.try_borrow_mut() {
        Ok(mut state) => state.unregister(id),
        Err(_) => {
            warn!("binder {:?} dropped during an update; left registered", id);
            None
        }
    };
    drop(removed);
}
