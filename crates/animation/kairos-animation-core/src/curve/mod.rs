//! Curves: functions from time to a typed value, with change notification.
//!
//! A [`Curve`] is a cheap shared handle over one of a closed set of variants.
//! Every mutation goes through the handle, which releases its internal borrow
//! before telling listeners which time range changed, so listeners may read the
//! curve back while being notified.

pub mod composite;
pub mod constant;
pub mod keyframes;
pub mod linear;
pub mod slerp;
pub mod step;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use kairos_api_core::Value;

pub use composite::CompositeVectorCurve;
pub use constant::ConstantCurve;
pub use keyframes::{search_key_frame, KeyFrame};
pub use linear::LinearCurve;
pub use slerp::SlerpCurve;
pub use step::StepCurve;

use crate::error::{AnimationError, Result};
use crate::ids::{CurveId, IdAllocator, ListenerId};
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

/// Receives the (non-empty) time range over which a curve's output changed.
pub trait ValueChangeListener {
    fn on_value_change(&self, curve: &Curve, interval: Interval);
}

#[derive(Debug)]
pub enum CurveKind {
    Constant(ConstantCurve),
    Step(StepCurve),
    Linear(LinearCurve),
    Slerp(SlerpCurve),
    Composite(CompositeVectorCurve),
}

impl CurveKind {
    pub fn name(&self) -> &'static str {
        match self {
            CurveKind::Constant(_) => "constant",
            CurveKind::Step(_) => "step",
            CurveKind::Linear(_) => "linear",
            CurveKind::Slerp(_) => "slerp",
            CurveKind::Composite(_) => "composite",
        }
    }

    fn value_type(&self) -> Type {
        match self {
            CurveKind::Constant(c) => c.value_type().clone(),
            CurveKind::Step(c) => c.value_type().clone(),
            CurveKind::Linear(c) => c.value_type().clone(),
            CurveKind::Slerp(_) => Type::vector4(),
            CurveKind::Composite(c) => c.value_type().clone(),
        }
    }

    fn is_type_supported(&self, ty: &Type) -> bool {
        match self {
            CurveKind::Constant(c) => c.is_type_supported(ty),
            CurveKind::Step(c) => c.is_type_supported(ty),
            CurveKind::Linear(c) => c.is_type_supported(ty),
            CurveKind::Slerp(c) => c.is_type_supported(ty),
            CurveKind::Composite(c) => c.is_type_supported(ty),
        }
    }

    fn get_value(&self, time: Time, ty: &Type) -> Value {
        match self {
            CurveKind::Constant(c) => c.get_value(time, ty),
            CurveKind::Step(c) => c.get_value(time, ty),
            CurveKind::Linear(c) => c.get_value(time, ty),
            CurveKind::Slerp(c) => c.get_value(time, ty),
            CurveKind::Composite(c) => c.get_value(time, ty),
        }
    }

    fn get_invariance(&self, interval: Interval) -> Invariance {
        match self {
            CurveKind::Constant(c) => c.get_invariance(interval),
            CurveKind::Step(c) => c.get_invariance(interval),
            CurveKind::Linear(c) => c.get_invariance(interval),
            CurveKind::Slerp(c) => c.get_invariance(interval),
            CurveKind::Composite(c) => c.get_invariance(interval),
        }
    }

    fn unsupported(&self, operation: &'static str) -> AnimationError {
        AnimationError::UnsupportedOperation {
            operation,
            curve: self.name(),
        }
    }
}

#[derive(Default)]
struct Listeners {
    ids: IdAllocator,
    entries: Vec<(ListenerId, Weak<dyn ValueChangeListener>)>,
}

pub(crate) struct CurveInner {
    id: CurveId,
    kind: RefCell<CurveKind>,
    listeners: RefCell<Listeners>,
}

impl CurveInner {
    fn new(kind: CurveKind) -> Self {
        Self {
            id: CurveId::next(),
            kind: RefCell::new(kind),
            listeners: RefCell::new(Listeners::default()),
        }
    }
}

/// Shared curve handle. Clones refer to the same curve; equality is identity.
#[derive(Clone)]
pub struct Curve {
    inner: Rc<CurveInner>,
}

impl Curve {
    fn from_kind(kind: CurveKind) -> Self {
        Self {
            inner: Rc::new(CurveInner::new(kind)),
        }
    }

    pub fn constant(ty: &Type, value: Option<Value>) -> Result<Curve> {
        Ok(Self::from_kind(CurveKind::Constant(ConstantCurve::new(ty, value)?)))
    }

    pub fn step(ty: &Type, frames: Option<&[KeyFrame]>) -> Result<Curve> {
        Ok(Self::from_kind(CurveKind::Step(StepCurve::new(ty, frames)?)))
    }

    pub fn linear(ty: &Type, frames: Option<&[KeyFrame]>) -> Result<Curve> {
        Ok(Self::from_kind(CurveKind::Linear(LinearCurve::new(ty, frames)?)))
    }

    /// Quaternion curve over `vector4`.
    pub fn slerp(frames: Option<&[KeyFrame]>) -> Result<Curve> {
        Ok(Self::from_kind(CurveKind::Slerp(SlerpCurve::new(frames)?)))
    }

    /// Vector curve of `ty` (vector2/3/4) assembled from one scalar child per
    /// component. Children default to number constants at 0.
    pub fn composite(ty: &Type, children: Option<Vec<Curve>>) -> Result<Curve> {
        let children = CompositeVectorCurve::checked_children(ty, children)?;
        let inner = Rc::new_cyclic(|parent| {
            CurveInner::new(CurveKind::Composite(CompositeVectorCurve::wire(
                ty, children, parent,
            )))
        });
        Ok(Curve { inner })
    }

    pub fn id(&self) -> CurveId {
        self.inner.id
    }

    /// Borrow the variant. Do not hold the borrow across a mutation of this curve.
    pub fn kind(&self) -> Ref<'_, CurveKind> {
        self.inner.kind.borrow()
    }

    /// The type values are produced in before conversion.
    pub fn value_type(&self) -> Type {
        self.inner.kind.borrow().value_type()
    }

    pub fn is_type_supported(&self, ty: &Type) -> bool {
        self.inner.kind.borrow().is_type_supported(ty)
    }

    /// Value at `time` converted to `ty`. Callers check `is_type_supported` first.
    pub fn get_value(&self, time: Time, ty: &Type) -> Value {
        self.inner.kind.borrow().get_value(time, ty)
    }

    /// Constant regions inside or crossing `interval`.
    pub fn get_invariance(&self, interval: Interval) -> Invariance {
        self.inner.kind.borrow().get_invariance(interval)
    }

    pub fn key_frames(&self) -> Option<Vec<KeyFrame>> {
        match &*self.inner.kind.borrow() {
            CurveKind::Step(c) => Some(c.key_frames()),
            CurveKind::Linear(c) => Some(c.key_frames()),
            CurveKind::Slerp(c) => Some(c.key_frames()),
            CurveKind::Constant(_) | CurveKind::Composite(_) => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<Curve> {
        match &*self.inner.kind.borrow() {
            CurveKind::Composite(c) => c.child(index).cloned(),
            _ => None,
        }
    }

    pub fn set_constant_value(&self, value: Value) -> Result<()> {
        let changed = match &mut *self.inner.kind.borrow_mut() {
            CurveKind::Constant(c) => c.set_constant_value(value)?,
            other => return Err(other.unsupported("set_constant_value")),
        };
        self.notify_changed(changed);
        Ok(())
    }

    pub fn set_key_frames(&self, frames: &[KeyFrame]) -> Result<()> {
        let changed = match &mut *self.inner.kind.borrow_mut() {
            CurveKind::Step(c) => c.set_key_frames(frames)?,
            CurveKind::Linear(c) => c.set_key_frames(frames)?,
            CurveKind::Slerp(c) => c.set_key_frames(frames)?,
            other => return Err(other.unsupported("set_key_frames")),
        };
        self.notify_changed(changed);
        Ok(())
    }

    pub fn set_child(&self, index: usize, child: Curve) -> Result<()> {
        // checking the child borrows it, and the child may be this curve
        self.ensure_composite("set_child")?;
        CompositeVectorCurve::check_child(&child)?;
        let parent = Rc::downgrade(&self.inner);
        let changed = match &mut *self.inner.kind.borrow_mut() {
            CurveKind::Composite(c) => c.set_child(index, child, &parent)?,
            other => return Err(other.unsupported("set_child")),
        };
        self.notify_changed(changed);
        Ok(())
    }

    pub fn set_children(&self, children: Vec<Curve>) -> Result<()> {
        self.ensure_composite("set_children")?;
        let children = CompositeVectorCurve::checked_children(&self.value_type(), Some(children))?;
        let parent = Rc::downgrade(&self.inner);
        let changed = match &mut *self.inner.kind.borrow_mut() {
            CurveKind::Composite(c) => c.set_children(children, &parent)?,
            other => return Err(other.unsupported("set_children")),
        };
        self.notify_changed(changed);
        Ok(())
    }

    fn ensure_composite(&self, operation: &'static str) -> Result<()> {
        match &*self.inner.kind.borrow() {
            CurveKind::Composite(_) => Ok(()),
            other => Err(other.unsupported(operation)),
        }
    }

    /// Register a listener. The curve only keeps a weak reference; the caller
    /// owns the listener and removes it with the returned id.
    pub fn add_value_change_listener(&self, listener: Weak<dyn ValueChangeListener>) -> ListenerId {
        let mut listeners = self.inner.listeners.borrow_mut();
        let id = listeners.ids.alloc_listener();
        listeners.entries.push((id, listener));
        id
    }

    /// Returns whether `id` was registered.
    pub fn remove_value_change_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|(lid, _)| *lid != id);
        listeners.entries.len() != before
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .entries
            .iter()
            .filter(|(_, l)| l.strong_count() > 0)
            .count()
    }

    fn notify_changed(&self, changed: Option<Interval>) {
        if let Some(interval) = changed {
            self.notify_value_change(interval);
        }
    }

    /// Call every live listener with `interval`. Empty intervals are dropped.
    pub(crate) fn notify_value_change(&self, interval: Interval) {
        if interval.is_empty() {
            return;
        }
        let live: Vec<Rc<dyn ValueChangeListener>> = {
            let mut listeners = self.inner.listeners.borrow_mut();
            listeners.entries.retain(|(_, l)| l.strong_count() > 0);
            listeners
                .entries
                .iter()
                .filter_map(|(_, l)| l.upgrade())
                .collect()
        };
        for listener in live {
            listener.on_value_change(self, interval);
        }
    }
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Curve {}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner.kind.try_borrow() {
            Ok(kind) => kind.name(),
            Err(_) => "<borrowed>",
        };
        f.debug_struct("Curve")
            .field("id", &self.inner.id)
            .field("kind", &kind)
            .finish()
    }
}
