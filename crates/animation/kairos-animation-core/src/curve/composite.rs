//! Vector curve assembled from one scalar child curve per component.

use std::fmt;
use std::rc::{Rc, Weak};

use kairos_api_core::Value;

use crate::curve::{Curve, CurveInner, ValueChangeListener};
use crate::error::{AnimationError, Result};
use crate::ids::ListenerId;
use crate::interval::Interval;
use crate::invariance::Invariance;
use crate::time::Time;
use crate::types::Type;

/// Re-announces a child's change on the parent with the same interval.
struct ChildForwarder {
    parent: Weak<CurveInner>,
}

impl ValueChangeListener for ChildForwarder {
    fn on_value_change(&self, _child: &Curve, interval: Interval) {
        if let Some(inner) = self.parent.upgrade() {
            Curve { inner }.notify_value_change(interval);
        }
    }
}

/// A child curve plus the forwarding listener it holds on the parent's behalf.
/// Dropping the slot unregisters the forwarder.
struct ChildSlot {
    curve: Curve,
    listener: ListenerId,
    _forwarder: Rc<dyn ValueChangeListener>,
}

impl ChildSlot {
    fn wire(curve: Curve, parent: &Weak<CurveInner>) -> Self {
        let forwarder: Rc<dyn ValueChangeListener> = Rc::new(ChildForwarder {
            parent: parent.clone(),
        });
        let listener = curve.add_value_change_listener(Rc::downgrade(&forwarder));
        Self {
            curve,
            listener,
            _forwarder: forwarder,
        }
    }
}

impl Drop for ChildSlot {
    fn drop(&mut self) {
        self.curve.remove_value_change_listener(self.listener);
    }
}

pub struct CompositeVectorCurve {
    ty: Type,
    slots: Vec<ChildSlot>,
}

impl CompositeVectorCurve {
    /// Validate (or default) the children of a composite of type `ty`.
    pub(crate) fn checked_children(ty: &Type, children: Option<Vec<Curve>>) -> Result<Vec<Curve>> {
        let dim = Self::dimension(ty)?;
        let children = match children {
            Some(children) => children,
            None => (0..dim)
                .map(|_| Curve::constant(&Type::number(), None))
                .collect::<Result<Vec<_>>>()?,
        };
        if children.len() != dim {
            return Err(AnimationError::type_mismatch(
                format!("{dim} scalar children"),
                children.len(),
            ));
        }
        for child in &children {
            Self::check_child(child)?;
        }
        Ok(children)
    }

    pub(crate) fn wire(ty: &Type, children: Vec<Curve>, parent: &Weak<CurveInner>) -> Self {
        Self {
            ty: ty.clone(),
            slots: children
                .into_iter()
                .map(|child| ChildSlot::wire(child, parent))
                .collect(),
        }
    }

    /// Children must produce numbers. Must not be called while the parent is
    /// mutably borrowed.
    pub(crate) fn check_child(child: &Curve) -> Result<()> {
        if child.is_type_supported(&Type::number()) {
            Ok(())
        } else {
            Err(AnimationError::type_mismatch(Type::number(), child.value_type()))
        }
    }

    fn dimension(ty: &Type) -> Result<usize> {
        ty.kind()
            .vector_dimension()
            .ok_or_else(|| AnimationError::type_mismatch("vector2, vector3 or vector4", ty))
    }

    pub fn value_type(&self) -> &Type {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&Curve> {
        self.slots.get(index).map(|slot| &slot.curve)
    }

    pub fn is_type_supported(&self, ty: &Type) -> bool {
        ty.is_convertible(&self.ty)
    }

    pub fn get_value(&self, time: Time, ty: &Type) -> Value {
        let number = Type::number();
        let comps: Vec<f64> = self
            .slots
            .iter()
            .map(|slot| slot.curve.get_value(time, &number).as_number().unwrap_or(0.0))
            .collect();
        let value = Value::from_components(self.ty.kind().value_kind(), &comps)
            .unwrap_or_else(|_| self.ty.default_value());
        ty.convert_value(&self.ty, &value)
    }

    /// Constant only where every child is.
    pub fn get_invariance(&self, interval: Interval) -> Invariance {
        let children: Vec<Invariance> = self
            .slots
            .iter()
            .map(|slot| slot.curve.get_invariance(interval))
            .collect();
        Invariance::merge(&children)
    }

    pub(crate) fn set_child(
        &mut self,
        index: usize,
        child: Curve,
        parent: &Weak<CurveInner>,
    ) -> Result<Option<Interval>> {
        let len = self.slots.len();
        if index >= len {
            return Err(AnimationError::InvalidChildIndex { index, len });
        }
        self.slots[index] = ChildSlot::wire(child, parent);
        Ok(Some(Interval::UNIVERSAL))
    }

    /// `children` must already have passed `checked_children`.
    pub(crate) fn set_children(
        &mut self,
        children: Vec<Curve>,
        parent: &Weak<CurveInner>,
    ) -> Result<Option<Interval>> {
        debug_assert_eq!(children.len(), self.slots.len());
        self.slots = children
            .into_iter()
            .map(|child| ChildSlot::wire(child, parent))
            .collect();
        Ok(Some(Interval::UNIVERSAL))
    }
}

impl fmt::Debug for CompositeVectorCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeVectorCurve")
            .field("ty", &self.ty)
            .field("children", &self.slots.iter().map(|s| &s.curve).collect::<Vec<_>>())
            .finish()
    }
}
