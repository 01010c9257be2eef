//! A live (curve, type, setter) registration with an updater.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use crate::curve::Curve;
use crate::error::{AnimationError, Result};
use crate::ids::BinderId;
use crate::types::Type;
use crate::updater::{self, Setter, Updater, UpdaterState};

/// Feeds `curve` values of type `ty` into a setter on every relevant update.
/// Dropping the binder (or calling `unbind`) deregisters it.
pub struct Binder {
    id: BinderId,
    updater: Weak<RefCell<UpdaterState>>,
    curve: Curve,
    ty: Type,
}

impl Binder {
    /// Fails with `TypeMismatch` before touching the updater when `curve`
    /// cannot produce `ty`.
    pub fn bind(updater: &Updater, curve: &Curve, ty: &Type, setter: Setter) -> Result<Binder> {
        if !curve.is_type_supported(ty) {
            return Err(AnimationError::type_mismatch(ty, curve.value_type()));
        }
        let id = updater.register(curve.clone(), ty.clone(), setter);
        Ok(Binder {
            id,
            updater: updater.downgrade(),
            curve: curve.clone(),
            ty: ty.clone(),
        })
    }

    pub fn id(&self) -> BinderId {
        self.id
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn value_type(&self) -> &Type {
        &self.ty
    }

    /// Same as dropping the binder.
    pub fn unbind(self) {
        drop(self);
    }
}

impl Drop for Binder {
    fn drop(&mut self) {
        updater::unregister(&self.updater, self.id);
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("id", &self.id)
            .field("curve", &self.curve)
            .field("ty", &self.ty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairos_api_core::Value;
    use std::rc::Rc;

    fn noop() -> Setter {
        Rc::new(|_: Value| {})
    }

    #[test]
    fn unsupported_type_registers_nothing() {
        let updater = Updater::new();
        let curve = Curve::constant(&Type::vector3(), None).unwrap();
        let err = Binder::bind(&updater, &curve, &Type::boolean(), noop()).unwrap_err();
        assert_eq!(err.category(), "type");
        assert_eq!(updater.binder_count(), 0);
    }

    #[test]
    fn drop_and_unbind_deregister() {
        let updater = Updater::new();
        let curve = Curve::constant(&Type::number(), None).unwrap();
        let a = Binder::bind(&updater, &curve, &Type::number(), noop()).unwrap();
        let b = Binder::bind(&updater, &curve, &Type::boolean(), noop()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(updater.binder_count(), 2);
        a.unbind();
        assert_eq!(updater.binder_count(), 1);
        drop(b);
        assert_eq!(updater.binder_count(), 0);
    }

    #[test]
    fn outliving_the_updater_is_harmless() {
        let updater = Updater::new();
        let curve = Curve::constant(&Type::number(), None).unwrap();
        let binder = Binder::bind(&updater, &curve, &Type::number(), noop()).unwrap();
        drop(updater);
        drop(binder);
    }
}
