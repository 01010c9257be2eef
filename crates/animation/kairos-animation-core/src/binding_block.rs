//! Per-owner tables of bindable parameters.
//!
//! An owner (a camera, a material, a scene node) declares the parameters it can
//! expose, each with the types it accepts and a setter. Binding a curve to a
//! parameter creates the [`Binder`]; the block keeps at most one per parameter.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;

use crate::binder::Binder;
use crate::curve::Curve;
use crate::error::{AnimationError, Result};
use crate::types::Type;
use crate::updater::{Setter, Updater};

/// Picks the concrete type for a parameter from the curve being bound.
pub type TypeResolver = Rc<dyn Fn(&Curve) -> Option<Type>>;

/// A declared parameter and the types it accepts.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub types: Vec<Type>,
}

pub trait BindingBlock {
    fn enum_supported_parameters(&self) -> Vec<Parameter>;

    fn is_bound(&self, id: &str) -> bool;

    /// Curve currently bound to `id`.
    fn bound_curve(&self, id: &str) -> Option<Curve>;

    /// Bind `curve` to `id`. Any previous binding is released first, so a
    /// failed bind leaves `id` unbound.
    fn bind(&mut self, id: &str, updater: &Updater, curve: &Curve) -> Result<()>;

    /// No-op when `id` is not bound.
    fn unbind(&mut self, id: &str);

    fn unbind_all(&mut self);

    /// `unbind_all` on this block and on every descendant the owner registered.
    fn unbind_all_recursively(&mut self);
}

struct Entry {
    types: Vec<Type>,
    resolver: Option<TypeResolver>,
    setter: Setter,
    binder: Option<Binder>,
}

impl Entry {
    fn resolve(&self, curve: &Curve) -> Option<Type> {
        match &self.resolver {
            Some(resolver) => resolver(curve).filter(|ty| self.types.contains(ty)),
            None => self.types.first().cloned(),
        }
    }

    fn describe_types(&self) -> String {
        self.types
            .iter()
            .map(|ty| ty.name())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Ready-made `BindingBlock` driven by `add_entry` declarations.
#[derive(Default)]
pub struct EasyBindingBlock {
    entries: IndexMap<String, Entry>,
    descendants: Vec<Box<dyn FnMut()>>,
}

impl EasyBindingBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or re-declare) parameter `id`. A resolver is required when more
    /// than one type is listed. Re-declaring unbinds the old entry's binding.
    pub fn add_entry(
        &mut self,
        id: impl Into<String>,
        types: Vec<Type>,
        resolver: Option<TypeResolver>,
        setter: Setter,
    ) -> Result<()> {
        let id = id.into();
        if types.len() >= 2 && resolver.is_none() {
            return Err(AnimationError::MissingTypeResolver { id });
        }
        let entry = Entry {
            types,
            resolver,
            setter,
            binder: None,
        };
        if let Some(old) = self.entries.insert(id.clone(), entry) {
            if old.binder.is_some() {
                debug!("parameter {id} redeclared; old binding released");
            }
        }
        Ok(())
    }

    /// Register a callback run by `unbind_all_recursively`, typically one that
    /// unbinds a child owner's block.
    pub fn add_descendant_unbinder(&mut self, unbinder: impl FnMut() + 'static) {
        self.descendants.push(Box::new(unbinder));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BindingBlock for EasyBindingBlock {
    fn enum_supported_parameters(&self) -> Vec<Parameter> {
        self.entries
            .iter()
            .map(|(id, entry)| Parameter {
                id: id.clone(),
                types: entry.types.clone(),
            })
            .collect()
    }

    fn is_bound(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.binder.is_some())
    }

    fn bound_curve(&self, id: &str) -> Option<Curve> {
        self.entries
            .get(id)
            .and_then(|entry| entry.binder.as_ref())
            .map(|binder| binder.curve().clone())
    }

    fn bind(&mut self, id: &str, updater: &Updater, curve: &Curve) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| AnimationError::UnsupportedParameter { id: id.to_string() })?;
        // the old binding goes even when the new one cannot be made
        if entry.binder.take().is_some() {
            debug!("parameter {id} unbound for rebinding");
        }
        let ty = entry
            .resolve(curve)
            .filter(|ty| curve.is_type_supported(ty))
            .ok_or_else(|| AnimationError::type_mismatch(entry.describe_types(), curve.value_type()))?;

        entry.binder = Some(Binder::bind(updater, curve, &ty, entry.setter.clone())?);
        debug!("parameter {id} bound to curve {:?} as {ty}", curve.id());
        Ok(())
    }

    fn unbind(&mut self, id: &str) {
        if let Some(binder) = self.entries.get_mut(id).and_then(|entry| entry.binder.take()) {
            debug!("parameter {id} unbound");
            drop(binder);
        }
    }

    fn unbind_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.binder = None;
        }
    }

    fn unbind_all_recursively(&mut self) {
        self.unbind_all();
        for unbinder in &mut self.descendants {
            unbinder();
        }
    }
}

impl fmt::Debug for EasyBindingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasyBindingBlock")
            .field("parameters", &self.entries.keys().collect::<Vec<_>>())
            .field("descendants", &self.descendants.len())
            .finish()
    }
}
