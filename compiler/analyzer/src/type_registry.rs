//! Type registry stores the canonical type definitions for one
//! compilation unit. The registry contains both types defined by the
//! language and user-defined types.
//!
//! Names are case-insensitive. Every registered type receives a `TypeId`
//! that stays valid for the lifetime of the registry; entries are never
//! removed except when an uncommitted `RegistryTransaction` rolls back.
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use log::{debug, trace};
use plctype_dsl::{
    common::ElementaryTypeName,
    core::Id,
    diagnostic::{Category, Diagnostic},
};
use plctype_problems::Problem;

use crate::type_model::{Type, TypeId};
use crate::widening::{ordinal, WideningLattice};

#[derive(Debug)]
struct TypeEntry {
    name: Id,
    ty: Type,
    /// Set for the built-in types.
    elementary: Option<ElementaryTypeName>,
}

#[derive(Debug)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    /// Maps the lower case name (or alias) to the type.
    names: HashMap<String, TypeId>,
    lattice: WideningLattice,
}

/// A view of a canonical type that borrows from the registry.
///
/// Two views are equal when they refer to the same canonical type.
#[derive(Clone, Copy)]
pub struct TypeRef<'r> {
    registry: &'r TypeRegistry,
    id: TypeId,
    entry: &'r TypeEntry,
}

impl<'r> TypeRef<'r> {
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The canonical name as it was first declared.
    pub fn name(&self) -> &'r str {
        self.entry.name.original()
    }

    pub fn ty(&self) -> &'r Type {
        &self.entry.ty
    }

    /// The elementary type this is, if it is a built-in type.
    pub fn elementary(&self) -> Option<ElementaryTypeName> {
        self.entry.elementary
    }

    /// Returns true if a value of this type can be assigned to `other`
    /// without an explicit conversion.
    pub fn is_assignable_to(&self, other: &TypeRef<'_>) -> bool {
        self.registry.is_assignable(self.id, other.id)
    }
}

impl PartialEq for TypeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for TypeRef<'_> {}

impl fmt::Debug for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.id)
    }
}

impl fmt::Display for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! elementary_accessors {
    ($($fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            pub fn $fn_name(&self) -> TypeRef<'_> {
                self.elementary_type(ElementaryTypeName::$variant)
            }
        )*
    };
}

impl TypeRegistry {
    /// Initializes a new registry containing the elementary types.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(ElementaryTypeName::ALL.len()),
            names: HashMap::new(),
            lattice: WideningLattice::new(),
        };
        // Elementary types occupy the first identifiers in declaration
        // order so that the accessors can never fail.
        for name in ElementaryTypeName::ALL {
            registry.push(name.as_id(), Type::from(name), Some(name));
        }
        registry
    }

    fn push(&mut self, name: Id, ty: Type, elementary: Option<ElementaryTypeName>) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        self.names.insert(name.lower_case().to_string(), id);
        self.entries.push(TypeEntry {
            name,
            ty,
            elementary,
        });
        id
    }

    /// Adds the type into the registry.
    ///
    /// Returns a diagnostic if a type already exists with the name and
    /// does not insert the type.
    pub fn register_type(&mut self, name: &Id, ty: Type) -> Result<TypeId, Diagnostic> {
        if let Some(existing) = self.names.get(name.lower_case()) {
            return Err(self.redefinition(name, *existing));
        }
        let id = self.push(name.clone(), ty, None);
        debug!("Registered type {} as {}", name, id);
        Ok(id)
    }

    /// Adds the type into the registry, replacing any user-defined type
    /// with the same name. Handles to the replaced type remain valid but
    /// the name now resolves to the new type.
    pub fn replace_type(&mut self, name: &Id, ty: Type) -> Result<TypeId, Diagnostic> {
        if let Some(existing) = self.names.get(name.lower_case()) {
            if self.entries[existing.index()].elementary.is_some() {
                return Err(self.redefinition(name, *existing));
            }
        }
        let id = self.push(name.clone(), ty, None);
        debug!("Replaced type {} with {}", name, id);
        Ok(id)
    }

    /// Binds an additional name to an existing type.
    pub fn register_alias(&mut self, name: &Id, target: TypeId) -> Result<(), Diagnostic> {
        if let Some(existing) = self.names.get(name.lower_case()) {
            return Err(self.redefinition(name, *existing));
        }
        if self.entries.get(target.index()).is_none() {
            return Err(
                Diagnostic::problem(Problem::ParentTypeNotDeclared, Category::Semantic)
                    .with_context_id("name", name)
                    .with_context("target", &target.to_string()),
            );
        }
        self.names.insert(name.lower_case().to_string(), target);
        debug!("Registered alias {} for {}", name, target);
        Ok(())
    }

    fn redefinition(&self, name: &Id, existing: TypeId) -> Diagnostic {
        let entry = &self.entries[existing.index()];
        let problem = match entry.elementary {
            Some(_) => Problem::ElementaryTypeRedefinition,
            None => Problem::TypeDeclNameDuplicated,
        };
        Diagnostic::problem(problem, Category::Semantic)
            .with_context_id("name", name)
            .with_context_id("first declaration", &entry.name)
    }

    /// Gets the type with the name (case-insensitive).
    pub fn find_type(&self, name: &str) -> Option<TypeRef<'_>> {
        let found = self.names.get(&name.to_lowercase()).copied();
        trace!("Find type {} resolved to {:?}", name, found);
        found.and_then(|id| self.get(id))
    }

    /// Gets the type with the identifier.
    pub fn get(&self, id: TypeId) -> Option<TypeRef<'_>> {
        self.entries.get(id.index()).map(|entry| TypeRef {
            registry: self,
            id,
            entry,
        })
    }

    /// Gets the canonical name of the type with the identifier.
    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        self.entries.get(id.index()).map(|entry| entry.name.original())
    }

    /// Gets the canonical built-in type.
    pub fn elementary_type(&self, name: ElementaryTypeName) -> TypeRef<'_> {
        let index = ordinal(name);
        TypeRef {
            registry: self,
            id: TypeId(index as u32),
            entry: &self.entries[index],
        }
    }

    elementary_accessors! {
        get_bool => BOOL,
        get_sint => SINT,
        get_int => INT,
        get_dint => DINT,
        get_lint => LINT,
        get_usint => USINT,
        get_uint => UINT,
        get_udint => UDINT,
        get_ulint => ULINT,
        get_real => REAL,
        get_lreal => LREAL,
        get_time => TIME,
        get_date => DATE,
        get_string => STRING,
        get_byte => BYTE,
        get_word => WORD,
        get_dword => DWORD,
        get_lword => LWORD,
    }

    /// Iterates over the canonical types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = TypeRef<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(move |(index, entry)| TypeRef {
                registry: self,
                id: TypeId(index as u32),
                entry,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if a value of type `from` can be assigned to `to`.
    ///
    /// Every type is assignable to itself. Otherwise only the elementary
    /// widening conversions are implicit.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let elementary = |id: TypeId| self.entries.get(id.index()).and_then(|e| e.elementary);
        match (elementary(from), elementary(to)) {
            (Some(from), Some(to)) => self.lattice.widens_to(from, to),
            _ => false,
        }
    }

    /// Checks that a value of type `value` can be assigned to `target`.
    pub fn require_assignable(&self, value: TypeId, target: TypeId) -> Result<(), Diagnostic> {
        if self.is_assignable(value, target) {
            return Ok(());
        }
        Err(Diagnostic::type_error(
            Problem::AssignmentTypeMismatch,
            self.name_of(target).unwrap_or_default(),
            self.name_of(value).unwrap_or_default(),
        ))
    }

    /// Starts a batch of registrations that is undone unless committed.
    pub fn transaction(&mut self) -> RegistryTransaction<'_> {
        RegistryTransaction {
            entries_len: self.entries.len(),
            names: self.names.clone(),
            committed: false,
            registry: self,
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope guard for a batch of registrations.
///
/// Registrations go through the guard (it dereferences to the registry).
/// Dropping the guard without calling `commit` removes every type and
/// name added since the guard was created.
pub struct RegistryTransaction<'r> {
    registry: &'r mut TypeRegistry,
    entries_len: usize,
    names: HashMap<String, TypeId>,
    committed: bool,
}

impl RegistryTransaction<'_> {
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Deref for RegistryTransaction<'_> {
    type Target = TypeRegistry;

    fn deref(&self) -> &Self::Target {
        self.registry
    }
}

impl DerefMut for RegistryTransaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.registry
    }
}

impl Drop for RegistryTransaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        debug!(
            "Rolling back {} type registrations",
            self.registry.entries.len() - self.entries_len
        );
        self.registry.entries.truncate(self.entries_len);
        self.registry.names = std::mem::take(&mut self.names);
    }
}
