//! Object definitions: the static, shared template for a type.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_ir::{Name, ProcId, SharedInterner, TypeId, TypePath};

use crate::hooks::HookSet;
use crate::value::Value;

/// Recipe for a sub-object constructed once per instance.
#[derive(Clone, Debug)]
pub struct FreshObjectRecipe {
    pub var: Name,
    pub type_id: TypeId,
    pub args: Vec<Value>,
}

/// Recipe for a list constructed and populated once per instance.
/// Entries with a key are associative assignments, the rest append.
#[derive(Clone, Debug)]
pub struct FreshListRecipe {
    pub var: Name,
    pub entries: Vec<(Option<Value>, Value)>,
}

/// The merged (own + inherited) template for one type.
///
/// Built once by the tree loader and immutable afterwards. Both tables are
/// merged down the ancestor chain with the most-derived definition winning
/// on a name conflict; proc tables keep the whole override chain so an
/// ancestor implementation stays callable ("super").
///
/// Reference-bearing defaults never appear in the shared default map; they
/// live in the fresh-construction recipes and are materialized per
/// instance, so two instances of a type cannot share one mutable default
/// sub-object or list.
pub struct ObjectDefinition {
    pub(crate) type_id: TypeId,
    pub(crate) path: TypePath,
    pub(crate) parent: Option<TypeId>,
    /// Paths of this type and every ancestor along the parent links, in
    /// root-first order. Parent links are authoritative for ancestry; a
    /// path is not required to be a textual prefix of its children.
    pub(crate) ancestry: Vec<TypePath>,
    pub(crate) interner: SharedInterner,
    /// Merged literal variable defaults.
    pub(crate) variables: FxHashMap<Name, Value>,
    /// Merged proc override chains, most-derived implementation last.
    pub(crate) procs: FxHashMap<Name, Vec<ProcId>>,
    pub(crate) fresh_objects: Vec<FreshObjectRecipe>,
    pub(crate) fresh_lists: Vec<FreshListRecipe>,
    pub(crate) hooks: Option<Rc<dyn HookSet>>,
}

impl ObjectDefinition {
    /// The type's id in the tree.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The type's path.
    pub fn path(&self) -> &TypePath {
        &self.path
    }

    /// The parent type, `None` for the root.
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// The interner this definition's names belong to.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// True iff `path` names this type or any ancestor of it.
    ///
    /// Ancestry follows the parent links the variable and proc tables were
    /// merged along, not the path text.
    pub fn is_subtype_of(&self, path: &TypePath) -> bool {
        self.ancestry.iter().any(|ancestor| ancestor == path)
    }

    /// True iff the merged variable table declares `name`.
    pub fn has_variable(&self, name: Name) -> bool {
        self.variables.contains_key(&name)
    }

    /// The merged default for a variable.
    pub fn default_of(&self, name: Name) -> Option<&Value> {
        self.variables.get(&name)
    }

    /// True iff the merged proc table declares `name`.
    pub fn has_proc(&self, name: Name) -> bool {
        self.procs.contains_key(&name)
    }

    /// The most-derived implementation of a proc.
    pub fn proc(&self, name: Name) -> Option<ProcId> {
        self.procs.get(&name).and_then(|chain| chain.last().copied())
    }

    /// The full override chain for a proc, most-derived last.
    pub fn proc_chain(&self, name: Name) -> Option<&[ProcId]> {
        self.procs.get(&name).map(Vec::as_slice)
    }

    /// The next-less-derived implementation relative to `current` in the
    /// chain for `name` - the target of a "super" call.
    pub fn super_of(&self, name: Name, current: ProcId) -> Option<ProcId> {
        let chain = self.procs.get(&name)?;
        let pos = chain.iter().position(|&id| id == current)?;
        pos.checked_sub(1).map(|prev| chain[prev])
    }

    /// Fresh-object recipes, merged.
    pub fn fresh_objects(&self) -> &[FreshObjectRecipe] {
        &self.fresh_objects
    }

    /// Fresh-list recipes, merged.
    pub fn fresh_lists(&self) -> &[FreshListRecipe] {
        &self.fresh_lists
    }

    /// The hook capability table, if this type declares one.
    pub fn hooks(&self) -> Option<&Rc<dyn HookSet>> {
        self.hooks.as_ref()
    }

    /// Names of all declared variables (unordered).
    pub fn variable_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.variables.keys().copied()
    }
}
