//! The type tree and its manifest loader.
//!
//! Built once from the compiled manifest, immutable afterwards. Every
//! cross-table reference in the manifest (type ids, proc ids, string ids,
//! resource ids) is validated here; any dangling reference aborts the load.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use sable_ir::manifest::{CompiledManifest, Literal, ProcDef, TypeDef};
use sable_ir::{Name, ProcId, SharedInterner, TypeId, TypePath};

use crate::definition::{FreshListRecipe, FreshObjectRecipe, ObjectDefinition};
use crate::error::LoadError;
use crate::hooks::HookSet;
use crate::natives::NativeProcDesc;
use crate::proc::{ParamSpec, Proc, ProcKind};
use crate::value::Value;

/// One node of the type tree.
pub struct TreeEntry {
    pub id: TypeId,
    pub path: TypePath,
    pub parent: Option<TypeId>,
    pub children: Vec<TypeId>,
    definition: Rc<ObjectDefinition>,
}

impl TreeEntry {
    /// The merged definition for this type.
    pub fn definition(&self) -> &Rc<ObjectDefinition> {
        &self.definition
    }
}

/// The loaded, validated type hierarchy.
///
/// Owns the object definitions, the proc table, the interned string table,
/// and the declared globals. Read-only after load (and the registration
/// calls made during boot); may be read concurrently within the single
/// mutation authority described by the runtime.
pub struct ObjectTree {
    interner: SharedInterner,
    entries: Vec<TreeEntry>,
    by_path: FxHashMap<TypePath, TypeId>,
    procs: Vec<Proc>,
    global_procs: FxHashMap<Name, ProcId>,
    strings: Vec<Name>,
    resources: Vec<String>,
    globals: Vec<(Name, Value)>,
    global_init: Option<ProcId>,
    root: TypeId,
}

impl ObjectTree {
    /// Build a tree from a JSON-encoded manifest.
    pub fn load_json(json: &str, interner: &SharedInterner) -> Result<Self, LoadError> {
        let manifest = CompiledManifest::from_json(json)?;
        Self::load(&manifest, interner)
    }

    /// Build a tree from a parsed manifest.
    pub fn load(manifest: &CompiledManifest, interner: &SharedInterner) -> Result<Self, LoadError> {
        Loader {
            manifest,
            interner: interner.clone(),
            strings: Vec::new(),
        }
        .run()
    }

    /// The root type.
    pub fn root(&self) -> TypeId {
        self.root
    }

    /// Number of types in the tree.
    pub fn type_count(&self) -> usize {
        self.entries.len()
    }

    /// Entry for a type id.
    pub fn entry(&self, id: TypeId) -> Option<&TreeEntry> {
        self.entries.get(id.index())
    }

    /// Entry for a type path.
    pub fn entry_by_path(&self, path: &TypePath) -> Option<&TreeEntry> {
        self.by_path.get(path).and_then(|&id| self.entry(id))
    }

    /// Definition for a type id.
    pub fn definition(&self, id: TypeId) -> Option<&Rc<ObjectDefinition>> {
        self.entry(id).map(TreeEntry::definition)
    }

    /// Proc by table id.
    pub fn proc(&self, id: ProcId) -> Option<&Proc> {
        self.procs.get(id.index())
    }

    /// Global proc by name.
    pub fn global_proc(&self, name: Name) -> Option<ProcId> {
        self.global_procs.get(&name).copied()
    }

    /// The proc run once at world start, if the manifest declares one.
    pub fn global_init_proc(&self) -> Option<ProcId> {
        self.global_init
    }

    /// Interned manifest string table.
    pub fn strings(&self) -> &[Name] {
        &self.strings
    }

    /// External resource path table.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Declared globals with their initial values.
    pub fn globals(&self) -> &[(Name, Value)] {
        &self.globals
    }

    /// True iff a global variable `name` is declared.
    pub fn has_global(&self, name: Name) -> bool {
        self.globals.iter().any(|(n, _)| *n == name)
    }

    /// The interner the tree's names belong to.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Bind a native handler to the pre-declared global proc slot matching
    /// its name. A handler with no matching slot is inert: the native-code
    /// surface may be a superset of what any one build declares.
    pub fn register_global_native(&mut self, desc: NativeProcDesc) {
        let name = self.interner.intern(&desc.name);
        let Some(proc_id) = self.global_procs.get(&name).copied() else {
            debug!(name = %desc.name, "native proc has no declared global slot, ignoring");
            return;
        };
        self.bind_native(proc_id, desc);
    }

    /// Bind a native handler to the pre-declared proc slot `name` on the
    /// type at `path`. Unmatched handlers are inert, as for globals.
    pub fn register_native(&mut self, path: &TypePath, desc: NativeProcDesc) {
        let name = self.interner.intern(&desc.name);
        let Some(entry) = self.entry_by_path(path) else {
            debug!(%path, name = %desc.name, "native proc targets unknown type, ignoring");
            return;
        };
        // Most-derived native declaration in the chain is the slot.
        let chain: Vec<ProcId> = match entry.definition.proc_chain(name) {
            Some(chain) => chain.to_vec(),
            None => {
                debug!(%path, name = %desc.name, "native proc has no declared slot, ignoring");
                return;
            }
        };
        let slot = chain
            .iter()
            .rev()
            .copied()
            .find(|&id| self.procs.get(id.index()).is_some_and(Proc::is_native));
        match slot {
            Some(proc_id) => self.bind_native(proc_id, desc),
            None => {
                warn!(%path, name = %desc.name, "proc slot is compiled, not binding native");
            }
        }
    }

    /// Install a hook set on a type's definition.
    ///
    /// Hooks install during boot, after load and before any instantiation;
    /// once instances share the definition this returns `false`.
    pub fn install_hooks(&mut self, path: &TypePath, hooks: Rc<dyn HookSet>) -> bool {
        let Some(&id) = self.by_path.get(path) else {
            debug!(%path, "hook set targets unknown type, ignoring");
            return false;
        };
        let entry = &mut self.entries[id.index()];
        match Rc::get_mut(&mut entry.definition) {
            Some(definition) => {
                definition.hooks = Some(hooks);
                true
            }
            None => {
                warn!(%path, "definition already shared, hook set not installed");
                false
            }
        }
    }

    fn bind_native(&mut self, proc_id: ProcId, desc: NativeProcDesc) {
        let params: Vec<ParamSpec> = desc
            .params
            .iter()
            .map(|p| ParamSpec {
                name: self.interner.intern(&p.name),
                default: p.default.to_value(),
            })
            .collect();
        let proc = &mut self.procs[proc_id.index()];
        match proc.kind {
            ProcKind::Native(_) => {
                proc.kind = ProcKind::Native(Some(desc.handler));
                proc.params = params;
            }
            ProcKind::Compiled { .. } => {
                warn!(name = %desc.name, "declared slot is compiled, not binding native");
            }
        }
    }
}

/// One-shot manifest loader.
struct Loader<'m> {
    manifest: &'m CompiledManifest,
    interner: SharedInterner,
    /// Interned manifest string table, filled first.
    strings: Vec<Name>,
}

impl Loader<'_> {
    fn run(mut self) -> Result<ObjectTree, LoadError> {
        if self.manifest.types.is_empty() {
            return Err(LoadError::NoTypes);
        }

        self.strings = self
            .manifest
            .strings
            .iter()
            .map(|s| self.interner.intern(s))
            .collect();

        let mut procs = Vec::with_capacity(self.manifest.procs.len() + 1);
        for (index, def) in self.manifest.procs.iter().enumerate() {
            procs.push(self.build_proc(def, &format!("proc {index} ({})", def.name))?);
        }
        let global_init = match &self.manifest.global_init_proc {
            Some(def) => {
                procs.push(self.build_proc(def, "global init proc")?);
                Some(ProcId::new(u32::try_from(procs.len() - 1).unwrap_or(u32::MAX)))
            }
            None => None,
        };

        let global_procs = self.build_global_procs()?;
        let (by_path, parents, root) = self.wire_parents()?;
        let order = self.topological_order(&parents)?;
        let entries = self.build_entries(&by_path, &parents, &order, &procs)?;
        let globals = self.build_globals()?;

        debug!(
            types = entries.len(),
            procs = procs.len(),
            globals = globals.len(),
            "object tree loaded"
        );

        Ok(ObjectTree {
            interner: self.interner,
            entries,
            by_path,
            procs,
            global_procs,
            strings: self.strings,
            resources: self.manifest.resources.clone(),
            globals,
            global_init,
            root,
        })
    }

    fn build_proc(&self, def: &ProcDef, context: &str) -> Result<Proc, LoadError> {
        let params = def
            .parameters
            .iter()
            .map(|p| {
                Ok(ParamSpec {
                    name: self.interner.intern(&p.name),
                    default: self.literal_to_value(&p.default, context)?,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        let kind = if def.native {
            ProcKind::Native(None)
        } else {
            ProcKind::Compiled { body: def.body }
        };
        Ok(Proc {
            name: self.interner.intern(&def.name),
            params,
            kind,
        })
    }

    fn build_global_procs(&self) -> Result<FxHashMap<Name, ProcId>, LoadError> {
        let mut global_procs = FxHashMap::default();
        for &raw in &self.manifest.global_procs {
            let index = raw as usize;
            if index >= self.manifest.procs.len() {
                return Err(LoadError::DanglingProcRef {
                    context: "globalProcs".into(),
                    id: raw,
                });
            }
            let name = self.interner.intern(&self.manifest.procs[index].name);
            if global_procs.insert(name, ProcId::new(raw)).is_some() {
                return Err(LoadError::DuplicateGlobalProc {
                    name: self.manifest.procs[index].name.clone(),
                });
            }
        }
        Ok(global_procs)
    }

    /// First pass over types: validate parent references, find the root,
    /// build the path index.
    #[allow(clippy::type_complexity)]
    fn wire_parents(
        &self,
    ) -> Result<(FxHashMap<TypePath, TypeId>, Vec<Option<TypeId>>, TypeId), LoadError> {
        let types = &self.manifest.types;
        let mut by_path = FxHashMap::default();
        let mut parents = Vec::with_capacity(types.len());
        let mut root = None;

        for (index, def) in types.iter().enumerate() {
            let id = TypeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if by_path.insert(def.path.clone(), id).is_some() {
                return Err(LoadError::DuplicateTypePath {
                    path: def.path.to_string(),
                });
            }
            let parent = match def.parent {
                Some(p) => {
                    if p as usize >= types.len() {
                        return Err(LoadError::DanglingParentRef {
                            index,
                            path: def.path.to_string(),
                            parent: p,
                        });
                    }
                    Some(TypeId::new(p))
                }
                None => {
                    if !def.path.is_root() {
                        return Err(LoadError::MissingRoot {
                            path: def.path.to_string(),
                        });
                    }
                    root = Some(id);
                    None
                }
            };
            parents.push(parent);
        }

        let root = root.ok_or(LoadError::MissingRoot {
            path: "/".to_string(),
        })?;
        Ok((by_path, parents, root))
    }

    /// Order type indices parents-first, rejecting parent cycles.
    fn topological_order(&self, parents: &[Option<TypeId>]) -> Result<Vec<usize>, LoadError> {
        const UNVISITED: u8 = 0;
        const IN_PROGRESS: u8 = 1;
        const DONE: u8 = 2;

        let mut state = vec![UNVISITED; parents.len()];
        let mut order = Vec::with_capacity(parents.len());

        for start in 0..parents.len() {
            if state[start] == DONE {
                continue;
            }
            // Walk up to the first finished ancestor, then emit downwards.
            let mut chain = Vec::new();
            let mut current = start;
            loop {
                match state[current] {
                    DONE => break,
                    IN_PROGRESS => {
                        return Err(LoadError::ParentCycle {
                            path: self.manifest.types[current].path.to_string(),
                        });
                    }
                    _ => {}
                }
                state[current] = IN_PROGRESS;
                chain.push(current);
                match parents[current] {
                    Some(parent) => current = parent.index(),
                    None => break,
                }
            }
            for &index in chain.iter().rev() {
                state[index] = DONE;
                order.push(index);
            }
        }
        Ok(order)
    }

    /// Second pass: merge definitions parents-first and build entries.
    fn build_entries(
        &self,
        by_path: &FxHashMap<TypePath, TypeId>,
        parents: &[Option<TypeId>],
        order: &[usize],
        procs: &[Proc],
    ) -> Result<Vec<TreeEntry>, LoadError> {
        let types = &self.manifest.types;
        let mut definitions: Vec<Option<Rc<ObjectDefinition>>> = vec![None; types.len()];
        let mut children: Vec<Vec<TypeId>> = vec![Vec::new(); types.len()];

        for &index in order {
            let def = &types[index];
            let id = TypeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            let parent = parents[index];

            let (mut variables, mut proc_table, mut fresh_objects, mut fresh_lists, mut ancestry) =
                match parent {
                    Some(pid) => {
                        children[pid.index()].push(id);
                        // Parents-first order guarantees this is Some
                        match &definitions[pid.index()] {
                            Some(parent_def) => (
                                parent_def.variables.clone(),
                                parent_def.procs.clone(),
                                parent_def.fresh_objects.clone(),
                                parent_def.fresh_lists.clone(),
                                parent_def.ancestry.clone(),
                            ),
                            None => {
                                return Err(LoadError::ParentCycle {
                                    path: def.path.to_string(),
                                })
                            }
                        }
                    }
                    None => Default::default(),
                };
            ancestry.push(def.path.clone());

            self.merge_own(
                def,
                by_path,
                procs,
                &mut variables,
                &mut proc_table,
                &mut fresh_objects,
                &mut fresh_lists,
            )?;

            definitions[index] = Some(Rc::new(ObjectDefinition {
                type_id: id,
                path: def.path.clone(),
                parent,
                ancestry,
                interner: self.interner.clone(),
                variables,
                procs: proc_table,
                fresh_objects,
                fresh_lists,
                hooks: None,
            }));
        }

        let entries = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                let definition = match definition {
                    Some(d) => d,
                    // topological_order covers every index
                    None => {
                        return Err(LoadError::ParentCycle {
                            path: types[index].path.to_string(),
                        })
                    }
                };
                Ok(TreeEntry {
                    id: TypeId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                    path: types[index].path.clone(),
                    parent: parents[index],
                    children: std::mem::take(&mut children[index]),
                    definition,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(entries)
    }

    /// Apply one type's own declarations on top of its inherited tables.
    #[allow(clippy::too_many_arguments)]
    fn merge_own(
        &self,
        def: &TypeDef,
        by_path: &FxHashMap<TypePath, TypeId>,
        procs: &[Proc],
        variables: &mut FxHashMap<Name, Value>,
        proc_table: &mut FxHashMap<Name, Vec<ProcId>>,
        fresh_objects: &mut Vec<FreshObjectRecipe>,
        fresh_lists: &mut Vec<FreshListRecipe>,
    ) -> Result<(), LoadError> {
        let context = format!("type {}", def.path);

        for var in &def.variables {
            let name = self.interner.intern(&var.name);
            let value = self.literal_to_value(&var.value, &context)?;
            variables.insert(name, value);
        }

        for binding in &def.procs {
            let name = self.interner.intern(&binding.name);
            let chain = proc_table.entry(name).or_default();
            for &raw in &binding.ids {
                if raw as usize >= procs.len() {
                    return Err(LoadError::DanglingProcRef {
                        context: context.clone(),
                        id: raw,
                    });
                }
                chain.push(ProcId::new(raw));
            }
        }

        for recipe in &def.init_objects {
            let var = self.interner.intern(&recipe.name);
            let target = by_path.get(&recipe.type_path).copied().ok_or_else(|| {
                LoadError::UnknownRecipeType {
                    path: def.path.to_string(),
                    var: recipe.name.clone(),
                    target: recipe.type_path.to_string(),
                }
            })?;
            let args = recipe
                .args
                .iter()
                .map(|lit| self.literal_to_value(lit, &context))
                .collect::<Result<Vec<_>, LoadError>>()?;
            let built = FreshObjectRecipe {
                var,
                type_id: target,
                args,
            };
            // The variable becomes declared, and the shared default map
            // must never hold a reference-bearing value for it.
            variables.insert(var, Value::Null);
            match fresh_objects.iter_mut().find(|r| r.var == var) {
                Some(existing) => *existing = built,
                None => fresh_objects.push(built),
            }
        }

        for recipe in &def.init_lists {
            let var = self.interner.intern(&recipe.name);
            let entries = recipe
                .entries
                .iter()
                .map(|entry| {
                    let key = entry
                        .key
                        .as_ref()
                        .map(|lit| self.literal_to_value(lit, &context))
                        .transpose()?;
                    let value = self.literal_to_value(&entry.value, &context)?;
                    Ok((key, value))
                })
                .collect::<Result<Vec<_>, LoadError>>()?;
            let built = FreshListRecipe { var, entries };
            variables.insert(var, Value::Null);
            match fresh_lists.iter_mut().find(|r| r.var == var) {
                Some(existing) => *existing = built,
                None => fresh_lists.push(built),
            }
        }

        Ok(())
    }

    fn build_globals(&self) -> Result<Vec<(Name, Value)>, LoadError> {
        self.manifest
            .globals
            .iter()
            .map(|global| {
                let name = self.interner.intern(&global.name);
                let value =
                    self.literal_to_value(&global.value, &format!("global {}", global.name))?;
                Ok((name, value))
            })
            .collect()
    }

    /// Lift a manifest literal into a runtime value, bounds-checking table
    /// references.
    fn literal_to_value(&self, literal: &Literal, context: &str) -> Result<Value, LoadError> {
        match literal {
            Literal::Null => Ok(Value::Null),
            Literal::Number(n) => Ok(Value::Number(*n)),
            Literal::Text(id) => {
                let name = self.strings.get(id.index()).copied().ok_or_else(|| {
                    LoadError::DanglingStringRef {
                        context: context.to_string(),
                        id: id.raw(),
                    }
                })?;
                Ok(Value::text(self.interner.lookup(name)))
            }
            Literal::Resource(id) => {
                let path = self.manifest.resources.get(*id as usize).ok_or_else(|| {
                    LoadError::DanglingResourceRef {
                        context: context.to_string(),
                        id: *id,
                    }
                })?;
                Ok(Value::text(path.as_str()))
            }
            Literal::Path(path) => Ok(Value::text(path.as_str())),
        }
    }
}
