//! Data model for the compiled load manifest.
//!
//! The compiler emits a single structured document describing the whole
//! world: string and resource tables, the type array, the proc array, global
//! variables, and opaque payloads (maps, interface) consumed by external
//! collaborators. The tree loader validates every cross-table index; this
//! module only describes the shape.

use serde::{Deserialize, Serialize};

use crate::{StringId, TypePath};

/// Top-level compiled manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompiledManifest {
    /// Ordered text table; `Literal::Text` indices point here.
    pub strings: Vec<String>,
    /// External resource path table.
    pub resources: Vec<String>,
    /// Indices into `procs` marking which procs are global.
    pub global_procs: Vec<u32>,
    /// Initial global-variable table.
    pub globals: Vec<GlobalDef>,
    /// Proc run once at world start (executed by the external interpreter).
    pub global_init_proc: Option<ProcDef>,
    /// World map data, opaque to the runtime core.
    pub maps: Vec<serde_json::Value>,
    /// UI description path, opaque to the runtime core.
    pub interface: Option<String>,
    /// Type definitions, in tree order (parents may appear anywhere).
    pub types: Vec<TypeDef>,
    /// Proc definitions referenced by index from `types` and `global_procs`.
    pub procs: Vec<ProcDef>,
}

impl CompiledManifest {
    /// Parse a manifest from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A global variable declaration with its initial literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDef {
    pub name: String,
    #[serde(default)]
    pub value: Literal,
}

/// One type in the class tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub path: TypePath,
    /// Index into `types` of the parent entry; `None` only for the root.
    #[serde(default)]
    pub parent: Option<u32>,
    /// Literal variable defaults declared on this type.
    #[serde(default)]
    pub variables: Vec<VarDefault>,
    /// Procs declared on this type, by name. Each binding lists the proc
    /// ids declared under that name in declaration order; the last is the
    /// type's own implementation, earlier ones are its super chain.
    #[serde(default)]
    pub procs: Vec<ProcBinding>,
    /// Object-valued variables constructed fresh per instance.
    #[serde(default)]
    pub init_objects: Vec<FreshObject>,
    /// List-valued variables constructed fresh per instance.
    #[serde(default)]
    pub init_lists: Vec<FreshList>,
}

/// A variable name with its default literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarDefault {
    pub name: String,
    #[serde(default)]
    pub value: Literal,
}

/// Procs declared under one name on one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcBinding {
    pub name: String,
    /// Indices into the manifest `procs` table, declaration order.
    pub ids: Vec<u32>,
}

/// Recipe for a sub-object built once per instance.
///
/// Reference-bearing defaults never go in the shared default map; they are
/// recorded here and constructed during instance initialization so that two
/// instances never share one mutable sub-object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshObject {
    /// The variable receiving the constructed object.
    pub name: String,
    /// Type to instantiate.
    pub type_path: TypePath,
    /// Creation arguments, as literals.
    #[serde(default)]
    pub args: Vec<Literal>,
}

/// Recipe for a list built and populated once per instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshList {
    /// The variable receiving the constructed list.
    pub name: String,
    /// Entries in order; a present `key` makes the entry associative.
    #[serde(default)]
    pub entries: Vec<FreshListEntry>,
}

/// One entry of a fresh-list recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshListEntry {
    #[serde(default)]
    pub key: Option<Literal>,
    pub value: Literal,
}

/// One proc definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcDef {
    pub name: String,
    /// Native procs bind to a registered handler; compiled procs carry a
    /// body reference executed by the external interpreter.
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub parameters: Vec<ParamDef>,
    /// Bytecode body reference for compiled procs.
    #[serde(default)]
    pub body: Option<u32>,
}

/// A declared parameter with its default literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDef {
    pub name: String,
    #[serde(default)]
    pub default: Literal,
}

/// A literal constant in the manifest.
///
/// Text literals refer into the manifest string table by index; the loader
/// bounds-checks them and rejects the manifest on any dangling reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Literal {
    #[default]
    Null,
    Number(f64),
    /// Index into `strings`.
    Text(StringId),
    /// Index into `resources`.
    Resource(u32),
    /// A type path literal.
    Path(TypePath),
}
