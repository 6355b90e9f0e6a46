//! Function registry for one source unit.
//!
//! Every function is registered with its parsed signature before any body is
//! analyzed, so calls may refer to functions defined later in the unit.

use std::cell::RefCell;
use std::collections::HashMap;

use la_arena::{Arena, Idx};
use polypolarism_dsl::parse_schema;
use polypolarism_syntax::{FunctionDef, Module};
use polypolarism_types::FrameType;

pub type FunctionId<'a> = Idx<FunctionInfo<'a>>;

/// Argument shapes of one call, by parameter position.
pub(crate) type CallKey = Vec<Option<FrameType>>;

/// Schema annotations of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Declared schema per parameter position.
    pub params: Vec<Option<FrameType>>,
    pub returns: Option<FrameType>,
}

impl FunctionSignature {
    /// Parse the annotations of `def`. Returns `None` when no annotation
    /// yields a schema.
    pub fn extract(def: &FunctionDef) -> Option<Self> {
        let params: Vec<_> = def
            .params
            .iter()
            .map(|p| {
                p.annotation
                    .as_deref()
                    .and_then(|schema| parse_annotation(&def.name, &p.name, schema))
            })
            .collect();
        let returns = def
            .returns
            .as_deref()
            .and_then(|schema| parse_annotation(&def.name, "return", schema));

        if returns.is_none() && params.iter().all(Option::is_none) {
            return None;
        }
        Some(Self { params, returns })
    }
}

/// Parse a schema annotation, treating malformed ones as absent.
pub(crate) fn parse_annotation(function: &str, target: &str, schema: &str) -> Option<FrameType> {
    match parse_schema(schema) {
        Ok(frame) => Some(frame),
        Err(err) => {
            tracing::warn!(function, param = target, schema, %err, "ignoring malformed schema annotation");
            None
        }
    }
}

/// A registered function.
#[derive(Debug)]
pub struct FunctionInfo<'a> {
    pub def: &'a FunctionDef,
    pub signature: Option<FunctionSignature>,
    /// Derived return schemas of an unannotated body, by argument shapes.
    cache: RefCell<HashMap<CallKey, Option<FrameType>>>,
}

impl<'a> FunctionInfo<'a> {
    pub fn new(def: &'a FunctionDef) -> Self {
        Self {
            def,
            signature: FunctionSignature::extract(def),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'a str {
        &self.def.name
    }

    /// Position of the parameter called `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.def.params.iter().position(|p| p.name == name)
    }

    pub(crate) fn cached(&self, key: &CallKey) -> Option<Option<FrameType>> {
        self.cache.borrow().get(key).cloned()
    }

    pub(crate) fn remember(&self, key: CallKey, result: Option<FrameType>) {
        self.cache.borrow_mut().insert(key, result);
    }
}

/// All functions of one unit, addressed by stable id.
#[derive(Debug, Default)]
pub struct FunctionRegistry<'a> {
    functions: Arena<FunctionInfo<'a>>,
    by_name: HashMap<&'a str, FunctionId<'a>>,
}

impl<'a> FunctionRegistry<'a> {
    pub fn new() -> Self {
        Self {
            functions: Arena::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register every function of `module`.
    pub fn build(module: &'a Module) -> Self {
        let mut registry = Self::new();
        for def in &module.functions {
            registry.register(def);
        }
        registry
    }

    /// Register a definition. A later definition with the same name shadows
    /// the earlier one for call resolution.
    pub fn register(&mut self, def: &'a FunctionDef) -> FunctionId<'a> {
        let id = self.functions.alloc(FunctionInfo::new(def));
        self.by_name.insert(&def.name, id);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<FunctionId<'a>> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&FunctionInfo<'a>> {
        self.lookup(name).map(|id| &self.functions[id])
    }

    pub fn info(&self, id: FunctionId<'a>) -> &FunctionInfo<'a> {
        &self.functions[id]
    }

    pub fn has_signature(&self, name: &str) -> bool {
        self.get(name).is_some_and(|info| info.signature.is_some())
    }

    /// Functions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FunctionId<'a>, &FunctionInfo<'a>)> {
        self.functions.iter()
    }
}
