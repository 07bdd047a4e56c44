//! Typed request parameters.
//!
//! A [`ParameterSet`] holds at most one [`Parameter`] per `(name, kind)` pair.
//! Adding a duplicate replaces the earlier value, so the last write wins while
//! insertion order is otherwise preserved.

use serde_json::Value;

/// Where a parameter ends up in the outgoing HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Query string for GET-like requests, form body for POST/PUT.
    FormOrQuery,
    /// Replaces a `{name}` segment in the resource template.
    UrlSegment,
    /// HTTP header.
    Header,
    /// Request body.
    Body,
    /// Always placed on the query string.
    QueryString,
}

/// A single named request parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    pub kind: ParameterKind,
    /// When set, the name and value are written to the URI verbatim.
    pub pre_encoded: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<Value>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
            pre_encoded: false,
        }
    }

    /// Textual form of the value: strings are used as-is, everything else is
    /// rendered as compact JSON (`null` renders as an empty string).
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }

    fn same_slot(&self, name: &str, kind: ParameterKind) -> bool {
        self.kind == kind && self.name == name
    }
}

pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Ordered collection of parameters, unique by `(name, kind)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any existing one with the same `(name, kind)`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>, kind: ParameterKind) {
        self.insert(Parameter::new(name, value, kind));
    }

    /// Add a parameter whose name and value are already percent-encoded.
    pub fn add_pre_encoded(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        kind: ParameterKind,
    ) {
        let mut param = Parameter::new(name, value.into(), kind);
        param.pre_encoded = true;
        self.insert(param);
    }

    /// Insert a fully built parameter with last-write-wins semantics.
    pub fn insert(&mut self, param: Parameter) {
        self.params.retain(|p| !p.same_slot(&param.name, param.kind));
        self.params.push(param);
    }

    /// Insert only if no parameter occupies the same `(name, kind)` slot.
    ///
    /// Returns `true` if the parameter was added.
    pub fn insert_if_absent(&mut self, param: Parameter) -> bool {
        if self.contains(&param.name, param.kind) {
            return false;
        }
        self.params.push(param);
        true
    }

    pub fn get(&self, name: &str, kind: ParameterKind) -> Option<&Parameter> {
        self.params.iter().find(|p| p.same_slot(name, kind))
    }

    pub fn contains(&self, name: &str, kind: ParameterKind) -> bool {
        self.get(name, kind).is_some()
    }

    pub fn remove(&mut self, name: &str, kind: ParameterKind) -> Option<Parameter> {
        let idx = self.params.iter().position(|p| p.same_slot(name, kind))?;
        Some(self.params.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameters of one kind, in insertion order.
    pub fn of_kind(&self, kind: ParameterKind) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(move |p| p.kind == kind)
    }

    /// Number of parameters occupying the `(name, kind)` slot (0 or 1).
    pub fn count(&self, name: &str, kind: ParameterKind) -> usize {
        self.params.iter().filter(|p| p.same_slot(name, kind)).count()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
