//! Fluent construction of GraphQL operations
//!
//! Assembles a document from a root field, selections and registered
//! fragments, binds variables, and validates the result before anything
//! reaches the network. Output is deterministic: variable definitions are
//! sorted by name and fragment definitions are emitted once each in
//! alphabetical order, so identical inputs render byte-identical documents.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::fragments::{self, EntityType};
use super::operation::{Operation, OperationKind};
use crate::api::error::SuperOpsError;

#[derive(Debug, Clone)]
pub struct OperationBuilder {
    name: String,
    kind: OperationKind,
    entity: EntityType,
    root_field: Option<String>,
    root_args: String,
    selections: Vec<String>,
    variable_definitions: BTreeMap<String, String>,
    variables: BTreeMap<String, Value>,
    fragments: BTreeSet<String>,
    idempotency_key: Option<String>,
    cacheable: bool,
}

impl OperationBuilder {
    /// Start a read operation. Queries are cacheable by default.
    pub fn query(name: impl Into<String>, entity: EntityType) -> Self {
        Self::new(name, OperationKind::Query, entity, true)
    }

    /// Start a write operation. Mutations are never cacheable.
    pub fn mutation(name: impl Into<String>, entity: EntityType) -> Self {
        Self::new(name, OperationKind::Mutation, entity, false)
    }

    fn new(
        name: impl Into<String>,
        kind: OperationKind,
        entity: EntityType,
        cacheable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            entity,
            root_field: None,
            root_args: String::new(),
            selections: Vec::new(),
            variable_definitions: BTreeMap::new(),
            variables: BTreeMap::new(),
            fragments: BTreeSet::new(),
            idempotency_key: None,
            cacheable,
        }
    }

    /// Set the root field and its argument list, e.g.
    /// `root("tickets", "filter: $filter, limit: $limit, cursor: $cursor")`.
    pub fn root(mut self, field: impl Into<String>, args: impl Into<String>) -> Self {
        self.root_field = Some(field.into());
        self.root_args = args.into();
        self
    }

    /// Declare a variable with its GraphQL type and bind its value.
    pub fn variable(
        mut self,
        name: impl Into<String>,
        type_def: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let name = name.into();
        self.variable_definitions.insert(name.clone(), type_def.into());
        self.variables.insert(name, value.into());
        self
    }

    /// Add a field selection under the root field.
    pub fn selection(mut self, selection: impl Into<String>) -> Self {
        self.selections.push(selection.into());
        self
    }

    /// Reference a registered fragment. Dependencies are pulled in
    /// automatically at build time.
    pub fn fragment(mut self, name: impl Into<String>) -> Self {
        self.fragments.insert(name.into());
        self
    }

    /// Attach an idempotency key so the server can deduplicate a retried
    /// mutation. Also switches the mutation onto the retryable policy.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    /// Assemble and validate the operation.
    ///
    /// Fails with [`SuperOpsError::MalformedOperation`] when the document
    /// references a variable that was never bound, or a bound variable is
    /// never referenced.
    pub fn build(self) -> Result<Operation, SuperOpsError> {
        let root_field = self.root_field.clone().ok_or_else(|| {
            SuperOpsError::validation(format!("operation '{}' has no root field", self.name))
        })?;

        let body = self.render_body(&root_field);
        let resolved = fragments::resolve(self.fragments.iter());
        let fragment_names: Vec<String> = resolved.iter().map(|f| f.name.to_string()).collect();

        let mut referenced = collect_variable_references(&body);
        for fragment in &resolved {
            referenced.extend(collect_variable_references(fragment.fields));
        }

        let missing: Vec<String> = referenced
            .iter()
            .filter(|name| !self.variables.contains_key(*name))
            .cloned()
            .collect();
        let extra: Vec<String> = self
            .variables
            .keys()
            .filter(|name| !referenced.contains(*name))
            .cloned()
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(SuperOpsError::MalformedOperation {
                operation: self.name,
                missing,
                extra,
            });
        }

        let mut document = String::new();
        document.push_str(self.kind.keyword());
        document.push(' ');
        document.push_str(&self.name);
        if !self.variable_definitions.is_empty() {
            let defs: Vec<String> = self
                .variable_definitions
                .iter()
                .map(|(name, type_def)| format!("${name}: {type_def}"))
                .collect();
            document.push_str(&format!("({})", defs.join(", ")));
        }
        document.push_str(" {\n");
        document.push_str(&body);
        document.push_str("\n}");
        for fragment in &resolved {
            document.push_str("\n\n");
            document.push_str(&fragment.definition());
        }

        Ok(Operation::new(
            self.name,
            self.kind,
            self.entity,
            document,
            root_field,
            self.variables,
            fragment_names,
            self.idempotency_key,
            self.cacheable,
        ))
    }

    fn render_body(&self, root_field: &str) -> String {
        let mut body = String::from("  ");
        body.push_str(root_field);
        if !self.root_args.is_empty() {
            body.push_str(&format!("({})", self.root_args));
        }
        body.push_str(" {\n");
        for selection in &self.selections {
            for line in selection.trim().lines() {
                body.push_str("    ");
                body.push_str(line.trim_end());
                body.push('\n');
            }
        }
        body.push_str("  }");
        body
    }
}

/// Collect the names of all `$variable` references in a piece of document.
fn collect_variable_references(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start {
                names.insert(text[start..end].to_string());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    names
}
