//! Immutable operation descriptions
//!
//! An [`Operation`] is one fully-specified request: the rendered document,
//! its variables and the metadata the pipeline needs to schedule, cache and
//! retry it. Operations are created by the builder and never mutated; the
//! pager derives per-page variants via [`Operation::with_variable`].

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use super::fragments::EntityType;

/// Whether an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// GraphQL keyword that opens the document.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

/// One fully-specified GraphQL request.
#[derive(Debug, Clone)]
pub struct Operation {
    name: String,
    kind: OperationKind,
    entity: EntityType,
    document: String,
    response_field: String,
    variables: BTreeMap<String, Value>,
    fragment_names: Vec<String>,
    idempotency_key: Option<String>,
    cacheable: bool,
}

impl Operation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        kind: OperationKind,
        entity: EntityType,
        document: String,
        response_field: String,
        variables: BTreeMap<String, Value>,
        fragment_names: Vec<String>,
        idempotency_key: Option<String>,
        cacheable: bool,
    ) -> Self {
        Self {
            name,
            kind,
            entity,
            document,
            response_field,
            variables,
            fragment_names,
            idempotency_key,
            cacheable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    /// The rendered GraphQL document, fragments included.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// The `data` field this operation's payload lives under.
    pub fn response_field(&self) -> &str {
        &self.response_field
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    /// Variables as a JSON object for the request body.
    pub fn variables_json(&self) -> Value {
        Value::Object(
            self.variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    /// Whether results may be served from / stored in the cache. Only
    /// meaningful for queries; mutations are never cacheable.
    pub fn cacheable(&self) -> bool {
        self.cacheable && self.kind == OperationKind::Query
    }

    /// Clone this operation with one variable replaced. The document is
    /// unchanged; only the value bound at execution time differs.
    pub fn with_variable(&self, name: &str, value: Value) -> Self {
        let mut cloned = self.clone();
        cloned.variables.insert(name.to_string(), value);
        cloned
    }

    /// Normalized signature for cache keying: operation name, the fragments
    /// it selects, and its variables in sorted order. Identical logical
    /// requests always produce identical signatures.
    pub fn signature(&self) -> String {
        let variables = serde_json::to_string(&self.variables).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        self.document.hash(&mut hasher);
        variables.hash(&mut hasher);
        format!(
            "{}|{}|{:016x}",
            self.name,
            self.fragment_names.join("+"),
            hasher.finish()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(variables: BTreeMap<String, Value>) -> Operation {
        Operation::new(
            "GetTicket".to_string(),
            OperationKind::Query,
            EntityType::Ticket,
            "query GetTicket($id: ID!) { ticket(id: $id) { id } }".to_string(),
            "ticket".to_string(),
            variables,
            vec!["TicketCoreFields".to_string()],
            None,
            true,
        )
    }

    #[test]
    fn test_signature_is_stable() {
        let mut vars = BTreeMap::new();
        vars.insert("id".to_string(), json!("T-1"));
        let a = sample(vars.clone());
        let b = sample(vars);
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_changes_with_variables() {
        let mut vars = BTreeMap::new();
        vars.insert("id".to_string(), json!("T-1"));
        let a = sample(vars);
        let b = a.with_variable("id", json!("T-2"));
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_with_variable_does_not_touch_original() {
        let mut vars = BTreeMap::new();
        vars.insert("cursor".to_string(), Value::Null);
        let base = sample(vars);
        let next = base.with_variable("cursor", json!("abc"));
        assert_eq!(base.variables()["cursor"], Value::Null);
        assert_eq!(next.variables()["cursor"], json!("abc"));
    }

    #[test]
    fn test_mutations_are_never_cacheable() {
        let op = Operation::new(
            "CreateTicket".to_string(),
            OperationKind::Mutation,
            EntityType::Ticket,
            String::new(),
            "createTicket".to_string(),
            BTreeMap::new(),
            Vec::new(),
            None,
            true,
        );
        assert!(!op.cacheable());
    }
}
