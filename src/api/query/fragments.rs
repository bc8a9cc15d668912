//! Reusable GraphQL fragments for SuperOps entities
//!
//! Fragments are registered once as process-wide statics and shared by every
//! operation that references them. Each entity exposes a fragment per detail
//! level so managers can trade payload size for completeness.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// Entity types the SDK knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Ticket,
    Client,
    Asset,
}

impl EntityType {
    /// GraphQL object type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ticket => "Ticket",
            Self::Client => "Client",
            Self::Asset => "Asset",
        }
    }

    /// Root field for single-record queries.
    pub fn singular_field(&self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Client => "client",
            Self::Asset => "asset",
        }
    }

    /// Root field for list queries.
    pub fn plural_field(&self) -> &'static str {
        match self {
            Self::Ticket => "tickets",
            Self::Client => "clients",
            Self::Asset => "assets",
        }
    }

    /// GraphQL input type for filters.
    pub fn filter_type(&self) -> &'static str {
        match self {
            Self::Ticket => "TicketFilter",
            Self::Client => "ClientFilter",
            Self::Asset => "AssetFilter",
        }
    }

    /// GraphQL input type for create/update mutations.
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Ticket => "TicketInput",
            Self::Client => "ClientInput",
            Self::Asset => "AssetInput",
        }
    }

    pub fn create_field(&self) -> &'static str {
        match self {
            Self::Ticket => "createTicket",
            Self::Client => "createClient",
            Self::Asset => "createAsset",
        }
    }

    pub fn update_field(&self) -> &'static str {
        match self {
            Self::Ticket => "updateTicket",
            Self::Client => "updateClient",
            Self::Asset => "updateAsset",
        }
    }

    pub fn delete_field(&self) -> &'static str {
        match self {
            Self::Ticket => "deleteTicket",
            Self::Client => "deleteClient",
            Self::Asset => "deleteAsset",
        }
    }
}

/// How much of an entity a fragment selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    /// Identifier plus a handful of display fields.
    Summary,
    /// The fields most callers need.
    #[default]
    Core,
    /// Everything, including notes, tags and custom fields.
    Full,
}

/// A named, reusable field-selection set.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub name: &'static str,
    pub on_type: &'static str,
    pub fields: &'static str,
    pub dependencies: &'static [&'static str],
}

impl Fragment {
    /// Render the fragment definition for inclusion in a document.
    pub fn definition(&self) -> String {
        format!("fragment {} on {} {{\n{}\n}}", self.name, self.on_type, self.fields)
    }

    /// Render the spread syntax.
    pub fn spread(&self) -> String {
        format!("...{}", self.name)
    }
}

pub const BASE_FIELDS: Fragment = Fragment {
    name: "BaseFields",
    on_type: "BaseModel",
    fields: "  id\n  createdAt\n  updatedAt",
    dependencies: &[],
};

pub const PAGE_INFO_FIELDS: Fragment = Fragment {
    name: "PageInfoFields",
    on_type: "PageInfo",
    fields: "  hasNextPage\n  endCursor\n  total",
    dependencies: &[],
};

pub const TICKET_SUMMARY_FIELDS: Fragment = Fragment {
    name: "TicketSummaryFields",
    on_type: "Ticket",
    fields: "  id\n  title\n  status\n  priority\n  assignedTo\n  createdAt\n  dueDate",
    dependencies: &[],
};

pub const TICKET_CORE_FIELDS: Fragment = Fragment {
    name: "TicketCoreFields",
    on_type: "Ticket",
    fields: "  ...BaseFields\n  clientId\n  siteId\n  assetId\n  contactId\n  title\n  status\n  priority\n  assignedTo",
    dependencies: &["BaseFields"],
};

pub const TICKET_FULL_FIELDS: Fragment = Fragment {
    name: "TicketFullFields",
    on_type: "Ticket",
    fields: "  ...TicketCoreFields\n  description\n  dueDate\n  resolution\n  timeSpent\n  tags\n  customFields",
    dependencies: &["TicketCoreFields"],
};

pub const CLIENT_SUMMARY_FIELDS: Fragment = Fragment {
    name: "ClientSummaryFields",
    on_type: "Client",
    fields: "  id\n  name\n  email\n  status",
    dependencies: &[],
};

pub const CLIENT_CORE_FIELDS: Fragment = Fragment {
    name: "ClientCoreFields",
    on_type: "Client",
    fields: "  ...BaseFields\n  name\n  email\n  phone\n  status",
    dependencies: &["BaseFields"],
};

pub const CLIENT_FULL_FIELDS: Fragment = Fragment {
    name: "ClientFullFields",
    on_type: "Client",
    fields: "  ...ClientCoreFields\n  address\n  billingAddress\n  notes\n  tags\n  customFields",
    dependencies: &["ClientCoreFields"],
};

pub const ASSET_SUMMARY_FIELDS: Fragment = Fragment {
    name: "AssetSummaryFields",
    on_type: "Asset",
    fields: "  id\n  name\n  assetType\n  status\n  manufacturer\n  model",
    dependencies: &[],
};

pub const ASSET_CORE_FIELDS: Fragment = Fragment {
    name: "AssetCoreFields",
    on_type: "Asset",
    fields: "  ...BaseFields\n  clientId\n  siteId\n  name\n  assetType\n  status",
    dependencies: &["BaseFields"],
};

pub const ASSET_FULL_FIELDS: Fragment = Fragment {
    name: "AssetFullFields",
    on_type: "Asset",
    fields: "  ...AssetCoreFields\n  manufacturer\n  model\n  serialNumber\n  purchaseDate\n  warrantyExpiry\n  location\n  notes\n  customFields",
    dependencies: &["AssetCoreFields"],
};

static REGISTRY: Lazy<BTreeMap<&'static str, Fragment>> = Lazy::new(|| {
    let fragments = [
        BASE_FIELDS,
        PAGE_INFO_FIELDS,
        TICKET_SUMMARY_FIELDS,
        TICKET_CORE_FIELDS,
        TICKET_FULL_FIELDS,
        CLIENT_SUMMARY_FIELDS,
        CLIENT_CORE_FIELDS,
        CLIENT_FULL_FIELDS,
        ASSET_SUMMARY_FIELDS,
        ASSET_CORE_FIELDS,
        ASSET_FULL_FIELDS,
    ];
    fragments.into_iter().map(|f| (f.name, f)).collect()
});

/// Look up a registered fragment by name.
pub fn lookup(name: &str) -> Option<&'static Fragment> {
    REGISTRY.get(name)
}

/// The fragment an entity uses at a given detail level.
pub fn entity_fragment(entity: EntityType, detail: DetailLevel) -> &'static Fragment {
    let name = match (entity, detail) {
        (EntityType::Ticket, DetailLevel::Summary) => "TicketSummaryFields",
        (EntityType::Ticket, DetailLevel::Core) => "TicketCoreFields",
        (EntityType::Ticket, DetailLevel::Full) => "TicketFullFields",
        (EntityType::Client, DetailLevel::Summary) => "ClientSummaryFields",
        (EntityType::Client, DetailLevel::Core) => "ClientCoreFields",
        (EntityType::Client, DetailLevel::Full) => "ClientFullFields",
        (EntityType::Asset, DetailLevel::Summary) => "AssetSummaryFields",
        (EntityType::Asset, DetailLevel::Core) => "AssetCoreFields",
        (EntityType::Asset, DetailLevel::Full) => "AssetFullFields",
    };
    REGISTRY
        .get(name)
        .expect("entity fragments are registered at startup")
}

/// Resolve a set of fragment names into definitions, following dependencies
/// transitively. Each fragment appears exactly once and the output order is
/// alphabetical so identical inputs always render identical documents.
pub fn resolve(names: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<&'static Fragment> {
    let mut resolved: BTreeMap<&'static str, &'static Fragment> = BTreeMap::new();
    let mut pending: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();

    while let Some(name) = pending.pop() {
        if let Some(fragment) = lookup(&name) {
            if resolved.insert(fragment.name, fragment).is_none() {
                pending.extend(fragment.dependencies.iter().map(|d| (*d).to_string()));
            }
        }
    }

    resolved.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_definition_rendering() {
        let def = PAGE_INFO_FIELDS.definition();
        assert!(def.starts_with("fragment PageInfoFields on PageInfo {"));
        assert!(def.contains("hasNextPage"));
        assert!(def.contains("endCursor"));
        assert_eq!(PAGE_INFO_FIELDS.spread(), "...PageInfoFields");
    }

    #[test]
    fn test_registry_lookup() {
        assert!(lookup("TicketCoreFields").is_some());
        assert!(lookup("NoSuchFragment").is_none());
    }

    #[test]
    fn test_entity_fragment_selection() {
        assert_eq!(
            entity_fragment(EntityType::Ticket, DetailLevel::Core).name,
            "TicketCoreFields"
        );
        assert_eq!(
            entity_fragment(EntityType::Asset, DetailLevel::Full).name,
            "AssetFullFields"
        );
    }

    #[test]
    fn test_resolve_follows_dependencies() {
        let resolved = resolve(["TicketFullFields"]);
        let names: Vec<&str> = resolved.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["BaseFields", "TicketCoreFields", "TicketFullFields"]);
    }

    #[test]
    fn test_resolve_deduplicates() {
        // Both fragments pull in BaseFields; it must appear once.
        let resolved = resolve(["TicketCoreFields", "ClientCoreFields", "BaseFields"]);
        let base_count = resolved.iter().filter(|f| f.name == "BaseFields").count();
        assert_eq!(base_count, 1);
    }
}
