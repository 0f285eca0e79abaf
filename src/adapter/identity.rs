// src/adapter/identity.rs

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::arj::params::QueryParams;
use crate::model::slot::{SupplyChain, SupplyChainNode};

/// Identity-provider key → legacy query argument. Providers not listed here
/// are silently dropped.
static PROVIDER_QUERY_KEYS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("britepoolid", "britepoolid"), // BritePool ID
        ("criteoId", "criteoid"),       // Criteo ID
        ("digitrustid", "digitrustid"), // DigiTrust
        ("id5id", "id5id"),             // ID5 ID
        ("idl_env", "lre"),             // LiveRamp IdentityLink
        ("lipb", "lipbid"),             // LiveIntent ID
        ("netId", "netid"),             // netID
        ("parrableid", "parrableid"),   // Parrable ID
        ("pubcid", "pubcid"),           // PubCommon ID
        ("tdid", "ttduuid"),            // The Trade Desk Unified ID
    ])
});

/// Appends mapped identity-provider values to the legacy query parameters.
/// Two providers carry their value one level deep; everything else is
/// forwarded directly.
pub fn append_user_ids(params: &mut QueryParams, user_ids: &BTreeMap<String, Value>) {
    for (provider, value) in user_ids {
        let Some(query_key) = PROVIDER_QUERY_KEYS.get(provider.as_str()) else {
            debug!(provider, "unknown identity provider dropped");
            continue;
        };
        let extracted = match provider.as_str() {
            "digitrustid" => value.pointer("/data/id"),
            "lipb" => value.get("lipbid"),
            _ => Some(value),
        };
        if let Some(text) = extracted.and_then(scalar_to_string) {
            params.set(query_key, text);
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Serializes a supply chain to the exchange's compact string form:
/// `ver,complete!node1!node2!...`, each node being the six fields
/// `asi,sid,hp,rid,name,domain` in fixed order with missing fields empty.
pub fn serialize_supply_chain(schain: &SupplyChain) -> String {
    let nodes = schain
        .nodes
        .iter()
        .map(serialize_node)
        .collect::<Vec<_>>()
        .join("!");
    format!("{},{}!{}", schain.ver, schain.complete, nodes)
}

fn serialize_node(node: &SupplyChainNode) -> String {
    let hp = match node.hp {
        Some(hp) if hp != 0 => hp.to_string(),
        _ => String::new(),
    };
    [
        node.asi.clone().unwrap_or_default(),
        node.sid.clone().unwrap_or_default(),
        hp,
        node.rid.clone().unwrap_or_default(),
        node.name.clone().unwrap_or_default(),
        node.domain.clone().unwrap_or_default(),
    ]
    .join(",")
}
