//! Address mapping between the network's advertised, library-node and
//! coordination-hub addresses.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One library-node ↔ coordination-hub address pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePair {
    /// Library-node address (where the catalog lives).
    pub node: String,
    /// Coordination-hub address (where handshake calls go).
    pub hub: String,
}

/// Address mapper for the network topology.
///
/// Two tables, both configuration-driven:
///
/// - **aliases** rewrite externally-observed addresses (dev loopbacks,
///   legacy hostnames) to the canonical library-node address. Unmapped
///   addresses pass through unchanged.
/// - **pairs** bind each library-node address to its coordination hub,
///   one-to-one in both directions.
///
/// [`normalize`](Self::normalize) is total, deterministic and
/// idempotent: alias chains are collapsed when the map is built, so a
/// canonical address never maps anywhere else.
#[derive(Debug, Default)]
pub struct NetMap {
    aliases: HashMap<String, String>,
    node_to_hub: HashMap<String, String>,
    hub_to_node: HashMap<String, String>,
}

fn trim_address(addr: &str) -> &str {
    addr.trim().trim_end_matches('/')
}

/// Collapse alias chains to their final target. Entries on a cycle are
/// dropped, which leaves those addresses unmapped (identity).
fn collapse(raw: &HashMap<String, String>) -> HashMap<String, String> {
    let mut resolved = HashMap::with_capacity(raw.len());
    'keys: for (key, first) in raw {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(key);
        let mut target = first;
        while let Some(next) = raw.get(target.as_str()) {
            if !seen.insert(target) {
                tracing::warn!(alias = %key, "dropping alias cycle");
                continue 'keys;
            }
            target = next;
        }
        if target != key {
            resolved.insert(key.clone(), target.clone());
        }
    }
    resolved
}

impl NetMap {
    /// Build a map from alias and pairing tables.
    ///
    /// Addresses are trimmed of whitespace and trailing slashes on both
    /// sides. Pairings that would bind an already-bound address are
    /// ignored with a warning, keeping both directions one-to-one.
    pub fn new(aliases: HashMap<String, String>, pairs: Vec<NodePair>) -> Self {
        let raw: HashMap<String, String> = aliases
            .iter()
            .map(|(k, v)| (trim_address(k).to_string(), trim_address(v).to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        let aliases = collapse(&raw);

        let apply = |addr: &str| -> String {
            let trimmed = trim_address(addr);
            aliases
                .get(trimmed)
                .cloned()
                .unwrap_or_else(|| trimmed.to_string())
        };

        let mut node_to_hub = HashMap::new();
        let mut hub_to_node = HashMap::new();
        for pair in pairs {
            let node = apply(&pair.node);
            let hub = apply(&pair.hub);
            if node.is_empty() || hub.is_empty() {
                continue;
            }
            if node_to_hub.contains_key(&node) || hub_to_node.contains_key(&hub) {
                tracing::warn!(%node, %hub, "ignoring duplicate address pairing");
                continue;
            }
            node_to_hub.insert(node.clone(), hub.clone());
            hub_to_node.insert(hub, node);
        }

        Self {
            aliases,
            node_to_hub,
            hub_to_node,
        }
    }

    /// An empty map: every address passes through unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The development topology used when no network config is given:
    /// two libraries behind localhost port-forwards, each with its hub.
    pub fn dev_default() -> Self {
        let aliases = HashMap::from([
            (
                "http://localhost:8001".to_string(),
                "http://library-a:8000".to_string(),
            ),
            (
                "http://localhost:8002".to_string(),
                "http://library-b:8000".to_string(),
            ),
        ]);
        let pairs = vec![
            NodePair {
                node: "http://library-a:8000".into(),
                hub: "http://hub-a:8080".into(),
            },
            NodePair {
                node: "http://library-b:8000".into(),
                hub: "http://hub-b:8080".into(),
            },
        ];
        Self::new(aliases, pairs)
    }

    /// Rewrite an address to its canonical library-node form.
    ///
    /// Unmapped addresses pass through with only whitespace and trailing
    /// slashes removed. Applying this twice never changes the result.
    pub fn normalize(&self, addr: &str) -> String {
        let trimmed = trim_address(addr);
        self.aliases
            .get(trimmed)
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// The coordination-hub address responsible for the given address.
    ///
    /// Falls back to the canonical address itself when no pairing is
    /// configured, so an unpaired peer is simply addressed directly.
    pub fn coordination_endpoint(&self, addr: &str) -> String {
        let canonical = self.normalize(addr);
        self.node_to_hub
            .get(&canonical)
            .cloned()
            .unwrap_or(canonical)
    }

    /// The library-node address behind the given coordination address.
    /// Inverse of [`coordination_endpoint`](Self::coordination_endpoint).
    pub fn node_endpoint(&self, addr: &str) -> String {
        let canonical = self.normalize(addr);
        self.hub_to_node
            .get(&canonical)
            .cloned()
            .unwrap_or(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_alias_rewrites_known_addresses() {
        let map = NetMap::dev_default();
        assert_eq!(map.normalize("http://localhost:8001"), "http://library-a:8000");
        assert_eq!(map.normalize("http://localhost:8001/"), "http://library-a:8000");
        assert_eq!(map.normalize("  http://localhost:8002  "), "http://library-b:8000");
    }

    #[test]
    fn test_unmapped_addresses_pass_through() {
        let map = NetMap::dev_default();
        assert_eq!(map.normalize("http://lib-c.local"), "http://lib-c.local");
        assert_eq!(map.normalize("http://lib-c.local///"), "http://lib-c.local");
        assert_eq!(map.normalize(""), "");
    }

    #[test]
    fn test_alias_chains_collapse() {
        let map = NetMap::new(
            HashMap::from([
                ("http://old".to_string(), "http://mid".to_string()),
                ("http://mid".to_string(), "http://final".to_string()),
            ]),
            Vec::new(),
        );
        assert_eq!(map.normalize("http://old"), "http://final");
        assert_eq!(map.normalize("http://mid"), "http://final");
        assert_eq!(map.normalize("http://final"), "http://final");
    }

    #[test]
    fn test_alias_cycles_are_dropped() {
        let map = NetMap::new(
            HashMap::from([
                ("http://a".to_string(), "http://b".to_string()),
                ("http://b".to_string(), "http://a".to_string()),
            ]),
            Vec::new(),
        );
        assert_eq!(map.normalize("http://a"), "http://a");
        assert_eq!(map.normalize("http://b"), "http://b");
    }

    #[test]
    fn test_pairing_round_trips_without_crossing() {
        let map = NetMap::dev_default();

        assert_eq!(
            map.coordination_endpoint("http://library-a:8000"),
            "http://hub-a:8080"
        );
        assert_eq!(
            map.coordination_endpoint("http://library-b:8000"),
            "http://hub-b:8080"
        );
        assert_eq!(map.node_endpoint("http://hub-a:8080"), "http://library-a:8000");
        assert_eq!(map.node_endpoint("http://hub-b:8080"), "http://library-b:8000");

        // Round trip ends where it started, never at the other library.
        let there = map.coordination_endpoint("http://library-a:8000");
        assert_eq!(map.node_endpoint(&there), "http://library-a:8000");
    }

    #[test]
    fn test_pairing_applies_aliases_first() {
        let map = NetMap::dev_default();
        assert_eq!(
            map.coordination_endpoint("http://localhost:8001/"),
            "http://hub-a:8080"
        );
    }

    #[test]
    fn test_unpaired_addresses_are_addressed_directly() {
        let map = NetMap::dev_default();
        assert_eq!(
            map.coordination_endpoint("http://lib-c.local"),
            "http://lib-c.local"
        );
        assert_eq!(map.node_endpoint("http://lib-c.local"), "http://lib-c.local");
    }

    #[test]
    fn test_duplicate_pairings_keep_first_binding() {
        let map = NetMap::new(
            HashMap::new(),
            vec![
                NodePair {
                    node: "http://n1".into(),
                    hub: "http://h1".into(),
                },
                NodePair {
                    node: "http://n1".into(),
                    hub: "http://h2".into(),
                },
                NodePair {
                    node: "http://n2".into(),
                    hub: "http://h1".into(),
                },
            ],
        );
        assert_eq!(map.coordination_endpoint("http://n1"), "http://h1");
        assert_eq!(map.node_endpoint("http://h1"), "http://n1");
        assert_eq!(map.coordination_endpoint("http://n2"), "http://n2");
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent_on_dev_topology(addr in ".{0,40}") {
            let map = NetMap::dev_default();
            let once = map.normalize(&addr);
            let twice = map.normalize(&once);
            prop_assert_eq!(once, twice);
        }

        // Tiny alphabet so chains and cycles show up often.
        #[test]
        fn prop_normalize_idempotent_for_any_table(
            table in prop::collection::hash_map("[a-c]{1,2}", "[a-c]{1,2}", 0..6),
            addr in "[a-c]{0,2}",
        ) {
            let map = NetMap::new(table, Vec::new());
            let once = map.normalize(&addr);
            let twice = map.normalize(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
