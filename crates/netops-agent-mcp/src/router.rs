//! Natural-language question routing for the REPL `/ask` command.
//!
//! Routes are an ordered list of `(predicate, route)` pairs: the first
//! predicate that accepts the lower-cased question wins, and its extractor
//! builds the tool arguments.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use netops_agent::telemetry::TELEMETRY_INTERFACE;

/// A question resolved to a tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub tool: &'static str,
    pub arguments: Value,
}

type Predicate = fn(&str) -> bool;
type Extractor = fn(&str) -> Value;

struct Rule {
    tool: &'static str,
    matches: Predicate,
    extract: Extractor,
}

/// Ordered question router.
pub struct QueryRouter {
    rules: Vec<Rule>,
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl QueryRouter {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Router covering every built-in tool.
    pub fn with_defaults() -> Self {
        let mut router = Self::empty();
        router.add("validate_system_health", is_system_health, no_arguments);
        router.add("predict_link_health", is_link_health, link_health_arguments);
        router.add("remediate_link", is_remediation, remediation_arguments);
        router.add("validate_build_metadata", is_build_check, build_arguments);
        router.add("get_network_topology", is_topology, no_arguments);
        router.add("get_port_telemetry", is_telemetry, no_arguments);
        router
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn add(&mut self, tool: &'static str, matches: Predicate, extract: Extractor) {
        self.rules.push(Rule {
            tool,
            matches,
            extract,
        });
    }

    pub fn route(&self, question: &str) -> Option<Route> {
        let lowered = question.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&lowered))
            .map(|rule| Route {
                tool: rule.tool,
                arguments: (rule.extract)(&lowered),
            })
    }
}

fn contains_any(q: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| q.contains(n))
}

fn is_system_health(q: &str) -> bool {
    contains_any(
        q,
        &["system health", "health check", "integration", "netbox", "servicenow", "zendesk"],
    )
}

fn is_link_health(q: &str) -> bool {
    contains_any(q, &["health", "predict"])
}

fn is_remediation(q: &str) -> bool {
    contains_any(q, &["remediat", "fix", "repair", "recover"])
}

fn is_build_check(q: &str) -> bool {
    contains_any(q, &["build", ".json", "metadata"])
}

fn is_topology(q: &str) -> bool {
    contains_any(q, &["topology", "device", "link", "network"])
}

fn is_telemetry(q: &str) -> bool {
    contains_any(q, &["telemetry", "counter", "port", "error", "utilization", "traffic"])
}

fn no_arguments(_q: &str) -> Value {
    Value::Object(Map::new())
}

fn link_health_arguments(q: &str) -> Value {
    static RX: OnceLock<Regex> = OnceLock::new();
    static TX: OnceLock<Regex> = OnceLock::new();
    static UTIL: OnceLock<Regex> = OnceLock::new();

    let rx = RX.get_or_init(|| counter_regex("rx"));
    let tx = TX.get_or_init(|| counter_regex("tx"));
    let util = UTIL.get_or_init(|| {
        Regex::new(
            r"(?:utilization|util|usage|load)\D{0,6}?(\d+(?:\.\d+)?)\s*(%)?|(\d+(?:\.\d+)?)\s*(%)?\s*(?:utilization|util|usage|load)",
        )
        .expect("utilization pattern is valid")
    });

    let utilization = util
        .captures(q)
        .and_then(|c| {
            let (value, percent) = match c.get(1) {
                Some(v) => (v, c.get(2).is_some()),
                None => (c.get(3)?, c.get(4).is_some()),
            };
            let value: f64 = value.as_str().parse().ok()?;
            Some(if percent || value > 1.0 { value / 100.0 } else { value })
        })
        .unwrap_or(0.0);

    json!({
        "rx_errors": first_count(rx, q),
        "tx_errors": first_count(tx, q),
        "utilization": utilization,
    })
}

/// Matches "3 rx errors", "rx_errors=3", "rx errors: 3".
fn counter_regex(prefix: &str) -> Regex {
    Regex::new(&format!(
        r"(\d+)\s*{prefix}[_ ]?errors?|{prefix}[_ ]?errors?\s*(?:=|:|of|is)?\s*(\d+)"
    ))
    .expect("counter pattern is valid")
}

fn first_count(re: &Regex, q: &str) -> i64 {
    re.captures(q)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn remediation_arguments(q: &str) -> Value {
    static IFACE: OnceLock<Regex> = OnceLock::new();
    let re = IFACE.get_or_init(|| {
        Regex::new(r"\b((?:ethernet|gigabitethernet|tengigabitethernet|port|eth)[\d/.]+)")
            .expect("interface pattern is valid")
    });

    let interface = re
        .captures(q)
        .and_then(|c| c.get(1))
        .map(|m| canonical_interface(m.as_str()))
        .unwrap_or_else(|| TELEMETRY_INTERFACE.to_string());

    json!({ "interface": interface })
}

/// Restore the conventional capitalization lost by lower-casing.
fn canonical_interface(lowered: &str) -> String {
    const PREFIXES: [(&str, &str); 5] = [
        ("tengigabitethernet", "TenGigabitEthernet"),
        ("gigabitethernet", "GigabitEthernet"),
        ("ethernet", "Ethernet"),
        ("port", "port"),
        ("eth", "eth"),
    ];
    for (prefix, canonical) in PREFIXES {
        if let Some(rest) = lowered.strip_prefix(prefix) {
            return format!("{canonical}{rest}");
        }
    }
    lowered.to_string()
}

fn build_arguments(q: &str) -> Value {
    static PATH: OnceLock<Regex> = OnceLock::new();
    let re = PATH.get_or_init(|| Regex::new(r"([\w./-]+\.json)").expect("path pattern is valid"));

    let path = re
        .captures(q)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| {
            if q.contains("cisco") || q.contains("non-sonic") {
                "cisco_build.json".to_string()
            } else {
                "sonic_build.json".to_string()
            }
        });

    json!({ "build_json_path": path })
}
