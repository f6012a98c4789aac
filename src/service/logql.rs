//! LogQL selector construction from alert labels

use std::collections::HashMap;

/// Label keys that participate in the selector, in output order.
const RECOGNIZED_LABELS: [&str; 5] = ["job", "app", "instance", "namespace", "container"];

/// Selector used when no recognized label is present.
pub const WILDCARD_SELECTOR: &str = "{job=~\".+\"}";

/// Build a LogQL label selector from a sparse alert label set.
///
/// Only recognized keys are emitted, always in `job, app, instance,
/// namespace, container` order regardless of input order; keys with empty
/// values are dropped. Values are embedded verbatim — a label value
/// containing `"` corrupts the selector (out-of-scope edge case).
pub fn build_logql(labels: &HashMap<String, String>) -> String {
    let parts: Vec<String> = RECOGNIZED_LABELS
        .iter()
        .filter_map(|key| {
            labels
                .get(*key)
                .filter(|value| !value.is_empty())
                .map(|value| format!("{key}=\"{value}\""))
        })
        .collect();

    if parts.is_empty() {
        WILDCARD_SELECTOR.to_string()
    } else {
        format!("{{{}}}", parts.join(", "))
    }
}
