// Per-kind payload builders.

pub mod histogram;
pub mod line;
pub mod scatter;

use crate::payload::AxisInfo;
use crate::stats::StatSelector;

/// Resolve an axis token, letting a request label override the stat label.
pub(crate) fn axis(token: &str, label_override: Option<&String>) -> (StatSelector, AxisInfo) {
    let selector = StatSelector::resolve(token);
    let info = AxisInfo {
        stat: selector.token.clone(),
        label: label_override.cloned().unwrap_or_else(|| selector.label()),
    };
    (selector, info)
}
