//! Node box sizing from label length.

use diagrid_core::{geometry::Size, model::NodeSpec};

use crate::config::LayoutConfig;

/// Extra width granted to a node of importance 1.
const IMPORTANCE_SCALE: f32 = 0.25;

/// Computes the box of a node.
///
/// The width follows the label length, is scaled up for important nodes, and is
/// clamped to `[node_width, 2 * node_width]`. The height is always `node_height`.
pub fn node_size(spec: &NodeSpec, config: &LayoutConfig) -> Size {
    let label_len = spec.label.chars().count() as f32;
    let text_width = label_len * config.char_width + config.label_padding;
    let scaled = text_width * (1.0 + IMPORTANCE_SCALE * spec.importance());
    let width = scaled.clamp(config.node_width, 2.0 * config.node_width);
    Size::new(width, config.node_height)
}

/// Computes the boxes of all nodes, in order.
pub fn node_sizes<'a>(
    specs: impl IntoIterator<Item = &'a NodeSpec>,
    config: &LayoutConfig,
) -> Vec<Size> {
    specs
        .into_iter()
        .map(|spec| node_size(spec, config))
        .collect()
}
