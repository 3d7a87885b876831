#![allow(dead_code)]

use keynav_check::frame::frame_model::{FrameCapture, PixelFormat};
use keynav_check::node::node_model::{
    NodeSnapshot, PROP_CLICKABLE, PROP_CONTENT_DESC, PROP_FOCUSED, PROP_TEXT, Rect,
};

/// Focused, clickable node laid out in a vertical list by `index`.
pub fn node(id: &str, index: i32) -> NodeSnapshot {
    NodeSnapshot::new(id, Rect::new(0, index * 50, 100, index * 50 + 40))
        .with_property(PROP_CLICKABLE, "true")
        .with_property(PROP_FOCUSED, "true")
        .with_property(PROP_TEXT, id)
}

/// Focused node that is not clickable.
pub fn non_clickable(id: &str, index: i32) -> NodeSnapshot {
    node(id, index).with_property(PROP_CLICKABLE, "false")
}

pub fn with_description(node: NodeSnapshot, desc: &str) -> NodeSnapshot {
    node.with_property(PROP_CONTENT_DESC, desc)
}

/// `count` distinct nodes, `n0`, `n1`, ...
pub fn distinct_nodes(count: usize) -> Vec<NodeSnapshot> {
    (0..count).map(|i| node(&format!("id/n{}", i), i as i32)).collect()
}

/// Solid RGBA8888 frame.
pub fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> FrameCapture {
    let data = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    FrameCapture::new(width, height, PixelFormat::rgba8888(), data)
}

/// RGBA8888 frame from raw bytes.
pub fn raw_frame(width: u32, height: u32, data: Vec<u8>) -> FrameCapture {
    FrameCapture::new(width, height, PixelFormat::rgba8888(), data)
}

/// Distinct solid frames, one per shade.
pub fn shaded_frames(count: usize) -> Vec<FrameCapture> {
    (0..count)
        .map(|i| solid_frame(4, 4, [i as u8, 0, 0, 255]))
        .collect()
}
