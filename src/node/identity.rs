use crate::node::node_model::NodeSnapshot;

/// Fingerprint of an absent snapshot. Real fingerprints always contain
/// an unescaped `:` separator, so this can never collide with one.
pub const NULL_FINGERPRINT: &str = "[null node]";

/// Logical identity of a node for the duration of one exploration run:
/// `id:rect:text:contentDescription`.
///
/// Two snapshots share a fingerprint iff all four components are equal.
/// Components are escaped so that a `:` inside, say, the text cannot shift
/// a boundary and make two different tuples render the same.
pub fn fingerprint(node: Option<&NodeSnapshot>) -> String {
    let Some(node) = node else {
        return NULL_FINGERPRINT.to_string();
    };

    format!(
        "{}:{}:{}:{}",
        escape(&node.id),
        node.bounds,
        escape(node.text()),
        escape(node.content_description())
    )
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        if c == '\\' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
