use std::collections::BTreeMap;
use std::path::Path;

/// Fill color used when neither the device nor its type has one
pub const DEFAULT_DEVICE_COLOR: &str = "#FFFFFF";

/// Pick a device fill color: explicit color, then the type color, then white
pub fn device_color(
    color: Option<&str>,
    device_type: Option<&str>,
    type_colors: &BTreeMap<String, String>,
) -> String {
    if let Some(color) = color {
        return color.to_string();
    }
    device_type
        .and_then(|t| type_colors.get(t))
        .cloned()
        .unwrap_or_else(|| DEFAULT_DEVICE_COLOR.to_string())
}

/// Convert a device name to a DOT node id
/// e.g., "Rack 1/Switch A" -> "Rack_1_Switch_A"
pub fn dot_id(name: &str) -> String {
    name.replace([' ', '/'], "_")
}

/// Convert a layer name to an output file stem
/// e.g., "Network A/B" -> "network_a_b"
pub fn layer_file_stem(name: &str) -> String {
    dot_id(name).to_lowercase()
}

/// Escape text placed inside a DOT double-quoted string
pub fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape text placed inside a DOT HTML-like label
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reduce a client-supplied filename to its final component.
/// Returns `default` when nothing usable is left.
pub fn sanitize_filename(name: &str, default: &str) -> String {
    Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .map(|n| n.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Format meters the way the reports print them
pub fn format_meters(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}
