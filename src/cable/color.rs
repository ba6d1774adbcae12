//! Hex color -> human color name, for cable ordering

pub const UNSPECIFIED: &str = "Unspecified";
pub const UNKNOWN: &str = "Unknown";

/// Parse `#RGB` / `#RRGGBB` (the `#` is optional) into RGB bytes
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let clean = hex.trim().trim_start_matches('#');
    if !clean.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match clean.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&clean[i..i + 1], 16).ok().map(|v| v * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&clean[i..i + 2], 16).ok();
            Some((byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

/// Convert RGB to (hue degrees, saturation 0..1, value 0..1)
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    (hue, saturation, max)
}

/// Bucket a hex color into a short English name
pub fn color_name(hex: &str) -> String {
    if hex.trim().is_empty() {
        return UNSPECIFIED.to_string();
    }
    let Some((r, g, b)) = parse_hex(hex) else {
        return UNKNOWN.to_string();
    };
    let (hue, saturation, value) = rgb_to_hsv(r, g, b);

    let name = if value < 0.2 {
        "Black"
    } else if saturation < 0.15 {
        if value > 0.85 {
            "White"
        } else {
            "Grey"
        }
    } else {
        match hue {
            h if h < 15.0 => "Red",
            h if h < 45.0 => "Orange",
            h if h < 70.0 => "Yellow",
            h if h < 165.0 => "Green",
            h if h < 200.0 => "Cyan",
            h if h < 260.0 => "Blue",
            h if h < 290.0 => "Purple",
            h if h < 345.0 => "Pink",
            _ => "Red",
        }
    };
    name.to_string()
}
