//! HTML/CSS color string parsing.

use super::{Color, Hsla};
use crate::error::{Error, Result};

/// CSS named colors (lowercase).
const NAMED_COLORS: &[(&str, u32)] = &[
    ("aqua", 0x00ff_ffff),
    ("black", 0x0000_00ff),
    ("blue", 0x0000_ffff),
    ("brown", 0xa52a_2aff),
    ("coral", 0xff7f_50ff),
    ("crimson", 0xdc14_3cff),
    ("cyan", 0x00ff_ffff),
    ("darkblue", 0x0000_8bff),
    ("darkgray", 0xa9a9_a9ff),
    ("darkgreen", 0x0064_00ff),
    ("darkgrey", 0xa9a9_a9ff),
    ("darkred", 0x8b00_00ff),
    ("fuchsia", 0xff00_ffff),
    ("gold", 0xffd7_00ff),
    ("gray", 0x8080_80ff),
    ("green", 0x0080_00ff),
    ("grey", 0x8080_80ff),
    ("indigo", 0x4b00_82ff),
    ("ivory", 0xffff_f0ff),
    ("khaki", 0xf0e6_8cff),
    ("lightblue", 0xadd8_e6ff),
    ("lightgray", 0xd3d3_d3ff),
    ("lightgreen", 0x90ee_90ff),
    ("lightgrey", 0xd3d3_d3ff),
    ("lime", 0x00ff_00ff),
    ("magenta", 0xff00_ffff),
    ("maroon", 0x8000_00ff),
    ("navy", 0x0000_80ff),
    ("olive", 0x8080_00ff),
    ("orange", 0xffa5_00ff),
    ("pink", 0xffc0_cbff),
    ("purple", 0x8000_80ff),
    ("red", 0xff00_00ff),
    ("salmon", 0xfa80_72ff),
    ("silver", 0xc0c0_c0ff),
    ("skyblue", 0x87ce_ebff),
    ("teal", 0x0080_80ff),
    ("tomato", 0xff63_47ff),
    ("transparent", 0x0000_0000),
    ("turquoise", 0x40e0_d0ff),
    ("violet", 0xee82_eeff),
    ("white", 0xffff_ffff),
    ("yellow", 0xffff_00ff),
];

pub(super) fn parse_html(input: &str) -> Result<Color> {
    let normalized = input.trim().to_ascii_lowercase();
    let invalid = || Error::InvalidColor(input.to_string());

    if let Some(hex) = normalized.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    if let Some((name, args)) = split_function(&normalized) {
        let color = match name {
            "rgb" | "rgba" => parse_rgb_args(&args),
            "hsl" | "hsla" => parse_hsl_args(&args),
            _ => None,
        };
        return color.ok_or_else(invalid);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|&(_, hex)| Color::from_hex(hex))
        .ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Split `name(a, b, c)` into the name and trimmed arguments.
fn split_function(s: &str) -> Option<(&str, Vec<&str>)> {
    let open = s.find('(')?;
    let body = s.strip_suffix(')')?;
    let name = s[..open].trim();
    let args = body[open + 1..].split(',').map(str::trim).collect();
    Some((name, args))
}

fn parse_rgb_args(args: &[&str]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let r = parse_channel(args[0])?;
    let g = parse_channel(args[1])?;
    let b = parse_channel(args[2])?;
    let a = match args.get(3) {
        Some(arg) => (parse_alpha(arg)? * 255.0).round() as u8,
        None => 255,
    };
    Some(Color::new(r, g, b, a))
}

fn parse_hsl_args(args: &[&str]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let h: f32 = args[0].strip_suffix("deg").unwrap_or(args[0]).trim().parse().ok()?;
    let s = parse_percent(args[1])?;
    let l = parse_percent(args[2])?;
    let a = match args.get(3) {
        Some(arg) => parse_alpha(arg)?,
        None => 1.0,
    };
    if !h.is_finite() {
        return None;
    }
    Some(Hsla::new(h, s, l, a).to_color())
}

/// Integer 0-255 or percentage.
fn parse_channel(arg: &str) -> Option<u8> {
    let value = match arg.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0 * 255.0,
        None => arg.parse::<f32>().ok()?,
    };
    value.is_finite().then(|| value.round().clamp(0.0, 255.0) as u8)
}

/// CSS alpha: fraction in [0, 1] or percentage.
fn parse_alpha(arg: &str) -> Option<f32> {
    let value = match arg.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
        None => arg.parse::<f32>().ok()?,
    };
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

fn parse_percent(arg: &str) -> Option<f32> {
    let value = arg.strip_suffix('%')?.trim().parse::<f32>().ok()? / 100.0;
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hex() {
        assert_eq!(Color::from_html("#f00"), Color::new(255, 0, 0, 255));
        assert_eq!(Color::from_html("#0f08"), Color::new(0, 255, 0, 136));
    }

    #[test]
    fn test_long_hex() {
        assert_eq!(Color::from_html("#1e90ff"), Color::rgb(0x1e, 0x90, 0xff));
        assert_eq!(Color::from_html("#11223344"), Color::new(0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("#gg0000").is_err());
        assert!(Color::parse("#ffffffff0").is_err());
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(Color::from_html("rgb(10, 20, 30)"), Color::rgb(10, 20, 30));
        assert_eq!(Color::from_html("rgba(0,0,255,0)"), Color::new(0, 0, 255, 0));
        assert_eq!(Color::from_html("rgba(0,0,255,1)"), Color::BLUE);
        assert_eq!(Color::from_html("rgba(255,255,255,50%)"), Color::new(255, 255, 255, 128));
        assert_eq!(Color::from_html("rgb(100%, 0%, 0%)"), Color::RED);
    }

    #[test]
    fn test_rgb_clamps_out_of_range() {
        assert_eq!(Color::from_html("rgb(300, -5, 0)"), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_hsl_functions() {
        assert_eq!(Color::from_html("hsl(0, 100%, 50%)"), Color::RED);
        let translucent = Color::from_html("hsla(0deg, 100%, 50%, 0)");
        assert_eq!(translucent.a, 0);
        assert_eq!(translucent.r, 255);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::from_html("red"), Color::RED);
        assert_eq!(Color::from_html("  Lime \n"), Color::GREEN);
        assert_eq!(Color::from_html("TRANSPARENT"), Color::TRANSPARENT);
        assert_eq!(Color::from_html("navy"), Color::rgb(0, 0, 128));
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(Color::from_html("  #F00  "), Color::RED);
        assert_eq!(Color::from_html("RGB( 1 , 2 , 3 )"), Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_bogus_is_opaque_black() {
        assert_eq!(Color::from_html("bogus"), Color::BLACK);
        assert_eq!(Color::from_html(""), Color::BLACK);
        assert_eq!(Color::from_html("rgb(1,2)"), Color::BLACK);
        assert_eq!(Color::from_html("hsl(0, 100, 50)"), Color::BLACK);
    }

    #[test]
    fn test_parse_error_message() {
        let err = Color::parse("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
