// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watermark colour values: CSS-style strings in, RGB triples out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WasserzeichenError;

/// A watermark colour as the user (or the style generator) expressed it.
///
/// The textual form is preserved so previews and persisted records show
/// exactly what was chosen; raster export converts to RGB via [`ColorValue::to_rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorValue {
    Rgb { r: u8, g: u8, b: u8 },
    /// Hue in degrees `[0, 360)`, saturation and lightness in percent.
    Hsl { hue: u16, saturation: u8, lightness: u8 },
}

impl ColorValue {
    pub const BLACK: ColorValue = ColorValue::Rgb { r: 0, g: 0, b: 0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    pub fn hsl(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self::Hsl {
            hue: hue % 360,
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    /// Resolve to an sRGB triple.
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Self::Rgb { r, g, b } => [r, g, b],
            Self::Hsl { hue, saturation, lightness } => hsl_to_rgb(
                f32::from(hue % 360),
                f32::from(saturation.min(100)) / 100.0,
                f32::from(lightness.min(100)) / 100.0,
            ),
        }
    }
}

impl Default for ColorValue {
    fn default() -> Self {
        Self::BLACK
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r1), to_byte(g1), to_byte(b1)]
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Hsl { hue, saturation, lightness } => {
                write!(f, "hsl({hue}, {saturation}%, {lightness}%)")
            }
        }
    }
}

impl From<ColorValue> for String {
    fn from(value: ColorValue) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ColorValue {
    type Error = WasserzeichenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ColorValue {
    type Err = WasserzeichenError;

    /// Accepts `#RGB`, `#RRGGBB`, `rgb(r, g, b)`, `hsl(h, s%, l%)` and a
    /// handful of colour names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let invalid = || WasserzeichenError::InvalidColor(trimmed.to_string());

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = function_args(&lower, "rgb") {
            let [r, g, b] = parse_components(args).ok_or_else(invalid)?;
            let byte = |v: f32| (0.0..=255.0).contains(&v).then(|| v.round() as u8);
            return match (byte(r), byte(g), byte(b)) {
                (Some(r), Some(g), Some(b)) => Ok(Self::Rgb { r, g, b }),
                _ => Err(invalid()),
            };
        }
        if let Some(args) = function_args(&lower, "hsl") {
            let [h, s, l] = parse_components(args).ok_or_else(invalid)?;
            if !(0.0..=100.0).contains(&s) || !(0.0..=100.0).contains(&l) {
                return Err(invalid());
            }
            let hue = h.rem_euclid(360.0).round() as u16 % 360;
            return Ok(Self::hsl(hue, s.round() as u8, l.round() as u8));
        }

        match lower.as_str() {
            "black" => Ok(Self::rgb(0, 0, 0)),
            "white" => Ok(Self::rgb(255, 255, 255)),
            "red" => Ok(Self::rgb(255, 0, 0)),
            "green" => Ok(Self::rgb(0, 128, 0)),
            "blue" => Ok(Self::rgb(0, 0, 255)),
            "gray" | "grey" => Ok(Self::rgb(128, 128, 128)),
            _ => Err(invalid()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<ColorValue> {
    if !hex.is_ascii() {
        return None;
    }
    let digit = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        // #RGB: each digit doubled, 0xF -> 0xFF
        3 => Some(ColorValue::rgb(digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17)),
        6 => Some(ColorValue::rgb(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
        _ => None,
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_components(args: &str) -> Option<[f32; 3]> {
    let mut values = args
        .split(',')
        .map(|part| part.trim().trim_end_matches('%').trim().parse::<f32>().ok());
    let parsed = [values.next()??, values.next()??, values.next()??];
    if values.next().is_some() || parsed.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!("#fff".parse::<ColorValue>().unwrap(), ColorValue::rgb(255, 255, 255));
        assert_eq!("#FF8000".parse::<ColorValue>().unwrap(), ColorValue::rgb(255, 128, 0));
    }

    #[test]
    fn parses_rgb_and_hsl_functions() {
        assert_eq!("rgb(10, 20, 30)".parse::<ColorValue>().unwrap(), ColorValue::rgb(10, 20, 30));
        assert_eq!(
            "hsl(210, 55%, 40%)".parse::<ColorValue>().unwrap(),
            ColorValue::hsl(210, 55, 40)
        );
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12", "#gggggg", "rgb(1,2)", "rgb(300, 0, 0)", "hsl(10, 120%, 5%)", "mauve-ish", "#ä12"] {
            assert!(bad.parse::<ColorValue>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for value in [ColorValue::rgb(1, 2, 3), ColorValue::hsl(359, 79, 69)] {
            assert_eq!(value.to_string().parse::<ColorValue>().unwrap(), value);
        }
    }

    #[test]
    fn hsl_converts_to_expected_rgb() {
        assert_eq!(ColorValue::hsl(0, 100, 50).to_rgb(), [255, 0, 0]);
        assert_eq!(ColorValue::hsl(120, 100, 50).to_rgb(), [0, 255, 0]);
        assert_eq!(ColorValue::hsl(240, 100, 50).to_rgb(), [0, 0, 255]);
        assert_eq!(ColorValue::hsl(0, 0, 100).to_rgb(), [255, 255, 255]);
        assert_eq!(ColorValue::hsl(200, 0, 0).to_rgb(), [0, 0, 0]);
    }

    #[test]
    fn serializes_as_css_string() {
        let json = serde_json::to_string(&ColorValue::hsl(12, 60, 45)).unwrap();
        assert_eq!(json, "\"hsl(12, 60%, 45%)\"");
        let back: ColorValue = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(back, ColorValue::BLACK);
    }
}
