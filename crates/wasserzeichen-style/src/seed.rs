// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deterministic watermark style generation.
//
// A seed tuple (text, anchor, document id, user id, optional nonce) is joined
// with `|`, base64-encoded and folded into a 32-bit signed hash. Every style
// parameter is then a bounded residue of |hash|. The fold must stay bit-exact:
// other clients derive the same style from the same seed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use wasserzeichen_core::{AnchorId, ColorValue, GeneratedStyle, StyleMode, clamp_opacity};

const INITIAL_FONTS: [&str; 3] = ["Arial", "Georgia", "Courier New"];
const VARIANT_FONTS: [&str; 5] = ["Arial", "Georgia", "Courier New", "Times New Roman", "Verdana"];

/// Base value and modulus of each derived parameter.
struct StyleRanges {
    fonts: &'static [&'static str],
    size: (u32, u32),
    saturation: (u32, u32),
    lightness: (u32, u32),
    /// Opacity in hundredths.
    opacity: (u32, u32),
    rotation: (i32, u32),
    offset: (i32, u32),
}

const INITIAL: StyleRanges = StyleRanges {
    fonts: &INITIAL_FONTS,
    size: (30, 40),
    saturation: (50, 30),
    lightness: (30, 40),
    opacity: (15, 45),
    rotation: (-45, 90),
    offset: (-10, 20),
};

const VARIANT: StyleRanges = StyleRanges {
    fonts: &VARIANT_FONTS,
    size: (25, 50),
    saturation: (40, 40),
    lightness: (25, 50),
    opacity: (12, 48),
    rotation: (-90, 180),
    offset: (-15, 30),
};

/// Join the seed tuple. The nonce is appended only when present.
pub fn seed_string(
    text: &str,
    anchor: AnchorId,
    document_id: &str,
    user_id: &str,
    nonce: Option<&str>,
) -> String {
    let mut seed = format!("{text}|{anchor}|{document_id}|{user_id}");
    if let Some(nonce) = nonce {
        seed.push('|');
        seed.push_str(nonce);
    }
    seed
}

/// Fold bytes into a signed 32-bit hash: `h = h * 31 + c`, written as
/// `(h << 5) - h + c`, wrapping on overflow.
pub fn rolling_hash(bytes: &[u8]) -> i32 {
    bytes
        .iter()
        .fold(0i32, |h, &c| (h << 5).wrapping_sub(h).wrapping_add(i32::from(c)))
}

/// Derive a style from the seed tuple. Pure: equal inputs give equal output.
///
/// Without a nonce the initial ranges apply; with one, the wider variant ranges.
pub fn generate(
    text: &str,
    anchor: AnchorId,
    document_id: &str,
    user_id: &str,
    nonce: Option<&str>,
) -> GeneratedStyle {
    let seed = seed_string(text, anchor, document_id, user_id, nonce);
    let encoded = STANDARD.encode(seed.as_bytes());
    let hash = rolling_hash(encoded.as_bytes());
    let m = hash.unsigned_abs();

    let (mode, ranges) = match nonce {
        None => (StyleMode::Initial, &INITIAL),
        Some(_) => (StyleMode::Variant, &VARIANT),
    };

    let offset = ranges.offset.0 + (m % ranges.offset.1) as i32;
    let style = GeneratedStyle {
        font_family: ranges.fonts[(m as usize) % ranges.fonts.len()].to_string(),
        font_size_px: ranges.size.0 + m % ranges.size.1,
        color: ColorValue::hsl(
            (m % 360) as u16,
            (ranges.saturation.0 + m % ranges.saturation.1) as u8,
            (ranges.lightness.0 + m % ranges.lightness.1) as u8,
        ),
        opacity: clamp_opacity((ranges.opacity.0 + m % ranges.opacity.1) as f32 / 100.0),
        rotation_degrees: ranges.rotation.0 + (m % ranges.rotation.1) as i32,
        offset_x: offset,
        offset_y: offset,
        mode,
        seed,
        hash,
    };

    debug!(hash, ?mode, font = %style.font_family, "generated watermark style");
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue_of(style: &GeneratedStyle) -> u16 {
        match style.color {
            ColorValue::Hsl { hue, .. } => hue,
            other => panic!("expected hsl colour, got {other}"),
        }
    }

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(rolling_hash(b""), 0);
        assert_eq!(rolling_hash(b"a"), 97);
        assert_eq!(rolling_hash(b"ab"), 97 * 31 + 98);
        // "hello" is the textbook multiply-by-31 string hash.
        assert_eq!(rolling_hash(b"hello"), 99_162_322);
    }

    #[test]
    fn hash_wraps_instead_of_overflowing() {
        let long = vec![b'z'; 64];
        let expected = long
            .iter()
            .fold(0i64, |h, &c| (h * 31 + i64::from(c)) as i32 as i64);
        assert_eq!(i64::from(rolling_hash(&long)), expected);
    }

    #[test]
    fn seed_string_appends_nonce_only_when_given() {
        assert_eq!(
            seed_string("DRAFT", AnchorId::TopLeft, "doc1", "u1", None),
            "DRAFT|top-left|doc1|u1"
        );
        assert_eq!(
            seed_string("DRAFT", AnchorId::TopLeft, "doc1", "u1", Some("1700000000")),
            "DRAFT|top-left|doc1|u1|1700000000"
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate("CONFIDENTIAL", AnchorId::Centered, "doc-42", "user-7", None);
        let b = generate("CONFIDENTIAL", AnchorId::Centered, "doc-42", "user-7", None);
        assert_eq!(a, b);
        assert_eq!(a.mode, StyleMode::Initial);
        assert_eq!(a.seed, "CONFIDENTIAL|centered|doc-42|user-7");
    }

    #[test]
    fn derived_fields_follow_the_hash() {
        let style = generate("CONFIDENTIAL", AnchorId::Centered, "doc-42", "user-7", None);
        let m = style.hash.unsigned_abs();
        assert_eq!(style.font_family, INITIAL_FONTS[(m % 3) as usize]);
        assert_eq!(style.font_size_px, 30 + m % 40);
        assert_eq!(u32::from(hue_of(&style)), m % 360);
        assert_eq!(style.rotation_degrees, -45 + (m % 90) as i32);
        assert_eq!(style.offset_x, -10 + (m % 20) as i32);
        assert_eq!(style.offset_x, style.offset_y);
    }

    #[test]
    fn nonces_produce_variants() {
        let a = generate("CONFIDENTIAL", AnchorId::Centered, "doc-42", "user-7", Some("1700000000001"));
        let b = generate("CONFIDENTIAL", AnchorId::Centered, "doc-42", "user-7", Some("1700000000002"));
        assert_eq!(a.mode, StyleMode::Variant);
        assert_ne!(a.hash, b.hash);
        assert_ne!(a, b);
    }

    #[test]
    fn fields_stay_in_bounds_across_seed_space() {
        // Small LCG so the sweep is reproducible.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            state >> 33
        };

        for i in 0..2_000 {
            let text = format!("wm-{}", next());
            let doc = format!("doc-{}", next());
            let user = format!("user-{}", next() % 97);
            let anchor = AnchorId::ALL[(next() % 9) as usize];
            let nonce = (i % 2 == 1).then(|| next().to_string());
            let style = generate(&text, anchor, &doc, &user, nonce.as_deref());

            assert!(hue_of(&style) < 360);
            let (size, opacity, rotation, offset) = match style.mode {
                StyleMode::Initial => (30..70, 0.15..=0.59, -45..45, -10..10),
                StyleMode::Variant => (25..75, 0.12..=0.59, -90..90, -15..15),
            };
            assert!(size.contains(&style.font_size_px), "size {}", style.font_size_px);
            assert!(opacity.contains(&style.opacity), "opacity {}", style.opacity);
            assert!(rotation.contains(&style.rotation_degrees));
            assert!(offset.contains(&style.offset_x));
        }
    }

    #[test]
    fn variant_palette_is_wider() {
        let fonts: std::collections::BTreeSet<String> = (0..200)
            .map(|n| generate("X", AnchorId::TopLeft, "d", "u", Some(n.to_string().as_str())).font_family)
            .collect();
        assert!(fonts.len() > 3, "only saw {fonts:?}");
        assert!(fonts.iter().all(|f| VARIANT_FONTS.contains(&f.as_str())));
    }
}
