// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded faces used for burnt-in watermarks. Requested families are mapped
// onto the closest of three DejaVu faces so exports never depend on the
// fonts installed on the host.

use ab_glyph::FontRef;
use wasserzeichen_core::WasserzeichenError;

const SANS: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");
const SERIF: &[u8] = include_bytes!("fonts/DejaVuSerif.ttf");
const MONO: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

const SERIF_FAMILIES: &[&str] = &[
    "serif", "georgia", "times", "times new roman", "garamond", "cambria", "palatino", "book antiqua",
];
const MONO_FAMILIES: &[&str] = &[
    "monospace", "courier", "courier new", "consolas", "menlo", "monaco", "lucida console",
];

/// Generic class of a font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontClass {
    Sans,
    Serif,
    Mono,
}

impl FontClass {
    /// Classify a CSS-style family list; the first recognised name wins and
    /// anything unrecognised is sans.
    pub fn for_family(family: &str) -> Self {
        for name in family.split(',') {
            let name = name.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase();
            if SERIF_FAMILIES.contains(&name.as_str()) {
                return Self::Serif;
            }
            if MONO_FAMILIES.contains(&name.as_str()) {
                return Self::Mono;
            }
            if name == "sans-serif" || name.ends_with("sans") {
                return Self::Sans;
            }
        }
        Self::Sans
    }
}

/// The three embedded faces.
#[derive(Debug, Clone)]
pub struct FontBook {
    sans: FontRef<'static>,
    serif: FontRef<'static>,
    mono: FontRef<'static>,
}

impl FontBook {
    pub fn embedded() -> Result<Self, WasserzeichenError> {
        Ok(Self {
            sans: load("DejaVu Sans", SANS)?,
            serif: load("DejaVu Serif", SERIF)?,
            mono: load("DejaVu Sans Mono", MONO)?,
        })
    }

    /// Face to draw `family` with.
    pub fn face(&self, family: &str) -> &FontRef<'static> {
        match FontClass::for_family(family) {
            FontClass::Sans => &self.sans,
            FontClass::Serif => &self.serif,
            FontClass::Mono => &self.mono,
        }
    }
}

fn load(name: &str, data: &'static [u8]) -> Result<FontRef<'static>, WasserzeichenError> {
    FontRef::try_from_slice(data)
        .map_err(|err| WasserzeichenError::Font(format!("{} could not be parsed: {}", name, err)))
}
