// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wasserzeichen style — seeded style generation, anchor geometry shared by
// preview and export, and live overlay descriptions.

pub mod anchor;
pub mod overlay;
pub mod seed;

pub use anchor::{HorizontalAlign, Placement, RenderMode, Size, Unit, VerticalAlign, resolve};
pub use overlay::{OverlayDescription, OverlayText, render_overlay};
pub use seed::{generate, rolling_hash, seed_string};
