// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Anchor geometry shared by the live overlay and the export compositor.
//
// Corners sit at 10%/90% insets and hug their corner; edge centres sit at a
// 10%/90% inset on one axis and 50% on the other; the centre anchor sits at
// 50%/50%. The anchor point is also the rotation origin.

use serde::Serialize;

use wasserzeichen_core::AnchorId;

const NEAR: f32 = 0.1;
const MID: f32 = 0.5;
const FAR: f32 = 0.9;

/// Container size, in CSS pixels for overlays or surface pixels for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Which backend the placement is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Relative units (percent of the container), for the overlay.
    Vector,
    /// Absolute surface pixels, for the compositor.
    Raster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Percent,
    Pixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    /// Fraction of the text box width that sits on the anchor point.
    pub fn fraction(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    /// Fraction of the text box height that sits on the anchor point.
    pub fn fraction(self) -> f32 {
        match self {
            Self::Top => 0.0,
            Self::Middle => 0.5,
            Self::Bottom => 1.0,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "center",
            Self::Bottom => "bottom",
        }
    }
}

/// Where a watermark goes and how its text box aligns to that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub unit: Unit,
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl Placement {
    /// Rotation origin as fractions of the text box.
    pub fn transform_origin(&self) -> (f32, f32) {
        (self.horizontal.fraction(), self.vertical.fraction())
    }

    /// Top-left corner of a `width` x `height` text box aligned to this point.
    pub fn box_origin(&self, width: f32, height: f32) -> (f32, f32) {
        let (fx, fy) = self.transform_origin();
        (self.x - fx * width, self.y - fy * height)
    }
}

/// Resolve an anchor inside `container`.
pub fn resolve(anchor: AnchorId, container: Size, mode: RenderMode) -> Placement {
    use HorizontalAlign as H;
    use VerticalAlign as V;

    let (fx, fy, horizontal, vertical) = match anchor {
        AnchorId::TopLeft => (NEAR, NEAR, H::Left, V::Top),
        AnchorId::TopCenter => (MID, NEAR, H::Center, V::Top),
        AnchorId::TopRight => (FAR, NEAR, H::Right, V::Top),
        AnchorId::MiddleLeft => (NEAR, MID, H::Left, V::Middle),
        AnchorId::Centered => (MID, MID, H::Center, V::Middle),
        AnchorId::MiddleRight => (FAR, MID, H::Right, V::Middle),
        AnchorId::BottomLeft => (NEAR, FAR, H::Left, V::Bottom),
        AnchorId::BottomCenter => (MID, FAR, H::Center, V::Bottom),
        AnchorId::BottomRight => (FAR, FAR, H::Right, V::Bottom),
    };

    let (x, y, unit) = match mode {
        RenderMode::Vector => (fx * 100.0, fy * 100.0, Unit::Percent),
        RenderMode::Raster => (fx * container.width, fy * container.height, Unit::Pixels),
    };

    Placement {
        x,
        y,
        unit,
        horizontal,
        vertical,
    }
}
