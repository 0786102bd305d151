// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wasserzeichen — Core types and error definitions shared across all crates.

pub mod color;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod markup;
pub mod types;

pub use color::ColorValue;
pub use config::EngineConfig;
pub use error::{EmptyInput, WasserzeichenError};
pub use types::*;
