// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the CLI to the wasserzeichen backend crates.
//
// The engine owns the blocking decode/composite work; sinks and the data
// directory are the host side of downloads and persistence.

pub mod data_dir;
pub mod engine;
pub mod sink;
