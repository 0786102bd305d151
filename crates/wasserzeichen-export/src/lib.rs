// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wasserzeichen — turning export outcomes into downloads.
//
// Pixel exports become named, digested artifacts delivered one after another;
// documents without pixels fall back to a persisted settings record.

pub mod integrity;
pub mod packager;
pub mod record;
pub mod store;

pub use integrity::{hash_bytes, verify_hash};
pub use packager::{DeliveryReport, DownloadArtifact, DownloadPlan, DownloadSink, deliver, package};
pub use record::{PersistContext, WatermarkRecord};
pub use store::{SettingsStore, SqliteSettingsStore};
