// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export packager — names the exported pages, staggers their delivery, and
// falls back to saving the settings when nothing could be burnt in.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument};
use wasserzeichen_core::{EngineConfig, WasserzeichenError};
use wasserzeichen_document::{ExportOutcome, ImageBytes};

use crate::integrity::hash_bytes;
use crate::record::{PersistContext, WatermarkRecord};
use crate::store::SettingsStore;

/// One file to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Pause before this artifact is delivered.
    pub delay_before: Duration,
    /// SHA-256 hex digest of `bytes`.
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadPlan {
    Artifacts(Vec<DownloadArtifact>),
    /// No page produced pixels; persist the record instead.
    SettingsOnly(WatermarkRecord),
}

/// Where artifacts end up (a directory, a browser download, a test buffer).
pub trait DownloadSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), WasserzeichenError>;
}

/// What [`deliver`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReport {
    Downloaded(Vec<String>),
    SettingsSaved { key: String },
}

/// Build the download plan for a document's export outcomes.
///
/// `base_name` is the uploaded file name. Outcomes are expected in page order;
/// `NotApplicable` entries are skipped. Multi-page names carry the one-based
/// source page number, so a partial page range keeps its numbering.
#[instrument(skip(outcomes, ctx), fields(outcomes = outcomes.len(), document_id = %ctx.document_id))]
pub fn package(
    outcomes: Vec<ExportOutcome>,
    base_name: &str,
    ctx: &PersistContext,
    delay: Duration,
) -> DownloadPlan {
    let images: Vec<ImageBytes> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            ExportOutcome::Image(image) => Some(image),
            ExportOutcome::NotApplicable => None,
        })
        .collect();

    if images.is_empty() {
        debug!("nothing exported, falling back to settings");
        return DownloadPlan::SettingsOnly(WatermarkRecord::from_context(ctx, Utc::now()));
    }

    let single = images.len() == 1;
    let artifacts = images
        .into_iter()
        .enumerate()
        .map(|(position, image)| {
            let filename = if single {
                single_name(base_name, &image)
            } else {
                format!("watermarked_{}_page{}.{}", stem(base_name), image.page_index + 1, image.extension())
            };
            DownloadArtifact {
                filename,
                sha256: hash_bytes(&image.bytes),
                delay_before: if position == 0 { Duration::ZERO } else { delay },
                bytes: image.bytes,
            }
        })
        .collect();
    DownloadPlan::Artifacts(artifacts)
}

/// Execute a plan: artifacts go to `sink` one after another with their
/// delays, a settings-only plan is written to `store`.
#[instrument(skip_all)]
pub async fn deliver(
    plan: &DownloadPlan,
    sink: &mut dyn DownloadSink,
    store: &dyn SettingsStore,
    config: &EngineConfig,
) -> Result<DeliveryReport, WasserzeichenError> {
    match plan {
        DownloadPlan::Artifacts(artifacts) => {
            let mut delivered = Vec::with_capacity(artifacts.len());
            for artifact in artifacts {
                if !artifact.delay_before.is_zero() {
                    tokio::time::sleep(artifact.delay_before).await;
                }
                sink.save(&artifact.filename, &artifact.bytes)?;
                debug!(filename = %artifact.filename, sha256 = %artifact.sha256, "artifact delivered");
                delivered.push(artifact.filename.clone());
            }
            info!(count = delivered.len(), "downloads delivered");
            Ok(DeliveryReport::Downloaded(delivered))
        }
        DownloadPlan::SettingsOnly(record) => {
            let key = config.settings_key(&record.document_id);
            store.save_record(&key, record)?;
            info!(%key, "watermark settings saved");
            Ok(DeliveryReport::SettingsSaved { key })
        }
    }
}

fn stem(base_name: &str) -> &str {
    Path::new(base_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(base_name)
}

/// `watermarked_<base_name>`, with the extension replaced when the encoded
/// format differs from it.
fn single_name(base_name: &str, image: &ImageBytes) -> String {
    let extension = Path::new(base_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) if image.format.extensions_str().contains(&ext.as_str()) => {
            format!("watermarked_{base_name}")
        }
        _ => format!("watermarked_{}.{}", stem(base_name), image.extension()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::context;
    use crate::store::SqliteSettingsStore;
    use image::ImageFormat;
    use tokio::time::Instant;

    fn image(page_index: usize, format: ImageFormat) -> ExportOutcome {
        ExportOutcome::Image(ImageBytes {
            page_index,
            bytes: vec![page_index as u8; 8],
            width: 1,
            height: 1,
            format,
        })
    }

    fn artifacts(plan: DownloadPlan) -> Vec<DownloadArtifact> {
        match plan {
            DownloadPlan::Artifacts(artifacts) => artifacts,
            DownloadPlan::SettingsOnly(_) => panic!("expected artifacts"),
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Vec<(String, Instant)>,
    }

    impl DownloadSink for RecordingSink {
        fn save(&mut self, filename: &str, _bytes: &[u8]) -> Result<(), WasserzeichenError> {
            self.saved.push((filename.to_owned(), Instant::now()));
            Ok(())
        }
    }

    #[test]
    fn single_image_keeps_its_name() {
        let plan = package(vec![image(0, ImageFormat::Jpeg)], "holiday.JPG", &context(), Duration::ZERO);
        let artifacts = artifacts(plan);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].filename, "watermarked_holiday.JPG");
        assert_eq!(artifacts[0].delay_before, Duration::ZERO);
        assert_eq!(artifacts[0].sha256, hash_bytes(&[0; 8]));
    }

    #[test]
    fn single_page_pdf_swaps_the_extension() {
        let plan = package(vec![image(0, ImageFormat::Png)], "contract.pdf", &context(), Duration::ZERO);
        assert_eq!(artifacts(plan)[0].filename, "watermarked_contract.png");
    }

    #[test]
    fn pages_are_numbered_and_staggered() {
        let outcomes = (0..3).map(|i| image(i, ImageFormat::Png)).collect();
        let plan = package(outcomes, "report.pdf", &context(), Duration::from_millis(500));
        let artifacts = artifacts(plan);
        let names: Vec<&str> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(
            names,
            ["watermarked_report_page1.png", "watermarked_report_page2.png", "watermarked_report_page3.png"]
        );
        let delays: Vec<u64> = artifacts.iter().map(|a| a.delay_before.as_millis() as u64).collect();
        assert_eq!(delays, [0, 500, 500]);
    }

    #[test]
    fn partial_ranges_keep_source_page_numbers() {
        let outcomes = vec![image(3, ImageFormat::Png), image(4, ImageFormat::Png)];
        let plan = package(outcomes, "report.pdf", &context(), Duration::from_millis(500));
        let names: Vec<String> = artifacts(plan).into_iter().map(|a| a.filename).collect();
        assert_eq!(names, ["watermarked_report_page4.png", "watermarked_report_page5.png"]);
    }

    #[test]
    fn nothing_exported_saves_the_full_record() {
        let ctx = context();
        let plan = package(
            vec![ExportOutcome::NotApplicable],
            "notes.docx",
            &ctx,
            Duration::from_millis(500),
        );
        let DownloadPlan::SettingsOnly(record) = plan else {
            panic!("expected a settings-only plan");
        };
        assert_eq!(record.document_id, "doc-42");
        assert_eq!(record.text, "CONFIDENTIAL");
        assert_eq!(record.created_by, "user-7");
        assert!(record.is_locked);
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_waits_between_artifacts() {
        let outcomes = (0..3).map(|i| image(i, ImageFormat::Png)).collect();
        let plan = package(outcomes, "report.pdf", &context(), Duration::from_millis(500));
        let store = SqliteSettingsStore::open_in_memory().unwrap();
        let mut sink = RecordingSink::default();

        let report = deliver(&plan, &mut sink, &store, &EngineConfig::default()).await.unwrap();

        assert!(matches!(report, DeliveryReport::Downloaded(ref names) if names.len() == 3));
        let gaps: Vec<Duration> = sink.saved.windows(2).map(|w| w[1].1 - w[0].1).collect();
        assert_eq!(gaps.len(), 2);
        for gap in gaps {
            assert!(gap >= Duration::from_millis(500) && gap < Duration::from_millis(510), "{gap:?}");
        }
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn settings_only_plans_land_in_the_store() {
        let plan = package(Vec::new(), "blob.bin", &context(), Duration::ZERO);
        let store = SqliteSettingsStore::open_in_memory().unwrap();
        let mut sink = RecordingSink::default();

        let report = deliver(&plan, &mut sink, &store, &EngineConfig::default()).await.unwrap();

        assert_eq!(report, DeliveryReport::SettingsSaved { key: "watermark-doc-42".into() });
        assert!(sink.saved.is_empty());
        let record = store.load_record("watermark-doc-42").unwrap().unwrap();
        assert_eq!(record.text, "CONFIDENTIAL");
    }
}
