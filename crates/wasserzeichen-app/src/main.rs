// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wasserzeichen — local document watermarking.
//
// Entry point. Initialises logging, loads the engine config and runs one
// subcommand against a fresh session.

mod services;
mod session;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use wasserzeichen_core::human_errors::humanize_error;
use wasserzeichen_core::{
    AnchorId, ColorValue, DocumentKind, DocumentMeta, EmptyInput, EngineConfig, PageRange, UploadedBuffer,
    WasserzeichenError,
};
#[cfg(feature = "pdfium")]
use wasserzeichen_document::{Normalizer, PdfiumRasterizer};
use wasserzeichen_document::{detect, preview_html};
use wasserzeichen_export::{DeliveryReport, SettingsStore, SqliteSettingsStore};
use wasserzeichen_style::generate;

use services::data_dir;
use services::engine::Engine;
use services::sink::DirectorySink;
use session::{Action, Session, SessionFile};

#[derive(Parser, Debug)]
#[command(name = "wasserzeichen", version, about = "Watermark PDFs, images and office documents")]
struct Cli {
    /// Engine config file (defaults to <data dir>/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn a watermark into each file and write the results.
    ///
    /// Unless built with the `pdfium` feature, PDF pages show only their
    /// filled areas and embedded images: text and vector drawings are left
    /// out, and a warning says so.
    Export(ExportArgs),
    /// Write an HTML page previewing the watermark over a file.
    Preview(PreviewArgs),
    /// Print the style the generator derives for a seed, as JSON.
    Style(StyleArgs),
    /// Print the watermark settings stored for a document.
    ShowSettings(ShowSettingsArgs),
}

#[derive(Args, Debug)]
struct WatermarkArgs {
    /// Watermark text.
    #[arg(long)]
    text: String,

    /// Placement: top-left, top-center, ..., centered, ..., bottom-right.
    #[arg(long, default_value = "centered")]
    anchor: AnchorId,

    /// Opacity, clamped to 0.1-1.0.
    #[arg(long)]
    opacity: Option<f32>,

    /// Rotation in degrees; negative is counter-clockwise.
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<i32>,

    /// Font family.
    #[arg(long)]
    font: Option<String>,

    /// Font size in preview pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Colour: #RGB, #RRGGBB, rgb(r, g, b) or hsl(h, s%, l%).
    #[arg(long)]
    color: Option<ColorValue>,

    /// Horizontal offset from the anchor, in preview pixels.
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<i32>,

    /// Vertical offset from the anchor, in preview pixels.
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<i32>,

    /// Pages the watermark applies to: `all`, `3` or `2-5`.
    #[arg(long, value_parser = parse_page_range)]
    pages: Option<PageRange>,

    /// Derive the style from the seed before applying explicit options.
    #[arg(long)]
    generate: bool,

    /// Derive a variant style with this nonce.
    #[arg(long, value_name = "NONCE")]
    variant: Option<String>,

    /// Document id (defaults to the file stem).
    #[arg(long)]
    document_id: Option<String>,

    /// User id recorded as the creator.
    #[arg(long, default_value = "local")]
    user_id: String,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[command(flatten)]
    watermark: WatermarkArgs,

    /// Lock the style after applying the options.
    #[arg(long)]
    lock: bool,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Settings database (defaults to <data dir>/settings.db).
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    file: PathBuf,

    #[command(flatten)]
    watermark: WatermarkArgs,

    /// HTML file to write.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct StyleArgs {
    #[arg(long)]
    text: String,

    #[arg(long, default_value = "centered")]
    anchor: AnchorId,

    #[arg(long)]
    document_id: String,

    #[arg(long)]
    user_id: String,

    /// Ask for a variant style.
    #[arg(long)]
    nonce: Option<String>,
}

#[derive(Args, Debug)]
struct ShowSettingsArgs {
    #[arg(long)]
    document_id: String,

    #[arg(long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = data_dir::load_config(cli.config.as_deref());
    if cli.config.is_none() {
        let path = data_dir::config_path();
        if !path.exists()
            && let Err(e) = data_dir::persist_config(&path, &config)
        {
            warn!(path = %path.display(), error = %e, "could not write default config");
        }
    }

    let result = match cli.command {
        Command::Export(args) => cmd_export(config, args).await,
        Command::Preview(args) => cmd_preview(config, args).await,
        Command::Style(args) => cmd_style(args),
        Command::ShowSettings(args) => cmd_show_settings(&config, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            error!(error = %err, "command failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

// -- Commands ----------------------------------------------------------------

async fn cmd_export(config: EngineConfig, args: ExportArgs) -> Result<(), WasserzeichenError> {
    let engine = build_engine(config)?;
    let store = open_store(args.store.as_deref())?;
    let mut sink = DirectorySink::new(&args.out)?;
    let mut session = open_session(&engine, &args.files, &args.watermark).await?;
    session.reduce(Action::SetLocked(args.lock))?;

    for index in 0..args.files.len() {
        if index > 0 {
            engine.dispatch(&mut session, Action::Select(index)).await?;
        }
        let already_written = sink.written().len();
        match engine.export(&session, &mut sink, &store).await? {
            DeliveryReport::Downloaded(_) => {
                for path in &sink.written()[already_written..] {
                    println!("{}", path.display());
                }
            }
            DeliveryReport::SettingsSaved { key } => {
                println!("settings saved as {key} (nothing to burn in)");
            }
        }
    }
    Ok(())
}

async fn cmd_preview(config: EngineConfig, args: PreviewArgs) -> Result<(), WasserzeichenError> {
    let engine = build_engine(config)?;
    let session = open_session(&engine, std::slice::from_ref(&args.file), &args.watermark).await?;
    let (Some(file), Some(document)) = (session.current_file(), session.document()) else {
        return Err(WasserzeichenError::EmptyInput(EmptyInput::NoFile));
    };
    if let Some(reason) = session.decode_error() {
        if document.kind == DocumentKind::Unsupported {
            eprintln!("{} could not be decoded ({reason}); the preview only explains that.", file.meta.title);
        } else {
            eprintln!("{} was only partly decoded: {reason}", file.meta.title);
        }
    }
    let html = preview_html(
        &file.meta.title,
        document,
        session.spec(),
        session.page_range(),
        engine.config(),
    )?;
    std::fs::write(&args.out, html)?;
    info!(path = %args.out.display(), "preview written");
    println!("{}", args.out.display());
    Ok(())
}

fn cmd_style(args: StyleArgs) -> Result<(), WasserzeichenError> {
    let style = generate(&args.text, args.anchor, &args.document_id, &args.user_id, args.nonce.as_deref());
    println!("{}", serde_json::to_string_pretty(&style)?);
    Ok(())
}

fn cmd_show_settings(config: &EngineConfig, args: ShowSettingsArgs) -> Result<(), WasserzeichenError> {
    let store = open_store(args.store.as_deref())?;
    let key = config.settings_key(&args.document_id);
    match store.load_record(&key)? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("no settings stored for {}", args.document_id),
    }
    Ok(())
}

// -- Helpers -----------------------------------------------------------------

fn build_engine(config: EngineConfig) -> Result<Engine, WasserzeichenError> {
    let engine = Engine::new(config)?;
    #[cfg(feature = "pdfium")]
    let engine = {
        // PDFIUM_DYNAMIC_LIB_PATH points at a directory holding the PDFium library.
        let library_dir = std::env::var_os("PDFIUM_DYNAMIC_LIB_PATH").map(PathBuf::from);
        let rasterizer = PdfiumRasterizer::new(library_dir, engine.config().max_surface_pixels);
        let normalizer = Normalizer::new(engine.config().clone()).with_rasterizer(Arc::new(rasterizer));
        engine.with_normalizer(normalizer)
    };
    Ok(engine)
}

fn parse_page_range(value: &str) -> Result<PageRange, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("all") {
        return Ok(PageRange::All);
    }
    let (first, last) = value.split_once('-').unwrap_or((value, value));
    let parse = |n: &str| {
        n.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("`{n}` is not a page number"))
    };
    let (first, last) = (parse(first)?, parse(last)?);
    if first > last {
        return Err(format!("page range {first}-{last} runs backwards"));
    }
    Ok(PageRange::Span { first, last })
}

fn open_store(path: Option<&Path>) -> Result<SqliteSettingsStore, WasserzeichenError> {
    match path {
        Some(path) => SqliteSettingsStore::open(path),
        None => SqliteSettingsStore::open(data_dir::settings_db()),
    }
}

/// A session with every file added, the first one loaded and the watermark
/// options applied.
async fn open_session(
    engine: &Engine,
    paths: &[PathBuf],
    args: &WatermarkArgs,
) -> Result<Session, WasserzeichenError> {
    let files = paths
        .iter()
        .map(|path| read_file(path, args.document_id.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;
    let mut session = Session::new(args.user_id.as_str(), engine.config().history_limit);
    engine.dispatch(&mut session, Action::AddFiles(files)).await?;

    session.reduce(Action::SetText(args.text.clone()))?;
    session.reduce(Action::SetAnchor(args.anchor))?;
    if args.generate || args.variant.is_some() {
        session.reduce(Action::Generate { nonce: args.variant.clone() })?;
    }
    if let Some(opacity) = args.opacity {
        session.reduce(Action::SetOpacity(opacity))?;
    }
    if let Some(rotation) = args.rotation {
        session.reduce(Action::SetRotation(rotation))?;
    }
    if let Some(font) = &args.font {
        session.reduce(Action::SetFont(font.clone()))?;
    }
    if let Some(size) = args.size {
        session.reduce(Action::SetFontSize(size))?;
    }
    if let Some(color) = args.color {
        session.reduce(Action::SetColor(color))?;
    }
    if args.offset_x.is_some() || args.offset_y.is_some() {
        let spec = session.spec();
        let (x, y) = (args.offset_x.unwrap_or(spec.offset_x), args.offset_y.unwrap_or(spec.offset_y));
        session.reduce(Action::SetOffset { x, y })?;
    }
    if let Some(pages) = &args.pages {
        session.reduce(Action::SetPageRange(pages.clone()))?;
    }
    Ok(session)
}

fn read_file(path: &Path, document_id: Option<&str>) -> Result<SessionFile, WasserzeichenError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string();
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string();
    let buffer = UploadedBuffer::new(name.clone(), None, bytes);
    let doc_type = detect(&buffer).mime_type().unwrap_or("application/octet-stream").to_string();
    Ok(SessionFile {
        buffer: Arc::new(buffer),
        meta: DocumentMeta {
            id: document_id.map(str::to_owned).unwrap_or(stem),
            title: name,
            doc_type,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn cli_parses_the_export_form() {
        let cli = Cli::try_parse_from([
            "wasserzeichen",
            "export",
            "a.pdf",
            "b.png",
            "--text",
            "DRAFT",
            "--anchor",
            "bottom-right",
            "--rotation",
            "-30",
            "--color",
            "#ff0000",
            "--variant",
            "2",
            "--lock",
        ])
        .unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.watermark.anchor, AnchorId::BottomRight);
        assert_eq!(args.watermark.rotation, Some(-30));
        assert_eq!(args.watermark.color, Some(ColorValue::rgb(255, 0, 0)));
        assert_eq!(args.watermark.variant.as_deref(), Some("2"));
        assert!(args.lock);
    }

    #[test]
    fn bad_anchor_is_a_usage_error() {
        let argv = [
            "wasserzeichen",
            "style",
            "--text",
            "x",
            "--anchor",
            "middle",
            "--document-id",
            "d",
            "--user-id",
            "u",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn page_ranges() {
        assert_eq!(parse_page_range("all"), Ok(PageRange::All));
        assert_eq!(parse_page_range("3"), Ok(PageRange::Span { first: 3, last: 3 }));
        assert_eq!(parse_page_range("2-5"), Ok(PageRange::Span { first: 2, last: 5 }));
        assert!(parse_page_range("5-2").is_err());
        assert!(parse_page_range("0").is_err());
        assert!(parse_page_range("x").is_err());
    }

    #[test]
    fn read_file_defaults_the_document_id_to_the_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Quarterly Report.csv");
        std::fs::write(&path, "a,b\n").unwrap();
        let file = read_file(&path, None).unwrap();
        assert_eq!(file.meta.id, "Quarterly Report");
        assert_eq!(file.meta.doc_type, "text/csv");
        assert_eq!(read_file(&path, Some("doc-9")).unwrap().meta.id, "doc-9");
    }

    #[tokio::test]
    async fn export_command_writes_settings_for_flow_documents() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "hello\n\nworld").unwrap();
        let db = dir.path().join("settings.db");
        let argv: Vec<OsString> = vec![
            "wasserzeichen".into(),
            "export".into(),
            input.clone().into_os_string(),
            "--text".into(),
            "DRAFT".into(),
            "--document-id".into(),
            "doc-1".into(),
            "--out".into(),
            dir.path().as_os_str().to_owned(),
            "--store".into(),
            db.clone().into_os_string(),
        ];
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        cmd_export(EngineConfig::default(), args).await.unwrap();

        let store = SqliteSettingsStore::open(&db).unwrap();
        let record = store.load_record("watermark-doc-1").unwrap().unwrap();
        assert_eq!(record.text, "DRAFT");
        assert_eq!(record.created_by, "local");
    }

    #[tokio::test]
    async fn export_command_writes_watermarked_images() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.png");
        image::RgbaImage::from_pixel(40, 30, image::Rgba([255, 255, 255, 255]))
            .save(&input)
            .unwrap();
        let out = dir.path().join("out");
        let argv: Vec<OsString> = vec![
            "wasserzeichen".into(),
            "export".into(),
            input.into_os_string(),
            "--text".into(),
            "DRAFT".into(),
            "--out".into(),
            out.clone().into_os_string(),
            "--store".into(),
            dir.path().join("settings.db").into_os_string(),
        ];
        let Command::Export(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected export");
        };
        cmd_export(EngineConfig::default(), args).await.unwrap();
        assert!(out.join("watermarked_scan.png").exists());
    }
}
