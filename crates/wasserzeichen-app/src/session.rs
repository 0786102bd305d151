// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session state — the files being watermarked, the shared watermark spec,
// the lock flag and undo history. All changes go through `Session::reduce`.
//
// Loads are asynchronous. Selecting a file bumps the load epoch and hands
// back a `LoadTicket`; a finished load is accepted only if its ticket still
// matches the current epoch, so a slow decode can never overwrite the
// document of a file selected after it.

use std::sync::Arc;

use tracing::{debug, warn};
use wasserzeichen_core::{
    AnchorId, ColorValue, DocumentMeta, EmptyInput, GeneratedStyle, PageRange, SessionId, UploadedBuffer,
    WasserzeichenError, WatermarkSpec,
};
use wasserzeichen_document::{Normalized, NormalizedDocument};
use wasserzeichen_export::PersistContext;
use wasserzeichen_style::generate;

const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 4.0;

/// An uploaded file and the host's metadata for it.
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub buffer: Arc<UploadedBuffer>,
    pub meta: DocumentMeta,
}

/// Identifies one pending load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub epoch: u64,
    pub index: usize,
}

/// How the current file is shown. Never affects exports; reset whenever the
/// viewed file changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f32,
    /// Degrees, always one of 0, 90, 180, 270.
    pub rotation: i32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { zoom: 1.0, rotation: 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StyleSnapshot {
    spec: WatermarkSpec,
    generated: Option<GeneratedStyle>,
}

/// Undo and the view actions come from interactive hosts, not the CLI.
#[allow(dead_code)]
#[derive(Debug)]
pub enum Action {
    AddFiles(Vec<SessionFile>),
    Select(usize),
    /// A load started by `Select` or `AddFiles` has finished.
    Loaded {
        ticket: LoadTicket,
        normalized: Normalized,
    },
    SetText(String),
    SetAnchor(AnchorId),
    SetOpacity(f32),
    SetRotation(i32),
    SetFont(String),
    SetFontSize(u32),
    SetColor(ColorValue),
    SetOffset { x: i32, y: i32 },
    SetPageRange(PageRange),
    /// Run the style generator; a nonce asks for a variant.
    Generate { nonce: Option<String> },
    SetLocked(bool),
    Undo,
    Zoom(f32),
    /// Rotate the view by a multiple of 90 degrees.
    RotateView(i32),
}

/// Work the caller has to carry out after a reduce.
#[derive(Debug)]
pub enum Effect {
    None,
    Load {
        ticket: LoadTicket,
        buffer: Arc<UploadedBuffer>,
    },
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    user_id: String,
    files: Vec<SessionFile>,
    current: Option<usize>,
    document: Option<Arc<NormalizedDocument>>,
    decode_error: Option<String>,
    spec: WatermarkSpec,
    page_range: PageRange,
    locked: bool,
    generated: Option<GeneratedStyle>,
    history: Vec<StyleSnapshot>,
    history_limit: usize,
    epoch: u64,
    view: ViewState,
}

#[allow(dead_code)]
impl Session {
    pub fn new(user_id: impl Into<String>, history_limit: usize) -> Self {
        Self {
            id: SessionId::new(),
            user_id: user_id.into(),
            files: Vec::new(),
            current: None,
            document: None,
            decode_error: None,
            spec: WatermarkSpec::default(),
            page_range: PageRange::All,
            locked: false,
            generated: None,
            history: Vec::new(),
            history_limit,
            epoch: 0,
            view: ViewState::default(),
        }
    }

    // -- Accessors -----------------------------------------------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn generated(&self) -> Option<&GeneratedStyle> {
        self.generated.as_ref()
    }

    pub fn files(&self) -> &[SessionFile] {
        &self.files
    }

    pub fn current_file(&self) -> Option<&SessionFile> {
        self.current.and_then(|index| self.files.get(index))
    }

    /// The current file's document, once its load has been accepted.
    pub fn document(&self) -> Option<&Arc<NormalizedDocument>> {
        self.document.as_ref()
    }

    /// Why the current file could not be decoded, or what a partial decode
    /// left out.
    pub fn decode_error(&self) -> Option<&str> {
        self.decode_error.as_deref()
    }

    pub fn page_range(&self) -> &PageRange {
        &self.page_range
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    // -- Reducer -------------------------------------------------------------

    pub fn reduce(&mut self, action: Action) -> Result<Effect, WasserzeichenError> {
        match action {
            Action::AddFiles(files) => {
                let first_new = self.files.len();
                self.files.extend(files);
                if self.current.is_none() && first_new < self.files.len() {
                    return self.select(first_new);
                }
                Ok(Effect::None)
            }
            Action::Select(index) => self.select(index),
            Action::Loaded { ticket, normalized } => {
                self.accept_load(ticket, normalized)?;
                Ok(Effect::None)
            }
            Action::SetText(text) => self.edit(|spec| spec.text = text),
            Action::SetAnchor(anchor) => self.edit(|spec| spec.anchor = anchor),
            Action::SetOpacity(opacity) => self.edit(|spec| spec.set_opacity(opacity)),
            Action::SetRotation(degrees) => self.edit(|spec| spec.rotation_degrees = degrees),
            Action::SetFont(family) => self.edit(|spec| spec.font_family = family),
            Action::SetFontSize(size) => self.edit(|spec| spec.set_font_size(size)),
            Action::SetColor(color) => self.edit(|spec| spec.color = color),
            Action::SetOffset { x, y } => self.edit(|spec| {
                spec.offset_x = x;
                spec.offset_y = y;
            }),
            Action::SetPageRange(range) => {
                self.page_range = range;
                Ok(Effect::None)
            }
            Action::Generate { nonce } => {
                self.generate(nonce.as_deref())?;
                Ok(Effect::None)
            }
            Action::SetLocked(locked) => {
                self.locked = locked;
                debug!(locked, "style lock changed");
                Ok(Effect::None)
            }
            Action::Undo => {
                if let Some(snapshot) = self.history.pop() {
                    self.spec = snapshot.spec;
                    self.generated = snapshot.generated;
                }
                Ok(Effect::None)
            }
            Action::Zoom(zoom) => {
                if zoom.is_finite() {
                    self.view.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
                }
                Ok(Effect::None)
            }
            Action::RotateView(quarter_turns) => {
                self.view.rotation = (self.view.rotation + quarter_turns.rem_euclid(4) * 90).rem_euclid(360);
                Ok(Effect::None)
            }
        }
    }

    fn select(&mut self, index: usize) -> Result<Effect, WasserzeichenError> {
        let buffer = self
            .files
            .get(index)
            .map(|file| Arc::clone(&file.buffer))
            .ok_or(WasserzeichenError::EmptyInput(EmptyInput::NoFile))?;
        self.epoch += 1;
        self.current = Some(index);
        // Dropping the previous document releases its raster surfaces.
        self.document = None;
        self.decode_error = None;
        self.view = ViewState::default();
        debug!(index, epoch = self.epoch, name = %buffer.name, "file selected");
        Ok(Effect::Load {
            ticket: LoadTicket { epoch: self.epoch, index },
            buffer,
        })
    }

    fn accept_load(&mut self, ticket: LoadTicket, normalized: Normalized) -> Result<(), WasserzeichenError> {
        if ticket.epoch != self.epoch {
            warn!(epoch = ticket.epoch, current = self.epoch, "discarding stale load");
            return Err(WasserzeichenError::StaleLoad {
                epoch: ticket.epoch,
                current: self.epoch,
            });
        }
        self.decode_error = normalized.decode_error.map(|err| err.to_string());
        self.document = Some(Arc::new(normalized.document));
        Ok(())
    }

    /// Direct edits are allowed while locked; only the generator is gated.
    fn edit(&mut self, change: impl FnOnce(&mut WatermarkSpec)) -> Result<Effect, WasserzeichenError> {
        self.snapshot();
        change(&mut self.spec);
        Ok(Effect::None)
    }

    fn generate(&mut self, nonce: Option<&str>) -> Result<(), WasserzeichenError> {
        if self.locked {
            return Err(WasserzeichenError::StyleLocked);
        }
        let document_id = self
            .current_file()
            .map(|file| file.meta.id.clone())
            .ok_or(WasserzeichenError::EmptyInput(EmptyInput::NoFile))?;
        let style = generate(&self.spec.text, self.spec.anchor, &document_id, &self.user_id, nonce);
        self.snapshot();
        self.spec.apply_style(&style);
        self.generated = Some(style);
        Ok(())
    }

    fn snapshot(&mut self) {
        if self.history_limit == 0 {
            return;
        }
        if self.history.len() >= self.history_limit {
            self.history.remove(0);
        }
        self.history.push(StyleSnapshot {
            spec: self.spec.clone(),
            generated: self.generated.clone(),
        });
    }

    // -- Export gating -------------------------------------------------------

    /// Reject an export before any work starts.
    pub fn check_export(&self) -> Result<(), WasserzeichenError> {
        if self.current_file().is_none() {
            return Err(WasserzeichenError::EmptyInput(EmptyInput::NoFile));
        }
        if !self.spec.has_text() {
            return Err(WasserzeichenError::EmptyInput(EmptyInput::NoWatermarkText));
        }
        if self.locked && self.generated.is_none() {
            return Err(WasserzeichenError::ExportLocked);
        }
        Ok(())
    }

    /// What a settings-only record is built from.
    pub fn persist_context(&self) -> Option<PersistContext> {
        let file = self.current_file()?;
        Some(PersistContext {
            spec: self.spec.clone(),
            document_id: file.meta.id.clone(),
            user_id: self.user_id.clone(),
            page_range: self.page_range.clone(),
            generated_style: self.generated.clone(),
            locked: self.locked,
        })
    }
}
