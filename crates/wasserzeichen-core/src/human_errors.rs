// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Hosts surface these as notifications; the severity drives presentation.

use crate::error::{EmptyInput, WasserzeichenError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Try again and it will probably work.
    Transient,
    /// User must do something (choose a file, type some text, unlock).
    ActionRequired,
    /// Cannot be fixed by retrying: damaged file, unusual format.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same action may succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `WasserzeichenError` into a `HumanError`.
pub fn humanize_error(err: &WasserzeichenError) -> HumanError {
    match err {
        // -- Normalisation --
        WasserzeichenError::Decode(detail) => HumanError {
            message: "We couldn't read this document.".into(),
            suggestion: format!(
                "The file may be damaged or password protected. You can still save watermark settings for it. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        WasserzeichenError::Rasterize { page, .. } => HumanError {
            message: format!("Page {} couldn't be drawn.", page + 1),
            suggestion: "The other pages were still exported. Try again, or try a smaller export size.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        WasserzeichenError::EmptyInput(EmptyInput::NoFile) => HumanError {
            message: "No file selected.".into(),
            suggestion: "Choose a document to watermark, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WasserzeichenError::EmptyInput(EmptyInput::NoWatermarkText) => HumanError {
            message: "The watermark has no text.".into(),
            suggestion: "Type the text you want to stamp on the document, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WasserzeichenError::PartialDecode(detail) => HumanError {
            message: "Part of this document can't be shown.".into(),
            suggestion: format!("The watermark still applies to everything that is shown. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        WasserzeichenError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try opening it on a computer first to check it works, or try a different file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        WasserzeichenError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        WasserzeichenError::MarkupError(_) => HumanError {
            message: "We couldn't read the text in this document.".into(),
            suggestion: "Try opening and re-saving the document in your office program, then load it again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Styling --
        WasserzeichenError::Font(_) => HumanError {
            message: "The watermark font couldn't be loaded.".into(),
            suggestion: "Try choosing a different font.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WasserzeichenError::InvalidColor(value) => HumanError {
            message: "That colour isn't recognised.".into(),
            suggestion: format!("Use a colour like #ff0000, rgb(255, 0, 0) or hsl(0, 100%, 50%). (Got: {value})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WasserzeichenError::InvalidAnchor(value) => HumanError {
            message: "That watermark position isn't recognised.".into(),
            suggestion: format!("Choose one of the nine positions, for example top-left or centered. (Got: {value})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Session --
        WasserzeichenError::StyleLocked => HumanError {
            message: "The watermark style is locked.".into(),
            suggestion: "Unlock the style before generating a new one.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WasserzeichenError::ExportLocked => HumanError {
            message: "Export is locked.".into(),
            suggestion: "Generate a watermark style or unlock the settings, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WasserzeichenError::StaleLoad { .. } => HumanError {
            message: "A newer file was selected.".into(),
            suggestion: "The earlier file was skipped. Nothing else to do.".into(),
            retriable: false,
            severity: Severity::Transient,
        },

        // -- Storage --
        WasserzeichenError::Database(_) => HumanError {
            message: "Watermark settings couldn't be saved.".into(),
            suggestion: "Try again. If this keeps happening, check there is free space on your device.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        WasserzeichenError::IntegrityMismatch { .. } => HumanError {
            message: "A downloaded file didn't arrive intact.".into(),
            suggestion: "Export again. If this keeps happening, try a different output folder.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        WasserzeichenError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file or folder.".into(),
                    suggestion: "Check the permissions, or try a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        WasserzeichenError::Serialization(_) => HumanError {
            message: "There was an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterize_names_one_based_page() {
        let err = WasserzeichenError::Rasterize { page: 2, detail: "surface too large".into() };
        let human = humanize_error(&err);
        assert_eq!(human.message, "Page 3 couldn't be drawn.");
        assert!(human.retriable);
    }

    #[test]
    fn empty_text_is_action_required() {
        let human = humanize_error(&WasserzeichenError::EmptyInput(EmptyInput::NoWatermarkText));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn decode_failure_is_permanent() {
        let human = humanize_error(&WasserzeichenError::Decode("truncated xref".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("truncated xref"));
    }

    #[test]
    fn partial_decode_names_what_was_left_out() {
        let human = humanize_error(&WasserzeichenError::PartialDecode("text not drawn on 1 of 1 page(s)".into()));
        assert_eq!(human.message, "Part of this document can't be shown.");
        assert!(human.suggestion.contains("text not drawn"));
        assert!(!human.retriable);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = WasserzeichenError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn locked_style_is_action_required() {
        let human = humanize_error(&WasserzeichenError::StyleLocked);
        assert_eq!(human.severity, Severity::ActionRequired);
    }
}
