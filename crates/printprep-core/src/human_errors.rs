// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Nothing in the preparation pipeline retries, so the only distinction that
// matters to a user is whether they can fix the problem themselves.

use crate::error::{PrepError, StageError};
use crate::types::MAX_COPIES;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it (pick another file, lower the copy count, choose a printer).
    ActionRequired,
    /// Cannot be fixed from here: damaged file, broken converter, etc.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    fn action(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity: Severity::ActionRequired,
        }
    }

    fn permanent(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity: Severity::Permanent,
        }
    }
}

/// Convert a stage failure into a `HumanError`.
pub fn humanize_stage_error(err: &StageError) -> HumanError {
    humanize_error(&err.error)
}

/// Convert a `PrepError` into a `HumanError`.
pub fn humanize_error(err: &PrepError) -> HumanError {
    match err {
        PrepError::MissingExtension { path } => HumanError::action(
            "We can't tell what kind of file this is.",
            format!("Rename the file so it ends in .pdf or .docx, then try again. ({path})"),
        ),

        PrepError::UnsupportedFormat { extension } => HumanError::action(
            "This type of document isn't supported.",
            format!("Save the file as a PDF first, then print the PDF. (File type: .{extension})"),
        ),

        PrepError::Decode(_) => HumanError::permanent(
            "There's a problem with this document.",
            "The file may be damaged. Try opening it on a computer first to check it works, or try a different file.",
        ),

        PrepError::PasswordProtected(_) => HumanError::action(
            "This document is locked with a password.",
            "Open it with the password, save an unlocked copy, and print that instead.",
        ),

        PrepError::Conversion(_) => HumanError::permanent(
            "We couldn't turn this document into printable pages.",
            "Check that LibreOffice is installed, or save the document as a PDF yourself.",
        ),

        PrepError::Render { page, .. } => HumanError::permanent(
            format!("Page {page} couldn't be converted to black and white."),
            "Try printing in colour, or check that poppler (pdftoppm) is installed.",
        ),

        PrepError::PageNotFound { number, count } => HumanError::action(
            format!("Page {number} doesn't exist."),
            format!("This document has {count} pages."),
        ),

        PrepError::CopyLimitExceeded { requested, .. } => HumanError::action(
            format!("{requested} copies is not allowed."),
            format!("Choose between 1 and {MAX_COPIES} copies."),
        ),

        PrepError::InvalidGeometry { .. } => HumanError::permanent(
            "A page in this document has no size.",
            "The file may be damaged. Try exporting it to PDF again.",
        ),

        PrepError::Cancelled => HumanError::action(
            "Printing was cancelled.",
            "Start the job again when you're ready.",
        ),

        PrepError::EmptyDocument => HumanError::action(
            "There's nothing to print.",
            "The selected pages are empty. Check the page range and try again.",
        ),

        PrepError::SinkUnavailable(detail) => HumanError::action(
            "No printer is available.",
            format!("Choose a printer and try again. ({detail})"),
        ),

        PrepError::Submission(detail) => HumanError::action(
            "The printer didn't accept the job.",
            format!("Make sure the printer is turned on and reachable, then try again. ({detail})"),
        ),

        PrepError::Config(detail) => HumanError::action(
            "The settings file has a problem.",
            format!("Fix the setting and try again. ({detail})"),
        ),

        PrepError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::action(
                "The file couldn't be found.",
                "It may have been moved or deleted. Choose the file again.",
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::action(
                "We don't have permission to read this file.",
                "Check the file's permissions and try again.",
            ),
            _ => HumanError::permanent(
                "Something went wrong reading or writing a file.",
                format!("Details: {io_err}"),
            ),
        },

        PrepError::Serialization(_) => HumanError::action(
            "The job or settings file couldn't be read.",
            "Check that it is valid JSON.",
        ),
    }
}
