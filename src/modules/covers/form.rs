//! Form state manager: draft input, completeness check and the
//! idle → generating → success/error state machine.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::GenerationError;
use super::models::{BookInput, GenerationResult};
use super::presenter::ResultView;
use super::styles::BookStyle;

/// Editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Title,
    Author,
    Synopsis,
    Style,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Author,
        FormField::Synopsis,
        FormField::Style,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Author => "author",
            FormField::Synopsis => "synopsis",
            FormField::Style => "style",
        }
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.name() == value)
            .ok_or_else(|| format!("unknown form field '{value}'"))
    }
}

/// Raw form values as typed. Style holds a preset id or label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub style: String,
}

impl BookDraft {
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Title => self.title = value,
            FormField::Author => self.author = value,
            FormField::Synopsis => self.synopsis = value,
            FormField::Style => self.style = value,
        }
    }

    /// Fields that would block submission.
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| match field {
                FormField::Title => self.title.trim().is_empty(),
                FormField::Author => self.author.trim().is_empty(),
                FormField::Synopsis => self.synopsis.trim().is_empty(),
                FormField::Style => BookStyle::resolve(&self.style).is_none(),
            })
            .collect()
    }

    /// The validated input, or `None` while any field is incomplete.
    pub fn to_input(&self) -> Option<BookInput> {
        let style = BookStyle::resolve(&self.style)?;
        BookInput::new(&self.title, &self.author, &self.synopsis, style)
    }
}

/// Observable state of the form. Exactly one is active.
#[derive(Debug, Clone, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Generating,
    Success(ResultView),
    Error(String),
}

impl FormPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FormPhase::Idle => "idle",
            FormPhase::Generating => "generating",
            FormPhase::Success(_) => "success",
            FormPhase::Error(_) => "error",
        }
    }
}

/// One user's form session.
#[derive(Debug, Default)]
pub struct FormSession {
    draft: BookDraft,
    phase: FormPhase,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &BookDraft {
        &self.draft
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, FormPhase::Generating)
    }

    /// Set one field. Inputs are locked while a generation is in flight;
    /// returns whether the value was applied.
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) -> bool {
        if self.is_generating() {
            tracing::debug!(field = field.name(), "form locked while generating");
            return false;
        }
        self.draft.set(field, value.into());
        true
    }

    pub fn is_valid(&self) -> bool {
        self.draft.to_input().is_some()
    }

    /// Enter "generating" and hand back the input to generate from.
    /// `None` means nothing happened: the form is incomplete or a
    /// generation is already running.
    pub fn submit(&mut self) -> Option<BookInput> {
        if self.is_generating() {
            tracing::debug!("submit ignored: generation already in progress");
            return None;
        }
        let input = self.draft.to_input()?;
        self.phase = FormPhase::Generating;
        tracing::info!(title = input.title(), "form submitted");
        Some(input)
    }

    /// Record the orchestrator's outcome. Input values are kept either way.
    pub fn complete(&mut self, outcome: Result<GenerationResult, GenerationError>) {
        if !self.is_generating() {
            tracing::warn!(phase = self.phase.name(), "ignoring completion outside generation");
            return;
        }
        self.phase = match outcome {
            Ok(result) => FormPhase::Success(ResultView::new(Arc::new(result))),
            Err(error) => {
                tracing::error!(error = %error, kind = error.kind(), "generation failed");
                FormPhase::Error(error.user_message().to_string())
            }
        };
    }

    pub fn result_view(&self) -> Option<&ResultView> {
        match &self.phase {
            FormPhase::Success(view) => Some(view),
            _ => None,
        }
    }

    pub fn result_view_mut(&mut self) -> Option<&mut ResultView> {
        match &mut self.phase {
            FormPhase::Success(view) => Some(view),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            FormPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}
