//! Result presenter: cover selection and download, copy tabs and
//! copy-to-clipboard. Pure view state over an immutable result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{CoverImage, GenerationResult, MarketingCopy};

/// Confirmation shown after copying a caption.
pub const COPY_CONFIRMATION: &str = "Caption disalin!";

const DOWNLOAD_PREFIX: &str = "amocover-ai";

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("cover {index} does not exist; there are {count} covers")]
    CoverOutOfRange { index: usize, count: usize },

    #[error("tab '{0}' is not available for this result")]
    TabUnavailable(&'static str),

    #[error("failed to save cover: {0}")]
    Io(#[from] std::io::Error),
}

/// Marketing copy tab. Optional promos only get a tab when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyTab {
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "promo_130")]
    Promo130,
    #[serde(rename = "promo_250")]
    Promo250,
}

impl CopyTab {
    pub const ALL: [CopyTab; 4] = [
        CopyTab::Short,
        CopyTab::Long,
        CopyTab::Promo130,
        CopyTab::Promo250,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CopyTab::Short => "short",
            CopyTab::Long => "long",
            CopyTab::Promo130 => "promo_130",
            CopyTab::Promo250 => "promo_250",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CopyTab::Short => "Caption Pendek (100 Kata)",
            CopyTab::Long => "Caption Panjang (500 Kata)",
            CopyTab::Promo130 => "Promo Viral (130 Kata)",
            CopyTab::Promo250 => "Promo Persuasif (250 Kata)",
        }
    }

    /// The copy field this tab shows, if the result has it.
    pub fn text(self, copy: &MarketingCopy) -> Option<&str> {
        match self {
            CopyTab::Short => Some(&copy.short_caption),
            CopyTab::Long => Some(&copy.long_caption),
            CopyTab::Promo130 => copy.promo_130.as_deref(),
            CopyTab::Promo250 => copy.promo_250.as_deref(),
        }
    }
}

/// Text handed to the clipboard plus the confirmation to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedText {
    pub tab: CopyTab,
    pub text: String,
    pub confirmation: &'static str,
}

/// Serializable picture of what the presenter currently shows.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSnapshot {
    pub headline: String,
    pub clickbait: Vec<String>,
    pub covers: Vec<CoverTile>,
    pub tabs: Vec<TabEntry>,
    pub active_tab: CopyTab,
    pub active_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverTile {
    pub index: usize,
    pub selected: bool,
    pub file_name: String,
    #[serde(flatten)]
    pub image: CoverImage,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabEntry {
    pub id: CopyTab,
    pub label: &'static str,
    pub active: bool,
}

/// View state over one generation result.
#[derive(Debug, Clone)]
pub struct ResultView {
    result: Arc<GenerationResult>,
    selected_cover: usize,
    active_tab: CopyTab,
}

impl ResultView {
    /// First cover selected, short caption active.
    pub fn new(result: Arc<GenerationResult>) -> Self {
        Self {
            result,
            selected_cover: 0,
            active_tab: CopyTab::Short,
        }
    }

    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    pub fn selected_cover(&self) -> usize {
        self.selected_cover
    }

    pub fn select_cover(&mut self, index: usize) -> Result<(), PresenterError> {
        self.cover(index)?;
        self.selected_cover = index;
        Ok(())
    }

    pub fn cover(&self, index: usize) -> Result<&CoverImage, PresenterError> {
        self.result
            .covers
            .get(index)
            .ok_or(PresenterError::CoverOutOfRange {
                index,
                count: self.result.covers.len(),
            })
    }

    /// Tabs backed by a field of this result, in display order.
    pub fn tabs(&self) -> Vec<CopyTab> {
        CopyTab::ALL
            .into_iter()
            .filter(|tab| tab.text(&self.result.copy).is_some())
            .collect()
    }

    pub fn active_tab(&self) -> CopyTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: CopyTab) -> Result<(), PresenterError> {
        if tab.text(&self.result.copy).is_none() {
            return Err(PresenterError::TabUnavailable(tab.id()));
        }
        self.active_tab = tab;
        Ok(())
    }

    pub fn active_text(&self) -> &str {
        // select_tab only accepts tabs with text; Short always has it
        self.active_tab
            .text(&self.result.copy)
            .unwrap_or(&self.result.copy.short_caption)
    }

    pub fn copy_active(&self) -> CopiedText {
        CopiedText {
            tab: self.active_tab,
            text: self.active_text().to_string(),
            confirmation: COPY_CONFIRMATION,
        }
    }

    /// File name a downloaded cover is saved under, e.g. `amocover-ai-1.png`.
    pub fn download_name(&self, index: usize) -> Result<String, PresenterError> {
        Ok(download_file_name(index, self.cover(index)?))
    }

    /// Write cover `index` into `dir` and return the saved path.
    pub fn download_cover(&self, index: usize, dir: &Path) -> Result<PathBuf, PresenterError> {
        let cover = self.cover(index)?;
        let path = dir.join(download_file_name(index, cover));
        std::fs::write(&path, cover.bytes())?;
        tracing::info!(path = %path.display(), "cover saved");
        Ok(path)
    }

    pub fn snapshot(&self) -> ResultSnapshot {
        let copy = &self.result.copy;
        let covers = self
            .result
            .covers
            .iter()
            .enumerate()
            .map(|(index, image)| CoverTile {
                index,
                selected: index == self.selected_cover,
                file_name: download_file_name(index, image),
                image: image.clone(),
            })
            .collect();
        let tabs = self
            .tabs()
            .into_iter()
            .map(|tab| TabEntry {
                id: tab,
                label: tab.label(),
                active: tab == self.active_tab,
            })
            .collect();

        ResultSnapshot {
            headline: copy.headline().to_string(),
            clickbait: copy.clickbait.clone(),
            covers,
            tabs,
            active_tab: self.active_tab,
            active_text: self.active_text().to_string(),
        }
    }
}

fn download_file_name(index: usize, cover: &CoverImage) -> String {
    format!("{}-{}.{}", DOWNLOAD_PREFIX, index + 1, cover.file_extension())
}
