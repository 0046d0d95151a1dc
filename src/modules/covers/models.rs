use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::GenerationError;
use super::styles::BookStyle;

/// Number of covers produced per generation.
pub const COVER_COUNT: usize = 4;

/// Validated input for one generation request. Fields are stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookInput {
    title: String,
    author: String,
    synopsis: String,
    style: BookStyle,
}

impl BookInput {
    /// Build an input from already-checked parts; `None` if any text is blank.
    pub fn new(title: &str, author: &str, synopsis: &str, style: BookStyle) -> Option<Self> {
        let (title, author, synopsis) = (title.trim(), author.trim(), synopsis.trim());
        if title.is_empty() || author.is_empty() || synopsis.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            author: author.to_string(),
            synopsis: synopsis.to_string(),
            style,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    pub fn style(&self) -> BookStyle {
        self.style
    }
}

/// Marketing text returned by the text-generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketingCopy {
    /// Clickbait title variants, best first. Providers sometimes send a
    /// single string instead of an array.
    #[serde(deserialize_with = "one_or_many")]
    pub clickbait: Vec<String>,
    pub short_caption: String,
    pub long_caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_130: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_250: Option<String>,
}

impl MarketingCopy {
    /// Parse the provider's structured text, normalize whitespace and check
    /// that every required field carries text.
    pub fn parse(text: &str) -> Result<Self, GenerationError> {
        let raw: MarketingCopy = serde_json::from_str(text.trim())
            .map_err(|e| GenerationError::schema(format!("marketing copy is not valid JSON: {e}")))?;
        raw.normalized()
    }

    fn normalized(self) -> Result<Self, GenerationError> {
        let clickbait: Vec<String> = self
            .clickbait
            .into_iter()
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .collect();
        if clickbait.is_empty() {
            return Err(GenerationError::schema("marketing copy has no clickbait title"));
        }

        let short_caption = required_text("short_caption", self.short_caption)?;
        let long_caption = required_text("long_caption", self.long_caption)?;

        Ok(Self {
            clickbait,
            short_caption,
            long_caption,
            promo_130: optional_text(self.promo_130),
            promo_250: optional_text(self.promo_250),
        })
    }

    /// The recommended clickbait title.
    pub fn headline(&self) -> &str {
        // normalized() guarantees at least one entry
        self.clickbait.first().map(String::as_str).unwrap_or_default()
    }
}

fn required_text(field: &str, value: String) -> Result<String, GenerationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GenerationError::schema(format!("marketing copy field '{field}' is empty")));
    }
    Ok(value.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(title) => vec![title],
        OneOrMany::Many(titles) => titles,
    })
}

/// A rendered cover: raw image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    mime_type: String,
    data: Vec<u8>,
}

impl CoverImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Inline `data:` URI suitable for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }

    /// File extension for saving the payload.
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl Serialize for CoverImage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut cover = serializer.serialize_struct("CoverImage", 2)?;
        cover.serialize_field("mime_type", &self.mime_type)?;
        cover.serialize_field("data_uri", &self.data_uri())?;
        cover.end()
    }
}

/// Everything one generation produced. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    /// Cover `i` was rendered with `CompositionVariation::for_index(i)`.
    pub covers: [CoverImage; COVER_COUNT],
    pub copy: MarketingCopy,
}
