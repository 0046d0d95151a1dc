//! Fixed catalogs: visual-style presets and cover composition directives.

use serde::{Serialize, Serializer};
use std::fmt;

/// Visual-style preset offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookStyle {
    Cinematic,
    Minimalist,
    Fantasy,
    Romance,
    Thriller,
    Cyberpunk,
    Watercolor,
    Horror,
    Anime,
    Vintage,
}

impl BookStyle {
    /// Catalog order as shown to the user.
    pub const ALL: [BookStyle; 10] = [
        BookStyle::Cinematic,
        BookStyle::Minimalist,
        BookStyle::Fantasy,
        BookStyle::Romance,
        BookStyle::Thriller,
        BookStyle::Cyberpunk,
        BookStyle::Watercolor,
        BookStyle::Horror,
        BookStyle::Anime,
        BookStyle::Vintage,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BookStyle::Cinematic => "cinematic",
            BookStyle::Minimalist => "minimalist",
            BookStyle::Fantasy => "fantasy",
            BookStyle::Romance => "romance",
            BookStyle::Thriller => "thriller",
            BookStyle::Cyberpunk => "cyberpunk",
            BookStyle::Watercolor => "watercolor",
            BookStyle::Horror => "horror",
            BookStyle::Anime => "anime",
            BookStyle::Vintage => "vintage",
        }
    }

    /// Display label; also the text embedded in image prompts.
    pub fn label(self) -> &'static str {
        match self {
            BookStyle::Cinematic => "Cinematic Movie Poster",
            BookStyle::Minimalist => "Minimalist Vector",
            BookStyle::Fantasy => "Epic Fantasy",
            BookStyle::Romance => "Soft Romance",
            BookStyle::Thriller => "Dark Thriller",
            BookStyle::Cyberpunk => "Cyberpunk / Sci-Fi",
            BookStyle::Watercolor => "Artistic Watercolor",
            BookStyle::Horror => "Gothic Horror",
            BookStyle::Anime => "Anime / Manga",
            BookStyle::Vintage => "Vintage Retro",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BookStyle::Cinematic => "Dramatic lighting, realistic textures",
            BookStyle::Minimalist => "Clean lines, bold colors, symbolic",
            BookStyle::Fantasy => "Magical atmosphere, digital painting style",
            BookStyle::Romance => "Pastel tones, dreamy, emotional",
            BookStyle::Thriller => "High contrast, shadows, mysterious",
            BookStyle::Cyberpunk => "Neon lights, futuristic elements",
            BookStyle::Watercolor => "Fluid, organic, hand-painted look",
            BookStyle::Horror => "Gritty, dark, terrifying atmosphere",
            BookStyle::Anime => "Japanese animation style, expressive",
            BookStyle::Vintage => "Old paper texture, classic typography style",
        }
    }

    /// Resolve a form value by id or label, ignoring case and surrounding
    /// whitespace. Blank or unknown values resolve to `None`.
    pub fn resolve(value: &str) -> Option<BookStyle> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|style| {
            style.id().eq_ignore_ascii_case(value) || style.label().eq_ignore_ascii_case(value)
        })
    }
}

impl fmt::Display for BookStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialized as the catalog entry the style selector renders.
impl Serialize for BookStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut entry = serializer.serialize_struct("BookStyle", 3)?;
        entry.serialize_field("id", self.id())?;
        entry.serialize_field("label", self.label())?;
        entry.serialize_field("description", self.description())?;
        entry.end()
    }
}

/// Composition directive that makes the four covers visually distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositionVariation {
    CloseUp,
    WideAngle,
    DynamicPose,
    Symbolic,
}

impl CompositionVariation {
    /// One directive per cover, in cover order.
    pub const ALL: [CompositionVariation; 4] = [
        CompositionVariation::CloseUp,
        CompositionVariation::WideAngle,
        CompositionVariation::DynamicPose,
        CompositionVariation::Symbolic,
    ];

    /// Directive for the cover at `index`, cycling through the catalog.
    pub fn for_index(index: usize) -> CompositionVariation {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn directive(self) -> &'static str {
        match self {
            CompositionVariation::CloseUp => "Close-up portrait/object focus",
            CompositionVariation::WideAngle => "Wide angle scene showing the world",
            CompositionVariation::DynamicPose => "Dynamic action/emotional pose",
            CompositionVariation::Symbolic => "Symbolic and atmospheric composition",
        }
    }
}
