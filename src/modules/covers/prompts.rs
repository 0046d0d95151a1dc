//! Prompt text and response schema sent to the provider.

use serde_json::{json, Value};

use super::models::BookInput;
use super::styles::CompositionVariation;

/// Vertical book-cover framing requested for every image.
pub const COVER_ASPECT_RATIO: &str = "3:4";

/// Indonesian-language instruction for the marketing package.
pub fn marketing_prompt(input: &BookInput) -> String {
    format!(
        "Buat paket pemasaran viral untuk cerita fiksi berikut:\n\
         Judul: {title}\n\
         Penulis: {author}\n\
         Sinopsis: {synopsis}\n\
         \n\
         Tugas Anda:\n\
         1. Buat 5 pilihan judul \"clickbait\" yang sangat menggoda dan memancing rasa penasaran (viral-worthy).\n\
         2. Tulis \"short_caption\" (100 kata): Fokus pada hook pembuka yang kuat.\n\
         3. Tulis \"long_caption\" (500 kata): Fokus pada narasi mendalam yang emosional.\n\
         4. Tulis \"promo_130\" (130 kata): Gaya promosi online (TikTok/Instagram), sangat clickbait, TIDAK membocorkan isi cerita (no spoilers), fokus pada vibe dan konflik utama yang membuat orang ingin klik. Harus membuat pembaca merasa \"rugi kalau tidak baca\".\n\
         5. Tulis \"promo_250\" (250 kata): Gaya promosi online yang lebih persuasif, misterius, tanpa spoiler, menonjolkan keunikan cerita (Unique Selling Point), diakhiri dengan cliffhanger yang memaksa pembaca segera mencari link bacanya.\n\
         \n\
         Aturan Penting:\n\
         - Bahasa: Indonesia yang kekinian, persuasif, dan emosional.\n\
         - Gunakan Hook yang sangat kuat di awal.\n\
         - Akhiri dengan Cliffhanger/CTA (Call to Action) yang misterius.\n\
         - Untuk promo_130 dan promo_250: JANGAN bocorkan plot twist atau rahasia penting cerita.\n",
        title = input.title(),
        author = input.author(),
        synopsis = input.synopsis(),
    )
}

/// Structured-output schema for `MarketingCopy`, in the provider's dialect.
pub fn marketing_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "clickbait": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "short_caption": { "type": "STRING" },
            "long_caption": { "type": "STRING" },
            "promo_130": { "type": "STRING" },
            "promo_250": { "type": "STRING" }
        },
        "required": ["clickbait", "short_caption", "long_caption"]
    })
}

/// Cover prompt for one composition variation.
pub fn cover_prompt(input: &BookInput, variation: CompositionVariation) -> String {
    format!(
        "Create a stunning, professional book cover design.\n\
         Design Style: {style}\n\
         Story Context: {synopsis}\n\
         \n\
         TEXT OVERLAY REQUIREMENTS (MANDATORY):\n\
         1. Main Title: \"{title}\"\n   \
            - Style: EXTREMELY BOLD, thick strokes, high-impact typography.\n   \
            - Positioning: Prominent, top or center-focused.\n\
         2. Author Name: \"Oleh {author}\"\n   \
            - Style: Thin, elegant, serif or light sans-serif font.\n   \
            - Positioning: Bottom center or small below the title.\n\
         3. Readability: Ensure text color contrasts perfectly with background for 100% clarity.\n\
         \n\
         VISUAL REQUIREMENTS:\n\
         - Composition: {composition}.\n\
         - Lighting: Professional studio lighting or dramatic atmospheric lighting appropriate for the genre.\n\
         - Characters: Asian/Indonesian descent if humans are shown.\n\
         - Quality: 4k, digital art, polished commercial finish.\n\
         - Aspect Ratio: {aspect} (Standard vertical cover).\n",
        style = input.style().label(),
        synopsis = input.synopsis(),
        title = input.title().to_uppercase(),
        author = input.author(),
        composition = variation.directive(),
        aspect = COVER_ASPECT_RATIO,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::covers::styles::BookStyle;

    fn input() -> BookInput {
        BookInput::new(
            "Sang Penari Langit",
            "Dewi",
            "Seorang penari yang bisa memanggil badai.",
            BookStyle::Fantasy,
        )
        .unwrap()
    }

    #[test]
    fn marketing_prompt_embeds_book_details() {
        let prompt = marketing_prompt(&input());
        assert!(prompt.contains("Judul: Sang Penari Langit"));
        assert!(prompt.contains("Penulis: Dewi"));
        assert!(prompt.contains("Sinopsis: Seorang penari yang bisa memanggil badai."));
        assert!(prompt.contains("promo_250"));
    }

    #[test]
    fn cover_prompt_uses_label_uppercase_title_and_variation() {
        let prompt = cover_prompt(&input(), CompositionVariation::Symbolic);
        assert!(prompt.contains("Design Style: Epic Fantasy"));
        assert!(prompt.contains("\"SANG PENARI LANGIT\""));
        assert!(prompt.contains("\"Oleh Dewi\""));
        assert!(prompt.contains("Composition: Symbolic and atmospheric composition."));
        assert!(prompt.contains("Aspect Ratio: 3:4"));
    }

    #[test]
    fn each_variation_yields_a_distinct_prompt() {
        let prompts: std::collections::HashSet<_> = CompositionVariation::ALL
            .iter()
            .map(|variation| cover_prompt(&input(), *variation))
            .collect();
        assert_eq!(prompts.len(), CompositionVariation::ALL.len());
    }

    #[test]
    fn schema_requires_core_fields_only() {
        let schema = marketing_schema();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["clickbait", "short_caption", "long_caption"]);
        assert_eq!(schema["properties"]["clickbait"]["type"], "ARRAY");
    }
}
