//! Best-effort detection of image-capable models.
//!
//! Name matching is a guess; a model card from `/api/show` overrides it when
//! available. Neither answer blocks sending an image.

use super::client::ModelCard;

/// Name fragments of known multimodal model families.
const VISION_MARKERS: &[&str] = &[
    "llava",
    "bakllava",
    "vision",
    "moondream",
    "minicpm-v",
    "qwen2-vl",
    "qwen2.5vl",
    "qwen2.5-vl",
    "gemma3",
    "llama4",
    "granite3.2-vision",
    "mistral-small3.1",
];

/// Projector families reported by multimodal models.
const VISION_FAMILIES: &[&str] = &["clip", "mllama"];

/// Guess from the model tag alone.
pub fn name_suggests_vision(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    VISION_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Decide from a model card.
pub fn card_supports_vision(card: &ModelCard) -> bool {
    if card.capabilities.iter().any(|c| c.eq_ignore_ascii_case("vision")) {
        return true;
    }
    let families = card.details.families.iter().flatten();
    std::iter::once(&card.details.family)
        .chain(families)
        .any(|family| {
            let family = family.to_ascii_lowercase();
            VISION_FAMILIES.iter().any(|v| family.contains(v))
        })
}
