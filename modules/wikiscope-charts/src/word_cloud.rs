//! The word-cloud adapter: gate on a minimum amount of text, weight tokens
//! by frequency, and hand the spec to an external layout collaborator.
//!
//! The production renderer is the browser-side cloud layout fed by the spec
//! JSON; [`CloudRasterizer`] is the seam for an in-process one.

use std::collections::HashMap;

use serde::Serialize;

use wikiscope_common::WikiscopeError;

/// Minimum joined-text length for the slice path.
pub const SLICE_MIN_CHARS: usize = 100;
/// The overview path only requires a non-empty sample.
pub const OVERVIEW_MIN_CHARS: usize = 1;

/// Heaviest tokens kept in the spec.
pub const MAX_TOKENS: usize = 200;

pub const CLOUD_WIDTH: u32 = 800;
pub const CLOUD_HEIGHT: u32 = 400;

/// Fixed seed so the layout collaborator is deterministic for a given
/// (seed, text, dimensions) triple.
pub const CLOUD_SEED: u64 = 42;

/// Everything a layout engine needs: frequency-weighted tokens, canvas
/// dimensions, palette, and a seed.
#[derive(Debug, Clone, Serialize)]
pub struct WordCloudSpec {
    /// (token, weight) pairs, heaviest first; ties break alphabetically.
    pub tokens: Vec<(String, u32)>,
    pub width: u32,
    pub height: u32,
    pub background: &'static str,
    pub palette: &'static str,
    pub seed: u64,
}

/// A rendered cloud: RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// External layout algorithm, treated as a black box.
pub trait CloudRasterizer: Send + Sync {
    fn rasterize(&self, spec: &WordCloudSpec) -> Result<Raster, WikiscopeError>;
}

/// Join the non-null text values with single spaces.
pub fn join_text(texts: &[Option<String>]) -> String {
    texts
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Build a cloud spec, or `None` when the joined text is shorter than
/// `min_chars` (character count, not bytes — the corpus is Vietnamese).
pub fn word_cloud(texts: &[Option<String>], min_chars: usize) -> Option<WordCloudSpec> {
    let joined = join_text(texts);
    if joined.chars().count() < min_chars {
        return None;
    }
    let tokens = token_weights(&joined, MAX_TOKENS);
    if tokens.is_empty() {
        return None;
    }
    Some(WordCloudSpec {
        tokens,
        width: CLOUD_WIDTH,
        height: CLOUD_HEIGHT,
        background: "white",
        palette: "viridis",
        seed: CLOUD_SEED,
    })
}

/// Apply the same gate, then delegate to the layout collaborator. The
/// rasterizer is never invoked for gated input.
pub fn render_word_cloud(
    texts: &[Option<String>],
    min_chars: usize,
    rasterizer: &dyn CloudRasterizer,
) -> Result<Option<Raster>, WikiscopeError> {
    match word_cloud(texts, min_chars) {
        Some(spec) => rasterizer.rasterize(&spec).map(Some),
        None => Ok(None),
    }
}

/// Frequency-weight the tokens of a text blob: whitespace split,
/// punctuation trimmed, lowercased, at least two characters. Sorted by
/// descending weight, alphabetical within a weight, truncated to `limit`.
pub fn token_weights(text: &str, limit: usize) -> Vec<(String, u32)> {
    let mut bag: HashMap<String, u32> = HashMap::new();
    for raw in text.split_whitespace() {
        let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.chars().count() < 2 {
            continue;
        }
        *bag.entry(trimmed.to_lowercase()).or_insert(0) += 1;
    }

    let mut tokens: Vec<(String, u32)> = bag.into_iter().collect();
    tokens.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tokens.truncate(limit);
    tokens
}
