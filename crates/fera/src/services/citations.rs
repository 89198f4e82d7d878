//! Citation extractor
//!
//! Turns Gemini grounding metadata into a deduplicated source list. Chunks
//! carry the cited page; supports tie answer spans back to chunks by index,
//! which yields the best-effort snippet per source.

use std::collections::HashSet;

use serde_json::Value;

use crate::domain::entities::Source;

/// Extract deduplicated sources from a `groundingMetadata` object.
///
/// Chunks without both `web.uri` and `web.title` are skipped. The first
/// occurrence of a url wins; later duplicates are dropped. The snippet is
/// the space-joined `segment.text` of every support that references the
/// chunk, or empty when nothing does.
pub fn extract_sources(metadata: &Value) -> Vec<Source> {
    let chunks = match metadata.get("groundingChunks").and_then(|c| c.as_array()) {
        Some(list) => list,
        None => return Vec::new(),
    };
    let supports = metadata
        .get("groundingSupports")
        .and_then(|s| s.as_array())
        .map(|s| s.as_slice())
        .unwrap_or(&[]);

    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let Some(web) = chunk.get("web") else {
            continue;
        };
        let (Some(url), Some(title)) = (
            web.get("uri").and_then(|v| v.as_str()),
            web.get("title").and_then(|v| v.as_str()),
        ) else {
            continue;
        };

        if !seen.insert(url.to_string()) {
            continue;
        }

        let snippet = supports
            .iter()
            .filter(|support| references_chunk(support, index))
            .filter_map(|support| {
                support
                    .get("segment")
                    .and_then(|segment| segment.get("text"))
                    .and_then(|text| text.as_str())
            })
            .collect::<Vec<_>>()
            .join(" ");

        sources.push(Source {
            title: title.to_string(),
            url: url.to_string(),
            snippet,
        });
    }

    sources
}

fn references_chunk(support: &Value, index: usize) -> bool {
    support
        .get("groundingChunkIndices")
        .and_then(|indices| indices.as_array())
        .map(|indices| {
            indices
                .iter()
                .any(|value| value.as_u64() == Some(index as u64))
        })
        .unwrap_or(false)
}
