use serde::{Deserialize, Serialize};

use super::generate_content_request::Content;

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ReviewSnippet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ReviewSnippet {
    /// The quotable text of the snippet, if it carries any.
    pub fn excerpt(&self) -> Option<&str> {
        self.review
            .as_deref()
            .or(self.title.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippet>,
}

/// `placeAnswerSources` has been observed both as a single object and as a list.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_answer_sources: Option<OneOrMany<PlaceAnswerSources>>,
}

impl MapsReference {
    pub fn first_review_excerpt(&self) -> Option<String> {
        self.place_answer_sources
            .as_ref()?
            .iter()
            .flat_map(|sources| sources.review_snippets.iter())
            .find_map(|snippet| snippet.excerpt())
            .map(str::to_string)
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct RawGroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maps: Option<MapsReference>,
}

/// A grounding citation; anything that isn't a maps reference (web, retrieved
/// context, ...) collapses into `Other`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "RawGroundingChunk", into = "RawGroundingChunk")]
pub enum GroundingChunk {
    Maps(MapsReference),
    Other,
}

impl From<RawGroundingChunk> for GroundingChunk {
    fn from(raw: RawGroundingChunk) -> Self {
        match raw.maps {
            Some(maps) => GroundingChunk::Maps(maps),
            None => GroundingChunk::Other,
        }
    }
}

impl From<GroundingChunk> for RawGroundingChunk {
    fn from(chunk: GroundingChunk) -> Self {
        match chunk {
            GroundingChunk::Maps(maps) => RawGroundingChunk { maps: Some(maps) },
            GroundingChunk::Other => RawGroundingChunk::default(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate; `None` when there are none.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.as_slice())
            .unwrap_or(&[])
    }
}
