//! Wire types for the parlance notes API.
//!
//! Request bodies are deserialized by the server and serialized by clients;
//! response bodies go the other way. Timestamps travel as RFC 3339 strings.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

/// A note as returned by list, get, create, update and upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub original_language: String,
    pub translated_text: Option<String>,
    pub translated_language: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCreateRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub original_language: Option<String>,
}

/// Full replacement (`PUT`). The language keeps its stored value when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteReplaceRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub original_language: Option<String>,
}

/// Partial update (`PATCH`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotePatchRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub id: i64,
    pub title: String,
    pub original_text: String,
    pub original_language: String,
    pub translated_text: Option<String>,
    pub translated_language: Option<String>,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_notes: u64,
    pub translations_count: u64,
    pub breakdown_by_language: LanguageBreakdown,
}

/// Original language to note count, most common first.
///
/// Travels as a JSON object (`{"en": 3, "hi": 1}`) whose keys keep this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageBreakdown(pub Vec<LanguageCountResponse>);

impl LanguageBreakdown {
    pub fn get(&self, language: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|entry| entry.language == language)
            .map(|entry| entry.count)
    }
}

impl Serialize for LanguageBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.language, &entry.count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LanguageBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = LanguageBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of language codes to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((language, count)) = access.next_entry::<String, u64>()? {
                    entries.push(LanguageCountResponse { language, count });
                }
                Ok(LanguageBreakdown(entries))
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageCountResponse {
    pub language: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheInfoResponse {
    pub backend: String,
    pub reachable: bool,
    pub probe_passed: bool,
    pub list_ttl_seconds: u64,
    pub note_ttl_seconds: u64,
    pub translation_ttl_seconds: u64,
    /// Live keys under the cache prefix; absent when they could not be listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cache_keys: Option<u64>,
    /// Up to ten of those keys.
    #[serde(default)]
    pub sample_cache_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
