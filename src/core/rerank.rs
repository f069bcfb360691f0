use crate::models::{PreferenceProfile, ScoredCandidate, RawRecommendation, RecommendationSource};
use crate::core::embedding::preference_text;
use crate::services::{GenerativeService, GenerativeError};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Score assumed when the model omits one
const DEFAULT_MODEL_SCORE: f64 = 0.5;

/// Description characters included per candidate in the prompt
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Why the generative pass produced no usable output
#[derive(Debug, Error)]
pub enum RerankFailure {
    #[error("generative service unavailable: {0}")]
    Unavailable(#[from] GenerativeError),

    #[error("generative output is not valid JSON after repair")]
    Malformed(String),
}

/// Outcome of parsing model output
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Parsed(Value),
    Malformed(String),
}

/// Asks the generative service to pick and explain the best candidates
#[derive(Clone)]
pub struct GenerativeReranker {
    service: Arc<dyn GenerativeService>,
    timeout: Duration,
}

impl GenerativeReranker {
    pub fn new(service: Arc<dyn GenerativeService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Rerank the candidate window
    ///
    /// Returned entries reference only ids present in `window`, in the order
    /// the model gave them, without duplicates.
    pub async fn rerank(
        &self,
        profile: &PreferenceProfile,
        window: &[ScoredCandidate],
    ) -> Result<Vec<RawRecommendation>, RerankFailure> {
        let prompt = build_prompt(profile, window);

        let text = match tokio::time::timeout(self.timeout, self.service.complete(&prompt, true)).await {
            Ok(result) => result?,
            Err(_) => return Err(GenerativeError::Timeout(self.timeout).into()),
        };

        let value = match parse_response(&text) {
            ParsedResponse::Parsed(value) => value,
            ParsedResponse::Malformed(raw) => return Err(RerankFailure::Malformed(raw)),
        };

        let entries = value
            .get("recommendations")
            .and_then(|r| r.as_array())
            .ok_or_else(|| {
                GenerativeError::InvalidResponse("Missing recommendations array".into())
            })?;

        let known_ids: HashSet<i64> = window.iter().map(|c| c.item.id).collect();
        let mut seen = HashSet::new();

        let recommendations: Vec<RawRecommendation> = entries
            .iter()
            .filter_map(parse_entry)
            .filter(|rec| {
                if !known_ids.contains(&rec.item_id) {
                    tracing::debug!("Discarding recommendation for unknown item id {}", rec.item_id);
                    return false;
                }
                seen.insert(rec.item_id)
            })
            .collect();

        tracing::debug!(
            "Generative reranker returned {} usable of {} entries",
            recommendations.len(),
            entries.len()
        );

        Ok(recommendations)
    }
}

/// Build the reranking prompt for a candidate window
pub fn build_prompt(profile: &PreferenceProfile, window: &[ScoredCandidate]) -> String {
    let mut candidates = String::new();
    for c in window {
        let item = &c.item;
        let description = item
            .description
            .as_deref()
            .map(|d| d.chars().take(DESCRIPTION_PREVIEW_CHARS).collect::<String>())
            .unwrap_or_default();

        // Writing to a String never fails
        let _ = writeln!(
            candidates,
            "- itemId: {} | {} ({}) [地域: {}] numeric={:.3} semantic={:.3} hybrid={:.3} {}",
            item.id,
            item.name,
            item.category,
            item.known_region().unwrap_or("未指定"),
            c.numeric_score,
            c.semantic_score,
            c.hybrid_score,
            description,
        );
    }

    format!(
        r#"あなたは日本酒の専門家です。ユーザーの好みに基づいて、最適な日本酒を3〜5本レコメンドしてください。

ユーザーの嗜好情報:
{preferences}

必ず以下のリストに含まれる日本酒の中からのみ選び、itemId はリストの値をそのまま使ってください:

{candidates}
回答は以下のJSON形式のみで返してください:
{{
    "recommendations": [
        {{
            "itemId": 123,
            "itemName": "お酒の名前",
            "reason": "このお酒を選んだ理由（ユーザーの好みとの関連を含めて）",
            "score": 0.0-1.0のスコア（1.0が最適）,
            "matchPoints": ["マッチポイント1", "マッチポイント2"]
        }}
    ]
}}

地域性や地酒の特徴も考慮して、ユーザーが地方創生の文脈で楽しめるような説明も含めてください。
"#,
        preferences = preference_text(profile),
        candidates = candidates,
    )
}

/// Strict parse, then one bounded repair pass and a single re-parse
pub fn parse_response(text: &str) -> ParsedResponse {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return ParsedResponse::Parsed(value);
    }

    match serde_json::from_str::<Value>(&repair_json(text)) {
        Ok(value) => ParsedResponse::Parsed(value),
        Err(e) => {
            tracing::warn!("Generative output could not be parsed after repair: {}", e);
            ParsedResponse::Malformed(text.to_string())
        }
    }
}

/// Fix the common ways model output deviates from strict JSON
///
/// - surrounding Markdown code fence
/// - smart quotes used as string delimiters
/// - trailing commas before `}` or `]`
///
/// The scan tracks string literals, so smart quotes inside a value are
/// escaped and commas inside a value are left alone.
pub fn repair_json(text: &str) -> String {
    let chars: Vec<char> = strip_code_fence(text.trim()).chars().collect();
    let mut repaired = String::with_capacity(chars.len());

    // Quote that opened the string literal being scanned
    let mut opened_by: Option<char> = None;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        match opened_by {
            Some(_) if escaped => {
                escaped = false;
                repaired.push(c);
            }
            Some(_) if c == '\\' => {
                escaped = true;
                repaired.push(c);
            }
            Some(opener) if c == '"' || (is_smart_quote(opener) && is_smart_quote(c)) => {
                opened_by = None;
                repaired.push('"');
            }
            Some(_) if is_smart_quote(c) => repaired.push_str("\\\""),
            Some(_) => repaired.push(c),
            None if c == '"' || is_smart_quote(c) => {
                opened_by = Some(c);
                repaired.push('"');
            }
            None if c == ',' && closes_next(&chars[i + 1..]) => {}
            None => repaired.push(c),
        }
    }

    repaired
}

fn is_smart_quote(c: char) -> bool {
    matches!(c, '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{FF02}')
}

fn closes_next(rest: &[char]) -> bool {
    matches!(rest.iter().copied().find(|c| !c.is_whitespace()), Some('}' | ']'))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // An info string (e.g. "json") sits alone on the opening line
    let body = match rest.split_once('\n') {
        Some((info, body)) if info.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Read one entry; entries without a usable id are skipped
fn parse_entry(entry: &Value) -> Option<RawRecommendation> {
    let item_id = entry
        .get("itemId")
        .or_else(|| entry.get("item_id"))
        .and_then(|id| match id {
            Value::Number(n) => n.as_i64().or_else(|| {
                // Whole floats such as 3.0
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })?;

    let text_field = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| entry.get(*k).and_then(|v| v.as_str()))
            .unwrap_or_default()
            .to_string()
    };

    let score = entry
        .get("score")
        .and_then(|s| match s {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|s| s.is_finite())
        .unwrap_or(DEFAULT_MODEL_SCORE)
        .clamp(0.0, 1.0);

    let match_points = entry
        .get("matchPoints")
        .or_else(|| entry.get("match_points"))
        .and_then(|m| m.as_array())
        .map(|points| {
            points
                .iter()
                .filter_map(|p| p.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(RawRecommendation {
        item_id,
        item_name: text_field(&["itemName", "item_name"]),
        reason: text_field(&["reason"]),
        score,
        match_points,
        source: RecommendationSource::Generative,
    })
}
