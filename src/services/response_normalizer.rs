use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use rand::{seq::SliceRandom, Rng};
use regex::Regex;
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{GameType, QuestionDraft},
    services::json_repair::repair_json,
};

static BARE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)(\s*):").expect("BARE_KEY is a valid regex pattern")
});

const MCQ_DISTRACTOR_KEYS: [&str; 3] = ["option1", "option2", "option3"];

/// One question object as the model wrote it: lower-cased keys mapped to
/// scalar values rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuestion {
    fields: BTreeMap<String, String>,
}

impl RawQuestion {
    fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        map.into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key, text))
            })
            .collect()
    }

    /// Trimmed value of `key`; blank values count as missing.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawQuestion {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_lowercase(), v.into()))
                .collect(),
        }
    }
}

/// Turns raw model text into question objects: lexical repair, strict parse,
/// then structural repair as a fallback. Each bracketed region of the reply
/// is tried in order, so stray brackets in surrounding prose are skipped.
/// Fails with `UnparsableResponse` carrying the untouched input.
pub fn normalize(raw: &str) -> AppResult<Vec<RawQuestion>> {
    let candidates: Vec<String> = payload_spans(raw).into_iter().map(lexical_repair).collect();

    if let Some(batch) = candidates.iter().find_map(|text| parse_batch(text)) {
        return Ok(batch);
    }

    log::warn!("Model response is not valid JSON after lexical repair, trying structural repair");
    candidates
        .iter()
        .find_map(|text| parse_batch(&repair_json(text)))
        .ok_or_else(|| AppError::UnparsableResponse {
            reason: "response does not contain a JSON array of question objects".to_string(),
            raw: raw.to_string(),
        })
}

/// Validates every element, dropping the broken ones. Multiple choice
/// options are shuffled so the answer position carries no information.
pub fn validate_questions<R: Rng + ?Sized>(
    batch: Vec<RawQuestion>,
    game_type: GameType,
    rng: &mut R,
) -> Vec<QuestionDraft> {
    batch
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match validate_question(raw, game_type, rng) {
            Ok(draft) => Some(draft),
            Err(reason) => {
                log::warn!("Dropping generated question {}: {}", index, reason);
                None
            }
        })
        .collect()
}

/// `normalize` followed by `validate_questions`; an empty result is a failure.
pub fn normalize_questions<R: Rng + ?Sized>(
    raw: &str,
    game_type: GameType,
    rng: &mut R,
) -> AppResult<Vec<QuestionDraft>> {
    let batch = normalize(raw)?;
    let received = batch.len();
    let drafts = validate_questions(batch, game_type, rng);

    if drafts.is_empty() {
        return Err(AppError::UnparsableResponse {
            reason: format!("none of the {} generated questions were valid", received),
            raw: raw.to_string(),
        });
    }
    if drafts.len() < received {
        log::info!("Kept {} of {} generated questions", drafts.len(), received);
    }
    Ok(drafts)
}

fn validate_question<R: Rng + ?Sized>(
    raw: &RawQuestion,
    game_type: GameType,
    rng: &mut R,
) -> Result<QuestionDraft, String> {
    if raw.is_empty() {
        return Err("not a question object".to_string());
    }
    let question = raw.get("question").ok_or("missing question")?;
    let answer = raw.get("answer").ok_or("missing answer")?;

    let options = match game_type {
        GameType::OpenEnded => None,
        GameType::Mcq => {
            let mut options = vec![answer.to_string()];
            for key in MCQ_DISTRACTOR_KEYS {
                let option = raw.get(key).ok_or_else(|| format!("missing {}", key))?;
                options.push(option.to_string());
            }

            let distinct: HashSet<String> = options.iter().map(|o| o.to_lowercase()).collect();
            if distinct.len() != options.len() {
                return Err("options are not distinct".to_string());
            }

            options.shuffle(rng);
            Some(options)
        }
    };

    Ok(QuestionDraft {
        question: question.to_string(),
        answer: answer.to_string(),
        options,
    })
}

/// Cheap fix-ups before parsing: quote bare `word:` keys and turn
/// single-quoted strings into double-quoted ones. Double-quoted strings pass
/// through.
pub fn lexical_repair(payload: &str) -> String {
    let chars: Vec<char> = payload.chars().collect();
    let mut out = String::with_capacity(chars.len() + 16);
    let mut bare = String::new();

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '"' => {
                flush_bare(&mut bare, &mut out);
                let end = double_quoted_end(&chars, i);
                out.extend(&chars[i..=end]);
                i = end + 1;
            }
            '\'' => {
                flush_bare(&mut bare, &mut out);
                match single_quoted_end(&chars, i) {
                    Some(end) => {
                        push_double_quoted(&chars[i + 1..end], &mut out);
                        i = end + 1;
                    }
                    None => {
                        out.push('"');
                        i += 1;
                    }
                }
            }
            c => {
                bare.push(c);
                i += 1;
            }
        }
    }
    flush_bare(&mut bare, &mut out);
    out
}

/// Top-level bracketed regions of the reply in order, dropping the prose
/// around and between them. An unclosed region runs to the end of the text.
/// A reply without brackets is returned whole.
fn payload_spans(raw: &str) -> Vec<&str> {
    let text = raw.trim();
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(|c| c == '[' || c == '{') {
        let tail = &rest[start..];
        match closing_offset(tail) {
            Some(end) => {
                spans.push(&tail[..end]);
                rest = &tail[end..];
            }
            None => {
                spans.push(tail);
                break;
            }
        }
    }

    if spans.is_empty() {
        spans.push(text);
    }
    spans
}

/// Byte offset just past the bracket closing the one `text` starts with.
fn closing_offset(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn flush_bare(bare: &mut String, out: &mut String) {
    if bare.is_empty() {
        return;
    }
    out.push_str(&BARE_KEY.replace_all(bare, "\"${1}\"${2}:"));
    bare.clear();
}

fn double_quoted_end(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i,
            _ => i += 1,
        }
    }
    chars.len() - 1
}

/// Apostrophes inside a single-quoted string are kept: only a quote followed
/// by a delimiter (or the end of input) closes it.
fn single_quoted_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\'' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, None | Some(',' | ':' | '}' | ']')) {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn push_double_quoted(content: &[char], out: &mut String) {
    out.push('"');
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            '\\' if content.get(i + 1) == Some(&'\'') => {
                out.push('\'');
                i += 1;
            }
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
        i += 1;
    }
    out.push('"');
}

fn parse_batch(text: &str) -> Option<Vec<RawQuestion>> {
    let elements = match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => items,
        Value::Object(map) if map.contains_key("question") => vec![Value::Object(map)],
        Value::Object(map) => {
            // a wrapper such as {"questions": [...]}
            let mut arrays = map.into_iter().filter_map(|(_, value)| match value {
                Value::Array(items) => Some(items),
                _ => None,
            });
            let items = arrays.next()?;
            if arrays.next().is_some() {
                return None;
            }
            items
        }
        _ => return None,
    };

    if !elements.iter().any(Value::is_object) {
        return None;
    }
    Some(elements.into_iter().map(RawQuestion::from_value).collect())
}
