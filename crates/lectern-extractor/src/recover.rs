//! Best-effort recovery of structured records from model output
//!
//! Generated responses are frequently wrapped in code fences or prose, cut
//! off mid-record at the output token limit, or sprinkled with delimiters
//! that are not quite JSON. Recovery proceeds through increasingly lenient
//! tiers and keeps every record that can be read:
//!
//! 1. Strip code fences and surrounding prose
//! 2. Parse the array as-is ([`RecoveryTier::Direct`])
//! 3. Repair common delimiter mistakes and reparse ([`RecoveryTier::Repaired`])
//! 4. Cut after the last complete record and parse, falling back to parsing
//!    each complete record on its own ([`RecoveryTier::Salvaged`])
//! 5. Give up with no records ([`RecoveryTier::Empty`])
//!
//! Nothing in this module returns an error or panics, whatever the input.

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One structured item from a generated array
pub type Record = Map<String, Value>;

/// Which tier produced a [`Recovery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    /// The array parsed without changes
    Direct,
    /// The array parsed after delimiter repair
    Repaired,
    /// Complete records were salvaged from truncated or malformed text
    Salvaged,
    /// Nothing could be recovered
    Empty,
}

impl RecoveryTier {
    /// Lowercase name for logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryTier::Direct => "direct",
            RecoveryTier::Repaired => "repaired",
            RecoveryTier::Salvaged => "salvaged",
            RecoveryTier::Empty => "empty",
        }
    }
}

/// Records recovered from a response, and how
#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    /// Recovered records in response order
    pub records: Vec<Record>,
    /// The tier that produced them
    pub tier: RecoveryTier,
}

impl Recovery {
    fn new(records: Vec<Record>, tier: RecoveryTier) -> Self {
        Self { records, tier }
    }

    fn empty() -> Self {
        Self::new(Vec::new(), RecoveryTier::Empty)
    }
}

/// Recover an array of records, discarding the tier
pub fn recover(raw: &str) -> Vec<Record> {
    recover_with_tier(raw).records
}

/// Recover an array of records from raw model output
///
/// # Examples
///
/// ```
/// use lectern_extractor::{recover_with_tier, RecoveryTier};
///
/// let recovery = recover_with_tier(r#"[{"id":1,"title":"A"},{"id":2,"tit"#);
/// assert_eq!(recovery.records.len(), 1);
/// assert_eq!(recovery.tier, RecoveryTier::Salvaged);
/// ```
pub fn recover_with_tier(raw: &str) -> Recovery {
    let text = strip_fences(raw);

    let Some(start) = array_start(text) else {
        debug!("No array found in response ({} chars)", raw.len());
        return Recovery::empty();
    };
    let body = &text[start..];

    if let Some(end) = body.rfind(']') {
        let array = &body[..=end];

        if let Some(records) = parse_array(array) {
            debug!("Parsed {} records directly", records.len());
            return Recovery::new(records, RecoveryTier::Direct);
        }

        if let Some(records) = parse_array(&repair(array)) {
            debug!("Parsed {} records after repair", records.len());
            return Recovery::new(records, RecoveryTier::Repaired);
        }

        debug!("Closed array did not parse, salvaging records");
    } else {
        debug!("Array is not closed, response was likely truncated");
    }

    let records = salvage(body).or_else(|| salvage(&repair(body)));
    match records {
        Some(records) if !records.is_empty() => {
            warn!("Salvaged {} records from malformed response", records.len());
            Recovery::new(records, RecoveryTier::Salvaged)
        }
        _ => {
            warn!("Could not recover any records from response");
            Recovery::empty()
        }
    }
}

/// Recover a single `{...}` object (fence stripping, direct parse, repair)
pub fn recover_object(raw: &str) -> Option<Record> {
    let text = strip_fences(raw);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let object = &text[start..=end];

    parse_object(object).or_else(|| {
        let repaired = parse_object(&repair(object));
        if repaired.is_some() {
            debug!("Parsed object after repair");
        }
        repaired
    })
}

/// Drop surrounding whitespace and markdown code fences
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    for fence in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Offset of the array that holds the records
///
/// Prefers the first `[` that opens an array of objects, then the first empty
/// array, then any `[`, so bracketed prose ahead of the payload is skipped.
fn array_start(text: &str) -> Option<usize> {
    let first_opening = |open: char| {
        text.match_indices('[')
            .map(|(i, _)| i)
            .find(|&i| text[i + 1..].trim_start().starts_with(open))
    };
    first_opening('{')
        .or_else(|| first_opening(']'))
        .or_else(|| text.find('['))
}

fn parse_array(text: &str) -> Option<Vec<Record>> {
    let values: Vec<Value> = serde_json::from_str(text).ok()?;
    Some(into_records(values))
}

fn parse_object(text: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(record) => Some(record),
        _ => None,
    }
}

fn into_records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match value {
            Value::Object(record) => Some(record),
            other => {
                warn!("Skipping array element {}: not an object ({})", idx, other);
                None
            }
        })
        .collect()
}

/// Recover the complete records at the head of an array that may be cut off
fn salvage(body: &str) -> Option<Vec<Record>> {
    let spans = complete_records(body);
    let &(_, last_end) = spans.last()?;

    let cut = format!("{}]", &body[..last_end]);
    if let Some(records) = parse_array(&cut) {
        return Some(records);
    }
    if let Some(records) = parse_array(&repair(&cut)) {
        return Some(records);
    }

    let records: Vec<Record> = spans
        .iter()
        .filter_map(|&(start, end)| {
            let span = &body[start..end];
            let record = parse_object(span).or_else(|| parse_object(&repair(span)));
            if record.is_none() {
                warn!("Dropping unreadable record at offset {}", start);
            }
            record
        })
        .collect();

    (!records.is_empty()).then_some(records)
}

/// Byte ranges of every complete top-level `{...}` inside the array opening `body`
///
/// String and escape aware. Scanning stops at the bracket closing the array.
fn complete_records(body: &str) -> Vec<(usize, usize)> {
    let bytes = body.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut record_start = None;

    for (i, &byte) in bytes.iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                if byte == b'{' && depth == 1 {
                    record_start = Some(i);
                }
                depth += 1;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if byte == b'}' && depth == 1 {
                    if let Some(start) = record_start.take() {
                        spans.push((start, i + 1));
                    }
                }
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }

    spans
}

/// Rewrite common near-JSON mistakes into valid JSON
///
/// - typographic and single quotes used as delimiters become `"`
/// - raw control characters inside strings are escaped
/// - invalid escapes such as `\'` become literal characters
/// - a `"` inside a string that is not followed by a structural character is escaped
/// - trailing commas before `}` or `]` are removed
fn repair(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut delimiter = Delimiter::Double;
    let mut i = 0;

    let next_significant =
        |from: usize| chars.get(from..).and_then(|rest| rest.iter().find(|c| !c.is_whitespace()).copied());

    while i < chars.len() {
        let c = chars[i];

        if !in_string {
            match c {
                '"' | '\u{201C}' | '\u{201D}' | '\'' => {
                    in_string = true;
                    delimiter = match c {
                        '"' => Delimiter::Double,
                        '\'' => Delimiter::Single,
                        _ => Delimiter::Typographic,
                    };
                    out.push('"');
                }
                ',' if matches!(next_significant(i + 1), Some('}') | Some(']')) => {}
                _ => out.push(c),
            }
            i += 1;
            continue;
        }

        match c {
            '\\' => match chars.get(i + 1).copied() {
                Some(n @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                    out.push('\\');
                    out.push(n);
                    i += 1;
                }
                Some('u')
                    if chars
                        .get(i + 2..i + 6)
                        .is_some_and(|hex| hex.iter().all(char::is_ascii_hexdigit)) =>
                {
                    out.push('\\');
                }
                Some(n) if n != 'u' => {
                    push_escaped(&mut out, n);
                    i += 1;
                }
                _ => out.push_str("\\\\"),
            },
            '\u{201C}' | '\u{201D}' if delimiter == Delimiter::Typographic => {
                in_string = false;
                out.push('"');
            }
            '"' if delimiter != Delimiter::Double => out.push_str("\\\""),
            '"' | '\'' if c == delimiter.closing() => match next_significant(i + 1) {
                None | Some(',' | '}' | ']' | ':') => {
                    in_string = false;
                    out.push('"');
                }
                Some(_) if c == '"' => out.push_str("\\\""),
                Some(_) => out.push(c),
            },
            _ => push_escaped(&mut out, c),
        }
        i += 1;
    }

    out
}

/// Quote character that opened the string being repaired
#[derive(Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Double,
    Single,
    Typographic,
}

impl Delimiter {
    /// Plain quote that may close the string
    fn closing(self) -> char {
        match self {
            Delimiter::Single => '\'',
            Delimiter::Double | Delimiter::Typographic => '"',
        }
    }
}

/// Push a string character, escaping raw control characters
fn push_escaped(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test value must be an object"),
        }
    }

    #[test]
    fn test_truncated_array_keeps_complete_records() {
        let recovery = recover_with_tier(r#"[{"id":1,"title":"A"},{"id":2,"tit"#);
        assert_eq!(recovery.records, vec![record(json!({"id": 1, "title": "A"}))]);
        assert_eq!(recovery.tier, RecoveryTier::Salvaged);
    }

    #[test]
    fn test_well_formed_array_is_unchanged() {
        let records: Vec<Record> = (1..=5)
            .map(|id| {
                record(json!({
                    "id": id,
                    "title": format!("Part {}", id),
                    "content": "<p>Rows, \"quoted\" and [bracketed]</p>",
                    "estimated_time": "6min"
                }))
            })
            .collect();
        let raw = serde_json::to_string(&records).unwrap();

        let recovery = recover_with_tier(&raw);
        assert_eq!(recovery.tier, RecoveryTier::Direct);
        assert_eq!(recovery.records, records);
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let raw = "```json\n[{\"id\": 1}]\n```";
        let recovery = recover_with_tier(raw);
        assert_eq!(recovery.tier, RecoveryTier::Direct);
        assert_eq!(recovery.records.len(), 1);
    }

    #[test]
    fn test_prose_around_array_is_ignored() {
        let raw = "Sure! Here are the chunks [as requested]:\n[{\"id\": 1}, {\"id\": 2}]\nHope this helps.";
        let recovery = recover_with_tier(raw);
        assert_eq!(recovery.tier, RecoveryTier::Direct);
        assert_eq!(recovery.records.len(), 2);
    }

    #[test]
    fn test_empty_brackets_in_prose_are_skipped() {
        let raw = "Here is an empty list [] and then: [{\"id\":1},{\"id\":2}]";
        let recovery = recover_with_tier(raw);
        assert_eq!(recovery.tier, RecoveryTier::Direct);
        assert_eq!(
            recovery.records,
            vec![record(json!({"id": 1})), record(json!({"id": 2}))]
        );
    }

    #[test]
    fn test_trailing_commas_repaired() {
        let recovery = recover_with_tier(r#"[{"id": 1, "title": "A",}, {"id": 2,},]"#);
        assert_eq!(recovery.tier, RecoveryTier::Repaired);
        assert_eq!(recovery.records.len(), 2);
    }

    #[test]
    fn test_typographic_quotes_repaired() {
        let recovery = recover_with_tier("[{\u{201C}id\u{201D}: 1, \u{201C}title\u{201D}: \u{201C}Say \"hi\"\u{201D}}]");
        assert_eq!(recovery.tier, RecoveryTier::Repaired);
        assert_eq!(recovery.records, vec![record(json!({"id": 1, "title": "Say \"hi\""}))]);
    }

    #[test]
    fn test_raw_newlines_and_bad_escapes_repaired() {
        let raw = "[{\"content\": \"line one\nline two\", \"note\": \"it\\'s fine\"}]";
        let recovery = recover_with_tier(raw);
        assert_eq!(recovery.tier, RecoveryTier::Repaired);
        assert_eq!(recovery.records[0]["content"], "line one\nline two");
        assert_eq!(recovery.records[0]["note"], "it's fine");
    }

    #[test]
    fn test_escaped_raw_newline_repaired() {
        let raw = "[{\"content\": \"line one\\\nline two\"}]";
        let recovery = recover_with_tier(raw);
        assert_eq!(recovery.tier, RecoveryTier::Repaired);
        assert_eq!(recovery.records[0]["content"], "line one\nline two");
    }

    #[test]
    fn test_single_quoted_delimiters_repaired() {
        let recovery = recover_with_tier("[{'id': 1, 'title': 'A'}, {'id': 2, 'title': 'It's \"B\"'}]");
        assert_eq!(recovery.tier, RecoveryTier::Repaired);
        assert_eq!(
            recovery.records,
            vec![
                record(json!({"id": 1, "title": "A"})),
                record(json!({"id": 2, "title": "It's \"B\""})),
            ]
        );
    }

    #[test]
    fn test_stray_quotes_repaired() {
        let recovery = recover_with_tier(r#"[{"title": "The "best" option", "id": 1}]"#);
        assert_eq!(recovery.tier, RecoveryTier::Repaired);
        assert_eq!(recovery.records[0]["title"], "The \"best\" option");
    }

    #[test]
    fn test_malformed_record_does_not_sink_neighbours() {
        let recovery = recover_with_tier(r#"[{"id": 1}, {"id": 2 "oops"}, {"id": 3}]"#);
        assert_eq!(recovery.tier, RecoveryTier::Salvaged);
        assert_eq!(
            recovery.records,
            vec![record(json!({"id": 1})), record(json!({"id": 3}))]
        );
    }

    #[test]
    fn test_truncation_after_nested_array() {
        let raw = r#"[{"id": 1, "options": ["a", "b"]}, {"id": 2, "options": ["c""#;
        let recovery = recover_with_tier(raw);
        assert_eq!(recovery.tier, RecoveryTier::Salvaged);
        assert_eq!(recovery.records, vec![record(json!({"id": 1, "options": ["a", "b"]}))]);
    }

    #[test]
    fn test_non_object_elements_skipped() {
        let recovery = recover_with_tier(r#"[1, {"id": 1}, "x"]"#);
        assert_eq!(recovery.tier, RecoveryTier::Direct);
        assert_eq!(recovery.records.len(), 1);
    }

    #[test]
    fn test_degenerate_inputs() {
        for raw in ["", "[", "]", "[{", "no json here", "```", "{\"id\": 1}"] {
            let recovery = recover_with_tier(raw);
            assert_eq!(recovery.tier, RecoveryTier::Empty, "input {:?}", raw);
            assert!(recovery.records.is_empty());
        }
        assert_eq!(recover_with_tier("[]").tier, RecoveryTier::Direct);
    }

    #[test]
    fn test_complete_records_spans() {
        let body = r#"[{"a": "}"}, {"b": {"c": 1}}, {"d"#;
        let spans = complete_records(body);
        assert_eq!(spans.len(), 2);
        assert_eq!(&body[spans[0].0..spans[0].1], r#"{"a": "}"}"#);
        assert_eq!(&body[spans[1].0..spans[1].1], r#"{"b": {"c": 1}}"#);
    }

    #[test]
    fn test_recover_object() {
        let raw = "```json\n{\"questions\": [{\"question\": \"Q\",}]}\n```";
        let object = recover_object(raw).unwrap();
        assert!(object["questions"].is_array());

        assert!(recover_object("no braces").is_none());
        assert!(recover_object("} backwards {").is_none());
        assert!(recover_object("[1, 2]").is_none());
    }

    proptest! {
        #[test]
        fn prop_recovery_is_total(raw in ".{0,200}") {
            let _ = recover_with_tier(&raw);
            let _ = recover_object(&raw);
        }

        #[test]
        fn prop_recovery_is_total_on_json_like_text(raw in "[\\[\\]{}\"',:a-z0-9 \\\\\n\u{201C}\u{201D}]{0,80}") {
            let _ = recover_with_tier(&raw);
            let _ = recover_object(&raw);
        }

        #[test]
        fn prop_truncation_keeps_a_prefix_of_records(
            titles in proptest::collection::vec("[a-z ]{0,12}", 1..6),
            cut in 0usize..400,
        ) {
            let records: Vec<Record> = titles
                .iter()
                .enumerate()
                .map(|(i, title)| record(json!({"id": i + 1, "title": title})))
                .collect();
            let raw = serde_json::to_string(&records).unwrap();
            let truncated = &raw[..cut.min(raw.len())];

            let recovered = recover(truncated);
            prop_assert!(recovered.len() <= records.len());
            prop_assert_eq!(&recovered[..], &records[..recovered.len()]);
        }
    }
}
