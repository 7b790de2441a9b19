use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "Not Available";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<ResultItem>,
    #[serde(default, deserialize_with = "deserialize_error")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn new(data: Vec<ResultItem>) -> Self {
        Self { data, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn organic_results(&self) -> impl Iterator<Item = &OrganicResult> {
        self.data.iter().filter_map(|item| match item {
            ResultItem::Organic(result) => Some(result),
            _ => None,
        })
    }
}

/// One entry of `SearchResponse::data`, decoded from the integer `t` tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ResultItem {
    /// `t = 0`
    Organic(OrganicResult),
    /// `t = 1`
    RelatedSearches(Vec<String>),
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
    pub published: Option<String>,
}

impl OrganicResult {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn snippet(&self) -> &str {
        self.snippet.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn published(&self) -> &str {
        self.published.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

// Decoding an item never fails: fields of the wrong type become `None` and a
// missing or non-integer tag becomes `Unrecognized`.
impl From<Value> for ResultItem {
    fn from(item: Value) -> Self {
        let text = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);

        match item.get("t").and_then(Value::as_u64) {
            Some(0) => ResultItem::Organic(OrganicResult {
                title: text("title"),
                url: text("url"),
                snippet: text("snippet"),
                published: text("published"),
            }),
            Some(1) => ResultItem::RelatedSearches(
                item.get("list")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            _ => ResultItem::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub data: Option<SummaryData>,
    #[serde(default, deserialize_with = "deserialize_error")]
    pub error: Option<String>,
}

impl SummaryResponse {
    pub fn output(&self) -> Option<&str> {
        self.data.as_ref().and_then(|data| data.output.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummaryData {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub tokens: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    /// Paragraph prose.
    #[default]
    Summary,
    /// Bulleted list of key points.
    Takeaway,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Summary => "summary",
            SummaryType::Takeaway => "takeaway",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummarizerEngine {
    #[default]
    Cecil,
    Agnes,
    Daphne,
    Muriel,
}

impl SummarizerEngine {
    pub const ALL: [SummarizerEngine; 4] = [
        SummarizerEngine::Cecil,
        SummarizerEngine::Agnes,
        SummarizerEngine::Daphne,
        SummarizerEngine::Muriel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummarizerEngine::Cecil => "cecil",
            SummarizerEngine::Agnes => "agnes",
            SummarizerEngine::Daphne => "daphne",
            SummarizerEngine::Muriel => "muriel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|engine| engine.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    pub url: String,
    pub engine: SummarizerEngine,
    pub summary_type: SummaryType,
    pub target_language: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// Kagi reports errors as `[{"code": .., "msg": ..}]`; older gateways send a string.
fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(error_message))
}

fn error_message(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(message) => Some(message),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(error_entry)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Some(error_entry(&other)),
    }
}

fn error_entry(item: &Value) -> String {
    if let Some(message) = item.as_str() {
        return message.to_string();
    }
    item.get("msg")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| item.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_result_tags_into_variants() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "meta": {"id": "abc"},
                "data": [
                    {"t": 0, "url": "https://example.com", "title": "Example", "snippet": "An example"},
                    {"t": 1, "list": ["example one", "example two"]},
                    {"t": 7}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.error(), None);
        assert_eq!(response.data.len(), 3);
        assert_eq!(
            response.data[1],
            ResultItem::RelatedSearches(vec!["example one".into(), "example two".into()])
        );
        assert_eq!(response.data[2], ResultItem::Unrecognized);

        let organic: Vec<_> = response.organic_results().collect();
        assert_eq!(organic.len(), 1);
        assert_eq!(organic[0].title(), "Example");
        assert_eq!(organic[0].published(), NOT_AVAILABLE);
    }

    #[test]
    fn null_fields_fall_back_to_sentinel() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"data": [{"t": 0, "title": null, "url": "https://a.b"}]}"#)
                .unwrap();
        let result = response.organic_results().next().unwrap();
        assert_eq!(result.title(), NOT_AVAILABLE);
        assert_eq!(result.url(), "https://a.b");
        assert_eq!(result.snippet(), NOT_AVAILABLE);
    }

    #[test]
    fn malformed_items_do_not_fail_the_response() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "data": [
                    {"t": 0, "title": "Good", "url": "https://good.example", "snippet": "Fine", "published": "2024-05-01"},
                    {"t": 0, "title": "Odd", "url": ["not", "a", "string"], "published": 1714521600},
                    {"title": "no tag"},
                    {"t": "zero", "title": "string tag"},
                    {"t": 1, "list": ["kept", 3, null]},
                    "not an object"
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.data.len(), 6);
        assert_eq!(response.data[2], ResultItem::Unrecognized);
        assert_eq!(response.data[3], ResultItem::Unrecognized);
        assert_eq!(response.data[4], ResultItem::RelatedSearches(vec!["kept".into()]));
        assert_eq!(response.data[5], ResultItem::Unrecognized);

        let organic: Vec<_> = response.organic_results().collect();
        assert_eq!(organic.len(), 2);
        assert_eq!(organic[0].published(), "2024-05-01");
        assert_eq!(organic[1].title(), "Odd");
        assert_eq!(organic[1].url(), NOT_AVAILABLE);
        assert_eq!(organic[1].published(), NOT_AVAILABLE);

        let rendered = crate::format::format_search_results(&["q".to_string()], &[response]);
        assert!(rendered.contains("1: Good\nhttps://good.example\nPublished Date: 2024-05-01\nFine"));
        assert!(rendered.contains(&format!(
            "2: Odd\n{NOT_AVAILABLE}\nPublished Date: {NOT_AVAILABLE}\n{NOT_AVAILABLE}"
        )));
    }

    #[test]
    fn normalizes_error_array_and_null_data() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "data": null,
                "error": [
                    {"code": 1, "msg": "Unauthorized", "ref": null},
                    {"code": 2, "msg": "Insufficient credit"}
                ]
            }"#,
        )
        .unwrap();
        assert!(response.data.is_empty());
        assert_eq!(response.error(), Some("Unauthorized; Insufficient credit"));
    }

    #[test]
    fn keeps_plain_string_error_and_ignores_empty_array() {
        let with_string: SearchResponse =
            serde_json::from_str(r#"{"error": "quota exceeded"}"#).unwrap();
        assert_eq!(with_string.error(), Some("quota exceeded"));

        let with_empty: SearchResponse =
            serde_json::from_str(r#"{"data": [], "error": []}"#).unwrap();
        assert_eq!(with_empty.error(), None);
    }

    #[test]
    fn summary_response_exposes_output_and_error() {
        let response: SummaryResponse = serde_json::from_str(
            r#"{"data": {"output": "A short summary.", "tokens": 42}, "error": [{"msg": "late failure"}]}"#,
        )
        .unwrap();
        assert_eq!(response.output(), Some("A short summary."));
        assert_eq!(response.error.as_deref(), Some("late failure"));
    }

    #[test]
    fn engine_parse_accepts_only_known_names() {
        assert_eq!(SummarizerEngine::parse("muriel"), Some(SummarizerEngine::Muriel));
        assert_eq!(SummarizerEngine::parse("Cecil"), None);
        assert_eq!(SummarizerEngine::parse(""), None);
    }
}
