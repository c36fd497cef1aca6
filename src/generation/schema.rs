use crate::case::model::{ComplianceStandard, Priority, TestCase, TestStatus, TestStep};
use crate::generation::model::GenerationError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

const TEST_CASES_FIELD: &str = "testCases";

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern compiles")
});

/// Response shape the generation service is asked to honor.
pub fn response_schema() -> Value {
    let standards: Vec<&str> = ComplianceStandard::ALL.iter().map(|s| s.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            TEST_CASES_FIELD: {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "A concise title for the test case" },
                        "description": { "type": "STRING", "description": "Purpose of the test" },
                        "preconditions": { "type": "STRING", "description": "State required before the test starts" },
                        "priority": { "type": "STRING", "enum": ["High", "Medium", "Low"] },
                        "complianceTags": {
                            "type": "ARRAY",
                            "items": { "type": "STRING", "enum": standards },
                            "description": "Relevant compliance standards"
                        },
                        "steps": {
                            "type": "ARRAY",
                            "minItems": 1,
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "stepNumber": { "type": "INTEGER" },
                                    "action": { "type": "STRING" },
                                    "expectedResult": { "type": "STRING" }
                                },
                                "required": ["stepNumber", "action", "expectedResult"]
                            }
                        }
                    },
                    "required": ["title", "description", "priority", "steps", "preconditions"]
                }
            }
        },
        "required": [TEST_CASES_FIELD]
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCase {
    title: String,
    description: String,
    preconditions: String,
    priority: Priority,
    #[serde(default)]
    compliance_tags: Vec<String>,
    steps: Vec<RawStep>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    step_number: i64,
    action: String,
    expected_result: String,
}

/// A schema-checked candidate that has not been given an identity yet.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedCase {
    pub title: String,
    pub description: String,
    pub preconditions: String,
    pub priority: Priority,
    pub compliance_tags: Vec<ComplianceStandard>,
    pub steps: Vec<TestStep>,
}

impl GeneratedCase {
    pub fn into_test_case(
        self,
        id: String,
        created_at: DateTime<Utc>,
        traceability_id: String,
    ) -> TestCase {
        TestCase::builder()
            .id(id)
            .title(self.title)
            .description(self.description)
            .preconditions(self.preconditions)
            .priority(self.priority)
            .compliance_tags(self.compliance_tags)
            .steps(self.steps)
            .status(TestStatus::Draft)
            .created_at(created_at)
            .traceability_id(traceability_id)
            .build()
    }
}

/// Parses raw service output into candidates. Any non-conforming record
/// fails the whole payload.
pub fn parse_candidates(raw: &str) -> Result<Vec<GeneratedCase>, GenerationError> {
    let payload = strip_code_fence(raw);
    if payload.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| violation(format!("payload is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove(TEST_CASES_FIELD) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(violation(format!(
                    "{} must be an array, got {}",
                    TEST_CASES_FIELD,
                    type_name(&other)
                )))
            }
            None => return Err(violation(format!("missing field `{}`", TEST_CASES_FIELD))),
        },
        other => {
            return Err(violation(format!(
                "expected an object or an array, got {}",
                type_name(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_case(index, item))
        .collect()
}

fn parse_case(index: usize, value: Value) -> Result<GeneratedCase, GenerationError> {
    let path = format!("{}[{}]", TEST_CASES_FIELD, index);
    let raw: RawCase =
        serde_json::from_value(value).map_err(|e| violation(format!("{}: {}", path, e)))?;

    let title = require_text(&path, "title", raw.title)?;
    let description = require_text(&path, "description", raw.description)?;
    let preconditions = require_text(&path, "preconditions", raw.preconditions)?;

    if raw.steps.is_empty() {
        return Err(violation(format!("{}.steps must contain at least one step", path)));
    }
    let mut steps = Vec::with_capacity(raw.steps.len());
    for (step_index, step) in raw.steps.into_iter().enumerate() {
        let step_path = format!("{}.steps[{}]", path, step_index);
        if step.step_number <= 0 {
            return Err(violation(format!(
                "{}.stepNumber must be positive, got {}",
                step_path, step.step_number
            )));
        }
        let action = require_text(&step_path, "action", step.action)?;
        let expected_result = require_text(&step_path, "expectedResult", step.expected_result)?;
        // numbering follows position; the service's own numbers are not trusted
        steps.push(TestStep::new(step_index as u32 + 1, action, expected_result));
    }

    let mut compliance_tags = Vec::new();
    for (tag_index, tag) in raw.compliance_tags.iter().enumerate() {
        let standard = tag.parse::<ComplianceStandard>().map_err(|e| {
            violation(format!("{}.complianceTags[{}]: {}", path, tag_index, e))
        })?;
        if !compliance_tags.contains(&standard) {
            compliance_tags.push(standard);
        }
    }

    Ok(GeneratedCase {
        title,
        description,
        preconditions,
        priority: raw.priority,
        compliance_tags,
        steps,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

fn require_text(path: &str, field: &str, value: String) -> Result<String, GenerationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(violation(format!("{}.{} must not be empty", path, field)))
    } else {
        Ok(trimmed.to_string())
    }
}

fn violation(message: impl Into<String>) -> GenerationError {
    GenerationError::SchemaViolation(message.into())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
