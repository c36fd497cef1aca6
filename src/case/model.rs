use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[builder(default = generated_case_id())]
    pub id: String,
    #[builder(into)]
    pub title: String,
    #[builder(into)]
    pub description: String,
    #[builder(into)]
    pub preconditions: String,
    pub priority: Priority,
    #[builder(default)]
    #[serde(default)]
    pub compliance_tags: Vec<ComplianceStandard>,
    pub steps: Vec<TestStep>,
    #[builder(default = TestStatus::Draft)]
    pub status: TestStatus,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub traceability_id: Option<String>,
}

/// Identifier handed out to freshly generated candidates.
pub fn generated_case_id() -> String {
    format!("tc-gen-{}", uuid::Uuid::new_v4().simple())
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    pub step_number: u32,
    pub action: String,
    pub expected_result: String,
}

impl TestStep {
    pub fn new(step_number: u32, action: impl Into<String>, expected_result: impl Into<String>) -> Self {
        TestStep {
            step_number,
            action: action.into(),
            expected_result: expected_result.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TestStatus {
    Draft,
    Reviewed,
    Approved,
}

impl TestStatus {
    pub const ALL: [TestStatus; 3] = [TestStatus::Draft, TestStatus::Reviewed, TestStatus::Approved];

    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Draft => "Draft",
            TestStatus::Reviewed => "Reviewed",
            TestStatus::Approved => "Approved",
        }
    }
}

/// Regulatory vocabulary a test case can be tagged with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ComplianceStandard {
    #[serde(rename = "HIPAA")]
    Hipaa,
    #[serde(rename = "FDA 21 CFR Part 11")]
    Fda21Cfr11,
    #[serde(rename = "GDPR")]
    Gdpr,
    #[serde(rename = "ISO 13485")]
    Iso13485,
    #[serde(rename = "HL7 FHIR")]
    Hl7Fhir,
}

impl ComplianceStandard {
    pub const ALL: [ComplianceStandard; 5] = [
        ComplianceStandard::Hipaa,
        ComplianceStandard::Fda21Cfr11,
        ComplianceStandard::Gdpr,
        ComplianceStandard::Iso13485,
        ComplianceStandard::Hl7Fhir,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStandard::Hipaa => "HIPAA",
            ComplianceStandard::Fda21Cfr11 => "FDA 21 CFR Part 11",
            ComplianceStandard::Gdpr => "GDPR",
            ComplianceStandard::Iso13485 => "ISO 13485",
            ComplianceStandard::Hl7Fhir => "HL7 FHIR",
        }
    }
}

impl fmt::Display for ComplianceStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for ComplianceStandard {
    type Err = String;

    // ignores case and punctuation, and accepts a few short aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "hipaa" => Ok(ComplianceStandard::Hipaa),
            "fda21cfrpart11" | "fda21cfr11" | "21cfrpart11" => Ok(ComplianceStandard::Fda21Cfr11),
            "gdpr" => Ok(ComplianceStandard::Gdpr),
            "iso13485" => Ok(ComplianceStandard::Iso13485),
            "hl7fhir" | "hl7" | "fhir" => Ok(ComplianceStandard::Hl7Fhir),
            _ => Err(format!("Unknown compliance standard: {}", s)),
        }
    }
}
