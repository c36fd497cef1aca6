use crate::case::model::ComplianceStandard;

pub fn build_prompt(requirement: &str, standards: &[ComplianceStandard]) -> String {
    let standards_line = if standards.is_empty() {
        "No compliance standards were selected; tag each test case with the standards from the allowed list that genuinely apply.".to_string()
    } else {
        let labels: Vec<&str> = standards.iter().map(|s| s.label()).collect();
        format!(
            "Pay strict attention to the selected compliance standards: {}.",
            labels.join(", ")
        )
    };

    format!(
        r#"You are a Senior Healthcare QA Engineer specializing in FDA and HIPAA compliance.

Analyze the following software requirement and generate comprehensive test cases.
Cover positive flows, negative flows and edge cases.
{standards_line}

Requirement: "{requirement}"

Generate 3-5 high-quality test cases. Number the steps of each test case from 1."#,
        standards_line = standards_line,
        requirement = requirement.trim(),
    )
}
