use crate::case::model::{ComplianceStandard, Priority, TestCase, TestStatus, TestStep};

/// Historical records the library starts every session with.
pub fn seed_cases() -> Vec<TestCase> {
    vec![
        TestCase::builder()
            .id("tc-001".to_string())
            .title("User Login Audit Trail Verification")
            .description("Verify that every successful and failed login attempt creates a timestamped audit log entry.")
            .preconditions("Database audit service is running.")
            .priority(Priority::High)
            .compliance_tags(vec![ComplianceStandard::Hipaa, ComplianceStandard::Fda21Cfr11])
            .status(TestStatus::Approved)
            .traceability_id("REQ-AUTH-005".to_string())
            .steps(vec![
                TestStep::new(1, "Navigate to login page", "Login form displayed"),
                TestStep::new(2, "Enter valid credentials", "User logged in"),
                TestStep::new(
                    3,
                    "Check Audit Log table",
                    "New entry \"LOGIN_SUCCESS\" present with current timestamp",
                ),
            ])
            .build(),
        TestCase::builder()
            .id("tc-002".to_string())
            .title("Patient Data Encryption at Rest")
            .description("Ensure patient demographic data is encrypted in the database.")
            .preconditions("Access to DB direct query.")
            .priority(Priority::High)
            .compliance_tags(vec![ComplianceStandard::Hipaa])
            .status(TestStatus::Reviewed)
            .traceability_id("REQ-SEC-012".to_string())
            .steps(vec![
                TestStep::new(1, "Create new patient", "Patient saved successfully"),
                TestStep::new(
                    2,
                    "Query database directly for patient name",
                    "Name field appears as ciphertext",
                ),
            ])
            .build(),
    ]
}
