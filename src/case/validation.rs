use crate::case::model::TestCase;

/// Checks the structural invariants every record in the library must hold.
pub fn validate_test_case(case: &TestCase) -> Result<(), String> {
    require_text("id", &case.id)?;
    require_text("title", &case.title)?;
    require_text("description", &case.description)?;
    require_text("preconditions", &case.preconditions)?;
    if case.steps.is_empty() {
        return Err("steps must contain at least one step".to_string());
    }
    for (index, step) in case.steps.iter().enumerate() {
        let expected = index as u32 + 1;
        if step.step_number != expected {
            return Err(format!(
                "steps[{}].stepNumber must be {}, got {}",
                index, expected, step.step_number
            ));
        }
        require_text(&format!("steps[{}].action", index), &step.action)?;
        require_text(&format!("steps[{}].expectedResult", index), &step.expected_result)?;
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::model::{Priority, TestStep};

    fn case_with_steps(steps: Vec<TestStep>) -> TestCase {
        TestCase::builder()
            .title("Audit trail")
            .description("Logins are audited")
            .preconditions("Audit service running")
            .priority(Priority::High)
            .steps(steps)
            .build()
    }

    #[test]
    fn accepts_well_formed_case() {
        let case = case_with_steps(vec![
            TestStep::new(1, "Log in", "Logged in"),
            TestStep::new(2, "Open audit log", "Entry present"),
        ]);
        assert_eq!(validate_test_case(&case), Ok(()));
    }

    #[test]
    fn rejects_case_without_steps() {
        let case = case_with_steps(vec![]);
        assert_eq!(
            validate_test_case(&case),
            Err("steps must contain at least one step".to_string())
        );
    }

    #[test]
    fn rejects_gap_in_step_numbers() {
        let case = case_with_steps(vec![
            TestStep::new(1, "Log in", "Logged in"),
            TestStep::new(3, "Open audit log", "Entry present"),
        ]);
        assert_eq!(
            validate_test_case(&case),
            Err("steps[1].stepNumber must be 2, got 3".to_string())
        );
    }

    #[test]
    fn rejects_blank_text_fields() {
        let mut case = case_with_steps(vec![TestStep::new(1, "Log in", "Logged in")]);
        case.preconditions = "   ".to_string();
        assert_eq!(
            validate_test_case(&case),
            Err("preconditions must not be empty".to_string())
        );

        let case = case_with_steps(vec![TestStep::new(1, "Log in", "")]);
        assert_eq!(
            validate_test_case(&case),
            Err("steps[0].expectedResult must not be empty".to_string())
        );
    }
}
