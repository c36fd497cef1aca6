use crate::case::model::{generated_case_id, TestCase};
use crate::generation::gemini::{ContentGenerator, ContentRequest};
use crate::generation::model::{GenerationError, GenerationRequest};
use crate::generation::prompt::build_prompt;
use crate::generation::schema::{parse_candidates, response_schema};
use crate::generation::traceability::TraceabilityIssuer;
use bon::Builder;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Debug, Builder)]
pub struct GeneratorSettings {
    pub api_key: Option<String>,
    #[builder(into)]
    pub model: String,
    #[builder(default = Duration::from_secs(90))]
    pub timeout: Duration,
    #[builder(default = 1024)]
    pub thinking_budget: u32,
    #[builder(into, default = "REQ-GEN".to_string())]
    pub traceability_prefix: String,
}

/// Turns requirement text into validated draft test cases through one call
/// to the generation service.
pub struct Generator {
    service: Arc<dyn ContentGenerator>,
    settings: GeneratorSettings,
    traceability: TraceabilityIssuer,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Generator {
    pub fn new(service: Arc<dyn ContentGenerator>, settings: GeneratorSettings) -> Self {
        let traceability = TraceabilityIssuer::new(settings.traceability_prefix.clone());
        Self {
            service,
            settings,
            traceability,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<Vec<TestCase>, GenerationError> {
        let requirement = request.requirement_text.trim();
        if requirement.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "requirement text must not be empty".to_string(),
            ));
        }
        let api_key = match self.settings.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                return Err(GenerationError::Configuration(
                    "access credential for the generation service is missing, set API_KEY"
                        .to_string(),
                ))
            }
        };
        let _guard = self.acquire()?;

        let standards = request.distinct_standards();
        let content_request = ContentRequest {
            model: self.settings.model.clone(),
            api_key,
            prompt: build_prompt(requirement, &standards),
            response_schema: response_schema(),
            thinking_budget: self.settings.thinking_budget,
        };
        info!(
            "generating test cases, standards: {:?}, requirement length: {}",
            standards,
            requirement.len()
        );

        let result = self.call_service(&content_request, cancel).await.and_then(|raw| {
            let raw = raw.filter(|text| !text.trim().is_empty()).ok_or(GenerationError::EmptyResponse)?;
            parse_candidates(&raw)
        });

        match result {
            Ok(generated) => {
                let created_at = Utc::now();
                let cases: Vec<TestCase> = generated
                    .into_iter()
                    .map(|case| {
                        let traceability_id = self.traceability.issue(request.traceability_id.as_deref());
                        case.into_test_case(generated_case_id(), created_at, traceability_id)
                    })
                    .collect();
                info!("generated {} candidate test cases", cases.len());
                Ok(cases)
            }
            Err(error) => {
                warn!("test case generation failed ({}): {}", error.kind(), error);
                Err(error)
            }
        }
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>, GenerationError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.in_flight))
            .map_err(|_| GenerationError::Busy)
    }

    async fn call_service(
        &self,
        request: &ContentRequest,
        cancel: CancellationToken,
    ) -> Result<Option<String>, GenerationError> {
        let timeout = self.settings.timeout;
        tokio::select! {
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            outcome = tokio::time::timeout(timeout, self.service.generate_content(request)) => {
                outcome.unwrap_or_else(|_| {
                    Err(GenerationError::timeout(format!("timed out after {:?}", timeout)))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::model::{ComplianceStandard, TestStatus};
    use crate::case::service::TestLibrary;
    use crate::case::validation::validate_test_case;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct FakeService {
        calls: AtomicUsize,
        reply: Result<Option<String>, GenerationError>,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn replying(reply: Result<Option<String>, GenerationError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply,
                delay: Duration::ZERO,
                prompts: Mutex::new(vec![]),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Ok(Some(payload(1))),
                delay,
                prompts: Mutex::new(vec![]),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentGenerator for FakeService {
        async fn generate_content(&self, request: &ContentRequest) -> Result<Option<String>, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone()
        }
    }

    fn payload(count: usize) -> String {
        let cases: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "title": format!("Case {}", i + 1),
                    "description": "Checks automatic logout",
                    "preconditions": "User logged in",
                    "priority": "High",
                    "complianceTags": ["HIPAA"],
                    "steps": [
                        { "stepNumber": 2, "action": "Idle for 15 minutes", "expectedResult": "Session expires" },
                        { "stepNumber": 7, "action": "Reload page", "expectedResult": "Login form shown" }
                    ]
                })
            })
            .collect();
        json!({ "testCases": cases }).to_string()
    }

    fn settings() -> GeneratorSettings {
        GeneratorSettings::builder()
            .api_key("secret".to_string())
            .model("gemini-test")
            .timeout(Duration::from_secs(5))
            .build()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "The system must log users out after 15 minutes of inactivity.",
            vec![ComplianceStandard::Hipaa],
        )
    }

    #[tokio::test]
    async fn produces_draft_candidates_in_service_order() {
        let service = FakeService::replying(Ok(Some(payload(3))));
        let generator = Generator::new(service.clone(), settings());

        let cases = generator.generate(&request(), CancellationToken::new()).await.unwrap();

        assert_eq!(service.calls(), 1);
        let titles: Vec<_> = cases.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Case 1", "Case 2", "Case 3"]);
        for case in &cases {
            assert_eq!(validate_test_case(case), Ok(()));
            assert_eq!(case.status, TestStatus::Draft);
            assert!(case.id.starts_with("tc-gen-"));
            assert_eq!(case.steps[1].step_number, 2);
        }
        let ids: HashSet<_> = cases.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        let trace_ids: Vec<_> = cases.iter().map(|c| c.traceability_id.clone().unwrap()).collect();
        assert_eq!(trace_ids, vec!["REQ-GEN-0001", "REQ-GEN-0002", "REQ-GEN-0003"]);
        assert!(service.prompts.lock().unwrap()[0].contains("HIPAA"));
    }

    #[tokio::test]
    async fn empty_standards_selection_still_yields_valid_drafts() {
        let service = FakeService::replying(Ok(Some(payload(2))));
        let generator = Generator::new(service.clone(), settings());
        let request = GenerationRequest::new("Audit trail entries must be immutable.", vec![]);

        let cases = generator.generate(&request, CancellationToken::new()).await.unwrap();

        assert_eq!(service.calls(), 1);
        assert_eq!(cases.len(), 2);
        for case in &cases {
            assert_eq!(validate_test_case(case), Ok(()));
            assert_eq!(case.status, TestStatus::Draft);
            assert!(case.traceability_id.is_some());
        }
        let prompt = service.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("No compliance standards were selected"));
        assert!(!prompt.contains("Pay strict attention to the selected compliance standards"));
    }

    #[tokio::test]
    async fn ids_stay_unique_across_invocations() {
        let service = FakeService::replying(Ok(Some(payload(2))));
        let generator = Generator::new(service, settings());

        let first = generator.generate(&request(), CancellationToken::new()).await.unwrap();
        let second = generator.generate(&request(), CancellationToken::new()).await.unwrap();

        let ids: HashSet<_> = first.iter().chain(second.iter()).map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(second[1].traceability_id.as_deref(), Some("REQ-GEN-0004"));
    }

    #[tokio::test]
    async fn supplied_traceability_id_is_used() {
        let service = FakeService::replying(Ok(Some(payload(2))));
        let generator = Generator::new(service, settings());
        let mut request = request();
        request.traceability_id = Some("REQ-AUTH-077".to_string());

        let cases = generator.generate(&request, CancellationToken::new()).await.unwrap();

        assert!(cases.iter().all(|c| c.traceability_id.as_deref() == Some("REQ-AUTH-077")));
    }

    #[tokio::test]
    async fn blank_requirement_fails_before_any_call() {
        let service = FakeService::replying(Ok(Some(payload(1))));
        let generator = Generator::new(service.clone(), settings());
        let library = TestLibrary::seeded();

        for text in ["", "   \n\t"] {
            let request = GenerationRequest::new(text, vec![ComplianceStandard::Hipaa]);
            let result = generator.generate(&request, CancellationToken::new()).await;
            assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));
        }

        assert_eq!(service.calls(), 0);
        assert_eq!(library.len().await, 2);
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_call() {
        let service = FakeService::replying(Ok(Some(payload(1))));
        for api_key in [None, Some("  ".to_string())] {
            let generator = Generator::new(
                service.clone(),
                GeneratorSettings::builder()
                    .maybe_api_key(api_key)
                    .model("gemini-test")
                    .build(),
            );

            let result = generator.generate(&request(), CancellationToken::new()).await;

            assert!(matches!(result, Err(GenerationError::Configuration(_))));
        }
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn empty_service_output_is_classified() {
        for reply in [Ok(None), Ok(Some("   ".to_string()))] {
            let generator = Generator::new(FakeService::replying(reply), settings());
            let result = generator.generate(&request(), CancellationToken::new()).await;
            assert_eq!(result, Err(GenerationError::EmptyResponse));
        }
    }

    #[tokio::test]
    async fn non_json_output_is_a_schema_violation() {
        let service = FakeService::replying(Ok(Some("Sure! Here are some test cases.".to_string())));
        let generator = Generator::new(service, settings());

        let result = generator.generate(&request(), CancellationToken::new()).await;

        assert!(matches!(result, Err(GenerationError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn one_invalid_candidate_yields_no_candidates() {
        let mut value: serde_json::Value = serde_json::from_str(&payload(3)).unwrap();
        value["testCases"][2]["steps"] = json!([]);
        let service = FakeService::replying(Ok(Some(value.to_string())));
        let generator = Generator::new(service, settings());

        let result = generator.generate(&request(), CancellationToken::new()).await;

        assert_eq!(
            result,
            Err(GenerationError::SchemaViolation(
                "testCases[2].steps must contain at least one step".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn transport_failures_pass_through() {
        let failure = GenerationError::Transport {
            status: Some(429),
            message: "rate limited".to_string(),
            timed_out: false,
        };
        let generator = Generator::new(FakeService::replying(Err(failure.clone())), settings());

        let result = generator.generate(&request(), CancellationToken::new()).await;

        assert_eq!(result, Err(failure));
        assert!(!generator.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_by_timeout() {
        let generator = Generator::new(
            FakeService::slow(Duration::from_secs(600)),
            GeneratorSettings::builder()
                .api_key("secret".to_string())
                .model("gemini-test")
                .timeout(Duration::from_secs(30))
                .build(),
        );

        let error = generator
            .generate(&request(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(error.is_timeout());
        assert!(!generator.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_while_in_flight_is_rejected() {
        let service = FakeService::slow(Duration::from_secs(1));
        let generator = Arc::new(Generator::new(service.clone(), settings()));

        let first = {
            let generator = generator.clone();
            tokio::spawn(async move { generator.generate(&request(), CancellationToken::new()).await })
        };
        tokio::task::yield_now().await;
        while !generator.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = generator.generate(&request(), CancellationToken::new()).await;

        assert_eq!(second, Err(GenerationError::Busy));
        assert_eq!(first.await.unwrap().unwrap().len(), 1);
        assert_eq!(service.calls(), 1);
        assert!(!generator.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_the_call() {
        let generator = Generator::new(FakeService::slow(Duration::from_secs(60)), settings());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = generator.generate(&request(), cancel).await;

        assert_eq!(result, Err(GenerationError::Cancelled));
        assert!(!generator.is_busy());
    }
}
