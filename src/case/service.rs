use crate::case::model::TestCase;
use crate::case::seed::seed_cases;
use crate::case::stats::{summarize, LibraryStats};
use crate::case::validation::validate_test_case;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum LibraryError {
    #[error("test case {id} is invalid: {reason}")]
    InvalidCase { id: String, reason: String },
    #[error("test case id {0} is already in use")]
    DuplicateId(String),
}

/// Session-scoped collection of accepted test cases, newest batch first.
pub struct TestLibrary {
    cases: RwLock<Vec<TestCase>>,
}

impl TestLibrary {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self {
            cases: RwLock::new(cases),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_cases())
    }

    /// Prepends `candidates` in their given order. A batch that breaks any
    /// record invariant or id uniqueness is rejected as a whole.
    pub async fn accept(&self, candidates: Vec<TestCase>) -> Result<usize, LibraryError> {
        for candidate in &candidates {
            validate_test_case(candidate).map_err(|reason| LibraryError::InvalidCase {
                id: candidate.id.clone(),
                reason,
            })?;
        }

        let mut cases = self.cases.write().await;
        let mut seen: HashSet<&str> = cases.iter().map(|c| c.id.as_str()).collect();
        for candidate in &candidates {
            if !seen.insert(candidate.id.as_str()) {
                return Err(LibraryError::DuplicateId(candidate.id.clone()));
            }
        }

        let accepted = candidates.len();
        cases.splice(0..0, candidates);
        info!("accepted {} test cases, library size: {}", accepted, cases.len());
        Ok(accepted)
    }

    pub async fn all(&self) -> Vec<TestCase> {
        self.cases.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<TestCase> {
        self.cases.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn stats(&self) -> LibraryStats {
        summarize(&self.cases.read().await)
    }
}
