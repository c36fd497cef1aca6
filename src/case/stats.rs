use crate::case::model::{ComplianceStandard, Priority, TestCase, TestStatus};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
pub struct ChartEntry {
    pub name: String,
    pub value: usize,
}

impl ChartEntry {
    fn new(name: &str, value: usize) -> Self {
        ChartEntry {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total: usize,
    pub by_status: Vec<ChartEntry>,
    pub by_priority: Vec<ChartEntry>,
    pub by_compliance: Vec<ChartEntry>,
}

/// Dashboard aggregates over the current library contents.
pub fn summarize(cases: &[TestCase]) -> LibraryStats {
    let by_status = TestStatus::ALL
        .iter()
        .map(|status| {
            let count = cases.iter().filter(|c| &c.status == status).count();
            ChartEntry::new(status.label(), count)
        })
        .collect();
    let by_priority = Priority::ALL
        .iter()
        .map(|priority| {
            let count = cases.iter().filter(|c| &c.priority == priority).count();
            ChartEntry::new(priority.label(), count)
        })
        .collect();
    let by_compliance = ComplianceStandard::ALL
        .iter()
        .map(|standard| {
            let count = cases
                .iter()
                .filter(|c| c.compliance_tags.contains(standard))
                .count();
            ChartEntry::new(standard.label(), count)
        })
        .collect();

    LibraryStats {
        total: cases.len(),
        by_status,
        by_priority,
        by_compliance,
    }
}
