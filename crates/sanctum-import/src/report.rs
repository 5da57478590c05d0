use sanctum_core::ContactId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Success,
    Error,
}

/// What happened to one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// 1-based position of the row in the original input.
    pub row_index: usize,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<ContactId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImportOutcome {
    #[must_use]
    pub fn success(row_index: usize, contact_id: ContactId) -> Self {
        Self {
            row_index,
            status: RowStatus::Success,
            contact_id: Some(contact_id),
            message: None,
        }
    }

    #[must_use]
    pub fn error(row_index: usize, message: impl Into<String>) -> Self {
        Self {
            row_index,
            status: RowStatus::Error,
            contact_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Aggregate result of one import batch. Serializes with the camelCase keys
/// the import API returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
}

/// Folds per-row outcomes into a summary, keeping errors in input order.
#[must_use]
pub fn summarize(outcomes: &[ImportOutcome]) -> ImportSummary {
    let mut summary = ImportSummary {
        total_processed: outcomes.len(),
        ..ImportSummary::default()
    };

    for outcome in outcomes {
        match outcome.status {
            RowStatus::Success => summary.success_count += 1,
            RowStatus::Error => {
                summary.error_count += 1;
                summary.errors.push(RowError {
                    row: outcome.row_index,
                    message: outcome.message.clone().unwrap_or_default(),
                });
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_summarizes_to_zero() {
        assert_eq!(summarize(&[]), ImportSummary::default());
    }

    #[test]
    fn counts_and_orders_errors() {
        let outcomes = vec![
            ImportOutcome::error(1, "first"),
            ImportOutcome::success(2, ContactId(10)),
            ImportOutcome::error(3, "third"),
        ];
        let summary = summarize(&outcomes);
        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 2);
        assert_eq!(
            summary.errors,
            vec![
                RowError {
                    row: 1,
                    message: "first".into()
                },
                RowError {
                    row: 3,
                    message: "third".into()
                },
            ]
        );
    }

    #[test]
    fn summary_serializes_with_api_keys() {
        let summary = summarize(&[ImportOutcome::error(2, "bad")]);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["totalProcessed"], 1);
        assert_eq!(json["successCount"], 0);
        assert_eq!(json["errorCount"], 1);
        assert_eq!(json["errors"][0]["row"], 2);
        assert_eq!(json["errors"][0]["message"], "bad");
    }
}
