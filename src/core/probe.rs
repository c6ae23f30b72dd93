use crate::core::records::count_matching;
use crate::core::{ProbeDefinition, ProbeFailure, ProbeOutcome, ProbeReport, RecordSource};
use crate::utils::error::AirtableError;
use std::num::NonZeroUsize;

impl From<AirtableError> for ProbeFailure {
    fn from(err: AirtableError) -> Self {
        match err {
            AirtableError::ApiError { status, body } => ProbeFailure {
                status: Some(status),
                message: body,
            },
            other => ProbeFailure {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

/// Runs every probe in order. A failing probe is recorded and the suite moves on.
///
/// `resolve` maps a probe's table reference (alias or id) to the id sent to Airtable.
pub async fn run_suite<S, F>(source: &S, probes: &[ProbeDefinition], resolve: F) -> ProbeReport
where
    S: RecordSource + ?Sized,
    F: Fn(&str) -> String,
{
    let mut report = ProbeReport::default();

    for probe in probes {
        let table_id = resolve(&probe.table);
        tracing::info!(
            "Querying table {} with formula: {}",
            table_id,
            probe.formula
        );

        // Only the first page is counted, matching a single filterByFormula request.
        let first_page = Some(NonZeroUsize::MIN);
        let result = match count_matching(source, &table_id, &probe.formula, first_page).await {
            Ok(outcome) => {
                tracing::info!("✅ {}: {} records", probe.label, outcome.records);
                Ok(outcome.records)
            }
            Err(e) => {
                tracing::warn!("❌ {}: {}", probe.label, e.user_friendly_message());
                Err(ProbeFailure::from(e))
            }
        };

        report.outcomes.push(ProbeOutcome {
            probe: probe.clone(),
            table_id,
            result,
        });
    }

    report
}
