use crate::core::{CountOutcome, ListParams, RecordSource};
use crate::utils::error::{AirtableError, Result};
use std::num::NonZeroUsize;

/// Builds `{field} = 'value'`, escaping characters that would end the string literal.
pub fn field_equals(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{{}}} = '{}'", field, escaped)
}

/// Counts records matching `formula`, following `offset` pagination.
///
/// `max_pages` caps the number of requests; `NonZeroUsize::MIN` counts only the first page.
pub async fn count_matching<S: RecordSource + ?Sized>(
    source: &S,
    table: &str,
    formula: &str,
    max_pages: Option<NonZeroUsize>,
) -> Result<CountOutcome> {
    let mut params = ListParams::with_formula(formula);
    let mut outcome = CountOutcome {
        records: 0,
        pages: 0,
        truncated: false,
    };

    loop {
        let page = source.list_page(table, &params).await?;
        outcome.pages += 1;
        outcome.records += page.records.len();

        match page.offset {
            Some(offset) if max_pages.is_some_and(|max| outcome.pages >= max.get()) => {
                tracing::debug!("Stopping after {} pages, offset {} left", outcome.pages, offset);
                outcome.truncated = true;
                break;
            }
            Some(offset) => params.offset = Some(offset),
            None => break,
        }
    }

    tracing::info!(
        "Table {} matched {} records over {} pages",
        table,
        outcome.records,
        outcome.pages
    );
    Ok(outcome)
}

/// Field names of the first record, or `None` when the table has no records.
///
/// Airtable omits empty fields from records, so this is a sample, not the schema.
pub async fn inspect_fields<S: RecordSource + ?Sized>(
    source: &S,
    table: &str,
) -> Result<Option<Vec<String>>> {
    let page = source.list_page(table, &ListParams::first_record()).await?;
    Ok(page.records.first().map(|record| record.field_names()))
}

/// Reads `field` from the first record of `table`.
pub async fn fetch_api_key<S: RecordSource + ?Sized>(
    source: &S,
    table: &str,
    field: &str,
) -> Result<Option<String>> {
    let page = source.list_page(table, &ListParams::first_record()).await?;
    let Some(record) = page.records.first() else {
        return Ok(None);
    };

    match record.fields.get(field) {
        Some(serde_json::Value::String(key)) => Ok(Some(key.clone())),
        Some(serde_json::Value::Null) | None => Err(AirtableError::FieldNotFound {
            table: table.to_string(),
            field: field.to_string(),
        }),
        Some(other) => Ok(Some(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, RecordPage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves canned pages in order and records the params it was called with.
    struct ScriptedSource {
        pages: Mutex<Vec<RecordPage>>,
        calls: Mutex<Vec<ListParams>>,
    }

    impl ScriptedSource {
        fn new(mut pages: Vec<RecordPage>) -> Self {
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<ListParams> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordSource for ScriptedSource {
        async fn list_page(&self, _table: &str, params: &ListParams) -> Result<RecordPage> {
            self.calls.lock().unwrap().push(params.clone());
            Ok(self.pages.lock().unwrap().pop().unwrap_or_default())
        }
    }

    fn record(id: &str, fields: serde_json::Value) -> Record {
        Record {
            id: id.to_string(),
            created_time: None,
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    fn page(count: usize, offset: Option<&str>) -> RecordPage {
        RecordPage {
            records: (0..count)
                .map(|i| record(&format!("rec{}", i), serde_json::json!({})))
                .collect(),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_field_equals_escapes_quotes() {
        assert_eq!(
            field_equals("email", "test@example.com"),
            "{email} = 'test@example.com'"
        );
        assert_eq!(field_equals("Name", "O'Brien"), r"{Name} = 'O\'Brien'");
        assert_eq!(field_equals("Path", r"a\b"), r"{Path} = 'a\\b'");
    }

    #[tokio::test]
    async fn test_count_follows_offsets() {
        let source = ScriptedSource::new(vec![
            page(100, Some("itr1")),
            page(100, Some("itr2")),
            page(7, None),
        ]);

        let outcome = count_matching(&source, "tblUsers", "{Name} = 'Free'", None)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CountOutcome {
                records: 207,
                pages: 3,
                truncated: false
            }
        );
        let calls = source.calls();
        assert_eq!(calls[0].offset, None);
        assert_eq!(calls[1].offset.as_deref(), Some("itr1"));
        assert_eq!(calls[2].offset.as_deref(), Some("itr2"));
        assert!(calls
            .iter()
            .all(|c| c.filter_by_formula.as_deref() == Some("{Name} = 'Free'")));
    }

    #[tokio::test]
    async fn test_count_first_page_only_marks_truncation() {
        let source = ScriptedSource::new(vec![page(100, Some("itr1")), page(5, None)]);

        let outcome = count_matching(&source, "tblUsers", "TRUE()", Some(NonZeroUsize::MIN))
            .await
            .unwrap();

        assert_eq!(outcome.records, 100);
        assert_eq!(outcome.pages, 1);
        assert!(outcome.truncated);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_inspect_fields_on_empty_table() {
        let source = ScriptedSource::new(vec![page(0, None)]);

        let fields = inspect_fields(&source, "tblAccounts").await.unwrap();

        assert!(fields.is_none());
        assert_eq!(source.calls()[0].max_records, Some(1));
    }

    #[tokio::test]
    async fn test_fetch_api_key_variants() {
        let source = ScriptedSource::new(vec![
            RecordPage {
                records: vec![record("rec1", serde_json::json!({"API Key": "key123"}))],
                offset: None,
            },
            RecordPage {
                records: vec![record("rec2", serde_json::json!({"Owner": "x"}))],
                offset: None,
            },
            page(0, None),
        ]);

        assert_eq!(
            fetch_api_key(&source, "tblKeys", "API Key").await.unwrap(),
            Some("key123".to_string())
        );
        assert!(matches!(
            fetch_api_key(&source, "tblKeys", "API Key").await,
            Err(AirtableError::FieldNotFound { .. })
        ));
        assert_eq!(fetch_api_key(&source, "tblKeys", "API Key").await.unwrap(), None);
    }
}
