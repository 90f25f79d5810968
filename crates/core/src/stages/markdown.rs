use async_trait::async_trait;

use super::error::StageError;
use super::traits::Summarizer;
use super::types::Record;

/// Renders scraped notices as a Markdown digest.
#[derive(Debug, Clone, Default)]
pub struct MarkdownSummarizer;

impl MarkdownSummarizer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(records: &[Record]) -> String {
        let mut lines = vec![
            "# Monthly OA digest".to_string(),
            String::new(),
            "## Key notices".to_string(),
        ];
        for record in records {
            lines.push(format!(
                "- **{}** ({} / {}): {}",
                record.title, record.department, record.date, record.content
            ));
        }
        lines.push(String::new());
        lines.push("## Other".to_string());
        lines.push("- Nothing else to report".to_string());
        lines.join("\n")
    }
}

#[async_trait]
impl Summarizer for MarkdownSummarizer {
    fn name(&self) -> &str {
        "markdown"
    }

    async fn summarize(&self, records: &[Record]) -> Result<String, StageError> {
        if records.is_empty() {
            return Err(StageError::NoRecords);
        }
        Ok(Self::render(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_summary_lists_every_record() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let records = vec![
            Record::new("Exam schedule", "Registrar", date, "Submit by Friday."),
            Record::new("Library hours", "Library", date, "Open until 22:00."),
        ];

        let text = MarkdownSummarizer::new().summarize(&records).await.unwrap();

        assert!(text.starts_with("# Monthly OA digest"));
        assert!(text.contains("- **Exam schedule** (Registrar / 2024-06-01): Submit by Friday."));
        assert!(text.contains("**Library hours**"));
        assert!(text.ends_with("- Nothing else to report"));
    }

    #[tokio::test]
    async fn test_summary_of_nothing_fails() {
        let err = MarkdownSummarizer::new().summarize(&[]).await.unwrap_err();
        assert!(matches!(err, StageError::NoRecords));
    }
}
