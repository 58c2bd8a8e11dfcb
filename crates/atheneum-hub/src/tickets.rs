//! Issue-tracker client for user feedback.
//!
//! Files feedback as issues in a Jira Cloud project over its REST API,
//! authenticated with email + API token. The hub keeps serving when the
//! tracker is unconfigured; only the feedback endpoint reports itself
//! unavailable.

use crate::config::TicketsConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Timeout for a single tracker request.
const TICKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Labels attached to every filed issue.
const ISSUE_LABELS: [&str; 2] = ["beta-feedback", "from-app"];

/// Errors raised while filing an issue.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    /// The tracker credentials are not configured.
    #[error("ticket service is not configured")]
    NotConfigured,
    /// The tracker could not be reached.
    #[error("ticket request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The tracker answered but refused the issue.
    #[error("ticket service rejected the issue: {0}")]
    Rejected(String),
}

/// App environment reported alongside feedback.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedbackContext {
    /// Reporting app version.
    #[serde(default)]
    pub app_version: Option<String>,
    /// Reporting operating system.
    #[serde(default)]
    pub os: Option<String>,
    /// Active profile in the app.
    #[serde(default)]
    pub profile: Option<String>,
    /// App language.
    #[serde(default)]
    pub language: Option<String>,
}

impl FeedbackContext {
    fn is_empty(&self) -> bool {
        self.app_version.is_none()
            && self.os.is_none()
            && self.profile.is_none()
            && self.language.is_none()
    }
}

/// Client for the issue tracker.
pub struct TicketClient {
    config: TicketsConfig,
    client: reqwest::Client,
}

impl TicketClient {
    /// Create a client from tracker credentials.
    pub fn new(config: TicketsConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("atheneum-hub")
            .timeout(TICKET_TIMEOUT)
            .build()?;
        Ok(Self { config, client })
    }

    /// Whether enough is configured to file issues.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// File a feedback issue, returning the created issue key.
    pub async fn create_issue(
        &self,
        kind: &str,
        title: &str,
        description: &str,
        context: &FeedbackContext,
    ) -> Result<String, TicketError> {
        if !self.is_configured() {
            return Err(TicketError::NotConfigured);
        }

        let full_description = build_description(description, context);
        let payload = issue_payload(&self.config.project_key, kind, title, &full_description);

        let url = format!(
            "{}/rest/api/3/issue",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let created: CreatedIssue = response.json().await?;
            tracing::info!(key = %created.key, kind, "feedback issue created");
            return Ok(created.key);
        }

        let reason = response
            .json::<TrackerErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error_messages.into_iter().next())
            .unwrap_or_else(|| format!("status {status}"));
        tracing::error!(%status, %reason, "tracker refused feedback issue");
        Err(TicketError::Rejected(reason))
    }
}

/// Map a feedback kind to the tracker's issue type.
fn issue_type_for(kind: &str) -> &'static str {
    match kind {
        "bug" => "Bug",
        "feature" => "Story",
        _ => "Task",
    }
}

/// Append the reported environment to the issue description.
fn build_description(description: &str, context: &FeedbackContext) -> String {
    let mut lines = vec![description.to_string()];

    if !context.is_empty() {
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push("Environment:".to_string());

        if let Some(version) = &context.app_version {
            lines.push(format!("• App Version: {version}"));
        }
        if let Some(os) = &context.os {
            lines.push(format!("• OS: {os}"));
        }
        if let Some(profile) = &context.profile {
            lines.push(format!("• Profile: {profile}"));
        }
        if let Some(language) = &context.language {
            lines.push(format!("• Language: {language}"));
        }
    }

    lines.join("\n")
}

/// Build the tracker's issue payload. Descriptions go in as a single
/// document-format paragraph.
fn issue_payload(
    project_key: &str,
    kind: &str,
    title: &str,
    description: &str,
) -> serde_json::Value {
    json!({
        "fields": {
            "project": { "key": project_key },
            "summary": title,
            "description": {
                "type": "doc",
                "version": 1,
                "content": [
                    {
                        "type": "paragraph",
                        "content": [
                            { "type": "text", "text": description }
                        ]
                    }
                ]
            },
            "issuetype": { "name": issue_type_for(kind) },
            "labels": ISSUE_LABELS,
        }
    })
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize)]
struct TrackerErrorBody {
    #[serde(default, rename = "errorMessages")]
    error_messages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_mapping() {
        assert_eq!(issue_type_for("bug"), "Bug");
        assert_eq!(issue_type_for("feature"), "Story");
        assert_eq!(issue_type_for("question"), "Task");
        assert_eq!(issue_type_for(""), "Task");
    }

    #[test]
    fn test_build_description_without_context() {
        let text = build_description("Search hangs", &FeedbackContext::default());
        assert_eq!(text, "Search hangs");
    }

    #[test]
    fn test_build_description_with_context() {
        let context = FeedbackContext {
            app_version: Some("2.1.0".into()),
            os: Some("Linux".into()),
            profile: None,
            language: Some("fr".into()),
        };
        let text = build_description("Search hangs", &context);
        assert!(text.starts_with("Search hangs\n\n---\nEnvironment:"));
        assert!(text.contains("• App Version: 2.1.0"));
        assert!(text.contains("• OS: Linux"));
        assert!(text.contains("• Language: fr"));
        assert!(!text.contains("Profile"));
    }

    #[test]
    fn test_issue_payload_shape() {
        let payload = issue_payload("LIB", "bug", "Broken search", "It hangs");
        assert_eq!(payload["fields"]["project"]["key"], "LIB");
        assert_eq!(payload["fields"]["summary"], "Broken search");
        assert_eq!(payload["fields"]["issuetype"]["name"], "Bug");
        assert_eq!(payload["fields"]["labels"][0], "beta-feedback");
        assert_eq!(payload["fields"]["description"]["type"], "doc");
        assert_eq!(
            payload["fields"]["description"]["content"][0]["content"][0]["text"],
            "It hangs"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses() {
        let client = TicketClient::new(TicketsConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client
            .create_issue("bug", "title", "body", &FeedbackContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::NotConfigured));
    }
}
