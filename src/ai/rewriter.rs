//! AI rewrite generation from findings
//!
//! Drives one LLM round-trip per finding: build the prompt, parse the
//! fenced JSON reply into a `RewriteProposal`, validate that the quoted
//! original text actually appears in the passage, and retry once with
//! error feedback when it does not.

use crate::ai::client::{AiClient, Message};
use crate::ai::prompts::RewritePromptBuilder;
use crate::ai::{AiError, AiResult};
use crate::config::DocumentRegister;
use crate::models::Finding;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// One text replacement within the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageChange {
    /// Exact text to replace (must appear in the document)
    pub original_text: String,
    /// Replacement text
    pub rewritten_text: String,
    /// What this change does
    #[serde(default)]
    pub description: String,
}

/// A proposed rewrite for one finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteProposal {
    pub id: String,
    pub finding_id: String,
    pub title: String,
    pub rationale: String,
    pub changes: Vec<PassageChange>,
}

impl RewriteProposal {
    /// Simple before/after preview of every change
    pub fn diff(&self) -> String {
        let mut out = String::new();
        for (i, change) in self.changes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if !change.description.is_empty() {
                out.push_str(&format!("# {}\n", change.description));
            }
            for line in change.original_text.lines() {
                out.push_str(&format!("- {line}\n"));
            }
            for line in change.rewritten_text.lines() {
                out.push_str(&format!("+ {line}\n"));
            }
        }
        out
    }

    /// Apply every change to the document on disk, replacing the first
    /// occurrence of each original passage. Returns the number of
    /// changes applied.
    pub fn apply(&self, document: &Path) -> AiResult<usize> {
        let mut content = std::fs::read_to_string(document)?;
        let mut applied = 0;

        for change in &self.changes {
            if content.contains(&change.original_text) {
                content = content.replacen(&change.original_text, &change.rewritten_text, 1);
                applied += 1;
            } else {
                warn!(
                    "Skipping change; original text not found in {}",
                    document.display()
                );
            }
        }

        if applied > 0 {
            std::fs::write(document, content)?;
        }
        Ok(applied)
    }
}

fn json_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"))
}

/// Extract and parse the fenced JSON object from an LLM reply.
/// Falls back to treating the whole reply as JSON when no fence is found.
fn parse_reply(reply: &str) -> AiResult<ParsedProposal> {
    let json = json_block_regex()
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| reply.trim());

    serde_json::from_str(json).map_err(|e| AiError::ParseError(format!("ParseError: {e}")))
}

/// The JSON shape the prompt asks for
#[derive(Deserialize)]
struct ParsedProposal {
    title: String,
    #[serde(default)]
    rationale: String,
    changes: Vec<PassageChange>,
}

/// Validate that every quoted original appears in the passage
fn validate_changes(changes: &[PassageChange], passage: &str) -> Result<(), String> {
    if changes.is_empty() {
        return Err("ParseError: no changes in response".to_string());
    }
    for change in changes {
        if !passage.contains(&change.original_text) {
            return Err(format!(
                "MatchError: Original text not found: {:.60}...",
                change.original_text
            ));
        }
    }
    Ok(())
}

/// Only model-output failures are worth a feedback retry. Key,
/// transport, and API errors would fail the same way twice, and must
/// surface with their own variant, not as a parse failure.
fn retry_with_feedback(error: &AiError) -> bool {
    matches!(
        error,
        AiError::ParseError(_) | AiError::ValidationError(_)
    )
}

/// Generates rewrite proposals via the LLM, one feedback retry on
/// malformed model output
pub struct RewriteGenerator {
    client: AiClient,
}

impl RewriteGenerator {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AiClient {
        &self.client
    }

    /// Generate a rewrite proposal for a finding over the given passage
    pub fn generate(
        &self,
        finding: &Finding,
        passage: &str,
        register: DocumentRegister,
    ) -> AiResult<RewriteProposal> {
        match self.attempt(finding, passage, register, None) {
            Ok(proposal) => Ok(proposal),
            Err(first_error) if retry_with_feedback(&first_error) => {
                debug!("First rewrite attempt failed: {first_error}; retrying with feedback");
                self.attempt(finding, passage, register, Some(vec![first_error.to_string()]))
            }
            Err(e) => Err(e),
        }
    }

    fn attempt(
        &self,
        finding: &Finding,
        passage: &str,
        register: DocumentRegister,
        previous_errors: Option<Vec<String>>,
    ) -> AiResult<RewriteProposal> {
        let mut builder = RewritePromptBuilder::new(finding.clone(), register).passage(passage);
        if let Some(errors) = previous_errors {
            builder = builder.previous_errors(errors);
        }
        let system = builder.system_prompt();
        let prompt = builder.build();

        let reply = self
            .client
            .generate(vec![Message::user(prompt)], Some(system))?;

        let parsed = parse_reply(&reply)?;
        validate_changes(&parsed.changes, passage).map_err(AiError::ValidationError)?;

        Ok(RewriteProposal {
            id: uuid::Uuid::new_v4().to_string(),
            finding_id: finding.id.clone(),
            title: parsed.title,
            rationale: parsed.rationale,
            changes: parsed.changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_json() {
        let reply = r#"Here is the rewrite:

```json
{
    "title": "Vary the rhythm",
    "rationale": "Breaks the flat cadence",
    "changes": [
        {
            "original_text": "The system works well.",
            "rewritten_text": "It works. Better than we expected, honestly.",
            "description": "split and vary"
        }
    ]
}
```

Let me know if you need anything else."#;

        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.title, "Vary the rhythm");
        assert_eq!(parsed.changes.len(), 1);
    }

    #[test]
    fn test_parse_bare_json() {
        let reply = r#"{"title": "T", "rationale": "R", "changes": [{"original_text": "a", "rewritten_text": "b"}]}"#;
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.changes[0].original_text, "a");
        assert_eq!(parsed.changes[0].description, "");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_reply("I cannot help with that.").is_err());
    }

    #[test]
    fn test_api_errors_do_not_retry_as_parse_failures() {
        assert!(retry_with_feedback(&AiError::ParseError(
            "ParseError: bad json".to_string()
        )));
        assert!(retry_with_feedback(&AiError::ValidationError(
            "MatchError: Original text not found".to_string()
        )));
        assert!(!retry_with_feedback(&AiError::ApiError {
            status: 529,
            message: "overloaded".to_string(),
        }));
        assert!(!retry_with_feedback(&AiError::MissingApiKey {
            env_var: "ANTHROPIC_API_KEY".to_string(),
            signup_url: "https://console.anthropic.com".to_string(),
        }));
    }

    #[test]
    fn test_validate_rejects_missing_original() {
        let changes = vec![PassageChange {
            original_text: "not in the passage".to_string(),
            rewritten_text: "x".to_string(),
            description: String::new(),
        }];
        let err = validate_changes(&changes, "The actual passage text.").unwrap_err();
        assert!(err.starts_with("MatchError"));
    }

    #[test]
    fn test_apply_replaces_first_occurrence_only() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("essay.md");
        std::fs::write(&doc, "Same line.\nSame line.\nOther line.\n").unwrap();

        let proposal = RewriteProposal {
            id: "p1".to_string(),
            finding_id: "f1".to_string(),
            title: "T".to_string(),
            rationale: "R".to_string(),
            changes: vec![PassageChange {
                original_text: "Same line.".to_string(),
                rewritten_text: "Changed line.".to_string(),
                description: String::new(),
            }],
        };

        let applied = proposal.apply(&doc).unwrap();
        assert_eq!(applied, 1);
        let content = std::fs::read_to_string(&doc).unwrap();
        assert_eq!(content, "Changed line.\nSame line.\nOther line.\n");
    }

    #[test]
    fn test_diff_preview() {
        let proposal = RewriteProposal {
            id: "p1".to_string(),
            finding_id: "f1".to_string(),
            title: "T".to_string(),
            rationale: "R".to_string(),
            changes: vec![PassageChange {
                original_text: "Old text.".to_string(),
                rewritten_text: "New text.".to_string(),
                description: "swap".to_string(),
            }],
        };
        let diff = proposal.diff();
        assert!(diff.contains("- Old text."));
        assert!(diff.contains("+ New text."));
        assert!(diff.contains("# swap"));
    }
}
