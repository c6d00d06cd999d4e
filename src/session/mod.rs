//! Wizard sessions - persistent per-document analysis state
//!
//! Each analyzed document gets a cache directory under
//! `~/.cache/stylometer/<name-hash>/` holding:
//! - `session.json`: wizard progress (which steps ran, when)
//! - `findings.json`: findings from the last full run
//! - `report.json`: the last scored report
//!
//! The session records a sha256 of the document content; when the
//! document changes, the session is invalidated and the wizard restarts
//! from step 1.

use crate::models::{AnalysisReport, Finding};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

const SESSION_FILE: &str = "session.json";
const FINDINGS_FILE: &str = "findings.json";
const REPORT_FILE: &str = "report.json";

/// Status of one wizard step within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Completed,
    Failed,
}

/// Progress record for one wizard step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepState {
    pub number: u8,
    pub name: String,
    pub status: StepStatus,
    /// Findings the step produced on its last run
    pub findings: usize,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persistent wizard state for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub document: PathBuf,
    /// sha256 of the document content when the session was created
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 1-based number of the next step to run; past 6 means done
    pub current_step: u8,
    pub steps: Vec<StepState>,
}

impl Session {
    /// Fresh session at step 1 for a document
    pub fn new(document: PathBuf, content_hash: String) -> Self {
        let now = Utc::now();
        let steps = crate::steps::default_steps()
            .iter()
            .map(|s| StepState {
                number: s.number(),
                name: s.name().to_string(),
                status: StepStatus::Pending,
                findings: 0,
                completed_at: None,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            document,
            content_hash,
            created_at: now,
            updated_at: now,
            current_step: 1,
            steps,
        }
    }

    /// Next pending step state, if the wizard is not done
    pub fn next_pending(&self) -> Option<&StepState> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Pending)
    }

    /// Whether every step has completed
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    /// Record a step outcome and advance the pointer
    pub fn record_step(&mut self, number: u8, success: bool, findings: usize) {
        if let Some(state) = self.steps.iter_mut().find(|s| s.number == number) {
            state.status = if success {
                StepStatus::Completed
            } else {
                StepStatus::Failed
            };
            state.findings = findings;
            state.completed_at = Some(Utc::now());
        }
        self.current_step = self
            .steps
            .iter()
            .find(|s| s.status == StepStatus::Pending)
            .map(|s| s.number)
            .unwrap_or(self.steps.len() as u8 + 1);
        self.updated_at = Utc::now();
    }

    /// Reset all steps to pending (document changed or --restart)
    pub fn reset(&mut self, content_hash: String) {
        self.content_hash = content_hash;
        self.current_step = 1;
        self.updated_at = Utc::now();
        for state in &mut self.steps {
            state.status = StepStatus::Pending;
            state.findings = 0;
            state.completed_at = None;
        }
    }
}

/// Root of the stylometer cache (`~/.cache/stylometer` on Linux)
pub fn cache_root() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    Ok(base.join("stylometer"))
}

/// Per-document cache directory: `<cache_root>/<stem>-<12 hex of path hash>`
pub fn session_dir(document: &Path) -> Result<PathBuf> {
    let canonical = document
        .canonicalize()
        .unwrap_or_else(|_| document.to_path_buf());

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    let hash = format!("{:016x}", hasher.finish());

    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    Ok(cache_root()?.join(format!("{stem}-{}", &hash[..12])))
}

/// sha256 hex digest of a document's content
pub fn content_sha256(document: &Path) -> Result<String> {
    let content = std::fs::read(document)
        .with_context(|| format!("Failed to read document: {}", document.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Store for one document's session, findings, and report snapshots
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn for_document(document: &Path) -> Result<Self> {
        Ok(Self {
            dir: session_dir(document)?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the session, or create a fresh one. A content-hash mismatch
    /// discards the stored session and restarts the wizard.
    pub fn load_or_create(&self, document: &Path) -> Result<Session> {
        let hash = content_sha256(document)?;
        let path = self.dir.join(SESSION_FILE);

        if path.exists() {
            match self.load_session() {
                Ok(session) if session.content_hash == hash => {
                    debug!("Resuming session {} at step {}", session.id, session.current_step);
                    return Ok(session);
                }
                Ok(_) => {
                    info!("Document changed since last session; restarting wizard");
                }
                Err(e) => {
                    debug!("Discarding unreadable session: {e}");
                }
            }
        }

        Ok(Session::new(document.to_path_buf(), hash))
    }

    pub fn load_session(&self) -> Result<Session> {
        let path = self.dir.join(SESSION_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse session.json")
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(SESSION_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(session)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved session to {}", path.display());
        Ok(())
    }

    pub fn load_findings(&self) -> Result<Vec<Finding>> {
        let path = self.dir.join(FINDINGS_FILE);
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "No cached findings at {}; run `stylometer analyze` first",
                path.display()
            )
        })?;
        serde_json::from_str(&content).context("Failed to parse findings.json")
    }

    pub fn save_findings(&self, findings: &[Finding]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(FINDINGS_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(findings)?)?;
        Ok(())
    }

    pub fn load_report(&self) -> Result<AnalysisReport> {
        let path = self.dir.join(REPORT_FILE);
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "No cached report at {}; run `stylometer analyze` first",
                path.display()
            )
        })?;
        serde_json::from_str(&content).context("Failed to parse report.json")
    }

    pub fn save_report(&self, report: &AnalysisReport) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(REPORT_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
        Ok(())
    }

    /// Remove all cached data for this document
    pub fn clean(&self) -> Result<()> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)
                .with_context(|| format!("Failed to remove {}", self.dir.display()))?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn at(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_step_one() {
        let session = Session::new(PathBuf::from("essay.md"), "abc".to_string());
        assert_eq!(session.current_step, 1);
        assert_eq!(session.steps.len(), 6);
        assert!(!session.is_complete());
        assert_eq!(session.next_pending().unwrap().number, 1);
    }

    #[test]
    fn test_record_step_advances_pointer() {
        let mut session = Session::new(PathBuf::from("essay.md"), "abc".to_string());
        session.record_step(1, true, 3);

        assert_eq!(session.current_step, 2);
        assert_eq!(session.steps[0].status, StepStatus::Completed);
        assert_eq!(session.steps[0].findings, 3);
        assert!(session.steps[0].completed_at.is_some());
    }

    #[test]
    fn test_all_steps_complete() {
        let mut session = Session::new(PathBuf::from("essay.md"), "abc".to_string());
        for n in 1..=6 {
            session.record_step(n, true, 0);
        }
        assert!(session.is_complete());
        assert!(session.next_pending().is_none());
        assert_eq!(session.current_step, 7);
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut session = Session::new(PathBuf::from("essay.md"), "abc".to_string());
        session.record_step(1, true, 2);
        session.reset("def".to_string());

        assert_eq!(session.current_step, 1);
        assert_eq!(session.content_hash, "def");
        assert!(session.steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_session_dir_is_stable_and_named() {
        let a = session_dir(Path::new("/tmp/essay.md")).unwrap();
        let b = session_dir(Path::new("/tmp/essay.md")).unwrap();
        assert_eq!(a, b);

        let name = a.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("essay-"));
        assert_eq!(name.len(), "essay-".len() + 12);
    }

    #[test]
    fn test_store_roundtrip_and_hash_invalidation() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("essay.md");
        std::fs::write(&doc, "Original text.").unwrap();

        let store = SessionStore::at(tmp.path().join("cache"));
        let mut session = store.load_or_create(&doc).unwrap();
        session.record_step(1, true, 1);
        store.save_session(&session).unwrap();

        // Unchanged document resumes
        let resumed = store.load_or_create(&doc).unwrap();
        assert_eq!(resumed.id, session.id);
        assert_eq!(resumed.current_step, 2);

        // Edited document restarts
        std::fs::write(&doc, "Edited text.").unwrap();
        let restarted = store.load_or_create(&doc).unwrap();
        assert_ne!(restarted.id, session.id);
        assert_eq!(restarted.current_step, 1);
    }

    #[test]
    fn test_findings_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::at(tmp.path().join("cache"));

        let findings = vec![Finding {
            id: "abc123".to_string(),
            step: "sentence-length".to_string(),
            title: "Flat rhythm".to_string(),
            ..Default::default()
        }];
        store.save_findings(&findings).unwrap();

        let loaded = store.load_findings().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "abc123");
    }

    #[test]
    fn test_clean_removes_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::at(tmp.path().join("cache"));
        store.save_findings(&[]).unwrap();
        assert!(store.dir().exists());

        store.clean().unwrap();
        assert!(!store.dir().exists());
    }
}
