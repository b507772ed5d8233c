//! Notification adapter that records alerts instead of delivering them.
//!
//! Every message is logged; when an outbox path is configured it is also
//! appended there as one JSON object per line, for a mailer or SMS gateway to
//! pick up.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::error::HacoError;
use crate::ports::notify_port::{Channel, NotifyPort};

pub struct OutboxNotifier {
    outbox: Option<PathBuf>,
}

#[derive(Serialize)]
struct OutboxRecord<'a> {
    channel: &'static str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    body: &'a str,
}

impl OutboxNotifier {
    pub fn new(outbox: Option<PathBuf>) -> Self {
        Self { outbox }
    }

    fn append(&self, path: &Path, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

impl NotifyPort for OutboxNotifier {
    fn send(&self, channel: &Channel, subject: &str, body: &str) -> Result<(), HacoError> {
        log::info!("[{channel}] {subject}: {body}");

        let Some(path) = &self.outbox else {
            return Ok(());
        };

        let record = OutboxRecord {
            channel: channel.kind(),
            to: channel.address(),
            subject: match channel {
                Channel::Email(_) => Some(subject),
                Channel::Sms(_) => None,
            },
            body,
        };
        let line = serde_json::to_string(&record)?;
        self.append(path, &line).map_err(|e| HacoError::Notify {
            channel: channel.kind().to_string(),
            reason: format!("failed to append to {}: {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn without_outbox_only_logs() {
        let notifier = OutboxNotifier::new(None);
        assert!(notifier
            .send(&Channel::Sms("+15550100".into()), "s", "b")
            .is_ok());
    }

    #[test]
    fn appends_one_json_line_per_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbox.jsonl");
        let notifier = OutboxNotifier::new(Some(path.clone()));

        notifier
            .send(&Channel::Email("desk@example.com".into()), "AAPL HACO Alert", "changed to 1")
            .unwrap();
        notifier
            .send(&Channel::Sms("+15550100".into()), "AAPL HACO Alert", "changed to 1")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["channel"], "email");
        assert_eq!(lines[0]["subject"], "AAPL HACO Alert");
        assert_eq!(lines[1]["to"], "+15550100");
        assert!(lines[1].get("subject").is_none());
    }

    #[test]
    fn unwritable_outbox_is_notify_error() {
        let dir = TempDir::new().unwrap();
        let notifier = OutboxNotifier::new(Some(dir.path().join("missing").join("outbox.jsonl")));
        let err = notifier
            .send(&Channel::Email("x@y".into()), "s", "b")
            .unwrap_err();
        assert!(matches!(err, HacoError::Notify { .. }));
    }
}
