//! Delivery of deployment reports.
//!
//! After a successful deployment the report is handed to a [`ReportSink`].
//! [`SendmailSink`] mails it through a local `sendmail -t`; [`LogSink`] only
//! logs it. A failed delivery never fails the deployment, see [`deliver`].

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::deploy::DeployReport;

/// Result type for report delivery.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors raised while delivering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to start {}: {source}", program.display())]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to pass the message to {}: {source}", program.display())]
    WriteFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exited with {status}: {stderr}", program.display())]
    DeliveryFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Destination for deployment reports.
pub trait ReportSink {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    fn send(&self, report: &DeployReport) -> ReportResult<()>;
}

/// Send a report, logging instead of failing when delivery does not work.
///
/// Returns whether the report was delivered.
pub fn deliver(sink: &dyn ReportSink, report: &DeployReport) -> bool {
    match sink.send(report) {
        Ok(()) => true,
        Err(e) => {
            warn!(sink = sink.name(), error = %e, "Failed to deliver deployment report");
            false
        }
    }
}

/// Logs each report line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, report: &DeployReport) -> ReportResult<()> {
        for line in report.body().lines().filter(|l| !l.is_empty()) {
            info!(target: "nbmdeploy::report", "{}", line);
        }
        Ok(())
    }
}

/// Mails reports through a sendmail-compatible binary.
#[derive(Debug, Clone)]
pub struct SendmailSink {
    program: PathBuf,
    from: String,
    to: Vec<String>,
    subject: String,
}

impl SendmailSink {
    pub fn new(program: impl Into<PathBuf>, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            program: program.into(),
            from: from.into(),
            to,
            subject: crate::config::DEFAULT_SUBJECT.to_string(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// The RFC 822 message for a report body.
    pub fn compose(&self, body: &str) -> String {
        format!(
            "From: {}\nTo: {}\nDate: {}\nSubject: {}\nContent-Type: text/plain; charset=UTF-8\n\n{}",
            self.from,
            self.to.join(", "),
            Local::now().to_rfc2822(),
            self.subject,
            body
        )
    }
}

impl ReportSink for SendmailSink {
    fn name(&self) -> &str {
        "sendmail"
    }

    fn send(&self, report: &DeployReport) -> ReportResult<()> {
        let message = self.compose(&report.body());

        let mut child = Command::new(&self.program)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ReportError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .map_err(|source| ReportError::WriteFailed {
                    program: self.program.clone(),
                    source,
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| ReportError::WriteFailed {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ReportError::DeliveryFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(recipients = %self.to.join(", "), "Deployment report sent");
        Ok(())
    }
}

/// The sink selected by the report configuration.
pub fn sink_from_config(config: &ReportConfig) -> Box<dyn ReportSink> {
    if config.enabled {
        Box::new(
            SendmailSink::new(&config.sendmail, &config.from, config.to.clone())
                .with_subject(&config.subject),
        )
    } else {
        Box::new(LogSink)
    }
}
