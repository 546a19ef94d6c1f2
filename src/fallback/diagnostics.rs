// Failure diagnostics - reporting hook and human-readable rendering
//
// The orchestrator hands every exhausted or cancelled call to a
// FailureReporter. Rendering is separate so a CLI can print the same
// report the logs carry.

use std::fmt::Write as _;
use tracing::warn;

use super::envelope::AggregatedFailure;
use super::errors::ErrorKind;

/// Receives the aggregated failure of every call that did not succeed
pub trait FailureReporter: Send + Sync {
    fn report(&self, failures: &AggregatedFailure);
}

/// Default reporter: one `warn!` summary plus one per attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failures: &AggregatedFailure) {
        warn!(
            operation = %failures.operation(),
            attempts = failures.len(),
            cancelled = failures.was_cancelled(),
            "no backend could serve the operation"
        );
        for (index, attempt) in failures.iter().enumerate() {
            warn!(
                operation = %attempt.operation(),
                backend = %attempt.backend(),
                attempt = index + 1,
                kind = %attempt.kind(),
                elapsed = ?attempt.elapsed(),
                "{}",
                attempt.message()
            );
        }
    }
}

/// Reporter for callers that render failures themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl FailureReporter for SilentReporter {
    fn report(&self, _failures: &AggregatedFailure) {}
}

/// Generate suggestion based on the error kind
pub fn suggestion_for(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::Transient => Some(
            "Network or throttling problem. Try:\n\
             1) Check your internet connection\n\
             2) Use a proxy/VPN\n\
             3) Try again later",
        ),
        ErrorKind::NotSupported => Some(
            "A backend cannot serve this request. Try:\n\
             1) Install or update the missing tool (e.g. pip3 install -U yt-dlp)\n\
             2) Check that the URL points to a supported video",
        ),
        ErrorKind::AuthRequired => Some(
            "Credentials or quota are missing. Try:\n\
             1) Set YOUTUBE_API_KEY for the official API backend\n\
             2) Use cookies from a logged-in browser\n\
             3) Wait for the daily API quota to reset",
        ),
        ErrorKind::Unknown => Some(
            "Unknown error occurred. Try:\n\
             1) Check the video URL\n\
             2) Try again later",
        ),
        ErrorKind::Cancelled => None,
    }
}

/// Multi-line report: one line per attempt, then one suggestion per kind seen
pub fn render_report(failures: &AggregatedFailure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} failed:", failures.operation());

    for (index, attempt) in failures.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} [{}] after {}ms: {}",
            index + 1,
            attempt.backend(),
            attempt.kind(),
            attempt.elapsed().as_millis(),
            attempt.message()
        );
    }

    let mut seen: Vec<ErrorKind> = Vec::new();
    for attempt in failures {
        if seen.contains(&attempt.kind()) {
            continue;
        }
        seen.push(attempt.kind());
        if let Some(suggestion) = suggestion_for(attempt.kind()) {
            let _ = write!(out, "\n{}\n", suggestion);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::executor::AttemptFailure;
    use crate::fallback::operation::OperationName;
    use crate::fallback::registry::BackendName;
    use std::time::Duration;

    fn failures(kinds: &[(&str, ErrorKind)]) -> AggregatedFailure {
        let operation = OperationName::new("download_audio").unwrap();
        let attempts = kinds
            .iter()
            .map(|(backend, kind)| {
                AttemptFailure::new(
                    BackendName::new(*backend).unwrap(),
                    operation.clone(),
                    *kind,
                    format!("{} broke", backend),
                    Duration::from_millis(250),
                )
            })
            .collect();
        AggregatedFailure::new(operation, attempts)
    }

    #[test]
    fn test_report_lists_attempts_in_order() {
        let report = render_report(&failures(&[
            ("pytubefix", ErrorKind::Transient),
            ("yt-dlp", ErrorKind::NotSupported),
        ]));

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "download_audio failed:");
        assert_eq!(lines[1], "  1. pytubefix [transient] after 250ms: pytubefix broke");
        assert_eq!(lines[2], "  2. yt-dlp [not_supported] after 250ms: yt-dlp broke");
    }

    #[test]
    fn test_suggestions_are_deduplicated() {
        let report = render_report(&failures(&[
            ("pytubefix", ErrorKind::Transient),
            ("yt-dlp", ErrorKind::Transient),
        ]));
        assert_eq!(report.matches("Network or throttling problem").count(), 1);
    }

    #[test]
    fn test_cancellation_has_no_suggestion() {
        assert!(suggestion_for(ErrorKind::Cancelled).is_none());
        let report = render_report(&failures(&[("pytubefix", ErrorKind::Cancelled)]));
        assert!(!report.contains("Try:"));
    }

    #[test]
    fn test_reporters_accept_failures() {
        let failed = failures(&[("youtube_api", ErrorKind::AuthRequired)]);
        TracingReporter.report(&failed);
        SilentReporter.report(&failed);
    }
}
