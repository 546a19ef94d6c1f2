// Fault classification - maps raw backend messages onto an ErrorKind
//
// Patterns are checked in order of specificity:
// - credentials / quota
// - capability gaps (missing tool, unsupported URL, DRM)
// - network and throttling
// Anything else is Unknown. Cancellation is never inferred from text; only
// the caller's token decides it.

use regex::Regex;

use super::errors::ErrorKind;

lazy_static::lazy_static! {
    static ref AUTH_RE: Regex = Regex::new(
        r"(?i)(api[ _-]?key|quota|credential|unauthori[sz]ed|\b401\b|oauth|sign in|login required|cookies|members[ -]only|private video)"
    ).unwrap();
    static ref UNSUPPORTED_RE: Regex = Regex::new(
        r"(?i)(not supported|unsupported|not implemented|does not support|not installed|command not found|no such file|drm|widevine|no formats)"
    ).unwrap();
    static ref TRANSIENT_RE: Regex = Regex::new(
        r"(?i)(time[d ]?\s?out|connection (refused|reset|aborted|closed)|network|temporar|\b429\b|too many requests|rate.?limit|\b403\b|forbidden|\b50[234]\b|bad gateway|service unavailable|broken pipe|\bdns\b|sabr|po token|captcha|\bbot\b)"
    ).unwrap();
}

/// Classify an unstructured backend message
pub fn classify_message(message: &str) -> ErrorKind {
    if AUTH_RE.is_match(message) {
        return ErrorKind::AuthRequired;
    }

    if UNSUPPORTED_RE.is_match(message) {
        return ErrorKind::NotSupported;
    }

    if TRANSIENT_RE.is_match(message) {
        return ErrorKind::Transient;
    }

    ErrorKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ERROR: Premiere cancelled by uploader", ErrorKind::Unknown)]
    #[case("YOUTUBE_API_KEY environment variable is not set", ErrorKind::AuthRequired)]
    #[case("quotaExceeded: The request cannot be completed because you have exceeded your quota", ErrorKind::AuthRequired)]
    #[case("Sign in to confirm your age", ErrorKind::AuthRequired)]
    #[case("HTTP Error 401: Unauthorized", ErrorKind::AuthRequired)]
    #[case("google-api-python-client is not installed", ErrorKind::NotSupported)]
    #[case("ERROR: Unsupported URL: https://example.com", ErrorKind::NotSupported)]
    #[case("This video is DRM protected", ErrorKind::NotSupported)]
    #[case("Timed out after 30s", ErrorKind::Transient)]
    #[case("connection reset by peer", ErrorKind::Transient)]
    #[case("HTTP Error 429: Too Many Requests", ErrorKind::Transient)]
    #[case("ERROR: HTTP Error 403: Forbidden", ErrorKind::Transient)]
    #[case("YouTube is forcing SABR streaming for this client", ErrorKind::Transient)]
    #[case("503 Service Unavailable", ErrorKind::Transient)]
    #[case("list index out of range", ErrorKind::Unknown)]
    #[case("", ErrorKind::Unknown)]
    fn test_classify_message(#[case] message: &str, #[case] expected: ErrorKind) {
        assert_eq!(classify_message(message), expected);
    }

    #[test]
    fn test_cancelled_wording_is_not_a_cancellation() {
        let message = "network read cancelled while waiting for response";
        assert_eq!(classify_message(message), ErrorKind::Transient);
    }

    #[test]
    fn test_quota_beats_forbidden() {
        // YouTube Data API reports quota exhaustion as a 403
        let message = "HttpError 403: quota exceeded for project";
        assert_eq!(classify_message(message), ErrorKind::AuthRequired);
    }
}
