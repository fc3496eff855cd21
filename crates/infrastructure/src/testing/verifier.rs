//! Response verifier.
//!
//! Checks a call outcome against [`Expectations`] and records one
//! [`CheckResult`] per check in the call's [`CallReport`].

use regex::Regex;

use callcheck_application::{
    BodyFormat, CheckError, ErasedValue, ExpectedBody, Expectations, TransportError, UsageError,
};
use callcheck_domain::{CallReport, CallResponse, Check, CheckResult, StatusCode};

use crate::codec::{BSON_EQUALS, JSON_EQUALS, YAML_EQUALS};

/// Verifies responses and transport errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseVerifier {
    /// Whether to stop on first failure.
    stop_on_failure: bool,
}

impl ResponseVerifier {
    /// Create a new verifier that runs every check.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stop_on_failure: false,
        }
    }

    /// Set whether to stop on first failure.
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Rejects expectations that can never be checked, before any request
    /// is made: an expected body its format's codec cannot encode.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Check`] when the expected body cannot be
    /// marshaled.
    pub fn check_expectation(&self, expect: &Expectations) -> Result<(), UsageError> {
        let Some(ExpectedBody::Value { value, format }) = &expect.body else {
            return Ok(());
        };
        let value: &ErasedValue = value.as_ref();
        let marshaled = match format {
            BodyFormat::Json => JSON_EQUALS.marshal_expected(value),
            BodyFormat::Yaml => YAML_EQUALS.marshal_expected(value),
            BodyFormat::Bson => BSON_EQUALS.marshal_expected(value),
        };
        marshaled.map(drop).map_err(UsageError::Check)
    }

    /// Checks a transport error against the expected-error pattern.
    ///
    /// With no pattern the error is a failure.
    pub fn verify_error(
        &self,
        report: &mut CallReport,
        error: &TransportError,
        pattern: Option<&Regex>,
    ) {
        let message = error.to_string();
        let result = match pattern {
            Some(pattern) if pattern.is_match(&message) => {
                CheckResult::pass_with_value(Check::Error, message)
            }
            Some(pattern) => CheckResult::fail_with_value(
                Check::Error,
                message.clone(),
                format!(
                    "error {message:?} does not match pattern {:?}",
                    pattern.as_str()
                ),
            ),
            None => CheckResult::fail(Check::Error, format!("unexpected error: {message}")),
        };
        report.record(result);
    }

    /// Records the failure of a call that answered although an error was
    /// expected.
    pub fn unexpected_response(
        &self,
        report: &mut CallReport,
        response: &CallResponse,
        pattern: &Regex,
    ) {
        report.record(CheckResult::fail_with_value(
            Check::Error,
            response.status_code().to_string(),
            format!(
                "expected an error matching {:?}, got a response with status {}",
                pattern.as_str(),
                describe_status(response.status_code())
            ),
        ));
    }

    /// Runs status, header and body checks.
    ///
    /// # Errors
    ///
    /// Returns a usage error if the expected body cannot be checked at all,
    /// for instance because it cannot be encoded in its format.
    pub fn verify(
        &self,
        report: &mut CallReport,
        response: &CallResponse,
        expect: &Expectations,
    ) -> Result<(), UsageError> {
        if !self.record(report, self.check_status(response, expect)) {
            return Ok(());
        }

        for (name, values) in expect.header.iter() {
            if !self.record(report, self.check_header(response, name, values)) {
                return Ok(());
            }
        }

        match &expect.body {
            None => {}
            Some(ExpectedBody::Value { value, format }) => {
                if !self.record(report, self.check_content_type(response, *format)) {
                    return Ok(());
                }
                let result = self.check_body_value(response, &**value, *format)?;
                report.record(result);
            }
            Some(ExpectedBody::Asserter(asserter)) => asserter(report, &response.body),
        }

        Ok(())
    }

    /// Records `result` and tells whether checking should go on.
    fn record(&self, report: &mut CallReport, result: CheckResult) -> bool {
        let keep_going = result.passed || !self.stop_on_failure;
        report.record(result);
        keep_going
    }

    fn check_status(&self, response: &CallResponse, expect: &Expectations) -> CheckResult {
        let actual = response.status_code();
        let expected = expect.expected_status();
        if actual == expected {
            CheckResult::pass_with_value(Check::Status, actual.to_string())
        } else {
            CheckResult::fail_with_value(
                Check::Status,
                actual.to_string(),
                format!(
                    "expected status {}, got {}; body: {:?}",
                    describe_status(expected),
                    describe_status(actual),
                    response.body_text()
                ),
            )
        }
    }

    fn check_header(&self, response: &CallResponse, name: &str, expected: &[String]) -> CheckResult {
        let check = Check::Header {
            name: name.to_string(),
        };

        let mut want = expected.to_vec();
        want.sort();
        let mut got = response.headers.get_all(name).to_vec();
        got.sort();

        if got == want {
            CheckResult::pass_with_value(check, format!("{got:?}"))
        } else {
            CheckResult::fail_with_value(
                check,
                format!("{got:?}"),
                format!("header {name:?} mismatch: expected {want:?}, got {got:?}"),
            )
        }
    }

    fn check_content_type(&self, response: &CallResponse, format: BodyFormat) -> CheckResult {
        let Some(content_type) = response.content_type() else {
            return CheckResult::fail(
                Check::ContentType,
                format!("no Content-Type header, expected {}", format.media_types()[0]),
            );
        };

        let accepted = content_type
            .parse::<mime::Mime>()
            .is_ok_and(|mime| media_type_matches(&mime, format));
        if accepted {
            CheckResult::pass_with_value(Check::ContentType, content_type)
        } else {
            CheckResult::fail_with_value(
                Check::ContentType,
                content_type,
                format!(
                    "content type {content_type:?} is not {}",
                    format.media_types().join(" or ")
                ),
            )
        }
    }

    fn check_body_value(
        &self,
        response: &CallResponse,
        value: &ErasedValue,
        format: BodyFormat,
    ) -> Result<CheckResult, UsageError> {
        let outcome = match format {
            BodyFormat::Json => JSON_EQUALS.check(&response.body, value),
            BodyFormat::Yaml => YAML_EQUALS.check(&response.body, value),
            BodyFormat::Bson => BSON_EQUALS.check(&response.body, value),
        };

        match outcome {
            Ok(()) => Ok(CheckResult::pass(Check::Body)),
            Err(e) if e.is_usage() => Err(UsageError::Check(e)),
            Err(e @ CheckError::ObtainedUndecodable { .. }) => Ok(CheckResult::fail_with_value(
                Check::Body,
                response.body_text(),
                e.to_string(),
            )),
            Err(e) => Ok(CheckResult::fail(Check::Body, e.to_string())),
        }
    }
}

/// Renders a status with its reason phrase when one is registered.
fn describe_status(status: StatusCode) -> String {
    axum::http::StatusCode::from_u16(status.as_u16())
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| status.to_string(), |reason| format!("{status} {reason}"))
}

fn media_type_matches(mime: &mime::Mime, format: BodyFormat) -> bool {
    let essence = mime.essence_str();
    format
        .media_types()
        .iter()
        .any(|accepted| essence.eq_ignore_ascii_case(accepted))
        || format
            .suffix()
            .is_some_and(|suffix| mime.suffix().is_some_and(|s| s.as_str() == suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use callcheck_domain::{HeaderSet, HttpMethod};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use url::Url;

    fn response(status: u16, headers: HeaderSet, body: &'static str) -> CallResponse {
        CallResponse::new(
            status,
            headers,
            Bytes::from_static(body.as_bytes()),
            HttpMethod::Get,
            Url::parse("http://127.0.0.1/").unwrap(),
        )
    }

    fn json_headers() -> HeaderSet {
        HeaderSet::new().with("Content-Type", ["application/json"])
    }

    #[test]
    fn test_passing_call() {
        let verifier = ResponseVerifier::new();
        let mut report = CallReport::new("GET /");
        let expect = Expectations {
            body: Some(ExpectedBody::json(json!({"a": 1}))),
            ..Default::default()
        };

        verifier
            .verify(&mut report, &response(200, json_headers(), r#"{"a": 1.0}"#), &expect)
            .unwrap();

        assert!(report.all_passed(), "{report}");
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_every_failure_is_reported() {
        let verifier = ResponseVerifier::new();
        let mut report = CallReport::new("GET /");
        let expect = Expectations {
            status: Some(201),
            header: HeaderSet::new().with("X-Custom", ["a"]),
            body: Some(ExpectedBody::json(json!({"a": 2}))),
            ..Default::default()
        };

        verifier
            .verify(&mut report, &response(200, HeaderSet::new(), r#"{"a": 1}"#), &expect)
            .unwrap();

        let failed: Vec<_> = report.failures().map(|r| r.check.clone()).collect();
        assert_eq!(
            failed,
            vec![
                Check::Status,
                Check::Header {
                    name: "X-Custom".to_string()
                },
                Check::ContentType,
                Check::Body,
            ]
        );
    }

    #[test]
    fn test_stop_on_failure() {
        let verifier = ResponseVerifier::new().with_stop_on_failure(true);
        let mut report = CallReport::new("GET /");
        let expect = Expectations {
            status: Some(201),
            header: HeaderSet::new().with("X-Custom", ["a"]),
            ..Default::default()
        };

        verifier
            .verify(&mut report, &response(200, HeaderSet::new(), ""), &expect)
            .unwrap();
        assert_eq!(report.total(), 1);
    }

    #[test]
    fn test_status_failure_shows_body() {
        let verifier = ResponseVerifier::new();
        let result = verifier.check_status(
            &response(400, HeaderSet::new(), "bad"),
            &Expectations::default(),
        );
        assert_eq!(
            result.error.as_deref(),
            Some("expected status 200 OK, got 400 Bad Request; body: \"bad\"")
        );
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(StatusCode::new(418)), "418 I'm a teapot");
        assert_eq!(describe_status(StatusCode::new(599)), "599");
    }

    #[test]
    fn test_header_values_compare_as_multiset() {
        let verifier = ResponseVerifier::new();
        let headers = HeaderSet::new().with("Custom", ["b", "a"]);
        let resp = response(200, headers, "");

        let expected = ["a".to_string(), "b".to_string()];
        assert!(verifier.check_header(&resp, "Custom", &expected).passed);
        assert!(!verifier.check_header(&resp, "Custom", &expected[..1]).passed);
        let doubled = ["a".to_string(), "a".to_string(), "b".to_string()];
        assert!(!verifier.check_header(&resp, "Custom", &doubled).passed);
    }

    #[test]
    fn test_content_type_variants() {
        let verifier = ResponseVerifier::new();
        let with_type = |ct: &str| response(200, HeaderSet::new().with("Content-Type", [ct]), "");

        assert!(verifier.check_content_type(&with_type("application/json; charset=utf-8"), BodyFormat::Json).passed);
        assert!(verifier.check_content_type(&with_type("application/problem+json"), BodyFormat::Json).passed);
        assert!(verifier.check_content_type(&with_type("text/yaml"), BodyFormat::Yaml).passed);
        assert!(verifier.check_content_type(&with_type("application/bson"), BodyFormat::Bson).passed);
        assert!(!verifier.check_content_type(&with_type("text/plain"), BodyFormat::Json).passed);
        assert!(!verifier.check_content_type(&response(200, HeaderSet::new(), ""), BodyFormat::Json).passed);
    }

    #[test]
    fn test_undecodable_body_shows_content() {
        let verifier = ResponseVerifier::new();
        let result = verifier
            .check_body_value(&response(200, json_headers(), "not json"), &json!({}), BodyFormat::Json)
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.actual.as_deref(), Some("not json"));
    }

    #[test]
    fn test_unencodable_expectation_is_usage_error() {
        let verifier = ResponseVerifier::new();
        let result = verifier.check_body_value(
            &response(200, HeaderSet::new(), ""),
            &json!(42),
            BodyFormat::Bson,
        );
        assert!(matches!(result, Err(UsageError::Check(_))));
    }

    #[test]
    fn test_unencodable_expectation_is_rejected_upfront() {
        let verifier = ResponseVerifier::new();
        let expect = Expectations {
            body: Some(ExpectedBody::bson(json!([1, 2]))),
            ..Default::default()
        };
        assert!(matches!(
            verifier.check_expectation(&expect),
            Err(UsageError::Check(CheckError::Usage(_)))
        ));

        let expect = Expectations {
            body: Some(ExpectedBody::bson(json!({"items": [1, 2]}))),
            ..Default::default()
        };
        assert!(verifier.check_expectation(&expect).is_ok());
        assert!(verifier.check_expectation(&Expectations::default()).is_ok());
    }

    #[test]
    fn test_asserter_records_into_report() {
        let verifier = ResponseVerifier::new();
        let mut report = CallReport::new("GET /");
        let expect = Expectations {
            body: Some(ExpectedBody::asserter(|report, body| {
                if body == b"ok" {
                    report.pass(Check::Body);
                } else {
                    report.fail(Check::Body, "body is not ok");
                }
            })),
            ..Default::default()
        };

        verifier
            .verify(&mut report, &response(200, HeaderSet::new(), "nope"), &expect)
            .unwrap();
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_verify_error() {
        let verifier = ResponseVerifier::new();
        let error = TransportError::other("some error");
        let pattern = Regex::new("^(?:some .* error)$").unwrap();

        let mut report = CallReport::new("GET /");
        verifier.verify_error(&mut report, &error, Some(&pattern));
        assert!(!report.all_passed());

        let mut report = CallReport::new("GET /");
        let exact = Regex::new("^(?:some error)$").unwrap();
        verifier.verify_error(&mut report, &error, Some(&exact));
        assert!(report.all_passed());

        let mut report = CallReport::new("GET /");
        verifier.verify_error(&mut report, &error, None);
        assert!(!report.all_passed());
    }
}
