//! Transient-error classification
//!
//! Remote calls fail in two very different ways while a cluster converges:
//! the object may simply not exist *yet* (retry), or the request is wrong
//! or forbidden (abort). Classifiers turn a raw error into an
//! [`ErrorClass`]; [`classify_result`] folds that decision into the
//! tri-state [`Outcome`] the scheduler consumes. The scheduler itself never
//! inspects raw errors.

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::domain::models::poll::Outcome;
use crate::domain::ports::ClusterError;

/// Whether an error may resolve by waiting longer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Count the tick as not-yet and keep polling
    Transient,
    /// Abort the wait immediately
    Permanent,
}

/// Policy deciding whether an error is transient or permanent
pub trait ErrorClassifier<E: ?Sized> {
    fn classify(&self, error: &E) -> ErrorClass;
}

impl<E: ?Sized, F> ErrorClassifier<E> for F
where
    F: Fn(&E) -> ErrorClass,
{
    fn classify(&self, error: &E) -> ErrorClass {
        self(error)
    }
}

/// Errors that may carry an HTTP-like status code
pub trait StatusCoded {
    /// `None` when the request never produced a response
    fn status_code(&self) -> Option<u16>;

    /// Whether the error is permanent regardless of its status
    /// (malformed request, undecodable answer)
    fn is_malformed(&self) -> bool {
        false
    }
}

impl StatusCoded for ClusterError {
    fn status_code(&self) -> Option<u16> {
        self.status()
    }

    fn is_malformed(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl StatusCoded for reqwest::Error {
    fn status_code(&self) -> Option<u16> {
        self.status().map(|s| s.as_u16())
    }

    fn is_malformed(&self) -> bool {
        self.is_builder() || self.is_redirect() || self.is_decode()
    }
}

/// Default status-code policy.
///
/// - no response at all (connection refused, reset, timed out): transient
/// - 404 (still materializing), 408, 409, 429 and any 5xx: transient
/// - any other status: permanent
/// - malformed requests and undecodable answers: permanent
#[derive(Debug, Clone, Default)]
pub struct StatusCodeClassifier {
    extra_transient: BTreeSet<u16>,
}

const TRANSIENT_CODES: [u16; 4] = [404, 408, 409, 429];

impl StatusCodeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treat `status` as transient
    #[must_use]
    pub fn with_transient(mut self, status: u16) -> Self {
        self.extra_transient.insert(status);
        self
    }

    pub fn classify_status(&self, status: u16) -> ErrorClass {
        if TRANSIENT_CODES.contains(&status)
            || (500..600).contains(&status)
            || self.extra_transient.contains(&status)
        {
            ErrorClass::Transient
        } else {
            ErrorClass::Permanent
        }
    }
}

impl<E: StatusCoded + ?Sized> ErrorClassifier<E> for StatusCodeClassifier {
    fn classify(&self, error: &E) -> ErrorClass {
        if error.is_malformed() {
            return ErrorClass::Permanent;
        }
        error
            .status_code()
            .map_or(ErrorClass::Transient, |status| self.classify_status(status))
    }
}

/// Turn the result of a remote call into a predicate outcome.
///
/// `Ok` values go through `check`; errors go through `classifier`. A
/// transient error becomes `NotYet` carrying the error text as the
/// observation, a permanent one becomes `HardError` with the error text
/// verbatim.
///
/// # Example
/// ```
/// use kubewait::domain::models::Outcome;
/// use kubewait::domain::ports::ClusterError;
/// use kubewait::services::error_classifier::{classify_result, StatusCodeClassifier};
///
/// let classifier = StatusCodeClassifier::new();
/// let missing: Result<u32, ClusterError> = Err(ClusterError::not_found());
/// let outcome = classify_result(missing, &classifier, |n| Outcome::from_bool(n == 3));
/// assert_eq!(outcome, Outcome::NotYet(Some("404 Not Found".to_string())));
///
/// let denied: Result<u32, ClusterError> = Err(ClusterError::api(403, "Forbidden"));
/// let outcome = classify_result(denied, &classifier, |n| Outcome::from_bool(n == 3));
/// assert_eq!(outcome, Outcome::HardError("403 Forbidden".to_string()));
/// ```
pub fn classify_result<V, E, T, C, F>(result: Result<V, E>, classifier: &C, check: F) -> Outcome<T>
where
    E: Display,
    C: ErrorClassifier<E> + ?Sized,
    F: FnOnce(V) -> Outcome<T>,
{
    match result {
        Ok(value) => check(value),
        Err(err) => classify_error(&err, classifier),
    }
}

/// Turn a remote-call error into a not-yet or hard-error outcome
pub fn classify_error<E, T, C>(error: &E, classifier: &C) -> Outcome<T>
where
    E: Display,
    C: ErrorClassifier<E> + ?Sized,
{
    match classifier.classify(error) {
        ErrorClass::Transient => {
            tracing::debug!(error = %error, "transient error, treating as not yet");
            Outcome::NotYet(Some(error.to_string()))
        }
        ErrorClass::Permanent => Outcome::HardError(error.to_string()),
    }
}
