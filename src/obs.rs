//! Observability: an explicitly passed logger plus [`observe`], which wraps an operation in
//! an optional span and counter.
//!
//! With `tracing`, operations run inside a `depot_client.op` span carrying `op` and `stage`,
//! and `TracingLogger` becomes the default [`Logger`]. With `metrics`, every operation bumps
//! `depot_client_op_total{op,outcome}` once on entry and once on completion. An operation
//! that finishes without error counts as a success even if it produced nothing, e.g. a
//! provider that is not on its platform.

mod log;

pub use log::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Full credential fallback chain.
	TokenResolution,
	/// A single identity provider attempt.
	ProviderAttempt,
	/// Authenticated JSON API call.
	ApiRequest,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::TokenResolution => "token_resolution",
			OpKind::ProviderAttempt => "provider_attempt",
			OpKind::ApiRequest => "api_request",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure, propagated or swallowed.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `op`, tracing it under `kind`/`stage` and counting its entry and outcome.
pub async fn observe<T, E, F>(kind: OpKind, stage: &'static str, op: F) -> Result<T, E>
where
	F: Future<Output = Result<T, E>>,
{
	count(kind, OpOutcome::Attempt);

	let result = in_span(kind, stage, op).await;

	count(kind, if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure });

	result
}

#[cfg(feature = "tracing")]
async fn in_span<F>(kind: OpKind, stage: &'static str, op: F) -> F::Output
where
	F: Future,
{
	use tracing::Instrument;

	op.instrument(tracing::debug_span!("depot_client.op", op = kind.as_str(), stage)).await
}
#[cfg(not(feature = "tracing"))]
async fn in_span<F>(_kind: OpKind, _stage: &'static str, op: F) -> F::Output
where
	F: Future,
{
	op.await
}

#[cfg(feature = "metrics")]
fn count(kind: OpKind, outcome: OpOutcome) {
	metrics::counter!("depot_client_op_total", "op" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
}
#[cfg(not(feature = "metrics"))]
fn count(_kind: OpKind, _outcome: OpOutcome) {}
