//! Asynchronous route pre-conditions.
//!
//! Conditions gate whether a matched route may activate. They run sequentially
//! in declared order and short-circuit on the first rejection. A rejecting
//! condition is a normal outcome, not an error; the router reports it through
//! the `conditionsFailed` notification.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::events::RouteDetail;

/// An asynchronous predicate gating route activation.
///
/// Conditions may read the detail but must not rely on mutating it; the detail
/// is a per-attempt snapshot.
#[async_trait]
pub trait RouteCondition: Send + Sync {
	/// Returns whether the navigation may proceed.
	async fn allow(&self, detail: &RouteDetail) -> bool;
}

struct FnCondition<F> {
	predicate: F,
}

#[async_trait]
impl<F> RouteCondition for FnCondition<F>
where
	F: Fn(RouteDetail) -> BoxFuture<'static, bool> + Send + Sync,
{
	async fn allow(&self, detail: &RouteDetail) -> bool {
		(self.predicate)(detail.clone()).await
	}
}

/// Wraps an async closure as a [`RouteCondition`].
pub fn condition_fn<F, Fut>(predicate: F) -> Arc<dyn RouteCondition>
where
	F: Fn(RouteDetail) -> Fut + Send + Sync + 'static,
	Fut: std::future::Future<Output = bool> + Send + 'static,
{
	Arc::new(FnCondition {
		predicate: move |detail| Box::pin(predicate(detail)) as BoxFuture<'static, bool>,
	})
}

/// Evaluates conditions in declared order, short-circuiting on the first
/// rejection. Zero conditions trivially pass.
pub(crate) async fn check_conditions(
	conditions: &[Arc<dyn RouteCondition>],
	detail: &RouteDetail,
) -> bool {
	for condition in conditions {
		if !condition.allow(detail).await {
			return false;
		}
	}
	true
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn detail() -> RouteDetail {
		RouteDetail {
			route: "/x".to_string(),
			location: "/x".to_string(),
			querystring: String::new(),
			user_data: None,
			params: None,
			name: None,
		}
	}

	#[tokio::test]
	async fn test_zero_conditions_pass() {
		assert!(check_conditions(&[], &detail()).await);
	}

	#[tokio::test]
	async fn test_all_true_passes() {
		let conditions = vec![
			condition_fn(|_| async { true }),
			condition_fn(|_| async { true }),
		];
		assert!(check_conditions(&conditions, &detail()).await);
	}

	#[tokio::test]
	async fn test_first_false_short_circuits() {
		let calls = Arc::new(AtomicUsize::new(0));

		let first = {
			let calls = Arc::clone(&calls);
			condition_fn(move |_| {
				calls.fetch_add(1, Ordering::SeqCst);
				async { false }
			})
		};
		let second = {
			let calls = Arc::clone(&calls);
			condition_fn(move |_| {
				calls.fetch_add(1, Ordering::SeqCst);
				async { true }
			})
		};

		assert!(!check_conditions(&[first, second], &detail()).await);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_condition_sees_detail() {
		let condition = condition_fn(|detail: RouteDetail| async move { detail.route == "/x" });
		assert!(check_conditions(&[condition], &detail()).await);
	}
}
