//! Remote handle identity.
//!
//! A handle's id may still be in flight: `find_element_deferred` hands out an
//! element before the lookup has answered. [`HandleId`] holds either the id or
//! a shared future producing it, so every clone of a handle awaits the same
//! lookup and sees the same outcome.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use wd_runtime::Result;

type PendingId = Shared<BoxFuture<'static, Result<String>>>;

#[derive(Clone)]
pub(crate) enum HandleId {
	Resolved(Arc<str>),
	Pending(PendingId),
}

impl HandleId {
	pub(crate) fn resolved(id: impl Into<Arc<str>>) -> Self {
		HandleId::Resolved(id.into())
	}

	pub(crate) fn pending<F>(id: F) -> Self
	where
		F: Future<Output = Result<String>> + Send + 'static,
	{
		HandleId::Pending(id.boxed().shared())
	}

	/// Waits for the id. A failed lookup is reported to every caller.
	pub(crate) async fn get(&self) -> Result<String> {
		match self {
			HandleId::Resolved(id) => Ok(id.to_string()),
			HandleId::Pending(pending) => pending.clone().await,
		}
	}

	/// The id, if it is already known.
	pub(crate) fn peek(&self) -> Option<&str> {
		match self {
			HandleId::Resolved(id) => Some(id),
			HandleId::Pending(pending) => match pending.peek() {
				Some(Ok(id)) => Some(id.as_str()),
				_ => None,
			},
		}
	}
}

impl fmt::Debug for HandleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.peek() {
			Some(id) => f.write_str(id),
			None => f.write_str("<pending>"),
		}
	}
}
