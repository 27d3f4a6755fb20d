//! Runtime environments
//!
//! Every effect runs against an environment `RT`. The only thing the library
//! itself needs from it is a cancellation token, exposed through [`HasCancel`].
//! Applications carry their own dependencies by defining their own runtime type:
//!
//! ```
//! use millrace::{Eff, Fin, HasCancel};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Clone)]
//! struct AppRuntime {
//!     token: CancellationToken,
//!     greeting: &'static str,
//! }
//!
//! impl HasCancel for AppRuntime {
//!     fn cancellation(&self) -> &CancellationToken {
//!         &self.token
//!     }
//!
//!     fn with_cancellation(&self, token: CancellationToken) -> Self {
//!         AppRuntime { token, ..self.clone() }
//!     }
//! }
//!
//! let rt = AppRuntime { token: CancellationToken::new(), greeting: "hello" };
//! let eff = Eff::<String, AppRuntime>::asks(|rt| format!("{}, world", rt.greeting));
//! assert_eq!(eff.run(&rt), Fin::Succ("hello, world".to_string()));
//! ```

use tokio_util::sync::CancellationToken;

/// An environment that carries a cancellation capability.
pub trait HasCancel: Clone + Send + Sync + 'static {
    /// The token observed by every `run` and every schedule wait.
    fn cancellation(&self) -> &CancellationToken;

    /// The same environment observing `token` instead.
    fn with_cancellation(&self, token: CancellationToken) -> Self;

    /// Returns true once the token has been cancelled.
    fn is_cancelled(&self) -> bool {
        self.cancellation().is_cancelled()
    }

    /// Cancel every effect running under this environment.
    fn cancel(&self) {
        self.cancellation().cancel()
    }
}

/// The default environment: just a cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    token: CancellationToken,
}

impl Runtime {
    /// A fresh, uncancelled runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime observing an existing token.
    pub fn with_token(token: CancellationToken) -> Self {
        Runtime { token }
    }

    /// A child runtime.
    ///
    /// Cancelling the parent cancels the child; cancelling the child leaves the
    /// parent running.
    pub fn local_cancel(&self) -> Self {
        Runtime {
            token: self.token.child_token(),
        }
    }
}

impl HasCancel for Runtime {
    fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    fn with_cancellation(&self, token: CancellationToken) -> Self {
        Runtime { token }
    }
}
