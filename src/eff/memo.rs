use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::Eff;
use crate::runtime::HasCancel;
use crate::Fin;

/// A shared, run-once handle to an effect's outcome.
///
/// Every [`Memo::eff`] returns an effect that evaluates the wrapped effect on
/// first run and replays the cached [`Fin`] afterwards, including failures.
/// Concurrent first runs are serialized.
///
/// ```
/// use millrace::{Eff, Fin};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let memo = Eff::<usize>::lift(move || counter.fetch_add(1, Ordering::SeqCst) + 1).memo();
///
/// assert_eq!(memo.eff().run_standalone(), Fin::Succ(1));
/// assert_eq!(memo.eff().run_standalone(), Fin::Succ(1));
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct Memo<A, RT> {
    inner: Arc<MemoInner<A, RT>>,
}

struct MemoInner<A, RT> {
    outcome: OnceLock<Fin<A>>,
    pending: Mutex<Option<Eff<A, RT>>>,
}

impl<A, RT> Clone for Memo<A, RT> {
    fn clone(&self) -> Self {
        Memo {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: fmt::Debug, RT> fmt::Debug for Memo<A, RT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("outcome", &self.inner.outcome.get())
            .finish()
    }
}

impl<A, RT> Memo<A, RT>
where
    A: Clone + Send + Sync + 'static,
    RT: HasCancel,
{
    pub(super) fn new(eff: Eff<A, RT>) -> Self {
        Memo {
            inner: Arc::new(MemoInner {
                outcome: OnceLock::new(),
                pending: Mutex::new(Some(eff)),
            }),
        }
    }

    /// An effect yielding the cached outcome, evaluating it on first run.
    pub fn eff(&self) -> Eff<A, RT> {
        let inner = Arc::clone(&self.inner);
        Eff::new(move |rt| {
            inner
                .outcome
                .get_or_init(|| match inner.pending.lock().take() {
                    Some(eff) => eff.run(rt),
                    None => Fin::Bottom,
                })
                .clone()
        })
    }

    /// Returns true once the wrapped effect has been evaluated.
    pub fn is_evaluated(&self) -> bool {
        self.inner.outcome.get().is_some()
    }
}
