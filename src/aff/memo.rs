use std::fmt;
use std::mem;
use std::sync::Arc;

use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{Aff, BoxFuture};
use crate::runtime::HasCancel;
use crate::Fin;

type Evaluation<A> = Shared<BoxFuture<'static, Fin<A>>>;

/// A shared, run-once handle to an asynchronous effect's outcome.
///
/// The first run starts a single evaluation that every later run awaits.
/// That evaluation runs under a token of its own, so a caller that is
/// cancelled or dropped only stops waiting; the next caller picks the same
/// evaluation up where it was left.
pub struct AsyncMemo<A, RT> {
    inner: Arc<Mutex<Slot<A, RT>>>,
}

enum Slot<A, RT> {
    Pending(Aff<A, RT>),
    Started(Evaluation<A>),
    Vacant,
}

impl<A, RT> Clone for AsyncMemo<A, RT> {
    fn clone(&self) -> Self {
        AsyncMemo {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, RT> fmt::Debug for AsyncMemo<A, RT>
where
    A: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match &*self.inner.lock() {
            Slot::Started(evaluation) => evaluation.peek().cloned(),
            _ => None,
        };
        f.debug_struct("AsyncMemo").field("outcome", &outcome).finish()
    }
}

impl<A, RT> AsyncMemo<A, RT>
where
    A: Clone + Send + Sync + 'static,
    RT: HasCancel,
{
    pub(super) fn new(aff: Aff<A, RT>) -> Self {
        AsyncMemo {
            inner: Arc::new(Mutex::new(Slot::Pending(aff))),
        }
    }

    /// An effect yielding the cached outcome, evaluating it on first run.
    pub fn aff(&self) -> Aff<A, RT> {
        let inner = Arc::clone(&self.inner);
        Aff::new(move |rt: RT| evaluation(&inner, &rt))
    }

    /// Returns true once the wrapped effect has been evaluated.
    pub fn is_evaluated(&self) -> bool {
        matches!(&*self.inner.lock(), Slot::Started(evaluation) if evaluation.peek().is_some())
    }
}

fn evaluation<A, RT>(slot: &Mutex<Slot<A, RT>>, rt: &RT) -> Evaluation<A>
where
    A: Clone + Send + Sync + 'static,
    RT: HasCancel,
{
    let detached = rt.with_cancellation(CancellationToken::new());
    let mut slot = slot.lock();
    let evaluation = match mem::replace(&mut *slot, Slot::Vacant) {
        Slot::Pending(aff) => async move { aff.run(&detached).await }.boxed().shared(),
        Slot::Started(evaluation) => evaluation,
        Slot::Vacant => unreachable!("memo slot is only vacant while locked"),
    };
    *slot = Slot::Started(evaluation.clone());
    evaluation
}
