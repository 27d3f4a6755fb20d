//! Sinks that close the downstream end of a pipeline.

use super::pipes::cat;
use super::{compose, Consumer, Proxy};
use crate::eff::Eff;
use crate::runtime::HasCancel;

/// Wait for one value from upstream and finish with it.
pub fn await_<RT, A>() -> Consumer<RT, A, A>
where
    RT: HasCancel,
    A: Send + 'static,
{
    super::await_()
}

/// Accept and discard every value.
pub fn drain<RT, A, R>() -> Consumer<RT, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
{
    compose(cat(), |_| Proxy::Pure(()))
}

/// Pass every value to `f`.
pub fn sink<RT, A, R, F>(f: F) -> Consumer<RT, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    compose(cat(), move |a| {
        f(a);
        Proxy::Pure(())
    })
}

/// Run the effect `f` builds from every value.
///
/// A failing effect ends the pipeline with its error.
pub fn for_each_eff<RT, A, R, F>(f: F) -> Consumer<RT, A, R>
where
    RT: HasCancel,
    A: Send + 'static,
    R: Send + 'static,
    F: Fn(A) -> Eff<(), RT> + Send + Sync + 'static,
{
    compose(cat(), move |a| Proxy::lift_eff(f(a)))
}
