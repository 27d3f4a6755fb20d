use super::{absurd, Effect, Lift, Proxy};
use crate::aff::Aff;
use crate::eff::Eff;
use crate::error::Error;
use crate::fin::Fin;
use crate::runtime::HasCancel;

/// Interpret a closed pipeline synchronously.
///
/// Effect steps run in order against the runtime; the first `Fail` or
/// `Bottom` ends the walk. An asynchronous step fails with
/// [`codes::ASYNC_IN_SYNC`](crate::error::codes::ASYNC_IN_SYNC); use
/// [`run_effect_async`] for pipelines that contain one.
///
/// ```
/// use millrace::proxy::{self, consumer, producer, Effect};
/// use millrace::{Fin, Runtime};
///
/// let effect: Effect<Runtime, ()> =
///     proxy::pipe(producer::each(0..3), consumer::drain());
/// assert_eq!(proxy::run_effect(effect).run_standalone(), Fin::Succ(()));
/// ```
pub fn run_effect<RT, R>(effect: Effect<RT, R>) -> Eff<R, RT>
where
    RT: HasCancel,
    R: Send + 'static,
{
    Eff::new(move |rt: &RT| {
        let mut current = effect;
        let mut steps = 0u64;
        loop {
            current = match current {
                Proxy::Pure(r) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(steps, "effect finished");
                    return Fin::Succ(r);
                }
                Proxy::M(Lift::Sync(step)) => {
                    steps += 1;
                    match step.run(rt) {
                        Fin::Succ(next) => next,
                        Fin::Fail(e) => return Fin::Fail(e),
                        Fin::Bottom => return Fin::Bottom,
                    }
                }
                Proxy::M(Lift::Async(_)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(steps, "asynchronous step in synchronous run");
                    return Fin::Fail(Error::async_in_sync());
                }
                Proxy::Request(void, _) => absurd(void),
                Proxy::Respond(void, _) => absurd(void),
            };
        }
    })
}

/// Interpret a closed pipeline, awaiting asynchronous steps.
pub fn run_effect_async<RT, R>(effect: Effect<RT, R>) -> Aff<R, RT>
where
    RT: HasCancel,
    R: Send + 'static,
{
    Aff::new(move |rt: RT| async move {
        let mut current = effect;
        let mut steps = 0u64;
        loop {
            current = match current {
                Proxy::Pure(r) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(steps, "effect finished");
                    return Fin::Succ(r);
                }
                Proxy::M(step) => {
                    steps += 1;
                    let outcome = match step {
                        Lift::Sync(eff) => eff.run(&rt),
                        Lift::Async(aff) => aff.run(&rt).await,
                    };
                    match outcome {
                        Fin::Succ(next) => next,
                        Fin::Fail(e) => return Fin::Fail(e),
                        Fin::Bottom => return Fin::Bottom,
                    }
                }
                Proxy::Request(void, _) => absurd(void),
                Proxy::Respond(void, _) => absurd(void),
            };
        }
    })
}
