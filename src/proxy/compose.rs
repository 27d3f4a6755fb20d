//! The four proxy compositions.
//!
//! Every walk here is a loop over proxy nodes. Exchanges between the two
//! sides are resolved in place; only nodes that must surface to the caller
//! (the outer ends, effect steps, or completion) return, carrying a
//! continuation that re-enters the loop.
//!
//! A composition starts as a deferred step, so building one runs nothing.
//! A walk also hands control back as a deferred step after
//! [`EXCHANGE_BUDGET`] exchanges, which keeps the interpreter's cancellation
//! check and panic capture in reach of pipelines that never reach an effect.

use std::sync::Arc;

use super::{Next, Proxy};
use crate::runtime::HasCancel;

/// Exchanges a walk resolves before yielding to the interpreter.
pub const EXCHANGE_BUDGET: usize = 1024;

/// Respond composition (`//>`): substitute every `Respond(b, k)` in `p` with
/// `f(b)`, resuming `p` with the result of `f(b)`.
///
/// With [`respond`](super::respond) as the identity this forms a category:
/// `compose(respond(x), f) == f(x)` and `compose(p, respond) == p`.
pub fn compose<RT, X1, X, B1, B, C1, C, R, F>(p: Proxy<RT, X1, X, B1, B, R>, f: F) -> Proxy<RT, X1, X, C1, C, R>
where
    RT: HasCancel,
    X1: Send + 'static,
    X: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(B) -> Proxy<RT, X1, X, C1, C, B1> + Send + Sync + 'static,
{
    Proxy::defer(move || respond_loop(p, Arc::new(f)))
}

fn respond_loop<RT, X1, X, B1, B, C1, C, R, F>(mut p: Proxy<RT, X1, X, B1, B, R>, f: Arc<F>) -> Proxy<RT, X1, X, C1, C, R>
where
    RT: HasCancel,
    X1: Send + 'static,
    X: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(B) -> Proxy<RT, X1, X, C1, C, B1> + Send + Sync + 'static,
{
    let mut budget = EXCHANGE_BUDGET;
    loop {
        match p {
            Proxy::Request(x1, k) => {
                return Proxy::Request(x1, Box::new(move |x| respond_loop(k(x), f)));
            }
            Proxy::Respond(b, k) => {
                if budget == 0 {
                    return Proxy::defer(move || respond_loop(Proxy::Respond(b, k), f));
                }
                budget -= 1;
                let reply = f(b);
                match reply {
                    Proxy::Pure(b1) => p = k(b1),
                    step => return step.and_then(move |b1| respond_loop(k(b1), f)),
                }
            }
            Proxy::M(step) => return Proxy::M(step.map(move |next| respond_loop(next, f))),
            Proxy::Pure(r) => return Proxy::Pure(r),
        }
    }
}

/// Request composition (`>\\`): substitute every `Request(b1, k)` in `p`
/// with `f(b1)`, resuming `p` with the result of `f(b1)`.
///
/// The dual of [`compose`], with [`request`](super::request) as identity.
pub fn request_compose<RT, A1, A, B1, B, Y1, Y, R, F>(f: F, p: Proxy<RT, B1, B, Y1, Y, R>) -> Proxy<RT, A1, A, Y1, Y, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    Y1: Send + 'static,
    Y: Send + 'static,
    R: Send + 'static,
    F: Fn(B1) -> Proxy<RT, A1, A, Y1, Y, B> + Send + Sync + 'static,
{
    Proxy::defer(move || request_loop(Arc::new(f), p))
}

fn request_loop<RT, A1, A, B1, B, Y1, Y, R, F>(f: Arc<F>, mut p: Proxy<RT, B1, B, Y1, Y, R>) -> Proxy<RT, A1, A, Y1, Y, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    Y1: Send + 'static,
    Y: Send + 'static,
    R: Send + 'static,
    F: Fn(B1) -> Proxy<RT, A1, A, Y1, Y, B> + Send + Sync + 'static,
{
    let mut budget = EXCHANGE_BUDGET;
    loop {
        match p {
            Proxy::Request(b1, k) => {
                if budget == 0 {
                    return Proxy::defer(move || request_loop(f, Proxy::Request(b1, k)));
                }
                budget -= 1;
                let reply = f(b1);
                match reply {
                    Proxy::Pure(b) => p = k(b),
                    step => return step.and_then(move |b| request_loop(f, k(b))),
                }
            }
            Proxy::Respond(y, k) => {
                return Proxy::Respond(y, Box::new(move |y1| request_loop(f, k(y1))));
            }
            Proxy::M(step) => return Proxy::M(step.map(move |next| request_loop(f, next))),
            Proxy::Pure(r) => return Proxy::Pure(r),
        }
    }
}

/// Which side of a pull/push composition currently has control.
enum Link<RT, A1, A, B1, B, C1, C, R> {
    /// Downstream runs; upstream is parked waiting for its next request.
    Pull(Next<B1, Proxy<RT, A1, A, B1, B, R>>, Proxy<RT, B1, B, C1, C, R>),
    /// Upstream runs; downstream is parked waiting for its next answer.
    Push(Proxy<RT, A1, A, B1, B, R>, Next<B, Proxy<RT, B1, B, C1, C, R>>),
}

fn drive<RT, A1, A, B1, B, C1, C, R>(mut link: Link<RT, A1, A, B1, B, C1, C, R>) -> Proxy<RT, A1, A, C1, C, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
{
    let mut budget = EXCHANGE_BUDGET;
    loop {
        if budget == 0 {
            return Proxy::defer(move || drive(link));
        }
        budget -= 1;
        link = match link {
            Link::Pull(up, down) => match down {
                Proxy::Request(b1, k) => Link::Push(up(b1), k),
                Proxy::Respond(c, k) => {
                    return Proxy::Respond(c, Box::new(move |c1| drive(Link::Pull(up, k(c1)))));
                }
                Proxy::M(step) => return Proxy::M(step.map(move |down| drive(Link::Pull(up, down)))),
                Proxy::Pure(r) => return Proxy::Pure(r),
            },
            Link::Push(up, down) => match up {
                Proxy::Request(a1, k) => {
                    return Proxy::Request(a1, Box::new(move |a| drive(Link::Push(k(a), down))));
                }
                Proxy::Respond(b, k) => Link::Pull(k, down(b)),
                Proxy::M(step) => return Proxy::M(step.map(move |up| drive(Link::Push(up, down)))),
                Proxy::Pure(r) => return Proxy::Pure(r),
            },
        };
    }
}

/// Pull composition (`+>>`): run `p`; its first request starts `f`, and from
/// then on the two sides trade requests and answers.
///
/// Whichever side finishes first finishes the composite.
pub fn pull_compose<RT, A1, A, B1, B, C1, C, R, F>(f: F, p: Proxy<RT, B1, B, C1, C, R>) -> Proxy<RT, A1, A, C1, C, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: FnOnce(B1) -> Proxy<RT, A1, A, B1, B, R> + Send + 'static,
{
    Proxy::defer(move || drive(Link::Pull(Box::new(f), p)))
}

/// Push composition (`>>~`): run `p`; its first answer starts `f`, and from
/// then on the two sides trade answers and requests.
pub fn push_compose<RT, A1, A, B1, B, C1, C, R, F>(p: Proxy<RT, A1, A, B1, B, R>, f: F) -> Proxy<RT, A1, A, C1, C, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: FnOnce(B) -> Proxy<RT, B1, B, C1, C, R> + Send + 'static,
{
    Proxy::defer(move || drive(Link::Push(p, Box::new(f))))
}

/// Kleisli form of [`pull_compose`] (`>+>`).
///
/// [`pull`](super::pull) is its identity on both sides.
pub fn pull_then<RT, A1, A, B1, B, C1, C, X, R, F, G>(f: F, g: G) -> impl Fn(X) -> Proxy<RT, A1, A, C1, C, R> + Send + Sync + 'static
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(B1) -> Proxy<RT, A1, A, B1, B, R> + Send + Sync + 'static,
    G: Fn(X) -> Proxy<RT, B1, B, C1, C, R> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    move |x| {
        let f = Arc::clone(&f);
        pull_compose(move |b1| f(b1), g(x))
    }
}

/// Kleisli form of [`push_compose`] (`>~>`).
///
/// [`push`](super::push) is its identity on both sides.
pub fn push_then<RT, A1, A, B1, B, C1, C, X, R, F, G>(f: F, g: G) -> impl Fn(X) -> Proxy<RT, A1, A, C1, C, R> + Send + Sync + 'static
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B1: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(X) -> Proxy<RT, A1, A, B1, B, R> + Send + Sync + 'static,
    G: Fn(B) -> Proxy<RT, B1, B, C1, C, R> + Send + Sync + 'static,
{
    let g = Arc::new(g);
    move |x| {
        let g = Arc::clone(&g);
        push_compose(f(x), move |b| g(b))
    }
}

/// Feed `upstream`'s output into `downstream` (`>->`).
///
/// ```
/// use millrace::proxy::{self, pipes, producer, Producer};
/// use millrace::{Eff, Fin, Runtime};
///
/// let squares: Producer<Runtime, u64, ()> =
///     proxy::pipe(producer::each(1..=4u64), pipes::map(|x: u64| x * x));
/// let all: Eff<Vec<u64>> = producer::collect(squares);
/// assert_eq!(all.run_standalone(), Fin::Succ(vec![1, 4, 9, 16]));
/// ```
pub fn pipe<RT, A1, A, B, C1, C, R>(
    upstream: Proxy<RT, A1, A, (), B, R>,
    downstream: Proxy<RT, (), B, C1, C, R>,
) -> Proxy<RT, A1, A, C1, C, R>
where
    RT: HasCancel,
    A1: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    C1: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
{
    pull_compose(move |()| upstream, downstream)
}
