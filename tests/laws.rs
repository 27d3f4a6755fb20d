//! Property-based tests for the algebraic laws.
//!
//! - Monad laws for `Eff`, `Aff` and `Proxy`
//! - Category laws for respond, request, pull and push composition
//!
//! Proxies are compared by walking them against the same scripted inputs and
//! recording every request, response and result along the way.

use millrace::proxy::{
    compose, pull, pull_then, push, push_then, request, request_compose, respond, Lift, Proxy,
};
use millrace::{Aff, Eff, Error, Fin, Runtime};
use proptest::prelude::*;

type Open = Proxy<Runtime, u32, u32, u32, u32, u32>;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Req(u32),
    Resp(u32),
    Done(u32),
    Failed(Error),
}

fn trace(mut p: Open, inputs: &[u32]) -> Vec<Event> {
    let mut events = Vec::new();
    let mut inputs = inputs.iter().copied();
    loop {
        p = match p {
            Proxy::Request(a1, k) => {
                events.push(Event::Req(a1));
                match inputs.next() {
                    Some(a) => k(a),
                    None => return events,
                }
            }
            Proxy::Respond(b, k) => {
                events.push(Event::Resp(b));
                match inputs.next() {
                    Some(b1) => k(b1),
                    None => return events,
                }
            }
            Proxy::M(Lift::Sync(eff)) => match eff.run_standalone() {
                Fin::Succ(next) => next,
                Fin::Fail(e) => {
                    events.push(Event::Failed(e));
                    return events;
                }
                Fin::Bottom => return events,
            },
            Proxy::M(Lift::Async(_)) => unreachable!("law proxies are synchronous"),
            Proxy::Pure(r) => {
                events.push(Event::Done(r));
                return events;
            }
        };
    }
}

fn f(x: u32) -> Open {
    request(x.wrapping_add(1)).and_then(|a: u32| respond(a.wrapping_mul(2)))
}

fn g(x: u32) -> Open {
    respond(x ^ 3)
        .and_then(|b1: u32| Proxy::lift_eff(Eff::pure(b1.wrapping_add(5))))
        .and_then(request)
}

fn h(x: u32) -> Open {
    if x % 7 == 0 {
        return Proxy::lift_eff(Eff::fail(Error::coded(7, "seven")));
    }
    request(x).and_then(respond).and_then(|b1| respond(b1 / 2))
}

fn inputs() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..12)
}

// =============================================================================
// Eff / Aff monad laws
// =============================================================================

fn eff_f(n: i32) -> Eff<i32> {
    if n % 5 == 0 {
        Eff::fail(Error::coded(n, "multiple of five"))
    } else {
        Eff::pure(n.wrapping_mul(3))
    }
}

fn eff_g(n: i32) -> Eff<i32> {
    if n % 11 == 0 {
        Eff::bottom()
    } else {
        Eff::pure(n.wrapping_sub(4))
    }
}

proptest! {
    #[test]
    fn prop_eff_left_identity(value: i32) {
        let left = Eff::pure(value).and_then(eff_f).run_standalone();
        let right = eff_f(value).run_standalone();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_eff_right_identity(value: i32) {
        let left = eff_f(value).and_then(Eff::pure).run_standalone();
        let right = eff_f(value).run_standalone();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_eff_associativity(value: i32) {
        let left = eff_f(value).and_then(eff_g).and_then(eff_f).run_standalone();
        let right = eff_f(value)
            .and_then(|x| eff_g(x).and_then(eff_f))
            .run_standalone();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_eff_functor_composition(value: i32) {
        let left = eff_g(value).map(|x| x.wrapping_add(1)).map(|x| x.wrapping_mul(2)).run_standalone();
        let right = eff_g(value).map(|x| x.wrapping_add(1).wrapping_mul(2)).run_standalone();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_aff_monad_laws(value: i32) {
        let aff_f = |n: i32| eff_f(n).to_aff();
        let aff_g = |n: i32| eff_g(n).to_aff();
        tokio_test::block_on(async {
            let left = Aff::pure(value).and_then(aff_f).run_standalone().await;
            assert_eq!(left, aff_f(value).run_standalone().await);

            let left = aff_f(value).and_then(Aff::pure).run_standalone().await;
            assert_eq!(left, aff_f(value).run_standalone().await);

            let left = aff_f(value).and_then(aff_g).and_then(aff_f).run_standalone().await;
            let right = aff_f(value)
                .and_then(move |x| aff_g(x).and_then(aff_f))
                .run_standalone()
                .await;
            assert_eq!(left, right);
        });
    }

    #[test]
    fn prop_catch_code_recovers_only_its_code(code in -100i32..100) {
        let fin = Eff::<i32>::fail(Error::coded(code, "x"))
            .catch_code(42, |_| Eff::pure(0))
            .run_standalone();
        if code == 42 {
            prop_assert_eq!(fin, Fin::Succ(0));
        } else {
            prop_assert_eq!(fin, Fin::Fail(Error::coded(code, "x")));
        }
    }
}

// =============================================================================
// Proxy monad laws
// =============================================================================

proptest! {
    #[test]
    fn prop_proxy_left_identity(value: u32, script in inputs()) {
        let left = trace(Proxy::pure(value).and_then(g), &script);
        let right = trace(g(value), &script);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_proxy_right_identity(value: u32, script in inputs()) {
        let left = trace(h(value).and_then(Proxy::pure), &script);
        let right = trace(h(value), &script);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_proxy_associativity(value: u32, script in inputs()) {
        let left = trace(f(value).and_then(g).and_then(h), &script);
        let right = trace(f(value).and_then(|x| g(x).and_then(h)), &script);
        prop_assert_eq!(left, right);
    }
}

// =============================================================================
// Category laws
// =============================================================================

proptest! {
    #[test]
    fn prop_respond_category(value: u32, script in inputs()) {
        prop_assert_eq!(trace(compose(respond(value), g), &script), trace(g(value), &script));
        prop_assert_eq!(trace(compose(h(value), respond), &script), trace(h(value), &script));

        let left = compose(compose(f(value), g), h);
        let right = compose(f(value), |x| compose(g(x), h));
        prop_assert_eq!(trace(left, &script), trace(right, &script));
    }

    #[test]
    fn prop_request_category(value: u32, script in inputs()) {
        prop_assert_eq!(trace(request_compose(g, request(value)), &script), trace(g(value), &script));
        prop_assert_eq!(trace(request_compose(request, h(value)), &script), trace(h(value), &script));

        let left = request_compose(|x| request_compose(f, g(x)), h(value));
        let right = request_compose(f, request_compose(g, h(value)));
        prop_assert_eq!(trace(left, &script), trace(right, &script));
    }

    #[test]
    fn prop_pull_category(value: u32, script in inputs()) {
        let left = pull_then(pull::<Runtime, u32, u32, u32>, g);
        prop_assert_eq!(trace(left(value), &script), trace(g(value), &script));

        let right = pull_then(h, pull::<Runtime, u32, u32, u32>);
        prop_assert_eq!(trace(right(value), &script), trace(h(value), &script));

        let identity = pull_then(pull::<Runtime, u32, u32, u32>, pull::<Runtime, u32, u32, u32>);
        prop_assert_eq!(trace(identity(value), &script), trace(pull(value), &script));

        let grouped_left = pull_then(pull_then(f, g), h);
        let grouped_right = pull_then(f, pull_then(g, h));
        prop_assert_eq!(trace(grouped_left(value), &script), trace(grouped_right(value), &script));
    }

    #[test]
    fn prop_push_category(value: u32, script in inputs()) {
        let left = push_then(push::<Runtime, u32, u32, u32>, g);
        prop_assert_eq!(trace(left(value), &script), trace(g(value), &script));

        let right = push_then(h, push::<Runtime, u32, u32, u32>);
        prop_assert_eq!(trace(right(value), &script), trace(h(value), &script));

        let identity = push_then(push::<Runtime, u32, u32, u32>, push::<Runtime, u32, u32, u32>);
        prop_assert_eq!(trace(identity(value), &script), trace(push(value), &script));

        let grouped_left = push_then(push_then(f, g), h);
        let grouped_right = push_then(f, push_then(g, h));
        prop_assert_eq!(trace(grouped_left(value), &script), trace(grouped_right(value), &script));
    }
}
