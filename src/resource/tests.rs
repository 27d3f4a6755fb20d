use std::time::Duration;

use super::*;
use crate::error::Error;
use crate::proxy::{self, consumer, pipes, producer, Effect};
use crate::runtime::Runtime;
use crate::testing::{Probe, Probed};
use crate::{assert_bottom, assert_fail, assert_succ};

fn acquire(probe: &Probe) -> Eff<Probed> {
    let probe = probe.clone();
    Eff::lift(move || probe.acquire())
}

#[test]
fn test_use_eff_releases_on_success() {
    let probe = Probe::new();
    let eff = use_eff(acquire(&probe), |h| Eff::pure(h.id() + 10));
    assert_eq!(probe.acquired(), 0);
    assert_succ!(eff.run_standalone(), 10);
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_use_eff_releases_on_failure_and_bottom() {
    let probe = Probe::new();
    let eff = use_eff(acquire(&probe), |_| Eff::<i32>::fail(Error::coded(7, "body")));
    assert_fail!(eff.run_standalone(), Error::coded(7, "body"));
    assert_eq!(probe.released(), 1);

    let eff = use_eff(acquire(&probe), |_| Eff::<i32>::bottom());
    assert_bottom!(eff.run_standalone());
    assert_eq!(probe.released(), 2);
}

#[test]
fn test_use_eff_releases_on_panic() {
    let probe = Probe::new();
    let eff = use_eff(acquire(&probe), |_| -> Eff<i32> { panic!("body exploded") });
    let error = eff.run_standalone().err().expect("panic must fail");
    assert!(error.is_panic());
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_failed_acquire_skips_body_and_release() {
    let probe = Probe::new();
    let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = std::sync::Arc::clone(&ran);
    let eff = use_eff(Eff::<Probed>::fail("no handle"), move |_| {
        flag.store(true, std::sync::atomic::Ordering::SeqCst);
        Eff::pure(1)
    });
    assert_fail!(eff.run_standalone());
    assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(probe.acquired(), 0);
    assert_eq!(probe.released(), 0);
}

#[test]
fn test_use_eff_releases_when_body_sees_cancellation() {
    let probe = Probe::new();
    let rt = Runtime::new();
    let eff = use_eff(acquire(&probe), |_| {
        Eff::asks(|rt: &Runtime| rt.cancel()).and_then(|()| Eff::pure(1))
    });
    assert_eq!(eff.run(&rt), Fin::Fail(Error::cancelled()));
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_use_with_passes_handle_to_release() {
    let closed = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&closed);
    let eff: Eff<usize> = use_with(
        Eff::pure(String::from("db")),
        move |name| sink.lock().push(name),
        |name| Eff::pure(name.len()),
    );
    assert_succ!(eff.run_standalone(), 2);
    assert_eq!(*closed.lock(), vec![String::from("db")]);
}

#[test]
fn test_guard_releases_once() {
    let probe = Probe::new();
    let guard = Guard::new(probe.acquire());
    assert_eq!(guard.get().id(), 0);
    guard.release();
    assert_eq!(probe.released(), 1);

    {
        let _guard = Guard::new(probe.acquire());
    }
    assert_eq!(probe.released(), 2);
}

#[test]
fn test_managed_deref() {
    let managed = Managed::new(vec![1, 2, 3], |_| {});
    assert_eq!(managed.len(), 3);
    assert_eq!(managed.get(), &vec![1, 2, 3]);
    assert!(format!("{managed:?}").contains("<function>"));
}

#[tokio::test]
async fn test_use_aff_releases_on_success_and_failure() {
    let probe = Probe::new();
    let handle = probe.clone();
    let aff: Aff<usize> = use_aff(Aff::from_future(async move { handle.acquire() }), |h| {
        Aff::pure(h.id())
    });
    assert_succ!(aff.run_standalone().await, 0);

    let handle = probe.clone();
    let aff: Aff<u8> = use_aff(Aff::from_future(async move { handle.acquire() }), |_| Aff::fail("x"));
    assert_fail!(aff.run_standalone().await);
    assert_eq!(probe.released(), 2);
}

#[tokio::test]
async fn test_use_aff_releases_on_cancellation() {
    let probe = Probe::new();
    let rt = Runtime::new();
    let canceller = rt.clone();
    let handle = probe.clone();
    let aff = use_aff(Aff::from_future(async move { handle.acquire() }), |_| {
        Aff::<()>::from_future(futures::future::pending())
    });
    let task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });
    assert_eq!(aff.run(&rt).await, Fin::Fail(Error::cancelled()));
    task.await.unwrap();
    assert_eq!(probe.acquired(), 1);
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_use_proxy_releases_when_section_ends() {
    let probe = Probe::new();
    let source = use_proxy(acquire(&probe), |h| producer::each(vec![h.id(), 1, 2]));
    let all: Eff<Vec<usize>> = producer::collect(source);
    assert_eq!(probe.acquired(), 0);
    assert_succ!(all.run_standalone(), vec![0, 1, 2]);
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_use_proxy_releases_when_abandoned() {
    let probe = Probe::new();
    let source = use_proxy(acquire(&probe), |_| producer::each(0..1_000));
    let effect: Effect<Runtime, ()> = proxy::pipe(proxy::pipe(source, pipes::take(3)), consumer::drain());
    assert_succ!(proxy::run_effect(effect).run_standalone(), ());
    assert_eq!(probe.acquired(), 1);
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_use_proxy_releases_when_pipeline_fails() {
    let probe = Probe::new();
    let source = use_proxy(acquire(&probe), |_| producer::each(0..10));
    let effect: Effect<Runtime, ()> = proxy::pipe(
        source,
        consumer::for_each_eff(|x: i32| {
            if x == 2 {
                Eff::fail(Error::coded(2, "two"))
            } else {
                Eff::pure(())
            }
        }),
    );
    assert_fail!(proxy::run_effect(effect).run_standalone(), Error::coded(2, "two"));
    assert_eq!(probe.released(), 1);
}

#[test]
fn test_use_proxy_failed_acquire() {
    let probe = Probe::new();
    let source = use_proxy(Eff::<Probed>::fail("closed"), |_| producer::each(0..3));
    let all: Eff<Vec<i32>> = producer::collect(source);
    assert_fail!(all.run_standalone());
    assert_eq!(probe.released(), 0);
}

#[tokio::test]
async fn test_use_proxy_async_acquire() {
    let probe = Probe::new();
    let handle = probe.clone();
    let source = use_proxy_async(Aff::from_future(async move { handle.acquire() }), |_| {
        producer::each(1..=3)
    });
    let total: Aff<i32> = producer::fold_async(source, 0, |s, x| s + x);
    assert_succ!(total.run_standalone().await, 6);
    assert_eq!(probe.released(), 1);
}

#[cfg(feature = "tracing")]
#[tracing_test::traced_test]
#[test]
fn test_release_is_logged() {
    let probe = Probe::new();
    let eff = use_eff(acquire(&probe), |_| Eff::pure(()));
    assert_succ!(eff.run_standalone(), ());
    assert!(logs_contain("releasing resource"));
}
