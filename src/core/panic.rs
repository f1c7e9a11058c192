//! Catching panics raised inside handler futures
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Per-future unwinding guard with backtrace capture

use futures_util::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// A recovered panic
#[derive(Debug, Clone)]
pub struct PanicReport {
    pub message: String,
    pub backtrace: String,
}

/// Chain a hook that records the panicking thread's backtrace
///
/// The payload is caught on the same thread that panicked, so the trace is
/// picked up from thread-local storage right after unwinding stops.
pub fn install_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Drive `fut` to completion, converting a panic into a [`PanicReport`]
pub async fn catch<F: Future>(fut: F) -> Result<F::Output, PanicReport> {
    install_hook();
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(output) => Ok(output),
        Err(payload) => {
            let backtrace = LAST_BACKTRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(|| "<no backtrace captured>".to_string());
            Err(PanicReport {
                message: describe(payload.as_ref()),
                backtrace,
            })
        }
    }
}

/// Best-effort rendering of a panic payload
pub fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<anyhow::Error>() {
        format!("{e:#}")
    } else if let Some(e) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        e.to_string()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Opaque;

    #[tokio::test]
    async fn test_ok_passes_through() {
        assert_eq!(catch(async { 5 }).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_str_panic_is_caught() {
        let report = catch(async { panic!("boom") }).await.unwrap_err();
        assert_eq!(report.message, "boom");
        assert!(!report.backtrace.is_empty());
    }

    #[tokio::test]
    async fn test_formatted_panic_is_caught() {
        let report = catch(async {
            let n = 3;
            panic!("bad value {n}");
        })
        .await
        .unwrap_err();
        assert_eq!(report.message, "bad value 3");
    }

    #[tokio::test]
    async fn test_error_payload() {
        let report = catch(async { std::panic::panic_any(anyhow::anyhow!("db gone")) })
            .await
            .unwrap_err();
        assert_eq!(report.message, "db gone");
    }

    #[tokio::test]
    async fn test_struct_payload() {
        let report = catch(async { std::panic::panic_any(Opaque) }).await.unwrap_err();
        assert_eq!(report.message, "<non-string panic payload>");
    }

    #[tokio::test]
    async fn test_panic_after_await() {
        let report = catch(async {
            tokio::task::yield_now().await;
            panic!("late");
        })
        .await
        .unwrap_err();
        assert_eq!(report.message, "late");
    }
}
