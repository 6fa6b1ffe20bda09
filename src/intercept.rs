use std::{
    cell::RefCell,
    marker::PhantomData,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc
    }
};

use crate::{
    classify::{ClassificationTable, Classifier},
    failure::RawFailure,
    ErrorKind,
    FsError
};

struct InstalledHandler {
    id: u64,
    classifier: Arc<dyn Classifier>,
}

thread_local! {
    static HANDLERS: RefCell<Vec<InstalledHandler>> = const { RefCell::new(Vec::new()) };
}

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// A failure handler installed for the lifetime of the guard.
///
/// Dropping the guard removes exactly the handler it installed, on every exit
/// path including unwinding. Guards nest; the innermost one handles failures.
pub struct HandlerScope {
    id: u64,
    // Handlers live on the installing thread's stack.
    _not_send: PhantomData<*const ()>,
}

impl HandlerScope {

    pub fn install(classifier: Arc<dyn Classifier>) -> Self {
        let id = NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed);
        HANDLERS.with(|handlers| {
            handlers.borrow_mut().push(InstalledHandler { id, classifier });
        });
        Self { id, _not_send: PhantomData }
    }

    pub fn depth() -> usize {
        HANDLERS.with(|handlers| handlers.borrow().len())
    }
}

impl Drop for HandlerScope {
    fn drop(&mut self) {
        HANDLERS.with(|handlers| {
            let mut handlers = handlers.borrow_mut();
            match handlers.last() {
                Some(top) if top.id == self.id => { handlers.pop(); },
                _ => {
                    error!(
                        "cl-fs: failure handler {} torn down out of order; {} handler(s) installed",
                        self.id,
                        handlers.len()
                    );
                    handlers.retain(|handler| handler.id != self.id);
                }
            }
        });
    }
}

/// Classifies `failure` with the innermost installed handler.
pub fn raise(failure: RawFailure) -> FsError {
    let classifier = HANDLERS.with(|handlers| {
        handlers.borrow().last().map(|handler| handler.classifier.clone())
    });

    let kind = match classifier {
        Some(classifier) => classifier.classify(&failure),
        None => {
            error!("cl-fs: failure raised outside of any handler scope: {}", failure);
            ClassificationTable::standard().classify(&failure)
        }
    };

    match kind {
        ErrorKind::UnknownError => warn!("cl-fs: unclassified host failure: {}", failure),
        ErrorKind::NotAWarning => error!("cl-fs: failure of unexpected severity: {}", failure),
        _ => {}
    }

    FsError::from_failure(kind, failure)
}

/// Runs one primitive call under a scoped handler.
pub fn intercept<T>(
    classifier: &Arc<dyn Classifier>,
    operation: &'static str,
    call: impl FnOnce() -> Result<T, RawFailure>
) -> Result<T, FsError> {
    let _scope = HandlerScope::install(classifier.clone());

    call().map_err(|failure| {
        let error = raise(failure);
        debug!("cl-fs: {} failed: {}", operation, error);
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify::OsErrorClassifier, failure::Severity};

    fn standard() -> Arc<dyn Classifier> {
        Arc::new(ClassificationTable::default())
    }

    #[test]
    fn test_success_passes_through() {
        let result = intercept(&standard(), "noop", || Ok::<_, RawFailure>(42));
        assert_eq!(result, Ok(42));
        assert_eq!(HandlerScope::depth(), 0);
    }

    #[test]
    fn test_failure_is_classified_and_preserved() {
        let result: Result<(), FsError> = intercept(&standard(), "unlink", || {
            Err(RawFailure::warning("unlink(/x): Is a directory").with_os_error(libc::EISDIR))
        });

        let error = result.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::IsADirectory);
        assert_eq!(error.message(), "unlink(/x): Is a directory");
        assert_eq!(error.code(), Severity::Warning.code());
        assert_eq!(HandlerScope::depth(), 0);
    }

    #[test]
    fn test_nested_calls_use_innermost_handler() {
        let by_errno: Arc<dyn Classifier> = Arc::new(OsErrorClassifier);

        let outer: Result<ErrorKind, FsError> = intercept(&standard(), "outer", || {
            assert_eq!(HandlerScope::depth(), 1);

            let inner: Result<(), FsError> = intercept(&by_errno, "inner", || {
                assert_eq!(HandlerScope::depth(), 2);
                Err(RawFailure::warning("no recognizable text").with_os_error(libc::ENOENT))
            });
            assert_eq!(HandlerScope::depth(), 1);

            Ok(inner.unwrap_err().kind())
        });

        assert_eq!(outer, Ok(ErrorKind::DoesNotExist));
        assert_eq!(HandlerScope::depth(), 0);

        // Outer handler is intact after the inner one is gone.
        let after: Result<(), FsError> = intercept(&standard(), "after", || {
            Err(RawFailure::warning("no recognizable text").with_os_error(libc::ENOENT))
        });
        assert_eq!(after.unwrap_err().kind(), ErrorKind::UnknownError);
    }

    #[test]
    fn test_handler_removed_on_panic() {
        let classifier = standard();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), FsError> = intercept(&classifier, "boom", || panic!("primitive panicked"));
        }));

        assert!(result.is_err());
        assert_eq!(HandlerScope::depth(), 0);
    }

    #[test]
    fn test_out_of_order_teardown_keeps_remaining_handler() {
        let outer = HandlerScope::install(standard());
        let inner = HandlerScope::install(Arc::new(OsErrorClassifier));

        drop(outer);
        assert_eq!(HandlerScope::depth(), 1);

        let error = raise(RawFailure::warning("x").with_os_error(libc::EEXIST));
        assert_eq!(error.kind(), ErrorKind::AlreadyExists);

        drop(inner);
        assert_eq!(HandlerScope::depth(), 0);
    }

    #[test]
    fn test_raise_without_scope_uses_standard_table() {
        let error = raise(RawFailure::warning("mkdir(/tmp): File exists"));
        assert_eq!(error.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_unexpected_severity() {
        let result: Result<(), FsError> = intercept(&standard(), "mkdir", || {
            Err(RawFailure::new("mkdir(): Permission denied", Severity::Error))
        });

        let error = result.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotAWarning);
        assert_eq!(error.code(), 1);
    }
}
