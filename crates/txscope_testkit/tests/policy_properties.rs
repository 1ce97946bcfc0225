//! Release guarantees hold under every policy combination.

use proptest::prelude::*;
use txscope_core::{current, ResourceHandle, ScopeError, ScopeResult};
use txscope_testkit::prelude::*;

proptest! {
    /// A successful unit of work leaves no trace unless the policy keeps the
    /// handle open, and read-only runs never touch the transaction.
    #[test]
    fn successful_run_release_guarantees(policy in policies()) {
        let t = TestRunner::new();

        with_context(|| {
            t.runner.run("default", policy, |_| Ok(())).unwrap();

            let handle = t.last_handle();
            if policy.read_only {
                prop_assert_eq!(handle.begins(), 0);
                prop_assert_eq!(handle.commits(), 0);
                prop_assert_eq!(handle.rollbacks(), 0);
            }
            if policy.keep_open {
                prop_assert!(handle.is_open());
                prop_assert_eq!(handle.commits(), 0);
                prop_assert_eq!(
                    current().is_ok(),
                    policy.visible_in_context,
                    "kept-open handles are visible iff the policy says so"
                );
            } else {
                prop_assert!(!handle.is_open());
                prop_assert_eq!(handle.closes(), 1);
                prop_assert!(matches!(current(), Err(ScopeError::NoActiveResource)));
                if !policy.read_only {
                    prop_assert_eq!(handle.commits(), 1);
                }
            }
            Ok(())
        })?;
    }

    /// A failing unit of work always releases the handle, keep-open or not,
    /// and the original error is what propagates.
    #[test]
    fn failing_run_always_releases(policy in policies()) {
        let t = TestRunner::new();

        with_context(|| {
            let err = t
                .runner
                .run("default", policy, |_| -> ScopeResult<()> {
                    Err(ScopeError::work("injected"))
                })
                .unwrap_err();
            prop_assert!(
                matches!(err, ScopeError::Work { .. }),
                "expected ScopeError::Work, got {:?}",
                err
            );

            let handle = t.last_handle();
            prop_assert!(!handle.is_open());
            prop_assert_eq!(handle.closes(), 1);
            prop_assert_eq!(handle.commits(), 0);
            if !policy.read_only {
                prop_assert_eq!(handle.rollbacks(), 1);
            }
            prop_assert!(matches!(current(), Err(ScopeError::NoActiveResource)));
            Ok(())
        })?;
    }
}
