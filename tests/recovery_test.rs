//! Tests for faults: propagation, typed recovery and panic capture.

use std::panic;

use inquest::{
    checks, validate, validate_named, BoxError, CheckKey, Fault, OutcomeExt, PanicPolicy, Params,
    Status, Validator, ValidatorConfig, Violation,
};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("lookup of {0} failed")]
struct LookupFailed(String);

#[derive(Debug, thiserror::Error)]
#[error("storage offline")]
struct StorageOffline;

fn lookup(id: &str) -> Result<bool, LookupFailed> {
    Err(LookupFailed(id.to_string()))
}

#[test]
fn test_nested_error_aborts_with_that_exact_error() {
    let outcome = validate_named(&"u1".to_string(), "user", |user| {
        user.field("name", "", |name| {
            name.apply(&checks::not_blank())?;
            Ok(())
        })?;
        user.field("id", user.subject(), |id| {
            id.field("remote", id.subject(), |remote| {
                lookup(remote.subject())?;
                Ok(())
            })?;
            Ok(())
        })?;
        user.field("never", "", |_| panic!("sibling after a fault must not run"))?;
        Ok(())
    });

    let fault = outcome.unwrap_err();
    assert_eq!(
        fault.downcast_ref::<LookupFailed>(),
        Some(&LookupFailed("u1".to_string()))
    );
    assert!(fault.is_recoverable());
    assert_eq!(fault.to_string(), "validation block raised an error: lookup of u1 failed");
}

#[test]
fn test_recover_from_replaces_matching_fault() {
    let status = validate_named(&"u2".to_string(), "user", |user| {
        let id = user.field("id", user.subject(), |id| {
            lookup(id.subject())?;
            Ok(())
        });
        user.recover_from::<LookupFailed, _>(id, |_| Ok(Status::Valid))?;
        user.field("name", "", |name| {
            name.apply(&checks::not_blank())?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    // Violations found before and after the recovered fault are kept.
    assert_eq!(status.violations().unwrap().paths(), vec!["user.name"]);
}

#[test]
fn test_recovered_violations_reach_the_result() {
    let status = validate_named(&"u3".to_string(), "user", |user| {
        let id = user.field("id", user.subject(), |id| {
            lookup(id.subject())?;
            Ok(())
        });
        let id_path = user.path().push_name("id")?;
        user.recover_from::<LookupFailed, _>(id, |err| {
            let unknown = Violation::new(
                id_path,
                CheckKey::new("known_user"),
                Params::none(),
                format!("{:?}", user.subject()),
                err.to_string(),
            );
            Ok(Status::from(unknown))
        })?;
        user.field("name", "", |name| {
            name.apply(&checks::not_blank())?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    let violations = status.violations().unwrap();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations.paths(), vec!["user.id", "user.name"]);
    assert_eq!(violations.first().message, "lookup of u3 failed");
}

#[test]
fn test_recover_from_ignores_other_types() {
    let outcome = validate(&(), |v| {
        let store = v.field("store", &(), |_| Err(StorageOffline.into()));
        v.recover_from::<LookupFailed, _>(store, |_| Ok(Status::Valid))?;
        Ok(())
    });
    assert!(outcome.unwrap_err().is::<StorageOffline>());
}

#[test]
fn test_fatal_types_are_never_recovered() {
    let validator = Validator::with_config(ValidatorConfig::new().fatal::<StorageOffline>());

    let outcome = validator.validate(&(), |v| {
        let store =
            v.field("store", &(), |_| -> Result<(), BoxError> { Err(Box::new(StorageOffline)) });
        v.recover_from::<StorageOffline, _>(store, |_| Ok(Status::Valid))?;
        Ok(())
    });

    let fault = outcome.unwrap_err();
    assert!(fault.is::<StorageOffline>());
    assert!(!fault.is_recoverable());
}

#[test]
fn test_duplicate_scope_is_never_recoverable() {
    let outcome = validate_named(&1, "n", |v| {
        v.field("a", &1, |_| Ok(()))?;
        let duplicate = v.field("a", &2, |_| Ok(()));
        v.recover_from::<Fault, _>(duplicate, |_| Ok(Status::Valid))?;
        Ok(())
    });

    let fault = outcome.unwrap_err();
    assert!(fault.is_scope_error());
    assert!(!fault.is_recoverable());
}

#[test]
fn test_panics_propagate_by_default() {
    let result = panic::catch_unwind(|| {
        let _ = validate(&1, |v| {
            v.field("x", &1, |_| panic!("boom"))?;
            Ok(())
        });
    });
    assert!(result.is_err());
}

#[test]
fn test_captured_panic_aborts_the_validation() {
    let validator =
        Validator::with_config(ValidatorConfig::new().with_panic_policy(PanicPolicy::Capture));

    let outcome = validator.validate_named(&vec![1, 2, 3], "items", |items| {
        items.each_element(|item| {
            if *item.subject() == 2 {
                panic!("cannot handle {}", item.subject());
            }
            Ok(())
        })?;
        Ok(())
    });

    match outcome {
        Err(Fault::Panicked(message)) => assert_eq!(message, "cannot handle 2"),
        other => panic!("expected a captured panic, got {:?}", other),
    }
}

#[test]
fn test_into_result_carries_the_fault() {
    let err = validate(&(), |v| {
        v.field("store", &(), |_| Err(StorageOffline.into()))?;
        Ok(())
    })
    .into_result()
    .unwrap_err();

    assert!(err.violations().is_none());
    assert_eq!(err.to_string(), "validation block raised an error: storage offline");
}
