//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code never sleeps. The reveal engine waits on its
//! next timer deadline or on surface events, nothing else.
//! **Exceptions**: test code (everything after `#[cfg(test)]`, and `tests/`).

use architectural_enforcement::scan;

const PRODUCTION_DIRS: &[&str] = &["reveal/core/src", "reveal/cli/src", "tui/src"];

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(PRODUCTION_DIRS, is_sleep_call);

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Wait on a deadline instead:");
        eprintln!("  - Scheduler::schedule_once / schedule_periodic");
        eprintln!("  - tokio::time::sleep_until(next_deadline) in the event loop");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(is_sleep_call("tokio::time::sleep(d).await;"));
    assert!(!is_sleep_call("tokio::time::sleep_until(deadline).await"));
}
