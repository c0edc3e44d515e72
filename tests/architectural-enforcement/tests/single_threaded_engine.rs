//! Integration Test: Single-Threaded Engine
//!
//! **Policy**: The reveal engine (`reveal/core/src`) runs on the caller's
//! task. Timers, surface events and signals all arrive through one
//! `select!` loop, so the engine never spawns threads or tasks and never
//! takes a lock around its state.
//!
//! Surface backends may spawn their own input readers; they talk to the
//! engine through the event channel only.

use architectural_enforcement::scan;

const ENGINE_DIRS: &[&str] = &["reveal/core/src"];

fn is_spawn(code: &str) -> bool {
    code.contains("thread::spawn")
        || code.contains("tokio::spawn")
        || code.contains("task::spawn")
        || code.contains("spawn_blocking")
}

fn is_shared_lock(code: &str) -> bool {
    code.contains("Mutex<") || code.contains("RwLock<")
}

#[test]
fn test_engine_does_not_spawn() {
    let violations = scan(ENGINE_DIRS, is_spawn);

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: The reveal engine spawns concurrent work!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Deliver work as a LoopEvent and handle it in the event loop.");

        panic!("\nFound {} spawn violation(s) in reveal/core.", violations.len());
    }
}

#[test]
fn test_engine_state_is_not_locked() {
    let violations = scan(ENGINE_DIRS, is_shared_lock);

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} lock(s) in reveal/core; engine state is owned by the loop.",
            violations.len()
        );
    }
}
