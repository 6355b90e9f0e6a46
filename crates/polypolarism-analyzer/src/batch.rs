//! Checking many units at once.
//!
//! Units share no state, so each worker checks whole units with its own
//! registry and results are put back in input order afterwards.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use polypolarism_syntax::Module;

use crate::checker::{check_module, CheckResult};

/// Results for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub path: Option<String>,
    pub results: Vec<CheckResult>,
}

impl UnitReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Check `units` on up to `jobs` worker threads. Reports come back in the
/// order of `units`.
pub fn check_units(units: &[Module], jobs: usize) -> Vec<UnitReport> {
    let workers = jobs.clamp(1, units.len().max(1));
    if workers == 1 {
        return units.iter().map(check_unit).collect();
    }

    let next = &AtomicUsize::new(0);
    let mut indexed: Vec<(usize, UnitReport)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(unit) = units.get(index) else {
                            break;
                        };
                        done.push((index, check_unit(unit)));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(done) => done,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, report)| report).collect()
}

fn check_unit(unit: &Module) -> UnitReport {
    tracing::debug!(
        path = unit.path.as_deref().unwrap_or("<unnamed>"),
        functions = unit.functions.len(),
        "checking unit"
    );
    UnitReport {
        path: unit.path.clone(),
        results: check_module(unit),
    }
}
