//! Guard-lock policy: a single readers/writer lock per
//! file-system object, applied per opcode according to the configured
//! strategy.

use parking_lot::RwLock;

use crate::abi::Opcode;

/// Selects how [`OperationGuard::enter`] maps each opcode onto the
/// underlying lock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuardStrategy {
    /// Every operation takes the lock exclusively.
    Coarse,
    /// Namespace-mutating opcodes take the lock exclusively; namespace-reading
    /// opcodes take it shared; everything else runs unguarded. Default.
    Fine,
}

impl Default for GuardStrategy {
    fn default() -> Self {
        GuardStrategy::Fine
    }
}

/// What [`GuardStrategy::Fine`] requires for a given opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LockMode {
    Exclusive,
    Shared,
    None,
}

fn fine_mode(opcode: Opcode) -> LockMode {
    match opcode {
        Opcode::SetVolumeInformation
        | Opcode::Flush
        | Opcode::Create
        | Opcode::Cleanup
        | Opcode::Rename
        | Opcode::SetReparsePoint
        | Opcode::SetInformation => LockMode::Exclusive,
        Opcode::QueryVolumeInformation | Opcode::Overwrite | Opcode::QueryDirectory | Opcode::GetReparsePoint => {
            LockMode::Shared
        }
        _ => LockMode::None,
    }
}

/// Held for the duration of one operation. Dropping it releases whatever
/// (if anything) was acquired.
pub enum OperationGuardToken<'a> {
    Exclusive(parking_lot::RwLockWriteGuard<'a, ()>),
    Shared(parking_lot::RwLockReadGuard<'a, ()>),
    None,
}

/// The per-file-system-object readers/writer lock plus the strategy
/// selecting how opcodes map onto it.
pub struct OperationGuard {
    lock: RwLock<()>,
    strategy: GuardStrategy,
}

impl OperationGuard {
    #[must_use]
    pub fn new(strategy: GuardStrategy) -> OperationGuard {
        OperationGuard {
            lock: RwLock::new(()),
            strategy,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> GuardStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: GuardStrategy) {
        self.strategy = strategy;
    }

    /// Acquires whatever lock mode `opcode` requires under the current
    /// strategy.
    #[must_use]
    pub fn enter(&self, opcode: Opcode) -> OperationGuardToken<'_> {
        let mode = match self.strategy {
            GuardStrategy::Coarse => LockMode::Exclusive,
            GuardStrategy::Fine => fine_mode(opcode),
        };
        match mode {
            LockMode::Exclusive => OperationGuardToken::Exclusive(self.lock.write()),
            LockMode::Shared => OperationGuardToken::Shared(self.lock.read()),
            LockMode::None => OperationGuardToken::None,
        }
    }
}

impl std::fmt::Debug for OperationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationGuard").field("strategy", &self.strategy).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fine_strategy_serializes_mutators_but_not_readers() {
        let guard = Arc::new(OperationGuard::new(GuardStrategy::Fine));
        let g1 = guard.clone();
        let t1 = thread::spawn(move || {
            let _token = g1.enter(Opcode::QueryDirectory);
            thread::sleep(Duration::from_millis(20));
        });
        thread::sleep(Duration::from_millis(5));
        let _token = guard.enter(Opcode::QueryVolumeInformation);
        t1.join().unwrap();
    }

    #[test]
    fn coarse_strategy_takes_exclusive_for_everything() {
        let guard = OperationGuard::new(GuardStrategy::Coarse);
        let token = guard.enter(Opcode::Read);
        assert!(matches!(token, OperationGuardToken::Exclusive(_)));
    }

    #[test]
    fn unlisted_opcode_runs_unguarded_under_fine() {
        let guard = OperationGuard::new(GuardStrategy::Fine);
        let token = guard.enter(Opcode::Read);
        assert!(matches!(token, OperationGuardToken::None));
    }
}
