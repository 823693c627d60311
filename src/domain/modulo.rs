//! Modulo with cycle tracking
//!
//! `input mod m` uses floor semantics, so the result is always in `0..m`
//! and `floor(input / m)` is the index of the cycle the input falls in.
//! [`CycleCounter`] follows a driving value across invocations and counts
//! how many divisor boundaries it has crossed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuloError {
    #[error("Modulo value must be at least 1, got {0}")]
    InvalidModulus(i64),
}

fn check_modulus(modulo_value: i64) -> Result<(), ModuloError> {
    if modulo_value < 1 {
        return Err(ModuloError::InvalidModulus(modulo_value));
    }
    Ok(())
}

/// Result of a plain modulo operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuloOutcome {
    pub input: i64,
    pub modulo_value: i64,
    pub result: i64,
}

impl ModuloOutcome {
    /// Text shown in the node body
    pub fn display_text(&self) -> String {
        format!("🔢 {} mod {} = {}", self.input, self.modulo_value, self.result)
    }
}

/// Applies `input mod modulo_value` with a non-negative result
pub fn modulo(input: i64, modulo_value: i64) -> Result<ModuloOutcome, ModuloError> {
    check_modulus(modulo_value)?;
    Ok(ModuloOutcome {
        input,
        modulo_value,
        result: input.rem_euclid(modulo_value),
    })
}

/// Result of a cycle-tracking modulo step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleOutcome {
    pub modulo: ModuloOutcome,
    pub cycle_count: i64,
}

impl CycleOutcome {
    pub fn display_text(&self) -> String {
        format!("{}\n🔄 Cycle: {}", self.modulo.display_text(), self.cycle_count)
    }
}

/// Counts divisor-boundary crossings of a driving value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCounter {
    last_input: Option<i64>,
    cycle_count: i64,
}

impl CycleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value seen on the previous step, if any since the last reset
    pub fn last_input(&self) -> Option<i64> {
        self.last_input
    }

    pub fn cycle_count(&self) -> i64 {
        self.cycle_count
    }

    /// Forgets all history; the next step is treated as a first call
    pub fn reset(&mut self) {
        self.last_input = None;
        self.cycle_count = 0;
    }

    /// Feeds the next driving value
    ///
    /// A step backwards by more than one full cycle is taken as an external
    /// reset of the driver and re-derives the count from the input alone.
    /// Smaller moves, in either direction, adjust the count by the number of
    /// boundaries crossed.
    pub fn apply(
        &mut self,
        input: i64,
        modulo_value: i64,
        reset: bool,
    ) -> Result<CycleOutcome, ModuloError> {
        let modulo = modulo(input, modulo_value)?;

        if reset {
            self.reset();
        }

        let cycle = input.div_euclid(modulo_value);
        self.cycle_count = match self.last_input {
            None => cycle,
            Some(last) if input < last && last.abs_diff(input) > modulo_value.unsigned_abs() => cycle,
            Some(last) => {
                let crossed = i128::from(cycle) - i128::from(last.div_euclid(modulo_value));
                let count = i128::from(self.cycle_count) + crossed;
                // Saturates at the i64 bounds
                count.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
            }
        };
        self.last_input = Some(input);

        Ok(CycleOutcome {
            modulo,
            cycle_count: self.cycle_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn modulo_is_non_negative() {
        assert_eq!(modulo(7, 3).unwrap().result, 1);
        assert_eq!(modulo(-1, 10).unwrap().result, 9);
        assert_eq!(modulo(-10, 10).unwrap().result, 0);
    }

    #[test]
    fn modulo_rejects_zero_divisor() {
        assert_eq!(modulo(5, 0), Err(ModuloError::InvalidModulus(0)));
        let mut counter = CycleCounter::new();
        assert!(counter.apply(5, -2, false).is_err());
        assert_eq!(counter.last_input(), None);
    }

    #[test]
    fn display_text() {
        let mut counter = CycleCounter::new();
        let outcome = counter.apply(23, 10, false).unwrap();
        assert_eq!(outcome.display_text(), "🔢 23 mod 10 = 3\n🔄 Cycle: 2");
    }

    #[test]
    fn first_call_initializes_from_input() {
        let mut counter = CycleCounter::new();
        assert_eq!(counter.apply(35, 10, false).unwrap().cycle_count, 3);
        assert_eq!(counter.last_input(), Some(35));
    }

    #[test]
    fn forward_progress_counts_crossings() {
        let mut counter = CycleCounter::new();
        for n in 0..25 {
            counter.apply(n, 10, false).unwrap();
        }
        assert_eq!(counter.cycle_count(), 2);
    }

    #[test]
    fn small_backward_step_decrements() {
        let mut counter = CycleCounter::new();
        counter.apply(12, 10, false).unwrap();
        let outcome = counter.apply(8, 10, false).unwrap();
        assert_eq!(outcome.cycle_count, 0);
    }

    #[test]
    fn big_backward_jump_recomputes() {
        let mut counter = CycleCounter::new();
        counter.apply(0, 10, false).unwrap();
        counter.apply(95, 10, false).unwrap();
        assert_eq!(counter.cycle_count(), 9);

        let outcome = counter.apply(3, 10, false).unwrap();
        assert_eq!(outcome.cycle_count, 0);
        assert_eq!(outcome.modulo.result, 3);
    }

    #[test]
    fn reset_treats_next_input_as_first_call() {
        let mut counter = CycleCounter::new();
        counter.apply(50, 10, false).unwrap();
        counter.apply(70, 10, false).unwrap();

        let outcome = counter.apply(5, 10, true).unwrap();
        assert_eq!(outcome.cycle_count, 0);
        assert_eq!(counter.last_input(), Some(5));

        counter.reset();
        assert_eq!(counter.cycle_count(), 0);
        assert_eq!(counter.last_input(), None);
    }

    #[test]
    fn extreme_inputs_do_not_overflow() {
        let mut counter = CycleCounter::new();
        counter.apply(i64::MAX, 1, false).unwrap();
        assert_eq!(counter.apply(i64::MAX, 1, false).unwrap().cycle_count, i64::MAX);

        let mut counter = CycleCounter::new();
        counter.apply(i64::MAX, 10, false).unwrap();
        let outcome = counter.apply(-10, 10, false).unwrap();
        assert_eq!(outcome.cycle_count, -1);
        assert_eq!(outcome.modulo.result, 0);

        let mut counter = CycleCounter::new();
        counter.apply(i64::MIN, 1, false).unwrap();
        counter.apply(i64::MIN + 1, 1, false).unwrap();
        assert_eq!(counter.apply(i64::MAX, 1, false).unwrap().cycle_count, i64::MAX);
    }

    proptest! {
        #[test]
        fn non_decreasing_inputs_track_floor(
            start in -1000i64..1000,
            steps in proptest::collection::vec(0i64..30, 1..50),
            modulo_value in 1i64..50,
        ) {
            let mut counter = CycleCounter::new();
            let mut n = start;
            for step in steps {
                n += step;
                counter.apply(n, modulo_value, false).unwrap();
            }
            prop_assert_eq!(counter.cycle_count(), n.div_euclid(modulo_value));
        }

        #[test]
        fn reset_always_restarts(
            history in proptest::collection::vec(-500i64..500, 0..20),
            next in 0i64..100,
            modulo_value in 1i64..20,
        ) {
            let mut counter = CycleCounter::new();
            for n in history {
                counter.apply(n, modulo_value, false).unwrap();
            }
            let outcome = counter.apply(next, modulo_value, true).unwrap();
            prop_assert_eq!(outcome.cycle_count, next.div_euclid(modulo_value));
        }
    }
}
