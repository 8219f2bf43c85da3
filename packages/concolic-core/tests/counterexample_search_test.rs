//! Counterexample Search Tests
//!
//! Tests covering:
//! - End-to-end scenarios on the bounded solver
//! - Width escalation on spurious overflow models
//! - UNSAT / UNKNOWN / budget exhaustion outcomes
//! - Scope balance on every exit path (scripted solver)
//! - Variable identity errors and config loading

use concolic_core::features::search::{BvTerm, Formula};
use concolic_core::{
    BoundedSolver, BoundedSolverConfig, CheckResult, ConcolicConfig, ConcolicError,
    CounterexampleModel, CounterexampleSearch, Predicate, Result, SearchConfig, SearchOutcome,
    SmtSolver, SymbolicValue,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;

fn model(pairs: &[(&str, i128)]) -> CounterexampleModel {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn narrow_search() -> CounterexampleSearch<BoundedSolver> {
    let config = SearchConfig::default().initial_width(8).max_width(8);
    CounterexampleSearch::with_config(BoundedSolver::new(), config).unwrap()
}

/// `(x & 0) == 0`: holds for every x
fn tautology() -> Predicate {
    let x = SymbolicValue::variable_with_value("x", 4);
    Predicate::holds(x.bitand(0).unwrap().equals(0).unwrap())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripted solver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Replays a fixed verdict sequence; every variable evaluates to `value`
struct ScriptedSolver {
    script: VecDeque<CheckResult>,
    fallback: CheckResult,
    value: i128,
    depth: usize,
    max_depth: usize,
    checks: usize,
    fail_assert_at_depth: Option<usize>,
}

impl ScriptedSolver {
    fn new(script: Vec<CheckResult>, fallback: CheckResult, value: i128) -> Self {
        Self {
            script: script.into(),
            fallback,
            value,
            depth: 0,
            max_depth: 0,
            checks: 0,
            fail_assert_at_depth: None,
        }
    }
}

impl SmtSolver for ScriptedSolver {
    type Model = i128;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn declare_bitvec(&mut self, _name: &str, _width: u32) -> Result<()> {
        Ok(())
    }

    fn assert(&mut self, _formula: &Formula) -> Result<()> {
        if self.fail_assert_at_depth == Some(self.depth) {
            return Err(ConcolicError::solver("scripted assert failure"));
        }
        Ok(())
    }

    fn push(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(ConcolicError::UnbalancedScope);
        }
        self.depth -= 1;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn check(&mut self) -> CheckResult {
        self.checks += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn get_model(&mut self) -> Option<i128> {
        Some(self.value)
    }

    fn eval(&self, model: &i128, _term: &BvTerm) -> Option<i128> {
        Some(*model)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenarios
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn scenario_no_assertions() {
    let x = SymbolicValue::variable_with_value("x", 10);
    let query = Predicate::holds(x.greater_than(5).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&[], &query).unwrap();

    assert_eq!(
        outcome,
        SearchOutcome::Counterexample {
            model: model(&[("x", 0)]),
            width: 32,
        }
    );
}

#[test]
fn scenario_path_condition_kept() {
    let x = SymbolicValue::variable_with_value("x", 3);
    let assertions = vec![Predicate::holds(x.greater_than(0).unwrap())];
    let query = Predicate::holds(x.add(&x).unwrap().greater_than(100).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();

    let value = outcome.model().and_then(|m| m.get("x")).copied().unwrap();
    assert!(value > 0);
    assert!(value * 2 <= 100);
    assert_eq!(outcome.model(), Some(&model(&[("x", 1)])));
}

#[test]
fn scenario_two_variables() {
    let x = SymbolicValue::variable_with_value("x", 1);
    let y = SymbolicValue::variable_with_value("y", 1);
    let assertions = vec![Predicate::holds(x.equals(&y).unwrap())];
    let query = Predicate::holds(x.less_than(&y).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();

    assert_eq!(outcome.into_model(), Some(model(&[("x", 0), ("y", 0)])));
}

#[test]
fn scenario_query_negation_against_path() {
    let x = SymbolicValue::variable_with_value("x", 20);
    let assertions = vec![Predicate::holds(x.greater_than(10).unwrap())];

    // expected true: the negation x >= 5 is compatible with x > 10
    let query = Predicate::holds(x.less_than(5).unwrap());
    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();
    assert_eq!(outcome.model(), Some(&model(&[("x", 11)])));

    // expected false: the negation x < 5 contradicts x > 10
    let query = Predicate::fails(x.less_than(5).unwrap());
    let outcome = search.find_counterexample(&assertions, &query).unwrap();
    assert_eq!(outcome, SearchOutcome::NoCounterexample { width: 32 });
    assert_eq!(search.stats().unsat_results, 1);
    assert_eq!(search.stats().counterexamples, 1);
}

#[test]
fn scenario_overflow_forces_width_escalation() {
    let x = SymbolicValue::variable_with_value("x", 1);
    let assertions = vec![Predicate::holds(x.greater_than(0).unwrap())];
    // (x * 2^28 < 0) | (x == 100)
    let wraps = x.mul(1 << 28).unwrap().less_than(0).unwrap();
    let query = Predicate::fails(wraps.bitor(x.equals(100).unwrap()).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();

    // width 32 yields x = 8 (8 * 2^28 wraps negative), rejected natively
    assert_eq!(
        outcome,
        SearchOutcome::Counterexample {
            model: model(&[("x", 100)]),
            width: 40,
        }
    );
    assert_eq!(search.stats().escalations, 1);
    assert_eq!(search.stats().width_rounds, 2);
    assert_eq!(search.solver().depth(), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcomes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn tautology_has_no_counterexample() {
    let mut search = narrow_search();
    let outcome = search.find_counterexample(&[], &tautology()).unwrap();

    assert_eq!(outcome, SearchOutcome::NoCounterexample { width: 8 });
    // bounds 15, 31, 63, 127; 255 clamps to 127 and is not re-checked
    assert_eq!(search.stats().solver_checks, 4);
    assert_eq!(search.stats().escalations, 0);
}

#[test]
fn implied_branch_has_no_counterexample() {
    let x = SymbolicValue::variable_with_value("x", 3);
    let assertions = vec![Predicate::holds(x.greater_than(0).unwrap())];
    let query = Predicate::holds(x.add(0).unwrap().greater_than(0).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();

    assert_eq!(outcome, SearchOutcome::NoCounterexample { width: 32 });
    // bounds 2^4 - 1 ..= 2^31 - 1
    assert_eq!(search.stats().solver_checks, 28);
    assert_eq!(search.stats().unknown_results, 0);
    assert_eq!(search.solver().depth(), 0);
}

#[test]
fn scaled_path_condition_has_no_counterexample() {
    let x = SymbolicValue::variable_with_value("x", 4);
    // for positive x, 3x - 2 >= 10 implies x >= 4
    let assertions = vec![
        Predicate::holds(x.greater_than(0).unwrap()),
        Predicate::holds(x.mul(3).unwrap().sub(2).unwrap().greater_equal(10).unwrap()),
    ];
    let query = Predicate::holds(x.greater_than(3).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();

    assert_eq!(outcome, SearchOutcome::NoCounterexample { width: 32 });
    assert_eq!(search.solver().depth(), 0);
}

#[test]
fn large_unsat_space_is_inconclusive() {
    let config = BoundedSolverConfig::default().max_candidates(100);
    let mut search = CounterexampleSearch::new(BoundedSolver::with_config(config));
    let outcome = search.find_counterexample(&[], &tautology()).unwrap();

    // bounds 15 and 31 fit the budget, 63 does not
    assert_eq!(outcome, SearchOutcome::Inconclusive { width: 32 });
    assert_eq!(search.stats().solver_checks, 3);
    assert_eq!(search.stats().unknown_results, 1);
    assert_eq!(search.solver().depth(), 0);
}

#[test]
fn every_width_spurious_exhausts_budget() {
    let x = SymbolicValue::variable_with_value("x", 1);
    let assertions = vec![Predicate::holds(x.greater_than(0).unwrap())];
    // 2^126 wraps to 0 below 127 bits; at 128 bits x = 4 overflows natively
    let query = Predicate::holds(x.mul(1i128 << 126).unwrap().not_equals(0).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let outcome = search.find_counterexample(&assertions, &query).unwrap();

    assert_eq!(outcome, SearchOutcome::BudgetExhausted { max_width: 128 });
    assert_eq!(search.stats().width_rounds, 13);
    assert_eq!(search.stats().escalations, 13);
    assert_eq!(search.solver().depth(), 0);
}

#[test]
fn unknown_is_not_escalated() {
    let x = SymbolicValue::variable_with_value("x", 10);
    let query = Predicate::holds(x.greater_than(5).unwrap());

    let solver = ScriptedSolver::new(vec![CheckResult::Unsat], CheckResult::Unknown, 0);
    let mut search = CounterexampleSearch::new(solver);
    let outcome = search.find_counterexample(&[], &query).unwrap();

    assert_eq!(outcome, SearchOutcome::Inconclusive { width: 32 });
    assert_eq!(search.stats().width_rounds, 1);
    let solver = search.into_solver();
    assert_eq!(solver.checks, 2);
    assert_eq!(solver.depth, 0);
    assert_eq!(solver.max_depth, 2);
}

#[test]
fn unsat_rounds_widen_then_sat() {
    let x = SymbolicValue::variable_with_value("x", 10);
    let query = Predicate::holds(x.greater_than(5).unwrap());

    let script = vec![CheckResult::Unsat, CheckResult::Unsat, CheckResult::Sat];
    let solver = ScriptedSolver::new(script, CheckResult::Unknown, -3);
    let mut search = CounterexampleSearch::new(solver);
    let outcome = search.find_counterexample(&[], &query).unwrap();

    assert_eq!(outcome.model(), Some(&model(&[("x", -3)])));
    assert_eq!(search.stats().solver_checks, 3);
    assert_eq!(search.solver().depth, 0);
}

#[test]
fn scripted_spurious_models_escalate_to_budget() {
    let x = SymbolicValue::variable_with_value("x", 10);
    let query = Predicate::holds(x.greater_than(0).unwrap());

    // x = 5 satisfies the query natively, so every model is spurious
    let solver = ScriptedSolver::new(vec![], CheckResult::Sat, 5);
    let config = SearchConfig::default().initial_width(8).max_width(24);
    let mut search = CounterexampleSearch::with_config(solver, config).unwrap();
    let outcome = search.find_counterexample(&[], &query).unwrap();

    assert_eq!(outcome, SearchOutcome::BudgetExhausted { max_width: 24 });
    assert_eq!(search.stats().width_rounds, 3);
    assert_eq!(search.stats().escalations, 3);
    assert_eq!(search.solver().depth, 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn solver_error_releases_all_scopes() {
    let x = SymbolicValue::variable_with_value("x", 10);
    let query = Predicate::holds(x.greater_than(5).unwrap());

    let mut solver = ScriptedSolver::new(vec![], CheckResult::Sat, 0);
    // range constraints are asserted two scopes deep
    solver.fail_assert_at_depth = Some(2);
    let mut search = CounterexampleSearch::new(solver);
    let err = search.find_counterexample(&[], &query).unwrap_err();

    assert!(matches!(err, ConcolicError::Solver(_)));
    assert_eq!(search.solver().depth, 0);
    assert_eq!(search.solver().max_depth, 2);
}

#[test]
fn distinct_variables_sharing_name_rejected() {
    let x = SymbolicValue::variable_with_value("x", 1);
    let shadow = SymbolicValue::variable_with_value("x", 2);
    let assertions = vec![Predicate::holds(x.greater_than(0).unwrap())];
    let query = Predicate::holds(shadow.less_than(5).unwrap());

    let mut search = CounterexampleSearch::bounded();
    let err = search.find_counterexample(&assertions, &query).unwrap_err();

    assert!(matches!(err, ConcolicError::DuplicateVariable { ref name } if name == "x"));
    assert!(err.is_programming_error());
    assert_eq!(search.solver().depth(), 0);
}

#[test]
fn invalid_search_config_rejected() {
    let config = SearchConfig::default().max_width(200);
    let result = CounterexampleSearch::with_config(BoundedSolver::new(), config);
    assert!(matches!(result, Err(ConcolicError::Config(_))));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn search_from_yaml_config() {
    let yaml = r#"
version: 1
search:
  initial_width: 8
  max_width: 8
bounded_solver:
  max_candidates: 1000
"#;
    let config = ConcolicConfig::from_yaml_str(yaml).unwrap();
    let mut search = CounterexampleSearch::bounded_from_config(&config).unwrap();

    assert_eq!(search.solver().config().max_candidates, 1000);
    let outcome = search.find_counterexample(&[], &tautology()).unwrap();
    assert_eq!(outcome, SearchOutcome::NoCounterexample { width: 8 });
}

#[test]
fn search_from_yaml_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "version: 1\nsearch:\n  width_step: 16").unwrap();

    let config = ConcolicConfig::from_yaml(file.path()).unwrap();
    let search = CounterexampleSearch::bounded_from_config(&config).unwrap();
    assert_eq!(search.config().width_step, 16);
    assert_eq!(search.config().initial_width, 32);
}
