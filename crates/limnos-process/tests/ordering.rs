//! Property tests for evaluation ordering.

use std::collections::HashSet;

use limnos_core::{ReadSource, Role};
use limnos_process::{compute_order, formula, GraphError, Variable, VariableRegistry};
use limnos_test_utils::fixtures::{accumulator, declare_all, dependency_chain_variables, TEST_KIND};
use proptest::prelude::*;

fn sum_of(name: &str, inputs: Vec<String>) -> Variable {
    Variable::dynamic(name, formula(inputs, |a| Ok(a.map_n(|row| row.iter().sum()))))
}

/// `n` dynamics where `d{i}` may read any `d{j}` with `j < i` (per the
/// bits of `masks[i]`) plus the static `k` and the state `s`.
fn dag_variables(n: usize, masks: &[u32]) -> Vec<Variable> {
    let mut vars = vec![Variable::constant("k"), accumulator("s", "k", 0.0)];
    for i in 0..n {
        let mut inputs: Vec<String> = (0..i)
            .filter(|j| masks[i] & (1 << j) != 0)
            .map(|j| format!("d{j}"))
            .collect();
        if masks[i] & (1 << 30) != 0 {
            inputs.push("k".into());
        }
        if masks[i] & (1 << 31) != 0 {
            inputs.push("s".into());
        }
        vars.push(sum_of(&format!("d{i}"), inputs));
    }
    vars
}

fn permuted<T>(items: Vec<T>, perm: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    perm.iter().filter_map(|&i| slots[i].take()).collect()
}

fn dag_case() -> impl Strategy<Value = (usize, Vec<u32>, Vec<usize>)> {
    (1usize..10).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(any::<u32>(), n),
            Just((0..n + 2).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #[test]
    fn any_declaration_order_yields_a_valid_order((n, masks, perm) in dag_case()) {
        let mut reg = VariableRegistry::new(TEST_KIND);
        declare_all(&mut reg, permuted(dag_variables(n, &masks), &perm));
        let order = compute_order(&reg).unwrap();

        prop_assert_eq!(order.len(), n + 1);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut states_started = false;
        for entry in &order {
            if entry.role == Role::State {
                states_started = true;
            } else {
                prop_assert!(!states_started, "dynamic after a state");
            }
            for (input, (_, source)) in entry.inputs.iter().zip(&entry.routes) {
                if *source == ReadSource::Current {
                    prop_assert!(seen.contains(input.as_str()), "{} read before computed", input);
                }
            }
            seen.insert(entry.name.as_str());
        }
    }

    #[test]
    fn rings_of_dynamics_are_rejected(len in 1usize..8, perm_seed in any::<u64>()) {
        let mut vars: Vec<Variable> = (0..len)
            .map(|i| sum_of(&format!("r{i}"), vec![format!("r{}", (i + 1) % len)]))
            .collect();
        vars.push(Variable::constant("k"));
        let rotate = (perm_seed as usize) % vars.len();
        vars.rotate_left(rotate);

        let mut reg = VariableRegistry::new(TEST_KIND);
        declare_all(&mut reg, vars);
        match compute_order(&reg) {
            Err(GraphError::CircularDependency { cycle, residual }) => {
                prop_assert_eq!(residual.len(), len);
                prop_assert!(cycle.len() >= 2);
                prop_assert_eq!(cycle.first(), cycle.last());
                for name in &cycle {
                    prop_assert!(residual.contains(name));
                }
            }
            other => prop_assert!(false, "expected cycle, got {:?}", other),
        }
    }
}

#[test]
fn chain_order_is_independent_of_declaration_order() {
    for perm in [[0, 1, 2], [2, 1, 0], [1, 0, 2], [2, 0, 1]] {
        let mut reg = VariableRegistry::new(TEST_KIND);
        declare_all(&mut reg, permuted(dependency_chain_variables(), &perm));
        let order = compute_order(&reg).unwrap();
        assert_eq!(order.names(), vec!["d1", "d2", "x"]);
    }
}
