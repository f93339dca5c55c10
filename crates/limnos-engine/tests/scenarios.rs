//! Reference scenarios run end to end through the model facade.

use limnos_core::Value;
use limnos_engine::{Model, ModelConfig, ModelError, Overrides};
use limnos_grid::{Line1D, Rect2D};
use limnos_process::GraphError;
use limnos_test_utils::fixtures::{
    dependency_chain, identity_model, linear_growth, mutual_cycle, updatable_increment,
};

fn initialized(config: ModelConfig) -> Model {
    let mut model = Model::new(config).unwrap();
    model.initialize().unwrap();
    model
}

#[test]
fn identity_keeps_state_constant() {
    let mut model = initialized(ModelConfig::new(identity_model(), Line1D::new(1).unwrap()));
    model.run(5).unwrap();
    assert_eq!(
        model.dataset().unwrap().cell_series("T", 0),
        Some(vec![20.0; 6])
    );
}

#[test]
fn linear_growth_accumulates() {
    let mut model = initialized(ModelConfig::new(linear_growth(0.5, 1.0), Line1D::new(1).unwrap()));
    model.run(4).unwrap();
    assert_eq!(
        model.dataset().unwrap().cell_series("T", 0),
        Some(vec![1.0, 1.5, 2.0, 2.5, 3.0])
    );
}

#[test]
fn dynamic_chain_is_resolved_within_a_step() {
    let mut model = initialized(ModelConfig::new(dependency_chain(), Line1D::new(1).unwrap()));
    assert_eq!(
        model.computation_order().unwrap().names(),
        vec!["d1", "d2", "x"]
    );
    model.run(3).unwrap();
    assert_eq!(
        model.dataset().unwrap().cell_series("x", 0),
        Some(vec![2.0, 7.0, 57.0, 3307.0])
    );
}

#[test]
fn cycle_fails_at_initialize() {
    let mut model = Model::new(ModelConfig::new(mutual_cycle(), Line1D::new(1).unwrap())).unwrap();
    match model.initialize().unwrap_err() {
        ModelError::Graph(GraphError::CircularDependency { residual, cycle }) => {
            assert_eq!(residual, vec!["a", "b"]);
            assert!(cycle.iter().any(|n| n == "a" || n == "b"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn scalar_static_broadcasts_over_cells() {
    let initial: Vec<f64> = (0..10).map(f64::from).collect();
    let config = ModelConfig::new(linear_growth(1.0, 0.0), Line1D::new(10).unwrap())
        .with_initial("T", initial);
    let mut model = initialized(config);
    model.run(3).unwrap();

    let last = model.dataset().unwrap().last_slice("T").unwrap();
    let expected: Vec<f64> = (0..10).map(|i| f64::from(i) + 3.0).collect();
    assert_eq!(last, expected.as_slice());
}

#[test]
fn override_applies_to_one_step() {
    let mut model = initialized(ModelConfig::new(updatable_increment(), Line1D::new(1).unwrap()));
    model.step(&Overrides::new().with("k", 1.0)).unwrap();
    model.step(&Overrides::new().with("k", 2.0)).unwrap();
    model.step(&Overrides::new()).unwrap();
    assert_eq!(
        model.dataset().unwrap().cell_series("T", 0),
        Some(vec![0.0, 1.0, 3.0, 3.0])
    );
}

#[test]
fn per_cell_statics_on_a_rectangle() {
    let config = ModelConfig::new(linear_growth(0.0, 0.0), Rect2D::new(2, 3).unwrap())
        .with_parameter("k", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let mut model = initialized(config);
    model.run(2).unwrap();

    let ds = model.dataset().unwrap();
    assert_eq!(ds.dims(), &["time", "y", "x"]);
    assert_eq!(ds.last_slice("T"), Some(&[2.0, 4.0, 6.0, 8.0, 10.0, 12.0][..]));
    assert_eq!(ds.static_value("k").map(<[f64]>::len), Some(6));
    assert_eq!(model.parameter("k"), Some(&Value::cells(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])));
}
