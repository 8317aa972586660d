mod common;

use common::{demo_model, DEMO_OBS};
use hmm_engine::TrainConfig;

#[test]
fn demo_scenario_regression_values() {
    let model = demo_model();
    assert_eq!(model.predict(&DEMO_OBS).unwrap(), vec![0, 0, 1, 1, 1, 1]);
    let ll = model.log_likelihood(&DEMO_OBS).unwrap();
    assert!(ll < 0.0);
    assert!((ll - (-4.762889508519575)).abs() < 1e-12, "ll = {ll}");
}

#[test]
fn training_on_demo_sequence_does_not_lower_likelihood() {
    let mut model = demo_model();
    let before = model.log_likelihood(&DEMO_OBS).unwrap();
    let report = model.train(&[DEMO_OBS], &TrainConfig::default()).unwrap();
    let after = model.log_likelihood(&DEMO_OBS).unwrap();
    assert!(after >= before);
    assert!((after - report.log_likelihood).abs() < 1e-12);
    assert!(report.iterations >= 1);
    // Training again restarts EM from the learned parameters.
    let again = model.train(&[DEMO_OBS], &TrainConfig::default()).unwrap();
    assert!(again.log_likelihood >= after - 1e-9);
}

#[test]
fn zero_iteration_training_is_a_no_op() {
    let mut model = demo_model();
    let cfg = TrainConfig::builder().with_max_iterations(0).build().unwrap();
    model.train(&[DEMO_OBS.to_vec(), vec![1, 1, 0]], &cfg).unwrap();
    assert_eq!(model, demo_model());
}
