//! Integration tests exercising the public API end to end.

use tgcn::nn::Sigmoid;
use tgcn::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ring road with four sensors, traffic flowing both ways.
fn ring_graph() -> Graph {
    Graph::from_edge_index(
        &[[0, 1], [1, 2], [2, 3], [3, 0], [1, 0], [2, 1], [3, 2], [0, 3]],
        4,
    )
    .with_weights(vec![1.0, 0.8, 1.0, 0.5, 1.0, 0.8, 1.0, 0.5])
}

fn speed_snapshots(steps: usize) -> Vec<Tensor> {
    (0..steps)
        .map(|t| {
            let data: Vec<f32> = (0..4)
                .flat_map(|n| {
                    let phase = (t + n) as f32 * 0.4;
                    [phase.sin(), phase.cos()]
                })
                .collect();
            Tensor::from_vec(data, &[4, 2])
        })
        .collect()
}

#[test]
fn test_predict_from_snapshots() {
    init_tracing();

    let config = TGCNConfig::new(2, 1, 16)
        .with_layers(2)
        .with_aggregation(Aggregation::DegreeNormalized)
        .with_seed(7);
    let model = TGCN::from_config(&config).expect("valid config");

    let snapshots = speed_snapshots(12);
    let graph = ring_graph();
    let from_snapshots = model
        .forward_snapshots(&snapshots, &graph)
        .expect("valid input");

    let x = stack_time(&snapshots).expect("equal snapshots");
    assert_eq!(x.shape(), &[4, 2, 12]);
    let from_sequence = model.forward(&x, &graph).expect("valid input");

    assert_eq!(from_snapshots.shape(), &[4, 1]);
    assert_eq!(from_snapshots, from_sequence);
}

#[test]
fn test_config_file_roundtrip_builds_same_model() {
    init_tracing();

    let config = TGCNConfig::new(2, 3, 8)
        .with_layers(3)
        .with_attention_heads(2)
        .expect("valid heads")
        .with_output_activation(OutputActivation::Tanh)
        .with_seed(11);
    let json = config.to_json().expect("serializable");
    let restored = TGCNConfig::from_json(&json).expect("valid document");

    let a = TGCN::from_config(&config).expect("valid config");
    let b = TGCN::from_config(&restored).expect("valid config");
    assert_eq!(a.parameters(), b.parameters());

    let x = stack_time(&speed_snapshots(5)).expect("equal snapshots");
    let y = a.forward(&x, &ring_graph()).expect("valid input");
    assert_eq!(y, b.forward(&x, &ring_graph()).expect("valid input"));
    assert!(y.data().iter().all(|v| v.abs() <= 1.0));
}

#[test]
fn test_parameters_can_be_overwritten() {
    let mut model = TGCN::with_seed(2, 1, 4, 1, Aggregation::AttentionWeighted, Some(3))
        .expect("valid dimensions")
        .with_output_activation(Sigmoid::new());

    // Zero output projection: sigmoid(0) everywhere
    let out = model.output_mut();
    out.set_weight(Tensor::zeros(&[1, 4]));
    out.set_bias(Tensor::zeros(&[1]));

    let x = stack_time(&speed_snapshots(3)).expect("equal snapshots");
    let y = model.forward(&x, &ring_graph()).expect("valid input");
    assert!(y.data().iter().all(|&v| (v - 0.5).abs() < 1e-6));

    for p in model.parameters_mut() {
        p.data_mut().fill(0.0);
    }
    model.refresh_caches();
    let y = model.forward(&x, &ring_graph()).expect("valid input");
    assert!(y.data().iter().all(|&v| (v - 0.5).abs() < 1e-6));
}

#[test]
fn test_isolated_nodes_still_predicted() {
    init_tracing();

    // Node 3 has no edges at all
    let graph = Graph::from_edge_index(&[[0, 1], [1, 2]], 4);
    for aggregation in [Aggregation::DegreeNormalized, Aggregation::AttentionWeighted] {
        let model = TGCN::with_seed(2, 2, 4, 2, aggregation, Some(1)).expect("valid dimensions");
        let x = stack_time(&speed_snapshots(4)).expect("equal snapshots");
        let y = model.forward(&x, &graph).expect("valid input");
        assert_eq!(y.shape(), &[4, 2]);
        assert!(y.data().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_errors_leave_no_partial_output() {
    init_tracing();

    let model = TGCN::with_seed(2, 1, 4, 2, Aggregation::DegreeNormalized, Some(1))
        .expect("valid dimensions");
    let x = stack_time(&speed_snapshots(4)).expect("equal snapshots");

    let bad_graph = Graph::from_edge_index(&[[0, 4]], 5);
    let err = model.forward(&x, &bad_graph).unwrap_err();
    assert_eq!(err.to_string(), "edge 0 has endpoint 4 outside [0, 4)");

    let err = model
        .forward(&Tensor::zeros(&[4, 3, 2]), &ring_graph())
        .unwrap_err();
    assert!(err.to_string().contains("shape mismatch for `x`"));

    // The model is unaffected by rejected calls
    assert!(model.forward(&x, &ring_graph()).is_ok());
}
