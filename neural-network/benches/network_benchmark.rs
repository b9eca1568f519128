use criterion::{Criterion, black_box, criterion_group, criterion_main};
use matrix::matrix;
use neural_network::{Network, NetworkConfig, OutputHead};

fn train_step_benchmark(c: &mut Criterion) {
    let inputs = matrix![
        0.0, 0.0, 1.0;
        0.0, 1.0, 0.0;
        1.0, 0.0, 0.0;
        1.0, 1.0, 1.0
    ];
    let class_targets = matrix![
        1.0, 0.0;
        0.0, 1.0;
        0.0, 1.0;
        1.0, 0.0
    ];
    let day_targets = matrix![5.0; 5.0; 5.0; 11.0];

    let cases = [
        ("classification", OutputHead::Classification, 512, &class_targets),
        ("regression", OutputHead::Regression, 128, &day_targets),
    ];

    for (name, head, hidden_nodes, targets) in cases {
        let config = NetworkConfig {
            head,
            hidden_nodes,
            seed: Some(0),
            ..NetworkConfig::default()
        };
        c.bench_function(&format!("train_step_{name}_{hidden_nodes}_hidden"), |b| {
            let mut network = match Network::new(&config, inputs.cols(), targets.cols()) {
                Ok(network) => network,
                Err(e) => return eprintln!("Failed to build network: {e}"),
            };
            b.iter(|| network.train_step(black_box(&inputs), black_box(targets)))
        });
    }
}

criterion_group!(benches, train_step_benchmark);
criterion_main!(benches);
