use criterion::*;
use qdsim::prelude::*;

fn hadamard_layers(q_num: usize, layers: usize) {
    let mut reg = QReg::new(q_num, SingleRank).unwrap();
    for _ in 0..layers {
        for qubit in 0..q_num {
            reg.apply_hadamard(qubit).unwrap();
        }
    }

    assert!((reg.norm_sqr().unwrap() - 1.0).abs() < 1e-9);
}

fn layered_circuit(q_num: usize, layers: usize) {
    let mut reg = QReg::new(q_num, SingleRank).unwrap();
    for layer in 0..layers {
        for qubit in 0..q_num {
            reg.apply_rotation_y(qubit, 0.1 * (layer + qubit) as f64)
                .unwrap();
        }
        for qubit in 1..q_num {
            reg.apply_cnot(qubit - 1, qubit).unwrap();
        }
    }

    assert!((reg.norm_sqr().unwrap() - 1.0).abs() < 1e-9);
}

fn performance(c: &mut Criterion) {
    for qu_num in [12, 15] {
        c.bench_function(format!("hadamard_layers_qu{}", qu_num).as_str(), |b| {
            b.iter(|| hadamard_layers(black_box(qu_num), black_box(10)))
        });
    }

    c.bench_function("layered_circuit_qu12", |b| {
        b.iter(|| layered_circuit(black_box(12), black_box(4)))
    });
}

criterion_group!(benches, performance);
criterion_main!(benches);
