use std::{sync::Arc, thread};

use crate::{
    circuit::{execute, CircuitRequest, GateKind, GateOperation},
    error::{Error, Result},
    grad::ParameterShift,
    hamiltonian::{Hamiltonian, PauliTerm},
    math::{C, FRAC_1_SQRT_2, FRAC_PI_2, N, R},
    register::QReg,
    topology::{MeshRank, RankTopology, SingleRank, ThreadMesh},
};

const EPS: R = 1e-9;

fn single(q_num: N) -> QReg<SingleRank> {
    QReg::new(q_num, SingleRank).unwrap()
}

fn assert_state(psi: &[C], expected: &[(R, R)], tol: R) {
    assert_eq!(psi.len(), expected.len());
    for (idx, (psi, &(re, im))) in psi.iter().zip(expected).enumerate() {
        assert!(
            (psi.re - re).abs() < tol && (psi.im - im).abs() < tol,
            "amplitude {} is {}, expected ({}, {})",
            idx,
            psi,
            re,
            im
        );
    }
}

fn spawn_ranks<O, F>(size: N, f: F) -> Vec<O>
where
    O: Send + 'static,
    F: Fn(MeshRank) -> O + Send + Sync + 'static,
{
    let f = Arc::new(f);
    ThreadMesh::endpoints(size)
        .unwrap()
        .into_iter()
        .map(|end| {
            let f = f.clone();
            thread::spawn(move || f(end))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn init() {
    let reg = single(2);

    assert_state(
        &reg.state_vector().unwrap(),
        &[(1.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)],
        EPS,
    );
}

#[test]
fn x_flips_qubit() {
    let mut reg = single(1);
    reg.apply_x(0).unwrap();

    assert_state(&reg.state_vector().unwrap(), &[(0.0, 0.0), (1.0, 0.0)], EPS);
}

#[test]
fn hadamard_superposition() {
    let mut reg = single(1);
    reg.apply_hadamard(0).unwrap();

    assert_state(
        &reg.state_vector().unwrap(),
        &[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)],
        EPS,
    );
}

#[test]
fn bell_state() {
    let mut reg = single(2);
    reg.apply_hadamard(0).unwrap();
    reg.apply_cnot(0, 1).unwrap();

    assert_state(
        &reg.state_vector().unwrap(),
        &[
            (FRAC_1_SQRT_2, 0.0),
            (0.0, 0.0),
            (0.0, 0.0),
            (FRAC_1_SQRT_2, 0.0),
        ],
        EPS,
    );
}

#[test]
fn reverse_cnot() {
    // Control above target: |10⟩ must map to |11⟩, not shuffle by target
    // strides.
    let mut reg = single(2);
    reg.apply_x(1).unwrap();
    reg.apply_cnot(1, 0).unwrap();

    assert_state(
        &reg.state_vector().unwrap(),
        &[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (1.0, 0.0)],
        EPS,
    );
}

#[test]
fn self_control_fails() {
    let mut reg = single(2);

    assert!(matches!(
        reg.apply_cnot(0, 0),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn gradient_of_ry_under_z() {
    // ⟨Z⟩ after Ry(θ)|0⟩ is cos θ, so the gradient at θ = π/2 is −1.
    let h = Hamiltonian::from_terms(vec![PauliTerm::z(0, 1.0)]);

    let gradients = ParameterShift::new()
        .gradients(
            1,
            &[FRAC_PI_2],
            |theta: &[R], reg: &mut QReg<SingleRank>| reg.apply_rotation_y(0, theta[0]),
            &h,
            &SingleRank,
        )
        .unwrap();

    assert_eq!(gradients.len(), 1);
    assert!((gradients[0] + 1.0).abs() < 1e-6);
}

#[test]
fn distributed_bell_on_msb() {
    // N = 4, P = 2: qubit 3 is the rank bit. H(3) then CNOT(3, 0) leaves
    // 1/√2 at global indices 0 and 9.
    spawn_ranks(2, |end| {
        let rank = end.rank();
        let mut reg = QReg::new(4, end).unwrap();
        reg.apply_hadamard(3).unwrap();
        reg.apply_cnot(3, 0).unwrap();

        let mut expected = [(0.0, 0.0); 8];
        if rank == 0 {
            expected[0] = (FRAC_1_SQRT_2, 0.0);
        } else {
            expected[1] = (FRAC_1_SQRT_2, 0.0);
        }
        assert_state(reg.local_slice(), &expected, EPS);
    });
}

#[test]
fn phase_gates_compose_to_z() {
    // H S S H = H Z H = X, and T⁴ = Z the same way.
    let mut reg = single(1);
    reg.apply_hadamard(0).unwrap();
    reg.apply_s(0).unwrap();
    reg.apply_s(0).unwrap();
    reg.apply_hadamard(0).unwrap();
    assert_state(&reg.state_vector().unwrap(), &[(0.0, 0.0), (1.0, 0.0)], EPS);

    let mut reg = single(1);
    reg.apply_hadamard(0).unwrap();
    for _ in 0..4 {
        reg.apply_t(0).unwrap();
    }
    reg.apply_hadamard(0).unwrap();
    assert_state(&reg.state_vector().unwrap(), &[(0.0, 0.0), (1.0, 0.0)], EPS);
}

#[test]
fn y_adds_phase() {
    let mut reg = single(1);
    reg.apply_y(0).unwrap();

    assert_state(&reg.state_vector().unwrap(), &[(0.0, 0.0), (0.0, 1.0)], EPS);
}

#[test]
fn toffoli_truth_table() {
    let mut reg = single(3);
    reg.apply_x(0).unwrap();
    reg.apply_x(1).unwrap();
    reg.apply_toffoli(0, 1, 2).unwrap();

    let psi = reg.state_vector().unwrap();
    assert!((psi[0b111].re - 1.0).abs() < EPS);

    // A cleared control leaves the target alone.
    let mut reg = single(3);
    reg.apply_x(0).unwrap();
    reg.apply_toffoli(0, 1, 2).unwrap();

    let psi = reg.state_vector().unwrap();
    assert!((psi[0b001].re - 1.0).abs() < EPS);
}

fn scrambled(q_num: N) -> QReg<SingleRank> {
    let mut reg = single(q_num);
    for qubit in 0..q_num {
        reg.apply_hadamard(qubit).unwrap();
        reg.apply_rotation_y(qubit, 0.31 + qubit as R).unwrap();
        reg.apply_t(qubit).unwrap();
    }
    for qubit in 1..q_num {
        reg.apply_cnot(qubit - 1, qubit).unwrap();
    }
    reg
}

#[test]
fn involutions_return_the_state() {
    let reg = scrambled(3);
    let reference = reg.state_vector().unwrap();

    let check = |twice: &dyn Fn(&mut QReg<SingleRank>) -> Result<()>| {
        let mut reg = reg.clone();
        twice(&mut reg).unwrap();
        twice(&mut reg).unwrap();
        let diffs = reg
            .state_vector()
            .unwrap()
            .iter()
            .zip(&reference)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, R::max);
        assert!(diffs < 1e-12, "involution drifted by {}", diffs);
    };

    check(&|reg| reg.apply_x(1));
    check(&|reg| reg.apply_y(2));
    check(&|reg| reg.apply_z(0));
    check(&|reg| reg.apply_hadamard(1));
    check(&|reg| reg.apply_cnot(0, 2));
    check(&|reg| reg.apply_cnot(2, 0));
    check(&|reg| reg.apply_toffoli(1, 2, 0));
}

#[test]
fn rotations_compose() {
    let (theta, phi) = (0.7, -1.9);

    let mut once = scrambled(2);
    once.apply_rotation_y(0, theta + phi).unwrap();

    let mut twice = scrambled(2);
    twice.apply_rotation_y(0, theta).unwrap();
    twice.apply_rotation_y(0, phi).unwrap();

    let once = once.state_vector().unwrap();
    let twice = twice.state_vector().unwrap();
    for (a, b) in once.iter().zip(&twice) {
        assert!((a - b).norm() < EPS);
    }
}

#[test]
fn norm_is_preserved() {
    let mut reg = scrambled(5);
    reg.apply_rotation_x(3, 2.2).unwrap();
    reg.apply_rotation_z(4, -0.6).unwrap();
    reg.apply_toffoli(4, 0, 2).unwrap();

    assert!((reg.norm_sqr().unwrap() - 1.0).abs() < EPS);

    let probabilities = reg.probabilities().unwrap();
    let total: R = probabilities.iter().sum();
    assert!((total - 1.0).abs() < EPS);
}

#[test]
fn expectation_of_known_states() {
    // ⟨Z⟩ on |0⟩ is 1, on |1⟩ is −1, on |+⟩ is 0.
    let z = Hamiltonian::from_terms(vec![PauliTerm::z(0, 1.0)]);

    assert!((z.expectation(&single(1)).unwrap() - 1.0).abs() < EPS);

    let mut reg = single(1);
    reg.apply_x(0).unwrap();
    assert!((z.expectation(&reg).unwrap() + 1.0).abs() < EPS);

    let mut reg = single(1);
    reg.apply_hadamard(0).unwrap();
    assert!(z.expectation(&reg).unwrap().abs() < EPS);

    // ⟨ZZ⟩ on a Bell pair is 1; the borrowed register stays intact.
    let zz = Hamiltonian::from_terms(vec![PauliTerm::parse(1.0, "ZZ").unwrap()]);
    let mut bell = single(2);
    bell.apply_hadamard(0).unwrap();
    bell.apply_cnot(0, 1).unwrap();

    assert!((zz.expectation(&bell).unwrap() - 1.0).abs() < EPS);
    assert_state(
        &bell.state_vector().unwrap(),
        &[
            (FRAC_1_SQRT_2, 0.0),
            (0.0, 0.0),
            (0.0, 0.0),
            (FRAC_1_SQRT_2, 0.0),
        ],
        EPS,
    );
}

#[test]
fn expectation_rejects_small_registers() {
    let h = Hamiltonian::from_terms(vec![PauliTerm::z(3, 1.0)]);

    assert!(matches!(
        h.expectation(&single(2)),
        Err(Error::InvalidArgument(_))
    ));
}

fn vqe_ansatz<T: RankTopology>(theta: &[R], reg: &mut QReg<T>) -> Result<()> {
    reg.apply_rotation_y(0, theta[0])?;
    reg.apply_rotation_y(1, theta[1])?;
    reg.apply_cnot(0, 1)?;
    reg.apply_rotation_z(1, theta[2])
}

fn vqe_hamiltonian() -> Hamiltonian {
    Hamiltonian::from_terms(vec![
        PauliTerm::parse(1.0, "ZZ").unwrap(),
        PauliTerm::x(0, 0.5),
        PauliTerm::z(1, -0.3),
    ])
}

#[test]
fn shift_rule_matches_central_difference() {
    let h = vqe_hamiltonian();
    let theta = [0.3, -0.8, 0.25];

    let energy = |theta: &[R]| -> R {
        let mut reg = single(2);
        vqe_ansatz(theta, &mut reg).unwrap();
        h.expectation(&reg).unwrap()
    };

    let analytic = ParameterShift::new()
        .gradients(2, &theta, vqe_ansatz, &h, &SingleRank)
        .unwrap();

    let step = 1e-4;
    for at in 0..theta.len() {
        let mut plus = theta.to_vec();
        let mut minus = theta.to_vec();
        plus[at] += step;
        minus[at] -= step;

        let numeric = (energy(&plus) - energy(&minus)) / (2.0 * step);
        assert!(
            (analytic[at] - numeric).abs() < 1e-4,
            "parameter {}: analytic {} vs numeric {}",
            at,
            analytic[at],
            numeric
        );
    }
}

#[test]
fn empty_parameters_are_rejected() {
    let h = vqe_hamiltonian();

    let result = ParameterShift::new().gradients(
        2,
        &[],
        |_: &[R], _: &mut QReg<SingleRank>| Ok(()),
        &h,
        &SingleRank,
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn ansatz_failures_abort_the_gradient() {
    let h = vqe_hamiltonian();

    let result = ParameterShift::new().gradients(
        2,
        &[0.1, 0.2],
        |theta: &[R], reg: &mut QReg<SingleRank>| {
            reg.apply_rotation_y(0, theta[0])?;
            reg.apply_cnot(1, 1) // always invalid
        },
        &h,
        &SingleRank,
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

/// A circuit touching every distributed code path: local and global
/// targets, diagonal and non-diagonal global gates, and every controlled
/// placement.
fn mixed_circuit<T: RankTopology>(reg: &mut QReg<T>) -> Result<()> {
    reg.apply_hadamard(0)?;
    reg.apply_hadamard(3)?;
    reg.apply_t(3)?;
    reg.apply_cnot(3, 1)?;
    reg.apply_cnot(1, 3)?;
    reg.apply_rotation_y(2, 0.7)?;
    reg.apply_toffoli(0, 3, 2)?;
    reg.apply_s(2)?;
    reg.apply_rotation_z(3, -0.4)?;
    reg.apply_y(3)?;
    reg.apply_cnot(2, 3)
}

#[test]
fn slicing_does_not_change_the_state() {
    let mut reference = single(4);
    mixed_circuit(&mut reference).unwrap();
    let expected = reference.state_vector().unwrap();

    for size in [2, 4] {
        let states = spawn_ranks(size, |end| {
            let mut reg = QReg::new(4, end).unwrap();
            mixed_circuit(&mut reg).unwrap();
            reg.state_vector().unwrap()
        });

        for state in states {
            assert_eq!(state.len(), expected.len());
            for (a, b) in state.iter().zip(&expected) {
                assert!((a - b).norm() < EPS, "P = {} diverged", size);
            }
        }
    }
}

#[test]
fn single_amplitude_slices() {
    // N = 2, P = 4: every qubit is global and L = 1.
    let mut reference = single(2);
    reference.apply_hadamard(0).unwrap();
    reference.apply_s(1).unwrap();
    reference.apply_cnot(0, 1).unwrap();
    reference.apply_y(0).unwrap();
    let expected = reference.state_vector().unwrap();

    let states = spawn_ranks(4, |end| {
        let mut reg = QReg::new(2, end).unwrap();
        reg.apply_hadamard(0).unwrap();
        reg.apply_s(1).unwrap();
        reg.apply_cnot(0, 1).unwrap();
        reg.apply_y(0).unwrap();
        assert_eq!(reg.local_len(), 1);
        reg.state_vector().unwrap()
    });

    for state in states {
        for (a, b) in state.iter().zip(&expected) {
            assert!((a - b).norm() < EPS);
        }
    }
}

#[test]
fn distributed_expectation_matches_single_rank() {
    let h = vqe_hamiltonian();
    let theta = [0.3, -0.8, 0.25];

    let mut reference = single(2);
    vqe_ansatz(&theta, &mut reference).unwrap();
    let expected = h.expectation(&reference).unwrap();

    let energies = spawn_ranks(2, move |end| {
        let mut reg = QReg::new(2, end).unwrap();
        vqe_ansatz(&theta, &mut reg).unwrap();
        vqe_hamiltonian().expectation(&reg).unwrap()
    });

    for energy in energies {
        assert!((energy - expected).abs() < EPS);
    }
}

#[test]
fn distributed_gradient_matches_single_rank() {
    let theta = [0.3, -0.8, 0.25];

    let expected = ParameterShift::new()
        .gradients(2, &theta, vqe_ansatz, &vqe_hamiltonian(), &SingleRank)
        .unwrap();

    let gradients = spawn_ranks(2, move |end| {
        ParameterShift::new()
            .gradients(2, &theta, vqe_ansatz, &vqe_hamiltonian(), &end)
            .unwrap()
    });

    for gradient in gradients {
        for (a, b) in gradient.iter().zip(&expected) {
            assert!((a - b).abs() < EPS);
        }
    }
}

#[test]
fn ranks_agree_on_measurements() {
    let outcomes = spawn_ranks(2, |end| {
        // Qubit 1 is the rank bit: the marginal needs the cross-rank
        // reduction and the collapse zeroes one whole slice.
        let mut reg = QReg::with_seed(2, end, 0xFEED).unwrap();
        reg.apply_hadamard(1).unwrap();

        let first = reg.measure(1).unwrap();
        let again = reg.measure(1).unwrap();
        let norm = reg.norm_sqr().unwrap();
        (first, again, norm)
    });

    let (first, again, norm) = outcomes[0];
    assert_eq!(outcomes[1].0, first);
    // Re-measuring the collapsed qubit is deterministic.
    assert_eq!(again, first);
    assert!((norm - 1.0).abs() < EPS);
    assert!((outcomes[1].2 - 1.0).abs() < EPS);
}

#[test]
fn execute_runs_a_decoded_circuit() {
    let request = CircuitRequest {
        num_qubits: 2,
        operations: vec![
            GateOperation::gate(GateKind::Hadamard, 0),
            GateOperation::gate(GateKind::Cnot, 1).with_control(0),
            GateOperation::gate(GateKind::Measure, 0).with_classical_register(0),
            GateOperation::gate(GateKind::Measure, 1).with_classical_register(1),
        ],
    };

    let response = execute(&request, SingleRank).unwrap().unwrap();
    assert_eq!(response.state_vector.len(), 4);

    // Bell correlations: the two measurements always agree, and the state
    // collapsed onto the matching basis vector.
    let m0 = response.classical_results.get(0).unwrap();
    let m1 = response.classical_results.get(1).unwrap();
    assert_eq!(m0, m1);

    let survivor = if m0 { 0b11 } else { 0b00 };
    assert!((response.state_vector[survivor].re - 1.0).abs() < EPS);
}

#[test]
fn execute_responds_from_root_only() {
    let responses = spawn_ranks(2, |end| {
        let request = CircuitRequest {
            num_qubits: 3,
            operations: vec![
                GateOperation::gate(GateKind::Hadamard, 2),
                GateOperation::gate(GateKind::RotationY, 0).with_angle(0.4),
                GateOperation::gate(GateKind::Toffoli, 1)
                    .with_control(0)
                    .with_second_control(2),
                GateOperation::gate(GateKind::RotationZ, 2).with_angle(-1.1),
            ],
        };
        execute(&request, end).unwrap()
    });

    let root = responses[0].as_ref().unwrap();
    assert_eq!(root.state_vector.len(), 8);
    assert!(root.classical_results.is_empty());
    assert!(responses[1].is_none());

    let total: R = root.state_vector.iter().map(C::norm_sqr).sum();
    assert!((total - 1.0).abs() < EPS);
}

#[test]
fn transport_failure_poisons_the_register() {
    let mut ends = ThreadMesh::endpoints(2).unwrap();
    let end1 = ends.pop().unwrap();
    let end0 = ends.pop().unwrap();

    // The peer takes part in construction, then vanishes.
    let peer = thread::spawn(move || {
        QReg::new(2, end1).unwrap();
    });
    let mut reg = QReg::new(2, end0).unwrap();
    peer.join().unwrap();

    let err = reg.apply_hadamard(1).unwrap_err();
    assert!(err.poisons_register());

    // Even traffic-free operations now report the poisoning error.
    assert!(reg.apply_x(0).is_err());
    assert!(reg.state_vector().is_err());
}
