//! Integration tests for rf-slot-pay
//!
//! Exercises the public API end to end:
//! - Machine construction from configuration documents
//! - Payline evaluation in every direction, checked against single-direction trees
//! - Cluster detection and removal over many seeded random grids
//! - Sharing immutable machine data across threads

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rf_slot_pay::{
    ClusterPayouts, Connectivity, GridSpec, Machine, MachineConfig, PayDirection, Payline,
    PaylineSet, Payout, SpinGrid, Symbol, SymbolSet, Topology, WinMechanism, simulate,
    standard_20_paylines,
};

fn random_cells(rng: &mut ChaCha8Rng, ids: &[u32], size: usize) -> Vec<u32> {
    (0..size).map(|_| ids[rng.random_range(0..ids.len())]).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYLINES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_middle_row_payout_from_config() {
    let json = r#"{
        "grid": { "reels": 5, "rows": 3 },
        "symbols": [
            { "id": 1, "name": "LOW" },
            { "id": 2, "name": "MID" },
            { "id": 3, "name": "HIGH", "pay_values": [0, 0, 1, 2.5, 5] }
        ],
        "win_mechanism": {
            "type": "paylines",
            "lines": [ { "id": 1, "rows": [1, 1, 1, 1, 1] } ]
        }
    }"#;
    let machine = Machine::from_json(json).unwrap();
    let mut spin = machine.new_spin();
    spin.set_reels(&[
        vec![1, 3, 2],
        vec![2, 3, 1],
        vec![1, 3, 2],
        vec![2, 3, 1],
        vec![1, 3, 2],
    ]);

    let mut out = Vec::new();
    assert_eq!(machine.evaluate(&mut spin, &mut out), 1);
    assert_eq!(out[0].symbol_id, 3);
    assert_eq!(out[0].count, 5);
    assert_eq!(out[0].factor, 5.0);
    assert_eq!(out[0].direction(), PayDirection::Ltr);
}

fn line_values(set: &PaylineSet, cells: &[u32], symbols: &SymbolSet) -> Vec<f64> {
    let spec = GridSpec::standard_5x3();
    let mut spin = SpinGrid::from_symbols(&spec, cells);
    let mut values = vec![0.0; 21];
    for payout in set.payouts(&mut spin, symbols) {
        let id = payout.payline_id().unwrap() as usize;
        assert_eq!(values[id], 0.0, "payline {id} paid twice");
        values[id] = payout.total();
    }
    values
}

#[test]
fn test_both_directions_pay_the_better_side() {
    let symbols = SymbolSet::standard();
    let ids: Vec<u32> = symbols.iter().map(|s| s.id).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(0xB07E);

    for highest in [false, true] {
        let ltr = PaylineSet::new(standard_20_paylines(), PayDirection::Ltr, highest, 5, 3).unwrap();
        let rtl = PaylineSet::new(standard_20_paylines(), PayDirection::Rtl, highest, 5, 3).unwrap();
        let both = PaylineSet::new(standard_20_paylines(), PayDirection::Both, highest, 5, 3).unwrap();

        for _ in 0..500 {
            let cells = random_cells(&mut rng, &ids, 15);
            let l = line_values(&ltr, &cells, &symbols);
            let r = line_values(&rtl, &cells, &symbols);
            let b = line_values(&both, &cells, &symbols);
            for id in 1..=20 {
                approx::assert_relative_eq!(b[id], l[id].max(r[id]));
            }
        }
    }
}

#[test]
fn test_wild_run_pays_best_symbol() {
    let symbols = SymbolSet::new(vec![
        Symbol::regular(1, "LOW", &[0.0, 0.0, 1.0, 2.0, 3.0]),
        Symbol::regular(2, "HIGH", &[0.0, 0.0, 8.0, 20.0, 50.0]),
        Symbol::regular(3, "BLANK", &[]),
        Symbol::wild(9, "WILD"),
    ])
    .unwrap();
    let set = PaylineSet::new(vec![Payline::straight(1, 0, 5)], PayDirection::Ltr, true, 5, 1).unwrap();
    let spec = GridSpec::new(5, 1);

    for k in 2u8..=5 {
        let mut cells = vec![3u32; 5];
        cells[..k as usize].fill(9);
        let mut spin = SpinGrid::from_symbols(&spec, &cells);
        let payouts = set.payouts(&mut spin, &symbols);

        let best = symbols.best_wild_payout(k);
        match best {
            Some((id, pay)) => {
                assert_eq!(payouts.len(), 1, "{k} wilds");
                assert_eq!(payouts[0].symbol_id, id);
                assert_eq!(payouts[0].symbol_id, 2);
                assert_eq!(payouts[0].count, u16::from(k));
                assert_eq!(payouts[0].factor, pay);
            }
            None => assert!(payouts.is_empty(), "{k} wilds"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLUSTERS
// ═══════════════════════════════════════════════════════════════════════════════

fn cluster_symbols() -> SymbolSet {
    SymbolSet::new(
        (1..=6)
            .map(|id| Symbol::regular(id, format!("S{id}"), &[0.0, 0.0, 0.0, 1.0, 2.0, 4.0, 8.0]))
            .chain([Symbol::wild(7, "WILD")])
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_full_grid_is_one_cluster() {
    let symbols = SymbolSet::new(vec![Symbol::regular(4, "X", &[0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0])])
        .unwrap();
    let spec = GridSpec::new(3, 3);
    let clusters = ClusterPayouts::from_spec(&spec, Topology::Rectangular, 2).unwrap();
    let mut spin = SpinGrid::from_symbols(&spec, &[4; 9]);
    let mut out: Vec<Payout> = Vec::new();

    assert_eq!(clusters.find(&mut spin, &symbols, &mut out), 1);
    assert_eq!(out[0].count, 9);
    assert_eq!(out[0].factor, 2.0);
    assert_eq!(spin.claimed(), &[1; 9]);
}

#[test]
fn test_find_twice_is_identical() {
    let symbols = cluster_symbols();
    let ids: Vec<u32> = (1..=7).collect();
    let spec = GridSpec::masked(&[3, 4, 5, 4, 3]);
    let clusters = ClusterPayouts::from_spec(&spec, Topology::Hexagonal, 4).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut spin = SpinGrid::new(&spec);

    for _ in 0..300 {
        spin.set_symbols(&random_cells(&mut rng, &ids, spec.total_positions()));
        let mut first = Vec::new();
        let mut second = Vec::new();
        let n1 = clusters.find(&mut spin, &symbols, &mut first);
        let claimed = spin.claimed().to_vec();
        let n2 = clusters.find(&mut spin, &symbols, &mut second);
        assert_eq!(n1, n2);
        assert_eq!(first, second);
        assert_eq!(claimed, spin.claimed());
    }
}

#[test]
fn test_removal_leaves_no_clusters() {
    let symbols = cluster_symbols();
    let ids: Vec<u32> = (1..=6).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(0xC1u64);

    for (spec, topology) in [
        (GridSpec::new(6, 5), Topology::Rectangular),
        (GridSpec::new(8, 8), Topology::Rectangular),
        (GridSpec::masked(&[3, 4, 5, 4, 3]), Topology::Hexagonal),
        (GridSpec::masked(&[5, 6, 7, 8, 7, 6, 5]), Topology::Hexagonal),
    ] {
        let clusters = ClusterPayouts::from_spec(&spec, topology, 4).unwrap();
        let mut spin = SpinGrid::new(&spec);
        let mut removed_any = false;

        for _ in 0..250 {
            spin.set_symbols(&random_cells(&mut rng, &ids, spec.total_positions()));
            let before = clusters.count(&mut spin, &symbols);
            let removed = clusters.remove_payouts(&mut spin, &symbols, &mut rng).unwrap();
            assert_eq!(before, removed);
            removed_any |= removed > 0;

            let mut out = Vec::new();
            assert_eq!(clusters.find(&mut spin, &symbols, &mut out), 0);
            assert!(out.is_empty());
            assert!(spin.claimed().iter().all(|&c| c == 0));
        }
        assert!(removed_any, "{topology:?} {}x{}", spec.reels, spec.rows);
    }
}

#[test]
fn test_cluster_machine_from_yaml() {
    let yaml = r#"
grid:
  reels: 5
  rows: 5
  mask: [3, 4, 5, 4, 3]
  topology: hexagonal
symbols:
  - { id: 1, name: A, pay_values: [0, 0, 1, 2, 3] }
  - { id: 2, name: B, pay_values: [0, 0, 1, 2, 3] }
  - { id: 3, name: W, symbol_type: wild }
win_mechanism:
  type: cluster_pays
  min_cluster: 3
"#;
    let machine = Machine::from_yaml(yaml).unwrap();
    let conn = machine.clusters().unwrap().connectivity();
    assert_eq!(conn.neighbors(10), &[11, 5, 15]);

    let mut spin = machine.new_spin();
    // Column of A on the middle reel
    spin.set_reels(&[
        vec![1, 2, 1],
        vec![2, 1, 2, 1],
        vec![1, 1, 1, 1, 1],
        vec![2, 1, 2, 1],
        vec![1, 2, 1],
    ]);
    let mut out = Vec::new();
    assert_eq!(machine.evaluate(&mut spin, &mut out), 1);
    assert_eq!(out[0].symbol_id, 1);
    assert!(out[0].count >= 5);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONNECTIVITY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_connectivity_shapes() {
    let conn = Connectivity::build(5, 4, None, Topology::Rectangular);
    assert_eq!(conn.neighbors(0).len(), 2);
    assert_eq!(conn.neighbors(1).len(), 3);
    assert_eq!(conn.neighbors(5).len(), 4);
    assert!(conn.is_symmetric());

    let hex = Connectivity::build(5, 5, Some(&[3, 4, 5, 4, 3]), Topology::Hexagonal);
    assert!(hex.is_symmetric());
    let across: Vec<usize> = hex.neighbors(10).iter().copied().filter(|&n| n / 5 != 2).collect();
    assert_eq!(across, vec![5, 15]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARING
// ═══════════════════════════════════════════════════════════════════════════════

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_immutable_data_is_shareable() {
    assert_send_sync::<Machine>();
    assert_send_sync::<SymbolSet>();
    assert_send_sync::<PaylineSet>();
    assert_send_sync::<ClusterPayouts>();
    assert_send_sync::<Connectivity>();
    assert_send_sync::<SpinGrid>();

    let machine = Machine::from_config(
        &MachineConfig::standard_5x3().with_win_mechanism(WinMechanism::Paylines {
            direction: PayDirection::Both,
            highest_payout: true,
            lines: standard_20_paylines(),
        }),
    )
    .unwrap();
    let ids: Vec<u32> = machine.symbols().iter().map(|s| s.id).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let grids: Vec<Vec<u32>> = (0..64).map(|_| random_cells(&mut rng, &ids, 15)).collect();

    let sequential: Vec<f64> = grids
        .iter()
        .map(|cells| {
            let mut spin = machine.new_spin();
            spin.set_symbols(cells);
            let mut out = Vec::new();
            machine.evaluate(&mut spin, &mut out);
            rf_slot_pay::total_factor(&out)
        })
        .collect();

    let threaded: Vec<f64> = std::thread::scope(|s| {
        let handles: Vec<_> = grids
            .chunks(16)
            .map(|chunk| {
                let machine = &machine;
                s.spawn(move || {
                    let mut spin = machine.new_spin();
                    let mut out = Vec::new();
                    chunk
                        .iter()
                        .map(|cells| {
                            spin.set_symbols(cells);
                            out.clear();
                            machine.evaluate(&mut spin, &mut out);
                            rf_slot_pay::total_factor(&out)
                        })
                        .collect::<Vec<f64>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, threaded);

    let stats = simulate(&machine, &grids);
    assert_eq!(stats.spins, 64);
    approx::assert_relative_eq!(stats.total_factor, sequential.iter().sum::<f64>(), max_relative = 1e-9);
}
