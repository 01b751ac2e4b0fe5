use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use tablebase_2048::board::Board;
use tablebase_2048::movement::{iterate_moves, spawn_pairs};
use tablebase_2048::params::{BoardParameters, Column, MoveSpec};
use tablebase_2048::tree::BoardTree;

// 3 rows of 4, row-major
fn three_by_four() -> BoardParameters {
    let rows: Vec<Column> = (0..3).map(|r| (0..4).map(|c| r * 4 + c).collect()).collect();
    let cols: Vec<Column> = (0..4).map(|c| (0..3).map(|r| r * 4 + c).collect()).collect();
    let rev = |v: &[Column]| v.iter().map(|c| c.iter().rev().copied().collect()).collect::<Vec<Column>>();
    BoardParameters::new(
        12,
        vec![
            MoveSpec::new("left", rows.clone(), vec![]),
            MoveSpec::new("right", rev(&rows), vec![]),
            MoveSpec::new("up", cols.clone(), vec![]),
            MoveSpec::new("down", rev(&cols), vec![]),
        ],
    )
    .unwrap()
}

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(1337);
    (0..512)
        .map(|_| (0..12).fold(Board::EMPTY, |b, i| if rng.gen_bool(0.6) { b.with_tile(i, rng.gen_range(1..=7)) } else { b }))
        .collect()
}

fn bench_moves(c: &mut Criterion) {
    let params = three_by_four();
    let boards = corpus();
    c.bench_function("movement/moves+spawns", |bch| {
        bch.iter(|| {
            let mut acc = 0u64;
            for &bd in &boards {
                iterate_moves(bd, params.moves(), |i, moved| {
                    acc = acc.wrapping_add(i as u64);
                    for (two, four) in spawn_pairs(moved, 12) {
                        acc = (acc ^ two.raw()).wrapping_add(four.raw());
                    }
                });
            }
            black_box(acc)
        })
    });
}

fn bench_tree(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("tree/insert+iterate", |bch| {
        bch.iter(|| {
            let mut tree = BoardTree::new(12);
            tree.extend(boards.iter().copied());
            black_box(tree.iter().fold(0u64, |acc, b| acc ^ b.raw()))
        })
    });
}

criterion_group!(movement, bench_moves, bench_tree);
criterion_main!(movement);
