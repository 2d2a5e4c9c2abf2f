//! A long, fixed-seed randomized run exercising the façade against a
//! `VecDeque` reference model. Complements `proptest.rs`'s shrink-on-
//! failure coverage with a single large, reproducible soak over both
//! rebalancing strategies.

use std::collections::VecDeque;

use coppice::{Baseline, OrdList, Splay, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OPS: usize = 20_000;
const SEED: u64 = 0x5eed_c0ff_ee42_1234;

fn soak<S: Strategy<i32>>() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut model: VecDeque<i32> = VecDeque::new();
    let mut list: OrdList<i32, S> = OrdList::new();

    for step in 0..OPS {
        let len = model.len();
        match rng.gen_range(0..9) {
            0 => {
                let v = rng.gen();
                model.push_front(v);
                list.push_front(v);
            }
            1 => {
                let v = rng.gen();
                model.push_back(v);
                list.push_back(v);
            }
            2 => {
                assert_eq!(model.pop_front(), list.pop_front(), "pop_front mismatch at step {step}");
            }
            3 => {
                assert_eq!(model.pop_back(), list.pop_back(), "pop_back mismatch at step {step}");
            }
            4 => {
                let i = rng.gen_range(0..=len);
                let v = rng.gen();
                model.insert(i, v);
                list.insert(i, v);
            }
            5 if len > 0 => {
                let i = rng.gen_range(0..len);
                assert_eq!(model.remove(i), Some(list.remove(i)), "remove mismatch at step {step}");
            }
            6 if len > 0 => {
                let a = rng.gen_range(0..len);
                let b = rng.gen_range(0..len);
                model.swap(a, b);
                list.swap(a, b);
            }
            7 if len > 0 => {
                let a = rng.gen_range(0..=len);
                let b = rng.gen_range(0..=len);
                let (start, end) = (a.min(b), a.max(b));
                let removed_model: Vec<i32> = model.drain(start..end).collect();
                let removed_list = list.drain_range(start, end);
                assert_eq!(removed_model, removed_list, "range erase mismatch at step {step}");
            }
            8 => {
                let i = rng.gen_range(0..=len);
                let run: Vec<i32> = (0..rng.gen_range(0..5)).map(|_| rng.gen()).collect();
                for (offset, &v) in run.iter().enumerate() {
                    model.insert(i + offset, v);
                }
                list.insert_many(i, run);
            }
            _ => {
                if len > 0 {
                    let i = rng.gen_range(0..len);
                    let expected = model.get(i).copied();
                    let observed = list.get(i).copied();
                    assert_eq!(observed, expected, "get mismatch at step {step}");
                }
            }
        }

        assert_eq!(model.len(), list.len(), "length mismatch at step {step}");
        if step % 97 == 0 {
            let observed: Vec<i32> = list.iter().copied().collect();
            let expected: Vec<i32> = model.iter().copied().collect();
            assert_eq!(observed, expected, "sequence mismatch at step {step}");
        }
    }

    let observed: Vec<i32> = list.iter().copied().collect();
    let expected: Vec<i32> = model.iter().copied().collect();
    assert_eq!(observed, expected, "final sequence mismatch");
}

#[test]
fn baseline_survives_twenty_thousand_random_operations() {
    soak::<Baseline>();
}

#[test]
fn splay_survives_twenty_thousand_random_operations() {
    soak::<Splay>();
}
