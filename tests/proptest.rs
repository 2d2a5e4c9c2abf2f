//! Model-based testing: a sequence of randomized deque operations is
//! replayed against a `coppice::OrdList` (both strategies) and a plain
//! `VecDeque` reference model. Every step's observable sequence must
//! agree.

use std::collections::VecDeque;

use coppice::{Baseline, OrdList, Splay};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    PushFront(i32),
    PushBack(i32),
    PopFront,
    PopBack,
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
}

fn op_strategy(len_hint: usize) -> impl Strategy<Value = Op> {
    let len_hint = len_hint.max(1);
    prop_oneof![
        any::<i32>().prop_map(Op::PushFront),
        any::<i32>().prop_map(Op::PushBack),
        Just(Op::PopFront),
        Just(Op::PopBack),
        (0..=len_hint, any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        (0..len_hint).prop_map(Op::Remove),
        (0..len_hint).prop_map(Op::Get),
    ]
}

fn apply_to_model(model: &mut VecDeque<i32>, op: &Op) {
    let len = model.len();
    match *op {
        Op::PushFront(v) => model.push_front(v),
        Op::PushBack(v) => model.push_back(v),
        Op::PopFront => {
            model.pop_front();
        }
        Op::PopBack => {
            model.pop_back();
        }
        Op::Insert(i, v) => {
            if i <= len {
                model.insert(i, v);
            }
        }
        Op::Remove(i) => {
            if i < len {
                model.remove(i);
            }
        }
        Op::Get(_) => {}
    }
}

fn apply_to_list<S: coppice::Strategy<i32>>(list: &mut OrdList<i32, S>, op: &Op) {
    let len = list.len();
    match *op {
        Op::PushFront(v) => list.push_front(v),
        Op::PushBack(v) => list.push_back(v),
        Op::PopFront => {
            list.pop_front();
        }
        Op::PopBack => {
            list.pop_back();
        }
        Op::Insert(i, v) => {
            if i <= len {
                list.insert(i, v);
            }
        }
        Op::Remove(i) => {
            if i < len {
                list.remove(i);
            }
        }
        Op::Get(i) => {
            if i < len {
                list.get(i);
            }
        }
    }
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    (0..200usize).prop_flat_map(|count| {
        proptest::collection::vec(op_strategy(64), count)
    })
}

proptest! {
    #[test]
    fn baseline_matches_vecdeque_model(ops in ops_strategy()) {
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut list: OrdList<i32, Baseline> = OrdList::new();
        for op in &ops {
            apply_to_model(&mut model, op);
            apply_to_list(&mut list, op);
            let observed: Vec<i32> = list.iter().copied().collect();
            let expected: Vec<i32> = model.iter().copied().collect();
            prop_assert_eq!(observed, expected);
        }
    }

    #[test]
    fn splay_matches_vecdeque_model(ops in ops_strategy()) {
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut list: OrdList<i32, Splay> = OrdList::new();
        for op in &ops {
            apply_to_model(&mut model, op);
            apply_to_list(&mut list, op);
            let observed: Vec<i32> = list.iter().copied().collect();
            let expected: Vec<i32> = model.iter().copied().collect();
            prop_assert_eq!(observed, expected);
        }
    }

    #[test]
    fn baseline_and_splay_agree_with_each_other(ops in ops_strategy()) {
        let mut baseline: OrdList<i32, Baseline> = OrdList::new();
        let mut splay: OrdList<i32, Splay> = OrdList::new();
        for op in &ops {
            apply_to_list(&mut baseline, op);
            apply_to_list(&mut splay, op);
            let a: Vec<i32> = baseline.iter().copied().collect();
            let b: Vec<i32> = splay.iter().copied().collect();
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn split_off_then_append_restores_the_original_sequence(
        values in proptest::collection::vec(any::<i32>(), 0..80),
        split_at in 0..100usize,
    ) {
        let mut list: OrdList<i32, Splay> = values.iter().copied().collect();
        let split_at = split_at.min(list.len());
        let mut tail = list.split_off(split_at);
        list.append(&mut tail);
        prop_assert!(tail.is_empty());
        let observed: Vec<i32> = list.iter().copied().collect();
        prop_assert_eq!(observed, values);
    }
}
