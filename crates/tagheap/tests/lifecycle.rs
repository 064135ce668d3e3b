//! Allocate / construct / destroy / deallocate in the order generic
//! container code drives them.

use std::cell::Cell;
use std::rc::Rc;

use tagheap::{ArenaConfig, ConsistencyCheck, TagAllocator};
use tagheap_test_utils::{assert_pristine, assert_tiled};

fn fill_and_count<T: Clone + PartialEq>(a: &mut TagAllocator<T>, n: usize, v: T) -> usize {
    let b = a.allocate(n).unwrap();
    for i in 0..n {
        a.construct(b.add(i), v.clone());
    }
    let matching = (0..n)
        .filter(|&i| unsafe { a.read(b.add(i)) } == v)
        .count();
    for i in (0..n).rev() {
        unsafe { a.destroy(b.add(i)) };
    }
    a.deallocate(b, n).unwrap();
    matching
}

#[test]
fn single_int_round_trip() {
    let mut a = TagAllocator::<i32>::new(100).unwrap();
    assert_eq!(fill_and_count(&mut a, 1, 2), 1);
    assert_pristine(&a);
}

#[test]
fn ten_doubles_round_trip() {
    let mut a = TagAllocator::<f64>::new(100).unwrap();
    assert_eq!(fill_and_count(&mut a, 10, 2.0), 10);
    assert_pristine(&a);
}

#[test]
fn strings_round_trip_under_always_checks() {
    let config = ArenaConfig::new(1024).with_consistency(ConsistencyCheck::Always);
    let mut a = TagAllocator::<String>::with_config(config).unwrap();
    assert_eq!(fill_and_count(&mut a, 8, "arena".to_string()), 8);
    assert_pristine(&a);
}

#[test]
fn every_constructed_value_is_dropped_exactly_once() {
    struct Tracked(Rc<Cell<usize>>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));
    let mut a = TagAllocator::<Tracked>::new(512).unwrap();
    let blocks: Vec<_> = (1..=4).map(|n| (a.allocate(n).unwrap(), n)).collect();
    for &(p, n) in &blocks {
        for i in 0..n {
            a.construct(p.add(i), Tracked(Rc::clone(&drops)));
        }
    }
    assert_eq!(drops.get(), 0);
    assert_tiled(&a);

    for &(p, n) in blocks.iter().rev() {
        for i in 0..n {
            unsafe { a.destroy(p.add(i)) };
        }
        a.deallocate(p, n).unwrap();
    }
    assert_eq!(drops.get(), 1 + 2 + 3 + 4);
    assert_pristine(&a);
}

#[test]
fn values_in_other_blocks_survive_coalescing() {
    let mut a = TagAllocator::<u64>::new(256).unwrap();
    let left = a.allocate(2).unwrap();
    let keep = a.allocate(3).unwrap();
    let right = a.allocate(2).unwrap();
    for i in 0..3 {
        a.construct(keep.add(i), 0xA5A5_0000 + i as u64);
    }
    a.deallocate(left, 2).unwrap();
    a.deallocate(right, 2).unwrap();
    for i in 0..3 {
        assert_eq!(unsafe { a.read(keep.add(i)) }, 0xA5A5_0000 + i as u64);
    }
    a.deallocate(keep, 3).unwrap();
    assert_pristine(&a);
}
