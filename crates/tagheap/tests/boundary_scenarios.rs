use tagheap::{ArenaError, ArenaPtr, BlockState, TagAllocator};
use tagheap_test_utils::{assert_pristine, assert_tiled, carve, shape};

#[test]
fn capacity_one_byte_below_minimum_is_rejected() {
    let min = TagAllocator::<f64>::min_block_size();
    let err = TagAllocator::<f64>::new(min - 1).unwrap_err();
    assert!(matches!(err, ArenaError::OutOfMemory { .. }));
    assert!(TagAllocator::<f64>::new(min).is_ok());
}

#[test]
fn full_capacity_exact_fit_then_everything_fails() {
    let mut a = TagAllocator::<f64>::new(200).unwrap();
    // 192 usable bytes = 24 doubles.
    let p = a.allocate(24).unwrap();
    assert_eq!(shape(&a), vec![(192, BlockState::Used)]);
    assert_eq!(a.stats().free_blocks, 0);
    for n in [0, 1, 5, 24] {
        assert!(matches!(a.allocate(n), Err(ArenaError::OutOfMemory { .. })));
    }
    a.deallocate(p, 24).unwrap();
    assert_pristine(&a);
}

#[test]
fn three_blocks_merge_only_when_middle_is_freed() {
    // Three 5-int blocks of 28 bytes each tile 84 bytes exactly.
    let mut a = TagAllocator::<i32>::new(84).unwrap();
    let ptrs = carve(&mut a, &[5, 5, 5]);

    a.deallocate(ptrs[0], 5).unwrap();
    a.deallocate(ptrs[2], 5).unwrap();
    assert_eq!(
        shape(&a),
        vec![
            (20, BlockState::Free),
            (20, BlockState::Used),
            (20, BlockState::Free),
        ]
    );
    assert_tiled(&a);

    a.deallocate(ptrs[1], 5).unwrap();
    assert_pristine(&a);
}

#[test]
fn null_deallocate_leaves_arena_unchanged() {
    let mut a = TagAllocator::<i32>::new(100).unwrap();
    carve(&mut a, &[3, 4]);
    let before = shape(&a);
    let err = a.deallocate(ArenaPtr::null(), 1).unwrap_err();
    assert!(matches!(err, ArenaError::InvalidArgument { .. }));
    assert_eq!(shape(&a), before);
    assert_tiled(&a);
}

#[test]
fn first_fit_takes_fifty_byte_block_over_thirty() {
    let mut a = TagAllocator::<u8>::new(256).unwrap();
    let ptrs = carve(&mut a, &[50, 1, 30, 1]);
    a.deallocate(ptrs[0], 50).unwrap();
    a.deallocate(ptrs[2], 30).unwrap();

    let p = a.allocate(25).unwrap();
    assert_eq!(p, ptrs[0]);
    assert_tiled(&a);
}

#[test]
fn original_hundred_byte_int_arena() {
    let mut a = TagAllocator::<i32>::new(100).unwrap();
    assert_eq!(a.tag_at(0), 92);
    assert_eq!(a.tag_at(96), 92);

    let p = a.allocate(10).unwrap();
    let q = a.allocate(10).unwrap();
    assert_tiled(&a);
    a.deallocate(p, 10).unwrap();
    a.deallocate(q, 10).unwrap();
    assert_pristine(&a);
}
