use proptest::prelude::*;
use std::collections::VecDeque;
use vessel::*;

#[derive(Debug, Clone)]
enum Op {
    Enqueue(u16),
    Dequeue,
    Discard(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u16>().prop_map(Op::Enqueue),
        2 => Just(Op::Dequeue),
        1 => (0usize..8).prop_map(Op::Discard),
        1 => Just(Op::Clear),
    ]
}

#[derive(Debug, Clone, Copy)]
enum PoolOp {
    Checkout,
    Recycle(usize),
    RecycleTwice(usize),
    RecycleAll,
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        4 => Just(PoolOp::Checkout),
        3 => any::<usize>().prop_map(PoolOp::Recycle),
        1 => any::<usize>().prop_map(PoolOp::RecycleTwice),
        1 => Just(PoolOp::RecycleAll),
    ]
}

proptest! {
    #[test]
    fn matches_overwriting_deque_model(capacity in 1usize..8, ops in prop::collection::vec(op(), 0..200)) {
        let mut buffer = RingBuffer::new(capacity);
        let mut model: VecDeque<u16> = VecDeque::new();

        for op in ops {
            match op {
                Op::Enqueue(value) => {
                    let evicted = buffer.enqueue(value);
                    let expected = if model.len() == capacity { model.pop_front() } else { None };
                    model.push_back(value);
                    prop_assert_eq!(evicted, expected);
                }
                Op::Dequeue => {
                    prop_assert_eq!(buffer.dequeue(), model.pop_front());
                }
                Op::Discard(distance) => {
                    let dropped = distance.min(model.len());
                    model.drain(..dropped);
                    prop_assert_eq!(buffer.discard_from_tail(distance), dropped);
                }
                Op::Clear => {
                    buffer.clear();
                    model.clear();
                }
            }

            prop_assert!(buffer.len() <= buffer.capacity());
            prop_assert_eq!(buffer.len(), model.len());
            prop_assert_eq!(buffer.peek(), model.front());
            prop_assert_eq!(buffer.peek_newest(), model.back());
            prop_assert!(buffer.iter().eq(model.iter()));
            prop_assert!(buffer.iter().rev().eq(model.iter().rev()));
        }
    }

    #[test]
    fn fifo_without_overflow(values in prop::collection::vec(any::<i32>(), 1..64)) {
        let mut buffer = RingBuffer::new(values.len());
        let mut dequeued = Vec::new();
        for (i, value) in values.iter().enumerate() {
            buffer.enqueue(*value);
            if i % 3 == 2 {
                dequeued.extend(buffer.dequeue());
            }
        }
        dequeued.extend(buffer.drain());
        prop_assert_eq!(dequeued, values);
    }

    #[test]
    fn overflow_keeps_newest(capacity in 1usize..16, extra in 1usize..16) {
        let mut buffer = RingBuffer::new(capacity);
        buffer.extend(0..capacity + extra);
        prop_assert_eq!(buffer.len(), capacity);
        prop_assert!(buffer.iter().copied().eq(extra..capacity + extra));
        prop_assert!(!buffer.contains(&(extra - 1)));
    }

    #[test]
    fn pool_never_exceeds_bound(max_size in 1usize..6, ops in prop::collection::vec(pool_op(), 0..100)) {
        let mut pool: ReusePool<_, Vec<u8>> = ReusePool::new(max_size, false);
        let mut held: Vec<Pooled<Vec<u8>>> = Vec::new();

        for op in ops {
            match op {
                PoolOp::Checkout => match pool.checkout() {
                    Some(instance) => {
                        prop_assert!(!held.iter().any(|h| h.ptr_eq(&instance)));
                        held.push(instance);
                    }
                    None => {
                        prop_assert_eq!(pool.in_use(), max_size);
                    }
                },
                PoolOp::Recycle(pick) if !held.is_empty() => {
                    let instance = held.swap_remove(pick % held.len());
                    prop_assert!(pool.recycle(instance.clone()));
                    prop_assert!(pool.is_available(&instance));
                    prop_assert!(!pool.is_checked_out(&instance));
                }
                PoolOp::RecycleTwice(pick) if !held.is_empty() => {
                    let instance = held.swap_remove(pick % held.len());
                    prop_assert!(pool.recycle(instance.clone()));
                    let state = (pool.in_use(), pool.available());
                    prop_assert!(!pool.recycle(instance));
                    prop_assert_eq!((pool.in_use(), pool.available()), state);
                }
                PoolOp::RecycleAll => {
                    pool.recycle_all();
                    held.clear();
                }
                _ => {}
            }

            prop_assert_eq!(pool.in_use(), held.len());
            prop_assert!(pool.in_use() <= max_size);
            prop_assert!(pool.in_use() + pool.available() <= max_size);
            for instance in &held {
                prop_assert!(pool.is_checked_out(instance));
                prop_assert!(!pool.is_available(instance));
            }
        }
    }
}
