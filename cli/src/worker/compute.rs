//! The worker's computation.

use super::protocol::TaskDescriptor;

/// Sum of `0..size`, i.e. `(size - 1) * size / 2`.
///
/// `TaskDescriptor` bounds `size` to `MAX_TASK_SIZE`, so the product never
/// overflows; `checked_mul` keeps that guarantee explicit.
pub fn triangular_sum(task: TaskDescriptor) -> Option<u64> {
    let n = task.size();
    let (even, odd) = if n % 2 == 0 { (n, n - 1) } else { (n - 1, n) };
    (even / 2).checked_mul(odd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::protocol::MAX_TASK_SIZE;

    fn sum(size: u64) -> Option<u64> {
        triangular_sum(TaskDescriptor::new(size).unwrap())
    }

    #[test]
    fn test_small_sizes() {
        assert_eq!(sum(1), Some(0));
        assert_eq!(sum(2), Some(1));
        assert_eq!(sum(5), Some(10));
        assert_eq!(sum(100), Some(4950));
    }

    #[test]
    fn test_matches_naive_sum() {
        for size in 1..200u64 {
            assert_eq!(sum(size), Some((0..size).sum::<u64>()), "size {size}");
        }
    }

    #[test]
    fn test_largest_size_fits() {
        assert_eq!(sum(MAX_TASK_SIZE), Some((MAX_TASK_SIZE / 2) * (MAX_TASK_SIZE - 1)));
    }
}
