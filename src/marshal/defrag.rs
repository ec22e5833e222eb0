//! In-place compaction of a partially-nulled array

/// Move every `None` slot to the back of `slots`.
///
/// Survivors end up in a contiguous prefix in their original relative
/// order; the suffix is all `None`. The slice length is unchanged and
/// nothing is reallocated. Returns the number of survivors.
pub fn defragment<T>(slots: &mut [Option<T>]) -> usize {
    let mut filled = 0;
    for i in 0..slots.len() {
        if slots[i].is_some() {
            if i != filled {
                slots.swap(filled, i);
            }
            filled += 1;
        }
    }
    filled
}
