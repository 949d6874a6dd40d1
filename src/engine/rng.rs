use rand::Rng;

/// Uniform integers in a closed range. Every `rand::Rng` is a source; tests
/// can plug in scripted sources to pin down exact draws.
pub trait NumberSource {
    /// Uniform over `[min, max]` inclusive. Callers guarantee `min <= max`.
    fn next_in(&mut self, min: i64, max: i64) -> i64;

    fn index_below(&mut self, len: usize) -> usize {
        self.next_in(0, len as i64 - 1) as usize
    }
}

impl<R: Rng + ?Sized> NumberSource for R {
    fn next_in(&mut self, min: i64, max: i64) -> i64 {
        self.gen_range(min..=max)
    }
}

/// In-place Fisher-Yates shuffle driven by a `NumberSource`.
pub fn shuffle<T>(items: &mut [T], source: &mut impl NumberSource) {
    for i in (1..items.len()).rev() {
        let j = source.next_in(0, i as i64) as usize;
        items.swap(i, j);
    }
}
