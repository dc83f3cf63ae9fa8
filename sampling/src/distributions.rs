use rand_distr::{Distribution, Uniform, weighted::WeightedIndex};

use crate::source::Source;

/// Simple IMIX frame sizes and their relative weights (7:4:1).
pub const IMIX_SIZES: [usize; 3] = [64, 594, 1518];
pub const IMIX_WEIGHTS: [u32; 3] = [7, 4, 1];

/// Message-length shapes used to drive the engine with realistic traffic.
pub enum Distributions {
    Fixed(usize),
    Uniform(Uniform<usize>),
    Imix(WeightedIndex<u32>),
}

impl Distributions {
    pub fn fixed(len: usize) -> Self {
        Distributions::Fixed(len)
    }

    pub fn uniform(min: usize, max: usize) -> Self {
        match Uniform::new_inclusive(min, max) {
            Ok(uniform) => Distributions::Uniform(uniform),
            Err(err) => panic!("invalid length range [{min}, {max}]: {err}"),
        }
    }

    pub fn imix() -> Self {
        match WeightedIndex::new(IMIX_WEIGHTS) {
            Ok(index) => Distributions::Imix(index),
            Err(err) => panic!("invalid IMIX weights: {err}"),
        }
    }

    pub fn sample_len(&self, source: &mut Source) -> usize {
        match self {
            Distributions::Fixed(len) => *len,
            Distributions::Uniform(uniform) => uniform.sample(source),
            Distributions::Imix(index) => IMIX_SIZES[index.sample(source)],
        }
    }

    /// Samples a length and rounds it up to a non-zero multiple of `align`.
    pub fn sample_len_aligned(&self, source: &mut Source, align: usize) -> usize {
        assert!(align > 0, "align must be non-zero");
        self.sample_len(source).max(1).next_multiple_of(align)
    }
}

#[cfg(test)]
mod tests {
    use super::{Distributions, IMIX_SIZES};
    use crate::source::Source;

    #[test]
    fn imix_only_yields_frame_sizes() {
        let mut source: Source = Source::new([1u8; 32]);
        let dist: Distributions = Distributions::imix();
        (0..256).for_each(|_| assert!(IMIX_SIZES.contains(&dist.sample_len(&mut source))));
    }

    #[test]
    fn aligned_lengths_are_block_multiples() {
        let mut source: Source = Source::new([2u8; 32]);
        let dist: Distributions = Distributions::uniform(0, 300);
        (0..256).for_each(|_| {
            let len: usize = dist.sample_len_aligned(&mut source, 16);
            assert!(len > 0 && len % 16 == 0, "len={len}");
        });
    }
}
