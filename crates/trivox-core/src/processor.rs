//! Per-sample audio processor trait.
//!
//! [`Processor`] is the interface shared by in-line signal processors such
//! as the [`LadderFilter`](crate::LadderFilter): one sample in, one sample
//! out, with block helpers layered on top. Implementations must not
//! allocate, lock, or perform I/O in any of these methods.

/// A mono, sample-at-a-time signal processor.
///
/// The trait is object-safe, but voices hold concrete processors so calls
/// dispatch statically.
///
/// # Example
///
/// ```rust
/// use trivox_core::{FilterMode, LadderFilter, Processor};
///
/// let mut filter = LadderFilter::new(48000.0);
/// filter.set_mode(FilterMode::LowPass);
/// filter.set_cutoff(800.0);
///
/// let mut buffer = [0.5f32; 64];
/// filter.process_block_inplace(&mut buffer);
/// assert!(buffer.iter().all(|s| s.is_finite()));
/// ```
pub trait Processor {
    /// Process one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process `input` into `output`. Both slices must have the same length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a buffer in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate. Derived coefficients follow.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without touching parameters.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Processor for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn test_process_block() {
        let mut gain = Gain(2.0);
        let input = [1.0, -2.0, 0.5];
        let mut output = [0.0; 3];
        gain.process_block(&input, &mut output);
        assert_eq!(output, [2.0, -4.0, 1.0]);
    }

    #[test]
    fn test_process_block_inplace() {
        let mut gain = Gain(0.5);
        let mut buffer = [2.0, 4.0];
        gain.process_block_inplace(&mut buffer);
        assert_eq!(buffer, [1.0, 2.0]);
    }

    #[test]
    fn test_object_safe() {
        let mut boxed: Box<dyn Processor> = Box::new(Gain(3.0));
        assert_eq!(boxed.process(1.0), 3.0);
    }
}
