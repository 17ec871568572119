#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use utf8dec::check::{Carrier, Filler, MAX_TARGET_LEN, SLOTS, check_once};
use utf8dec::{Input, LANES, Output, ScalarBatch, Step, Strategy, decode_to_vec};

/// Sequences on either side of every validity boundary.
static EDGES: &[&[u8]] = &[
    &[0x7F],
    &[0x80],
    &[0xC0, 0x80],
    &[0xC1, 0xBF],
    &[0xC2, 0x80],
    &[0xDF, 0xBF],
    &[0xE0, 0x9F, 0xBF],
    &[0xE0, 0xA0, 0x80],
    &[0xED, 0x9F, 0xBF],
    &[0xED, 0xA0, 0x80],
    &[0xED, 0xBF, 0xBF],
    &[0xEE, 0x80, 0x80],
    &[0xF0, 0x8F, 0xBF, 0xBF],
    &[0xF0, 0x90, 0x80, 0x80],
    &[0xF4, 0x8F, 0xBF, 0xBF],
    &[0xF4, 0x90, 0x80, 0x80],
    &[0xF8],
    &[0xFF],
];

/// libFuzzer's own mutation, then one boundary sequence spliced in.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    let size = fuzzer_mutate(data, size, max_size);
    let mut rng = SmallRng::seed_from_u64(u64::from(seed));
    let edge = EDGES[rng.random_range(0..EDGES.len())];
    if size + edge.len() > max_size {
        return size;
    }
    let at = rng.random_range(0..=size);
    data.copy_within(at..size, at + edge.len());
    data[at..at + edge.len()].copy_from_slice(edge);
    size + edge.len()
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug, Arbitrary)]
struct Layout {
    target: Vec<u8>,
    position: u8,
    fillers: [u8; 3],
    capacity: u8,
}

fn decode(data: &[u8]) {
    // Whole-buffer agreement.
    let reference = decode_to_vec(&ScalarBatch, data);
    for &strategy in Strategy::available() {
        let decoding = decode_to_vec(strategy.decoder(), data);
        if strategy.is_core() {
            assert!(data.len() - decoding.consumed < LANES, "{strategy} stalled early");
            assert!(reference.codepoints.starts_with(&decoding.codepoints), "{strategy}");
            assert!(reference.errors.starts_with(&decoding.errors), "{strategy}");
        } else {
            assert_eq!(decoding, reference, "{strategy}");
        }
    }

    let Ok(layout) = Layout::arbitrary(&mut arbitrary::Unstructured::new(data)) else {
        return;
    };

    // Single calls with a small output never overrun it.
    let capacity = usize::from(layout.capacity % 48) + 1;
    let mut slots = vec![0u32; capacity + 1];
    for &strategy in Strategy::available() {
        let mut input = Input::new(&layout.target);
        let mut output = Output::new(&mut slots[..capacity]);
        let step = strategy.decoder().decode_batch(&mut input, &mut output);
        assert!(output.len() <= input.consumed(), "{strategy}: {step:?}");
        if let Step::Malformed(_) = step {
            assert!(output.is_empty(), "{strategy}");
        }
        assert_eq!(slots[capacity], 0, "{strategy} wrote past its output");
    }

    // Carrier agreement, up to the tail tolerance.
    let target = &layout.target[..layout.target.len().min(MAX_TARGET_LEN)];
    let position = usize::from(layout.position) % SLOTS;
    let fillers = layout.fillers.map(|f| Filler::ALL[usize::from(f % 4)]);
    let Ok(carrier) = Carrier::build(target, position, fillers) else {
        return;
    };
    for &strategy in Strategy::available() {
        if let Err(mismatch) = check_once(strategy.decoder(), &carrier) {
            panic!("{mismatch}");
        }
    }
}

fuzz_target!(|data: &[u8]| decode(data));
