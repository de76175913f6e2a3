#![no_main]

use libfuzzer_sys::fuzz_target;
use mvp_engine::{EngineConfig, Evaluator, Family, Point, Precision};

fuzz_target!(|data: [u8; 12]| {
    let [f, d, rest @ ..] = data;
    let family = Family::ALL[usize::from(f) % Family::ALL.len()];
    let d = u32::from(d % 31);
    let read = |i: usize| f64::from(u16::from_le_bytes([rest[i], rest[i + 1]])) / 1024.0;
    let (q, b, t) = (read(0), 1.0 + read(2), read(4));

    let evaluator =
        Evaluator::new(EngineConfig::default().with_precision(Precision::Double)).unwrap();
    // any outcome is fine as long as a success honours the result invariants
    if let Ok(result) = evaluator.mvp(family, &Point::new(Some(q), d, b, Some(t))) {
        assert!(result.mvp() > 0.0 && result.mvp().is_finite());
    }
});
