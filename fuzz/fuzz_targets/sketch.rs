#![no_main]

use hll_accuracy::{ExactCounter, HyperLogLog, MultiplicativeHash, Token};
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let precision = data[0] % HyperLogLog::MAX_PRECISION + 1;
    let hash = MultiplicativeHash::new(wyhash(data, 0) as u32);
    let mut hll = HyperLogLog::new(precision, hash).unwrap();
    let mut exact = ExactCounter::new();

    let tokens: Vec<Token> = data[1..].chunks(4).map(|c| Token::from(c.to_vec())).collect();
    for batch in tokens.chunks(3) {
        let registers = hll.registers().to_vec();
        hll.update(batch);
        exact.add(batch);

        for (old, new) in registers.iter().zip(hll.registers()) {
            assert!(new >= old);
            assert!(*new <= 33 - precision);
        }
        let estimate = hll.estimate();
        assert!(estimate.is_finite() && estimate > 0.0);
        assert!(exact.size() <= tokens.len());
    }
});
