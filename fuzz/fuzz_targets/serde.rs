#![no_main]

use libfuzzer_sys::fuzz_target;
use mvp_engine::MvpResult;

fuzz_target!(|data: &[u8]| {
    if let Ok(result) = serde_json::from_slice::<MvpResult>(data) {
        assert!(result.mvp() > 0.0 && result.mvp().is_finite());
        let serialized = serde_json::to_string(&result).unwrap();
        let deserialized: MvpResult = serde_json::from_str(&serialized).unwrap();
        assert_eq!(result, deserialized);
    }
});
