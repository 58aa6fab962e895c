#![no_main]

use conquest::{run_scenario, Scenario};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Any text either fails cleanly or yields a runnable scenario.
    let Ok(scenario) = Scenario::from_json(text) else {
        return;
    };
    let small = scenario.map.width.saturating_mul(scenario.map.height) <= 4096;
    if small {
        let result = run_scenario(&scenario, Some(50)).expect("validated scenario must run");
        assert!(result.ticks_played <= 50);
    }
});
