#![no_main]

use libfuzzer_sys::fuzz_target;
use mlpy::CompileConfig;
use mlpy::ast::Program;

fuzz_target!(|data: &[u8]| {
    // Anything the front end could hand over must either compile or fail with an error, never panic
    if let Ok(mut program) = serde_json::from_slice::<Program>(data) {
        let config = CompileConfig::default();
        let _ = mlpy::compile(&mut program, &config);
        let config = config.with_strict(true);
        let _ = mlpy::compile(&mut program, &config);
    }
});
