#![no_main]

use libfuzzer_sys::fuzz_target;
use mssql_dsn::{ResolveDefaults, Resolver, parse_connect_params_with};

fuzz_target!(|data: &[u8]| {
    // Fuzz detection, tokenizing and resolution together
    if let Ok(s) = std::str::from_utf8(data) {
        let resolver = Resolver::new(ResolveDefaults::new());
        if let Ok(params) = parse_connect_params_with(s, &resolver) {
            assert!((512..=32767).contains(&params.packet_size));
            assert!(!params.host.is_empty());
            assert!(!params.host_in_certificate.is_empty());
            let _ = params.to_url();
        }
    }
});
