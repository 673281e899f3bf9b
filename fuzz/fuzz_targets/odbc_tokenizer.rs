#![no_main]

use libfuzzer_sys::fuzz_target;
use mssql_dsn::odbc::split_connection_string_odbc;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = split_connection_string_odbc(s);
    }
});
