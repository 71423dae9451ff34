//! Installs a logger once for the test binary so that `RUST_LOG=trace`
//! shows the analyzer's log output for a failing test.

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
