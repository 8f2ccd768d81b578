/// cursor-swap build script.
///
/// The embedded cursor is pulled in with `include_bytes!`, so the only job
/// here is to make Cargo rebuild when the asset changes and to flag hosts
/// where only the platform-independent core is compiled.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=assets/working.ani");

    // The GUI and every cursor call are Win32-only. Other targets still build
    // the state machine and its tests, but the binary just exits.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=cursor-swap targets Windows; building the core only \
             (CARGO_CFG_TARGET_OS = {target_os:?})"
        );
    }
}
