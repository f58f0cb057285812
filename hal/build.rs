//! ARC HAL Build Script
//!
//! Validates the atomic backend selection. Exactly one `backend-*` feature
//! must be enabled; anything else fails the build here, before the crate is
//! compiled. The selected backend name is exported to the crate as
//! `ARC_HAL_BACKEND`.

use std::env;

/// Backend features and the names exported for them
const BACKENDS: [(&str, &str); 4] = [
    ("CARGO_FEATURE_BACKEND_LLSC", "llsc"),
    ("CARGO_FEATURE_BACKEND_ATLD", "atld"),
    ("CARGO_FEATURE_BACKEND_NPS", "nps"),
    ("CARGO_FEATURE_BACKEND_SPINLOCK", "spinlock"),
];

/// Main build script entry point
fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let selected: Vec<&str> = BACKENDS
        .iter()
        .filter(|(var, _)| env::var_os(var).is_some())
        .map(|&(_, name)| name)
        .collect();

    match selected.as_slice() {
        [name] => {
            println!("cargo:rustc-env=ARC_HAL_BACKEND={name}");
        }
        [] => {
            eprintln!("arc-hal: no atomic backend selected");
            eprintln!("enable exactly one of: backend-llsc, backend-atld, backend-nps, backend-spinlock");
            std::process::exit(1);
        }
        many => {
            eprintln!("arc-hal: more than one atomic backend selected: {}", many.join(", "));
            eprintln!("backends cannot be mixed in one image");
            std::process::exit(1);
        }
    }
}
