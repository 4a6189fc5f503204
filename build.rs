// build.rs

fn main() {
    // notify-rust pulls in mac-notification-sys, which needs the CoreServices
    // and AppKit frameworks linked when targeting macOS.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("macos") {
        println!("cargo:rustc-link-lib=framework=CoreServices");
        println!("cargo:rustc-link-lib=framework=AppKit");
    }
}
