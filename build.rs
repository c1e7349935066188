fn main() {
    // Host builds carry no ESP-IDF toolchain; only flash builds need the
    // linker arguments embuild exports.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
