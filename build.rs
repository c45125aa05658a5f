fn main() {
    // Propagate the ESP-IDF build environment for hardware targets.
    // On host builds this emits nothing and the script is a no-op.
    embuild::espidf::sysenv::output();
}
