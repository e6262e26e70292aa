fn main() {
    // Emits ESP-IDF link/search directives when the espidf build environment
    // is present; a no-op for plain host builds.
    embuild::espidf::sysenv::output();
}
