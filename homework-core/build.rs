fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    // Pass through HOMEWORK_GIT_HASH from the deployment build environment
    println!("cargo:rerun-if-env-changed=HOMEWORK_GIT_HASH");
    if let Ok(hash) = std::env::var("HOMEWORK_GIT_HASH") {
        println!("cargo:rustc-env=HOMEWORK_GIT_HASH={}", hash);
    }
}
