use std::path::Path;

fn main() {
    let model = Path::new("model/seeta_fd_frontal_v1.0.bin");
    println!("cargo:rerun-if-changed=model/seeta_fd_frontal_v1.0.bin");
    println!("cargo:rustc-check-cfg=cfg(embedded_model)");

    // Compile the SeetaFace model in whenever it is vendored.
    if model.is_file() {
        println!("cargo:rustc-cfg=embedded_model");
    } else {
        println!(
            "cargo:warning=model/seeta_fd_frontal_v1.0.bin not found, facecrop will need --model"
        );
    }
}
