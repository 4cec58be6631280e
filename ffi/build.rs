use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=Cargo environment incomplete, skipping header generation");
        return;
    };
    let output_file = target_dir(out_dir).join("ecdsa_verifier.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("ECDSA_VERIFIER_H")
        .with_cpp_compat(true)
        .with_documentation(true)
        .with_parse_deps(false)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&output_file);
            println!("cargo:warning=Generated C header at: {}", output_file.display());
        }
        Err(e) => {
            println!("cargo:warning=Unable to generate bindings: {:?}", e);
            println!("cargo:warning=Continuing without header generation");
        }
    }
}

// OUT_DIR is target/<profile>/build/<crate>/out
fn target_dir(out_dir: String) -> PathBuf {
    let mut target_dir = PathBuf::from(out_dir);
    for _ in 0..3 {
        target_dir.pop();
    }
    target_dir
}
