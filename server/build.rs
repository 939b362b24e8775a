fn main() {
    println!("cargo:rerun-if-changed=proto/log_record.proto");
    prost_build::compile_protos(&["proto/log_record.proto"], &["proto/"])
        .expect("failed to compile log_record.proto");
}
