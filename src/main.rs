fn main() {
    std::process::exit(cllm::cli::main());
}
