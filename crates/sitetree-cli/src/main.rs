#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = sitetree_cli::run_from_env() {
        eprintln!("sitetree: {error}");
        std::process::exit(error.exit_code());
    }
}
