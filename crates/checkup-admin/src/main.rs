fn main() {
    if let Err(err) = checkup_admin::cli::main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
