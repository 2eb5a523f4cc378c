fn main() {
    if let Err(e) = copybench::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
