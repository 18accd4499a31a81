fn main() {
    if let Err(err) = spotistats::run() {
        eprintln!("spotistats: {err:#}");
        std::process::exit(1);
    }
}
