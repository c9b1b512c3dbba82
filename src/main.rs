fn main() {
    if let Err(err) = barcode_families::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
