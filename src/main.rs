fn main() {
    if let Err(err) = cropsight::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
