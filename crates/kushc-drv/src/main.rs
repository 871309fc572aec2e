fn main() {
    if let Err(e) = kushc_drv::main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
