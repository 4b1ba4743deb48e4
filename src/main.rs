fn main() {
    if let Err(err) = archflow_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
