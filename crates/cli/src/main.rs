fn main() {
    if let Err(error) = mapsketch_cli::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
