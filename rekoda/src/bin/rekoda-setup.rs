//! rekoda-setup binary: the bootstrap pipeline alone, invoked with no arguments.

fn main() {
    match rekoda::run_setup_only() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
