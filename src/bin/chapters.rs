use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    chapters::cli::run(std::env::args().skip(1))
}
