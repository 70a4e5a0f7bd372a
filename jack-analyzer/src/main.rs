use std::env;
use std::fs;
use std::path::Path;

mod error;
mod parser;
mod token;
mod tokenizer;

use parser::Parser;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <input.jack> <output>", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let output_path = Path::new(&args[2]);
    if let Err(e) = run(input_path, output_path) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(input_path: &Path, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input_path)?;
    let parser = Parser::new(&source)?;
    let lines = parser.parse_class()?;
    fs::write(output_path, lines.join("\n") + "\n")?;
    println!("Analysis complete: {} -> {}", input_path.display(), output_path.display());
    Ok(())
}
