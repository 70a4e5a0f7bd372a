use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

mod command;
mod generator;
mod instruction;

use command::parse_line;
use generator::AssemblyGenerator;
use instruction::AsmInstruction;

fn main() {
    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.vm | directory> [output.asm]", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let explicit_output = args.get(2).map(Path::new);
    if let Err(e) = run(input_path, explicit_output) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(input_path: &Path, explicit_output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let sources = collect_sources(input_path)?;
    let output_path = explicit_output.map_or_else(|| output_path(input_path), Path::to_path_buf);
    let mut out = BufWriter::new(File::create(&output_path)?);

    let mut generator = AssemblyGenerator::new();
    if input_path.is_dir() {
        write_all(&mut out, &generator.bootstrap())?;
    }

    for source in &sources {
        let module_name = source
            .file_stem()
            .ok_or("VM file has no stem")?
            .to_string_lossy()
            .into_owned();
        generator.set_module(module_name);

        let reader = BufReader::new(File::open(source)?);
        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let command = parse_line(&line).map_err(|e| format!("{}:{}: {e}", source.display(), line_number + 1))?;
            if let Some(command) = command {
                write_all(&mut out, &generator.translate(&command))?;
            }
        }
    }

    out.flush()?;
    println!("Translation complete: {} -> {}", input_path.display(), output_path.display());
    Ok(())
}

fn write_all(out: &mut impl Write, instructions: &[AsmInstruction]) -> std::io::Result<()> {
    for instruction in instructions {
        writeln!(out, "{}", instruction.render())?;
    }
    Ok(())
}

/// A single `.vm` file, or every `.vm` file in a directory sorted by filename.
fn collect_sources(input_path: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if input_path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(input_path)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("vm"))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(format!("no .vm files found in {}", input_path.display()).into());
        }
        Ok(files)
    } else {
        Ok(vec![input_path.to_path_buf()])
    }
}

fn output_path(input_path: &Path) -> PathBuf {
    if input_path.is_dir() {
        let name = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        input_path.join(format!("{name}.asm"))
    } else {
        input_path.with_extension("asm")
    }
}
