use std::{
    env,
    error::Error,
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write},
    process::ExitCode,
};

use rawdeflate::{deflate, inflate};

fn run(mode: &OsString, inp_fn: &OsString, outp_fn: &OsString) -> Result<(), Box<dyn Error>> {
    let inp = std::fs::read(inp_fn)?;
    let mut outp = Vec::new();

    match mode.to_str() {
        Some("c") => deflate(&inp, &mut outp)?,
        Some("d") => inflate(&inp, &mut outp)?,
        _ => return Err(format!("Invalid mode {}", mode.to_string_lossy()).into()),
    }

    let mut outp_f = BufWriter::new(File::create(outp_fn)?);
    outp_f.write_all(&outp)?;
    outp_f.flush()?;

    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<OsString> = env::args_os().collect();

    if args.len() < 4 {
        let name = args
            .first()
            .map_or("rawdeflate".into(), |a| a.to_string_lossy());
        eprintln!("Usage: {name} c|d input output");
        return ExitCode::FAILURE;
    }

    match run(&args[1], &args[2], &args[3]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rawdeflate: {e}");
            ExitCode::FAILURE
        }
    }
}
