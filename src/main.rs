mod analyzer;
mod cli;
mod error_handling;
mod generator;
mod grammar;
mod parser;

use std::process;

use clap::Parser;
use log::info;

use error_handling::{ErrorType, Errors};
use generator::Generator;
use parser::DefectKind;

fn report<T: ErrorType>(errors: &Errors<T>) {
    for error in errors {
        eprintln!("{}", error);
    }
}

fn main() {
    pretty_env_logger::init();
    let cli = cli::Cli::parse();

    let grammar = match parser::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(defects) => {
            report(&defects);
            let unreadable = defects.iter().any(|d| matches!(d.error, DefectKind::FileError(_)));
            process::exit(if unreadable { exitcode::IOERR } else { exitcode::DATAERR })
        }
    };

    let productivity = match analyzer::verify(&grammar) {
        Ok(productivity) => productivity,
        Err(defects) => {
            report(&defects);
            process::exit(exitcode::DATAERR)
        }
    };

    info!("{} is valid", cli.file.display());
    if !cli.quiet {
        println!("{}: ok", cli.file.display());
    }

    let generator = Generator::new(&grammar, &productivity, cli.max_depth);
    let mut rng = rand::thread_rng();
    for _ in 0..cli.samples {
        let sentence = match &cli.start {
            Some(start) => generator.generate_from(start, &mut rng),
            None => generator.generate(&mut rng),
        };

        match sentence {
            Ok(sentence) => println!("{}", sentence),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(exitcode::USAGE)
            }
        }
    }
}
