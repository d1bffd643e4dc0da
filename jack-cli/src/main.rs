//! Entrypoint for CLI
mod error;
mod files;

use std::{
    env,
    error::Error,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use jack::{prelude::*, IMPL_VERSION};
use log::{error, info};

use crate::error::CliError;

static USAGE: &str = r#"
usage: jackc CMD PATH [OPTIONS]

commands:
    compile   Compile a .jack file, or every .jack file in a directory,
              into .vm files next to the sources
    tokens    Print the token listing of the sources as XML

options:
    --config FILE       Load compiler settings from a YAML file
    --qualify-labels    Prefix generated labels with the function name

examples:
    jackc compile Pong/
    jackc compile Main.jack --qualify-labels
    jackc tokens Main.jack
"#;

/// Compile every source, writing output only for units without errors.
///
/// Returns the number of units that failed.
fn run_compiler(path: &Path, conf: &CompilerConf) -> Result<usize, CliError> {
    let mut failed = 0;

    for source in files::collect_sources(path)? {
        match compile_file(&source, conf) {
            Ok(output) => info!("compiled {} -> {}", source.display(), output.display()),
            Err(err) => {
                error!("{err}");
                failed += 1;
            }
        }
    }

    Ok(failed)
}

fn compile_file(source: &Path, conf: &CompilerConf) -> Result<PathBuf, CliError> {
    let source_code = fs::read_to_string(source)?;
    let writer = compile_with(&source_code, conf.clone()).map_err(|err| CliError::jack(source, err))?;

    // Rendered in full before the output file is touched.
    let output = files::output_path(source);
    fs::write(&output, writer.to_string())?;

    Ok(output)
}

fn run_tokens(path: &Path) -> Result<usize, CliError> {
    let mut failed = 0;
    let stdout = io::stdout();

    for source in files::collect_sources(path)? {
        let source_code = fs::read_to_string(&source)?;
        match token_listing(&source_code) {
            Ok(listing) => stdout.lock().write_all(listing.as_bytes())?,
            Err(err) => {
                error!("{}", CliError::jack(&source, err));
                failed += 1;
            }
        }
    }

    Ok(failed)
}

fn load_config(filepath: &Path) -> Result<CompilerConf, CliError> {
    let mut file = fs::File::open(filepath)?;
    let conf: CompilerConf = serde_yaml::from_reader(&mut file)?;
    log::debug!("loaded compiler config: {:#?}", conf);
    Ok(conf)
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let failed = match parse_args(env::args().skip(1)) {
        Some(Cmd::Compile {
            path,
            config,
            qualify_labels,
        }) => {
            let mut conf = match config {
                Some(filepath) => load_config(&filepath)?,
                None => CompilerConf::default(),
            };
            // Flags override the config file.
            conf.qualify_labels |= qualify_labels;

            run_compiler(&path, &conf)?
        }
        Some(Cmd::Tokens { path }) => run_tokens(&path)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    if failed > 0 {
        error!("{failed} unit(s) failed to compile");
        std::process::exit(1)
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Cmd> {
    match args.next()?.as_str() {
        "compile" => {
            let path = PathBuf::from(args.next()?);
            let mut config = None;
            let mut qualify_labels = false;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--config" => config = Some(PathBuf::from(args.next()?)),
                    "--qualify-labels" => qualify_labels = true,
                    _ => return None,
                }
            }

            Some(Cmd::Compile {
                path,
                config,
                qualify_labels,
            })
        }
        "tokens" => {
            let path = PathBuf::from(args.next()?);
            match args.next() {
                Some(_) => None,
                None => Some(Cmd::Tokens { path }),
            }
        }
        _ => None,
    }
}

fn print_usage() {
    println!("Jack compiler v{IMPL_VERSION}");
    println!("{USAGE}");
}

#[derive(Debug, PartialEq, Eq)]
enum Cmd {
    /// Compile sources to VM code
    Compile {
        path: PathBuf,
        config: Option<PathBuf>,
        qualify_labels: bool,
    },
    /// Print token listing
    Tokens { path: PathBuf },
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(line: &str) -> impl Iterator<Item = String> + '_ {
        line.split_whitespace().map(str::to_owned)
    }

    #[test]
    fn test_parse_compile() {
        assert_eq!(
            parse_args(args("compile Pong --qualify-labels --config jack.yaml")),
            Some(Cmd::Compile {
                path: "Pong".into(),
                config: Some("jack.yaml".into()),
                qualify_labels: true,
            })
        );
        assert_eq!(
            parse_args(args("compile Main.jack")),
            Some(Cmd::Compile {
                path: "Main.jack".into(),
                config: None,
                qualify_labels: false,
            })
        );
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(
            parse_args(args("tokens Main.jack")),
            Some(Cmd::Tokens {
                path: "Main.jack".into()
            })
        );
    }

    #[test]
    fn test_parse_bad_usage() {
        assert_eq!(parse_args(args("")), None);
        assert_eq!(parse_args(args("run Main.jack")), None);
        assert_eq!(parse_args(args("compile")), None);
        assert_eq!(parse_args(args("compile Main.jack --config")), None);
        assert_eq!(parse_args(args("compile Main.jack --verbose")), None);
        assert_eq!(parse_args(args("tokens Main.jack extra")), None);
    }

    #[test]
    fn test_compile_file_output() {
        let dir = env::temp_dir().join(format!("jackc-output-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let conf = CompilerConf::default();

        let good = dir.join("Good.jack");
        fs::write(&good, "class Good { function void f() { return; } }").unwrap();
        let output = compile_file(&good, &conf).unwrap();
        assert_eq!(output, dir.join("Good.vm"));
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "function Good.f 0\npush constant 0\nreturn\n"
        );

        // A unit that fails leaves its previous output untouched.
        let bad = dir.join("Bad.jack");
        fs::write(&bad, "class Bad { function void f() { let x = 1; return; } }").unwrap();
        fs::write(dir.join("Bad.vm"), "previous\n").unwrap();
        assert!(compile_file(&bad, &conf).is_err());
        assert_eq!(fs::read_to_string(dir.join("Bad.vm")).unwrap(), "previous\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_yaml() {
        let conf: CompilerConf = serde_yaml::from_str("qualify_labels: true").unwrap();
        assert!(conf.qualify_labels);

        // Missing keys keep their defaults.
        let conf: CompilerConf = serde_yaml::from_str("{}").unwrap();
        assert!(!conf.qualify_labels);
    }
}
