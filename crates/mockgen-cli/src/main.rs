use clap::Parser;
use miette::Result;
use mockgen_driver::{stem, ConfigFile, Driver, GeneratorOptions, OutputTarget};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cppumockgen")]
#[command(author, version, about = "Generate CppUTest mocks and expectations from a C/C++ header")]
struct Cli {
    /// Header file to mock
    input: PathBuf,

    /// Mock output file or directory (`@` for stdout)
    #[arg(short = 'm', long = "mock-output", value_name = "PATH")]
    mock_output: Option<PathBuf>,

    /// Expectation output file or directory (`@` for stdout)
    #[arg(short = 'e', long = "expect-output", value_name = "PATH")]
    expect_output: Option<PathBuf>,

    /// Parse the input as C++ regardless of its extension
    #[arg(short = 'x', long = "cpp")]
    cpp: bool,

    /// Register typedef'd records under their underlying name
    #[arg(short = 'u', long = "underlying-typedef")]
    underlying_typedef: bool,

    /// Include directory
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    include_paths: Vec<PathBuf>,

    /// Preprocessor definition (`NAME` or `NAME=VALUE`)
    #[arg(short = 'D', long = "define", value_name = "DEF")]
    defines: Vec<String>,

    /// Language standard (e.g. c++14, c11)
    #[arg(short = 's', long = "std")]
    std: Option<String>,

    /// Parameter override (`func#arg=<spec>` or `func@=<spec>`)
    #[arg(short = 'p', long = "param-override", value_name = "OVERRIDE")]
    param_overrides: Vec<String>,

    /// Type override (`#Type=<spec>` or `@Type=<spec>`)
    #[arg(short = 't', long = "type-override", value_name = "OVERRIDE")]
    type_overrides: Vec<String>,

    /// TOML configuration file; command-line options extend it
    #[arg(long)]
    config: Option<PathBuf>,

    /// More logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn generator_options(&self) -> Result<GeneratorOptions> {
        let mut options = match &self.config {
            Some(path) => GeneratorOptions::from_config_file(&ConfigFile::from_file(path)?)?,
            None => GeneratorOptions::new(),
        };

        options.force_cpp |= self.cpp;
        if self.underlying_typedef {
            options.config.set_use_underlying_typedef(true);
        }
        options.parse.include_paths.extend(self.include_paths.iter().cloned());
        options.parse.defines.extend(self.defines.iter().cloned());
        if self.std.is_some() {
            options.parse.std = self.std.clone();
        }
        for text in &self.param_overrides {
            options.add_param_override(text)?;
        }
        for text in &self.type_overrides {
            options.add_type_override(text)?;
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.mock_output.is_none() && cli.expect_output.is_none() {
        return Err(miette::miette!(
            help = "pass -m and/or -e, with `@` to print to stdout",
            "No output requested"
        ));
    }

    let driver = Driver::new(cli.generator_options()?)?;
    log::debug!("mocking {}", cli.input.display());
    let mut output = driver.process_file(&cli.input)?;

    for unsupported in std::mem::take(&mut output.unsupported) {
        eprintln!("{:?}", miette::Report::new(unsupported));
    }

    let input_include = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.input.display().to_string());

    if let Some(arg) = &cli.mock_output {
        OutputTarget::mock(arg, &cli.input).write(&output.mock_file(&input_include))?;
    }

    if let Some(arg) = &cli.expect_output {
        let (header, implementation) = OutputTarget::expectation(arg, &cli.input);
        let header_include = header.include_name(&format!("{}_expect.hpp", stem(&cli.input)));
        header.write(&output.expectation_header_file(&input_include))?;
        implementation.write(&output.expectation_impl_file(&header_include))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "cppumockgen",
            "api.h",
            "-m",
            "@",
            "-e",
            "out/",
            "-x",
            "-u",
            "-I",
            "include",
            "-D",
            "NDEBUG",
            "-s",
            "c++14",
            "-p",
            "f#p=Int",
            "-t",
            "#Type1=Long",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("api.h"));
        assert!(cli.cpp);
        assert_eq!(cli.verbose, 2);

        let options = cli.generator_options().unwrap();
        assert!(options.force_cpp);
        assert_eq!(options.parse.std.as_deref(), Some("c++14"));
        assert_eq!(options.parse.include_paths, vec![PathBuf::from("include")]);
        assert_eq!(options.config.override_count(), 2);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let cli = Cli::try_parse_from(["cppumockgen", "api.h", "-m", "@", "-p", "f#p=Nope"]).unwrap();
        assert!(cli.generator_options().is_err());
    }

    #[test]
    fn test_config_file_is_extended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mockgen.toml");
        std::fs::write(
            &path,
            "includes = [\"from_file\"]\n\n[param_overrides]\n\"g@\" = \"Int\"\n",
        )
        .unwrap();

        let args: Vec<OsString> = vec![
            "cppumockgen".into(),
            "api.h".into(),
            "--config".into(),
            path.into_os_string(),
            "-I".into(),
            "from_cli".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let options = cli.generator_options().unwrap();
        assert_eq!(
            options.parse.include_paths,
            vec![PathBuf::from("from_file"), PathBuf::from("from_cli")]
        );
        assert_eq!(options.config.override_count(), 1);
    }
}
