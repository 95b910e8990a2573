//! Output destinations and generated-file layout.

use crate::error::{DriverError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where one generated text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Mock file for `input`: `@` is stdout, a directory receives `<stem>_mock.cpp`.
    pub fn mock(arg: &Path, input: &Path) -> Self {
        if is_stdout(arg) {
            OutputTarget::Stdout
        } else if is_directory(arg) {
            OutputTarget::File(arg.join(format!("{}_mock.cpp", stem(input))))
        } else {
            OutputTarget::File(arg.to_path_buf())
        }
    }

    /// Expectation header and implementation for `input`.
    ///
    /// A directory receives `<stem>_expect.hpp` and `<stem>_expect.cpp`; a file
    /// path names both through its extension.
    pub fn expectation(arg: &Path, input: &Path) -> (Self, Self) {
        if is_stdout(arg) {
            (OutputTarget::Stdout, OutputTarget::Stdout)
        } else if is_directory(arg) {
            let base = arg.join(format!("{}_expect", stem(input)));
            (
                OutputTarget::File(base.with_extension("hpp")),
                OutputTarget::File(base.with_extension("cpp")),
            )
        } else {
            (
                OutputTarget::File(arg.with_extension("hpp")),
                OutputTarget::File(arg.with_extension("cpp")),
            )
        }
    }

    /// Write `contents` to this target.
    pub fn write(&self, contents: &str) -> Result<()> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(contents.as_bytes())
                    .map_err(|source| DriverError::WriteOutput {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })
            }
            OutputTarget::File(path) => {
                std::fs::write(path, contents).map_err(|source| DriverError::WriteOutput {
                    path: path.clone(),
                    source,
                })?;
                log::info!("wrote {}", path.display());
                Ok(())
            }
        }
    }

    /// File name used when another output includes this one.
    pub fn include_name(&self, fallback: &str) -> String {
        match self {
            OutputTarget::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| fallback.to_string()),
            OutputTarget::Stdout => fallback.to_string(),
        }
    }
}

fn is_stdout(arg: &Path) -> bool {
    arg.as_os_str() == "@"
}

fn is_directory(arg: &Path) -> bool {
    arg.is_dir() || arg.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR)
}

/// File stem of the input header (`api` for `include/api.h`).
pub fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Comment block at the top of every generated file.
pub fn banner() -> String {
    format!(
        "/*\n * This file has been auto-generated by CppUMockGen v{}.\n *\n * Contents will NOT be preserved if it is regenerated!!!\n */\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_marker() {
        let input = Path::new("include/api.h");
        assert_eq!(OutputTarget::mock(Path::new("@"), input), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::expectation(Path::new("@"), input),
            (OutputTarget::Stdout, OutputTarget::Stdout)
        );
    }

    #[test]
    fn test_directory_naming() {
        let dir = tempfile::tempdir().unwrap();
        let input = Path::new("include/api.h");

        assert_eq!(
            OutputTarget::mock(dir.path(), input),
            OutputTarget::File(dir.path().join("api_mock.cpp"))
        );
        let (header, implementation) = OutputTarget::expectation(dir.path(), input);
        assert_eq!(header, OutputTarget::File(dir.path().join("api_expect.hpp")));
        assert_eq!(
            implementation,
            OutputTarget::File(dir.path().join("api_expect.cpp"))
        );
    }

    #[test]
    fn test_explicit_file_naming() {
        let input = Path::new("api.h");
        assert_eq!(
            OutputTarget::mock(Path::new("out/mocks.cpp"), input),
            OutputTarget::File(PathBuf::from("out/mocks.cpp"))
        );
        let (header, implementation) = OutputTarget::expectation(Path::new("out/expect.cc"), input);
        assert_eq!(header, OutputTarget::File(PathBuf::from("out/expect.hpp")));
        assert_eq!(implementation, OutputTarget::File(PathBuf::from("out/expect.cpp")));
        assert_eq!(header.include_name("api_expect.hpp"), "expect.hpp");
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cpp");
        OutputTarget::File(path.clone()).write("int x;\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int x;\n");

        let missing = OutputTarget::File(dir.path().join("missing/out.cpp"));
        assert!(matches!(
            missing.write(""),
            Err(DriverError::WriteOutput { .. })
        ));
    }

    #[test]
    fn test_banner() {
        let banner = banner();
        assert!(banner.starts_with("/*\n"));
        assert!(banner.contains("auto-generated by CppUMockGen"));
        assert!(banner.ends_with(" */\n"));
    }
}
