//! Per-header pipeline: parse, translate, assemble.

use crate::config::GeneratorOptions;
use crate::error::Result;
use crate::output::banner;
use mockgen_clang::{ClangParser, Language};
use mockgen_core::{FunctionDecl, GeneratedMock, MockGenError, MockGenerator, Outcome};
use std::path::Path;

/// Everything generated for one input header.
#[derive(Debug)]
pub struct UnitOutput {
    pub language: Language,
    /// Per-declaration results, in declaration order
    pub mocks: Vec<GeneratedMock>,
    pub skipped: usize,
    /// Declarations left out because a type could not be mocked
    pub unsupported: Vec<MockGenError>,
}

impl UnitOutput {
    /// Mock file text; `input_include` is the header being mocked.
    pub fn mock_file(&self, input_include: &str) -> String {
        let mut out = banner();
        out.push('\n');
        out.push_str(&self.input_include(input_include));
        out.push_str("\n#include <CppUTestExt/MockSupport.h>\n");
        for mock in &self.mocks {
            out.push('\n');
            out.push_str(&mock.mock);
        }
        out
    }

    /// Expectation header text.
    pub fn expectation_header_file(&self, input_include: &str) -> String {
        let mut out = banner();
        out.push('\n');
        out.push_str(&self.input_include(input_include));
        out.push_str("\n#include <CppUTestExt/MockSupport.h>\n");
        out.push_str("#include \"CppUMockGen.hpp\"\n");
        for mock in &self.mocks {
            out.push('\n');
            out.push_str(&mock.expectation_header);
        }
        out
    }

    /// Expectation implementation text; `header_include` is the expectation header.
    pub fn expectation_impl_file(&self, header_include: &str) -> String {
        let mut out = banner();
        out.push_str(&format!("\n#include \"{}\"\n", header_include));
        for mock in &self.mocks {
            out.push('\n');
            out.push_str(&mock.expectation_impl);
        }
        out
    }

    fn input_include(&self, input_include: &str) -> String {
        match self.language {
            Language::C => format!("extern \"C\" {{\n#include \"{}\"\n}}\n", input_include),
            Language::Cpp => format!("#include \"{}\"\n", input_include),
        }
    }
}

/// Mock generator driver for one or more headers.
pub struct Driver {
    parser: ClangParser,
    options: GeneratorOptions,
}

impl Driver {
    pub fn new(options: GeneratorOptions) -> Result<Self> {
        let parser =
            ClangParser::new().map_err(|e| MockGenError::ParserFailure(e.to_string()))?;
        Ok(Self { parser, options })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Parse and translate a header file.
    pub fn process_file(&self, input: &Path) -> Result<UnitOutput> {
        let parse = self.options.parse_options_for(input);
        let decls = self
            .parser
            .parse_file(input, &parse)
            .map_err(|e| MockGenError::ParserFailure(e.to_string()))?;
        self.translate(&decls, parse.language)
    }

    /// Parse and translate header source held in memory.
    pub fn process_source(&self, source: &str, filename: &str) -> Result<UnitOutput> {
        let parse = self.options.parse_options_for(Path::new(filename));
        let decls = self
            .parser
            .parse_string(source, filename, &parse)
            .map_err(|e| MockGenError::ParserFailure(e.to_string()))?;
        self.translate(&decls, parse.language)
    }

    fn translate(&self, decls: &[FunctionDecl], language: Language) -> Result<UnitOutput> {
        let mut generator = MockGenerator::new(&self.options.config);
        let mut output = UnitOutput {
            language,
            mocks: Vec::new(),
            skipped: 0,
            unsupported: Vec::new(),
        };

        for decl in decls {
            match generator.generate(decl) {
                Ok(Outcome::Generated(generated)) => output.mocks.push(generated),
                Ok(Outcome::Skipped(_)) => output.skipped += 1,
                Err(e) if e.is_recoverable() => output.unsupported.push(e),
                Err(e) => return Err(e.into()),
            }
        }

        log::info!(
            "generated {} mocks ({} skipped, {} unsupported)",
            output.mocks.len(),
            output.skipped,
            output.unsupported.len()
        );
        Ok(output)
    }
}
