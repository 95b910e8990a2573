//! Header parsing using libclang.

use crate::lower::{function_kind, lower_function};
use miette::{miette, Result};
use mockgen_core::FunctionDecl;
use std::ffi::CString;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

/// Source language of the parsed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    C,
    #[default]
    Cpp,
}

/// Compiler settings for one parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub language: Language,
    /// Language standard (`c++14`, `gnu11`, ...); `c++17` for C++ when unset
    pub std: Option<String>,
    /// `-I` directories
    pub include_paths: Vec<PathBuf>,
    /// `-D` definitions (`NAME` or `NAME=VALUE`)
    pub defines: Vec<String>,
}

impl ParseOptions {
    /// Compiler arguments for libclang.
    fn compiler_args(&self) -> Result<Vec<CString>> {
        let mut args = vec!["-x".to_string()];
        match self.language {
            Language::C => {
                args.push("c".to_string());
                if let Some(std) = &self.std {
                    args.push(format!("-std={}", std));
                }
            }
            Language::Cpp => {
                args.push("c++".to_string());
                args.push(format!("-std={}", self.std.as_deref().unwrap_or("c++17")));
            }
        }
        for dir in &self.include_paths {
            args.push(format!("-I{}", dir.display()));
        }
        for define in &self.defines {
            args.push(format!("-D{}", define));
        }

        args.into_iter()
            .map(|arg| CString::new(arg.as_str()).map_err(|_| miette!("Invalid argument: {}", arg)))
            .collect()
    }
}

/// Parser that uses libclang to read function declarations from a header.
pub struct ClangParser {
    index: clang_sys::CXIndex,
}

impl ClangParser {
    /// Create a new Clang parser.
    pub fn new() -> Result<Self> {
        unsafe {
            let index = clang_sys::clang_createIndex(0, 0);
            if index.is_null() {
                return Err(miette!("Failed to create clang index"));
            }
            Ok(Self { index })
        }
    }

    /// Parse a header file and return its function declarations in source order.
    pub fn parse_file(&self, path: &Path, options: &ParseOptions) -> Result<Vec<FunctionDecl>> {
        let path_str = path.to_string_lossy();
        let c_path =
            CString::new(path_str.as_ref()).map_err(|_| miette!("Invalid path: {}", path_str))?;

        self.parse(&c_path, None, options)
            .map_err(|e| miette!("Failed to parse {}: {}", path_str, e))
    }

    /// Parse header source code from a string.
    pub fn parse_string(
        &self,
        source: &str,
        filename: &str,
        options: &ParseOptions,
    ) -> Result<Vec<FunctionDecl>> {
        let c_filename =
            CString::new(filename).map_err(|_| miette!("Invalid file name: {}", filename))?;
        let c_source = CString::new(source).map_err(|_| miette!("Source contains a NUL byte"))?;

        let unsaved_file = clang_sys::CXUnsavedFile {
            Filename: c_filename.as_ptr(),
            Contents: c_source.as_ptr(),
            Length: source.len() as _,
        };

        self.parse(&c_filename, Some(unsaved_file), options)
    }

    fn parse(
        &self,
        filename: &CString,
        unsaved: Option<clang_sys::CXUnsavedFile>,
        options: &ParseOptions,
    ) -> Result<Vec<FunctionDecl>> {
        let args = options.compiler_args()?;
        let c_args: Vec<*const c_char> = args.iter().map(|s| s.as_ptr()).collect();

        let mut unsaved_files: Vec<clang_sys::CXUnsavedFile> = unsaved.into_iter().collect();

        unsafe {
            let tu = clang_sys::clang_parseTranslationUnit(
                self.index,
                filename.as_ptr(),
                c_args.as_ptr(),
                c_args.len() as i32,
                unsaved_files.as_mut_ptr(),
                unsaved_files.len() as u32,
                clang_sys::CXTranslationUnit_None,
            );

            if tu.is_null() {
                return Err(miette!("Failed to create translation unit"));
            }

            // Any error diagnostic aborts the unit
            let mut errors = Vec::new();
            let num_diagnostics = clang_sys::clang_getNumDiagnostics(tu);
            for i in 0..num_diagnostics {
                let diag = clang_sys::clang_getDiagnostic(tu, i);
                let severity = clang_sys::clang_getDiagnosticSeverity(diag);

                if severity >= clang_sys::CXDiagnostic_Error {
                    let formatted = clang_sys::clang_formatDiagnostic(
                        diag,
                        clang_sys::clang_defaultDiagnosticDisplayOptions(),
                    );
                    errors.push(crate::lower::cx_string_to_string(formatted));
                }
                clang_sys::clang_disposeDiagnostic(diag);
            }

            if !errors.is_empty() {
                clang_sys::clang_disposeTranslationUnit(tu);
                return Err(miette!("Clang error: {}", errors.join("\n")));
            }

            let mut collector = Collector::default();
            let cursor = clang_sys::clang_getTranslationUnitCursor(tu);
            clang_sys::clang_visitChildren(
                cursor,
                visitor,
                &mut collector as *mut Collector as clang_sys::CXClientData,
            );

            clang_sys::clang_disposeTranslationUnit(tu);

            log::debug!("collected {} function declarations", collector.decls.len());
            Ok(collector.decls)
        }
    }
}

impl Drop for ClangParser {
    fn drop(&mut self) {
        unsafe {
            clang_sys::clang_disposeIndex(self.index);
        }
    }
}

/// Visitor state: declarations of the main file, in source order.
#[derive(Default)]
struct Collector {
    decls: Vec<FunctionDecl>,
}

extern "C" fn visitor(
    cursor: clang_sys::CXCursor,
    _parent: clang_sys::CXCursor,
    data: clang_sys::CXClientData,
) -> clang_sys::CXChildVisitResult {
    unsafe {
        let collector = &mut *(data as *mut Collector);

        if clang_sys::clang_Cursor_isNull(cursor) != 0 {
            return clang_sys::CXChildVisit_Continue;
        }

        // Declarations pulled in from other headers are not mocked
        let location = clang_sys::clang_getCursorLocation(cursor);
        if clang_sys::clang_Location_isFromMainFile(location) == 0 {
            return clang_sys::CXChildVisit_Continue;
        }

        let kind = clang_sys::clang_getCursorKind(cursor);
        match kind {
            clang_sys::CXCursor_Namespace
            | clang_sys::CXCursor_ClassDecl
            | clang_sys::CXCursor_StructDecl
            | clang_sys::CXCursor_UnionDecl
            | clang_sys::CXCursor_LinkageSpec
            | clang_sys::CXCursor_ClassTemplate => clang_sys::CXChildVisit_Recurse,
            _ => {
                if let Some(decl_kind) = function_kind(kind) {
                    collector.decls.push(lower_function(cursor, decl_kind));
                }
                clang_sys::CXChildVisit_Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_defaults_to_cpp17() {
        let args: Vec<String> = ParseOptions::default()
            .compiler_args()
            .unwrap()
            .into_iter()
            .map(|s| s.into_string().unwrap())
            .collect();
        assert_eq!(args, vec!["-x", "c++", "-std=c++17"]);
    }

    #[test]
    fn test_compiler_args() {
        let options = ParseOptions {
            language: Language::C,
            std: Some("c11".to_string()),
            include_paths: vec![PathBuf::from("inc")],
            defines: vec!["FOO=1".to_string()],
        };
        let args: Vec<String> = options
            .compiler_args()
            .unwrap()
            .into_iter()
            .map(|s| s.into_string().unwrap())
            .collect();
        assert_eq!(args, vec!["-x", "c", "-std=c11", "-Iinc", "-DFOO=1"]);
    }

    #[test]
    fn test_parse_simple_function() {
        let parser = ClangParser::new().unwrap();
        let decls = parser
            .parse_string("int add(int a, int b);", "test.h", &ParseOptions::default())
            .unwrap();

        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "add");
        assert_eq!(decls[0].params.len(), 2);
        assert_eq!(decls[0].params[1].name, "b");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let parser = ClangParser::new().unwrap();
        let result = parser.parse_string("int f(undeclared_t x);", "test.h", &ParseOptions::default());
        assert!(result.is_err());
    }
}
