//! Source locations.
//!
//! A [`SrcLoc`] names the region of source text a name, symbol, or
//! diagnostic came from. Locations are carried through every phase but the
//! middle end never reads source text itself, so a location is just file +
//! line/column coordinates.
//!
//! Locations order lexicographically (file, then begin position, then end
//! position) so that candidate lists in diagnostics can be sorted
//! deterministically.

use std::fmt;

/// A unique identifier for a source file, assigned by the host as files are
/// fed to the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// A dummy file id for synthesized constructs and tests.
    pub const UNKNOWN: FileId = FileId(u32::MAX);
}

/// Source location span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SrcLoc {
    /// The file this location points into.
    pub file: FileId,
    /// 1-based line of the first character.
    pub begin_line: u32,
    /// 1-based column of the first character.
    pub begin_col: u32,
    /// 1-based line one past the last character.
    pub end_line: u32,
    /// 1-based column one past the last character.
    pub end_col: u32,
}

impl SrcLoc {
    /// Location of a compiler-synthesized construct with no source text.
    pub const UNKNOWN: SrcLoc = SrcLoc {
        file: FileId::UNKNOWN,
        begin_line: 0,
        begin_col: 0,
        end_line: 0,
        end_col: 0,
    };

    /// A location spanning the given coordinates.
    pub const fn new(
        file: FileId,
        begin_line: u32,
        begin_col: u32,
        end_line: u32,
        end_col: u32,
    ) -> Self {
        Self {
            file,
            begin_line,
            begin_col,
            end_line,
            end_col,
        }
    }

    /// A single-point location, for tests and synthesized names.
    pub const fn point(file: FileId, line: u32, col: u32) -> Self {
        Self::new(file, line, col, line, col)
    }

    /// Whether this is the dummy location.
    pub fn is_unknown(&self) -> bool {
        self.file == FileId::UNKNOWN
    }
}

impl Default for SrcLoc {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.begin_line, self.begin_col)
        }
    }
}
