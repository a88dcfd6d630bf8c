//! Target specification types: entity kinds, option flags and per-target specs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::OptionError;

/// Kind of filesystem entity, determined without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum EntityKind {
    /// Regular file.
    #[strum(to_string = "regular file")]
    File,
    /// Directory.
    #[strum(to_string = "directory")]
    Directory,
    /// Symbolic link.
    #[strum(to_string = "symbolic link")]
    Symlink,
    /// Sockets, devices, FIFOs.
    #[strum(to_string = "other")]
    Other,
}

impl EntityKind {
    /// Whether a worker can be spawned for this kind.
    pub fn is_supported(&self) -> bool {
        !matches!(self, EntityKind::Other)
    }
}

/// A single option flag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Serialize, Deserialize)]
pub enum Flag {
    /// `-n`
    Name,
    /// `-d`
    Size,
    /// `-a`
    Access,
    /// `-c`
    Count,
    /// `-h`
    HardLinks,
    /// `-m`
    Modified,
    /// `-l`
    Link,
    /// `-t`
    TargetSize,
}

impl Flag {
    /// The character used on the command line.
    pub fn as_char(&self) -> char {
        match self {
            Flag::Name => 'n',
            Flag::Size => 'd',
            Flag::Access => 'a',
            Flag::Count => 'c',
            Flag::HardLinks => 'h',
            Flag::Modified => 'm',
            Flag::Link => 'l',
            Flag::TargetSize => 't',
        }
    }

    /// Look up a flag by its character.
    pub fn from_char(c: char) -> Option<Self> {
        Flag::iter().find(|flag| flag.as_char() == c)
    }

    /// Menu text for this flag on the given kind, or `None` if the flag
    /// does not apply to that kind.
    pub fn describe(&self, kind: EntityKind) -> Option<&'static str> {
        use EntityKind::*;
        let text = match (self, kind) {
            (Flag::Name, File | Directory | Symlink) => "Name",
            (Flag::Size, Directory) => "Total size of directory",
            (Flag::Size, File) => "Size of file",
            (Flag::Size, Symlink) => "Size of link",
            (Flag::Access, File | Directory | Symlink) => "Access rights",
            (Flag::Count, Directory) => "Number of .c files",
            (Flag::Count, File) => "Number of lines",
            (Flag::HardLinks, File) => "Hard link count",
            (Flag::Modified, File | Directory | Symlink) => "Time of last modification",
            (Flag::Link, File) => "Create symbolic link",
            (Flag::Link, Symlink) => "Delete symbolic link",
            (Flag::TargetSize, Symlink) => "Size of target file",
            _ => return None,
        };
        Some(text)
    }

    /// Whether this flag is accepted for the given kind.
    pub fn valid_for(&self, kind: EntityKind) -> bool {
        self.describe(kind).is_some()
    }

    /// All flags valid for a kind, in menu order.
    pub fn menu(kind: EntityKind) -> Vec<Flag> {
        Flag::iter().filter(|flag| flag.valid_for(kind)).collect()
    }
}

/// Parsed option flags for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    flags: BTreeSet<Flag>,
}

impl Options {
    /// Parse an option string like `-nda` for an entity of the given kind.
    ///
    /// The first character that is unknown or not valid for `kind` fails
    /// the whole parse.
    pub fn parse(input: &str, kind: EntityKind) -> Result<Self, OptionError> {
        let Some(rest) = input.strip_prefix('-') else {
            return Err(OptionError::MissingDash {
                input: input.to_string(),
            });
        };

        if rest.is_empty() {
            return Err(OptionError::Empty);
        }

        let mut flags = BTreeSet::new();
        for c in rest.chars() {
            match Flag::from_char(c) {
                Some(flag) if flag.valid_for(kind) => {
                    flags.insert(flag);
                }
                _ => return Err(OptionError::InvalidFlag { flag: c, kind }),
            }
        }

        Ok(Self { flags })
    }

    /// Build options directly from a set of flags.
    pub fn from_flags(flags: impl IntoIterator<Item = Flag>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    /// Check if a flag was requested.
    pub fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Iterate requested flags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        self.flags.iter().copied()
    }

    /// Check if no flags were requested.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Everything a worker needs to inspect one target.
///
/// Built before any worker starts and moved into exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Path as given on the command line.
    pub path: PathBuf,
    /// Kind determined without following symlinks.
    pub kind: EntityKind,
    /// Requested flags.
    pub options: Options,
    /// Name of the symlink to create (`-l` on a regular file).
    pub link_name: Option<String>,
}

impl TargetSpec {
    /// Create a spec, checking that a link name accompanies `-l` on a file.
    pub fn new(
        path: impl Into<PathBuf>,
        kind: EntityKind,
        options: Options,
        link_name: Option<String>,
    ) -> Result<Self, OptionError> {
        let needs_link = kind == EntityKind::File && options.has(Flag::Link);
        let link_name = link_name.filter(|name| !name.is_empty());
        if needs_link && link_name.is_none() {
            return Err(OptionError::MissingLinkName);
        }

        Ok(Self {
            path: path.into(),
            kind,
            options,
            link_name: if needs_link { link_name } else { None },
        })
    }

    /// Whether this target is a regular file with the given source extension.
    pub fn is_source(&self, extension: &str) -> bool {
        self.kind == EntityKind::File && has_extension(&self.path, extension)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directory_flags() {
        let opts = Options::parse("-ndac", EntityKind::Directory).unwrap();
        assert!(opts.has(Flag::Name));
        assert!(opts.has(Flag::Size));
        assert!(opts.has(Flag::Access));
        assert!(opts.has(Flag::Count));
        assert!(!opts.has(Flag::TargetSize));
    }

    #[test]
    fn test_parse_rejects_flag_for_wrong_kind() {
        let err = Options::parse("-nt", EntityKind::Directory).unwrap_err();
        assert_eq!(
            err,
            OptionError::InvalidFlag {
                flag: 't',
                kind: EntityKind::Directory
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        let err = Options::parse("-nq", EntityKind::File).unwrap_err();
        assert!(matches!(err, OptionError::InvalidFlag { flag: 'q', .. }));
    }

    #[test]
    fn test_parse_requires_dash() {
        assert!(matches!(
            Options::parse("nd", EntityKind::File),
            Err(OptionError::MissingDash { .. })
        ));
        assert_eq!(Options::parse("-", EntityKind::File), Err(OptionError::Empty));
    }

    #[test]
    fn test_menu_per_kind() {
        let chars: String = Flag::menu(EntityKind::Symlink)
            .iter()
            .map(|f| f.as_char())
            .collect();
        assert_eq!(chars, "ndamlt");

        let chars: String = Flag::menu(EntityKind::File)
            .iter()
            .map(|f| f.as_char())
            .collect();
        assert_eq!(chars, "ndachml");
    }

    #[test]
    fn test_link_name_required_for_file() {
        let opts = Options::parse("-l", EntityKind::File).unwrap();
        assert_eq!(
            TargetSpec::new("a.txt", EntityKind::File, opts.clone(), None),
            Err(OptionError::MissingLinkName)
        );

        let spec = TargetSpec::new("a.txt", EntityKind::File, opts, Some("b".into())).unwrap();
        assert_eq!(spec.link_name.as_deref(), Some("b"));
    }

    #[test]
    fn test_link_name_dropped_for_symlink() {
        let opts = Options::parse("-l", EntityKind::Symlink).unwrap();
        let spec = TargetSpec::new("ln", EntityKind::Symlink, opts, Some("x".into())).unwrap();
        assert!(spec.link_name.is_none());
    }

    #[test]
    fn test_is_source() {
        let spec = TargetSpec::new("src/main.c", EntityKind::File, Options::default(), None).unwrap();
        assert!(spec.is_source("c"));
        assert!(!spec.is_source("rs"));

        let dir = TargetSpec::new("src.c", EntityKind::Directory, Options::default(), None).unwrap();
        assert!(!dir.is_source("c"));
    }
}
