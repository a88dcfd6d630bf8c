//! Sources of per-target options when the command line does not supply them.

use std::path::Path;

use filegrade_core::{EntityKind, OptionError, Options};

/// Supplies options and link names for targets that lack them.
///
/// The interactive prompt in the binary implements this; [`PresetOptions`]
/// is the non-interactive fallback.
pub trait OptionSource {
    /// Options for a target given without an option string.
    fn options_for(&mut self, path: &Path, kind: EntityKind) -> Result<Options, OptionError>;

    /// Link name for a regular file given `-l` without a following name.
    fn link_name_for(&mut self, path: &Path) -> Result<String, OptionError>;
}

/// Option source that only accepts what was given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetOptions;

impl OptionSource for PresetOptions {
    fn options_for(&mut self, path: &Path, _kind: EntityKind) -> Result<Options, OptionError> {
        Err(OptionError::MissingOptions {
            path: path.to_path_buf(),
        })
    }

    fn link_name_for(&mut self, _path: &Path) -> Result<String, OptionError> {
        Err(OptionError::MissingLinkName)
    }
}
