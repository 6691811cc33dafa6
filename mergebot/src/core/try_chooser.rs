//! Resolution of `try choose=<name>` against repository configuration.

use crate::core::types::CommandError;
use crate::repo::RepoConfig;

/// Builders selected by chooser `name`.
///
/// Fails with [`CommandError::ChooserNotConfigured`] when the repository has no
/// choosers at all, and with [`CommandError::ChooserNotFound`] (listing the
/// configured names in order) when `name` is unknown.
pub fn resolve_try_chooser<'a>(
    config: &'a RepoConfig,
    name: &str,
) -> Result<&'a [String], CommandError> {
    let choosers = config
        .try_choosers
        .as_deref()
        .ok_or(CommandError::ChooserNotConfigured)?;

    choosers
        .iter()
        .find(|chooser| chooser.name == name)
        .map(|chooser| chooser.builders.as_slice())
        .ok_or_else(|| CommandError::ChooserNotFound {
            name: name.to_string(),
            available: config.chooser_names(),
        })
}
