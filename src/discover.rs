//! File discovery: list candidate files under a base directory.

use tracing::debug;

use crate::model::DiscoveredFile;
use crate::platform::{Listing, Platform};
use crate::remote::{ChannelError, RemoteChannel, Session};

/// List files under `base_path` with one remote command.
///
/// Output lines are trimmed (Windows ends them with CR) and blank lines are
/// dropped. Callers treat an error as "nothing found" for this entry.
pub async fn discover(
    channel: &dyn RemoteChannel,
    session: &Session<'_>,
    platform: &dyn Platform,
    base_path: &str,
    listing: Listing,
) -> Result<Vec<DiscoveredFile>, ChannelError> {
    let command = platform.list_files(base_path, listing);
    let lines = channel.execute(session, &command).await?;

    let files: Vec<DiscoveredFile> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| DiscoveredFile::new(line, platform))
        .collect();

    debug!(
        server = session.server,
        user = session.user,
        base_path,
        count = files.len(),
        "discovered files"
    );
    Ok(files)
}
