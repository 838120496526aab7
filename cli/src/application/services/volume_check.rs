//! Application service: extra volume verification.

use crate::application::ports::RemoteShell;
use crate::domain::volume::{LSBLK_COMMAND, expected_size_label, find_extra_volume};

/// Check that a `vd*` disk of `size_gb` gigabytes is attached.
///
/// Returns at most one violation. Remote errors become a violation instead
/// of propagating.
pub async fn verify_extra_volume(
    shell: &impl RemoteShell,
    size_gb: &str,
    operating_system: &str,
    package: &str,
) -> Vec<String> {
    let output = match shell.exec(LSBLK_COMMAND).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Problem while trying to check the extra storage with error: {e}.");
            return vec![format!(
                "{operating_system} with {package} problem while trying to check the extra storage with error: {e}."
            )];
        }
    };
    tracing::debug!(listing = %output.stdout, "block devices");

    match find_extra_volume(&output.stdout, size_gb) {
        Some(device) => {
            tracing::info!(
                "The extra drive {} with correct size {} is present.",
                device.name,
                expected_size_label(size_gb)
            );
            Vec::new()
        }
        None => {
            tracing::error!("No extra drive with the correct size is present.");
            vec![format!(
                "{operating_system} with {package} no extra drive with correct size is present."
            )]
        }
    }
}
