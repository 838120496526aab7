//! Block-device listing parser for the extra-volume check.

/// Remote command listing block devices with their sizes.
pub const LSBLK_COMMAND: &str = "lsblk -o NAME,SIZE";

/// Name prefix of virtio disks.
pub const VIRTIO_DISK_PREFIX: &str = "vd";

/// A `NAME SIZE` row from the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub name: String,
    pub size: String,
}

/// Parse one listing line. Only lines with exactly two tokens qualify.
#[must_use]
pub fn parse_block_device(line: &str) -> Option<BlockDevice> {
    let mut tokens = line.split_whitespace();
    let (Some(name), Some(size), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };
    Some(BlockDevice {
        name: name.to_string(),
        size: size.to_string(),
    })
}

/// Size label `lsblk` prints for a whole number of gigabytes.
#[must_use]
pub fn expected_size_label(size_gb: &str) -> String {
    format!("{size_gb}G")
}

/// Find the first virtio disk whose size matches `size_gb`.
#[must_use]
pub fn find_extra_volume(listing: &str, size_gb: &str) -> Option<BlockDevice> {
    let wanted = expected_size_label(size_gb);
    listing
        .lines()
        .filter_map(parse_block_device)
        .find(|dev| dev.name.starts_with(VIRTIO_DISK_PREFIX) && dev.size == wanted)
}
