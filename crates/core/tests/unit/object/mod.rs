/// Object file and executable codecs.
pub mod codecs;

/// Disk image files.
pub mod disk_image;
