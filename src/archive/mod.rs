//! Archive format support.
//!
//! The supported formats live in one capability table; the source locator
//! queries [`extensions`] instead of hard-coding an extension list, so
//! adding a format here is enough to make URLs with its extensions
//! classifiable.

use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

/// One supported archive format: its name, the file extensions it claims,
/// and how to unpack it.
pub struct ArchiveFormat {
    /// Short format name, for messages
    pub name: &'static str,
    /// Extensions handled by this format, with the leading dot
    pub extensions: &'static [&'static str],
    unpack: fn(&Path, &Path) -> Result<(), UnpackError>,
}

/// Capability table of every format depcmake can decompress.
pub const FORMATS: &[ArchiveFormat] = &[
    ArchiveFormat {
        name: "zip",
        extensions: &[".zip"],
        unpack: unpack_zip,
    },
    ArchiveFormat {
        name: "gztar",
        extensions: &[".tar.gz", ".tgz"],
        unpack: unpack_tar_gz,
    },
    ArchiveFormat {
        name: "tar",
        extensions: &[".tar"],
        unpack: unpack_tar,
    },
];

/// Errors raised while unpacking an archive.
#[derive(Error, Debug)]
pub enum UnpackError {
    /// No format in [`FORMATS`] claims the file's extension.
    #[error("unsupported archive format: {file_name}")]
    Unsupported { file_name: String },

    /// The archive exists but its content cannot be read.
    #[error("corrupt archive: {reason}")]
    Corrupt { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// All extensions the decompression backend can handle.
pub fn extensions() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().flat_map(|format| format.extensions.iter().copied())
}

/// Find the format claiming the given file name, by extension suffix.
///
/// Suffix matching (rather than last-extension matching) is what makes
/// `.tar.gz` resolve to gztar instead of an unknown `.gz`.
pub fn format_for(file_name: &str) -> Option<&'static ArchiveFormat> {
    FORMATS
        .iter()
        .find(|format| format.extensions.iter().any(|ext| file_name.ends_with(ext)))
}

/// Unpack an archive into `dest`, dispatching on the file extension.
pub fn unpack(archive: &Path, dest: &Path) -> Result<(), UnpackError> {
    let file_name = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let format = format_for(&file_name).ok_or(UnpackError::Unsupported { file_name })?;

    tracing::debug!(
        archive = %archive.display(),
        dest = %dest.display(),
        format = format.name,
        "unpacking archive"
    );

    (format.unpack)(archive, dest)
}

fn unpack_zip(archive: &Path, dest: &Path) -> Result<(), UnpackError> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|error| UnpackError::Corrupt {
        reason: error.to_string(),
    })?;
    zip.extract(dest).map_err(|error| UnpackError::Corrupt {
        reason: error.to_string(),
    })
}

fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<(), UnpackError> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dest).map_err(|error| UnpackError::Corrupt {
        reason: error.to_string(),
    })
}

fn unpack_tar(archive: &Path, dest: &Path) -> Result<(), UnpackError> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(file);
    tar.unpack(dest).map_err(|error| UnpackError::Corrupt {
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn capability_table_claims_common_extensions() {
        let all: Vec<_> = extensions().collect();
        assert!(all.contains(&".zip"));
        assert!(all.contains(&".tar.gz"));
        assert!(all.contains(&".tgz"));
        assert!(all.contains(&".tar"));
    }

    #[test]
    fn tar_gz_resolves_to_gztar_not_gz() {
        assert_eq!(format_for("lib-1.0.tar.gz").unwrap().name, "gztar");
        assert_eq!(format_for("lib.zip").unwrap().name, "zip");
        assert!(format_for("lib.rar").is_none());
    }

    #[test]
    fn unpack_extracts_tar_gz_content() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("lib.tar.gz");
        write_tar_gz(&archive, &[("lib/CMakeLists.txt", "project(Lib)")]);

        let dest = temp.path().join("out");
        unpack(&archive, &dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("lib/CMakeLists.txt")).unwrap(),
            "project(Lib)"
        );
    }

    #[test]
    fn unpack_unknown_extension_is_unsupported() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("lib.rar");
        std::fs::write(&archive, b"not an archive").unwrap();

        let error = unpack(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(error, UnpackError::Unsupported { .. }));
    }

    #[test]
    fn unpack_corrupt_zip_reports_corrupt() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("lib.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let error = unpack(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(error, UnpackError::Corrupt { .. }));
    }

    #[test]
    fn unpack_zip_roundtrip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("lib.zip");
        let file = File::create(&archive).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file::<_, ()>("CMakeLists.txt", Default::default())
            .unwrap();
        writer.write_all(b"project(Zipped)").unwrap();
        writer.finish().unwrap();

        let dest = temp.path().join("out");
        unpack(&archive, &dest).unwrap();
        assert!(dest.join("CMakeLists.txt").exists());
    }
}
