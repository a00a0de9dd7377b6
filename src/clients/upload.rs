//! Local files sent as multipart upload parameters.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::clients::ValidationError;

/// Whether an upload is a plain file or a video.
///
/// Video uploads get a longer request timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    /// Any non-video file.
    File,
    /// A video file.
    Video,
}

/// A local file to upload as a request parameter.
///
/// The file must exist when the upload is created; its contents are read
/// when the multipart body is built. `offset` and `max_length` select a
/// window of the file.
///
/// # Example
///
/// ```rust,no_run
/// use autoznetwork::clients::UploadFile;
///
/// let photo = UploadFile::new("/tmp/photo.jpg").unwrap();
/// assert_eq!(photo.mime_type(), "image/jpeg");
/// assert_eq!(photo.file_name(), "photo.jpg");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    path: PathBuf,
    kind: UploadKind,
    max_length: Option<u64>,
    offset: Option<u64>,
}

impl UploadFile {
    /// Creates a file upload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileNotFound`] if `path` is not a readable file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        Self::with_kind(path, UploadKind::File)
    }

    /// Creates a video upload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileNotFound`] if `path` is not a readable file.
    pub fn video(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        Self::with_kind(path, UploadKind::Video)
    }

    fn with_kind(path: impl AsRef<Path>, kind: UploadKind) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ValidationError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            max_length: None,
            offset: None,
        })
    }

    /// Limits the upload to at most `max_length` bytes.
    #[must_use]
    pub const fn max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Starts the upload `offset` bytes into the file.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The kind of upload.
    #[must_use]
    pub const fn kind(&self) -> UploadKind {
        self.kind
    }

    /// Returns `true` for video uploads.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == UploadKind::Video
    }

    /// The file name sent in the multipart `filename` attribute.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The MIME type guessed from the file extension.
    #[must_use]
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Reads the selected window of the file.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileRead`] if the file cannot be read.
    pub fn contents(&self) -> Result<Vec<u8>, ValidationError> {
        let read_error = |e: std::io::Error| ValidationError::FileRead {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };

        let mut file = File::open(&self.path).map_err(read_error)?;
        if let Some(offset) = self.offset {
            file.seek(SeekFrom::Start(offset)).map_err(read_error)?;
        }

        let mut contents = Vec::new();
        let read = match self.max_length {
            Some(limit) => file.take(limit).read_to_end(&mut contents),
            None => file.read_to_end(&mut contents),
        };
        read.map_err(read_error)?;
        Ok(contents)
    }
}
