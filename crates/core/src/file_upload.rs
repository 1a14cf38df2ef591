//! Local file payloads for the upload-file command.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::FutureExt;
use serde_json::Value;
use tracing::debug;
use wd_runtime::{Error, Result};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::codec::{Arg, SerializeFuture, WireSerialize};

/// A local file sent to the remote end as a base64-encoded zip archive.
///
/// The file is read when the command carrying it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
	path: PathBuf,
}

impl FileUpload {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Fails with `InvalidArgument` unless the path names a regular file.
	pub async fn check(&self) -> Result<()> {
		match tokio::fs::metadata(&self.path).await {
			Ok(meta) if meta.is_dir() => Err(Error::invalid_argument(format!(
				"Uploading directories is not supported: {}",
				self.path.display()
			))),
			Ok(_) => Ok(()),
			Err(_) => Err(Error::invalid_argument(format!("File not found: {}", self.path.display()))),
		}
	}

	/// The zipped file, base64-encoded.
	pub async fn encode(&self) -> Result<String> {
		self.check().await?;
		let contents = tokio::fs::read(&self.path).await?;
		let name = self
			.path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "upload".to_string());

		let archive = zip_single(&name, &contents)?;
		debug!(target: "wd::upload", file = %name, size = contents.len(), zipped = archive.len(), "encoded upload");
		Ok(STANDARD.encode(archive))
	}
}

fn zip_single(name: &str, contents: &[u8]) -> Result<Vec<u8>> {
	let zip_error = |e: zip::result::ZipError| Error::unknown(format!("Failed to build upload archive: {e}"));

	let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
	writer.start_file(name, SimpleFileOptions::default()).map_err(zip_error)?;
	writer.write_all(contents)?;
	let cursor = writer.finish().map_err(zip_error)?;
	Ok(cursor.into_inner())
}

impl WireSerialize for FileUpload {
	fn to_wire(&self) -> SerializeFuture<'_> {
		async move { Ok(Arg::Json(Value::String(self.encode().await?))) }.boxed()
	}
}

impl From<FileUpload> for Arg {
	fn from(upload: FileUpload) -> Self {
		Arg::Custom(Box::new(upload))
	}
}
