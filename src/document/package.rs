/*!
 * DOCX package (OPC zip) reader and writer.
 *
 * Reads the whole archive into memory so a request never touches the
 * filesystem, and writes it back preserving per-entry compression,
 * timestamps and unix modes. Only parts handed to
 * `write_with_replacements` change.
 */

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::DocumentError;

/// All entries of a DOCX archive, in original order
pub struct DocxPackage {
    pub entries: Vec<DocxEntry>,
}

/// A single archive entry with enough metadata for a faithful rewrite
pub struct DocxEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub last_modified: zip::DateTime,
    pub unix_mode: Option<u32>,
    pub is_dir: bool,
}

impl DocxPackage {
    /// Read a package from an in-memory byte slice
    pub fn read(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocumentError::BadPackage(e.to_string()))?;
        let mut entries = Vec::new();
        for i in 0..zip.len() {
            let mut file = zip
                .by_index(i)
                .map_err(|e| DocumentError::BadPackage(e.to_string()))?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| DocumentError::BadPackage(e.to_string()))?;
            entries.push(DocxEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                last_modified: file.last_modified().unwrap_or_default(),
                unix_mode: file.unix_mode(),
                is_dir: file.is_dir(),
            });
        }
        Ok(Self { entries })
    }

    /// Find an entry's data by exact part name
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Rewrite the archive, substituting the given parts
    pub fn write_with_replacements(
        &self,
        replacements: &HashMap<String, Vec<u8>>,
    ) -> Result<Vec<u8>, DocumentError> {
        let mut zout = ZipWriter::new(Cursor::new(Vec::new()));
        for ent in &self.entries {
            let data = replacements
                .get(&ent.name)
                .cloned()
                .unwrap_or_else(|| ent.data.clone());
            let mut opts = SimpleFileOptions::default()
                .compression_method(ent.compression)
                .last_modified_time(ent.last_modified);
            if let Some(mode) = ent.unix_mode {
                opts = opts.unix_permissions(mode);
            }
            if ent.is_dir || ent.name.ends_with('/') {
                zout.add_directory(&ent.name, opts)
                    .map_err(|e| DocumentError::BadPackage(format!("{}: {}", ent.name, e)))?;
            } else {
                zout.start_file(&ent.name, opts)
                    .map_err(|e| DocumentError::BadPackage(format!("{}: {}", ent.name, e)))?;
                zout.write_all(&data)
                    .map_err(|e| DocumentError::BadPackage(format!("{}: {}", ent.name, e)))?;
            }
        }
        let cursor = zout
            .finish()
            .map_err(|e| DocumentError::BadPackage(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
