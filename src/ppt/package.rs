//! PPTX package container
//! Holds every ZIP entry in memory so parts can be edited and written back.

use super::content_types::{ContentTypes, CONTENT_TYPES_PART};
use super::relationships::{rels_part_name, Relationships};
use super::PptError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An editable presentation. Part names are ZIP entry names (no leading slash).
#[derive(Debug, Clone)]
pub struct Deck {
    parts: Vec<Part>,
    index: HashMap<String, usize>,
}

impl Deck {
    pub(crate) fn empty() -> Self {
        Self {
            parts: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Open a `.pptx` file from disk.
    pub fn open(path: &Path) -> Result<Self, PptError> {
        let file = File::open(path)?;
        let deck = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded presentation {} ({} parts)",
            path.display(),
            deck.parts.len()
        );
        Ok(deck)
    }

    /// Open a `.pptx` held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PptError> {
        Self::from_reader(Cursor::new(bytes))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, PptError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut deck = Self::empty();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().replace('\\', "/");
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            deck.set_part(&name, data);
        }

        if !deck.has_part(CONTENT_TYPES_PART) {
            return Err(PptError::MissingPart(CONTENT_TYPES_PART.to_string()));
        }
        Ok(deck)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.index.get(name).map(|&i| self.parts[i].data.as_slice())
    }

    pub fn require_part(&self, name: &str) -> Result<&[u8], PptError> {
        self.part(name)
            .ok_or_else(|| PptError::MissingPart(name.to_string()))
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Replace an existing part or append a new one.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.index.get(name) {
            Some(&i) => self.parts[i].data = data,
            None => {
                self.index.insert(name.to_string(), self.parts.len());
                self.parts.push(Part {
                    name: name.to_string(),
                    data,
                });
            }
        }
    }

    /// First unused `{prefix}{n}{suffix}` name, n starting at 1.
    pub fn next_part_name(&self, prefix: &str, suffix: &str) -> String {
        (1..)
            .map(|n| format!("{}{}{}", prefix, n, suffix))
            .find(|name| !self.has_part(name))
            .unwrap_or_else(|| format!("{}0{}", prefix, suffix))
    }

    /// Relationships of `part`; empty when the part has no `.rels`.
    pub fn relationships(&self, part: &str) -> Result<Relationships, PptError> {
        let rels_name = rels_part_name(part);
        match self.part(&rels_name) {
            Some(xml) => Relationships::parse(xml, &rels_name),
            None => Ok(Relationships::new()),
        }
    }

    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) {
        self.set_part(&rels_part_name(part), rels.to_xml().into_bytes());
    }

    pub(crate) fn content_types(&self) -> Result<ContentTypes, PptError> {
        ContentTypes::parse(self.require_part(CONTENT_TYPES_PART)?)
    }

    pub(crate) fn set_content_types(&mut self, types: &ContentTypes) {
        self.set_part(CONTENT_TYPES_PART, types.to_xml().into_bytes());
    }

    /// Serialize the package. `[Content_Types].xml` is always written first.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PptError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Write the deck next to `output_path` in a temp file, then move it into place.
    pub fn save(&self, output_path: &Path) -> Result<(), PptError> {
        let bytes = self.to_bytes()?;
        let dir = match output_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".pca-")
            .suffix(".pptx")
            .tempfile_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        debug!("Staged {} bytes in {}", bytes.len(), tmp.path().display());
        tmp.persist(output_path)?;

        info!(
            "Presentation saved: {} ({} bytes)",
            output_path.display(),
            bytes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_parts_through_zip() {
        let mut deck = Deck::blank(2);
        deck.set_part("ppt/custom/data.bin", vec![1, 2, 3]);

        let bytes = deck.to_bytes().unwrap();
        let reopened = Deck::from_bytes(bytes).unwrap();

        assert_eq!(reopened.part("ppt/custom/data.bin"), Some(&[1u8, 2, 3][..]));
        assert_eq!(
            reopened.part_names().next(),
            Some(CONTENT_TYPES_PART),
            "content types must lead the archive"
        );
        assert_eq!(reopened.slide_count().unwrap(), 2);
    }

    #[test]
    fn next_part_name_skips_existing() {
        let deck = Deck::blank(3);
        assert_eq!(
            deck.next_part_name("ppt/slides/slide", ".xml"),
            "ppt/slides/slide4.xml"
        );
        assert_eq!(
            deck.next_part_name("ppt/charts/chart", ".xml"),
            "ppt/charts/chart1.xml"
        );
    }

    #[test]
    fn rejects_non_package_zip() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("readme.txt", FileOptions::default()).unwrap();
        zip.write_all(b"hello").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = Deck::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, PptError::MissingPart(_)));
    }

    #[test]
    fn save_replaces_destination_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.pptx");
        std::fs::write(&out, b"stale").unwrap();

        Deck::blank(1).save(&out).unwrap();

        let reopened = Deck::open(&out).unwrap();
        assert_eq!(reopened.slide_count().unwrap(), 1);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
