use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info, trace};

use super::format::audio::AudioStore;
use super::format::index::IndexTable;
use super::format::{header, image_header};
use super::source;
use super::types::error::{Result, SpeechLibError, Violation};
use super::types::models::*;
use super::utils;

/// File extension of the per-word clips a library is built from.
pub const RAW_EXTENSION: &str = "raw";

/// Controls which invariants decoding enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Require `image_header.max_word` to equal the highest indexed word code.
    pub check_max_word: bool,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            check_max_word: true,
        }
    }

    /// For third-party containers whose `max_word` is only advisory.
    pub fn permissive() -> Self {
        Self {
            check_max_word: false,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::strict()
    }
}

/// Header values for libraries assembled from loose clips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub name: Vec<u8>,
    pub version: Vec<u8>,
    /// Raw header timestamp; empty leaves the parsed timestamp unset.
    pub timestamp_raw: Vec<u8>,
    pub file_type: u8,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: Vec::new(),
            version: Vec::new(),
            timestamp_raw: Vec::new(),
            file_type: DEFAULT_FILE_TYPE,
        }
    }
}

/// A complete speech library: both headers, the index and every clip.
///
/// Two libraries are equal when all four parts are equal, regardless of
/// whether they were decoded or built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechLib {
    pub header: Header,
    pub image_header: ImageHeader,
    pub index: IndexTable,
    pub audio_data: AudioStore,
}

impl SpeechLib {
    /// Decodes a container held in memory, enforcing every invariant.
    ///
    /// # Errors
    /// - `Format` if the buffer ends before a region it declares
    /// - `Integrity` naming the first broken cross-check
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &DecodeOptions::default())
    }

    pub fn from_bytes_with(data: &[u8], options: &DecodeOptions) -> Result<Self> {
        info!("Decoding speech library ({} bytes)", data.len());

        let header = header::decode(data)?;
        let image_header = image_header::decode(data, IMAGE_HEADER_OFFSET)?;
        let index = IndexTable::decode(data, INDEX_OFFSET, image_header.index_size)?;
        let audio_data = AudioStore::decode(data, &index, header.first_free)?;

        let lib = Self {
            header,
            image_header,
            index,
            audio_data,
        };
        lib.check(options).map_err(SpeechLibError::Integrity)?;

        if data.len() as u64 > lib.header.first_free as u64 {
            debug!(
                "Ignoring {} bytes after first-free offset {}",
                data.len() as u64 - lib.header.first_free as u64,
                lib.header.first_free
            );
        }
        info!(
            "Speech library decoded: name={:?}, version={:?}, {} entries",
            lib.header.name_lossy(),
            lib.header.version_lossy(),
            lib.len()
        );
        Ok(lib)
    }

    /// Reads and decodes a container file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with(path, &DecodeOptions::default())
    }

    pub fn from_file_with(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening speech library file: {}", path.display());
        let data = source::read_file(path)?;
        Self::from_bytes_with(&data, options)
    }

    /// Builds a library from a directory of `<word code>.raw` clips.
    ///
    /// Files with other extensions are ignored.
    ///
    /// # Errors
    /// - `NotFound` if the directory is missing or holds no clips
    /// - `Format` if a clip's file name is not a word code or the clip is empty
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_directory_with(path, &BuildOptions::default())
    }

    pub fn from_directory_with(path: impl AsRef<Path>, options: &BuildOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Building speech library from directory: {}", path.display());

        let mut entries = BTreeMap::new();
        for (file_name, data) in source::list_directory(path)? {
            let Some(word_code) = parse_clip_name(&file_name)? else {
                debug!("Skipping {}: not a .{} clip", file_name, RAW_EXTENSION);
                continue;
            };
            if data.is_empty() {
                return Err(SpeechLibError::Format(format!(
                    "clip {} is empty; every entry needs at least one byte",
                    file_name
                )));
            }
            trace!("Clip {} -> word code {} ({} bytes)", file_name, word_code, data.len());
            if entries.insert(word_code, Entry::new(data)).is_some() {
                return Err(SpeechLibError::Format(format!(
                    "more than one clip for word code {} (last seen: {})",
                    word_code, file_name
                )));
            }
        }

        if entries.is_empty() {
            return Err(SpeechLibError::NotFound(format!(
                "no .{} clips in {}",
                RAW_EXTENSION,
                path.display()
            )));
        }
        Self::from_entries(entries, options)
    }

    /// Lays out `entries` as a fresh container.
    ///
    /// The index is sized for the highest word code, rounded up to the index
    /// granularity, and clips follow it back to back in ascending word code
    /// order.
    ///
    /// # Errors
    /// - `NotFound` if `entries` is empty
    /// - `Format` if an entry holds no bytes, since its offset would collide
    ///   with the next entry's
    pub fn from_entries(entries: BTreeMap<WordCode, Entry>, options: &BuildOptions) -> Result<Self> {
        if let Some((word_code, _)) = entries.iter().find(|(_, entry)| entry.is_empty()) {
            return Err(SpeechLibError::Format(format!(
                "entry for word code {} is empty",
                word_code
            )));
        }
        let max_word = entries
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| SpeechLibError::NotFound("no entries to build from".to_string()))?;

        let index_size = utils::to_offset(utils::index_size_for(max_word))
            .map_err(SpeechLibError::Validation)?;
        let base = utils::to_offset(INDEX_OFFSET as u64 + index_size as u64)
            .map_err(SpeechLibError::Validation)?;
        debug!(
            "Layout: max_word={}, index_size={:#x}, audio starts at {}",
            max_word, index_size, base
        );

        let audio_data = AudioStore::new(entries);
        let encoded = audio_data.encode(base)?;

        let mut header = Header {
            first_free: encoded.first_free,
            name: options.name.clone(),
            version: options.version.clone(),
            file_type: options.file_type,
            ..Header::default()
        };
        header.set_timestamp_raw(options.timestamp_raw.clone());

        let lib = Self {
            header,
            image_header: ImageHeader {
                index_size,
                max_word,
                first_free: encoded.first_free,
            },
            index: IndexTable::new(index_size, encoded.offsets),
            audio_data,
        };
        lib.validate()?;

        info!(
            "Speech library built: {} entries, first_free={}",
            lib.len(),
            lib.header.first_free
        );
        Ok(lib)
    }

    /// Encodes the library into container bytes.
    ///
    /// Entries are written at the offsets the index records, so a decoded
    /// container encodes back to the bytes it came from.
    ///
    /// # Errors
    /// `Validation` if the fields have been edited into an inconsistent state.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let mut out = Vec::with_capacity(self.header.first_free as usize);
        out.extend(header::encode(&self.header)?);
        out.extend(image_header::encode(&self.image_header));
        out.extend(self.index.encode(self.image_header.capacity())?);

        let layout = self.index.by_offset();
        if let Some(&(_, first_offset)) = layout.first() {
            // Zero fill between the index and the first clip.
            out.resize(first_offset as usize, 0);
            let encoded = self
                .audio_data
                .encode_in_order(layout.iter().map(|&(word_code, _)| word_code), first_offset)?;
            out.extend(encoded.bytes);
        }
        out.resize(self.header.first_free as usize, 0);

        debug!("Encoded speech library: {} bytes", out.len());
        Ok(out)
    }

    /// Encodes the library and writes it to `path`.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Writes every entry to `<dir>/<word code>.raw`, creating `dir` if needed.
    ///
    /// Returns the number of files written.
    pub fn extract_to_directory(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (word_code, entry) in &self.audio_data.entries {
            let path = dir.join(format!("{}.{}", word_code, RAW_EXTENSION));
            trace!("Writing {} ({} bytes)", path.display(), entry.len());
            fs::write(&path, &entry.data)?;
        }
        info!("Extracted {} entries to {}", self.len(), dir.display());
        Ok(self.len())
    }

    /// Checks every invariant, as done before encoding.
    pub fn validate(&self) -> Result<()> {
        self.check(&DecodeOptions::strict())
            .map_err(SpeechLibError::Validation)
    }

    /// Audio bytes for `word_code`.
    pub fn get(&self, word_code: WordCode) -> Option<&[u8]> {
        self.audio_data.get(word_code).map(|entry| entry.data.as_slice())
    }

    pub fn offset_of(&self, word_code: WordCode) -> Option<u32> {
        self.index.get(word_code)
    }

    pub fn word_codes(&self) -> impl Iterator<Item = WordCode> + '_ {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the first broken invariant, if any.
    fn check(&self, options: &DecodeOptions) -> std::result::Result<(), Violation> {
        let header = &self.header;
        let image = &self.image_header;

        if header.first_free != image.first_free {
            return Err(Violation::FirstFreeMismatch {
                header: header.first_free,
                image: image.first_free,
            });
        }

        check_field("name", &header.name, NAME_LEN)?;
        check_field("version", &header.version, VERSION_LEN)?;
        check_field("timestamp", &header.timestamp_raw, TIMESTAMP_LEN)?;

        if image.index_size as usize % SLOT_WIDTH != 0 {
            return Err(Violation::MisalignedIndexSize(image.index_size));
        }
        if self.index.size() != image.index_size {
            return Err(Violation::IndexSizeMismatch {
                declared: image.index_size,
                table: self.index.size(),
            });
        }
        if let Some(word_code) = self.index.keys().find(|&w| w >= image.capacity()) {
            return Err(Violation::WordCodeOutOfRange {
                word_code,
                capacity: image.capacity(),
            });
        }

        if let Some(word_code) = self.index.keys().find(|&w| !self.audio_data.contains(w)) {
            return Err(Violation::MissingEntry(word_code));
        }
        if let Some(word_code) = self.audio_data.keys().find(|&w| !self.index.contains(w)) {
            return Err(Violation::MissingIndexSlot(word_code));
        }

        if options.check_max_word {
            let actual = self.index.max_key().unwrap_or(0);
            if image.max_word != actual {
                return Err(Violation::MaxWordMismatch {
                    declared: image.max_word,
                    actual,
                });
            }
        }

        let data_start = image.data_start();
        if (header.first_free as u64) < data_start {
            return Err(Violation::FirstFreeBeforeData {
                first_free: header.first_free,
                data_start,
            });
        }
        self.check_tiling(data_start)
    }

    /// Entries sorted by offset must cover `[first offset, first_free)`
    /// exactly once.
    fn check_tiling(&self, data_start: u64) -> std::result::Result<(), Violation> {
        let first_free = self.header.first_free;
        let layout = self.index.by_offset();

        if let Some(&(word_code, offset)) = layout.first() {
            if (offset as u64) < data_start {
                return Err(Violation::OffsetBeforeData {
                    word_code,
                    offset,
                    data_start,
                });
            }
        }

        for (i, &(word_code, offset)) in layout.iter().enumerate() {
            if offset > first_free {
                return Err(Violation::OffsetPastFirstFree {
                    word_code,
                    offset,
                    first_free,
                });
            }
            let expected = match layout.get(i + 1) {
                Some(&(next_word, next_offset)) if next_offset == offset => {
                    return Err(Violation::DuplicateOffset {
                        first: word_code,
                        second: next_word,
                        offset,
                    });
                }
                Some(&(_, next_offset)) => next_offset as u64,
                None => first_free as u64,
            };
            let len = self.audio_data.get(word_code).map_or(0, Entry::len) as u64;
            let found = offset as u64 + len;
            if found != expected {
                return Err(Violation::NotContiguous {
                    word_code,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

fn check_field(field: &'static str, value: &[u8], max: usize) -> std::result::Result<(), Violation> {
    if value.len() > max {
        return Err(Violation::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

/// Word code of a `<code>.raw` file name; `None` for other extensions.
fn parse_clip_name(file_name: &str) -> Result<Option<WordCode>> {
    let path = Path::new(file_name);
    let is_clip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(RAW_EXTENSION));
    if !is_clip {
        return Ok(None);
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SpeechLibError::Format(format!(
            "file name {:?} is not a decimal word code",
            file_name
        )));
    }
    stem.parse::<WordCode>().map(Some).map_err(|e| {
        SpeechLibError::Format(format!(
            "cannot read a word code from file name {:?}: {}",
            file_name, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_names_map_to_word_codes() {
        assert_eq!(parse_clip_name("4000.raw").unwrap(), Some(4000));
        assert_eq!(parse_clip_name("17.RAW").unwrap(), Some(17));
        assert_eq!(parse_clip_name("notes.txt").unwrap(), None);
        assert_eq!(parse_clip_name("4000").unwrap(), None);
        assert!(matches!(
            parse_clip_name("hello.raw"),
            Err(SpeechLibError::Format(_))
        ));
        assert!(matches!(
            parse_clip_name("-1.raw"),
            Err(SpeechLibError::Format(_))
        ));
        assert!(matches!(
            parse_clip_name("+7.raw"),
            Err(SpeechLibError::Format(_))
        ));
    }

    #[test]
    fn empty_entry_is_rejected_wherever_it_sorts() {
        for entries in [
            BTreeMap::from([(1, Entry::default()), (2, Entry::new(vec![1, 2, 3]))]),
            BTreeMap::from([(1, Entry::new(vec![1])), (2, Entry::default())]),
        ] {
            let err = SpeechLib::from_entries(entries, &BuildOptions::default()).unwrap_err();
            assert!(matches!(err, SpeechLibError::Format(_)), "got {:?}", err);
        }
    }

    #[test]
    fn empty_entry_map_is_not_found() {
        let err = SpeechLib::from_entries(BTreeMap::new(), &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, SpeechLibError::NotFound(_)), "got {:?}", err);
    }
}
