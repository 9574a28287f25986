//! ROM loading and validation.
//!
//! A [`RomSet`] is a bag of named files, read from an extracted MAME
//! directory, a ZIP archive (the host unpacks it into entries), a single
//! image file, or byte slices in tests. A [`RomRegion`] describes how those
//! files are laid out in one address range and checks size and CRC32.

use std::collections::HashMap;
use std::path::Path;

/// CRC-32 lookup table (reflected polynomial 0xEDB88320), as used by MAME and ZIP.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// CRC-32 of a byte slice.
pub fn crc32(data: &[u8]) -> u32 {
    !data.iter().fold(0xFFFF_FFFFu32, |crc, &byte| {
        (crc >> 8) ^ CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize]
    })
}

#[derive(Debug)]
pub enum RomLoadError {
    /// Underlying I/O error (file not found, permission denied, ...)
    Io(std::io::Error),

    /// A required ROM file is not in the set.
    MissingFile(String),

    SizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    ChecksumMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },
}

impl std::fmt::Display for RomLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingFile(name) => write!(f, "missing ROM file: {name}"),
            Self::SizeMismatch {
                file,
                expected,
                actual,
            } => write!(f, "ROM {file}: expected {expected} bytes, got {actual}"),
            Self::ChecksumMismatch {
                file,
                expected,
                actual,
            } => write!(
                f,
                "ROM {file}: CRC32 expected 0x{expected:08X}, got 0x{actual:08X}"
            ),
        }
    }
}

impl std::error::Error for RomLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RomLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// A collection of named ROM files.
#[derive(Debug, Default)]
pub struct RomSet {
    files: HashMap<String, Vec<u8>>,
}

impl RomSet {
    /// Read every regular file in `path` (non-recursive), keyed by file name.
    pub fn from_directory(path: &Path) -> Result<Self, RomLoadError> {
        let mut files = HashMap::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() {
                continue;
            }
            let Some(name) = file_path.file_name() else {
                continue;
            };
            let name = name.to_string_lossy().to_string();
            files.insert(name, std::fs::read(&file_path)?);
        }
        log::debug!("loaded {} ROM files from {}", files.len(), path.display());
        Ok(Self { files })
    }

    /// A set holding one file, keyed by its file name.
    pub fn from_file(path: &Path) -> Result<Self, RomLoadError> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        log::debug!("loaded ROM image {} ({} bytes)", path.display(), data.len());
        Ok(Self::from_entries([(name, data)]))
    }

    /// Build a set from owned (name, data) pairs, e.g. unpacked ZIP entries.
    /// Names are reduced to their last path component.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        let files = entries
            .into_iter()
            .map(|(name, data)| {
                let base = name.rsplit(['/', '\\']).next().unwrap_or(&name).to_string();
                (base, data)
            })
            .collect();
        Self { files }
    }

    /// Build a set from borrowed (name, data) pairs.
    pub fn from_slices(entries: &[(&str, &[u8])]) -> Self {
        Self::from_entries(
            entries
                .iter()
                .map(|(name, data)| (name.to_string(), data.to_vec())),
        )
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn require(&self, name: &str) -> Result<&[u8], RomLoadError> {
        self.get(name)
            .ok_or_else(|| RomLoadError::MissingFile(name.to_string()))
    }

    /// Like [`require`](Self::require), but the file must be exactly `expected_size` bytes.
    pub fn require_sized(&self, name: &str, expected_size: usize) -> Result<&[u8], RomLoadError> {
        let data = self.require(name)?;
        if data.len() != expected_size {
            return Err(RomLoadError::SizeMismatch {
                file: name.to_string(),
                expected: expected_size,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One ROM chip's placement within a region.
pub struct RomEntry {
    pub name: &'static str,
    pub size: usize,
    /// Offset within the region.
    pub offset: usize,
    /// Expected CRC32. `None` accepts any contents.
    pub crc32: Option<u32>,
}

/// A contiguous memory region assembled from one or more ROM files.
pub struct RomRegion {
    pub size: usize,
    pub entries: &'static [RomEntry],
}

impl RomRegion {
    /// Assemble the region, validating sizes and CRC32 checksums.
    pub fn load(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        self.load_inner(rom_set, true)
    }

    /// Assemble the region, validating sizes only. For patched or homebrew ROMs.
    pub fn load_skip_checksums(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        self.load_inner(rom_set, false)
    }

    /// True if every file this region needs is present in `rom_set`.
    pub fn is_satisfied_by(&self, rom_set: &RomSet) -> bool {
        self.entries.iter().all(|entry| rom_set.contains(entry.name))
    }

    fn load_inner(&self, rom_set: &RomSet, verify_checksums: bool) -> Result<Vec<u8>, RomLoadError> {
        let mut region = vec![0u8; self.size];

        for entry in self.entries {
            debug_assert!(
                entry.offset + entry.size <= self.size,
                "RomEntry '{}' exceeds region bounds",
                entry.name,
            );

            let data = rom_set.require_sized(entry.name, entry.size)?;

            if verify_checksums && let Some(expected) = entry.crc32 {
                let actual = crc32(data);
                if actual != expected {
                    return Err(RomLoadError::ChecksumMismatch {
                        file: entry.name.to_string(),
                        expected,
                        actual,
                    });
                }
            }

            region[entry.offset..entry.offset + entry.size].copy_from_slice(data);
            log::debug!("ROM {} -> 0x{:04X}", entry.name, entry.offset);
        }

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_known_vectors() {
        assert_eq!(crc32(&[]), 0x0000_0000);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(&[0x00]), 0xD202_EF8D);
    }

    #[test]
    fn from_entries_strips_directories() {
        let rom_set = RomSet::from_entries([
            ("invaders/invaders.h".to_string(), vec![1, 2]),
            ("invaders.g".to_string(), vec![3]),
        ]);
        assert_eq!(rom_set.get("invaders.h"), Some(&[1, 2][..]));
        assert_eq!(rom_set.get("invaders.g"), Some(&[3][..]));
        assert_eq!(rom_set.len(), 2);
    }

    #[test]
    fn require_reports_missing_and_size() {
        let rom_set = RomSet::from_slices(&[("a.rom", &[0u8; 100])]);
        assert!(matches!(
            rom_set.require("b.rom"),
            Err(RomLoadError::MissingFile(name)) if name == "b.rom"
        ));
        assert!(matches!(
            rom_set.require_sized("a.rom", 64),
            Err(RomLoadError::SizeMismatch { expected: 64, actual: 100, .. })
        ));
        assert!(rom_set.require_sized("a.rom", 100).is_ok());
    }

    static TWO_CHIPS: RomRegion = RomRegion {
        size: 8,
        entries: &[
            RomEntry {
                name: "lo.bin",
                size: 4,
                offset: 0,
                crc32: None,
            },
            RomEntry {
                name: "hi.bin",
                size: 4,
                offset: 4,
                crc32: Some(0xDEAD_BEEF),
            },
        ],
    };

    #[test]
    fn load_places_chips_and_checks_crc() {
        let rom_set = RomSet::from_slices(&[("lo.bin", &[0x11; 4]), ("hi.bin", &[0x22; 4])]);
        assert!(TWO_CHIPS.is_satisfied_by(&rom_set));
        assert!(matches!(
            TWO_CHIPS.load(&rom_set),
            Err(RomLoadError::ChecksumMismatch { expected: 0xDEAD_BEEF, .. })
        ));

        let loaded = TWO_CHIPS.load_skip_checksums(&rom_set).unwrap();
        assert_eq!(loaded, vec![0x11, 0x11, 0x11, 0x11, 0x22, 0x22, 0x22, 0x22]);
    }

    #[test]
    fn missing_chip_is_reported() {
        let rom_set = RomSet::from_slices(&[("lo.bin", &[0x11; 4])]);
        assert!(!TWO_CHIPS.is_satisfied_by(&rom_set));
        assert!(matches!(
            TWO_CHIPS.load_skip_checksums(&rom_set),
            Err(RomLoadError::MissingFile(_))
        ));
    }

    #[test]
    fn from_directory_and_from_file() {
        let dir = std::env::temp_dir().join("invaders_rom_loader_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("invaders.rom"), [0xAA, 0xBB]).unwrap();

        let rom_set = RomSet::from_directory(&dir).unwrap();
        assert_eq!(rom_set.get("invaders.rom"), Some(&[0xAA, 0xBB][..]));

        let single = RomSet::from_file(&dir.join("invaders.rom")).unwrap();
        assert_eq!(single.file_names(), vec!["invaders.rom"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
