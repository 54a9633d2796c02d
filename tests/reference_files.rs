//! Checks against the vendor-published containers.
//!
//! The files are not redistributed with the crate. Drop them into
//! `tests/data/` to enable these tests:
//! - `SpLibEng_1.3.bin` (with `.offsets.json` / `.md5sums.json` side-files)
//!   from <http://www.scomcontrollers.com/downloads/SpLibEng_1.3.bin>
//! - `DemoAudioLib.bin` and `DemoAudioLib/{4000,4001,4002}.raw`
//!   from <http://www.scomcontrollers.com/downloads/7330_V1.8b_191125.zip>

mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use common::fixture_path;
use scom_speechlib::speechlib::manifest::{content_digest, read_md5sums_json, read_offsets_json};
use scom_speechlib::{Header, ImageHeader, IndexTable, SpeechLib};

const SPLIB_ENG_MD5: &str = "4e2d170c5b6fb7ab7be9565ac594ecf2";
const DEMO_MD5: &str = "3828b3ddc9c6b5e9ca1df0d7638d4074";

/// Reads a reference file, or `None` (with a note) when it is absent or not
/// the expected download.
fn load_reference(path: &Path, md5: &str) -> Option<Vec<u8>> {
    let Ok(data) = fs::read(path) else {
        eprintln!("skipping: {} not present", path.display());
        return None;
    };
    if content_digest(&data) != md5 {
        eprintln!("skipping: {} has the wrong hash, please re-download", path.display());
        return None;
    }
    Some(data)
}

#[test]
fn splib_eng_headers() {
    let path = fixture_path(&["tests", "data", "SpLibEng_1.3.bin"]);
    let Some(data) = load_reference(&path, SPLIB_ENG_MD5) else {
        return;
    };
    let lib = SpeechLib::from_bytes(&data).expect("decode SpLibEng");

    let mut expected = Header {
        first_free: 7741549,
        name: b"SCOM Sp Lib Eng".to_vec(),
        version: b"1.3.0".to_vec(),
        file_type: 2,
        ..Header::default()
    };
    expected.set_timestamp_raw(b"2/17/2017".to_vec());
    assert_eq!(lib.header, expected);

    assert_eq!(
        lib.image_header,
        ImageHeader {
            index_size: 0x1A00,
            max_word: 1630,
            first_free: 7741549,
        }
    );
}

#[test]
fn splib_eng_index_and_contents_match_side_files() {
    let path = fixture_path(&["tests", "data", "SpLibEng_1.3.bin"]);
    let Some(data) = load_reference(&path, SPLIB_ENG_MD5) else {
        return;
    };
    let lib = SpeechLib::from_bytes(&data).expect("decode SpLibEng");

    let offsets = read_offsets_json(path.with_extension("offsets.json")).expect("offsets side-file");
    assert_eq!(lib.index, IndexTable::new(0x1A00, offsets));

    let expected_sums = read_md5sums_json(path.with_extension("md5sums.json")).expect("md5 side-file");
    let sums: BTreeMap<_, _> = lib
        .audio_data
        .entries
        .iter()
        .map(|(&word_code, entry)| (word_code, content_digest(&entry.data)))
        .collect();
    assert_eq!(sums, expected_sums);

    assert_eq!(lib.to_bytes().expect("re-encode").len(), 7741549);
}

#[test]
fn demo_library_file_and_directory_agree() {
    let file = fixture_path(&["tests", "data", "DemoAudioLib.bin"]);
    let Some(data) = load_reference(&file, DEMO_MD5) else {
        return;
    };
    let directory = fixture_path(&["tests", "data", "DemoAudioLib"]);
    if !directory.is_dir() {
        eprintln!("skipping: {} not present", directory.display());
        return;
    }

    let from_file = SpeechLib::from_bytes(&data).expect("decode DemoAudioLib");
    let mut from_dir = SpeechLib::from_directory(&directory).expect("build DemoAudioLib");
    from_dir.header.set_timestamp_raw(b"09/09/09 12:00".to_vec());

    let expected_offsets = BTreeMap::from([(4000, 16640), (4001, 1056259), (4002, 1080262)]);
    let expected_sums = BTreeMap::from([
        (4000, "9a6ec0e8b543e922cdff09e1ccffe927"),
        (4001, "8f3d3cb828ce507cf38968835382ffb4"),
        (4002, "bb62511d46ffcf6d0e4d6a1e0798a928"),
    ]);

    for (name, lib) in [("file", &from_file), ("directory", &from_dir)] {
        assert_eq!(lib.header.first_free, 1104265, "first_free for {}", name);
        assert_eq!(lib.header.timestamp_raw, b"09/09/09 12:00", "timestamp for {}", name);
        assert_eq!(
            lib.image_header,
            ImageHeader {
                index_size: 0x3F00,
                max_word: 4002,
                first_free: 1104265,
            },
            "image header for {}",
            name
        );
        assert_eq!(
            lib.index,
            IndexTable::new(0x3F00, expected_offsets.clone()),
            "index for {}",
            name
        );
        for (&word_code, &sum) in &expected_sums {
            let entry = lib.get(word_code).unwrap_or_else(|| panic!("{} lacks {}", name, word_code));
            assert_eq!(content_digest(entry), sum, "md5 of {} in {}", word_code, name);
        }
    }

    assert_eq!(from_file, from_dir);
    assert_eq!(from_dir.to_bytes().expect("encode"), data);
}
