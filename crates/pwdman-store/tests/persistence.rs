// SPDX-FileCopyrightText: 2026 pwdman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store files on disk: round trips, damage, legacy generations.

use std::fs;

use proptest::prelude::*;
use pwdman_core::PwdmanError;
use pwdman_store::format::{CURRENT_VERSION, MAGIC};
use pwdman_store::{Generation, PasswordStore, StoreFile};
use secrecy::SecretString;

/// Generation 0 file: `{"site":"secret"}` under passphrase `old`.
const FLAT_LEGACY_FILE: &str = "010203040506070881B3A327A5F147D0703C4015D2A1CA366F9F8CE499BA4EB4\
    AA5E3C925508A4613DEA548550913A7B367C284912B32DB9F83D26E58E9241E5\
    5DC0E17933AB5DE7E04750583B79D6327D441AF1EB20202E";

/// Generation 1 file: `{"site":{"user":"a","pass":"b"}}` under passphrase `old`.
const NESTED_LEGACY_FILE: &str = "10111213141516173DB4073DA20842A2838F8FD529F3207CBCD2DF8C83E45569\
    A06201848234ECDBB709AD17B1B3196BF2142BCBCABDB8F28EB70444EA09A1E6\
    03451EBF8F65F953B0ED5ED43EA754F7AF89A74887F6A1B9C2642EE22E0AD5AB\
    9974FACE75274A35";

fn pass(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn temp_store() -> (tempfile::TempDir, StoreFile) {
    let dir = tempfile::tempdir().unwrap();
    let file = StoreFile::new(dir.path().join(".pwdman"));
    (dir, file)
}

fn sample() -> PasswordStore {
    let mut store = PasswordStore::new(pass("correct horse"));
    store.put("github", "user", "octocat");
    store.put("github", "", "s3cret");
    store.put("bank", "pin", "0000");
    store
}

#[test]
fn write_then_open() {
    let (_dir, file) = temp_store();
    let mut store = sample();
    store.write_to(&file).unwrap();
    assert!(!store.is_dirty());

    let (opened, generation) = PasswordStore::open(&file, pass("correct horse")).unwrap();
    assert_eq!(generation, Generation::Framed { version: CURRENT_VERSION });
    assert_eq!(opened.credentials(), store.credentials());
    assert_eq!(opened.get("github", None).unwrap(), "s3cret");
}

#[test]
fn open_missing_file_is_not_found() {
    let (_dir, file) = temp_store();
    assert!(matches!(
        PasswordStore::open(&file, pass("x")),
        Err(PwdmanError::NotFound { .. })
    ));
}

#[test]
fn open_with_wrong_passphrase() {
    let (_dir, file) = temp_store();
    sample().write_to(&file).unwrap();

    let err = PasswordStore::open(&file, pass("battery staple")).unwrap_err();
    assert!(matches!(err, PwdmanError::Authentication));
}

#[test]
fn every_blob_byte_is_authenticated() {
    let mut store = PasswordStore::new(pass("pw"));
    store.put("a", "", "b");
    let bytes = store.save(&pass("pw")).unwrap();
    let header = MAGIC.len() + 4;

    for i in header..bytes.len() {
        let original = bytes[i];
        let other_digit = if original == b'0' { b'1' } else { b'0' };

        for replacement in [other_digit, original ^ 0x20, b'g', 0xff] {
            let mut damaged = bytes.clone();
            damaged[i] = replacement;

            let mut target = PasswordStore::new(pass("pw"));
            let result = target.load(pass("pw"), &damaged);
            assert!(
                matches!(result, Err(PwdmanError::Authentication)),
                "byte {i} changed to {replacement:#04x} was not authenticated"
            );
            assert!(target.is_empty());
        }
    }
}

#[test]
fn empty_and_garbage_files_are_rejected() {
    let mut store = PasswordStore::new(pass("pw"));
    for bytes in [&b""[..], b"not a store", &MAGIC[..]] {
        assert!(matches!(
            store.load(pass("pw"), bytes),
            Err(PwdmanError::Authentication)
        ));
    }
}

#[test]
fn flat_legacy_file_is_lifted() {
    let (_dir, file) = temp_store();
    fs::write(file.path(), FLAT_LEGACY_FILE).unwrap();

    let (store, generation) = PasswordStore::open(&file, pass("old")).unwrap();
    assert_eq!(generation, Generation::FlatLegacy);
    assert_eq!(store.list(Some("site")).unwrap(), ["default"]);
    assert_eq!(store.get("site", None).unwrap(), "secret");
}

#[test]
fn nested_legacy_file_loads_unchanged() {
    let (_dir, file) = temp_store();
    fs::write(file.path(), NESTED_LEGACY_FILE).unwrap();

    let (store, generation) = PasswordStore::open(&file, pass("old")).unwrap();
    assert_eq!(generation, Generation::NestedLegacy);
    assert_eq!(store.get("site", Some("user")).unwrap(), "a");
    assert_eq!(store.get("site", Some("pass")).unwrap(), "b");
}

#[test]
fn legacy_file_with_wrong_passphrase() {
    let (_dir, file) = temp_store();
    fs::write(file.path(), NESTED_LEGACY_FILE).unwrap();

    assert!(matches!(
        PasswordStore::open(&file, pass("new")),
        Err(PwdmanError::Authentication)
    ));
}

#[test]
fn legacy_file_upgraded_only_on_save() {
    let (_dir, file) = temp_store();
    fs::write(file.path(), FLAT_LEGACY_FILE).unwrap();

    let (mut store, _) = PasswordStore::open(&file, pass("old")).unwrap();
    assert_eq!(fs::read(file.path()).unwrap(), FLAT_LEGACY_FILE.as_bytes());

    store.write_to(&file).unwrap();
    let upgraded = fs::read(file.path()).unwrap();
    assert!(upgraded.starts_with(&MAGIC));

    let (reopened, generation) = PasswordStore::open(&file, pass("old")).unwrap();
    assert_eq!(generation, Generation::Framed { version: CURRENT_VERSION });
    assert_eq!(reopened.get("site", Some("default")).unwrap(), "secret");
}

#[test]
fn unknown_version_is_unsupported() {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&7u32.to_le_bytes());
    bytes.extend_from_slice(b"00");

    let mut store = PasswordStore::new(pass("pw"));
    assert!(matches!(
        store.load(pass("pw"), &bytes),
        Err(PwdmanError::UnsupportedFormat { version: 7 })
    ));
}

#[test]
fn failed_open_leaves_file_untouched() {
    let (_dir, file) = temp_store();
    sample().write_to(&file).unwrap();
    let before = fs::read(file.path()).unwrap();

    assert!(PasswordStore::open(&file, pass("wrong")).is_err());
    assert_eq!(fs::read(file.path()).unwrap(), before);
}

#[test]
fn save_leaves_only_the_store_file() {
    let (dir, file) = temp_store();
    let mut store = sample();
    store.write_to(&file).unwrap();
    store.put("another", "", "value");
    store.write_to(&file).unwrap();

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, [".pwdman"]);
}

#[cfg(unix)]
#[test]
fn saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, file) = temp_store();
    sample().write_to(&file).unwrap();

    let mode = fs::metadata(file.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

proptest! {
    // Every case runs Argon2id twice at full cost.
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn roundtrip_any_store(
        entries in prop::collection::vec(("[a-z]{1,8}", "[a-z]{0,6}", "\\PC{1,16}"), 0..6)
    ) {
        let mut store = PasswordStore::new(pass("pw"));
        for (name, element, value) in &entries {
            store.put(name, element, value);
        }

        let bytes = store.save(&pass("pw")).unwrap();
        let mut loaded = PasswordStore::new(pass("other"));
        loaded.load(pass("pw"), &bytes).unwrap();
        prop_assert_eq!(loaded.credentials(), store.credentials());
    }
}
