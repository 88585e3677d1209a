use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("salted"))
}

fn encrypt(input: &Path, output: &Path, pw: &str) -> assert_cmd::assert::Assert {
    bin()
        .env("SALTED_PASSPHRASE", pw)
        .arg("encrypt")
        .arg(input)
        .arg("--output")
        .arg(output)
        .arg("--argon-mem")
        .arg("64")
        .arg("--argon-lanes")
        .arg("1")
        .assert()
}

#[test]
fn encrypt_then_decrypt_roundtrip() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("notes.txt");
    let sealed = dir.path().join("notes.txt.salted");
    let opened = dir.path().join("notes.out");
    fs::write(&plain, b"hello salted world").unwrap();

    encrypt(&plain, &sealed, "pw")
        .success()
        .stdout(predicate::str::contains("encrypted 1 chunk(s)"));
    assert_eq!(fs::metadata(&sealed).unwrap().len(), 64 + 4096 + 64);

    bin()
        .env("SALTED_PASSPHRASE", "pw")
        .arg("decrypt")
        .arg(&sealed)
        .arg("-o")
        .arg(&opened)
        .assert()
        .success()
        .stdout(predicate::str::contains("decrypted 1 chunk(s)"));

    assert_eq!(fs::read(&opened).unwrap(), b"hello salted world");
}

#[test]
fn default_output_names_are_derived() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("data.bin");
    fs::write(&plain, vec![7u8; 9000]).unwrap();

    bin()
        .env("SALTED_PASSPHRASE", "pw")
        .arg("encrypt")
        .arg(&plain)
        .arg("--argon-mem")
        .arg("64")
        .arg("--argon-lanes")
        .arg("1")
        .assert()
        .success();

    let sealed = dir.path().join("data.bin.salted");
    assert!(sealed.exists());

    bin()
        .env("SALTED_PASSPHRASE", "pw")
        .arg("decrypt")
        .arg(&sealed)
        .assert()
        .success();

    let opened = dir.path().join("data.bin.salted.decrypted");
    assert_eq!(fs::read(opened).unwrap(), vec![7u8; 9000]);
}

#[test]
fn wrong_passphrase_fails_without_output() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("a.txt");
    let sealed = dir.path().join("a.salted");
    let opened = dir.path().join("a.out");
    fs::write(&plain, b"abc").unwrap();

    encrypt(&plain, &sealed, "p").success();

    bin()
        .env("SALTED_PASSPHRASE", "q")
        .arg("decrypt")
        .arg(&sealed)
        .arg("-o")
        .arg(&opened)
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed"));

    assert!(!opened.exists());
}

#[test]
fn tampered_file_is_rejected() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("a.txt");
    let sealed = dir.path().join("a.salted");
    fs::write(&plain, b"abc").unwrap();

    encrypt(&plain, &sealed, "pw").success();

    let mut bytes = fs::read(&sealed).unwrap();
    bytes[64 + 100] ^= 0x01;
    fs::write(&sealed, bytes).unwrap();

    bin()
        .env("SALTED_PASSPHRASE", "pw")
        .arg("decrypt")
        .arg(&sealed)
        .arg("-o")
        .arg(dir.path().join("a.out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decrypt"));
}

#[test]
fn stdin_to_stdout_roundtrip() {
    let sealed = bin()
        .env("SALTED_PASSPHRASE", "pw")
        .args(["encrypt", "-", "-o", "-", "--argon-mem", "64", "--argon-lanes", "1"])
        .write_stdin("piped data")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(sealed.len(), 64 + 4096 + 64);

    bin()
        .env("SALTED_PASSPHRASE", "pw")
        .args(["decrypt", "-", "-o", "-"])
        .write_stdin(sealed)
        .assert()
        .success()
        .stdout("piped data");
}

#[test]
fn info_shows_header_params() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("a.txt");
    let sealed = dir.path().join("a.salted");
    fs::write(&plain, b"abc").unwrap();

    encrypt(&plain, &sealed, "pw").success();

    bin()
        .arg("info")
        .arg(&sealed)
        .assert()
        .success()
        .stdout(predicate::str::contains("format version:  2"))
        .stdout(predicate::str::contains("argon2 memory:   64 KiB"));

    let out = bin()
        .arg("info")
        .arg("--json")
        .arg(&sealed)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["version"], 2);
    assert_eq!(json["params"]["lanes"], 1);
}

#[test]
fn info_rejects_foreign_file() {
    let dir = tempdir().unwrap();
    let junk = dir.path().join("junk");
    fs::write(&junk, vec![0xffu8; 64]).unwrap();

    bin()
        .arg("info")
        .arg(&junk)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid magic number"));
}

#[test]
fn invalid_argon2_parameters_are_refused() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("a.txt");
    fs::write(&plain, b"abc").unwrap();

    bin()
        .env("SALTED_PASSPHRASE", "pw")
        .arg("encrypt")
        .arg(&plain)
        .arg("--argon-time")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("time cost must be >= 1"));

    assert!(!dir.path().join("a.txt.salted").exists());
}
