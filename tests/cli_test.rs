use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::Path;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

#[test]
fn compress_expand_round_trip() -> STDRESULT {
    let in_path = Path::new("tests").join("transcript.txt");
    let temp_dir = tempfile::tempdir()?;
    let packed_path = temp_dir.path().join("transcript.hc");
    let out_path = temp_dir.path().join("transcript.txt");
    let mut cmd = Command::cargo_bin("huffchat")?;
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&packed_path)
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("huffchat")?;
    cmd.arg("expand")
        .arg("-i").arg(&packed_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    match (std::fs::read(&in_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    // chat-like text repeats itself, the packed copy should be smaller
    let packed = std::fs::read(&packed_path)?;
    let original = std::fs::read(&in_path)?;
    assert!(packed.len() < original.len());
    Ok(())
}

#[test]
fn expand_rejects_garbage() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let bad_path = temp_dir.path().join("garbage.hc");
    // an escape announcing far more raw bytes than the file holds
    std::fs::write(&bad_path,[0x80,0xff,0xff,0x41])?;
    let out_path = temp_dir.path().join("garbage.txt");
    let mut cmd = Command::cargo_bin("huffchat")?;
    cmd.arg("expand")
        .arg("-i").arg(&bad_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Truncated"));
    Ok(())
}
