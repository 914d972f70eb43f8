use std::{fs, path::PathBuf, process};

use powergen_core::{
    check_labels, filter_catalog, generate_catalog, rv_catalog, save_program, GenError,
    GenSettings,
};
use rand::{rngs::StdRng, SeedableRng};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("powergen-{}-{}", name, process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn generate(only: &[&str], settings: &GenSettings, seed: u64) -> Vec<PathBuf> {
    let only: Vec<String> = only.iter().map(|m| m.to_string()).collect();
    let catalog = filter_catalog(rv_catalog(), &only);
    let mut rng = StdRng::seed_from_u64(seed);
    generate_catalog(&catalog, &[100], &[5], settings, &mut rng).unwrap()
}

#[test]
fn writes_one_file_per_record() {
    let dir = scratch_dir("files");
    let settings = GenSettings { output_dir: dir.clone(), ..Default::default() };
    let written = generate(&["add", "beq", "fld"], &settings, 1);

    let names: Vec<String> =
        written.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
    assert_eq!(names, ["beq_100x5.s", "not_taken_beq_100x5.s", "add_100x5.s", "fld_100x5.s"]);
    for path in &written {
        assert!(path.starts_with(&dir));
        check_labels(&fs::read_to_string(path).unwrap()).unwrap();
    }

    let add = fs::read_to_string(dir.join("add_100x5.s")).unwrap();
    let body = add.split(".loop:\n").nth(1).unwrap().split("        addi x1").next().unwrap();
    assert_eq!(body.lines().filter(|l| l.trim_start().starts_with("add ")).count(), 5);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn writes_init_baseline_with_prefix() {
    let dir = scratch_dir("init");
    let settings = GenSettings {
        output_dir: dir.clone(),
        prefix: "run1_".to_string(),
        emit_init: true,
        exit_address: 0x2000,
        ..Default::default()
    };
    let written = generate(&["fmul.s"], &settings, 2);
    assert_eq!(written, [dir.join("run1_fmul.s_100x5.s"), dir.join("run1_fmul.s_100x5_init.s")]);

    let full = fs::read_to_string(&written[0]).unwrap();
    let init = fs::read_to_string(&written[1]).unwrap();
    assert!(full.contains("        j 0x2000\n"));
    assert!(full.contains("fmul.s "));
    assert!(!init.contains("fmul.s "));

    // Same initialization and literals, empty loop body
    let prologue = |asm: &str| asm.split(".loop:").next().unwrap().to_string();
    let rodata = |asm: &str| asm.split(".section .rodata").nth(1).unwrap().to_string();
    assert_eq!(prologue(&full), prologue(&init));
    assert_eq!(rodata(&full), rodata(&init));
    assert!(init.contains(".loop:\n        addi x1, x1, -1\n"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn same_seed_same_programs() {
    let dir_a = scratch_dir("seed-a");
    let dir_b = scratch_dir("seed-b");
    let settings_a = GenSettings { output_dir: dir_a.clone(), ..Default::default() };
    let settings_b = GenSettings { output_dir: dir_b.clone(), ..Default::default() };
    let a = generate(&["jal", "div"], &settings_a, 3);
    let b = generate(&["jal", "div"], &settings_b, 3);
    assert_eq!(a.len(), 2);
    for (pa, pb) in a.iter().zip(&b) {
        assert_eq!(fs::read_to_string(pa).unwrap(), fs::read_to_string(pb).unwrap());
    }
    fs::remove_dir_all(&dir_a).unwrap();
    fs::remove_dir_all(&dir_b).unwrap();
}

#[test]
fn reports_unwritable_output() {
    let dir = scratch_dir("blocked");
    fs::write(&dir, "not a directory").unwrap();
    match save_program(&dir.join("sub"), "add_1x1.s", "") {
        Err(GenError::Io { path, .. }) => assert_eq!(path, dir.join("sub")),
        other => panic!("unexpected result {other:?}"),
    }
    fs::remove_file(&dir).unwrap();
}

#[test]
fn long_bodies_skip_only_unencodable_jumps() {
    let dir = scratch_dir("long");
    let settings = GenSettings { output_dir: dir.clone(), ..Default::default() };
    let mut rng = StdRng::seed_from_u64(4);
    let catalog = rv_catalog();
    let written = generate_catalog(&catalog, &[100], &[1000], &settings, &mut rng).unwrap();

    assert_eq!(written.len(), catalog.len() - 1);
    assert!(!dir.join("jalr_100x1000.s").exists());
    assert!(written.contains(&dir.join("jal_100x1000.s")));
    assert!(written.contains(&dir.join("fmv.d.x_100x1000.s")));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_errors_still_abort() {
    let dir = scratch_dir("abort");
    fs::write(&dir, "not a directory").unwrap();
    let settings = GenSettings { output_dir: dir.join("sub"), ..Default::default() };
    let mut rng = StdRng::seed_from_u64(5);
    let result = generate_catalog(&rv_catalog(), &[1], &[1000], &settings, &mut rng);
    assert!(matches!(result, Err(GenError::Io { .. })));
    fs::remove_file(&dir).unwrap();
}
