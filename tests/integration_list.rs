use predicates::prelude::*;

mod common;
use common::{config_with, TestProject};

#[test]
fn test_init_creates_config() {
    let project = TestProject::new();

    project
        .command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("depcmake.yaml"));

    assert!(project.project_dir().join("depcmake.yaml").exists());

    // the starter file must itself be listable
    project.command().arg("list").assert().success();
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let project = TestProject::new();
    project.write_config("dependencies:\n");

    project
        .command()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    project.command().arg("init").arg("--force").assert().success();
}

#[test]
fn test_list_shows_declared_dependencies() {
    let project = TestProject::new();
    project.write_config(
        "dependencies:\n\
         \x20 - name: My lib\n\
         \x20   url: https://example.com/my-lib.git\n\
         \x20   git_hash: v1.2.0\n\
         \x20   cmake_args: -DBUILD_SHARED_LIBS=ON\n",
    );

    project
        .command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dependencies listed in config"))
        .stdout(predicate::str::contains("Name: My lib"))
        .stdout(predicate::str::contains("URL: https://example.com/my-lib.git"))
        .stdout(predicate::str::contains("Git hash: v1.2.0"))
        .stdout(predicate::str::contains("CMake arguments: -DBUILD_SHARED_LIBS=ON"))
        .stdout(predicate::str::contains("Directory name: my_lib_"));
}

#[test]
fn test_list_without_config_fails() {
    let project = TestProject::new();

    project
        .command()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to find a depcmake.yaml"));
}

#[test]
fn test_list_rejects_malformed_config() {
    let project = TestProject::new();
    project.write_config("not_dependencies: true\n");

    project
        .command()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect config"));
}

#[test]
fn test_list_shows_fetch_state_from_cache() {
    let project = TestProject::new();
    let url = project.add_source("lib-a", "LibA", Some("1.0"), None);
    project.write_config(&config_with(&[("Lib A", &url)]));

    project
        .command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetched").not());

    project.command().arg("fetch").assert().success();

    project
        .command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetched"));
}
