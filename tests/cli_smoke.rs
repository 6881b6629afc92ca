use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_fxstudio")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "fxstudio.exe"
            } else {
                "fxstudio"
            });
            p
        })
}

#[test]
fn cli_new_add_and_list() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let _ = std::fs::remove_dir_all(&dir);
    let dir_arg = dir.to_string_lossy().to_string();

    let status = std::process::Command::new(exe())
        .args(["new", "--name", "Smoke", "--dir", dir_arg.as_str()])
        .status()
        .unwrap();
    assert!(status.success());

    let project = dir.join("Smoke.fxsproj");
    assert!(project.exists());
    let project_arg = project.to_string_lossy().to_string();

    let out = std::process::Command::new(exe())
        .args(["add", "--project", project_arg.as_str(), "--shape", "teapot"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "3");

    let out = std::process::Command::new(exe())
        .args(["actors", "--project", project_arg.as_str()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let listing = String::from_utf8_lossy(&out.stdout);
    assert!(listing.contains("3\tTeapot\tTeapot"));
    assert!(listing.contains("1\tSkybox\tSkybox"));
}

#[test]
fn cli_paths_prints_positional_paths() {
    let dir = PathBuf::from("target").join("cli_paths");
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("doc.xml");
    std::fs::write(&file, r#"<A><B k="v"/><B/></A>"#).unwrap();
    let file_arg = file.to_string_lossy().to_string();

    let out = std::process::Command::new(exe())
        .args(["paths", "--file", file_arg.as_str()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("/*[1]\t<A>"));
    assert!(text.contains("/*[1]/*[1]/@*\t@k=v"));
    assert!(text.contains("/*[1]/*[2]\t<B>"));
}
