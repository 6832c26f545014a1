use std::io::Write;

fn run_script(script: String) -> (ed::Editor, String) {
    let mut session = ed::Session::new(ed::Editor::new(), Vec::new());

    session.run(std::io::Cursor::new(script)).unwrap();

    let (editor, out) = session.into_parts();

    (editor, String::from_utf8(out).unwrap())
}

#[test]
fn edit_print_delete_write_quit() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"one\ntwo\nthree\nfour\n").unwrap();
    let path = file.path().display().to_string();

    let (editor, out) = run_script(format!("e {path}\n2,3p\n1,1p\n2,2d\nw\n,n\nq\n$d\n"));

    assert_eq!(out, "two\nthree\none\n1\tone\n2\tthree\n3\tfour\n");
    assert_eq!(
        std::fs::read_to_string(file.path()).unwrap(),
        "one\nthree\nfour\n"
    );
    assert_eq!(editor.contents(), "one\nthree\nfour\n");
}

#[cfg(unix)]
#[test]
fn write_keeps_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.sh");
    std::fs::write(&path, "echo hi\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    let (_, out) = run_script(format!("e {}\na\necho bye\n.\nw\n", path.display()));

    assert_eq!(out, "");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "echo hi\necho bye\n");
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn write_to_new_file_then_reedit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.txt");

    let (editor, out) = run_script(format!(
        "a\nalpha\nbeta\n.\nw {p}\n1d\ne {p}\n,p\n",
        p = path.display()
    ));

    assert_eq!(out, "alpha\nbeta\n");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "alpha\nbeta\n");
    assert_eq!(editor.filename(), Some(path.as_path()));
    assert_eq!(editor.current_line(), 2);
}

#[test]
fn failed_edit_reports_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let (editor, out) = run_script(format!("e {}\na\nstill here\n.\np\n", missing.display()));

    assert!(out.starts_with('?'));
    assert!(out.ends_with("still here\n"));
    assert_eq!(editor.filename(), None);
}

#[test]
fn printed_lines_are_not_reencoded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"na\xefve\nplain\n").unwrap();
    let script = format!("e {}\n1p\n2n\n", file.path().display());
    let mut session = ed::Session::new(ed::Editor::new(), Vec::new());

    session.run(std::io::Cursor::new(script)).unwrap();

    let (_, out) = session.into_parts();
    assert_eq!(out, b"na\xefve\n2\tplain\n");
}
