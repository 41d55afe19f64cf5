use student_web::{bootstrap, Request, SiteConfig, StudentSite};

#[test]
fn bootstrap_opens_configured_database_and_serves_requests() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("students.db");
    let log_dir = dir.path().join("logs");
    let config = SiteConfig::from_lookup(|key| match key {
        "STUDENTS_DB_PATH" => Some(db_path.to_string_lossy().into_owned()),
        "STUDENTS_LOG_DIR" => Some(log_dir.to_string_lossy().into_owned()),
        "STUDENTS_LOG_LEVEL" => Some("info".to_string()),
        _ => None,
    });

    let conn = bootstrap(&config).unwrap();
    let site = StudentSite::open(&conn, &config).unwrap();
    let reply = site.handle(&Request::get("/students/")).unwrap();

    assert_eq!(reply.template(), Some("list.html"));
    assert!(db_path.is_file());
    assert!(log_dir.is_dir());
}
