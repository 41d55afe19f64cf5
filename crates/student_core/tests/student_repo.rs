use rusqlite::Connection;
use student_core::db::migrations::latest_version;
use student_core::db::open_db_in_memory;
use student_core::{
    AcademicLevel, EnrolledStatus, RepoError, SqliteStudentRepository, Student, StudentDraft,
    StudentListQuery, StudentRepository,
};
use uuid::Uuid;

fn student(first: &str, last: &str, level: AcademicLevel, status: EnrolledStatus) -> Student {
    Student::new(StudentDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        current_academic_level: level,
        enrolled_status: status,
    })
}

fn names(students: &[Student]) -> Vec<&str> {
    students
        .iter()
        .map(|student| student.first_name.as_str())
        .collect()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut created = student("Ada", "Lovelace", AcademicLevel::Licence2, EnrolledStatus::Active);
    created.photo = Some("students/photos/ada.png".to_string());
    let id = repo.create_student(&created).unwrap();

    let loaded = repo.get_student(id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    assert!(repo.get_student(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let missing = student("No", "One", AcademicLevel::Licence1, EnrolledStatus::Active);
    let update_err = repo.update_student(&missing).unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(id) if id == missing.id));

    let delete_err = repo.delete_student(missing.id).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == missing.id));
    assert_eq!(repo.count_students().unwrap(), 0);
}

#[test]
fn update_rewrites_search_columns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut row = student("Ada", "Lovelace", AcademicLevel::Licence1, EnrolledStatus::Active);
    repo.create_student(&row).unwrap();
    row.first_name = "Augusta".to_string();
    repo.update_student(&row).unwrap();

    let by_old = repo
        .list_students(&StudentListQuery::from_params(Some("ada"), None, None))
        .unwrap();
    assert!(by_old.is_empty());

    let by_new = repo
        .list_students(&StudentListQuery::from_params(Some("gusta"), None, None))
        .unwrap();
    assert_eq!(names(&by_new), vec!["Augusta"]);
}

#[test]
fn text_search_matches_either_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create_student(&student("Ada", "Lovelace", AcademicLevel::Licence1, EnrolledStatus::Active))
        .unwrap();
    repo.create_student(&student("Grace", "Hopper", AcademicLevel::Master1, EnrolledStatus::Active))
        .unwrap();
    repo.create_student(&student("Émile", "Zola", AcademicLevel::Licence3, EnrolledStatus::Graduated))
        .unwrap();

    let by_last = repo
        .list_students(&StudentListQuery::from_params(Some("  HOP "), None, None))
        .unwrap();
    assert_eq!(names(&by_last), vec!["Grace"]);

    let by_first = repo
        .list_students(&StudentListQuery::from_params(Some("éMI"), None, None))
        .unwrap();
    assert_eq!(names(&by_first), vec!["Émile"]);

    let wildcard_chars = repo
        .list_students(&StudentListQuery::from_params(Some("%"), None, None))
        .unwrap();
    assert!(wildcard_chars.is_empty());

    repo.create_student(&student("ΑΣΑ", "Παππά", AcademicLevel::Licence2, EnrolledStatus::Active))
        .unwrap();
    for query in ["ΑΣ", "ασ", "ΑΣΑ", "σα"] {
        let greek = repo
            .list_students(&StudentListQuery::from_params(Some(query), None, None))
            .unwrap();
        assert_eq!(names(&greek), vec!["ΑΣΑ"], "query {query}");
    }
}

#[test]
fn choice_filters_intersect_and_unknown_values_match_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create_student(&student("A", "One", AcademicLevel::Licence1, EnrolledStatus::Active))
        .unwrap();
    repo.create_student(&student("B", "Two", AcademicLevel::Licence1, EnrolledStatus::Suspended))
        .unwrap();
    repo.create_student(&student("C", "Three", AcademicLevel::Licence2, EnrolledStatus::Active))
        .unwrap();

    let both = repo
        .list_students(&StudentListQuery::from_params(None, Some("L1"), Some("ACTIVE")))
        .unwrap();
    assert_eq!(names(&both), vec!["A"]);

    let unknown = repo
        .list_students(&StudentListQuery::from_params(None, Some("L9"), None))
        .unwrap();
    assert!(unknown.is_empty());
}

#[test]
fn list_orders_by_created_at_desc_with_insertion_tie_break() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let draft = |first: &str| StudentDraft {
        first_name: first.to_string(),
        last_name: "Row".to_string(),
        current_academic_level: AcademicLevel::Licence1,
        enrolled_status: EnrolledStatus::Active,
    };
    repo.create_student(&Student::with_id(Uuid::new_v4(), draft("old"), 1_000))
        .unwrap();
    repo.create_student(&Student::with_id(Uuid::new_v4(), draft("tie-first"), 2_000))
        .unwrap();
    repo.create_student(&Student::with_id(Uuid::new_v4(), draft("tie-second"), 2_000))
        .unwrap();
    repo.create_student(&Student::with_id(Uuid::new_v4(), draft("newest"), 3_000))
        .unwrap();

    let listed = repo.list_students(&StudentListQuery::default()).unwrap();
    assert_eq!(
        names(&listed),
        vec!["newest", "tie-second", "tie-first", "old"]
    );
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteStudentRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_students_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("students"))
    ));
}

#[test]
fn read_rejects_corrupted_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (
            uuid, first_name, last_name, first_name_folded, last_name_folded,
            current_academic_level, enrolled_status, created_at, updated_at
        ) VALUES ('not-a-uuid', 'a', 'b', 'a', 'b', 'L1', 'ACTIVE', 1, 1);",
        [],
    )
    .unwrap();

    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let err = repo.list_students(&StudentListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
