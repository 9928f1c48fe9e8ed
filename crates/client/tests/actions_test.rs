//! Tests for the classroom actions and their role and ownership gates.


use chrono::Utc;
use pretty_assertions::assert_eq;
use rollcall_client::{actions, auth};
use rollcall_core::errors::AppError;
use rollcall_core::models::attendance::AttendanceStatus;
use rollcall_core::models::user::{LoginRequest, UserRole};

use crate::test_utils::{Sandbox, class_form, register_user, wait_until};

/// Creates a class as the signed-in teacher and waits for the snapshot.
async fn create_class_as(sandbox: &Sandbox, name: &str) -> String {
    actions::create_class(&sandbox.app, &class_form(name))
        .await
        .expect("create_class failed");
    wait_until(&sandbox.app, |app| {
        app.classes().iter().any(|class| class.name == name)
    })
    .await;
    sandbox
        .app
        .classes()
        .iter()
        .find(|class| class.name == name)
        .map(|class| class.id.clone())
        .expect("created class missing from snapshot")
}

#[tokio::test]
async fn actions_require_a_signed_in_user() {
    let sandbox = Sandbox::connect();
    wait_until(&sandbox.app, |app| !app.is_loading()).await;

    let err = actions::create_class(&sandbox.app, &class_form("Algebra I"))
        .await
        .expect_err("signed-out create succeeded");

    assert!(matches!(err, AppError::Authentication(_)));
    assert_eq!(err.to_string(), "Authentication error: No signed-in user");
}

#[tokio::test]
async fn create_class_requires_a_teacher() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Sam Lee", "sam@example.com", UserRole::Student).await;

    let err = actions::create_class(&sandbox.app, &class_form("Algebra I"))
        .await
        .expect_err("student created a class");

    assert_eq!(
        err.to_string(),
        "Authorization error: Only teachers can create classes"
    );
}

#[tokio::test]
async fn create_class_validates_the_form() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;

    let mut form = class_form("Algebra I");
    form.name = "   ".to_string();
    let err = actions::create_class(&sandbox.app, &form)
        .await
        .expect_err("blank name accepted");

    assert_eq!(err.to_string(), "Validation error: Please enter a class name");
}

#[tokio::test]
async fn created_class_belongs_to_the_teacher() {
    let sandbox = Sandbox::connect();
    let teacher = register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;

    let mut form = class_form("  Algebra I  ");
    form.description = "  Linear equations  ".to_string();
    actions::create_class(&sandbox.app, &form)
        .await
        .expect("create failed");
    wait_until(&sandbox.app, |app| !app.classes().is_empty()).await;

    let class = &sandbox.app.classes()[0];
    assert_eq!(class.name, "Algebra I");
    assert_eq!(class.description, "Linear equations");
    assert_eq!(class.teacher_id, teacher.id);
    assert_eq!(class.teacher_name, teacher.name);
    assert_eq!(class.schedule.date, "2024-01-15");
    assert_eq!(class.schedule.time, "10:00 AM");
    assert!(!class.is_active);
}

#[tokio::test]
async fn start_and_end_flip_the_active_flag() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;

    actions::start_class(&sandbox.app, &class_id)
        .await
        .expect("start failed");
    wait_until(&sandbox.app, |app| {
        app.class_by_id(&class_id).is_some_and(|class| class.is_active)
    })
    .await;

    actions::end_class(&sandbox.app, &class_id)
        .await
        .expect("end failed");
    wait_until(&sandbox.app, |app| {
        app.class_by_id(&class_id).is_some_and(|class| !class.is_active)
    })
    .await;
}

#[tokio::test]
async fn only_the_owner_manages_a_class() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;

    register_user(&sandbox, "Riley Chen", "riley@example.com", UserRole::Teacher).await;
    wait_until(&sandbox.app, |app| app.class_by_id(&class_id).is_some()).await;

    let err = actions::start_class(&sandbox.app, &class_id)
        .await
        .expect_err("non-owner started the class");

    assert_eq!(
        err.to_string(),
        "Authorization error: Only the owning teacher can manage this class"
    );
}

#[tokio::test]
async fn join_class_requires_a_student() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;

    let err = actions::join_class(&sandbox.app, &class_id)
        .await
        .expect_err("teacher joined a class");

    assert_eq!(
        err.to_string(),
        "Authorization error: Only students can enroll in classes"
    );
}

#[tokio::test]
async fn join_unknown_class_fails() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Sam Lee", "sam@example.com", UserRole::Student).await;

    let err = actions::join_class(&sandbox.app, "missing")
        .await
        .expect_err("joined a class that does not exist");

    assert_eq!(err.to_string(), "Resource not found: Class missing not found");
}

#[tokio::test]
async fn attend_requires_an_active_class() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;

    register_user(&sandbox, "Sam Lee", "sam@example.com", UserRole::Student).await;
    wait_until(&sandbox.app, |app| app.class_by_id(&class_id).is_some()).await;
    actions::join_class(&sandbox.app, &class_id)
        .await
        .expect("join failed");

    let err = actions::attend_class(&sandbox.app, &class_id)
        .await
        .expect_err("attended an inactive class");

    assert_eq!(
        err.to_string(),
        "Validation error: This class is not currently active"
    );
}

#[tokio::test]
async fn attend_requires_enrollment() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;
    actions::start_class(&sandbox.app, &class_id)
        .await
        .expect("start failed");

    register_user(&sandbox, "Sam Lee", "sam@example.com", UserRole::Student).await;
    wait_until(&sandbox.app, |app| {
        app.class_by_id(&class_id).is_some_and(|class| class.is_active)
    })
    .await;

    let err = actions::attend_class(&sandbox.app, &class_id)
        .await
        .expect_err("attended without enrolling");

    assert_eq!(
        err.to_string(),
        "Validation error: You must be enrolled to attend this class"
    );
}

#[tokio::test]
async fn attend_marks_the_student_present() {
    let sandbox = Sandbox::connect();
    register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;
    actions::start_class(&sandbox.app, &class_id)
        .await
        .expect("start failed");

    let student = register_user(&sandbox, "Sam Lee", "sam@example.com", UserRole::Student).await;
    wait_until(&sandbox.app, |app| {
        app.class_by_id(&class_id).is_some_and(|class| class.is_active)
    })
    .await;
    let joined = actions::join_class(&sandbox.app, &class_id)
        .await
        .expect("join failed");
    assert!(joined);
    wait_until(&sandbox.app, |app| {
        app.is_student_enrolled(&class_id, &student.id)
    })
    .await;

    actions::attend_class(&sandbox.app, &class_id)
        .await
        .expect("attend failed");
    wait_until(&sandbox.app, |app| {
        !app.class_attendance(&class_id).is_empty()
    })
    .await;

    let records = sandbox.app.class_attendance(&class_id);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, student.id);
    assert_eq!(records[0].student_name, student.name);
    assert_eq!(records[0].status, AttendanceStatus::Present);
    assert_eq!(records[0].date, Utc::now().date_naive());
}

#[tokio::test]
async fn only_the_owner_marks_other_students() {
    let sandbox = Sandbox::connect();
    let teacher =
        register_user(&sandbox, "Dana Hall", "dana@example.com", UserRole::Teacher).await;
    let class_id = create_class_as(&sandbox, "Algebra I").await;

    let student = register_user(&sandbox, "Sam Lee", "sam@example.com", UserRole::Student).await;
    wait_until(&sandbox.app, |app| app.class_by_id(&class_id).is_some()).await;
    actions::join_class(&sandbox.app, &class_id)
        .await
        .expect("join failed");

    let err = actions::mark_student(
        &sandbox.app,
        &class_id,
        &student.id,
        &student.name,
        AttendanceStatus::Absent,
    )
    .await
    .expect_err("student marked attendance for the roster");
    assert!(matches!(err, AppError::Authorization(_)));

    // Back as the owning teacher, the same call goes through.
    let request = LoginRequest {
        email: "dana@example.com".to_string(),
        password: "password123".to_string(),
    };
    auth::login(&sandbox.app, &request).await.expect("login failed");
    wait_until(&sandbox.app, |app| {
        app.current_user().is_some_and(|user| user.id == teacher.id)
            && app.class_by_id(&class_id).is_some()
    })
    .await;

    actions::mark_student(
        &sandbox.app,
        &class_id,
        &student.id,
        &student.name,
        AttendanceStatus::Absent,
    )
    .await
    .expect("owner mark failed");
    wait_until(&sandbox.app, |app| {
        !app.class_attendance(&class_id).is_empty()
    })
    .await;

    let records = sandbox.app.class_attendance(&class_id);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Absent);
    assert_eq!(records[0].student_name, student.name);
}
