//! # Classroom Actions
//!
//! The operations the application screens perform, with their role and
//! ownership gates. Everything here reads the current snapshots for its
//! checks and delegates the actual write to the store.

use rollcall_core::errors::{AppError, AppResult};
use rollcall_core::models::attendance::AttendanceStatus;
use rollcall_core::models::class::{Class, ClassForm, ClassPatch};
use rollcall_core::models::user::{User, UserRole};

use crate::store::AppStore;

/// Creates a class owned by the signed-in teacher.
pub async fn create_class(app: &AppStore, form: &ClassForm) -> AppResult<()> {
    let teacher = require_role(app, UserRole::Teacher, "create classes")?;
    let draft = form.to_draft(&teacher)?;
    app.add_class(&draft).await
}

/// Marks a class active so students can record attendance.
pub async fn start_class(app: &AppStore, class_id: &str) -> AppResult<()> {
    set_class_active(app, class_id, true).await
}

/// Marks a class inactive again.
pub async fn end_class(app: &AppStore, class_id: &str) -> AppResult<()> {
    set_class_active(app, class_id, false).await
}

/// Enrolls the signed-in student. Returns `false` when already enrolled.
pub async fn join_class(app: &AppStore, class_id: &str) -> AppResult<bool> {
    let student = require_role(app, UserRole::Student, "enroll in classes")?;
    require_class(app, class_id)?;
    app.enroll_in_class(class_id, &student.id, &student.name)
        .await
}

/// Records the signed-in student's own attendance for today.
///
/// The class must be active and the student enrolled; both checks run
/// against the local snapshot, like the screens they mirror.
pub async fn attend_class(app: &AppStore, class_id: &str) -> AppResult<()> {
    let student = require_role(app, UserRole::Student, "attend classes")?;
    let class = require_class(app, class_id)?;

    if !class.is_active {
        return Err(AppError::Validation(
            "This class is not currently active".to_string(),
        ));
    }
    if !app.is_student_enrolled(class_id, &student.id) {
        return Err(AppError::Validation(
            "You must be enrolled to attend this class".to_string(),
        ));
    }

    app.mark_attendance(class_id, &student.id, &student.name, AttendanceStatus::Present)
        .await
}

/// Lets the owning teacher mark any student present or absent for today.
pub async fn mark_student(
    app: &AppStore,
    class_id: &str,
    student_id: &str,
    student_name: &str,
    status: AttendanceStatus,
) -> AppResult<()> {
    require_owning_teacher(app, class_id)?;
    app.mark_attendance(class_id, student_id, student_name, status)
        .await
}

async fn set_class_active(app: &AppStore, class_id: &str, active: bool) -> AppResult<()> {
    require_owning_teacher(app, class_id)?;
    let patch = ClassPatch {
        is_active: Some(active),
        ..ClassPatch::default()
    };
    app.update_class(class_id, &patch).await
}

fn require_user(app: &AppStore) -> AppResult<User> {
    app.current_user()
        .ok_or_else(|| AppError::Authentication("No signed-in user".to_string()))
}

fn require_role(app: &AppStore, role: UserRole, action: &str) -> AppResult<User> {
    let user = require_user(app)?;
    if user.role != role {
        return Err(AppError::Authorization(format!(
            "Only {}s can {}",
            role, action
        )));
    }
    Ok(user)
}

fn require_class(app: &AppStore, class_id: &str) -> AppResult<Class> {
    app.class_by_id(class_id)
        .ok_or_else(|| AppError::NotFound(format!("Class {} not found", class_id)))
}

pub(crate) fn require_owning_teacher(app: &AppStore, class_id: &str) -> AppResult<Class> {
    let teacher = require_role(app, UserRole::Teacher, "manage classes")?;
    let class = require_class(app, class_id)?;
    if class.teacher_id != teacher.id {
        return Err(AppError::Authorization(
            "Only the owning teacher can manage this class".to_string(),
        ));
    }
    Ok(class)
}
