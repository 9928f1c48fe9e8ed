use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use rollcall_backend::memory::auth::MemoryAuth;
use rollcall_backend::memory::store::MemoryStore;
use rollcall_client::config::AppConfig;
use rollcall_client::store::AppStore;
use rollcall_client::{actions, auth, reports};
use rollcall_core::models::attendance::AttendanceStatus;
use rollcall_core::models::class::ClassForm;
use rollcall_core::models::user::{LoginRequest, RegisterRequest, UserRole};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const DEMO_PASSWORD: &str = "rollcall-demo";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Rollcall demo session");
    if let Some(project_id) = &config.project_id {
        info!("Configured for backend project {}", project_id);
    }

    // Connect the store to the in-memory backend
    let identity = Arc::new(MemoryAuth::new());
    let remote = Arc::new(MemoryStore::new());
    let app = AppStore::connect(identity, remote);

    // A teacher signs up and sets up today's class
    let teacher = auth::register(
        &app,
        &account("Dana Hall", "dana@example.com", UserRole::Teacher),
    )
    .await?;
    settle(&app, |app| app.current_user().is_some()).await?;
    info!("Registered teacher {}", teacher.name);

    actions::create_class(
        &app,
        &ClassForm {
            name: "Algebra I".to_string(),
            description: "Linear equations and inequalities".to_string(),
            date: "2024-01-15".to_string(),
            time: "10:00 AM".to_string(),
        },
    )
    .await?;
    settle(&app, |app| !app.classes().is_empty()).await?;
    let class = app.classes()[0].clone();
    actions::start_class(&app, &class.id).await?;
    info!("Class {} is open for attendance", class.name);

    // A student joins, marks attendance and says hello
    let student = auth::register(
        &app,
        &account("Sam Lee", "sam@example.com", UserRole::Student),
    )
    .await?;
    settle(&app, |app| {
        app.current_user().is_some_and(|user| user.id == student.id)
            && app.class_by_id(&class.id).is_some_and(|class| class.is_active)
    })
    .await?;
    actions::join_class(&app, &class.id).await?;
    settle(&app, |app| app.is_student_enrolled(&class.id, &student.id)).await?;
    actions::attend_class(&app, &class.id).await?;
    app.send_chat_message(&class.id, "Good morning! Here for today's session.")
        .await?;
    settle(&app, |app| !app.class_attendance(&class.id).is_empty()).await?;
    info!("{} marked present", student.name);

    // The teacher returns and exports today's report
    auth::login(
        &app,
        &LoginRequest {
            email: "dana@example.com".to_string(),
            password: DEMO_PASSWORD.to_string(),
        },
    )
    .await?;
    settle(&app, |app| {
        app.current_user().is_some_and(|user| user.id == teacher.id)
            && app.is_student_enrolled(&class.id, &student.id)
            && !app.class_attendance(&class.id).is_empty()
            && !app.class_chat_messages(&class.id).is_empty()
    })
    .await?;
    actions::mark_student(
        &app,
        &class.id,
        &student.id,
        &student.name,
        AttendanceStatus::Present,
    )
    .await?;
    app.send_chat_message(&class.id, "Welcome Sam, you are marked present.")
        .await?;
    settle(&app, |app| app.class_chat_messages(&class.id).len() == 2).await?;

    for enrollment in app.class_enrollments(&class.id) {
        info!("Enrolled in {}: {}", class.name, enrollment.student_name);
    }
    for message in app.class_chat_messages(&class.id) {
        info!("[{}] {}: {}", class.name, message.user_name, message.message);
    }
    let path = reports::export_class_report(&app, &class.id, &config.report_dir).await?;
    info!("Attendance report written to {}", path.display());

    auth::logout(&app).await?;

    Ok(())
}

fn account(name: &str, email: &str, role: UserRole) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        confirm_password: DEMO_PASSWORD.to_string(),
        role: Some(role),
    }
}

/// Blocks until the store state satisfies `pred`.
async fn settle(app: &AppStore, pred: impl Fn(&AppStore) -> bool) -> Result<()> {
    let mut changes = app.changes();
    while !pred(app) {
        changes.changed().await?;
    }
    Ok(())
}
