//! # Application State Store
//!
//! This module implements the live state store behind every screen of the
//! application. It resolves the signed-in user, keeps local snapshots of the
//! classroom collections through backend subscriptions, and exposes the
//! mutations the screens call.
//!
//! The store is deliberately a dumb cache: mutations write to the backend
//! only, and local state changes when the backend pushes a fresh snapshot.
//! Reads between the write and the next snapshot can be stale.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use rollcall_backend::auth::IdentityProvider;
use rollcall_backend::collections;
use rollcall_backend::document::{Document, fields_of};
use rollcall_backend::store::{DocumentStore, Query};
use rollcall_core::errors::{AppError, AppResult};
use rollcall_core::models::attendance::{AttendanceRecord, AttendanceStatus};
use rollcall_core::models::chat::{ChatMessage, MAX_MESSAGE_LEN};
use rollcall_core::models::class::{Class, ClassDraft, ClassPatch};
use rollcall_core::models::enrollment::Enrollment;
use rollcall_core::models::user::{User, UserProfile, UserRole};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Serialize)]
struct ClassDoc<'a> {
    #[serde(flatten)]
    draft: &'a ClassDraft,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentDoc<'a> {
    class_id: &'a str,
    student_id: &'a str,
    student_name: &'a str,
    enrolled_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceDoc<'a> {
    class_id: &'a str,
    student_id: &'a str,
    student_name: &'a str,
    date: NaiveDate,
    status: AttendanceStatus,
    marked_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceMark {
    status: AttendanceStatus,
    marked_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageDoc<'a> {
    class_id: &'a str,
    user_id: &'a str,
    user_name: &'a str,
    user_role: UserRole,
    message: &'a str,
    created_at: DateTime<Utc>,
}

struct SessionSlot {
    loading: bool,
    current_user: Option<User>,
}

struct StoreState {
    session: RwLock<SessionSlot>,
    classes: RwLock<Vec<Class>>,
    enrollments: RwLock<Vec<Enrollment>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
    chat_messages: RwLock<Vec<ChatMessage>>,
    revision: watch::Sender<u64>,
}

impl StoreState {
    fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            session: RwLock::new(SessionSlot {
                loading: true,
                current_user: None,
            }),
            classes: RwLock::default(),
            enrollments: RwLock::default(),
            attendance: RwLock::default(),
            chat_messages: RwLock::default(),
            revision,
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn clear_collections(&self) {
        self.classes.write().clear();
        self.enrollments.write().clear();
        self.attendance.write().clear();
        self.chat_messages.write().clear();
    }
}

/// Live application state over an identity provider and a document store.
///
/// Connecting spawns a session watcher: whenever the provider reports a
/// sign-in, the store resolves the user's profile document and opens
/// subscriptions on the classroom collections; signing out tears the
/// subscriptions down and empties every snapshot.
///
/// Accessors are synchronous and return the latest snapshot the backend has
/// pushed. [`AppStore::changes`] exposes a revision counter that ticks on
/// every snapshot or session change, for callers that want to wait for
/// state instead of polling.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rollcall_backend::memory::auth::MemoryAuth;
/// use rollcall_backend::memory::store::MemoryStore;
/// use rollcall_client::store::AppStore;
///
/// # async fn example() {
/// let auth = Arc::new(MemoryAuth::new());
/// let remote = Arc::new(MemoryStore::new());
/// let app = AppStore::connect(auth, remote);
/// assert!(app.current_user().is_none());
/// # }
/// ```
pub struct AppStore {
    identity: Arc<dyn IdentityProvider>,
    remote: Arc<dyn DocumentStore>,
    state: Arc<StoreState>,
    session_task: JoinHandle<()>,
}

impl AppStore {
    /// Connects the store to a backend and starts watching the session.
    ///
    /// Must be called from within a Tokio runtime; the store spawns its
    /// subscription tasks on it.
    pub fn connect(identity: Arc<dyn IdentityProvider>, remote: Arc<dyn DocumentStore>) -> Self {
        let state = Arc::new(StoreState::new());
        let session_task = tokio::spawn(session_loop(
            identity.clone(),
            remote.clone(),
            state.clone(),
        ));
        Self {
            identity,
            remote,
            state,
            session_task,
        }
    }

    pub(crate) fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub(crate) fn remote(&self) -> &Arc<dyn DocumentStore> {
        &self.remote
    }

    /// The resolved signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.state.session.read().current_user.clone()
    }

    /// True until the first session resolution completes.
    pub fn is_loading(&self) -> bool {
        self.state.session.read().loading
    }

    /// All classes in the latest snapshot.
    pub fn classes(&self) -> Vec<Class> {
        self.state.classes.read().clone()
    }

    pub fn class_by_id(&self, class_id: &str) -> Option<Class> {
        self.state
            .classes
            .read()
            .iter()
            .find(|class| class.id == class_id)
            .cloned()
    }

    pub fn teacher_classes(&self, teacher_id: &str) -> Vec<Class> {
        self.state
            .classes
            .read()
            .iter()
            .filter(|class| class.teacher_id == teacher_id)
            .cloned()
            .collect()
    }

    pub fn class_enrollments(&self, class_id: &str) -> Vec<Enrollment> {
        self.state
            .enrollments
            .read()
            .iter()
            .filter(|enrollment| enrollment.class_id == class_id)
            .cloned()
            .collect()
    }

    pub fn student_enrollments(&self, student_id: &str) -> Vec<Enrollment> {
        self.state
            .enrollments
            .read()
            .iter()
            .filter(|enrollment| enrollment.student_id == student_id)
            .cloned()
            .collect()
    }

    pub fn is_student_enrolled(&self, class_id: &str, student_id: &str) -> bool {
        self.state
            .enrollments
            .read()
            .iter()
            .any(|enrollment| {
                enrollment.class_id == class_id && enrollment.student_id == student_id
            })
    }

    pub fn class_attendance(&self, class_id: &str) -> Vec<AttendanceRecord> {
        self.state
            .attendance
            .read()
            .iter()
            .filter(|record| record.class_id == class_id)
            .cloned()
            .collect()
    }

    pub fn student_attendance(&self, student_id: &str) -> Vec<AttendanceRecord> {
        self.state
            .attendance
            .read()
            .iter()
            .filter(|record| record.student_id == student_id)
            .cloned()
            .collect()
    }

    /// Messages for a class, in the chronological order the subscription
    /// delivers them.
    pub fn class_chat_messages(&self, class_id: &str) -> Vec<ChatMessage> {
        self.state
            .chat_messages
            .read()
            .iter()
            .filter(|message| message.class_id == class_id)
            .cloned()
            .collect()
    }

    /// Revision counter that ticks on every session or snapshot change.
    ///
    /// The receiver can be awaited to react to store updates without
    /// polling the accessors.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.state.revision.subscribe()
    }

    /// Creates a class document. The creation time is stamped here; the
    /// class appears in [`AppStore::classes`] once the snapshot catches up.
    pub async fn add_class(&self, draft: &ClassDraft) -> AppResult<()> {
        let result: eyre::Result<()> = async {
            let fields = fields_of(&ClassDoc {
                draft,
                created_at: Utc::now(),
            })?;
            self.remote.add(collections::CLASSES, fields).await?;
            Ok(())
        }
        .await;

        result.map_err(|err| {
            tracing::error!("Error adding class: {}", err);
            AppError::Backend(err)
        })
    }

    /// Merges a partial update into a class document.
    pub async fn update_class(&self, class_id: &str, patch: &ClassPatch) -> AppResult<()> {
        let result: eyre::Result<()> = async {
            let changes = fields_of(patch)?;
            self.remote
                .update(collections::CLASSES, class_id, changes)
                .await?;
            Ok(())
        }
        .await;

        result.map_err(|err| {
            tracing::error!("Error updating class: {}", err);
            AppError::Backend(err)
        })
    }

    /// Enrolls the student in a class. Returns `false` without writing when
    /// the student is already enrolled.
    ///
    /// The local snapshot answers the common case; before inserting, the
    /// backend is queried again so that two rapid calls cannot both enroll.
    pub async fn enroll_in_class(
        &self,
        class_id: &str,
        student_id: &str,
        student_name: &str,
    ) -> AppResult<bool> {
        if self.is_student_enrolled(class_id, student_id) {
            return Ok(false);
        }

        let result: eyre::Result<bool> = async {
            let existing = self
                .remote
                .find(
                    Query::collection(collections::ENROLLMENTS)
                        .where_eq("classId", class_id)
                        .where_eq("studentId", student_id),
                )
                .await?;
            if !existing.is_empty() {
                return Ok(false);
            }

            let fields = fields_of(&EnrollmentDoc {
                class_id,
                student_id,
                student_name,
                enrolled_at: Utc::now(),
            })?;
            self.remote.add(collections::ENROLLMENTS, fields).await?;
            Ok(true)
        }
        .await;

        result.map_err(|err| {
            tracing::error!("Error enrolling in class: {}", err);
            AppError::Backend(err)
        })
    }

    /// Marks a student's attendance for today, in UTC. The day's existing
    /// record is updated in place if there is one, so a student ends each
    /// day with at most one record per class.
    pub async fn mark_attendance(
        &self,
        class_id: &str,
        student_id: &str,
        student_name: &str,
        status: AttendanceStatus,
    ) -> AppResult<()> {
        let result: eyre::Result<()> = async {
            let today = Utc::now().date_naive();
            let existing = self
                .remote
                .find(
                    Query::collection(collections::ATTENDANCE)
                        .where_eq("classId", class_id)
                        .where_eq("studentId", student_id)
                        .where_eq("date", today.to_string()),
                )
                .await?;

            match existing.first() {
                Some(record) => {
                    let changes = fields_of(&AttendanceMark {
                        status,
                        marked_at: Utc::now(),
                    })?;
                    self.remote
                        .update(collections::ATTENDANCE, &record.id, changes)
                        .await?;
                }
                None => {
                    let fields = fields_of(&AttendanceDoc {
                        class_id,
                        student_id,
                        student_name,
                        date: today,
                        status,
                        marked_at: Utc::now(),
                    })?;
                    self.remote.add(collections::ATTENDANCE, fields).await?;
                }
            }
            Ok(())
        }
        .await;

        result.map_err(|err| {
            tracing::error!("Error marking attendance: {}", err);
            AppError::Backend(err)
        })
    }

    /// Sends a chat message to a class channel.
    ///
    /// Silently does nothing when signed out or when the trimmed message is
    /// empty. Messages over [`MAX_MESSAGE_LEN`] characters are rejected.
    pub async fn send_chat_message(&self, class_id: &str, message: &str) -> AppResult<()> {
        let Some(user) = self.current_user() else {
            return Ok(());
        };
        let message = message.trim();
        if message.is_empty() {
            return Ok(());
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "Message must be at most {MAX_MESSAGE_LEN} characters"
            )));
        }

        let result: eyre::Result<()> = async {
            let fields = fields_of(&ChatMessageDoc {
                class_id,
                user_id: &user.id,
                user_name: &user.name,
                user_role: user.role,
                message,
                created_at: Utc::now(),
            })?;
            self.remote.add(collections::CHAT_MESSAGES, fields).await?;
            Ok(())
        }
        .await;

        result.map_err(|err| {
            tracing::error!("Error sending message: {}", err);
            AppError::Backend(err)
        })
    }
}

impl Drop for AppStore {
    fn drop(&mut self) {
        // Aborting the session task also drops its subscription pumps.
        self.session_task.abort();
    }
}

/// Subscription pump tasks for one signed-in session. Dropping aborts them.
struct Subscriptions {
    tasks: Vec<JoinHandle<()>>,
}

impl Subscriptions {
    fn open(remote: &Arc<dyn DocumentStore>, state: &Arc<StoreState>) -> Self {
        let classes = remote.subscribe(Query::collection(collections::CLASSES));
        let enrollments = remote.subscribe(Query::collection(collections::ENROLLMENTS));
        let attendance = remote.subscribe(Query::collection(collections::ATTENDANCE));
        let chat = remote.subscribe(
            Query::collection(collections::CHAT_MESSAGES).order_by("createdAt"),
        );

        let tasks = vec![
            tokio::spawn(pump(classes, state.clone(), |state, classes| {
                *state.classes.write() = classes;
            })),
            tokio::spawn(pump(enrollments, state.clone(), |state, enrollments| {
                *state.enrollments.write() = enrollments;
            })),
            tokio::spawn(pump(attendance, state.clone(), |state, attendance| {
                *state.attendance.write() = attendance;
            })),
            tokio::spawn(pump(chat, state.clone(), |state, chat_messages| {
                *state.chat_messages.write() = chat_messages;
            })),
        ];

        Self { tasks }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Applies every snapshot of one collection to the local state until the
/// subscription closes.
async fn pump<T>(
    mut snapshots: watch::Receiver<Vec<Document>>,
    state: Arc<StoreState>,
    apply: fn(&StoreState, Vec<T>),
) where
    T: DeserializeOwned,
{
    loop {
        let docs = snapshots.borrow_and_update().clone();
        apply(&state, decode_all(&docs));
        state.bump();

        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

fn decode_all<T: DeserializeOwned>(docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.data::<T>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Skipping undecodable document {}: {}", doc.id, err);
                None
            }
        })
        .collect()
}

async fn session_loop(
    identity: Arc<dyn IdentityProvider>,
    remote: Arc<dyn DocumentStore>,
    state: Arc<StoreState>,
) {
    let mut sessions = identity.watch_session();
    let mut subscriptions: Option<Subscriptions> = None;

    loop {
        let session = sessions.borrow_and_update().clone();
        // Tear down the previous session's pumps before resolving the next.
        drop(subscriptions.take());

        match session {
            Some(auth) => {
                let user = fetch_profile(remote.as_ref(), &auth.uid).await;
                {
                    let mut slot = state.session.write();
                    slot.current_user = user.clone();
                    slot.loading = false;
                }
                if user.is_some() {
                    subscriptions = Some(Subscriptions::open(&remote, &state));
                } else {
                    // Session stays open but no profile resolved; nothing to
                    // subscribe to.
                    state.clear_collections();
                }
            }
            None => {
                state.clear_collections();
                let mut slot = state.session.write();
                slot.current_user = None;
                slot.loading = false;
            }
        }
        state.bump();

        if sessions.changed().await.is_err() {
            break;
        }
    }
}

async fn fetch_profile(remote: &dyn DocumentStore, uid: &str) -> Option<User> {
    match remote.get(collections::USERS, uid).await {
        Ok(Some(doc)) => match doc.data::<UserProfile>() {
            Ok(profile) => Some(User {
                id: profile.id,
                name: profile.name,
                role: profile.role,
            }),
            Err(err) => {
                tracing::error!("Error decoding user profile {}: {}", uid, err);
                None
            }
        },
        Ok(None) => {
            tracing::error!("No user profile document for {}", uid);
            None
        }
        Err(err) => {
            tracing::error!("Error fetching user profile: {}", err);
            None
        }
    }
}
