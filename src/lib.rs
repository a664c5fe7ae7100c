//! # Offline Quiz Core
//!
//! Local-first core of a quiz application: the quiz and attempt data model,
//! their persistence in a local key-value namespace, and the grading rules.
//! UI hosts (Flutter, web views, native shells) drive it through the
//! C-compatible functions below, exchanging JSON strings, or link it as a
//! regular Rust library.
//!
//! ## Layout
//!
//! - [`quiz_model`] - `Quiz`, `Question`, `AnswerOption`, `Attempt`
//! - [`storage_port`] - the `KeyValueStore` port and an in-memory store
//! - [`local_db_state`] - LMDB-backed store living in `<name>.lmdb/`
//! - [`quiz_store`] / [`attempt_store`] - the two persisted collections
//! - [`grading`] - exact-set-match scoring
//! - [`validation`], [`session`], [`review`] - authoring, taking and reviewing
//!
//! ## Quick Start
//!
//! ```no_run
//! use offline_quiz_core::local_db_state::AppDbState;
//! use offline_quiz_core::session::QuizSession;
//! use offline_quiz_core::quiz_store::DEFAULT_QUIZ_ID;
//!
//! let db = AppDbState::init("quiz_data".to_string())?;
//! let quiz = db.quizzes().get_quiz_by_id(DEFAULT_QUIZ_ID)?.expect("seeded");
//!
//! let mut session = QuizSession::start(quiz.clone());
//! for question in &quiz.questions {
//!     session.select(&question.id, &question.options[0].id)?;
//! }
//! let attempt = session.finish()?;
//! db.attempts().save_attempt(attempt)?;
//! # Ok::<(), offline_quiz_core::app_response::AppResponse>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a JSON-serialized [`AppResponse`] that must be
//! released with [`free_c_string`]. Successful calls return `{"Ok": "<json>"}`.
//!
//! - [`create_db`] / [`create_db_with_config`] - open a database
//! - [`get_all_quizzes`], [`get_quiz_by_id`], [`save_quiz`], [`delete_quiz`]
//! - [`validate_quiz`] - authoring checks
//! - [`save_attempt`], [`get_attempt_by_id`], [`get_all_attempts`], [`clear_attempts`]
//! - [`grade_answers`] - score a set of answers without touching storage
//! - [`review_attempt`] - attempt plus the quiz as currently stored
//! - [`close_database`]

pub mod app_response;
pub mod attempt_store;
pub mod config;
pub mod grading;
pub mod local_db_state;
pub mod quiz_model;
pub mod quiz_store;
pub mod review;
pub mod session;
pub mod storage_port;
pub mod validation;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::local_db_state::AppDbState;
use crate::quiz_model::{AnswerMap, Attempt, Quiz};
use crate::review::ReviewOutcome;

/// Opens (or creates) the database `<name>.lmdb` with default settings.
///
/// # Returns
///
/// A pointer to the [`AppDbState`] on success, or null on failure. The
/// pointer stays owned by the caller for the lifetime of the application.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use offline_quiz_core::create_db;
///
/// let name = CString::new("quiz_data").unwrap();
/// let db_state = create_db(name.as_ptr());
/// assert!(!db_state.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db(name: *const c_char) -> *mut AppDbState {
    if name.is_null() {
        warn!("Null name pointer passed to create_db");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_state(StoreConfig::new(name_str))
}

/// Opens a database from a JSON [`StoreConfig`], e.g.
/// `{"name":"quiz_data","seed_policy":"on_startup"}`.
///
/// Returns null when the pointer, the JSON or the configuration is invalid,
/// or when the environment cannot be opened.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db_with_config(config_json: *const c_char) -> *mut AppDbState {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_db_with_config");
        return std::ptr::null_mut();
    }

    let raw = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match StoreConfig::from_json(raw) {
        Ok(config) => open_state(config),
        Err(e) => {
            warn!("Rejected database configuration: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_state(config: StoreConfig) -> *mut AppDbState {
    let dir = config.lmdb_dir();
    info!("Attempting to create/open database at: {dir}");

    match AppDbState::init_with_config(config) {
        Ok(state) => {
            info!("✅ Database initialized successfully");
            Box::into_raw(Box::new(state))
        }
        Err(e) => {
            warn!("❌ Failed to initialize database at {dir}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns every quiz as a JSON array, seeding the built-in quiz when the
/// store's seed policy asks for it.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_quizzes(state: *mut AppDbState) -> *const c_char {
    let state = match state_ref(state, "get_all_quizzes") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match state.quizzes().get_all_quizzes() {
        Ok(quizzes) => ok_json(&quizzes),
        Err(e) => response_to_c_string(&e),
    }
}

/// Retrieves a quiz by id; `NotFound` when no quiz has that id.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_quiz_by_id(state: *mut AppDbState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "get_quiz_by_id") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.quizzes().get_quiz_by_id(&id_str) {
        Ok(Some(quiz)) => ok_json(&quiz),
        Ok(None) => {
            let error = AppResponse::NotFound(format!("No quiz found with id: {id_str}"));
            response_to_c_string(&error)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Inserts or replaces a quiz.
///
/// The quiz is stored as given; run [`validate_quiz`] first when saving from
/// an authoring form. A failed write comes back as `StorageError`.
///
/// # JSON Format
///
/// ```json
/// {
///   "id": "quiz-1",
///   "title": "Capitals",
///   "questions": [{
///     "id": "q1", "text": "Capital of France?", "mode": "single",
///     "options": [
///       { "id": "a", "text": "Paris", "isCorrect": true },
///       { "id": "b", "text": "Lyon", "isCorrect": false }
///     ]
///   }]
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_quiz(state: *mut AppDbState, quiz_json: *const c_char) -> *const c_char {
    let state = match state_ref(state, "save_quiz") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let quiz: Quiz = match parse_json(quiz_json, "quiz JSON") {
        Ok(q) => q,
        Err(err) => return err,
    };
    let quiz_id = quiz.id.clone();

    match state.quizzes().save_quiz(quiz) {
        Ok(()) => response_to_c_string(&AppResponse::success(format!("Quiz {quiz_id} saved"))),
        Err(e) => response_to_c_string(&e),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_quiz(state: *mut AppDbState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "delete_quiz") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.quizzes().delete_quiz(&id_str) {
        Ok(()) => response_to_c_string(&AppResponse::success(format!("Quiz {id_str} deleted"))),
        Err(e) => response_to_c_string(&e),
    }
}

/// Runs the authoring checks on a quiz. Returns `Ok` or a `ValidationError`
/// naming the first offending question by position.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn validate_quiz(quiz_json: *const c_char) -> *const c_char {
    let quiz: Quiz = match parse_json(quiz_json, "quiz JSON") {
        Ok(q) => q,
        Err(err) => return err,
    };

    match validation::validate_quiz(&quiz) {
        Ok(()) => response_to_c_string(&AppResponse::success("Quiz is valid")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Appends a finished attempt to the history.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_attempt(
    state: *mut AppDbState,
    attempt_json: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "save_attempt") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let attempt: Attempt = match parse_json(attempt_json, "attempt JSON") {
        Ok(a) => a,
        Err(err) => return err,
    };
    let attempt_id = attempt.id.clone();

    match state.attempts().save_attempt(attempt) {
        Ok(()) => {
            response_to_c_string(&AppResponse::success(format!("Attempt {attempt_id} saved")))
        }
        Err(e) => response_to_c_string(&e),
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_attempt_by_id(state: *mut AppDbState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "get_attempt_by_id") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match state.attempts().get_attempt_by_id(&id_str) {
        Some(attempt) => ok_json(&attempt),
        None => {
            let error = AppResponse::NotFound(format!("No attempt found with id: {id_str}"));
            response_to_c_string(&error)
        }
    }
}

/// Returns all attempts in the order they were saved.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_attempts(state: *mut AppDbState) -> *const c_char {
    let state = match state_ref(state, "get_all_attempts") {
        Ok(s) => s,
        Err(err) => return err,
    };

    ok_json(&state.attempts().get_all_attempts())
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_attempts(state: *mut AppDbState) -> *const c_char {
    let state = match state_ref(state, "clear_attempts") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match state.attempts().clear_attempts() {
        Ok(()) => response_to_c_string(&AppResponse::success("Attempt history cleared")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Scores answers against a quiz without touching storage.
///
/// `answers_json` maps question ids to selected option ids:
/// `{"q1":["q1o1"],"q5":["q5o1","q5o2"]}`. The payload is the score plus
/// the outcome of every question.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn grade_answers(
    quiz_json: *const c_char,
    answers_json: *const c_char,
) -> *const c_char {
    let quiz: Quiz = match parse_json(quiz_json, "quiz JSON") {
        Ok(q) => q,
        Err(err) => return err,
    };
    let answers: AnswerMap = match parse_json(answers_json, "answers JSON") {
        Ok(a) => a,
        Err(err) => return err,
    };

    ok_json(&grading::grade_detailed(&quiz, &answers))
}

/// Builds the review of a stored attempt.
///
/// An unknown attempt id is `NotFound`. When the attempt's quiz has been
/// deleted the payload is a `QuizMissing` outcome rather than an error; it
/// carries the attempt and the "Quiz no longer exists." message to display.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn review_attempt(
    state: *mut AppDbState,
    attempt_id: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "review_attempt") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(attempt_id, "attempt id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match review::review_attempt(&state.quizzes(), &state.attempts(), &id_str) {
        Ok(ReviewOutcome::AttemptNotFound) => {
            let error = AppResponse::NotFound(format!("No attempt found with id: {id_str}"));
            response_to_c_string(&error)
        }
        Ok(outcome) => ok_json(&outcome),
        Err(e) => response_to_c_string(&e),
    }
}

/// Explicitly closes the LMDB environment.
///
/// The state pointer itself is not freed; further calls through it report a
/// `DatabaseError`. Useful before a hot restart reopens the same database.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_database(db_state: *mut AppDbState) -> *const c_char {
    if db_state.is_null() {
        let error =
            AppResponse::BadRequest("Null state pointer passed to close_database".to_string());
        return response_to_c_string(&error);
    }

    let db_state = unsafe { &mut *db_state };

    match db_state.close_database() {
        Ok(_) => {
            let success = AppResponse::Ok("Database connection closed successfully".to_string());
            response_to_c_string(&success)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Releases a string returned by any function of this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_c_string(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

fn state_ref<'a>(state: *mut AppDbState, caller: &str) -> Result<&'a AppDbState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(
    ptr: *const c_char,
    field_name: &str,
) -> Result<T, *const c_char> {
    let raw = c_ptr_to_string(ptr, field_name)?;

    serde_json::from_str(&raw).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid {field_name}: {e}"));
        response_to_c_string(&error)
    })
}

fn ok_json<T: Serialize>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Serializes a response into a C string owned by the caller.
///
/// Returns null only if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust String, reporting null pointers and
/// invalid UTF-8 as a ready-made `BadRequest` response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
