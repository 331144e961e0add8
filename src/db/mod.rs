//! Database module for SQLite persistence.
//!
//! Each document collection is a flat table keyed by a generated id, with
//! denormalized foreign-key columns (`course_id`, `tier_id`, `module_id`,
//! `user_id`) and joins done in the repository.

mod courses;
mod learning;
mod notifications;
mod repository;
mod seed;

pub use repository::*;
#[cfg(test)]
pub(crate) use repository::test_support;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        clerk_id TEXT NOT NULL UNIQUE,
        email TEXT,
        first_name TEXT,
        last_name TEXT,
        image_url TEXT,
        role TEXT NOT NULL DEFAULT 'student',
        onboarding_completed INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        is_personalized INTEGER NOT NULL DEFAULT 0,
        owner_id TEXT,
        generation_status TEXT,
        topic_key TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tiers (
        id TEXT PRIMARY KEY,
        course_id TEXT NOT NULL,
        level TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        generation_status TEXT NOT NULL DEFAULT 'locked',
        tier_order INTEGER NOT NULL,
        planned_modules TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (course_id, level)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS modules (
        id TEXT PRIMARY KEY,
        tier_id TEXT NOT NULL,
        course_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        module_order INTEGER NOT NULL,
        estimated_minutes INTEGER NOT NULL DEFAULT 10,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flashcards (
        id TEXT PRIMARY KEY,
        module_id TEXT NOT NULL,
        front TEXT NOT NULL,
        back TEXT NOT NULL,
        card_order INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assessments (
        id TEXT PRIMARY KEY,
        module_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        questions TEXT,
        prompt TEXT,
        rubric TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assessment_submissions (
        id TEXT PRIMARY KEY,
        assessment_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        answers TEXT,
        response TEXT,
        score INTEGER NOT NULL,
        passed INTEGER NOT NULL,
        feedback TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_interests (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        topic TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (user_id, topic)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_progress (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        module_id TEXT NOT NULL,
        course_id TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        progress_percent INTEGER NOT NULL DEFAULT 0,
        completed_at TEXT,
        updated_at TEXT NOT NULL,
        UNIQUE (user_id, module_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flashcard_progress (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        flashcard_id TEXT NOT NULL,
        ease_factor REAL NOT NULL,
        interval_days INTEGER NOT NULL,
        repetitions INTEGER NOT NULL,
        next_review_at TEXT NOT NULL,
        last_reviewed_at TEXT NOT NULL,
        UNIQUE (user_id, flashcard_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS understanding_checks (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        module_id TEXT NOT NULL,
        assessment_id TEXT NOT NULL,
        response TEXT NOT NULL,
        score INTEGER NOT NULL,
        feedback TEXT NOT NULL,
        improvement_areas TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        course_id TEXT NOT NULL,
        enrolled_at TEXT NOT NULL,
        UNIQUE (user_id, course_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        course_id TEXT,
        is_read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_settings (
        user_id TEXT PRIMARY KEY,
        email_notifications INTEGER NOT NULL DEFAULT 1,
        daily_goal_minutes INTEGER NOT NULL DEFAULT 30,
        theme TEXT NOT NULL DEFAULT 'system',
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_courses_owner ON courses(owner_id, topic_key)",
    "CREATE INDEX IF NOT EXISTS idx_tiers_course ON tiers(course_id)",
    "CREATE INDEX IF NOT EXISTS idx_modules_tier ON modules(tier_id, module_order)",
    "CREATE INDEX IF NOT EXISTS idx_modules_course ON modules(course_id)",
    "CREATE INDEX IF NOT EXISTS idx_flashcards_module ON flashcards(module_id)",
    "CREATE INDEX IF NOT EXISTS idx_assessments_module ON assessments(module_id)",
    "CREATE INDEX IF NOT EXISTS idx_progress_course ON user_progress(user_id, course_id)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read)",
];

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
