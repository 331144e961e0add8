//! Starter catalog inserted on first boot when seeding is enabled.

use sqlx::Row;

use super::Repository;
use crate::errors::AppError;
use crate::models::{NewCourse, NewModule, NewTier, TierLevel, TierStatus};

struct SeedModule {
    title: &'static str,
    description: &'static str,
    content: &'static str,
    minutes: i32,
}

struct SeedCourse {
    title: &'static str,
    description: &'static str,
    modules: &'static [SeedModule],
}

const CATALOG: &[SeedCourse] = &[
    SeedCourse {
        title: "Foundations of Programming",
        description: "Variables, control flow and functions for complete beginners.",
        modules: &[
            SeedModule {
                title: "Values and Variables",
                description: "Naming data and changing it over time.",
                content: "# Values and Variables\n\nA **variable** is a name bound to a value.",
                minutes: 10,
            },
            SeedModule {
                title: "Control Flow",
                description: "Making decisions and repeating work.",
                content: "# Control Flow\n\n`if`, `while` and `for` decide what runs next.",
                minutes: 15,
            },
        ],
    },
    SeedCourse {
        title: "Introduction to Data Science",
        description: "From raw data to a first model.",
        modules: &[SeedModule {
            title: "Exploring a Dataset",
            description: "Summaries, distributions and missing values.",
            content: "# Exploring a Dataset\n\nStart by looking at the shape of the data.",
            minutes: 20,
        }],
    },
];

impl Repository {
    /// Insert the starter catalog. No-op when any public course already exists.
    ///
    /// Returns the number of courses inserted.
    pub async fn seed_catalog(&self) -> Result<usize, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM courses WHERE is_personalized = 0")
            .fetch_one(&self.pool)
            .await?;
        let existing: i64 = row.get("n");
        if existing > 0 {
            tracing::debug!("Catalog already present ({} public courses), skipping seed", existing);
            return Ok(0);
        }

        for seed in CATALOG {
            let course = self
                .create_course(&NewCourse {
                    title: seed.title.to_string(),
                    description: seed.description.to_string(),
                    content: String::new(),
                    owner_id: None,
                    generation_status: None,
                    topic_key: None,
                })
                .await?;

            for level in TierLevel::ALL {
                let tier = self
                    .create_tier(&NewTier {
                        course_id: course.id.clone(),
                        level,
                        title: format!("{} ({})", seed.title, level.as_str()),
                        description: String::new(),
                        generation_status: if level == TierLevel::Start {
                            TierStatus::Completed
                        } else {
                            TierStatus::Locked
                        },
                        planned_modules: Vec::new(),
                    })
                    .await?;

                if level != TierLevel::Start {
                    continue;
                }
                for (order, module) in seed.modules.iter().enumerate() {
                    self.create_module(&NewModule {
                        tier_id: tier.id.clone(),
                        course_id: course.id.clone(),
                        title: module.title.to_string(),
                        description: module.description.to_string(),
                        content: module.content.to_string(),
                        order: order as i32,
                        estimated_minutes: module.minutes,
                    })
                    .await?;
                }
            }
        }

        tracing::info!("Seeded catalog with {} courses", CATALOG.len());
        Ok(CATALOG.len())
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::test_support::temp_repo;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let (repo, _dir) = temp_repo().await;
        assert_eq!(repo.seed_catalog().await.unwrap(), 2);
        assert_eq!(repo.seed_catalog().await.unwrap(), 0);

        let courses = repo.list_courses(None).await.unwrap();
        assert_eq!(courses.len(), 2);
        assert!(courses.iter().all(|c| c.tier_count == 3));
    }
}
