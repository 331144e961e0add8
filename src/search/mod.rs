//! Tantivy-based search index module.
//!
//! Provides full-text search over the course catalog with field boosting.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::CourseDetail;

const BOOST_TITLE: f32 = 10.0;
const BOOST_DESCRIPTION: f32 = 7.0;
const BOOST_MODULE_TITLES: f32 = 5.0;
const BOOST_CONTENT: f32 = 2.5;

/// Search result with course ID and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub course_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    course_id: Field,
    title: Field,
    description: Field,
    module_titles: Field,
    content: Field,
}

/// Tantivy search index for courses.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let course_id = schema_builder.add_text_field("course_id", STRING | STORED);
        let title = schema_builder.add_text_field("title", TEXT | STORED);
        let description = schema_builder.add_text_field("description", TEXT);
        let module_titles = schema_builder.add_text_field("module_titles", TEXT);
        let content = schema_builder.add_text_field("content", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            course_id,
            title,
            description,
            module_titles,
            content,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from the given courses.
    pub async fn rebuild(&self, courses: &[CourseDetail]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;
        for course in courses {
            writer.add_document(self.create_document(course))?;
        }
        writer.commit()?;

        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} courses", courses.len());
        Ok(())
    }

    /// Index (or re-index) a single course.
    pub async fn index_course(&self, course: &CourseDetail) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.course_id, &course.course.id));
        writer.add_document(self.create_document(course))?;
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Remove a course from the index.
    pub async fn remove_course(&self, course_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.course_id, course_id));
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search for courses matching the query.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let mut query_parser = QueryParser::for_index(
            &self.index,
            vec![
                self.fields.title,
                self.fields.description,
                self.fields.module_titles,
                self.fields.content,
            ],
        );
        for (field, boost) in [
            (self.fields.title, BOOST_TITLE),
            (self.fields.description, BOOST_DESCRIPTION),
            (self.fields.module_titles, BOOST_MODULE_TITLES),
            (self.fields.content, BOOST_CONTENT),
        ] {
            query_parser.set_field_boost(field, boost);
        }

        // Free-form learner input: stray operators are dropped, not rejected
        let (query, errors) = query_parser.parse_query_lenient(query_str);
        if !errors.is_empty() {
            tracing::debug!("Ignored {} malformed parts of query {:?}", errors.len(), query_str);
        }

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit + offset))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let course_id = doc.get_first(self.fields.course_id)?.as_str()?.to_string();
                Some(SearchResult { course_id, score })
            })
            .collect();

        Ok(results)
    }

    fn create_document(&self, detail: &CourseDetail) -> TantivyDocument {
        let module_titles: Vec<&str> = detail
            .tiers
            .iter()
            .flat_map(|t| {
                std::iter::once(t.tier.title.as_str())
                    .chain(t.modules.iter().map(|m| m.title.as_str()))
            })
            .collect();

        let mut content = detail.course.content.clone();
        for module in detail.tiers.iter().flat_map(|t| t.modules.iter()) {
            content.push('\n');
            content.push_str(&module.description);
        }

        doc!(
            self.fields.course_id => detail.course.id.clone(),
            self.fields.title => detail.course.title.clone(),
            self.fields.description => detail.course.description.clone(),
            self.fields.module_titles => module_titles.join(" "),
            self.fields.content => content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use tempfile::TempDir;

    fn create_test_course(id: &str, title: &str, description: &str) -> CourseDetail {
        CourseDetail {
            course: Course {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                content: String::new(),
                is_personalized: false,
                owner_id: None,
                generation_status: None,
                topic_key: None,
                created_at: "2024-01-01T00:00:00Z".to_string(),
                updated_at: "2024-01-01T00:00:00Z".to_string(),
            },
            tiers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_search_index_creation() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let courses = vec![
            create_test_course("1", "Machine Learning Basics", "Regression and classification"),
            create_test_course("2", "Cooking with Herbs", "Basil, thyme and rosemary"),
        ];

        index.rebuild(&courses).await.unwrap();

        let results = index.search("regression", 10, 0).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].course_id, "1");
    }

    #[tokio::test]
    async fn test_reindex_replaces_document() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        index
            .index_course(&create_test_course("1", "Astronomy", "Stars"))
            .await
            .unwrap();
        index
            .index_course(&create_test_course("1", "Astronomy", "Planets"))
            .await
            .unwrap();

        assert_eq!(index.search("astronomy", 10, 0).unwrap().len(), 1);
        assert!(index.search("stars", 10, 0).unwrap().is_empty());

        index.remove_course("1").await.unwrap();
        assert!(index.search("astronomy", 10, 0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_title_outranks_description() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        index
            .rebuild(&[
                create_test_course("1", "Gardening", "Growing herbs on a balcony"),
                create_test_course("2", "Herbs", "A field guide"),
            ])
            .await
            .unwrap();

        let results = index.search("herbs", 10, 0).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].course_id, "2");

        let page = index.search("herbs", 10, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].course_id, "1");
    }

    #[tokio::test]
    async fn test_malformed_query_is_tolerated() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index
            .rebuild(&[create_test_course("1", "Rust Basics", "Ownership")])
            .await
            .unwrap();

        assert!(index.search("rust AND (", 10, 0).is_ok());
        assert!(index.search("title:", 10, 0).is_ok());
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let results = index.search("", 10, 0).unwrap();
        assert!(results.is_empty());
    }
}
